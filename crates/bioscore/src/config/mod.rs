use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_MIN_YEAR: i32 = 2015;
pub const DEFAULT_MAX_YEAR: i32 = 2022;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("BIOSCORE_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("BIOSCORE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BIOSCORE_PORT")
            .unwrap_or_else(|_| "7860".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("BIOSCORE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let min_year = parse_year("BIOSCORE_MIN_YEAR", DEFAULT_MIN_YEAR)?;
        let max_year = parse_year("BIOSCORE_MAX_YEAR", DEFAULT_MAX_YEAR)?;
        if min_year > max_year {
            return Err(ConfigError::InvertedYearRange { min_year, max_year });
        }

        let indices_file = env::var("BIOSCORE_INDICES_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let service_account_file = env::var("BIOSCORE_SERVICE_ACCOUNT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("service_account.json"));
        let service_account_json = env::var("BIOSCORE_SERVICE_ACCOUNT")
            .ok()
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                min_year,
                max_year,
                indices_file,
            },
            credentials: CredentialsConfig {
                service_account_file,
                service_account_json,
            },
        })
    }
}

fn parse_year(key: &'static str, default: i32) -> Result<i32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidYear { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Year window and index catalog location for the score engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub min_year: i32,
    pub max_year: i32,
    pub indices_file: Option<PathBuf>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            indices_file: None,
        }
    }
}

/// Where to find the service-account key, if one is deployed.
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    pub service_account_file: PathBuf,
    /// Inline JSON takes precedence over the file for hosts without secret files.
    pub service_account_json: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidYear { key: &'static str },
    InvertedYearRange { min_year: i32, max_year: i32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "BIOSCORE_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "BIOSCORE_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidYear { key } => write!(f, "{key} must be a valid year"),
            ConfigError::InvertedYearRange { min_year, max_year } => write!(
                f,
                "BIOSCORE_MIN_YEAR ({min_year}) must not exceed BIOSCORE_MAX_YEAR ({max_year})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidYear { .. }
            | ConfigError::InvertedYearRange { .. } => None,
        }
    }
}
