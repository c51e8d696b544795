use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::IndexKey;

/// How the raster engine derives an index from its source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSource {
    Image,
    ImageCollection,
    FeatureCollection,
    Algebraic,
}

/// Definition of one index as declared in `indices.yaml`.
///
/// ```yaml
/// ndvi:
///   name: NDVI
///   source: algebraic
///   path: LANDSAT/LC08/C02/T1
///   min: -1.0
///   max: 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDefinition {
    pub name: String,
    pub source: IndexSource,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandname: Option<String>,
    pub min: f64,
    pub max: f64,
}

impl IndexDefinition {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Errors raised while loading an index catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read index catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid index catalog YAML: {0}")]
    Parse(String),
    #[error("index catalog does not define any indices")]
    Empty,
    #[error("index `{key}` declares min {min} which is not below max {max}")]
    InvalidDomain { key: IndexKey, min: f64, max: f64 },
    #[error("index `{0}` is not defined in the catalog")]
    UnknownIndex(IndexKey),
}

/// Set of indices the engine accepts, each with its valid value domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexCatalog {
    indices: BTreeMap<IndexKey, IndexDefinition>,
}

impl IndexCatalog {
    pub fn new(indices: BTreeMap<IndexKey, IndexDefinition>) -> Result<Self, CatalogError> {
        if indices.is_empty() {
            return Err(CatalogError::Empty);
        }

        for (key, definition) in &indices {
            if !definition.min.is_finite()
                || !definition.max.is_finite()
                || definition.min >= definition.max
            {
                return Err(CatalogError::InvalidDomain {
                    key: key.clone(),
                    min: definition.min,
                    max: definition.max,
                });
            }
        }

        Ok(Self { indices })
    }

    /// Indices shipped with the service, mirroring the bundled `indices.yaml`.
    pub fn builtin() -> Self {
        let mut indices = BTreeMap::new();
        indices.insert(
            IndexKey::from("ndvi"),
            IndexDefinition {
                name: "NDVI".to_string(),
                source: IndexSource::Algebraic,
                path: "LANDSAT/LC08/C02/T1".to_string(),
                select: None,
                bandname: Some("nd".to_string()),
                min: -1.0,
                max: 1.0,
            },
        );
        indices.insert(
            IndexKey::from("water"),
            IndexDefinition {
                name: "Surface water occurrence".to_string(),
                source: IndexSource::Image,
                path: "JRC/GSW1_4/GlobalSurfaceWater".to_string(),
                select: Some("occurrence".to_string()),
                bandname: Some("occurrence".to_string()),
                min: 0.0,
                max: 100.0,
            },
        );
        indices.insert(
            IndexKey::from("protected"),
            IndexDefinition {
                name: "Protected area coverage".to_string(),
                source: IndexSource::FeatureCollection,
                path: "WCMC/WDPA/current/polygons".to_string(),
                select: None,
                bandname: Some("constant".to_string()),
                min: 0.0,
                max: 1.0,
            },
        );
        indices.insert(
            IndexKey::from("tree_cover"),
            IndexDefinition {
                name: "Tree canopy cover".to_string(),
                source: IndexSource::ImageCollection,
                path: "NASA/MEASURES/GFCC/TC/v3".to_string(),
                select: Some("tree_canopy_cover".to_string()),
                bandname: Some("tree_canopy_cover".to_string()),
                min: 0.0,
                max: 100.0,
            },
        );
        Self { indices }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let indices: BTreeMap<IndexKey, IndexDefinition> =
            serde_saphyr::from_str(raw).map_err(|err| CatalogError::Parse(err.to_string()))?;
        Self::new(indices)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Restrict the catalog to the named indices.
    pub fn subset<'a, I>(&self, keys: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = &'a IndexKey>,
    {
        let mut indices = BTreeMap::new();
        for key in keys {
            let definition = self
                .indices
                .get(key)
                .ok_or_else(|| CatalogError::UnknownIndex(key.clone()))?;
            indices.insert(key.clone(), definition.clone());
        }
        Self::new(indices)
    }

    pub fn get(&self, key: &IndexKey) -> Option<&IndexDefinition> {
        self.indices.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IndexKey> {
        self.indices.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &IndexDefinition)> {
        self.indices.iter()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Comma separated key list used in membership errors.
    pub(crate) fn key_list(&self) -> String {
        self.indices
            .keys()
            .map(IndexKey::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for IndexCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
