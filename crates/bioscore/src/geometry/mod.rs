//! Project region geometry: surface area, centroid and map viewport of a GeoJSON polygon.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoring::InvalidInput;

/// WGS84 equatorial radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

const MAX_ZOOM: f64 = 20.0;
const MIN_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

/// Map centre and zoom level framing a project region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Position,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySummary {
    pub area_m2: f64,
    pub centroid: Position,
    pub viewport: Viewport,
}

/// A single polygon region; rings are stored open (no repeated closing vertex).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGeometry {
    exterior: Vec<Position>,
    holes: Vec<Vec<Position>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    Feature {
        geometry: Box<GeoJson>,
    },
    FeatureCollection {
        features: Vec<GeoJson>,
    },
}

fn invalid(constraint: impl Into<String>) -> InvalidInput {
    InvalidInput::new("geometry", constraint)
}

impl ProjectGeometry {
    /// Accepts a `Polygon`, a `Feature`, or a `FeatureCollection` (first feature wins).
    pub fn from_value(value: Value) -> Result<Self, InvalidInput> {
        let parsed: GeoJson = serde_json::from_value(value)
            .map_err(|err| invalid(format!("must be a GeoJSON polygon ({err})")))?;
        Self::from_geojson(parsed)
    }

    /// Parses stored geometry text; single-quoted JSON is tolerated.
    pub fn from_geojson_str(raw: &str) -> Result<Self, InvalidInput> {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(_) => serde_json::from_str::<Value>(&raw.replace('\'', "\""))
                .map_err(|err| invalid(format!("must be valid JSON ({err})")))?,
        };
        Self::from_value(value)
    }

    fn from_geojson(geojson: GeoJson) -> Result<Self, InvalidInput> {
        match geojson {
            GeoJson::Polygon { coordinates } => Self::from_rings(coordinates),
            GeoJson::Feature { geometry } => Self::from_geojson(*geometry),
            GeoJson::FeatureCollection { features } => {
                let first = features
                    .into_iter()
                    .next()
                    .ok_or_else(|| invalid("feature collection must contain a feature"))?;
                Self::from_geojson(first)
            }
        }
    }

    fn from_rings(rings: Vec<Vec<Vec<f64>>>) -> Result<Self, InvalidInput> {
        let mut rings = rings.into_iter().map(parse_ring);
        let exterior = rings
            .next()
            .ok_or_else(|| invalid("polygon must have an exterior ring"))??;
        let holes = rings.collect::<Result<Vec<_>, _>>()?;
        Ok(Self { exterior, holes })
    }

    pub fn exterior(&self) -> &[Position] {
        &self.exterior
    }

    /// Geodesic surface area in square metres, holes subtracted.
    pub fn area_m2(&self) -> f64 {
        let outer = ring_area(&self.exterior).abs();
        let holes: f64 = self.holes.iter().map(|ring| ring_area(ring).abs()).sum();
        (outer - holes).max(0.0)
    }

    /// Planar area-weighted centroid of the exterior ring.
    pub fn centroid(&self) -> Position {
        let ring = &self.exterior;
        let count = ring.len();
        let mut twice_area = 0.0;
        let mut lon = 0.0;
        let mut lat = 0.0;
        for i in 0..count {
            let a = ring[i];
            let b = ring[(i + 1) % count];
            let cross = a.lon * b.lat - b.lon * a.lat;
            twice_area += cross;
            lon += (a.lon + b.lon) * cross;
            lat += (a.lat + b.lat) * cross;
        }

        if twice_area.abs() < f64::EPSILON {
            return vertex_mean(ring);
        }

        Position {
            lon: lon / (3.0 * twice_area),
            lat: lat / (3.0 * twice_area),
        }
    }

    /// Vertex-mean centre with a zoom level chosen from the bounding-box area in square degrees.
    pub fn viewport(&self) -> Viewport {
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        for position in &self.exterior {
            min_lon = min_lon.min(position.lon);
            max_lon = max_lon.max(position.lon);
            min_lat = min_lat.min(position.lat);
            max_lat = max_lat.max(position.lat);
        }

        let bbox_area = (max_lat - min_lat) * (max_lon - min_lon);
        Viewport {
            center: vertex_mean(&self.exterior),
            zoom: zoom_for_area(bbox_area),
        }
    }

    pub fn summary(&self) -> GeometrySummary {
        GeometrySummary {
            area_m2: self.area_m2(),
            centroid: self.centroid(),
            viewport: self.viewport(),
        }
    }
}

fn parse_ring(raw: Vec<Vec<f64>>) -> Result<Vec<Position>, InvalidInput> {
    let mut ring = Vec::with_capacity(raw.len());
    for coordinate in raw {
        let [lon, lat] = match coordinate.as_slice() {
            [lon, lat, ..] => [*lon, *lat],
            _ => return Err(invalid("positions must have a longitude and a latitude")),
        };
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        ring.push(Position { lon, lat });
    }

    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Err(invalid("rings must have at least three distinct positions"));
    }
    Ok(ring)
}

/// Spherical excess of an open ring; the sign follows the winding order.
fn ring_area(ring: &[Position]) -> f64 {
    let count = ring.len();
    if count < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..count {
        let lower = ring[i];
        let middle = ring[(i + 1) % count];
        let upper = ring[(i + 2) % count];
        total += (upper.lon.to_radians() - lower.lon.to_radians()) * middle.lat.to_radians().sin();
    }

    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

fn vertex_mean(ring: &[Position]) -> Position {
    let count = ring.len().max(1) as f64;
    Position {
        lon: ring.iter().map(|p| p.lon).sum::<f64>() / count,
        lat: ring.iter().map(|p| p.lat).sum::<f64>() / count,
    }
}

/// Piecewise-linear zoom over bounding-box areas; anything from one square degree up gets
/// the widest zoom.
pub fn zoom_for_area(area_deg2: f64) -> f64 {
    let breakpoints = [
        (0.0, MAX_ZOOM),
        (5f64.powi(-10), 15.0),
        (4f64.powi(-10), 14.0),
        (3f64.powi(-10), 13.0),
        (2f64.powi(-10), 12.0),
        (1.0, 7.0),
    ];

    if !area_deg2.is_finite() || area_deg2 >= 1.0 {
        return MIN_ZOOM;
    }
    if area_deg2 <= 0.0 {
        return MAX_ZOOM;
    }

    for pair in breakpoints.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if area_deg2 < x1 {
            return y0 + (y1 - y0) * (area_deg2 - x0) / (x1 - x0);
        }
    }

    MIN_ZOOM
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_square() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        })
    }

    #[test]
    fn one_degree_square_at_equator() {
        let geometry = ProjectGeometry::from_value(unit_square()).expect("valid polygon");
        let area = geometry.area_m2();
        let expected = 12_391_399_902.07;
        assert!(
            ((area - expected) / expected).abs() < 1e-6,
            "unexpected area {area}"
        );

        let centroid = geometry.centroid();
        assert!((centroid.lon - 0.5).abs() < 1e-9);
        assert!((centroid.lat - 0.5).abs() < 1e-9);
    }

    #[test]
    fn winding_order_does_not_change_area() {
        let clockwise = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]]
        });
        let a = ProjectGeometry::from_value(unit_square()).expect("valid");
        let b = ProjectGeometry::from_value(clockwise).expect("valid");
        assert!((a.area_m2() - b.area_m2()).abs() < 1e-3);
    }

    #[test]
    fn holes_are_subtracted() {
        let with_hole = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
                [[0.25, 0.25], [0.75, 0.25], [0.75, 0.75], [0.25, 0.75], [0.25, 0.25]]
            ]
        });
        let solid = ProjectGeometry::from_value(unit_square()).expect("valid");
        let holed = ProjectGeometry::from_value(with_hole).expect("valid");
        let ratio = holed.area_m2() / solid.area_m2();
        assert!((ratio - 0.75).abs() < 1e-3, "ratio {ratio}");
    }

    #[test]
    fn reads_first_feature_of_collection() {
        let raw = r#"{'type': 'FeatureCollection', 'features': [{'type': 'Feature', 'properties': {}, 'geometry': {'type': 'Polygon', 'coordinates': [[[-74.7, 5.8], [-74.6, 5.8], [-74.6, 5.9], [-74.7, 5.9], [-74.7, 5.8]]]}}]}"#;
        let geometry = ProjectGeometry::from_geojson_str(raw).expect("single quotes tolerated");
        assert_eq!(geometry.exterior().len(), 4);
        assert!(geometry.area_m2() > 0.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [181.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        let err = ProjectGeometry::from_value(polygon).expect_err("longitude out of range");
        assert_eq!(err.field, "geometry");
        assert!(err.constraint.contains("longitude"));
    }

    #[test]
    fn rejects_degenerate_rings() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]
        });
        assert!(ProjectGeometry::from_value(polygon).is_err());

        let empty = json!({ "type": "FeatureCollection", "features": [] });
        assert!(ProjectGeometry::from_value(empty).is_err());
    }

    #[test]
    fn zoom_follows_breakpoints() {
        assert_eq!(zoom_for_area(0.0), 20.0);
        assert_eq!(zoom_for_area(2f64.powi(-10)), 12.0);
        assert_eq!(zoom_for_area(1.0), 5.0);
        assert_eq!(zoom_for_area(40.0), 5.0);

        let mid = zoom_for_area((2f64.powi(-10) + 1.0) / 2.0);
        assert!((mid - 9.5).abs() < 1e-9, "mid {mid}");
    }

    #[test]
    fn viewport_centres_on_vertices() {
        let geometry = ProjectGeometry::from_value(unit_square()).expect("valid");
        let viewport = geometry.viewport();
        assert_eq!(viewport.center, Position { lon: 0.5, lat: 0.5 });
        assert_eq!(viewport.zoom, 5.0);
    }
}
