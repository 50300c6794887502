//! Minimal GeoJSON decoding for the datasets this viewer consumes.
//!
//! Only the shapes the building and utility datasets actually use are
//! interpreted: Polygon/MultiPolygon features become building footprints,
//! LineString/MultiLineString features become utility segments. Geometry
//! is kept as raw JSON and interpreted leniently so a stray point feature
//! does not fail the whole collection.

use bevy::math::DVec2;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AssetError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// One polygon footprint with its attributes resolved.
#[derive(Debug, Clone)]
pub struct BuildingFeature {
    /// Outer ring, lon/lat degrees.
    pub outer: Vec<DVec2>,
    /// Interior rings (holes), lon/lat degrees.
    pub holes: Vec<Vec<DVec2>>,
    /// `BUILD_TYPE` property, when present.
    pub building_type: Option<String>,
    /// Resolved height in meters, when present (see [`resolve_height`]).
    pub height: Option<f64>,
}

/// One polyline from a utility dataset, lon/lat degrees.
#[derive(Debug, Clone)]
pub struct LineFeature {
    pub path: Vec<DVec2>,
}

/// Decode the building dataset: every polygon-bearing feature becomes one
/// [`BuildingFeature`] per polygon. Non-polygon features are skipped.
pub fn decode_buildings(asset_id: u64, bytes: &[u8]) -> Result<Vec<BuildingFeature>, AssetError> {
    let collection = parse_collection(asset_id, bytes)?;
    let mut out = Vec::new();
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        let props = feature.properties.unwrap_or_default();
        for rings in geometry.polygons() {
            let Some((outer, holes)) = split_rings(rings) else {
                continue;
            };
            out.push(BuildingFeature {
                outer,
                holes,
                building_type: building_type(&props),
                height: resolve_height(&props),
            });
        }
    }
    Ok(out)
}

/// Decode a utility dataset: every line-bearing feature becomes one
/// [`LineFeature`] per linestring. Other geometry is skipped.
pub fn decode_lines(asset_id: u64, bytes: &[u8]) -> Result<Vec<LineFeature>, AssetError> {
    let collection = parse_collection(asset_id, bytes)?;
    let mut out = Vec::new();
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        for path in geometry.lines() {
            if path.len() >= 2 {
                out.push(LineFeature { path });
            }
        }
    }
    Ok(out)
}

/// Resolve a building height from its property bag: first present of
/// `Height`, `height`, `HEIGHT`, in that priority. A present key ends the
/// chain even when its value is not numeric (then no height is resolved).
/// Numbers and numeric strings are accepted.
pub fn resolve_height(props: &Map<String, Value>) -> Option<f64> {
    for key in ["Height", "height", "HEIGHT"] {
        match props.get(key) {
            None | Some(Value::Null) => continue,
            Some(value) => return numeric(value),
        }
    }
    None
}

/// The `BUILD_TYPE` property, when present and a string.
pub fn building_type(props: &Map<String, Value>) -> Option<String> {
    props
        .get("BUILD_TYPE")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_collection(asset_id: u64, bytes: &[u8]) -> Result<FeatureCollection, AssetError> {
    serde_json::from_slice(bytes).map_err(|err| AssetError::decode(asset_id, err.to_string()))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Positions array `[[lon, lat, ...], ...]` to points. Extra vertex
/// dimensions (altitude) are ignored.
fn positions(value: &Value) -> Option<Vec<DVec2>> {
    let array = value.as_array()?;
    let mut points = Vec::with_capacity(array.len());
    for position in array {
        let coords = position.as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        points.push(DVec2::new(lon, lat));
    }
    Some(points)
}

fn ring_array(value: &Value) -> Option<Vec<Vec<DVec2>>> {
    value.as_array()?.iter().map(positions).collect()
}

fn split_rings(mut rings: Vec<Vec<DVec2>>) -> Option<(Vec<DVec2>, Vec<Vec<DVec2>>)> {
    if rings.is_empty() || rings[0].len() < 3 {
        return None;
    }
    let outer = rings.remove(0);
    rings.retain(|ring| ring.len() >= 3);
    Some((outer, rings))
}

impl RawGeometry {
    /// Each polygon as its list of rings (outer first).
    fn polygons(&self) -> Vec<Vec<Vec<DVec2>>> {
        match self.kind.as_str() {
            "Polygon" => ring_array(&self.coordinates)
                .map(|rings| vec![rings])
                .unwrap_or_default(),
            "MultiPolygon" => self
                .coordinates
                .as_array()
                .map(|polygons| polygons.iter().filter_map(ring_array).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn lines(&self) -> Vec<Vec<DVec2>> {
        match self.kind.as_str() {
            "LineString" => positions(&self.coordinates)
                .map(|path| vec![path])
                .unwrap_or_default(),
            "MultiLineString" => self
                .coordinates
                .as_array()
                .map(|paths| paths.iter().filter_map(positions).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn height_priority_prefers_capitalized_key() {
        let p = props(r#"{"Height": 12.5, "height": 3, "HEIGHT": 1}"#);
        assert_eq!(resolve_height(&p), Some(12.5));
    }

    #[test]
    fn height_falls_through_null_and_missing_keys() {
        let p = props(r#"{"Height": null, "HEIGHT": "7.25"}"#);
        assert_eq!(resolve_height(&p), Some(7.25));
    }

    #[test]
    fn height_accepts_numeric_strings() {
        let p = props(r#"{"height": " 4.5 "}"#);
        assert_eq!(resolve_height(&p), Some(4.5));
    }

    #[test]
    fn present_but_non_numeric_height_resolves_to_none() {
        // The key is present, so the chain stops; the unusable value
        // resolves to no height rather than falling through to HEIGHT.
        let p = props(r#"{"Height": "n/a", "HEIGHT": 9}"#);
        assert_eq!(resolve_height(&p), None);
    }

    #[test]
    fn zero_height_counts_as_present() {
        let p = props(r#"{"Height": 0, "height": 8}"#);
        assert_eq!(resolve_height(&p), Some(0.0));
    }

    #[test]
    fn build_type_requires_a_string() {
        assert_eq!(
            building_type(&props(r#"{"BUILD_TYPE": "Residential"}"#)),
            Some("Residential".to_string())
        );
        assert_eq!(building_type(&props(r#"{"BUILD_TYPE": 3}"#)), None);
        assert_eq!(building_type(&props("{}")), None);
    }

    #[test]
    fn decode_buildings_keeps_only_polygon_features() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]},
                 "properties": {"BUILD_TYPE": "Commercial", "Height": 6}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [5, 5]},
                 "properties": {}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }"#;
        let buildings = decode_buildings(1, data.as_bytes()).unwrap();
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].building_type.as_deref(), Some("Commercial"));
        assert_eq!(buildings[0].height, Some(6.0));
        assert_eq!(buildings[0].outer.len(), 4);
        assert!(buildings[0].holes.is_empty());
    }

    #[test]
    fn decode_buildings_expands_multipolygons() {
        let data = r#"{
            "features": [
                {"geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0,0],[1,0],[1,1],[0,0]]],
                    [[[2,2],[3,2],[3,3],[2,2]], [[2.2,2.2],[2.8,2.2],[2.8,2.8],[2.2,2.2]]]
                ]},
                "properties": {"HEIGHT": 4}}
            ]
        }"#;
        let buildings = decode_buildings(1, data.as_bytes()).unwrap();
        assert_eq!(buildings.len(), 2);
        assert_eq!(buildings[1].holes.len(), 1);
    }

    #[test]
    fn decode_lines_reads_both_linestring_kinds() {
        let data = r#"{
            "features": [
                {"geometry": {"type": "LineString", "coordinates": [[0,0],[1,1],[2,0]]}},
                {"geometry": {"type": "MultiLineString", "coordinates": [[[0,0],[1,0]], [[5,5],[6,6]]]}},
                {"geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}
            ]
        }"#;
        let lines = decode_lines(2, data.as_bytes()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].path.len(), 3);
    }

    #[test]
    fn malformed_json_yields_decode_error_with_asset_id() {
        let err = decode_buildings(4_331_513, b"not json").unwrap_err();
        assert_eq!(err.asset_id(), 4_331_513);
    }

    #[test]
    fn altitude_in_positions_is_ignored() {
        let data = r#"{
            "features": [
                {"geometry": {"type": "Polygon",
                 "coordinates": [[[0,0,10],[1,0,10],[1,1,10],[0,0,10]]]}}
            ]
        }"#;
        let buildings = decode_buildings(1, data.as_bytes()).unwrap();
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].outer[0], DVec2::new(0.0, 0.0));
    }
}
