//! GeoJSON boundary loader.
//!
//! Reads a `FeatureCollection` of country boundaries (e.g. Natural Earth
//! admin-0 countries) into [`Region`]s. Polygon rings are kept in file
//! order, so ring 0 is the outer boundary and later rings are holes.

use std::path::Path;

use log::{info, warn};
use serde_json::Value;

use crate::error::BoundaryError;
use crate::geometry::{Polygon, RegionGeometry, Ring};
use crate::region::Region;

/// Default feature property holding the country name.
pub const DEFAULT_NAME_PROPERTY: &str = "ADMIN";

/// Load regions from a GeoJSON file.
pub fn load_regions(path: &Path, name_property: &str) -> Result<Vec<Region>, BoundaryError> {
    let content = std::fs::read(path).map_err(|source| BoundaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let regions = parse_regions(&content, name_property)?;
    info!("[Boundaries] Loaded {} regions from {}", regions.len(), path.display());
    Ok(regions)
}

/// Parse regions from GeoJSON bytes.
///
/// `Polygon` and `MultiPolygon` features become classifiable regions; other
/// geometry types are kept as [`RegionGeometry::Unsupported`]. Features
/// without the name property are skipped.
pub fn parse_regions(content: &[u8], name_property: &str) -> Result<Vec<Region>, BoundaryError> {
    let value: Value = serde_json::from_slice(content)?;
    let features = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| BoundaryError::Format("missing \"features\" array".to_string()))?;

    let mut regions = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let Some(name) = feature_name(feature, name_property) else {
            warn!("[Boundaries] Feature {} has no \"{}\" property, skipping", idx, name_property);
            continue;
        };
        let geometry = parse_geometry(&feature["geometry"])
            .map_err(|e| BoundaryError::Format(format!("feature {} ({}): {}", idx, name, e)))?;
        if let RegionGeometry::Unsupported(kind) = &geometry {
            warn!("[Boundaries] {} has unsupported geometry type {}", name, kind);
        }
        regions.push(Region::new(name, geometry));
    }
    Ok(regions)
}

/// String properties are used as-is, anything else in its JSON rendering.
fn feature_name(feature: &Value, name_property: &str) -> Option<String> {
    match feature.get("properties")?.get(name_property)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_geometry(geometry: &Value) -> Result<RegionGeometry, String> {
    if geometry.is_null() {
        return Ok(RegionGeometry::Unsupported("null".to_string()));
    }
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry has no type")?;
    let coords = &geometry["coordinates"];

    match kind {
        "Polygon" => Ok(RegionGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => {
            let polygons = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array")?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RegionGeometry::MultiPolygon(polygons))
        }
        other => Ok(RegionGeometry::Unsupported(other.to_string())),
    }
}

/// `[[ring], [ring], ...]` where each ring is `[[x, y], ...]`.
fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("polygon coordinates must be an array of rings")?
        .iter()
        .map(parse_ring)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(rings))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let positions = coords.as_array().ok_or("ring must be an array of positions")?;
    let mut points = Vec::with_capacity(positions.len());
    for position in positions {
        let xy = position
            .as_array()
            .filter(|p| p.len() >= 2)
            .and_then(|p| Some((p[0].as_f64()?, p[1].as_f64()?)))
            .ok_or_else(|| format!("invalid position {}", position))?;
        points.push(xy);
    }
    Ok(Ring::from_xy(&points))
}
