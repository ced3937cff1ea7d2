//! Boundary dataset loading.
//!
//! The boundary file is a GeoJSON `FeatureCollection`. Only the region-name
//! property of each feature is read; geometries are left to the renderer,
//! which matches features on the same name.

use std::path::Path;

use county_model::GeoBoundaryIndex;
use serde_json::Value;

use crate::error::{IngestError, Result};

/// Load the boundary index from a GeoJSON file.
///
/// Features without a string `name_property` are skipped and counted in the
/// debug log; they can never be the target of a county key.
pub fn load_boundary_index(path: &Path, name_property: &str) -> Result<GeoBoundaryIndex> {
    let contents = std::fs::read_to_string(path).map_err(|e| IngestError::open(path, e))?;
    let document: Value =
        serde_json::from_str(&contents).map_err(|e| IngestError::GeoJsonParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    boundary_index_from_value(&document, name_property).ok_or_else(|| {
        IngestError::NotFeatureCollection {
            path: path.to_path_buf(),
        }
    })
}

/// Build the index from an already parsed GeoJSON document. `None` when the
/// document is not a feature collection.
pub fn boundary_index_from_value(document: &Value, name_property: &str) -> Option<GeoBoundaryIndex> {
    if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return None;
    }
    let features = document.get("features")?.as_array()?;

    let mut unnamed = 0usize;
    let regions: Vec<(String, usize)> = features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| {
            let name = feature
                .get("properties")
                .and_then(|props| props.get(name_property))
                .and_then(Value::as_str);
            if name.is_none() {
                unnamed += 1;
            }
            name.map(|n| (n.to_string(), idx))
        })
        .collect();

    let index = GeoBoundaryIndex::new(name_property, regions);
    tracing::debug!(
        features = features.len(),
        regions = index.len(),
        unnamed,
        duplicates = index.duplicate_names().len(),
        "built boundary index"
    );
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_names_from_properties() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Westmeath"}, "geometry": null},
                {"type": "Feature", "properties": {"id": 7}, "geometry": null},
                {"type": "Feature", "properties": {"name": "DUBLIN"}, "geometry": null}
            ]
        });
        let index = boundary_index_from_value(&doc, "name").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Dublin").unwrap().id, "DUBLIN");
        assert_eq!(index.get("Dublin").unwrap().feature_index, 2);
    }

    #[test]
    fn rejects_plain_feature() {
        let doc = json!({"type": "Feature", "properties": {"name": "Cork"}});
        assert!(boundary_index_from_value(&doc, "name").is_none());
    }
}
