//! Geospatial containers: a named set of feature layers.

use geo::Geometry;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::cell::Cell;
use crate::error::{ExtractError, GeometryError};
use crate::geometry;

/// Layer extensions read by [`GeoJsonDirectory`], in lookup order.
const LAYER_EXTENSIONS: [&str; 2] = ["geojson", "json"];

/// A source of feature layers.
pub trait FeatureContainer {
    /// Layer names in the order they are processed.
    fn layer_names(&self) -> Result<Vec<String>, ExtractError>;

    fn read_layer(&self, name: &str) -> Result<RawLayer, ExtractError>;
}

/// Geometry as read from the container.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Absent,
    Unreadable(GeometryError),
    Present(Geometry<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub id: i64,
    pub geometry: FeatureGeometry,
    /// Properties in source order.
    pub properties: Vec<(String, Cell)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawLayer {
    pub name: String,
    pub features: Vec<RawFeature>,
}

/// A directory of GeoJSON FeatureCollections, one layer per file.
#[derive(Debug, Clone)]
pub struct GeoJsonDirectory {
    root: PathBuf,
}

impl GeoJsonDirectory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let root = root.into();
        let meta = std::fs::metadata(&root).map_err(|e| ExtractError::io(&root, e))?;
        if !meta.is_dir() {
            return Err(ExtractError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn layer_path(&self, name: &str) -> Option<PathBuf> {
        LAYER_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl FeatureContainer for GeoJsonDirectory {
    fn layer_names(&self) -> Result<Vec<String>, ExtractError> {
        let io_err = |e| ExtractError::io(&self.root, e);
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_layer = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| LAYER_EXTENSIONS.contains(&e));
            if !is_layer || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn read_layer(&self, name: &str) -> Result<RawLayer, ExtractError> {
        let path = self
            .layer_path(name)
            .ok_or_else(|| ExtractError::UnknownLayer(name.to_string()))?;
        let text = std::fs::read_to_string(&path).map_err(|e| ExtractError::io(&path, e))?;
        let doc: Value = serde_json::from_str(&text).map_err(|source| ExtractError::Json {
            path: path.clone(),
            source,
        })?;
        parse_feature_collection(name, &doc)
            .ok_or(ExtractError::NotAFeatureCollection { path })
    }
}

/// Features of a FeatureCollection document; `None` if `doc` is not one.
pub fn parse_feature_collection(name: &str, doc: &Value) -> Option<RawLayer> {
    if doc.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return None;
    }
    let features = doc
        .get("features")?
        .as_array()?
        .iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature))
        .collect();
    Some(RawLayer {
        name: name.to_string(),
        features,
    })
}

fn parse_feature(index: usize, feature: &Value) -> RawFeature {
    let id = feature
        .get("id")
        .and_then(Value::as_i64)
        .unwrap_or(index as i64);

    let geometry = match feature.get("geometry") {
        None | Some(Value::Null) => FeatureGeometry::Absent,
        Some(g) => match geometry::from_geojson(g) {
            Ok(g) => FeatureGeometry::Present(g),
            Err(e) => FeatureGeometry::Unreadable(e),
        },
    };

    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), Cell::from_json(v)))
                .collect()
        })
        .unwrap_or_default();

    RawFeature {
        id,
        geometry,
        properties,
    }
}
