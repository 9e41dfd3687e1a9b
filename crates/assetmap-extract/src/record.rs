//! Flattening a layer into one record per feature.

use std::collections::HashMap;

use crate::cell::Cell;
use crate::container::{FeatureGeometry, RawLayer};
use crate::geometry::{self, Bounds, GeometryKind};

/// Identity and geometry columns, ahead of the attribute columns.
pub const FIXED_COLUMNS: [&str; 8] = [
    "layer",
    "id",
    "geometry_type",
    "geometry_name",
    "GeoXLO",
    "GeoYLO",
    "GeoXHI",
    "GeoYHI",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub layer: String,
    pub feature_id: i64,
    pub geometry_kind: Option<GeometryKind>,
    pub bounds: Option<Bounds>,
    /// Aligned with [`LayerTable::attribute_names`].
    pub attributes: Vec<Cell>,
}

impl FeatureRecord {
    /// Full output row: fixed columns then attributes.
    pub fn cells(&self) -> Vec<Cell> {
        let mut row = Vec::with_capacity(FIXED_COLUMNS.len() + self.attributes.len());
        row.push(Cell::Text(self.layer.clone()));
        row.push(Cell::Integer(self.feature_id));
        match self.geometry_kind {
            Some(kind) => {
                row.push(Cell::Integer(kind.wkb_code()));
                row.push(Cell::Text(kind.name().to_string()));
            }
            None => row.extend([Cell::Missing, Cell::Missing]),
        }
        let b = self.bounds;
        row.push(b.map(|b| b.x_lo).into());
        row.push(b.map(|b| b.y_lo).into());
        row.push(b.map(|b| b.x_hi).into());
        row.push(b.map(|b| b.y_hi).into());
        row.extend(self.attributes.iter().cloned());
        row
    }
}

/// Where a layer sits in the run, for progress messages.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub layer_index: usize,
    pub layer_count: usize,
}

impl Progress {
    /// Log at every power-of-two feature and at the last one.
    pub fn feature(&self, layer: &str, feature: usize, feature_count: usize) {
        if feature.is_power_of_two() || feature == feature_count {
            tracing::info!(
                layer,
                layer_index = self.layer_index,
                layer_count = self.layer_count,
                feature,
                feature_count,
                "extracting"
            );
        }
    }
}

/// All records of one layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerTable {
    pub name: String,
    /// Attribute names in first-seen order across the layer.
    pub attribute_names: Vec<String>,
    pub records: Vec<FeatureRecord>,
}

impl LayerTable {
    pub fn from_raw(raw: RawLayer, progress: Progress) -> Self {
        let feature_count = raw.features.len();
        let mut attribute_names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut records = Vec::with_capacity(feature_count);

        for (i, feature) in raw.features.into_iter().enumerate() {
            progress.feature(&raw.name, i + 1, feature_count);

            let (geometry_kind, bounds) = match &feature.geometry {
                FeatureGeometry::Present(g) => (Some(GeometryKind::of(g)), geometry::bounds(g)),
                FeatureGeometry::Absent => (None, None),
                FeatureGeometry::Unreadable(err) => {
                    tracing::warn!(
                        layer = %raw.name,
                        feature = feature.id,
                        error = %err,
                        "unreadable geometry, emitting null geometry columns"
                    );
                    (None, None)
                }
            };

            let mut attributes = vec![Cell::Missing; attribute_names.len()];
            for (name, cell) in feature.properties {
                let column = *positions.entry(name.clone()).or_insert_with(|| {
                    attribute_names.push(name);
                    attribute_names.len() - 1
                });
                if column >= attributes.len() {
                    attributes.resize(column + 1, Cell::Missing);
                }
                attributes[column] = cell;
            }

            records.push(FeatureRecord {
                layer: raw.name.clone(),
                feature_id: feature.id,
                geometry_kind,
                bounds,
                attributes,
            });
        }

        // Pad records that predate later-discovered attributes.
        let width = attribute_names.len();
        for record in &mut records {
            record.attributes.resize(width, Cell::Missing);
        }

        Self {
            name: raw.name,
            attribute_names,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.attribute_names.iter().cloned())
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Cell>> + '_ {
        self.records.iter().map(FeatureRecord::cells)
    }

    /// Every output column with its cells, in header order.
    pub fn columns(&self) -> Vec<(String, Vec<Cell>)> {
        let headers = self.headers();
        let mut columns: Vec<Vec<Cell>> =
            vec![Vec::with_capacity(self.records.len()); headers.len()];
        for row in self.rows() {
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }
        headers.into_iter().zip(columns).collect()
    }
}
