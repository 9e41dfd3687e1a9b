//! Feature extraction for asset networks.
//!
//! Reads every layer of a [`FeatureContainer`], flattens each feature into a
//! [`FeatureRecord`] with geometry-derived bounds, and writes per layer:
//!
//! - `layers/<layer>.csv`: one row per feature
//! - `statistics/<layer>.csv`: one row per column
//! - `geographic/<layer>.csv`: designated layers only, with a WGS84 extent
//!
//! A malformed feature never aborts a layer; its geometry columns are left
//! empty and a warning is logged.

pub mod cell;
pub mod container;
pub mod error;
pub mod geographic;
pub mod geometry;
pub mod output;
pub mod record;
pub mod stats;

use std::collections::BTreeSet;

pub use cell::{parse_date, Cell};
pub use container::{FeatureContainer, FeatureGeometry, GeoJsonDirectory, RawFeature, RawLayer};
pub use error::{ExtractError, GeometryError};
pub use geographic::geographic_summary;
pub use geometry::{Bounds, GeometryKind};
pub use output::OutputLayout;
pub use record::{FeatureRecord, LayerTable, Progress, FIXED_COLUMNS};
pub use stats::{ColumnStatistics, InferredType, LayerStatistics};

/// What to write and where.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub layout: OutputLayout,
    /// Layers that also get a geographic summary table.
    pub geographic_layers: BTreeSet<String>,
}

/// Counts for the run log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub layers_written: usize,
    pub empty_layers: Vec<String>,
    pub features: usize,
    pub geographic_tables: usize,
}

/// Extract one layer into a table plus its statistics. `None` for an empty
/// layer.
pub fn extract_layer(
    container: &dyn FeatureContainer,
    name: &str,
    progress: Progress,
) -> Result<Option<(LayerTable, LayerStatistics)>, ExtractError> {
    let raw = container.read_layer(name)?;
    if raw.features.is_empty() {
        return Ok(None);
    }
    let table = LayerTable::from_raw(raw, progress);
    let stats = LayerStatistics::compute(&table);
    Ok(Some((table, stats)))
}

/// Extract every layer of `container` and write its tables.
pub fn run_extraction(
    container: &dyn FeatureContainer,
    options: &ExtractOptions,
) -> Result<ExtractSummary, ExtractError> {
    let names = container.layer_names()?;
    let layer_count = names.len();
    tracing::info!(
        output = %options.layout.root().display(),
        layers = layer_count,
        "starting extraction"
    );

    let mut summary = ExtractSummary::default();
    for (i, name) in names.iter().enumerate() {
        let progress = Progress {
            layer_index: i + 1,
            layer_count,
        };
        let Some((table, stats)) = extract_layer(container, name, progress)? else {
            tracing::info!(layer = %name, "layer is empty, skipping");
            summary.empty_layers.push(name.clone());
            continue;
        };

        output::write_layer(&options.layout.layer_csv(name), &table)?;
        output::write_statistics(&options.layout.statistics_csv(name), &stats)?;
        if options.geographic_layers.contains(name) {
            tracing::info!(layer = %name, "writing geographic summary");
            output::write_geographic(&options.layout.geographic_csv(name), &table)?;
            summary.geographic_tables += 1;
        }

        summary.layers_written += 1;
        summary.features += table.records.len();
    }

    for missing in options
        .geographic_layers
        .iter()
        .filter(|l| !names.contains(l))
    {
        tracing::warn!(layer = %missing, "geographic layer not found in container");
    }

    tracing::info!(
        layers = summary.layers_written,
        empty = summary.empty_layers.len(),
        features = summary.features,
        "extraction complete"
    );
    Ok(summary)
}
