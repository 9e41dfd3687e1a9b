//! Schema alignment between a council GIS asset model and a national
//! asset-metadata standard.
//!
//! - Asset classes and attributes are compared through curated overrides.
//! - Codelist values are auto-mapped by character-sequence similarity.
//! - Every compared pair becomes a [`Correspondence`] classified as match,
//!   rename, or present on one side only.
//!
//! Catalog and codelist tables are CSV inputs; live codelist usage is counted
//! from the layer tables the extractor writes.

pub mod catalog;
pub mod correspondence;
pub mod error;
pub mod gap;
pub mod mapping;
pub mod overrides;
pub mod similarity;
pub mod usage;

pub use catalog::{
    AttributeCatalog, AttributeCatalogEntry, CodelistCatalog, CodelistEntry, DataType,
};
pub use correspondence::{Classification, Correspondence, SideLabels};
pub use error::AlignError;
pub use gap::{GapContext, GapReport, ReportCell, ReportTable};
pub use mapping::{auto_map, compare, override_map, SchemaEntity, Strategy, AUTO_MATCH_THRESHOLD};
pub use overrides::{NetworkOverrides, OverrideMap};
pub use similarity::{best_match, ratio, BestMatch, SequenceMatcher};
pub use usage::{LayerTable, UsageCounts};
