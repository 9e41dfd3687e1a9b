use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is not a GeoJSON FeatureCollection", path.display())]
    NotAFeatureCollection { path: PathBuf },

    #[error("no layer named {0:?}")]
    UnknownLayer(String),
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a single feature's geometry could not be read. Never fatal: the
/// feature is kept with null geometry columns.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("geometry has no \"type\" member")]
    MissingType,

    #[error("unsupported geometry type {0:?}")]
    UnknownType(String),

    #[error("malformed coordinates for {0}")]
    BadCoordinates(&'static str),
}
