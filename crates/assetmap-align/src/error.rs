use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AlignError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
