//! Table writers. Every file is written to a temporary sibling and renamed
//! into place, so a crashed run never leaves a half-written table.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ExtractError;
use crate::geographic::{geographic_summary, GEOGRAPHIC_COLUMN};
use crate::record::LayerTable;
use crate::stats::{LayerStatistics, STATISTICS_COLUMNS};

pub const LAYERS_DIR: &str = "layers";
pub const STATISTICS_DIR: &str = "statistics";
pub const GEOGRAPHIC_DIR: &str = "geographic";

/// Write `path` atomically. `write` fills a temporary file created in the
/// destination directory; the file replaces `path` only if it succeeds.
pub fn persist_with<F>(path: &Path, write: F) -> Result<(), ExtractError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), ExtractError>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| ExtractError::io(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExtractError::io(dir, e))?;
    write(&mut tmp)?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| ExtractError::io(path, e))?;
    tmp.persist(path).map_err(|e| ExtractError::io(path, e.error))?;
    Ok(())
}

/// Atomically write raw bytes.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExtractError> {
    persist_with(path, |tmp| {
        tmp.write_all(bytes).map_err(|e| ExtractError::io(path, e))
    })
}

/// Atomically write a CSV table.
pub fn write_csv<I>(path: &Path, headers: &[String], rows: I) -> Result<(), ExtractError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let csv_err = |source| ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    };
    persist_with(path, |tmp| {
        let mut w = csv::Writer::from_writer(tmp);
        w.write_record(headers).map_err(csv_err)?;
        for row in rows {
            w.write_record(&row).map_err(csv_err)?;
        }
        w.flush().map_err(|e| ExtractError::io(path, e))
    })
}

/// Output locations of one network.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layers_dir(&self) -> PathBuf {
        self.root.join(LAYERS_DIR)
    }

    pub fn layer_csv(&self, layer: &str) -> PathBuf {
        self.layers_dir().join(format!("{layer}.csv"))
    }

    pub fn statistics_csv(&self, layer: &str) -> PathBuf {
        self.root.join(STATISTICS_DIR).join(format!("{layer}.csv"))
    }

    pub fn geographic_csv(&self, layer: &str) -> PathBuf {
        self.root.join(GEOGRAPHIC_DIR).join(format!("{layer}.csv"))
    }
}

pub fn write_layer(path: &Path, table: &LayerTable) -> Result<(), ExtractError> {
    let rows = table
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect());
    write_csv(path, &table.headers(), rows)
}

pub fn write_statistics(path: &Path, stats: &LayerStatistics) -> Result<(), ExtractError> {
    let headers: Vec<String> = STATISTICS_COLUMNS.iter().map(|c| c.to_string()).collect();
    write_csv(path, &headers, stats.columns.iter().map(|c| c.record()))
}

/// Layer table plus the geographic extent column.
pub fn write_geographic(path: &Path, table: &LayerTable) -> Result<(), ExtractError> {
    let mut headers = table.headers();
    headers.push(GEOGRAPHIC_COLUMN.to_string());
    let rows = table.records.iter().map(|record| {
        let mut row: Vec<String> = record.cells().iter().map(ToString::to_string).collect();
        row.push(geographic_summary(record.bounds));
        row
    });
    write_csv(path, &headers, rows)
}
