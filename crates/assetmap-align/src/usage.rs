//! Live usage of codelist values, counted from extracted layer tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AlignError;
use crate::mapping::AUTO_MATCH_THRESHOLD;
use crate::similarity::best_match;

/// A flat layer table as written by the extractor (all cells as text).
#[derive(Debug, Clone, Default)]
pub struct LayerTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LayerTable {
    pub fn from_csv_path(path: &Path) -> Result<Self, AlignError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| AlignError::csv(path, e))?;
        let headers = rdr
            .headers()
            .map_err(|e| AlignError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| AlignError::csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Occurrences of each non-empty value in a column.
    pub fn value_counts(&self, column: usize) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for row in &self.rows {
            match row.get(column) {
                Some(v) if !v.is_empty() => *counts.entry(v.clone()).or_insert(0) += 1,
                _ => {}
            }
        }
        counts
    }

    /// Column holding an attribute: exact header if present, otherwise the
    /// most similar header.
    pub fn resolve_column(&self, attribute: &str) -> Option<usize> {
        if let Some(i) = self.column(attribute) {
            return Some(i);
        }
        let best = best_match(attribute, &self.headers).ok()?;
        (best.score > AUTO_MATCH_THRESHOLD).then_some(best.index)
    }
}

/// Layer table files (`*.csv`) in a directory, sorted by name.
pub fn list_layer_tables(dir: &Path) -> Result<Vec<PathBuf>, AlignError> {
    let io_err = |source| AlignError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|e| e == "csv") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Pick the layer table for an asset class. Only stems containing the class
/// name (case-insensitive) qualify, e.g. `SwPipe` → `vwOpenDataSwPipe.csv`;
/// among those the most similar stem wins.
pub fn pick_layer_table<'a>(asset_class: &str, paths: &'a [PathBuf]) -> Option<&'a Path> {
    let needle = asset_class.to_uppercase();
    let candidates: Vec<(&'a Path, String)> = paths
        .iter()
        .filter_map(|p| {
            let stem = p.file_stem()?.to_string_lossy().to_uppercase();
            stem.contains(&needle).then(|| (p.as_path(), stem))
        })
        .collect();
    if candidates.is_empty() {
        if !paths.is_empty() {
            tracing::warn!(asset_class, "no layer table named after asset class");
        }
        return None;
    }
    let stems: Vec<&str> = candidates.iter().map(|(_, stem)| stem.as_str()).collect();
    let best = best_match(&needle, &stems).ok()?;
    Some(candidates[best.index].0)
}

/// Per-codelist value counts.
#[derive(Debug, Clone, Default)]
pub struct UsageCounts {
    by_codelist: HashMap<String, HashMap<String, usize>>,
}

impl UsageCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count values of each `(codelist, owning attribute)` in `table`.
    /// Codelists without a resolvable column are left uncounted.
    pub fn from_layer<'a>(
        table: &LayerTable,
        codelists: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut usage = Self::new();
        for (codelist, attribute) in codelists {
            match table.resolve_column(attribute) {
                Some(column) => {
                    tracing::debug!(
                        layer = %table.name,
                        codelist,
                        column = %table.headers[column],
                        "counting codelist usage"
                    );
                    usage.record(codelist, table.value_counts(column));
                }
                None => {
                    tracing::warn!(
                        layer = %table.name,
                        codelist,
                        attribute,
                        "no column for codelist"
                    );
                }
            }
        }
        usage
    }

    pub fn record(&mut self, codelist: &str, counts: HashMap<String, usize>) {
        let slot = self.by_codelist.entry(codelist.to_string()).or_default();
        for (value, n) in counts {
            *slot.entry(value).or_insert(0) += n;
        }
    }

    /// Records using `value` from `codelist`; `None` when the codelist was
    /// never counted, `Some(0)` when it was but the value is unused.
    pub fn count(&self, codelist: &str, value: &str) -> Option<usize> {
        self.by_codelist
            .get(codelist)
            .map(|counts| counts.get(value).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::ratio;

    fn table() -> LayerTable {
        LayerTable {
            name: "vwOpenDataSwPipe".into(),
            headers: vec!["layer".into(), "id".into(), "SwPipeConstruction".into()],
            rows: vec![
                vec!["l".into(), "1".into(), "PVC".into()],
                vec!["l".into(), "2".into(), "PVC".into()],
                vec!["l".into(), "3".into(), "".into()],
                vec!["l".into(), "4".into(), "CONC".into()],
            ],
        }
    }

    #[test]
    fn counts_values_of_the_owning_column() {
        let usage = UsageCounts::from_layer(
            &table(),
            [("domSwPipeConstruction", "SwPipeConstruction")],
        );
        assert_eq!(usage.count("domSwPipeConstruction", "PVC"), Some(2));
        assert_eq!(usage.count("domSwPipeConstruction", "CONC"), Some(1));
        assert_eq!(usage.count("domSwPipeConstruction", "GRP"), Some(0));
        assert_eq!(usage.count("domOther", "PVC"), None);
    }

    #[test]
    fn falls_back_to_most_similar_header() {
        let t = table();
        assert_eq!(t.resolve_column("SwPipeConstructionMaterial"), Some(2));
    }

    #[test]
    fn picks_layer_by_class_name() {
        let paths = vec![
            PathBuf::from("layers/vwOpenDataSwAccess.csv"),
            PathBuf::from("layers/vwOpenDataSwPipe.csv"),
        ];
        assert_eq!(
            pick_layer_table("SwPipe", &paths),
            Some(Path::new("layers/vwOpenDataSwPipe.csv"))
        );
        assert_eq!(pick_layer_table("SwPipe", &[]), None);
    }

    #[test]
    fn unrelated_layers_are_never_picked() {
        let paths = vec![PathBuf::from("layers/vwOpenDataSwPipe.csv")];
        // "SwManhole" scores above the auto-match threshold against this stem.
        assert!(ratio("SwManhole", "vwOpenDataSwPipe") > AUTO_MATCH_THRESHOLD);
        assert_eq!(pick_layer_table("SwManhole", &paths), None);
    }

    #[test]
    fn closest_stem_wins_among_layers_naming_the_class() {
        let paths = vec![
            PathBuf::from("layers/vwOpenDataSwPipeLateral.csv"),
            PathBuf::from("layers/vwOpenDataSwPipe.csv"),
            PathBuf::from("layers/VWOPENDATASWPIPE_OLD.csv"),
        ];
        assert_eq!(
            pick_layer_table("swpipe", &paths),
            Some(Path::new("layers/vwOpenDataSwPipe.csv"))
        );
    }
}
