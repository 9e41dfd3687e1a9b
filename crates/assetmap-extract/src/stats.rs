//! Per-column statistics profile of a layer.

use std::collections::HashSet;
use std::fmt;

use crate::cell::Cell;
use crate::record::LayerTable;

/// Header of a statistics table.
pub const STATISTICS_COLUMNS: [&str; 15] = [
    "Attribute",
    "Count",
    "Not Empty",
    "Empty",
    "Unique",
    "Data Type",
    "Negative",
    "Zeros",
    "Positive",
    "Min",
    "Max",
    "Min Length",
    "Max Length",
    "Commas",
    "Date String",
];

/// Column type, decided by the first non-missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Integer,
    Decimal,
    Date,
    AlphaNumeric,
    /// Every cell is missing.
    NaN,
}

impl InferredType {
    pub fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Missing => None,
            Cell::Integer(_) => Some(InferredType::Integer),
            Cell::Decimal(_) => Some(InferredType::Decimal),
            Cell::Date(_) => Some(InferredType::Date),
            Cell::Text(_) => Some(InferredType::AlphaNumeric),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InferredType::Integer => "Integer",
            InferredType::Decimal => "Decimal",
            InferredType::Date => "Date",
            InferredType::AlphaNumeric => "Alpha / Numeric",
            InferredType::NaN => "NaN",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, InferredType::Integer | InferredType::Decimal)
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregates over numeric cells of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub negative: usize,
    pub zeros: usize,
    pub positive: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Aggregates over text cells of a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSummary {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Cells containing a comma.
    pub commas: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    pub attribute: String,
    pub count: usize,
    pub not_empty: usize,
    pub empty: usize,
    pub unique: usize,
    pub data_type: InferredType,
    pub numeric: Option<NumericSummary>,
    pub text: Option<TextSummary>,
    /// First non-missing value of a date column.
    pub date_string: Option<String>,
}

impl ColumnStatistics {
    pub fn compute(attribute: &str, cells: &[Cell]) -> Self {
        let count = cells.len();
        let empty = cells.iter().filter(|c| c.is_blank()).count();
        let unique = cells.iter().filter_map(Cell::key).collect::<HashSet<_>>().len();
        let first = cells.iter().find(|c| !c.is_missing());
        let data_type = first.and_then(InferredType::of).unwrap_or(InferredType::NaN);

        let numeric = data_type.is_numeric().then(|| numeric_summary(cells));
        let text = (data_type == InferredType::AlphaNumeric).then(|| text_summary(cells));
        let date_string = (data_type == InferredType::Date)
            .then(|| first.map(Cell::to_string))
            .flatten();

        Self {
            attribute: attribute.to_string(),
            count,
            not_empty: count - empty,
            empty,
            unique,
            data_type,
            numeric,
            text,
            date_string,
        }
    }

    /// Fields in [`STATISTICS_COLUMNS`] order; inapplicable ones are empty.
    pub fn record(&self) -> Vec<String> {
        fn opt<T: ToString>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }
        let n = self.numeric.as_ref();
        let t = self.text.as_ref();
        vec![
            self.attribute.clone(),
            self.count.to_string(),
            self.not_empty.to_string(),
            self.empty.to_string(),
            self.unique.to_string(),
            self.data_type.to_string(),
            opt(n.map(|n| n.negative)),
            opt(n.map(|n| n.zeros)),
            opt(n.map(|n| n.positive)),
            opt(n.and_then(|n| n.min)),
            opt(n.and_then(|n| n.max)),
            opt(t.and_then(|t| t.min_length)),
            opt(t.and_then(|t| t.max_length)),
            opt(t.map(|t| t.commas)),
            self.date_string.clone().unwrap_or_default(),
        ]
    }
}

fn numeric_summary(cells: &[Cell]) -> NumericSummary {
    let mut summary = NumericSummary {
        negative: 0,
        zeros: 0,
        positive: 0,
        min: None,
        max: None,
    };
    for v in cells.iter().filter_map(Cell::as_f64) {
        if v < 0.0 {
            summary.negative += 1;
        } else if v == 0.0 {
            summary.zeros += 1;
        } else if v > 0.0 {
            summary.positive += 1;
        }
        summary.min = Some(summary.min.map_or(v, |m| m.min(v)));
        summary.max = Some(summary.max.map_or(v, |m| m.max(v)));
    }
    summary
}

fn text_summary(cells: &[Cell]) -> TextSummary {
    let texts: Vec<&str> = cells.iter().filter_map(Cell::as_text).collect();
    let lengths = texts.iter().map(|s| s.chars().count());
    TextSummary {
        min_length: lengths.clone().min(),
        max_length: lengths.max(),
        commas: texts.iter().filter(|s| s.contains(',')).count(),
    }
}

/// Statistics of every output column of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStatistics {
    pub layer: String,
    pub columns: Vec<ColumnStatistics>,
}

impl LayerStatistics {
    pub fn compute(table: &LayerTable) -> Self {
        let columns = table
            .columns()
            .into_iter()
            .map(|(name, cells)| ColumnStatistics::compute(&name, &cells))
            .collect();
        Self {
            layer: table.name.clone(),
            columns,
        }
    }

    pub fn column(&self, attribute: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.attribute == attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn mixed_integer_column() {
        let cells = [
            Cell::Integer(1),
            Cell::Integer(2),
            text(""),
            Cell::Missing,
            Cell::Integer(5),
        ];
        let s = ColumnStatistics::compute("v", &cells);
        assert_eq!(s.count, 5);
        assert_eq!(s.empty, 2);
        assert_eq!(s.not_empty, 3);
        assert_eq!(s.unique, 4);
        assert_eq!(s.data_type, InferredType::Integer);
        let n = s.numeric.unwrap();
        assert_eq!((n.negative, n.zeros, n.positive), (0, 0, 3));
        assert_eq!((n.min, n.max), (Some(1.0), Some(5.0)));
        assert_eq!(s.text, None);
    }

    #[test]
    fn text_column_lengths_and_commas() {
        let cells = [text("PVC"), text("Concrete, reinforced"), text("NA"), Cell::Missing];
        let s = ColumnStatistics::compute("material", &cells);
        assert_eq!(s.data_type, InferredType::AlphaNumeric);
        assert_eq!(s.empty, 2);
        assert_eq!(
            s.text,
            Some(TextSummary {
                min_length: Some(2),
                max_length: Some(20),
                commas: 1
            })
        );
        assert_eq!(s.numeric, None);
    }

    #[test]
    fn date_column_keeps_first_value() {
        let cells = [
            Cell::Missing,
            Cell::from_json(&serde_json::json!("2015-06-30")),
            text("not a date"),
        ];
        let s = ColumnStatistics::compute("installed", &cells);
        assert_eq!(s.data_type, InferredType::Date);
        assert_eq!(s.date_string.as_deref(), Some("2015-06-30"));
    }

    #[test]
    fn all_missing_column_is_nan() {
        let s = ColumnStatistics::compute("x", &[Cell::Missing, Cell::Missing]);
        assert_eq!(s.data_type, InferredType::NaN);
        assert_eq!(s.unique, 0);
        assert_eq!(s.empty, 2);
        assert_eq!(s.record()[5], "NaN");
    }

    #[test]
    fn record_leaves_inapplicable_fields_empty() {
        let cells = [Cell::Decimal(-1.5), Cell::Decimal(0.0), Cell::Integer(3)];
        let record = ColumnStatistics::compute("depth", &cells).record();
        assert_eq!(record.len(), STATISTICS_COLUMNS.len());
        assert_eq!(
            record,
            [
                "depth", "3", "3", "0", "3", "Decimal", "1", "1", "1", "-1.5", "3", "", "", "",
                ""
            ]
        );
    }
}
