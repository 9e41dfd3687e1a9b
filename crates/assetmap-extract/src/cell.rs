//! Tagged attribute values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;
use std::fmt;

/// Text values counted as empty alongside [`Cell::Missing`].
pub const BLANK_SENTINELS: [&str; 4] = ["", " ", "NA", "None"];

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// One attribute value of a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDateTime),
    Missing,
}

/// Hashable identity of a non-missing cell, used for distinct counts.
/// Numbers compare by value across the two numeric variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Number(u64),
    Text(String),
    Date(NaiveDateTime),
}

impl Cell {
    /// Map a GeoJSON property value. Strings in an accepted date layout
    /// become [`Cell::Date`]; integers beyond `i64` keep their exact digits
    /// as text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Integer(i)
                } else if n.is_u64() {
                    Cell::Text(n.to_string())
                } else {
                    n.as_f64().map(Cell::Decimal).unwrap_or(Cell::Missing)
                }
            }
            Value::String(s) => match parse_date(s) {
                Some(d) => Cell::Date(d),
                None => Cell::Text(s.clone()),
            },
            nested => Cell::Text(nested.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Missing, or text that is one of [`BLANK_SENTINELS`].
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Text(s) => BLANK_SENTINELS.contains(&s.as_str()),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<CellKey> {
        match self {
            Cell::Integer(_) | Cell::Decimal(_) => {
                let v = self.as_f64()?;
                // -0.0 and 0.0 are the same value.
                let v = if v == 0.0 { 0.0 } else { v };
                Some(CellKey::Number(v.to_bits()))
            }
            Cell::Text(s) => Some(CellKey::Text(s.clone())),
            Cell::Date(d) => Some(CellKey::Date(*d)),
            Cell::Missing => None,
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Decimal).unwrap_or(Cell::Missing)
    }
}

impl fmt::Display for Cell {
    /// CSV rendering; missing cells are empty fields and dates at midnight
    /// drop the time.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Decimal(d) => write!(f, "{d}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Cell::Missing => Ok(()),
        }
    }
}

/// Parse a date or date-time string in one of the accepted layouts.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_map_to_cells() {
        assert_eq!(Cell::from_json(&json!(7)), Cell::Integer(7));
        assert_eq!(Cell::from_json(&json!(-2.5)), Cell::Decimal(-2.5));
        assert_eq!(Cell::from_json(&json!("PVC")), Cell::Text("PVC".into()));
        assert_eq!(Cell::from_json(&json!(true)), Cell::Text("true".into()));
        assert_eq!(Cell::from_json(&json!(null)), Cell::Missing);
        assert_eq!(Cell::from_json(&json!([1, 2])), Cell::Text("[1,2]".into()));
    }

    #[test]
    fn blank_sentinels_count_as_empty() {
        for s in BLANK_SENTINELS {
            assert!(Cell::Text(s.into()).is_blank());
        }
        assert!(Cell::Missing.is_blank());
        assert!(!Cell::Text("n/a".into()).is_blank());
        assert!(!Cell::Integer(0).is_blank());
    }

    #[test]
    fn integer_and_decimal_share_a_key() {
        assert_eq!(Cell::Integer(3).key(), Cell::Decimal(3.0).key());
        assert_ne!(Cell::Integer(3).key(), Cell::Text("3".into()).key());
        assert_eq!(Cell::Missing.key(), None);
    }

    #[test]
    fn renders_for_csv() {
        assert_eq!(Cell::Decimal(1570000.0).to_string(), "1570000");
        assert_eq!(Cell::Decimal(0.25).to_string(), "0.25");
        assert_eq!(Cell::Missing.to_string(), "");
        let d = parse_date("2019-03-04").unwrap();
        assert_eq!(Cell::Date(d).to_string(), "2019-03-04");
        let d = parse_date("2019-03-04T10:20:30").unwrap();
        assert_eq!(Cell::Date(d).to_string(), "2019-03-04 10:20:30");
    }

    #[test]
    fn date_strings_become_date_cells() {
        let cell = Cell::from_json(&json!("2001-05-01"));
        assert_eq!(cell, Cell::Date(parse_date("2001-05-01").unwrap()));
        assert_eq!(cell.to_string(), "2001-05-01");
        assert_eq!(Cell::from_json(&json!("2019-13-45")), Cell::Text("2019-13-45".into()));
        assert_eq!(Cell::from_json(&json!("NA")), Cell::Text("NA".into()));
    }

    #[test]
    fn integers_beyond_i64_keep_their_digits() {
        assert_eq!(
            Cell::from_json(&json!(u64::MAX)),
            Cell::Text("18446744073709551615".into())
        );
        assert_eq!(Cell::from_json(&json!(i64::MIN)), Cell::Integer(i64::MIN));
    }

    #[test]
    fn parses_accepted_date_layouts() {
        for s in [
            "2019-03-04",
            "2019/03/04",
            "04/03/2019",
            "2019-03-04 10:20:30",
            "2019-03-04T10:20:30",
            "04/03/2019 10:20:30",
            "2019-03-04 10:20:30.125",
            "2019-03-04T10:20:30Z",
        ] {
            let parsed = parse_date(s).unwrap_or_else(|| panic!("{s} should parse"));
            assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2019, 3, 4).unwrap());
        }
        assert_eq!(parse_date("PVC"), None);
        assert_eq!(parse_date("2019-13-45"), None);
        assert_eq!(parse_date(""), None);
    }
}
