//! Attribute catalogs and codelist tables for either standard.
//!
//! Tables are read from CSV. The canonical headers are the snake_case field
//! names; the column names used by the council asset model workbook and the
//! national standard workbook are accepted as aliases.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::error::AlignError;
use crate::mapping::SchemaEntity;

/// Declared attribute data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Integer,
    Decimal,
    Date,
    AlphaNumeric,
    Unknown,
}

impl DataType {
    /// Normalise a free-text declaration ("Long Integer", "Double",
    /// "Alpha / Numeric", "DateTime", ...).
    pub fn from_declared(declared: &str) -> Self {
        let d = declared.trim().to_ascii_lowercase();
        if d.is_empty() {
            DataType::Unknown
        } else if d.contains("date") {
            DataType::Date
        } else if ["int", "long", "short"].iter().any(|k| d.contains(k)) {
            DataType::Integer
        } else if ["decimal", "double", "float", "real", "numeric", "number"]
            .iter()
            .any(|k| d.contains(k))
            && !d.contains("alpha")
        {
            DataType::Decimal
        } else if ["alpha", "text", "string", "char"].iter().any(|k| d.contains(k)) {
            DataType::AlphaNumeric
        } else {
            DataType::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataType::Integer => "Integer",
            DataType::Decimal => "Decimal",
            DataType::Date => "Date",
            DataType::AlphaNumeric => "Alpha / Numeric",
            DataType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        DataType::from_declared(&value)
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.label().to_string()
    }
}

/// One attribute declared for an asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeCatalogEntry {
    #[serde(alias = "GISModelName", alias = "Asset Class")]
    pub asset_class: String,
    #[serde(alias = "GISAttributeName", alias = "Attribute Name - Abbreviated")]
    pub attribute_name: String,
    #[serde(
        default = "unknown_type",
        alias = "GISAttributeDataType",
        alias = "Data Type"
    )]
    pub data_type: DataType,
    #[serde(default, alias = "CODELIST Reference")]
    pub codelist_reference: Option<String>,
}

fn unknown_type() -> DataType {
    DataType::Unknown
}

impl SchemaEntity for AttributeCatalogEntry {
    fn entity_name(&self) -> &str {
        &self.attribute_name
    }
}

/// One permitted value of a codelist. Source-side tables also record which
/// asset class attribute owns the codelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistEntry {
    #[serde(alias = "GISDomainTableName", alias = "Codelist")]
    pub codelist_name: String,
    #[serde(default, alias = "GISModelName")]
    pub asset_class: Option<String>,
    #[serde(default, alias = "GISAttributeName")]
    pub attribute_name: Option<String>,
    #[serde(alias = "GISDomainValue", alias = "Code")]
    pub value: String,
}

impl SchemaEntity for CodelistEntry {
    fn entity_name(&self) -> &str {
        &self.value
    }
}

fn read_table<T: DeserializeOwned, R: Read>(reader: R, path: &Path) -> Result<Vec<T>, AlignError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record.map_err(|e| AlignError::csv(path, e))?);
    }
    Ok(rows)
}

fn open_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AlignError> {
    let file = std::fs::File::open(path).map_err(|source| AlignError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(file, path)
}

fn push_unique<'a>(out: &mut Vec<&'a str>, seen: &mut HashSet<&'a str>, value: &'a str) {
    if seen.insert(value) {
        out.push(value);
    }
}

/// All attributes of one standard.
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    entries: Vec<AttributeCatalogEntry>,
}

impl AttributeCatalog {
    pub fn new(entries: Vec<AttributeCatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| {
                let keep = !e.asset_class.is_empty() && !e.attribute_name.is_empty();
                if !keep {
                    tracing::warn!(?e, "skipping catalog row without asset class or attribute");
                }
                keep
            })
            .map(|mut e| {
                e.codelist_reference = e.codelist_reference.filter(|c| !c.is_empty());
                e
            })
            .collect();
        Self { entries }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, AlignError> {
        let entries = open_table(path)?;
        Ok(Self::new(entries))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AlignError> {
        let entries = read_table(reader, Path::new("<reader>"))?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[AttributeCatalogEntry] {
        &self.entries
    }

    /// Attribute names of an asset class in catalog order.
    pub fn attributes_of(&self, asset_class: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.asset_class == asset_class)
            .map(|e| e.attribute_name.as_str())
            .collect()
    }

    fn entry(&self, asset_class: &str, attribute: &str) -> Option<&AttributeCatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.asset_class == asset_class && e.attribute_name == attribute)
    }

    /// Declared type of an attribute; the first declaration wins.
    pub fn data_type(&self, asset_class: &str, attribute: &str) -> Option<DataType> {
        self.entry(asset_class, attribute).map(|e| e.data_type)
    }

    /// Codelist referenced by an attribute, if any.
    pub fn codelist_of(&self, asset_class: &str, attribute: &str) -> Option<&str> {
        self.entry(asset_class, attribute)
            .and_then(|e| e.codelist_reference.as_deref())
    }

    /// Distinct codelists referenced by an asset class.
    pub fn codelists_of(&self, asset_class: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for e in self.entries.iter().filter(|e| e.asset_class == asset_class) {
            if let Some(c) = e.codelist_reference.as_deref() {
                push_unique(&mut out, &mut seen, c);
            }
        }
        out
    }

    /// Attribute referencing a codelist. When several do, the last one wins.
    pub fn attribute_for_codelist(&self, asset_class: &str, codelist: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| {
                e.asset_class == asset_class && e.codelist_reference.as_deref() == Some(codelist)
            })
            .map(|e| e.attribute_name.as_str())
    }
}

/// All codelist values of one standard.
#[derive(Debug, Clone, Default)]
pub struct CodelistCatalog {
    entries: Vec<CodelistEntry>,
}

impl CodelistCatalog {
    pub fn new(entries: Vec<CodelistEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.codelist_name.is_empty())
            .map(|mut e| {
                e.asset_class = e.asset_class.filter(|c| !c.is_empty());
                e.attribute_name = e.attribute_name.filter(|a| !a.is_empty());
                e
            })
            .collect();
        Self { entries }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, AlignError> {
        let entries = open_table(path)?;
        Ok(Self::new(entries))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AlignError> {
        let entries = read_table(reader, Path::new("<reader>"))?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CodelistEntry] {
        &self.entries
    }

    /// Values of a codelist in table order (duplicates kept).
    pub fn values_of(&self, codelist: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.codelist_name == codelist)
            .map(|e| e.value.as_str())
            .collect()
    }

    /// Codelist owned by `(asset_class, attribute)`; first row wins.
    pub fn codelist_for(&self, asset_class: &str, attribute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| {
                e.asset_class.as_deref() == Some(asset_class)
                    && e.attribute_name.as_deref() == Some(attribute)
            })
            .map(|e| e.codelist_name.as_str())
    }

    /// Distinct codelists owned by an asset class, in table order.
    pub fn codelists_owned_by(&self, asset_class: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for e in self
            .entries
            .iter()
            .filter(|e| e.asset_class.as_deref() == Some(asset_class))
        {
            push_unique(&mut out, &mut seen, &e.codelist_name);
        }
        out
    }

    /// Attribute of `asset_class` that owns `codelist`.
    pub fn owning_attribute(&self, asset_class: &str, codelist: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.codelist_name == codelist && e.asset_class.as_deref() == Some(asset_class))
            .and_then(|e| e.attribute_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_are_normalised() {
        assert_eq!(DataType::from_declared("Long Integer"), DataType::Integer);
        assert_eq!(DataType::from_declared("Double"), DataType::Decimal);
        assert_eq!(DataType::from_declared("DateTime"), DataType::Date);
        assert_eq!(DataType::from_declared("Alpha / Numeric"), DataType::AlphaNumeric);
        assert_eq!(DataType::from_declared("Alphanumeric"), DataType::AlphaNumeric);
        assert_eq!(DataType::from_declared("Text"), DataType::AlphaNumeric);
        assert_eq!(DataType::from_declared(""), DataType::Unknown);
        assert_eq!(DataType::from_declared("Blob"), DataType::Unknown);
    }

    #[test]
    fn reads_workbook_style_headers() {
        let csv = "\
GISModelName,GISAttributeName,GISAttributeDataType,Notes
SwPipe,SwPipeID,Long Integer,
SwPipe,SwPipeConstruction,Alpha / Numeric,material
";
        let catalog = AttributeCatalog::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(catalog.attributes_of("SwPipe"), vec!["SwPipeID", "SwPipeConstruction"]);
        assert_eq!(catalog.data_type("SwPipe", "SwPipeID"), Some(DataType::Integer));
        assert_eq!(catalog.codelist_of("SwPipe", "SwPipeID"), None);
    }

    #[test]
    fn codelist_lookups() {
        let csv = "\
codelist_name,asset_class,attribute_name,value
domSwPipeConstruction,SwPipe,SwPipeConstruction,PVC
domSwPipeConstruction,SwPipe,SwPipeConstruction,CONC
domSwPipeShape,SwPipe,SwPipeShape,CIRC
domSwValveType,SwValve,SwValveType,GATE
";
        let codes = CodelistCatalog::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(codes.values_of("domSwPipeConstruction"), vec!["PVC", "CONC"]);
        assert_eq!(
            codes.codelist_for("SwPipe", "SwPipeShape"),
            Some("domSwPipeShape")
        );
        assert_eq!(
            codes.codelists_owned_by("SwPipe"),
            vec!["domSwPipeConstruction", "domSwPipeShape"]
        );
        assert_eq!(
            codes.owning_attribute("SwPipe", "domSwPipeShape"),
            Some("SwPipeShape")
        );
    }

    #[test]
    fn target_code_tables_need_no_owner_columns() {
        let csv = "Codelist,Code\nMaterial,PVC\nMaterial,CONCRETE\n";
        let codes = CodelistCatalog::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(codes.values_of("Material"), vec!["PVC", "CONCRETE"]);
        assert!(codes.codelists_owned_by("Pipe").is_empty());
    }
}
