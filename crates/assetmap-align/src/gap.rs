//! Gap analysis for one asset class: asset, attribute, codelist-name and
//! codelist-value views.

use serde::Serialize;
use std::collections::HashSet;

use crate::catalog::{AttributeCatalog, CodelistCatalog, DataType};
use crate::correspondence::{Correspondence, SideLabels};
use crate::mapping::{compare, Strategy};
use crate::overrides::OverrideMap;
use crate::usage::UsageCounts;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRow {
    pub correspondence: Correspondence,
    pub source_data_type: Option<DataType>,
    pub target_data_type: Option<DataType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodelistRow {
    pub source_attribute: Option<String>,
    pub target_attribute: Option<String>,
    /// Codelist names.
    pub correspondence: Correspondence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodelistValueRow {
    pub source_attribute: Option<String>,
    pub target_attribute: Option<String>,
    pub source_codelist: Option<String>,
    pub target_codelist: Option<String>,
    /// Codelist values.
    pub correspondence: Correspondence,
    /// Live records using the source value.
    pub usage: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub source_class: String,
    pub target_class: String,
    pub assets: Vec<Correspondence>,
    pub attributes: Vec<AttributeRow>,
    pub codelists: Vec<CodelistRow>,
    pub values: Vec<CodelistValueRow>,
}

/// Both standards' catalogs.
#[derive(Debug, Clone, Copy)]
pub struct GapContext<'a> {
    pub source_attributes: &'a AttributeCatalog,
    pub target_attributes: &'a AttributeCatalog,
    pub source_codelists: &'a CodelistCatalog,
    pub target_codelists: &'a CodelistCatalog,
}

impl<'a> GapContext<'a> {
    /// `(codelist, owning attribute)` pairs of a source asset class, for
    /// usage counting.
    pub fn owned_codelists(&self, source_class: &str) -> Vec<(&'a str, &'a str)> {
        self.source_codelists
            .codelists_owned_by(source_class)
            .into_iter()
            .filter_map(|codelist| {
                self.source_codelists
                    .owning_attribute(source_class, codelist)
                    .map(|attribute| (codelist, attribute))
            })
            .collect()
    }

    pub fn analyze(
        &self,
        source_class: &str,
        target_class: &str,
        attribute_overrides: &OverrideMap,
        usage: &UsageCounts,
    ) -> GapReport {
        let class_override: OverrideMap = [(source_class, target_class)].into_iter().collect();
        let assets = compare(
            &[source_class],
            &[target_class],
            Strategy::Override(&class_override),
        );

        let attributes = self.attribute_view(source_class, target_class, attribute_overrides);
        let codelists = self.codelist_view(source_class, target_class, &attributes);
        let values = self.value_view(source_class, target_class, &codelists, usage);

        tracing::info!(
            source_class,
            target_class,
            attributes = attributes.len(),
            codelists = codelists.len(),
            values = values.len(),
            "gap analysis complete"
        );

        GapReport {
            source_class: source_class.to_string(),
            target_class: target_class.to_string(),
            assets,
            attributes,
            codelists,
            values,
        }
    }

    fn attribute_view(
        &self,
        source_class: &str,
        target_class: &str,
        overrides: &OverrideMap,
    ) -> Vec<AttributeRow> {
        let sources = self.source_attributes.attributes_of(source_class);
        let targets = self.target_attributes.attributes_of(target_class);
        compare(&sources, &targets, Strategy::Override(overrides))
            .into_iter()
            .map(|c| AttributeRow {
                source_data_type: c
                    .source()
                    .and_then(|a| self.source_attributes.data_type(source_class, a)),
                target_data_type: c
                    .target()
                    .and_then(|a| self.target_attributes.data_type(target_class, a)),
                correspondence: c,
            })
            .collect()
    }

    fn codelist_view(
        &self,
        source_class: &str,
        target_class: &str,
        attributes: &[AttributeRow],
    ) -> Vec<CodelistRow> {
        attributes
            .iter()
            .filter_map(|row| {
                let source_attribute = row.correspondence.source();
                let target_attribute = row.correspondence.target();
                let source_codelist = source_attribute
                    .and_then(|a| self.source_codelists.codelist_for(source_class, a));
                let target_codelist = target_attribute
                    .and_then(|a| self.target_attributes.codelist_of(target_class, a));
                let correspondence = Correspondence::from_options(
                    source_codelist.map(str::to_string),
                    target_codelist.map(str::to_string),
                )?;
                Some(CodelistRow {
                    source_attribute: source_attribute.map(str::to_string),
                    target_attribute: target_attribute.map(str::to_string),
                    correspondence,
                })
            })
            .collect()
    }

    fn value_view(
        &self,
        source_class: &str,
        target_class: &str,
        codelists: &[CodelistRow],
        usage: &UsageCounts,
    ) -> Vec<CodelistValueRow> {
        // Source codelist → target codelist; a repeated source keeps its first
        // position and takes the latest target.
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        for row in codelists {
            let (Some(s), Some(t)) = (row.correspondence.source(), row.correspondence.target())
            else {
                continue;
            };
            match pairs.iter_mut().find(|(k, _)| *k == s) {
                Some(pair) => pair.1 = t,
                None => pairs.push((s, t)),
            }
        }

        let row_for = |source_codelist: Option<&str>,
                       target_codelist: Option<&str>,
                       correspondence: Correspondence| {
            let count = match (source_codelist, correspondence.source()) {
                (Some(cl), Some(value)) => usage.count(cl, value),
                _ => None,
            };
            CodelistValueRow {
                source_attribute: source_codelist
                    .and_then(|cl| self.source_codelists.owning_attribute(source_class, cl))
                    .map(str::to_string),
                target_attribute: target_codelist
                    .and_then(|cl| self.target_attributes.attribute_for_codelist(target_class, cl))
                    .map(str::to_string),
                source_codelist: source_codelist.map(str::to_string),
                target_codelist: target_codelist.map(str::to_string),
                correspondence,
                usage: count,
            }
        };

        let mut rows = Vec::new();
        for &(source_codelist, target_codelist) in &pairs {
            let source_values = self.source_codelists.values_of(source_codelist);
            let target_values = self.target_codelists.values_of(target_codelist);
            for c in compare(&source_values, &target_values, Strategy::Auto) {
                rows.push(row_for(Some(source_codelist), Some(target_codelist), c));
            }
        }

        let paired_targets: HashSet<&str> = pairs.iter().map(|&(_, t)| t).collect();
        for codelist in self.target_attributes.codelists_of(target_class) {
            if paired_targets.contains(codelist) {
                continue;
            }
            for value in self.target_codelists.values_of(codelist) {
                rows.push(row_for(None, Some(codelist), Correspondence::target_only(value)));
            }
        }

        let paired_sources: HashSet<&str> = pairs.iter().map(|&(s, _)| s).collect();
        for codelist in self.source_codelists.codelists_owned_by(source_class) {
            if paired_sources.contains(codelist) {
                continue;
            }
            for value in self.source_codelists.values_of(codelist) {
                rows.push(row_for(Some(codelist), None, Correspondence::source_only(value)));
            }
        }

        rows
    }
}

/// Renderable cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Text(String),
    Number(f64),
    Empty,
}

impl ReportCell {
    pub fn as_text(&self) -> String {
        match self {
            ReportCell::Text(s) => s.clone(),
            ReportCell::Number(n) => n.to_string(),
            ReportCell::Empty => String::new(),
        }
    }
}

/// One sheet of a rendered report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub name: &'static str,
    pub column_width: f64,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

fn text(s: impl Into<String>) -> ReportCell {
    ReportCell::Text(s.into())
}

fn or_absent(value: Option<&str>, absent: impl FnOnce() -> String) -> ReportCell {
    match value {
        Some(v) => text(v),
        None => text(absent()),
    }
}

impl GapReport {
    /// Asset, Attributes, Codelist name and Codelist Values sheets, with
    /// absent cells spelled out as `<Kind> Not in <Label>.`
    pub fn tables(&self, labels: &SideLabels) -> Vec<ReportTable> {
        let (s, t) = (labels.source.as_str(), labels.target.as_str());
        let source_class = || text(&self.source_class);
        let target_class = || text(&self.target_class);

        let assets = ReportTable {
            name: "Asset",
            column_width: 30.0,
            headers: vec![s.to_string(), t.to_string(), "Content".to_string()],
            rows: self
                .assets
                .iter()
                .map(|c| {
                    vec![
                        or_absent(c.source(), || labels.not_in_source("Asset Class")),
                        or_absent(c.target(), || labels.not_in_target("Asset Class")),
                        text(c.classification().label(labels)),
                    ]
                })
                .collect(),
        };

        let attributes = ReportTable {
            name: "Attributes",
            column_width: 25.0,
            headers: vec![
                format!("{s} Asset Class"),
                format!("{s} Attribute"),
                "Content".to_string(),
                format!("{t} Asset Class"),
                format!("{t} Attribute"),
                format!("{s} Attribute Data Type"),
                format!("{t} Attribute Data Type"),
            ],
            rows: self
                .attributes
                .iter()
                .map(|r| {
                    let c = &r.correspondence;
                    let data_type = |d: Option<DataType>| {
                        d.map(|d| text(d.label())).unwrap_or(ReportCell::Empty)
                    };
                    vec![
                        source_class(),
                        or_absent(c.source(), || labels.not_in_source("Attribute")),
                        text(c.classification().label(labels)),
                        target_class(),
                        or_absent(c.target(), || labels.not_in_target("Attribute")),
                        data_type(r.source_data_type),
                        data_type(r.target_data_type),
                    ]
                })
                .collect(),
        };

        let codelists = ReportTable {
            name: "Codelist name",
            column_width: 25.0,
            headers: vec![
                format!("{s} Asset Class"),
                format!("{s} Attribute"),
                format!("{s} Codelist"),
                "Content".to_string(),
                format!("{t} Asset Class"),
                format!("{t} Attribute"),
                format!("{t} Codelist"),
            ],
            rows: self
                .codelists
                .iter()
                .map(|r| {
                    let c = &r.correspondence;
                    vec![
                        source_class(),
                        or_absent(r.source_attribute.as_deref(), || {
                            labels.not_in_source("Attribute")
                        }),
                        or_absent(c.source(), || labels.not_in_source("Code List")),
                        text(c.classification().label(labels)),
                        target_class(),
                        or_absent(r.target_attribute.as_deref(), || {
                            labels.not_in_target("Attribute")
                        }),
                        or_absent(c.target(), || labels.not_in_target("Code List")),
                    ]
                })
                .collect(),
        };

        let values = ReportTable {
            name: "Codelist Values",
            column_width: 20.0,
            headers: vec![
                format!("{s} Asset Class"),
                format!("{s} Attribute"),
                format!("{s} Codelist"),
                format!("{s} Codelist Value"),
                "Content".to_string(),
                format!("{t} Asset Class"),
                format!("{t} Attribute"),
                format!("{t} Codelist"),
                format!("{t} Codelist Value"),
                "Similarity".to_string(),
                "Statistics".to_string(),
            ],
            rows: self
                .values
                .iter()
                .map(|r| {
                    let c = &r.correspondence;
                    vec![
                        source_class(),
                        or_absent(r.source_attribute.as_deref(), || {
                            labels.not_in_source("Attribute")
                        }),
                        or_absent(r.source_codelist.as_deref(), || {
                            labels.not_in_source("CodeList Name")
                        }),
                        or_absent(c.source(), || labels.not_in_source("CodeList Value")),
                        text(c.classification().label(labels)),
                        target_class(),
                        or_absent(r.target_attribute.as_deref(), || {
                            labels.not_in_target("Attribute")
                        }),
                        or_absent(r.target_codelist.as_deref(), || {
                            labels.not_in_target("CodeList Name")
                        }),
                        or_absent(c.target(), || labels.not_in_target("CodeList Value")),
                        c.similarity()
                            .map(ReportCell::Number)
                            .unwrap_or(ReportCell::Empty),
                        r.usage
                            .map(|n| ReportCell::Number(n as f64))
                            .unwrap_or(ReportCell::Empty),
                    ]
                })
                .collect(),
        };

        vec![assets, attributes, codelists, values]
    }
}
