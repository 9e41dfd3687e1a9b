//! `assetmap map`: per asset class gap analysis against the target standard.

use anyhow::{Context, Result};
use assetmap_align::usage::{list_layer_tables, pick_layer_table};
use assetmap_align::{
    AttributeCatalog, CodelistCatalog, GapContext, LayerTable, OverrideMap, UsageCounts,
};
use colored::Colorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::{NetworkConfig, ProjectConfig, ReportFormat};
use crate::report::write_report;

/// Both standards' catalogs, loaded once per run.
pub struct Catalogs {
    pub source_attributes: AttributeCatalog,
    pub target_attributes: AttributeCatalog,
    pub source_codelists: CodelistCatalog,
    pub target_codelists: CodelistCatalog,
}

impl Catalogs {
    pub fn load(config: &ProjectConfig) -> Result<Self> {
        let paths = &config.catalogs;
        let attributes = |p: &Path| {
            AttributeCatalog::from_csv_path(p)
                .with_context(|| format!("loading attribute catalog {}", p.display()))
        };
        let codelists = |p: &Path| {
            CodelistCatalog::from_csv_path(p)
                .with_context(|| format!("loading codelist table {}", p.display()))
        };
        Ok(Self {
            source_attributes: attributes(paths.source_attributes.as_path())?,
            target_attributes: attributes(paths.target_attributes.as_path())?,
            source_codelists: codelists(paths.source_codelists.as_path())?,
            target_codelists: codelists(paths.target_codelists.as_path())?,
        })
    }

    pub fn context(&self) -> GapContext<'_> {
        GapContext {
            source_attributes: &self.source_attributes,
            target_attributes: &self.target_attributes,
            source_codelists: &self.source_codelists,
            target_codelists: &self.target_codelists,
        }
    }
}

/// Outcome of one asset class.
pub struct ClassResult {
    pub source_class: String,
    pub result: Result<PathBuf>,
}

/// Map every selected network; returns the number of failed asset classes.
pub fn cmd_map(config: &ProjectConfig, only: Option<&str>, format: ReportFormat) -> Result<usize> {
    let catalogs = Catalogs::load(config)?;
    let mut failures = 0;

    for network in config.selected_networks(only) {
        println!("{} {}", "Mapping".green().bold(), network.display_name());
        for class in map_network(config, &catalogs, network, format) {
            match class.result {
                Ok(path) => println!("  {} {}", "wrote".green(), path.display()),
                Err(err) => {
                    failures += 1;
                    tracing::error!(
                        network = %network.display_name(),
                        asset_class = %class.source_class,
                        error = %format!("{err:#}"),
                        "gap analysis failed"
                    );
                    eprintln!(
                        "  {} {}: {err:#}",
                        "failed".red().bold(),
                        class.source_class
                    );
                }
            }
        }
    }
    Ok(failures)
}

/// Asset classes run in parallel; results come back in override order.
pub fn map_network(
    config: &ProjectConfig,
    catalogs: &Catalogs,
    network: &NetworkConfig,
    format: ReportFormat,
) -> Vec<ClassResult> {
    let layers_dir = config.layout(network).layers_dir();
    let layer_paths = if layers_dir.is_dir() {
        list_layer_tables(&layers_dir).unwrap_or_else(|err| {
            tracing::warn!(dir = %layers_dir.display(), error = %err, "cannot list layer tables");
            Vec::new()
        })
    } else {
        tracing::warn!(
            dir = %layers_dir.display(),
            "no extracted layers, usage counts will be empty"
        );
        Vec::new()
    };

    let mapping_dir = config.mapping_dir(network);
    let ctx = catalogs.context();
    let classes: Vec<(&str, &str)> = network.overrides.asset_classes.iter().collect();

    classes
        .par_iter()
        .map(|&(source_class, target_class)| {
            let job = ClassJob {
                ctx,
                labels: &config.labels,
                source_class,
                target_class,
                attribute_overrides: network.overrides.attributes_for(source_class),
                layer_paths: &layer_paths,
                path: mapping_dir.join(format!("{source_class}.gap.{}", format.extension())),
                format,
            };
            ClassResult {
                source_class: source_class.to_string(),
                result: job.run(),
            }
        })
        .collect()
}

struct ClassJob<'a> {
    ctx: GapContext<'a>,
    labels: &'a assetmap_align::SideLabels,
    source_class: &'a str,
    target_class: &'a str,
    attribute_overrides: OverrideMap,
    layer_paths: &'a [PathBuf],
    path: PathBuf,
    format: ReportFormat,
}

impl ClassJob<'_> {
    fn run(&self) -> Result<PathBuf> {
        let usage = self.usage()?;
        let report = self.ctx.analyze(
            self.source_class,
            self.target_class,
            &self.attribute_overrides,
            &usage,
        );
        write_report(&self.path, &report, self.labels, self.format)?;
        Ok(self.path.clone())
    }

    fn usage(&self) -> Result<UsageCounts> {
        let Some(path) = pick_layer_table(self.source_class, self.layer_paths) else {
            tracing::warn!(asset_class = self.source_class, "no layer table for asset class");
            return Ok(UsageCounts::new());
        };
        tracing::debug!(asset_class = self.source_class, layer = %path.display(), "counting usage");
        let table = LayerTable::from_csv_path(path)
            .with_context(|| format!("reading layer table {}", path.display()))?;
        Ok(UsageCounts::from_layer(
            &table,
            self.ctx.owned_codelists(self.source_class),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project(dir: &Path) -> ProjectConfig {
        write(
            dir,
            "cat/ccc_attributes.csv",
            "asset_class,attribute_name,data_type,codelist_reference\n\
             SwPipe,SwPipeID,Long Integer,\n\
             SwPipe,SwPipeConstruction,String,\n",
        );
        write(
            dir,
            "cat/linz_attributes.csv",
            "asset_class,attribute_name,data_type,codelist_reference\n\
             Pipe,Unique_ID,Integer,\n\
             Pipe,Material,Alpha / Numeric,Pipe_Material\n",
        );
        write(
            dir,
            "cat/ccc_codelists.csv",
            "codelist_name,asset_class,attribute_name,value\n\
             domSwPipeConstruction,SwPipe,SwPipeConstruction,PVC\n\
             domSwPipeConstruction,SwPipe,SwPipeConstruction,CONC\n",
        );
        write(
            dir,
            "cat/linz_codelists.csv",
            "codelist_name,asset_class,attribute_name,value\n\
             Pipe_Material,,,PVC\n\
             Pipe_Material,,,Concrete\n",
        );
        write(
            dir,
            "out/CCC/Stormwater/layers/vwOpenDataSwPipe.csv",
            "layer,id,SwPipeConstruction\n\
             vwOpenDataSwPipe,0,PVC\n\
             vwOpenDataSwPipe,1,PVC\n\
             vwOpenDataSwPipe,2,CONC\n",
        );
        write(
            dir,
            "project.json",
            r#"{
                "labels": {"source": "CCC", "target": "LINZ"},
                "catalogs": {
                    "source_attributes": "cat/ccc_attributes.csv",
                    "target_attributes": "cat/linz_attributes.csv",
                    "source_codelists": "cat/ccc_codelists.csv",
                    "target_codelists": "cat/linz_codelists.csv"
                },
                "output_dir": "out",
                "report_format": "json",
                "networks": [{
                    "council": "CCC",
                    "network": "Stormwater",
                    "container": "in",
                    "asset_classes": {"SwPipe": "Pipe", "SwManhole": "Manhole"},
                    "attributes": {"SwPipe": {
                        "SwPipeID": "Unique_ID",
                        "SwPipeConstruction": "Material"
                    }}
                }]
            }"#,
        );
        ProjectConfig::load(&dir.join("project.json")).unwrap()
    }

    #[test]
    fn maps_each_asset_class_in_override_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path());
        let catalogs = Catalogs::load(&config).unwrap();
        let network = &config.networks[0];

        let results = map_network(&config, &catalogs, network, ReportFormat::Json);
        let classes: Vec<_> = results.iter().map(|r| r.source_class.as_str()).collect();
        assert_eq!(classes, ["SwManhole", "SwPipe"]);
        assert!(results.iter().all(|r| r.result.is_ok()));

        let path = dir.path().join("out/CCC/Stormwater/mapping/SwPipe.gap.json");
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        let values = &doc["report"]["values"];
        assert_eq!(values[0]["correspondence"]["source"], "PVC");
        assert_eq!(values[0]["usage"], 2);
        assert_eq!(values[1]["correspondence"]["target"], "Concrete");
        assert_eq!(values[1]["usage"], 1);
    }

    #[test]
    fn missing_catalog_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = project(dir.path());
        config.catalogs.target_codelists = dir.path().join("nope.csv");
        let err = Catalogs::load(&config).err().unwrap();
        assert!(format!("{err:#}").contains("nope.csv"));
    }
}
