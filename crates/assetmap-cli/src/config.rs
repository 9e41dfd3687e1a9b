//! Project configuration (JSON).
//!
//! ```json
//! {
//!   "labels": { "source": "CCC", "target": "LINZ" },
//!   "catalogs": {
//!     "source_attributes": "catalogs/ccc_attributes.csv",
//!     "target_attributes": "catalogs/linz_attributes.csv",
//!     "source_codelists": "catalogs/ccc_codelists.csv",
//!     "target_codelists": "catalogs/linz_codelists.csv"
//!   },
//!   "output_dir": "out",
//!   "geographic_layers": ["vwOpenDataSwPipe", "vwOpenDataSwAccess"],
//!   "networks": [{
//!     "council": "Christchurch City Council",
//!     "network": "Stormwater",
//!     "container": "input/Stormwater",
//!     "asset_classes": { "SwPipe": "Pipe" },
//!     "attributes": { "SwPipe": { "SwPipeID": "Unique_ID" } }
//!   }]
//! }
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

use anyhow::{Context, Result};
use assetmap_align::{NetworkOverrides, SideLabels};
use assetmap_extract::OutputLayout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPaths {
    pub source_attributes: PathBuf,
    pub target_attributes: PathBuf,
    pub source_codelists: PathBuf,
    pub target_codelists: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub council: String,
    pub network: String,
    /// Directory of GeoJSON layers.
    pub container: PathBuf,
    #[serde(flatten)]
    pub overrides: NetworkOverrides,
}

impl NetworkConfig {
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.council, self.network)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub labels: SideLabels,
    pub catalogs: CatalogPaths,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub report_format: ReportFormat,
    #[serde(default)]
    pub geographic_layers: BTreeSet<String>,
    pub networks: Vec<NetworkConfig>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: ProjectConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.output_dir);
        resolve(&mut self.catalogs.source_attributes);
        resolve(&mut self.catalogs.target_attributes);
        resolve(&mut self.catalogs.source_codelists);
        resolve(&mut self.catalogs.target_codelists);
        for network in &mut self.networks {
            resolve(&mut network.container);
        }
    }

    /// Networks to process: all of them, or only those whose network name
    /// matches `only`.
    pub fn selected_networks<'a>(
        &'a self,
        only: Option<&'a str>,
    ) -> impl Iterator<Item = &'a NetworkConfig> {
        self.networks
            .iter()
            .filter(move |n| only.map_or(true, |name| n.network == name))
    }

    /// `<output_dir>/<council>/<network>`.
    pub fn layout(&self, network: &NetworkConfig) -> OutputLayout {
        OutputLayout::new(
            self.output_dir
                .join(&network.council)
                .join(&network.network),
        )
    }

    pub fn mapping_dir(&self, network: &NetworkConfig) -> PathBuf {
        self.layout(network).root().join("mapping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "labels": {"source": "CCC", "target": "LINZ"},
        "catalogs": {
            "source_attributes": "cat/ccc_attributes.csv",
            "target_attributes": "/abs/linz_attributes.csv",
            "source_codelists": "cat/ccc_codelists.csv",
            "target_codelists": "cat/linz_codelists.csv"
        },
        "output_dir": "out",
        "networks": [
            {
                "council": "Christchurch City Council",
                "network": "Stormwater",
                "container": "in/Stormwater",
                "asset_classes": {"SwPipe": "Pipe"},
                "attributes": {"SwPipe": {"SwPipeID": "Unique_ID"}}
            },
            {
                "council": "Christchurch City Council",
                "network": "Wastewater",
                "container": "in/Wastewater"
            }
        ]
    }"#;

    fn load_sample() -> (tempfile::TempDir, ProjectConfig) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = ProjectConfig::load(&path).unwrap();
        (dir, config)
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let (dir, config) = load_sample();
        assert_eq!(config.output_dir, dir.path().join("out"));
        assert_eq!(
            config.catalogs.source_attributes,
            dir.path().join("cat/ccc_attributes.csv")
        );
        assert_eq!(
            config.catalogs.target_attributes,
            PathBuf::from("/abs/linz_attributes.csv")
        );
        assert_eq!(config.networks[0].container, dir.path().join("in/Stormwater"));
    }

    #[test]
    fn overrides_and_defaults() {
        let (_dir, config) = load_sample();
        assert_eq!(config.report_format, ReportFormat::Xlsx);
        assert!(config.geographic_layers.is_empty());
        let storm = &config.networks[0].overrides;
        assert_eq!(storm.asset_classes.get("SwPipe"), Some("Pipe"));
        assert_eq!(storm.attributes_for("SwPipe").get("SwPipeID"), Some("Unique_ID"));
        assert!(config.networks[1].overrides.asset_classes.is_empty());
    }

    #[test]
    fn network_selection_and_layout() {
        let (dir, config) = load_sample();
        let names: Vec<_> = config
            .selected_networks(Some("Wastewater"))
            .map(|n| n.network.as_str())
            .collect();
        assert_eq!(names, ["Wastewater"]);
        assert_eq!(config.selected_networks(None).count(), 2);

        let storm = &config.networks[0];
        assert_eq!(
            config.mapping_dir(storm),
            dir.path()
                .join("out/Christchurch City Council/Stormwater/mapping")
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = ProjectConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
