//! `assetmap extract`: flatten each network's container into layer tables.

use anyhow::{Context, Result};
use assetmap_extract::{run_extraction, ExtractOptions, ExtractSummary, GeoJsonDirectory};
use colored::Colorize;

use crate::config::{NetworkConfig, ProjectConfig};

/// Extract every selected network; returns the number of failed networks.
pub fn cmd_extract(config: &ProjectConfig, only: Option<&str>) -> usize {
    let mut failures = 0;
    for network in config.selected_networks(only) {
        println!(
            "{} {}",
            "Extracting".green().bold(),
            network.display_name()
        );
        match extract_network(config, network) {
            Ok(summary) => {
                println!(
                    "  {} layers, {} features, {} geographic tables ({} empty layers skipped)",
                    summary.layers_written,
                    summary.features,
                    summary.geographic_tables,
                    summary.empty_layers.len()
                );
            }
            Err(err) => {
                failures += 1;
                tracing::error!(
                    network = %network.display_name(),
                    error = %format!("{err:#}"),
                    "extraction failed"
                );
                eprintln!("{} {}: {err:#}", "failed".red().bold(), network.display_name());
            }
        }
    }
    failures
}

fn extract_network(config: &ProjectConfig, network: &NetworkConfig) -> Result<ExtractSummary> {
    let container = GeoJsonDirectory::open(&network.container)
        .with_context(|| format!("cannot open container {}", network.container.display()))?;
    let options = ExtractOptions {
        layout: config.layout(network),
        geographic_layers: config.geographic_layers.clone(),
    };
    let summary = run_extraction(&container, &options)
        .with_context(|| format!("extracting {}", network.display_name()))?;
    Ok(summary)
}
