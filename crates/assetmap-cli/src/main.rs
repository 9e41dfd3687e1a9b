//! Assetmap CLI
//!
//! - `extract`: flatten each network's GeoJSON layers into tables,
//!   statistics profiles and geographic summaries
//! - `map`: per asset class gap analysis between the two standards
//! - `convert`: one NZTM2000 easting/northing pair to WGS84

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod extract;
mod map;
mod report;

use config::{ProjectConfig, ReportFormat};

#[derive(Parser)]
#[command(name = "assetmap")]
#[command(
    author,
    version,
    about = "Assetmap: council GIS asset model to national standard reconciliation"
)]
struct Cli {
    /// More log output (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract layer tables, statistics and geographic summaries.
    Extract {
        /// Project configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Only this network (e.g. `Stormwater`)
        #[arg(long)]
        network: Option<String>,
    },

    /// Write a gap analysis report per asset class.
    ///
    /// Usage counts come from the layer tables written by `extract`, so run
    /// that first for the same config.
    Map {
        /// Project configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Only this network (e.g. `Stormwater`)
        #[arg(long)]
        network: Option<String>,
        /// Report format (defaults to the config's `report_format`)
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },

    /// Convert an NZTM2000 easting/northing pair to latitude/longitude.
    Convert {
        easting: String,
        northing: String,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract { config, network } => {
            let project = ProjectConfig::load(&config)?;
            let failures = extract::cmd_extract(&project, network.as_deref());
            if failures > 0 {
                bail!("{failures} network(s) failed to extract");
            }
        }
        Commands::Map {
            config,
            network,
            format,
        } => {
            let project = ProjectConfig::load(&config)?;
            let format = format.unwrap_or(project.report_format);
            let failures = map::cmd_map(&project, network.as_deref(), format)?;
            if failures > 0 {
                bail!("{failures} asset class(es) failed to map");
            }
        }
        Commands::Convert { easting, northing } => cmd_convert(&easting, &northing)?,
    }
    Ok(())
}

fn cmd_convert(easting: &str, northing: &str) -> Result<()> {
    match assetmap_nztm::convert_text(easting, northing) {
        Some(p) => {
            println!("{},{}", p.latitude, p.longitude);
            if !assetmap_nztm::GeographicExtent::NZTM2000.contains(p) {
                eprintln!(
                    "{} result lies outside the NZTM2000 extent",
                    "warning:".yellow().bold()
                );
            }
            Ok(())
        }
        None => bail!("not a numeric coordinate pair: {easting:?} {northing:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_map_with_format_override() {
        let cli = Cli::try_parse_from([
            "assetmap", "-v", "map", "--config", "p.json", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Map { format, network, .. } => {
                assert_eq!(format, Some(ReportFormat::Json));
                assert_eq!(network, None);
            }
            _ => panic!("expected map"),
        }
    }

    #[test]
    fn convert_rejects_text() {
        assert!(cmd_convert("abc", "5180000").is_err());
        assert!(cmd_convert("1570000", "5180000").is_ok());
    }
}
