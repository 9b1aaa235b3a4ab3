//! Event processing command
//!
//! Example:
//!   muar process events.jsonl --output run.muar --workers 4 --points

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;

use muar_runtime::{RunManager, RunSummary, SharedSink};
use muar_storage::{FileFormat, FileTableSink, RowCounts};

use crate::config::{parse_format, CliConfig};
use crate::error::{CliError, CliResult};
use crate::input::load_events;

/// Correlate events and write the output tables
#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Event files (JSON Lines) or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: binary or json (default: from config or file extension)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Geometry variant: baseline or cryostat
    #[arg(short, long)]
    pub geometry: Option<String>,

    /// Worker threads
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Hit collection to read
    #[arg(long)]
    pub collection: Option<String>,

    /// Ancestry lookup: scan or indexed
    #[arg(long)]
    pub strategy: Option<String>,

    /// Also write the points table
    #[arg(long)]
    pub points: bool,

    /// Time unit of the output
    #[arg(long)]
    pub time_unit: Option<String>,

    /// Energy unit of the output
    #[arg(long)]
    pub energy_unit: Option<String>,

    /// Length unit of the output
    #[arg(long)]
    pub length_unit: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

const DEFAULT_OUTPUT: &str = "muar_output.muar";

impl ProcessCommand {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, mut config: CliConfig) -> CliConfig {
        if let Some(geometry) = &self.geometry {
            config.run.geometry = geometry.clone();
        }
        if let Some(workers) = self.workers {
            config.run.workers = workers;
        }
        if let Some(collection) = &self.collection {
            config.run.hit_collection = collection.clone();
        }
        if let Some(strategy) = &self.strategy {
            config.run.strategy = strategy.clone();
        }
        if self.points {
            config.run.export_points = true;
        }
        if let Some(unit) = &self.time_unit {
            config.units.time = unit.clone();
        }
        if let Some(unit) = &self.energy_unit {
            config.units.energy = unit.clone();
        }
        if let Some(unit) = &self.length_unit {
            config.units.length = unit.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
        config
    }

    fn output_format(&self, config: &CliConfig, output: &Path) -> CliResult<FileFormat> {
        if self.format.is_none() && output.extension().and_then(|e| e.to_str()) == Some("json") {
            return Ok(FileFormat::Json);
        }
        parse_format(&config.output.format)
    }

    pub async fn execute(self, config: CliConfig) -> CliResult<()> {
        let config = self.apply_overrides(config);
        let run_config = config.run_config()?;
        let output = config
            .output
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        let format = self.output_format(&config, &output)?;

        let inputs = self.inputs.clone();
        let events = tokio::task::spawn_blocking(move || load_events(&inputs))
            .await
            .map_err(|e| CliError::Generic(e.into()))??;
        info!("Loaded {} events", events.len());

        let manager = RunManager::new(run_config)?;
        let progress = if self.no_progress {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(events.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} events")
                    .map_err(|e| CliError::Generic(e.into()))?,
            );
            bar
        };

        let sink = SharedSink::new(FileTableSink::with_format(&output, format)?);
        let bar = progress.clone();
        let (summary, counts) = tokio::task::spawn_blocking(move || -> CliResult<(RunSummary, RowCounts)> {
            let summary = manager.run_with_progress(&events, &sink, |_| bar.inc(1))?;
            let counts = sink.into_inner().finish()?;
            Ok((summary, counts))
        })
        .await
        .map_err(|e| CliError::Generic(e.into()))??;
        progress.finish_and_clear();

        info!(
            "{} events ({} without hits): {} hits, {} trajectories, {} points",
            summary.events,
            summary.skipped_events,
            counts.hits,
            counts.trajectories,
            counts.points
        );
        info!("Tables written to {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        cmd: ProcessCommand,
    }

    #[test]
    fn test_flags_override_config() {
        let wrapper = Wrapper::parse_from([
            "muar", "events.jsonl", "-j", "3", "--geometry", "cryostat", "--points", "--length-unit", "mm",
        ]);
        let config = wrapper.cmd.apply_overrides(CliConfig::default());
        assert_eq!(config.run.workers, 3);
        assert_eq!(config.run.geometry, "cryostat");
        assert!(config.run.export_points);
        assert_eq!(config.units.length, "mm");
        assert_eq!(config.units.time, "ns");
        assert!(config.run_config().is_ok());
    }

    #[test]
    fn test_json_extension_selects_json() {
        let wrapper = Wrapper::parse_from(["muar", "events.jsonl"]);
        let config = CliConfig::default();
        assert_eq!(
            wrapper.cmd.output_format(&config, Path::new("out.json")).unwrap(),
            FileFormat::Json
        );
        assert_eq!(
            wrapper.cmd.output_format(&config, Path::new("out.muar")).unwrap(),
            FileFormat::Binary
        );
    }
}
