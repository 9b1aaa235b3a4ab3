//! Table file inspection command

use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::info;

use muar_runtime::GeometryTable;
use muar_storage::{FileFormat, TableFile, TableKind};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::input::load_events;
use crate::verify::{verify_against_events, verify_tables, VerifyReport};

/// Summarize and verify a table file
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Table file written by `muar process`
    pub file: PathBuf,

    /// Print the first N rows of every table
    #[arg(short, long, default_value_t = 0)]
    pub rows: usize,

    /// Show per-event row counts
    #[arg(long)]
    pub events: bool,

    /// Verify references and volume codes
    #[arg(long)]
    pub verify: bool,

    /// Also recompute trajectory row counts from these source events
    #[arg(long, requires = "verify")]
    pub against: Vec<PathBuf>,

    /// Geometry variant the file was written with
    #[arg(short, long)]
    pub geometry: Option<String>,
}

impl InspectCommand {
    pub async fn execute(self, mut config: CliConfig) -> CliResult<()> {
        if let Some(geometry) = &self.geometry {
            config.run.geometry = geometry.clone();
        }

        let file = TableFile::open(&self.file)?;
        info!("Inspecting {}", file.path.display());
        self.print_summary(&file);

        if self.rows > 0 {
            self.print_rows(&file);
        }

        if self.verify {
            let geometry = GeometryTable::for_variant(config.geometry()?);
            let mut report = verify_tables(&file.tables, &geometry);

            if !self.against.is_empty() {
                let events = load_events(&self.against)?;
                let checked = verify_against_events(&file.tables, &events, &config.run.hit_collection)?;
                report.problems.extend(checked.problems);
            }
            Self::print_report(&report)?;
        }

        Ok(())
    }

    fn print_summary(&self, file: &TableFile) {
        let format = match file.format {
            FileFormat::Binary => "MUAR binary",
            FileFormat::Json => "JSON",
        };
        println!("{} ({})", style(file.path.display()).bold(), format);

        let counts = file.tables.counts();
        for (kind, rows) in TableKind::ALL.iter().zip([counts.hits, counts.trajectories, counts.points]) {
            let schema = kind.schema();
            println!(
                "  {:<12} {:<7} {:>10} rows  [{}]",
                schema.title,
                schema.name,
                rows,
                schema.column_names().join(", ")
            );
        }

        let events = file.tables.event_ids();
        println!("  {} events with hits", events.len());

        if self.events {
            for event in events {
                let hits = file.tables.hits.iter().filter(|r| r.event_id == event).count();
                let trajectories = file.tables.trajectories.iter().filter(|r| r.event_id == event).count();
                println!("    event {:>6}: {:>5} hits {:>6} trajectories", event, hits, trajectories);
            }
        }
    }

    fn print_rows(&self, file: &TableFile) {
        println!("{}", style("Hits").underlined());
        for row in file.tables.hits.iter().take(self.rows) {
            println!("  {:?}", row);
        }
        println!("{}", style("Trajectories").underlined());
        for row in file.tables.trajectories.iter().take(self.rows) {
            println!("  {:?}", row);
        }
        if !file.tables.points.is_empty() {
            println!("{}", style("Points").underlined());
            for row in file.tables.points.iter().take(self.rows) {
                println!("  {:?}", row);
            }
        }
    }

    fn print_report(report: &VerifyReport) -> CliResult<()> {
        if report.is_ok() {
            println!(
                "{} {} hits, {} trajectory rows consistent",
                style("✓").green(),
                report.hits_checked,
                report.trajectories_checked
            );
            return Ok(());
        }

        for problem in report.problems.iter().take(20) {
            println!("{} {}", style("✗").red(), problem);
        }
        if report.problems.len() > 20 {
            println!("  ... {} more", report.problems.len() - 20);
        }
        Err(CliError::verification(format!("{} problems found", report.problems.len())))
    }
}
