//! CLI command implementations for muar

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::error::CliResult;

pub mod completions;
pub mod geometry;
pub mod init;
pub mod inspect;
pub mod process;
pub mod show;

/// muar - hit/trajectory correlation for the muon-on-argon simulation
#[derive(Parser, Debug)]
#[command(
    name = "muar",
    version,
    about = "Hit/trajectory correlation and table output for muon-on-argon events",
    long_about = "muar reads simulated events (hit collections plus trajectory stores), \
                  resolves the ancestry chain of every hit and writes correlated Hits, \
                  Trajectories and optional Points tables."
)]
pub struct MuarCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MUAR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correlate events and write the output tables
    #[command(alias = "run")]
    Process(process::ProcessCommand),

    /// Summarize and verify a table file
    Inspect(inspect::InspectCommand),

    /// Print trajectories of input events
    Show(show::ShowCommand),

    /// List the volume codes of a geometry
    Geometry(geometry::GeometryCommand),

    /// Write a default muar.toml
    Init(init::InitCommand),

    /// Generate shell completions
    Completions(completions::CompletionsCommand),
}

impl MuarCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        let config = match &self.command {
            Commands::Init(_) | Commands::Completions(_) => CliConfig::default(),
            _ => CliConfig::discover(self.config.as_deref())?,
        };

        match self.command {
            Commands::Process(cmd) => cmd.execute(config).await,
            Commands::Inspect(cmd) => cmd.execute(config).await,
            Commands::Show(cmd) => cmd.execute(config).await,
            Commands::Geometry(cmd) => cmd.execute(config).await,
            Commands::Init(cmd) => cmd.execute().await,
            Commands::Completions(cmd) => cmd.execute(),
        }
    }
}
