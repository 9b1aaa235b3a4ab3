//! Geometry code listing

use clap::Args;

use muar_runtime::{GeometryTable, GeometryVariant};

use crate::config::CliConfig;
use crate::error::CliResult;

/// List the volume codes of a geometry
#[derive(Args, Debug)]
pub struct GeometryCommand {
    /// Geometry variant (default: from config)
    pub variant: Option<String>,

    /// List every variant
    #[arg(long, conflicts_with = "variant")]
    pub all: bool,
}

impl GeometryCommand {
    pub async fn execute(self, config: CliConfig) -> CliResult<()> {
        let variants = if self.all {
            GeometryVariant::ALL.to_vec()
        } else {
            match &self.variant {
                Some(name) => vec![name.parse()?],
                None => vec![config.geometry()?],
            }
        };

        for variant in variants {
            let table = GeometryTable::for_variant(variant);
            println!("{} ({} volumes)", variant, table.len());
            for (code, name) in table.names().enumerate() {
                println!("  {:>3}  {}", code, name);
            }
        }
        Ok(())
    }
}
