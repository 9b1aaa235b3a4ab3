//! Configuration file initialization command

use clap::Args;
use console::Term;
use dialoguer::Confirm;
use std::path::PathBuf;
use tracing::info;

use crate::config::{CliConfig, LOCAL_CONFIG_FILE};
use crate::error::{CliError, CliResult};

/// Write a default muar.toml
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Target file (default: ./muar.toml)
    pub path: Option<PathBuf>,

    /// Write to the user configuration directory instead
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Overwrite an existing file without asking
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    fn target(&self) -> CliResult<PathBuf> {
        if self.user {
            return CliConfig::default_config_path();
        }
        Ok(self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)))
    }

    pub async fn execute(self) -> CliResult<()> {
        let path = self.target()?;

        if path.exists() && !self.force {
            if !Term::stderr().is_term() {
                return Err(CliError::invalid_args(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            let overwrite = Confirm::new()
                .with_prompt(format!("{} exists. Overwrite?", path.display()))
                .default(false)
                .interact()
                .map_err(|e| CliError::Generic(e.into()))?;
            if !overwrite {
                return Err(CliError::Cancelled);
            }
        }

        CliConfig::default().save_to_file(&path)?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("muar.toml");

        let cmd = InitCommand { path: Some(path.clone()), user: false, force: false };
        cmd.execute().await.unwrap();
        assert_eq!(CliConfig::load_from_file(&path).unwrap(), CliConfig::default());

        let cmd = InitCommand { path: Some(path.clone()), user: false, force: true };
        cmd.execute().await.unwrap();
    }
}
