//! Shell completion generation

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use super::MuarCli;
use crate::error::CliResult;

/// Generate shell completions
#[derive(Args, Debug)]
pub struct CompletionsCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) -> CliResult<()> {
        let mut cmd = MuarCli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}
