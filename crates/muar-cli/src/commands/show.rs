//! Trajectory listing for input events

use clap::Args;
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::input::load_events;

/// Print trajectories of input events
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Event files (JSON Lines) or directories containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Only this event
    #[arg(short, long)]
    pub event: Option<u32>,

    /// Only the trajectory of this track
    #[arg(short, long)]
    pub track: Option<i32>,
}

impl ShowCommand {
    pub async fn execute(self, config: CliConfig) -> CliResult<()> {
        let events = load_events(&self.inputs)?;
        let mut shown = 0;

        for event in events.iter().filter(|e| self.event.map_or(true, |id| e.id.raw() == id)) {
            let hits = event
                .collections
                .get(&config.run.hit_collection)
                .map_or(0, |h| h.len());
            println!(
                "Event {}: {} hits, {} trajectories",
                event.id.raw(),
                hits,
                event.trajectories.len()
            );

            for record in event.trajectories.records() {
                if self.track.map_or(true, |t| record.track_id.raw() == t) {
                    print!("{}", record);
                }
            }
            shown += 1;
        }

        if shown == 0 {
            return Err(CliError::invalid_args("no matching event"));
        }
        Ok(())
    }
}
