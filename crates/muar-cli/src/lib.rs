//! muar CLI crate
//!
//! Purpose:
//! - Drive the event correlation runtime from the command line: load JSON Lines events,
//!   run them through worker serializers and write the Hits/Trajectories/Points tables.
//! - Inspect and verify written table files.
//!
//! Major commands (see [commands]):
//! - process: inputs → run manager → MUAR binary or JSON table file.
//! - inspect: table summary, row dump, `--verify` reference checks and, with `--against`,
//!   per-hit trajectory counts recomputed from the source events.
//! - show: print trajectories of input events.
//! - geometry: list volume codes of a geometry variant.
//! - init / completions: write muar.toml, generate shell completions.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling MuarCli::execute().
//! - Library crates log through the `log` facade; the binary's subscriber picks those
//!   records up alongside its own `tracing` events.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod verify;

pub use commands::MuarCli;
