//! Per-event records and table output for the muon-on-argon simulation
//!
//! This crate holds the leaf data of the event correlation pipeline: the hit and
//! trajectory records produced by the simulation collaborators, the per-event stores
//! that own them, the output row types, and the sinks/file formats the rows end up in.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod units;
pub mod records;
pub mod store;
pub mod event;
pub mod rows;
pub mod schemas;
pub mod traits;

// Sinks and formats
pub mod memory;
pub mod format;
pub mod file;

// Re-export essential types
pub use error::{StorageError, Result};
pub use ids::{EventId, GeometryCode, TrackId};
pub use units::{Dimension, ReportingUnits, Unit};
pub use records::{HitRecord, IonSpecies, ThreeVector, TrajectoryRecord};
pub use store::{HitCollections, HitStore, TrajectoryStore};
pub use event::Event;
#[cfg(feature = "serde")]
pub use event::{read_events, write_events, EventInput};
pub use rows::{EventRows, HitRow, PointRow, RowCounts, TableSet, TrajectoryRow};
pub use schemas::{ColumnType, TableKind, TableSchema};
pub use traits::TableSink;

pub use memory::MemoryTableSink;
pub use file::{FileFormat, FileTableSink, TableFile};
pub use format::{decode_tables, encode_tables, MuarHeader, SectionHeader};

/// Table container version for compatibility checking
pub const STORAGE_VERSION: u32 = 1;

/// Magic numbers for the table container and its sections
pub mod magic {
    /// Container magic number: "MUAR"
    pub const MUAR: [u8; 4] = [0x4D, 0x55, 0x41, 0x52];
    /// Hits section magic number: "HITS"
    pub const HITS: [u8; 4] = [0x48, 0x49, 0x54, 0x53];
    /// Trajectories section magic number: "TRAJ"
    pub const TRAJ: [u8; 4] = [0x54, 0x52, 0x41, 0x4A];
    /// Points section magic number: "PNTS"
    pub const PNTS: [u8; 4] = [0x50, 0x4E, 0x54, 0x53];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_numbers() {
        let magics = [magic::MUAR, magic::HITS, magic::TRAJ, magic::PNTS];

        for (i, &magic1) in magics.iter().enumerate() {
            for (j, &magic2) in magics.iter().enumerate() {
                if i != j {
                    assert_ne!(magic1, magic2, "Magic numbers must be distinct");
                }
            }
        }
        assert_eq!(&magic::MUAR, b"MUAR");
    }
}
