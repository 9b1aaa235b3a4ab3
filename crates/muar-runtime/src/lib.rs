//! Event correlation runtime for the muon-on-argon simulation
//!
//! This crate turns one event's hit collections and trajectory store into output rows:
//! it resolves each hit's ancestry chain through the trajectory forest, compacts
//! vertex volume names into geometry codes and hands complete per-event row batches to
//! a shared sink. Events can be spread over worker threads, each owning its own
//! serializer state.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export essential types from storage
pub use muar_storage::{
    Event, EventId, EventRows, GeometryCode, HitRecord, ReportingUnits, StorageError, TableSink,
    TrackId, TrajectoryRecord, Result as StorageResult,
};

// Core modules
pub mod error;
pub mod geometry;
pub mod ancestry;
pub mod serializer;
pub mod sink;
pub mod run;

// Re-export essential types
pub use error::{RuntimeError, Result};
pub use geometry::{GeometryTable, GeometryVariant};
pub use ancestry::{AncestryChain, AncestryResolver, ResolveStrategy, TrackIndex};
pub use serializer::{EventOutcome, EventSerializer, SerializerConfig};
pub use sink::SharedSink;
pub use run::{RunConfig, RunManager, RunSummary};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;

/// Hit collection read by default, as registered by the crystal detector
pub const DEFAULT_HIT_COLLECTION: &str = "CrystalHitsCollection";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let config = SerializerConfig::default();
        assert_eq!(config.hit_collection, DEFAULT_HIT_COLLECTION);

        let table = GeometryTable::for_variant(GeometryVariant::Baseline);
        assert!(!table.is_empty());

        let run = RunConfig::default();
        assert!(run.validate().is_ok());
    }
}
