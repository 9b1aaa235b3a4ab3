//! Error types for the event runtime

use muar_storage::{EventId, TrackId};
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the event runtime
///
/// Every variant except `InvalidParameter`/`InvalidConfiguration` aborts the run.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Storage layer error
    #[error("Storage error: {source}")]
    Storage {
        #[from]
        /// Source storage error
        source: muar_storage::StorageError,
    },

    /// Volume name missing from the geometry lookup table
    #[error("Name {name} not in look up table of geometry '{variant}'")]
    UnknownVolume {
        /// Offending volume name
        name: String,
        /// Active geometry variant
        variant: String,
    },

    /// Geometry table declared the same name twice
    #[error("Volume {name} listed twice in geometry '{variant}'")]
    DuplicateVolume {
        /// Duplicated volume name
        name: String,
        /// Geometry variant being built
        variant: String,
    },

    /// Hit collection not registered for the event
    #[error("Cannot access hits collection {collection} in event {event}")]
    MissingHitCollection {
        /// Collection name
        collection: String,
        /// Event being processed
        event: EventId,
    },

    /// Two events of one run carry the same id
    #[error("Event {event} appears more than once in the run")]
    DuplicateEvent {
        /// Repeated event id
        event: EventId,
    },

    /// Ancestry walk revisited a trajectory
    #[error(
        "Ancestry of track {start} revisits track {track}: chain longer than {limit} stored trajectories"
    )]
    AncestryCycle {
        /// Track the walk started from
        start: TrackId,
        /// Track found a second time
        track: TrackId,
        /// Number of stored trajectories
        limit: usize,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String
    },

    /// Invalid run configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String
    },
}

impl RuntimeError {
    /// Create an unknown volume error
    pub fn unknown_volume(name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::UnknownVolume {
            name: name.into(),
            variant: variant.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Whether this error must terminate the run
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RuntimeError::InvalidParameter { .. } | RuntimeError::InvalidConfiguration { .. }
        )
    }
}
