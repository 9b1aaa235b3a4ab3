//! ID types for the storage layer

use core::fmt;

/// Event number within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventId(pub u32);

impl EventId {
    /// Create a new event ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Track identifier, unique within one event
///
/// Track ids start at 1; a parent id of 0 marks a primary particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TrackId(pub i32);

impl TrackId {
    /// Create a new track ID
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> i32 {
        self.0
    }

    /// Parent id carried by primary particles
    pub const NO_PARENT: Self = Self(0);

    /// Check if this id is the "no parent" sentinel
    pub const fn is_no_parent(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Compact integer code standing in for a volume name in the output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryCode(pub u16);

impl GeometryCode {
    /// Create a new geometry code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the raw code value
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Column value written when a row has no volume
    pub const NONE_COLUMN: i32 = -1;

    /// Column value of an optional code
    pub fn column(code: Option<GeometryCode>) -> i32 {
        code.map_or(Self::NONE_COLUMN, |c| i32::from(c.0))
    }
}

impl fmt::Display for GeometryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for EventId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for EventId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let id = u32::deserialize(deserializer)?;
            Ok(EventId::new(id))
        }
    }

    impl Serialize for TrackId {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            self.0.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for TrackId {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let id = i32::deserialize(deserializer)?;
            Ok(TrackId::new(id))
        }
    }
}
