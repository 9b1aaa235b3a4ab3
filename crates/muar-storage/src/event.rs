//! One simulated event: its hit collections and trajectory store

use crate::{
    ids::EventId,
    store::{HitCollections, HitStore, TrajectoryStore},
};

/// Products of the simulation collaborators for one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Event number
    pub id: EventId,
    /// Hit collections by name
    pub collections: HitCollections,
    /// Trajectories in event-scan order
    pub trajectories: TrajectoryStore,
}

impl Event {
    /// Create an empty event
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            collections: HitCollections::new(),
            trajectories: TrajectoryStore::new(),
        }
    }

    /// Register a hit collection
    pub fn with_collection(mut self, name: impl Into<String>, hits: HitStore) -> Self {
        self.collections.insert(name, hits);
        self
    }

    /// Replace the trajectory store
    pub fn with_trajectories(mut self, trajectories: TrajectoryStore) -> Self {
        self.trajectories = trajectories;
        self
    }

    /// Drop all per-event data, keeping the id
    pub fn clear(&mut self) {
        self.collections.clear();
        self.trajectories.clear();
    }
}

#[cfg(feature = "serde")]
pub use self::input::{read_events, write_events, EventInput, TrajectoryInput};

#[cfg(feature = "serde")]
mod input {
    use super::*;
    use crate::{
        error::Result,
        records::{HitRecord, TrajectoryRecord},
    };
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::io::{BufRead, Write};

    /// Serialized form of an [`Event`], one per JSON line
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct EventInput {
        /// Event number
        pub event_id: EventId,
        /// Hit collections by name
        pub collections: BTreeMap<String, Vec<HitRecord>>,
        /// Trajectory segments in event-scan order
        #[serde(default)]
        pub trajectories: Vec<TrajectoryInput>,
    }

    /// Serialized trajectory segment
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TrajectoryInput {
        /// Segment data
        #[serde(flatten)]
        pub record: TrajectoryRecord,
        /// Continuation of an earlier segment of the same track
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        pub continuation: bool,
    }

    impl From<EventInput> for Event {
        fn from(input: EventInput) -> Self {
            let mut event = Event::new(input.event_id);
            for (name, hits) in input.collections {
                event.collections.insert(name, HitStore::from(hits));
            }
            for segment in input.trajectories {
                let mut record = segment.record;
                if segment.continuation {
                    event.trajectories.merge_continuation(record);
                } else {
                    record.seed_start_point();
                    event.trajectories.push(record);
                }
            }
            event
        }
    }

    impl From<&Event> for EventInput {
        fn from(event: &Event) -> Self {
            let collections = event
                .collections
                .names()
                .filter_map(|name| {
                    event
                        .collections
                        .get(name)
                        .map(|store| (name.to_string(), store.as_slice().to_vec()))
                })
                .collect();
            let trajectories = event
                .trajectories
                .records()
                .iter()
                .cloned()
                .map(|record| TrajectoryInput { record, continuation: false })
                .collect();
            Self {
                event_id: event.id,
                collections,
                trajectories,
            }
        }
    }

    /// Read JSON-lines events; blank lines are skipped
    pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let input: EventInput = serde_json::from_str(&line)?;
            events.push(Event::from(input));
        }
        log::debug!("Read {} events", events.len());
        Ok(events)
    }

    /// Write events as JSON lines
    pub fn write_events<W: Write>(mut writer: W, events: &[Event]) -> Result<()> {
        for event in events {
            serde_json::to_writer(&mut writer, &EventInput::from(event))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
