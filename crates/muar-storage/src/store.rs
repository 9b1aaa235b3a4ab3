//! Per-event hit and trajectory stores

use crate::records::{HitRecord, TrajectoryRecord};
use std::collections::BTreeMap;

/// Ordered hits of one event, as recorded by one sensitive detector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitStore {
    hits: Vec<HitRecord>,
}

impl HitStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hit at the end
    pub fn push(&mut self, hit: HitRecord) {
        self.hits.push(hit);
    }

    /// Remove all hits
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    /// Hits in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, HitRecord> {
        self.hits.iter()
    }

    /// Hits as a slice
    pub fn as_slice(&self) -> &[HitRecord] {
        &self.hits
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether no hit was recorded
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl From<Vec<HitRecord>> for HitStore {
    fn from(hits: Vec<HitRecord>) -> Self {
        Self { hits }
    }
}

impl FromIterator<HitRecord> for HitStore {
    fn from_iter<I: IntoIterator<Item = HitRecord>>(iter: I) -> Self {
        Self { hits: iter.into_iter().collect() }
    }
}

/// Named hit collections of one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitCollections {
    collections: BTreeMap<String, HitStore>,
}

impl HitCollections {
    /// Create an empty set of collections
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection, replacing an existing one of the same name
    pub fn insert(&mut self, name: impl Into<String>, store: HitStore) {
        self.collections.insert(name.into(), store);
    }

    /// Collection by name
    pub fn get(&self, name: &str) -> Option<&HitStore> {
        self.collections.get(name)
    }

    /// Mutable collection by name, created empty if missing
    pub fn entry(&mut self, name: &str) -> &mut HitStore {
        self.collections.entry(name.to_string()).or_default()
    }

    /// Collection names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Drop all collections
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Number of collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether no collection is registered
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Trajectories of one event in event-scan order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryStore {
    records: Vec<TrajectoryRecord>,
}

impl TrajectoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trajectory
    pub fn push(&mut self, record: TrajectoryRecord) {
        self.records.push(record);
    }

    /// Store a continuation segment
    ///
    /// Merged into the first stored trajectory with the same track id, or appended when
    /// the track has no earlier segment.
    pub fn merge_continuation(&mut self, mut record: TrajectoryRecord) {
        match self.records.iter_mut().find(|r| r.track_id == record.track_id) {
            Some(existing) => existing.merge(record),
            None => {
                log::debug!("No earlier segment for track {}, storing continuation", record.track_id);
                record.seed_start_point();
                self.records.push(record);
            }
        }
    }

    /// Remove all trajectories
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Trajectories in insertion order
    pub fn records(&self) -> &[TrajectoryRecord] {
        &self.records
    }

    /// Number of stored trajectories
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no trajectory was stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TrajectoryRecord>> for TrajectoryStore {
    fn from(records: Vec<TrajectoryRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<TrajectoryRecord> for TrajectoryStore {
    fn from_iter<I: IntoIterator<Item = TrajectoryRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}
