//! Ancestry chain resolution over an event's trajectory forest
//!
//! Starting from a hit's track, the chain is built by repeatedly finding the first
//! stored trajectory with the current track id, recording it and moving on to its
//! parent. The walk stops when no trajectory carries the current id; the primary's
//! parent id (0) never matches a stored track.

use crate::error::{Result, RuntimeError};
use muar_storage::{TrackId, TrajectoryRecord};
use std::collections::{HashMap, HashSet};

/// How trajectories are looked up during a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    /// Linear scan from the start of the store for every link
    Scan,
    /// Track id index built once per event
    #[default]
    Indexed,
}

impl std::str::FromStr for ResolveStrategy {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scan" => Ok(ResolveStrategy::Scan),
            "indexed" | "index" => Ok(ResolveStrategy::Indexed),
            _ => Err(RuntimeError::invalid_parameter("strategy", s, "scan or indexed")),
        }
    }
}

impl std::fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStrategy::Scan => f.write_str("scan"),
            ResolveStrategy::Indexed => f.write_str("indexed"),
        }
    }
}

/// Ordered trajectory indices from a hit's own track up to the primary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestryChain {
    indices: Vec<usize>,
}

impl AncestryChain {
    /// Indices into the trajectory store, closest ancestor first
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the start track had no stored trajectory
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records of the chain in order
    ///
    /// `records` must be the slice the chain was resolved against.
    pub fn iter<'a>(
        &'a self,
        records: &'a [TrajectoryRecord],
    ) -> impl Iterator<Item = &'a TrajectoryRecord> + 'a {
        self.indices.iter().map(move |&i| &records[i])
    }

    /// Track ids of the chain in order
    pub fn track_ids(&self, records: &[TrajectoryRecord]) -> Vec<TrackId> {
        self.iter(records).map(|r| r.track_id).collect()
    }
}

/// Shared walk; `lookup` returns the first index carrying a track id
fn walk<F>(start: TrackId, records: &[TrajectoryRecord], lookup: F) -> Result<AncestryChain>
where
    F: Fn(TrackId) -> Option<usize>,
{
    let mut indices = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start;

    while let Some(idx) = lookup(current) {
        if !visited.insert(idx) || indices.len() >= records.len() {
            return Err(RuntimeError::AncestryCycle {
                start,
                track: current,
                limit: records.len(),
            });
        }
        indices.push(idx);
        current = records[idx].parent_id;
    }

    Ok(AncestryChain { indices })
}

/// Resolve a chain by scanning the store from the start for every link
pub fn resolve_scan(start: TrackId, records: &[TrajectoryRecord]) -> Result<AncestryChain> {
    walk(start, records, |id| records.iter().position(|r| r.track_id == id))
}

/// Track id to first-index map of one event's trajectory store
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    first: HashMap<TrackId, usize>,
}

impl TrackIndex {
    /// Index a store; on duplicate ids the earliest record wins
    pub fn build(records: &[TrajectoryRecord]) -> Self {
        let mut first = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            first.entry(record.track_id).or_insert(i);
        }
        Self { first }
    }

    /// First index carrying a track id
    pub fn get(&self, track_id: TrackId) -> Option<usize> {
        self.first.get(&track_id).copied()
    }

    /// Number of distinct track ids
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Resolve a chain through a prebuilt index
pub fn resolve_indexed(
    start: TrackId,
    records: &[TrajectoryRecord],
    index: &TrackIndex,
) -> Result<AncestryChain> {
    walk(start, records, |id| index.get(id))
}

/// Per-event resolver over one trajectory store
#[derive(Debug)]
pub struct AncestryResolver<'a> {
    records: &'a [TrajectoryRecord],
    index: Option<TrackIndex>,
}

impl<'a> AncestryResolver<'a> {
    /// Create a resolver; the indexed strategy builds its index here
    pub fn new(records: &'a [TrajectoryRecord], strategy: ResolveStrategy) -> Self {
        let index = match strategy {
            ResolveStrategy::Scan => None,
            ResolveStrategy::Indexed => Some(TrackIndex::build(records)),
        };
        Self { records, index }
    }

    /// Resolve the chain of a start track
    pub fn resolve(&self, start: TrackId) -> Result<AncestryChain> {
        match &self.index {
            Some(index) => resolve_indexed(start, self.records, index),
            None => resolve_scan(start, self.records),
        }
    }

    /// Records the resolver walks over
    pub fn records(&self) -> &'a [TrajectoryRecord] {
        self.records
    }
}
