//! Output rows of the hits, trajectories and points tables

use crate::ids::EventId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row of the hits table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitRow {
    /// Event number
    pub event_id: u32,
    /// Track id of the hit
    pub hit_id: i32,
    /// Ion atomic number, 0 when not an ion
    pub ion_z: i32,
    /// Ion mass number, 0 when not an ion
    pub ion_a: i32,
    /// Geometry code of the hit's volume, -1 when absent
    pub volume_code: i32,
    /// Energy deposit in the energy reporting unit
    pub edep: f64,
    /// Time in the time reporting unit
    pub time: f64,
    /// Position in the length reporting unit
    pub x: f64,
    /// Position in the length reporting unit
    pub y: f64,
    /// Position in the length reporting unit
    pub z: f64,
}

/// Row of the trajectories table, one per ancestry link of a hit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryRow {
    /// Event number
    pub event_id: u32,
    /// Track id of the hit this link belongs to
    pub hit_id: i32,
    /// Parent id of the linked trajectory
    pub parent_id: i32,
    /// PDG code of the linked trajectory
    pub pdg: i32,
    /// Geometry code of the linked trajectory's vertex volume
    pub volume_code: i32,
    /// Vertex in the length reporting unit
    pub vtx_x: f64,
    /// Vertex in the length reporting unit
    pub vtx_y: f64,
    /// Vertex in the length reporting unit
    pub vtx_z: f64,
}

/// Row of the optional points table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointRow {
    /// Event number
    pub event_id: u32,
    /// Track id of the hit this point belongs to
    pub hit_id: i32,
    /// Position of the link in the hit's ancestry chain
    pub link: u32,
    /// Point in the length reporting unit
    pub x: f64,
    /// Point in the length reporting unit
    pub y: f64,
    /// Point in the length reporting unit
    pub z: f64,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    /// Rows in the hits table
    pub hits: u64,
    /// Rows in the trajectories table
    pub trajectories: u64,
    /// Rows in the points table
    pub points: u64,
}

impl RowCounts {
    /// Sum of all rows
    pub fn total(&self) -> u64 {
        self.hits + self.trajectories + self.points
    }
}

impl core::ops::AddAssign for RowCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.hits += rhs.hits;
        self.trajectories += rhs.trajectories;
        self.points += rhs.points;
    }
}

/// Complete rows of one event, handed to a sink in one piece
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRows {
    /// Event the rows belong to
    pub event_id: EventId,
    /// Hit rows in hit order
    pub hits: Vec<HitRow>,
    /// Trajectory rows grouped by hit, closest ancestor first
    pub trajectories: Vec<TrajectoryRow>,
    /// Point rows, empty unless point export is on
    pub points: Vec<PointRow>,
}

impl EventRows {
    /// Create an empty batch
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            ..Default::default()
        }
    }

    /// Drop all staged rows and retarget to another event
    pub fn reset(&mut self, event_id: EventId) {
        self.event_id = event_id;
        self.hits.clear();
        self.trajectories.clear();
        self.points.clear();
    }

    /// Row counts of this batch
    pub fn counts(&self) -> RowCounts {
        RowCounts {
            hits: self.hits.len() as u64,
            trajectories: self.trajectories.len() as u64,
            points: self.points.len() as u64,
        }
    }

    /// Whether the batch holds no rows at all
    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

/// All rows of a run, one vector per table
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableSet {
    /// Hits table
    pub hits: Vec<HitRow>,
    /// Trajectories table
    pub trajectories: Vec<TrajectoryRow>,
    /// Points table
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Vec<PointRow>,
}

impl TableSet {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event's rows
    pub fn extend(&mut self, rows: EventRows) {
        self.hits.extend(rows.hits);
        self.trajectories.extend(rows.trajectories);
        self.points.extend(rows.points);
    }

    /// Row counts
    pub fn counts(&self) -> RowCounts {
        RowCounts {
            hits: self.hits.len() as u64,
            trajectories: self.trajectories.len() as u64,
            points: self.points.len() as u64,
        }
    }

    /// Stable sort of every table by event id, keeping per-event row order
    pub fn sort_by_event(&mut self) {
        self.hits.sort_by_key(|r| r.event_id);
        self.trajectories.sort_by_key(|r| r.event_id);
        self.points.sort_by_key(|r| r.event_id);
    }

    /// Trajectory rows of one hit
    pub fn trajectories_for(&self, event_id: u32, hit_id: i32) -> impl Iterator<Item = &TrajectoryRow> {
        self.trajectories
            .iter()
            .filter(move |r| r.event_id == event_id && r.hit_id == hit_id)
    }

    /// Distinct event ids present in the hits table, ascending
    pub fn event_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.hits.iter().map(|r| r.event_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(event_id: u32, hit_id: i32) -> HitRow {
        HitRow {
            event_id,
            hit_id,
            ion_z: 0,
            ion_a: 0,
            volume_code: -1,
            edep: 1.0,
            time: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    fn traj(event_id: u32, hit_id: i32, parent_id: i32) -> TrajectoryRow {
        TrajectoryRow {
            event_id,
            hit_id,
            parent_id,
            pdg: 11,
            volume_code: 0,
            vtx_x: 0.0,
            vtx_y: 0.0,
            vtx_z: 0.0,
        }
    }

    #[test]
    fn test_sort_by_event_is_stable() {
        let mut tables = TableSet::new();
        let mut second = EventRows::new(EventId::new(2));
        second.hits.push(hit(2, 5));
        second.trajectories.extend([traj(2, 5, 4), traj(2, 5, 0)]);
        let mut first = EventRows::new(EventId::new(1));
        first.hits.push(hit(1, 9));
        first.trajectories.extend([traj(1, 9, 1), traj(1, 9, 0)]);

        tables.extend(second);
        tables.extend(first);
        tables.sort_by_event();

        let parents: Vec<_> = tables.trajectories.iter().map(|r| (r.event_id, r.parent_id)).collect();
        assert_eq!(parents, vec![(1, 1), (1, 0), (2, 4), (2, 0)]);
        assert_eq!(tables.event_ids(), vec![1, 2]);
        assert_eq!(tables.trajectories_for(2, 5).count(), 2);
    }

    #[test]
    fn test_event_rows_reset() {
        let mut rows = EventRows::new(EventId::new(1));
        rows.hits.push(hit(1, 1));
        assert!(!rows.is_empty());
        rows.reset(EventId::new(2));
        assert!(rows.is_empty());
        assert_eq!(rows.event_id, EventId::new(2));
    }

    #[test]
    fn test_row_counts_add() {
        let mut total = RowCounts::default();
        total += RowCounts { hits: 1, trajectories: 2, points: 3 };
        total += RowCounts { hits: 1, trajectories: 0, points: 0 };
        assert_eq!(total.total(), 7);
    }
}
