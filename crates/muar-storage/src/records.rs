//! Hit and trajectory records handed over by the simulation collaborators

use crate::ids::TrackId;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cartesian position in base length units (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 3]", into = "[f64; 3]"))]
pub struct ThreeVector {
    /// x component
    pub x: f64,
    /// y component
    pub y: f64,
    /// z component
    pub z: f64,
}

impl ThreeVector {
    /// Create a new vector
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Components scaled by `1 / unit`
    pub fn scaled(&self, unit: f64) -> [f64; 3] {
        [self.x / unit, self.y / unit, self.z / unit]
    }
}

impl From<[f64; 3]> for ThreeVector {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<ThreeVector> for [f64; 3] {
    fn from(v: ThreeVector) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for ThreeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Ion species of the particle that deposited energy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IonSpecies {
    /// Atomic number
    pub z: i32,
    /// Mass number
    pub a: i32,
}

impl IonSpecies {
    /// Create an ion species
    pub const fn new(z: i32, a: i32) -> Self {
        Self { z, a }
    }
}

/// One energy deposit in a sensitive volume
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HitRecord {
    /// Track that deposited the energy
    pub track_id: TrackId,
    /// Ion species, absent for non-ion hits
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ion: Option<IonSpecies>,
    /// Volume the depositing track started in, when the detector records it
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub volume_name: Option<String>,
    /// Global time (ns)
    pub time: f64,
    /// Energy deposit (MeV)
    pub energy_deposit: f64,
    /// Post-step position (mm)
    pub position: ThreeVector,
}

impl HitRecord {
    /// Create a hit without ion or volume information
    pub fn new(track_id: TrackId, time: f64, energy_deposit: f64, position: ThreeVector) -> Self {
        Self {
            track_id,
            ion: None,
            volume_name: None,
            time,
            energy_deposit,
            position,
        }
    }

    /// Attach ion species
    pub fn with_ion(mut self, z: i32, a: i32) -> Self {
        self.ion = Some(IonSpecies::new(z, a));
        self
    }

    /// Attach the origin volume name
    pub fn with_volume(mut self, name: impl Into<String>) -> Self {
        self.volume_name = Some(name.into());
        self
    }
}

/// Recorded path and metadata of one track
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryRecord {
    /// Track id
    pub track_id: TrackId,
    /// Parent track id, 0 for primaries
    pub parent_id: TrackId,
    /// PDG particle code
    pub pdg_encoding: i32,
    /// Particle name
    #[cfg_attr(feature = "serde", serde(default))]
    pub particle_name: String,
    /// Logical volume the track started in
    pub vertex_volume: String,
    /// Start position (mm)
    pub vertex_position: ThreeVector,
    /// Step points (mm), the first one being the start point
    ///
    /// Serialized segments may leave this out; readers seed it with the vertex.
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Vec<ThreeVector>,
}

impl TrajectoryRecord {
    /// Create a trajectory starting at its vertex
    pub fn new(
        track_id: TrackId,
        parent_id: TrackId,
        pdg_encoding: i32,
        vertex_volume: impl Into<String>,
        vertex_position: ThreeVector,
    ) -> Self {
        Self {
            track_id,
            parent_id,
            pdg_encoding,
            particle_name: String::new(),
            vertex_volume: vertex_volume.into(),
            vertex_position,
            points: vec![vertex_position],
        }
    }

    /// Set the particle name
    pub fn with_particle_name(mut self, name: impl Into<String>) -> Self {
        self.particle_name = name.into();
        self
    }

    /// Record the post-step position of another step
    pub fn append_step(&mut self, position: ThreeVector) {
        self.points.push(position);
    }

    /// Number of recorded points
    pub fn point_entries(&self) -> usize {
        self.points.len()
    }

    /// Start the point list at the vertex when no points were recorded
    pub fn seed_start_point(&mut self) {
        if self.points.is_empty() {
            self.points.push(self.vertex_position);
        }
    }

    /// Splice a continuation segment of the same track onto this one
    ///
    /// The continuation's first point repeats this trajectory's last point and is dropped,
    /// unless this trajectory has no points yet.
    pub fn merge(&mut self, continuation: TrajectoryRecord) {
        let skip = usize::from(!self.points.is_empty());
        self.points.extend(continuation.points.into_iter().skip(skip));
    }
}

impl fmt::Display for TrajectoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TrackID ={} : ParentID={}", self.track_id.raw(), self.parent_id.raw())?;
        writeln!(f, "Particle name : {}  PDG code : {}", self.particle_name, self.pdg_encoding)?;
        writeln!(f, "Vertex : {} mm  in volume {}", self.vertex_position, self.vertex_volume)?;
        writeln!(f, "  Current trajectory has {} points.", self.points.len())?;
        for (i, p) in self.points.iter().enumerate() {
            writeln!(f, "Point[{}] Position= {}", i, p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(points: &[[f64; 3]]) -> TrajectoryRecord {
        let mut t = TrajectoryRecord::new(TrackId::new(4), TrackId::new(1), 22, "Lar_log", points[0].into());
        for p in &points[1..] {
            t.append_step((*p).into());
        }
        t
    }

    #[test]
    fn test_merge_drops_duplicate_start() {
        let mut first = segment(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let second = segment(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]);

        first.merge(second);

        assert_eq!(first.point_entries(), 4);
        assert_eq!(first.points[1], ThreeVector::new(1.0, 0.0, 0.0));
        assert_eq!(first.points[2], ThreeVector::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_merge_single_point_continuation() {
        let mut first = segment(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        first.merge(segment(&[[1.0, 0.0, 0.0]]));
        assert_eq!(first.point_entries(), 2);
    }

    #[test]
    fn test_merge_into_empty_keeps_every_point() {
        let mut first = segment(&[[0.0, 0.0, 0.0]]);
        first.points.clear();
        first.merge(segment(&[[5.0, 0.0, 0.0], [6.0, 0.0, 0.0]]));
        assert_eq!(first.points, vec![ThreeVector::new(5.0, 0.0, 0.0), ThreeVector::new(6.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_seed_start_point() {
        let mut t = segment(&[[0.0, 0.0, 7.0]]);
        t.seed_start_point();
        assert_eq!(t.point_entries(), 1);

        t.points.clear();
        t.seed_start_point();
        assert_eq!(t.points, vec![ThreeVector::new(0.0, 0.0, 7.0)]);
    }

    #[test]
    fn test_hit_builders() {
        let hit = HitRecord::new(TrackId::new(7), 3.4, 1.2, ThreeVector::ZERO)
            .with_ion(32, 77)
            .with_volume("Ge_log");
        assert_eq!(hit.ion, Some(IonSpecies::new(32, 77)));
        assert_eq!(hit.volume_name.as_deref(), Some("Ge_log"));
    }

    #[test]
    fn test_display_trajectory() {
        let t = segment(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]).with_particle_name("gamma");
        let text = t.to_string();
        assert!(text.contains("TrackID =4 : ParentID=1"));
        assert!(text.contains("Particle name : gamma  PDG code : 22"));
        assert!(text.contains("has 2 points"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_three_vector_serde_as_array() {
        let v: ThreeVector = serde_json::from_str("[1.0, 2.0, 3.5]").unwrap();
        assert_eq!(v, ThreeVector::new(1.0, 2.0, 3.5));
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.0,2.0,3.5]");
    }
}
