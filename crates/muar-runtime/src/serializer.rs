//! Per-event row serialization
//!
//! At the end of an event the serializer reads the configured hit collection and the
//! trajectory store, resolves every hit's ancestry chain and stages the rows of all
//! tables. The staged batch only leaves the serializer once it is complete.

use crate::{
    ancestry::{AncestryResolver, ResolveStrategy},
    error::{Result, RuntimeError},
    geometry::GeometryTable,
    DEFAULT_HIT_COLLECTION,
};
use muar_storage::{
    rows::{HitRow, PointRow, TrajectoryRow},
    Event, EventId, EventRows, GeometryCode, HitRecord, ReportingUnits, TableSink,
    TrajectoryRecord,
};
use std::sync::Arc;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Name of the hit collection to read
    pub hit_collection: String,
    /// Trajectory lookup strategy
    pub strategy: ResolveStrategy,
    /// Units the rows are written in
    pub units: ReportingUnits,
    /// Also emit one point row per trajectory point
    pub export_points: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            hit_collection: DEFAULT_HIT_COLLECTION.to_string(),
            strategy: ResolveStrategy::default(),
            units: ReportingUnits::default(),
            export_points: false,
        }
    }
}

/// Row counts of one processed event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Processed event
    pub event_id: EventId,
    /// Hit rows emitted
    pub hits: usize,
    /// Trajectory rows emitted
    pub trajectories: usize,
    /// Point rows emitted
    pub points: usize,
}

impl EventOutcome {
    pub(crate) fn empty(event_id: EventId) -> Self {
        Self {
            event_id,
            ..Default::default()
        }
    }

    pub(crate) fn of(rows: &EventRows) -> Self {
        Self {
            event_id: rows.event_id,
            hits: rows.hits.len(),
            trajectories: rows.trajectories.len(),
            points: rows.points.len(),
        }
    }
}

/// Event serializer owned by one worker
#[derive(Debug)]
pub struct EventSerializer {
    geometry: Arc<GeometryTable>,
    config: SerializerConfig,
    staged: EventRows,
}

impl EventSerializer {
    /// Create a serializer over a shared geometry table
    pub fn new(geometry: Arc<GeometryTable>, config: SerializerConfig) -> Self {
        Self {
            geometry,
            config,
            staged: EventRows::default(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Geometry table in use
    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    /// Drop anything staged and start a new event
    pub fn begin_event(&mut self, event_id: EventId) {
        self.staged.reset(event_id);
    }

    /// Build all rows of an event
    ///
    /// Returns `Ok(None)` when the hit collection is empty. On error nothing staged for
    /// the event survives.
    pub fn end_event(&mut self, event: &Event) -> Result<Option<EventRows>> {
        self.staged.reset(event.id);

        let hits = event.collections.get(&self.config.hit_collection).ok_or_else(|| {
            RuntimeError::MissingHitCollection {
                collection: self.config.hit_collection.clone(),
                event: event.id,
            }
        })?;

        log::debug!("{} hits stored in event {}", hits.len(), event.id);
        if hits.is_empty() {
            return Ok(None);
        }

        let records = event.trajectories.records();
        log::debug!("{} trajectories stored in event {}", records.len(), event.id);

        if let Err(e) = self.stage(event.id, hits.as_slice(), records) {
            self.staged.reset(event.id);
            return Err(e);
        }

        let rows = std::mem::replace(&mut self.staged, EventRows::new(event.id));
        Ok(Some(rows))
    }

    /// Serialize one event and append its rows to a sink
    pub fn process<S: TableSink + ?Sized>(&mut self, event: &Event, sink: &mut S) -> Result<EventOutcome> {
        self.process_with(event, |rows| Ok(sink.append_event(rows)?))
    }

    /// Serialize one event and hand its rows to `emit`
    ///
    /// `emit` is not called for events without hits.
    pub fn process_with<F>(&mut self, event: &Event, emit: F) -> Result<EventOutcome>
    where
        F: FnOnce(EventRows) -> Result<()>,
    {
        self.begin_event(event.id);
        match self.end_event(event)? {
            Some(rows) => {
                let outcome = EventOutcome::of(&rows);
                emit(rows)?;
                Ok(outcome)
            }
            None => Ok(EventOutcome::empty(event.id)),
        }
    }

    fn stage(&mut self, event_id: EventId, hits: &[HitRecord], records: &[TrajectoryRecord]) -> Result<()> {
        let units = self.config.units;
        let event = event_id.raw();

        for hit in hits {
            let volume = match &hit.volume_name {
                Some(name) => Some(self.geometry.resolve(name)?),
                None => None,
            };
            let ion = hit.ion.unwrap_or_default();
            let [x, y, z] = hit.position.scaled(units.length.value);

            self.staged.hits.push(HitRow {
                event_id: event,
                hit_id: hit.track_id.raw(),
                ion_z: ion.z,
                ion_a: ion.a,
                volume_code: GeometryCode::column(volume),
                edep: units.energy.convert(hit.energy_deposit),
                time: units.time.convert(hit.time),
                x,
                y,
                z,
            });
        }

        let resolver = AncestryResolver::new(records, self.config.strategy);
        for hit in hits {
            let chain = resolver.resolve(hit.track_id)?;

            for (link, record) in chain.iter(records).enumerate() {
                let code = self.geometry.resolve(&record.vertex_volume)?;
                let [vtx_x, vtx_y, vtx_z] = record.vertex_position.scaled(units.length.value);

                self.staged.trajectories.push(TrajectoryRow {
                    event_id: event,
                    hit_id: hit.track_id.raw(),
                    parent_id: record.parent_id.raw(),
                    pdg: record.pdg_encoding,
                    volume_code: i32::from(code.raw()),
                    vtx_x,
                    vtx_y,
                    vtx_z,
                });

                if self.config.export_points {
                    for point in &record.points {
                        let [x, y, z] = point.scaled(units.length.value);
                        self.staged.points.push(PointRow {
                            event_id: event,
                            hit_id: hit.track_id.raw(),
                            link: link as u32,
                            x,
                            y,
                            z,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
