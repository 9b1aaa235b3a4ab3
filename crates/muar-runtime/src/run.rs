//! Run orchestration over a batch of events
//!
//! The run manager owns the geometry table for the whole run and hands every worker its
//! own [`EventSerializer`]. Rows reach the output only through a [`SharedSink`], one
//! complete event at a time. The first fatal error aborts the run.

use crate::{
    error::{Result, RuntimeError},
    geometry::{GeometryTable, GeometryVariant},
    serializer::{EventOutcome, EventSerializer, SerializerConfig},
    sink::SharedSink,
};
use muar_storage::{Event, TableSink};
use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Worker threads
    pub workers: usize,
    /// Per-worker serializer settings
    pub serializer: SerializerConfig,
    /// Detector geometry variant
    pub geometry: GeometryVariant,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            serializer: SerializerConfig::default(),
            geometry: GeometryVariant::default(),
        }
    }
}

impl RunConfig {
    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the geometry variant
    pub fn with_geometry(mut self, geometry: GeometryVariant) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the serializer configuration
    pub fn with_serializer(mut self, serializer: SerializerConfig) -> Self {
        self.serializer = serializer;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(RuntimeError::invalid_parameter(
                "workers",
                self.workers.to_string(),
                ">= 1",
            ));
        }
        if self.serializer.hit_collection.is_empty() {
            return Err(RuntimeError::invalid_config("hit collection name is empty"));
        }
        Ok(())
    }

    /// Worker count limited to the cores of this machine
    pub fn effective_workers(&self) -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.workers.clamp(1, cores)
    }
}

/// Totals of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events processed
    pub events: u64,
    /// Events without hits, which produced no rows
    pub skipped_events: u64,
    /// Hit rows written
    pub hit_rows: u64,
    /// Trajectory rows written
    pub trajectory_rows: u64,
    /// Point rows written
    pub point_rows: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &EventOutcome) {
        self.events += 1;
        if outcome.hits == 0 {
            self.skipped_events += 1;
        }
        self.hit_rows += outcome.hits as u64;
        self.trajectory_rows += outcome.trajectories as u64;
        self.point_rows += outcome.points as u64;
    }
}

/// Drives serializers over a batch of events
#[derive(Debug, Clone)]
pub struct RunManager {
    config: RunConfig,
    geometry: Arc<GeometryTable>,
    workers: usize,
}

impl RunManager {
    /// Validate the configuration and build the geometry table
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;

        let workers = config.effective_workers();
        if workers < config.workers {
            log::warn!(
                "Requested {} workers but only {} cores are available",
                config.workers,
                workers
            );
        }

        let geometry = Arc::new(GeometryTable::for_variant(config.geometry));
        log::info!(
            "Geometry '{}' with {} volumes, {} worker(s)",
            config.geometry,
            geometry.len(),
            workers
        );

        Ok(Self {
            config,
            geometry,
            workers,
        })
    }

    /// Run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Shared geometry table
    pub fn geometry(&self) -> &Arc<GeometryTable> {
        &self.geometry
    }

    /// Worker count actually used
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// New serializer for one worker
    pub fn serializer(&self) -> EventSerializer {
        EventSerializer::new(Arc::clone(&self.geometry), self.config.serializer.clone())
    }

    /// Process all events into the sink
    pub fn run<S: TableSink>(&self, events: &[Event], sink: &SharedSink<S>) -> Result<RunSummary> {
        self.run_with_progress(events, sink, |_| {})
    }

    /// Process all events, calling `progress` after each one
    pub fn run_with_progress<S, F>(
        &self,
        events: &[Event],
        sink: &SharedSink<S>,
        progress: F,
    ) -> Result<RunSummary>
    where
        S: TableSink,
        F: Fn(&EventOutcome) + Send + Sync,
    {
        log::info!("Processing {} events", events.len());
        Self::check_unique_ids(events)?;

        let outcomes = self.process_all(events, sink, &progress)?;

        let mut summary = RunSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }
        sink.flush()?;

        log::info!(
            "Run complete: {} events ({} without hits), {} hit rows, {} trajectory rows",
            summary.events,
            summary.skipped_events,
            summary.hit_rows,
            summary.trajectory_rows
        );
        Ok(summary)
    }

    fn check_unique_ids(events: &[Event]) -> Result<()> {
        let mut seen = HashSet::with_capacity(events.len());
        match events.iter().find(|event| !seen.insert(event.id)) {
            Some(event) => Err(RuntimeError::DuplicateEvent { event: event.id }),
            None => Ok(()),
        }
    }

    fn process_one<S: TableSink>(
        serializer: &mut EventSerializer,
        event: &Event,
        sink: &SharedSink<S>,
    ) -> Result<EventOutcome> {
        serializer.process_with(event, |rows| sink.append_event(rows))
    }

    fn process_sequential<S, F>(
        &self,
        events: &[Event],
        sink: &SharedSink<S>,
        progress: &F,
    ) -> Result<Vec<EventOutcome>>
    where
        S: TableSink,
        F: Fn(&EventOutcome) + Send + Sync,
    {
        let mut serializer = self.serializer();
        events
            .iter()
            .map(|event| {
                let outcome = Self::process_one(&mut serializer, event, sink)?;
                progress(&outcome);
                Ok(outcome)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn process_all<S, F>(
        &self,
        events: &[Event],
        sink: &SharedSink<S>,
        progress: &F,
    ) -> Result<Vec<EventOutcome>>
    where
        S: TableSink,
        F: Fn(&EventOutcome) + Send + Sync,
    {
        if self.workers <= 1 {
            return self.process_sequential(events, sink, progress);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| RuntimeError::invalid_config(format!("cannot start worker pool: {e}")))?;

        pool.install(|| {
            events
                .par_iter()
                .map_init(
                    || self.serializer(),
                    |serializer, event| {
                        let outcome = Self::process_one(serializer, event, sink)?;
                        progress(&outcome);
                        Ok(outcome)
                    },
                )
                .collect()
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn process_all<S, F>(
        &self,
        events: &[Event],
        sink: &SharedSink<S>,
        progress: &F,
    ) -> Result<Vec<EventOutcome>>
    where
        S: TableSink,
        F: Fn(&EventOutcome) + Send + Sync,
    {
        self.process_sequential(events, sink, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muar_storage::{
        EventId, HitRecord, HitStore, MemoryTableSink, ThreeVector, TrackId, TrajectoryRecord,
        TrajectoryStore,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(id: u32, hits: &[i32]) -> Event {
        let trajectories = TrajectoryStore::from(vec![
            TrajectoryRecord::new(TrackId::new(1), TrackId::NO_PARENT, 13, "Cavern_log", ThreeVector::ZERO),
            TrajectoryRecord::new(TrackId::new(2), TrackId::new(1), 11, "Lar_log", ThreeVector::ZERO),
        ]);
        let hits = hits
            .iter()
            .map(|&t| HitRecord::new(TrackId::new(t), 1.0, 0.2, ThreeVector::ZERO))
            .collect::<HitStore>();
        Event::new(EventId::new(id))
            .with_collection(crate::DEFAULT_HIT_COLLECTION, hits)
            .with_trajectories(trajectories)
    }

    #[test]
    fn test_config_validation() {
        assert!(RunConfig::default().validate().is_ok());
        assert!(RunConfig::default().with_workers(0).validate().is_err());
        assert!(RunManager::new(RunConfig::default().with_workers(0)).is_err());

        let config = RunConfig::default().with_workers(usize::MAX);
        assert!(config.effective_workers() >= 1);
        assert!(config.effective_workers() < usize::MAX);
    }

    #[test]
    fn test_summary_counts() {
        let manager = RunManager::new(RunConfig::default()).unwrap();
        let sink = SharedSink::new(MemoryTableSink::new());
        let events = vec![event(0, &[2]), event(1, &[]), event(2, &[1, 2, 9])];

        let calls = AtomicUsize::new(0);
        let summary = manager
            .run_with_progress(&events, &sink, |_| {
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        assert_eq!(summary.events, 3);
        assert_eq!(summary.skipped_events, 1);
        assert_eq!(summary.hit_rows, 4);
        // 2 -> [2, 1], 1 -> [1], 9 -> []
        assert_eq!(summary.trajectory_rows, 2 + 1 + 2);
        assert_eq!(sink.event_count(), 2);
    }

    #[test]
    fn test_fatal_error_aborts_run() {
        let manager = RunManager::new(RunConfig::default()).unwrap();
        let sink = SharedSink::new(MemoryTableSink::new());

        let mut bad = event(1, &[2]);
        bad.trajectories.push(TrajectoryRecord::new(
            TrackId::new(3),
            TrackId::NO_PARENT,
            22,
            "Mars_log",
            ThreeVector::ZERO,
        ));
        bad.collections
            .entry(crate::DEFAULT_HIT_COLLECTION)
            .push(HitRecord::new(TrackId::new(3), 1.0, 0.1, ThreeVector::ZERO));

        let err = manager.run(&[event(0, &[1]), bad], &sink).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownVolume { .. }));
        assert!(sink.lock().tables().hits.iter().all(|r| r.event_id != 1));
    }

    #[test]
    fn test_duplicate_event_ids_rejected() {
        let manager = RunManager::new(RunConfig::default().with_workers(2)).unwrap();
        let sink = SharedSink::new(MemoryTableSink::new());
        let events = vec![event(0, &[2]), event(4, &[1]), event(0, &[1, 2])];

        let err = manager.run(&events, &sink).unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateEvent { event } if event == EventId::new(0)));
        assert!(err.is_fatal());
        assert_eq!(sink.event_count(), 0);
    }
}
