//! Consistency checks on written tables
//!
//! Without the source events a table file can still be checked for referential
//! integrity: every trajectory and point row belongs to a written hit and every volume
//! code lies in the geometry table. With the source events the trajectory row count of
//! each hit is recomputed from the ancestry chains.

use std::collections::{BTreeMap, HashMap};

use muar_runtime::{ancestry::resolve_scan, GeometryTable, Result as RuntimeResult};
use muar_storage::{Event, GeometryCode, TableSet};

/// Problems found in one table set
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Hits checked
    pub hits_checked: usize,
    /// Trajectory rows checked
    pub trajectories_checked: usize,
    /// Human-readable problems
    pub problems: Vec<String>,
}

impl VerifyReport {
    /// Whether no problem was found
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

type HitKey = (u32, i32);

fn hit_multiplicity(tables: &TableSet) -> HashMap<HitKey, usize> {
    let mut hits = HashMap::new();
    for row in &tables.hits {
        *hits.entry((row.event_id, row.hit_id)).or_insert(0) += 1;
    }
    hits
}

/// Check references and volume codes
pub fn verify_tables(tables: &TableSet, geometry: &GeometryTable) -> VerifyReport {
    let mut report = VerifyReport {
        hits_checked: tables.hits.len(),
        trajectories_checked: tables.trajectories.len(),
        ..Default::default()
    };
    let volumes = geometry.len() as i32;
    let hits = hit_multiplicity(tables);

    for row in &tables.hits {
        if row.volume_code != GeometryCode::NONE_COLUMN && !(0..volumes).contains(&row.volume_code) {
            report.problems.push(format!(
                "hit {} of event {} has volume code {} outside geometry '{}'",
                row.hit_id,
                row.event_id,
                row.volume_code,
                geometry.variant()
            ));
        }
    }

    let mut links: HashMap<HitKey, usize> = HashMap::new();
    for row in &tables.trajectories {
        let key = (row.event_id, row.hit_id);
        if !hits.contains_key(&key) {
            report.problems.push(format!(
                "trajectory row of event {} references missing hit {}",
                row.event_id, row.hit_id
            ));
        }
        if !(0..volumes).contains(&row.volume_code) {
            report.problems.push(format!(
                "trajectory row of hit {} in event {} has volume code {} outside geometry '{}'",
                row.hit_id,
                row.event_id,
                row.volume_code,
                geometry.variant()
            ));
        }
        *links.entry(key).or_insert(0) += 1;
    }

    for row in &tables.points {
        let key = (row.event_id, row.hit_id);
        match (hits.get(&key), links.get(&key)) {
            (Some(&copies), Some(&rows)) if (row.link as usize) < rows / copies.max(1) => {}
            _ => report.problems.push(format!(
                "point row of hit {} in event {} references missing link {}",
                row.hit_id, row.event_id, row.link
            )),
        }
    }

    report
}

/// Compare per-hit trajectory row counts with chains resolved from the source events
pub fn verify_against_events(
    tables: &TableSet,
    events: &[Event],
    hit_collection: &str,
) -> RuntimeResult<VerifyReport> {
    let mut report = VerifyReport {
        hits_checked: tables.hits.len(),
        trajectories_checked: tables.trajectories.len(),
        ..Default::default()
    };

    let mut emitted: HashMap<HitKey, usize> = HashMap::new();
    for row in &tables.trajectories {
        *emitted.entry((row.event_id, row.hit_id)).or_insert(0) += 1;
    }

    let mut expected_hits: BTreeMap<u32, usize> = BTreeMap::new();
    for event in events {
        let Some(hits) = event.collections.get(hit_collection) else {
            continue;
        };
        let records = event.trajectories.records();
        let mut expected: HashMap<HitKey, usize> = HashMap::new();
        for hit in hits.iter() {
            let chain = resolve_scan(hit.track_id, records)?;
            *expected.entry((event.id.raw(), hit.track_id.raw())).or_insert(0) += chain.len();
        }
        expected_hits.insert(event.id.raw(), hits.len());

        for (key, count) in expected {
            let found = emitted.get(&key).copied().unwrap_or(0);
            if found != count {
                report.problems.push(format!(
                    "hit {} of event {}: {} trajectory rows, ancestry chain gives {}",
                    key.1, key.0, found, count
                ));
            }
        }
    }

    let mut written_hits: BTreeMap<u32, usize> = BTreeMap::new();
    for row in &tables.hits {
        *written_hits.entry(row.event_id).or_insert(0) += 1;
    }
    for (event, count) in &expected_hits {
        let found = written_hits.get(event).copied().unwrap_or(0);
        if found != *count {
            report.problems.push(format!(
                "event {}: {} hit rows written, {} hits stored",
                event, found, count
            ));
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use muar_runtime::{GeometryVariant, RunConfig, RunManager, SharedSink};
    use muar_storage::{
        EventId, HitRecord, HitStore, MemoryTableSink, ThreeVector, TrackId, TrajectoryRecord,
        TrajectoryStore,
    };

    fn sample_events() -> Vec<Event> {
        (0..3)
            .map(|id| {
                let hits: HitStore = vec![
                    HitRecord::new(TrackId::new(7), 3.4, 1.2, ThreeVector::ZERO),
                    HitRecord::new(TrackId::new(3), 1.0, 0.4, ThreeVector::ZERO).with_volume("Ge_log"),
                ]
                .into();
                let mut muon = TrajectoryRecord::new(TrackId::new(3), TrackId::NO_PARENT, -13, "Lar_log", ThreeVector::ZERO);
                muon.append_step(ThreeVector::new(0.0, 0.0, 10.0));
                let trajectories = TrajectoryStore::from(vec![
                    TrajectoryRecord::new(TrackId::new(7), TrackId::new(3), 11, "Ge_log", ThreeVector::ZERO),
                    muon,
                ]);
                Event::new(EventId::new(id))
                    .with_collection(muar_runtime::DEFAULT_HIT_COLLECTION, hits)
                    .with_trajectories(trajectories)
            })
            .collect()
    }

    fn tables(events: &[Event], export_points: bool) -> TableSet {
        let mut config = RunConfig::default();
        config.serializer.export_points = export_points;
        let manager = RunManager::new(config).unwrap();
        let sink = SharedSink::new(MemoryTableSink::new());
        manager.run(events, &sink).unwrap();
        sink.into_inner().into_tables()
    }

    #[test]
    fn test_clean_run_verifies() {
        let events = sample_events();
        let tables = tables(&events, true);
        let geometry = GeometryTable::for_variant(GeometryVariant::Baseline);

        let report = verify_tables(&tables, &geometry);
        assert!(report.is_ok(), "{:?}", report.problems);
        assert_eq!(report.trajectories_checked, 9);

        let report = verify_against_events(&tables, &events, muar_runtime::DEFAULT_HIT_COLLECTION).unwrap();
        assert!(report.is_ok(), "{:?}", report.problems);
    }

    #[test]
    fn test_dropped_row_is_reported() {
        let events = sample_events();
        let mut tables = tables(&events, false);
        tables.trajectories.remove(0);

        let report = verify_against_events(&tables, &events, muar_runtime::DEFAULT_HIT_COLLECTION).unwrap();
        assert_eq!(report.problems.len(), 1);
    }

    #[test]
    fn test_dangling_rows_are_reported() {
        let events = sample_events();
        let mut tables = tables(&events, true);
        tables.hits.retain(|r| r.event_id != 2);
        tables.trajectories[0].volume_code = 99;

        let geometry = GeometryTable::for_variant(GeometryVariant::Baseline);
        let report = verify_tables(&tables, &geometry);
        assert!(!report.is_ok());
        assert!(report.problems.iter().any(|p| p.contains("missing hit")));
        assert!(report.problems.iter().any(|p| p.contains("volume code 99")));
        assert!(report.problems.iter().any(|p| p.contains("missing link")));
    }
}
