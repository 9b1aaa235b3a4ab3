//! In-memory table sink

use crate::{
    error::Result,
    rows::{EventRows, RowCounts, TableSet},
    traits::TableSink,
};

/// Sink keeping all rows in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSink {
    tables: TableSet,
    events: u64,
}

impl MemoryTableSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted rows
    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Take the accepted rows, sorted by event
    pub fn into_tables(mut self) -> TableSet {
        self.tables.sort_by_event();
        self.tables
    }
}

impl TableSink for MemoryTableSink {
    fn append_event(&mut self, rows: EventRows) -> Result<()> {
        log::trace!("Appending {:?} rows for event {}", rows.counts(), rows.event_id);
        self.tables.extend(rows);
        self.events += 1;
        Ok(())
    }

    fn row_counts(&self) -> RowCounts {
        self.tables.counts()
    }

    fn event_count(&self) -> u64 {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ids::EventId, rows::HitRow};

    #[test]
    fn test_memory_sink_accumulates() {
        let mut sink = MemoryTableSink::new();
        for id in [2u32, 1] {
            let mut rows = EventRows::new(EventId::new(id));
            rows.hits.push(HitRow {
                event_id: id,
                hit_id: 1,
                ion_z: 0,
                ion_a: 0,
                volume_code: -1,
                edep: 0.1,
                time: 0.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            });
            sink.append_event(rows).unwrap();
        }

        assert_eq!(sink.event_count(), 2);
        assert_eq!(sink.row_counts().hits, 2);
        let tables = sink.into_tables();
        assert_eq!(tables.event_ids(), vec![1, 2]);
        assert_eq!(tables.hits[0].event_id, 1);
    }
}
