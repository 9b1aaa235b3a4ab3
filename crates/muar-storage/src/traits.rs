//! Core trait definitions for the storage layer

use crate::{
    error::Result,
    rows::{EventRows, RowCounts},
};

/// Destination of per-event output rows
///
/// A sink receives whole events only; it never sees a partially built batch.
pub trait TableSink: Send {
    /// Append all rows of one event
    fn append_event(&mut self, rows: EventRows) -> Result<()>;

    /// Rows accepted so far
    fn row_counts(&self) -> RowCounts;

    /// Number of events accepted so far
    fn event_count(&self) -> u64;

    /// Persist buffered rows
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: TableSink + ?Sized> TableSink for Box<S> {
    fn append_event(&mut self, rows: EventRows) -> Result<()> {
        (**self).append_event(rows)
    }

    fn row_counts(&self) -> RowCounts {
        (**self).row_counts()
    }

    fn event_count(&self) -> u64 {
        (**self).event_count()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
