//! Single output destination shared by all workers

use crate::error::Result;
use muar_storage::{EventRows, RowCounts, TableSink};
use parking_lot::{Mutex, MutexGuard};

/// Thread-safe wrapper around one table sink
///
/// Each append holds the lock for a whole event, so rows of different events never
/// interleave inside the sink.
#[derive(Debug, Default)]
pub struct SharedSink<S: TableSink> {
    inner: Mutex<S>,
}

impl<S: TableSink> SharedSink<S> {
    /// Wrap a sink
    pub fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(sink),
        }
    }

    /// Append one event's rows
    pub fn append_event(&self, rows: EventRows) -> Result<()> {
        self.inner.lock().append_event(rows)?;
        Ok(())
    }

    /// Rows accepted so far
    pub fn row_counts(&self) -> RowCounts {
        self.inner.lock().row_counts()
    }

    /// Events accepted so far
    pub fn event_count(&self) -> u64 {
        self.inner.lock().event_count()
    }

    /// Flush the wrapped sink
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()?;
        Ok(())
    }

    /// Lock the wrapped sink
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock()
    }

    /// Unwrap the sink
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}
