//! File-based table sink and reader

use crate::{
    error::{Result, StorageError},
    format::{decode_tables, encode_tables},
    magic,
    rows::{EventRows, RowCounts, TableSet},
    traits::TableSink,
};

use std::fs::File;
use std::path::{Path, PathBuf};

/// On-disk encoding of the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// MUAR binary container
    #[default]
    Binary,
    /// Pretty-printed JSON object with one array per table
    #[cfg(feature = "serde")]
    Json,
}

/// Sink buffering a run's rows and writing them to one file on finish
///
/// Rows are sorted by event id (keeping per-event order) before writing, so the file
/// does not depend on the order in which workers delivered events.
#[derive(Debug)]
pub struct FileTableSink {
    path: PathBuf,
    format: FileFormat,
    tables: TableSet,
    events: u64,
    finished: bool,
}

impl FileTableSink {
    /// Create a sink writing the MUAR binary container
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_format(path, FileFormat::Binary)
    }

    /// Create a sink writing the given format
    pub fn with_format<P: AsRef<Path>>(path: P, format: FileFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path,
            format,
            tables: TableSet::new(),
            events: 0,
            finished: false,
        })
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the file; further appends are rejected
    pub fn finish(&mut self) -> Result<RowCounts> {
        if self.finished {
            return Err(StorageError::sink_finished(self.path.display().to_string()));
        }
        self.tables.sort_by_event();

        let bytes = match self.format {
            FileFormat::Binary => encode_tables(&self.tables),
            #[cfg(feature = "serde")]
            FileFormat::Json => serde_json::to_vec_pretty(&self.tables)?,
        };

        // Write next to the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("partial");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        self.finished = true;
        let counts = self.tables.counts();
        log::info!(
            "Wrote {} hit rows, {} trajectory rows, {} point rows from {} events to {}",
            counts.hits,
            counts.trajectories,
            counts.points,
            self.events,
            self.path.display()
        );
        Ok(counts)
    }
}

impl TableSink for FileTableSink {
    fn append_event(&mut self, rows: EventRows) -> Result<()> {
        if self.finished {
            return Err(StorageError::sink_finished(self.path.display().to_string()));
        }
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

/// Tables read back from a file
#[derive(Debug, Clone)]
pub struct TableFile {
    /// Source path
    pub path: PathBuf,
    /// Detected format
    pub format: FileFormat,
    /// Decoded tables
    pub tables: TableSet,
}

impl TableFile {
    /// Open a table file, detecting its format from the leading bytes
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        if file.metadata()?.len() == 0 {
            return Err(StorageError::invalid_format(format!("{} is empty", path.display())));
        }

        // SAFETY: the mapping is read-only and dropped before this function returns;
        // table files are written via rename, so they are not modified while mapped.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        let (format, tables) = if mmap.starts_with(&magic::MUAR) {
            let (header, tables) = decode_tables(&mmap)?;
            log::debug!("Decoded {} ({} rows)", path.display(), header.total_rows);
            (FileFormat::Binary, tables)
        } else {
            Self::decode_text(&mmap)?
        };

        Ok(Self { path, format, tables })
    }

    #[cfg(feature = "serde")]
    fn decode_text(data: &[u8]) -> Result<(FileFormat, TableSet)> {
        Ok((FileFormat::Json, serde_json::from_slice(data)?))
    }

    #[cfg(not(feature = "serde"))]
    fn decode_text(data: &[u8]) -> Result<(FileFormat, TableSet)> {
        let mut found = [0u8; 4];
        for (dst, src) in found.iter_mut().zip(data) {
            *dst = *src;
        }
        Err(StorageError::InvalidMagic { expected: magic::MUAR, found })
    }
}
