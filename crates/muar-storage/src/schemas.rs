//! Table schema definitions and binary format utilities

use crate::{error::Result, magic};

/// Column value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// 64-bit float
    F64,
}

impl ColumnType {
    /// Encoded width in bytes
    pub const fn width(&self) -> usize {
        match self {
            ColumnType::I32 | ColumnType::U32 => 4,
            ColumnType::F64 => 8,
        }
    }
}

/// Named, typed column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Column type
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

/// Declared layout of one output table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table kind
    pub kind: TableKind,
    /// Short table name
    pub name: &'static str,
    /// Table title
    pub title: &'static str,
    /// Columns in encoding order
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Encoded width of one row
    pub fn row_width(&self) -> usize {
        self.columns.iter().map(|c| c.ty.width()).sum()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// The output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// One row per hit
    Hits,
    /// One row per ancestry link of a hit
    Trajectories,
    /// One row per trajectory point of a link
    Points,
}

impl TableKind {
    /// All tables in container order
    pub const ALL: [TableKind; 3] = [TableKind::Hits, TableKind::Trajectories, TableKind::Points];

    /// Section magic number
    pub const fn magic(&self) -> [u8; 4] {
        match self {
            TableKind::Hits => magic::HITS,
            TableKind::Trajectories => magic::TRAJ,
            TableKind::Points => magic::PNTS,
        }
    }

    /// Table kind of a section magic number
    pub fn from_magic(found: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.magic() == found)
    }

    /// Declared schema
    pub const fn schema(&self) -> &'static TableSchema {
        match self {
            TableKind::Hits => &HITS_SCHEMA,
            TableKind::Trajectories => &TRAJECTORIES_SCHEMA,
            TableKind::Points => &POINTS_SCHEMA,
        }
    }
}

/// Hits table: `EventID, HitID, IonZ, IonA, VCode, Edep, Time, Hitxloc, Hityloc, Hitzloc`
pub const HITS_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Hits,
    name: "Score",
    title: "Hits",
    columns: &[
        col("EventID", ColumnType::U32),
        col("HitID", ColumnType::I32),
        col("IonZ", ColumnType::I32),
        col("IonA", ColumnType::I32),
        col("VCode", ColumnType::I32),
        col("Edep", ColumnType::F64),
        col("Time", ColumnType::F64),
        col("Hitxloc", ColumnType::F64),
        col("Hityloc", ColumnType::F64),
        col("Hitzloc", ColumnType::F64),
    ],
};

/// Trajectories table: `EventID, HitID, ParentID, Trjpdg, VtxName, TrjXVtx, TrjYVtx, TrjZVtx`
pub const TRAJECTORIES_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Trajectories,
    name: "Traj",
    title: "Trajectories",
    columns: &[
        col("EventID", ColumnType::U32),
        col("HitID", ColumnType::I32),
        col("ParentID", ColumnType::I32),
        col("Trjpdg", ColumnType::I32),
        col("VtxName", ColumnType::I32),
        col("TrjXVtx", ColumnType::F64),
        col("TrjYVtx", ColumnType::F64),
        col("TrjZVtx", ColumnType::F64),
    ],
};

/// Points table: `EventID, HitID, Link, TrjXPos, TrjYPos, TrjZPos`
pub const POINTS_SCHEMA: TableSchema = TableSchema {
    kind: TableKind::Points,
    name: "Points",
    title: "Trajectory points",
    columns: &[
        col("EventID", ColumnType::U32),
        col("HitID", ColumnType::I32),
        col("Link", ColumnType::U32),
        col("TrjXPos", ColumnType::F64),
        col("TrjYPos", ColumnType::F64),
        col("TrjZPos", ColumnType::F64),
    ],
};

/// Validate magic number for a binary format
pub fn validate_magic(data: &[u8], expected: [u8; 4]) -> Result<()> {
    if data.len() < 4 {
        return Err(crate::error::StorageError::InvalidFormat {
            reason: "Data too short for magic number".to_string(),
        });
    }

    let found = [data[0], data[1], data[2], data[3]];
    if found != expected {
        return Err(crate::error::StorageError::InvalidMagic { expected, found });
    }

    Ok(())
}

/// Calculate CRC32 checksum
pub fn calculate_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Validate checksum
pub fn validate_checksum(data: &[u8], expected: u32) -> Result<()> {
    let computed = calculate_checksum(data);
    if computed != expected {
        return Err(crate::error::StorageError::ChecksumMismatch { expected, computed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_validation() {
        let data = [0x48, 0x49, 0x54, 0x53, 0x00, 0x00]; // HITS + padding
        assert!(validate_magic(&data, magic::HITS).is_ok());

        let bad_data = [0x00, 0x00, 0x00, 0x00];
        assert!(validate_magic(&bad_data, magic::HITS).is_err());
        assert!(validate_magic(&[0x48], magic::HITS).is_err());
    }

    #[test]
    fn test_checksum() {
        let data = b"hello world";
        let checksum = calculate_checksum(data);
        assert!(validate_checksum(data, checksum).is_ok());
        assert!(validate_checksum(data, checksum + 1).is_err());
    }

    #[test]
    fn test_row_widths() {
        assert_eq!(HITS_SCHEMA.row_width(), 5 * 4 + 5 * 8);
        assert_eq!(TRAJECTORIES_SCHEMA.row_width(), 5 * 4 + 3 * 8);
        assert_eq!(POINTS_SCHEMA.row_width(), 3 * 4 + 3 * 8);
    }

    #[test]
    fn test_table_kind_magic() {
        for kind in TableKind::ALL {
            assert_eq!(TableKind::from_magic(kind.magic()), Some(kind));
            assert_eq!(kind.schema().kind, kind);
        }
        assert_eq!(TableKind::from_magic(*b"NOPE"), None);
    }
}
