//! MUAR table container format
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! file header    magic "MUAR" | version u32 | table_count u32 | flags u32 | total_rows u64
//! per section    magic u8[4]  | row_count u64 | row_width u32 | payload_len u64 | crc32 u32
//!                rows (row_count * row_width bytes, columns in schema order)
//! ```
//!
//! The hits and trajectories sections are always present; the points section only when
//! point rows were exported.

use crate::{
    error::{Result, StorageError},
    magic,
    rows::{HitRow, PointRow, TableSet, TrajectoryRow},
    schemas::{calculate_checksum, validate_checksum, validate_magic, TableKind},
    STORAGE_VERSION,
};

/// Container flags
pub struct MuarFlags;
impl MuarFlags {
    /// A points section is present
    pub const POINTS: u32 = 1;
}

/// Container file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuarHeader {
    /// Magic number "MUAR"
    pub magic: [u8; 4],
    /// Format version (current: 1)
    pub version: u32,
    /// Number of table sections
    pub table_count: u32,
    /// Container flags
    pub flags: u32,
    /// Rows across all sections
    pub total_rows: u64,
}

impl MuarHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 24;

    /// Create a header for the given tables
    pub fn for_tables(tables: &TableSet) -> Self {
        let with_points = !tables.points.is_empty();
        Self {
            magic: magic::MUAR,
            version: STORAGE_VERSION,
            table_count: if with_points { 3 } else { 2 },
            flags: if with_points { MuarFlags::POINTS } else { 0 },
            total_rows: tables.counts().total(),
        }
    }

    /// Validate this header
    pub fn validate(&self) -> Result<()> {
        validate_magic(&self.magic, magic::MUAR)?;

        if self.version != STORAGE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                version: self.version,
                supported: STORAGE_VERSION,
            });
        }

        if self.table_count < 2 || self.table_count > TableKind::ALL.len() as u32 {
            return Err(StorageError::invalid_format(format!(
                "table count {} outside 2..=3",
                self.table_count
            )));
        }

        Ok(())
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.table_count.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.total_rows.to_le_bytes());
    }

    fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            magic: reader.magic()?,
            version: reader.u32()?,
            table_count: reader.u32()?,
            flags: reader.u32()?,
            total_rows: reader.u64()?,
        })
    }
}

/// Header of one table section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Section magic number
    pub magic: [u8; 4],
    /// Number of rows
    pub row_count: u64,
    /// Encoded row width in bytes
    pub row_width: u32,
    /// Payload length in bytes
    pub payload_len: u64,
    /// CRC32 of the payload
    pub checksum: u32,
}

impl SectionHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 28;

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&self.row_count.to_le_bytes());
        out.extend_from_slice(&self.row_width.to_le_bytes());
        out.extend_from_slice(&self.payload_len.to_le_bytes());
        out.extend_from_slice(&self.checksum.to_le_bytes());
    }

    fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            magic: reader.magic()?,
            row_count: reader.u64()?,
            row_width: reader.u32()?,
            payload_len: reader.u64()?,
            checksum: reader.u32()?,
        })
    }
}

/// Little-endian cursor over a byte slice
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len()).ok_or_else(|| {
            StorageError::invalid_format(format!(
                "unexpected end of data: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.data.len()
            ))
        })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn magic(&mut self) -> Result<[u8; 4]> {
        self.array::<4>()
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }
}

fn encode_hit(row: &HitRow, out: &mut Vec<u8>) {
    out.extend_from_slice(&row.event_id.to_le_bytes());
    out.extend_from_slice(&row.hit_id.to_le_bytes());
    out.extend_from_slice(&row.ion_z.to_le_bytes());
    out.extend_from_slice(&row.ion_a.to_le_bytes());
    out.extend_from_slice(&row.volume_code.to_le_bytes());
    for v in [row.edep, row.time, row.x, row.y, row.z] {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn decode_hit(r: &mut ByteReader<'_>) -> Result<HitRow> {
    Ok(HitRow {
        event_id: r.u32()?,
        hit_id: r.i32()?,
        ion_z: r.i32()?,
        ion_a: r.i32()?,
        volume_code: r.i32()?,
        edep: r.f64()?,
        time: r.f64()?,
        x: r.f64()?,
        y: r.f64()?,
        z: r.f64()?,
    })
}

fn encode_trajectory(row: &TrajectoryRow, out: &mut Vec<u8>) {
    out.extend_from_slice(&row.event_id.to_le_bytes());
    out.extend_from_slice(&row.hit_id.to_le_bytes());
    out.extend_from_slice(&row.parent_id.to_le_bytes());
    out.extend_from_slice(&row.pdg.to_le_bytes());
    out.extend_from_slice(&row.volume_code.to_le_bytes());
    for v in [row.vtx_x, row.vtx_y, row.vtx_z] {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn decode_trajectory(r: &mut ByteReader<'_>) -> Result<TrajectoryRow> {
    Ok(TrajectoryRow {
        event_id: r.u32()?,
        hit_id: r.i32()?,
        parent_id: r.i32()?,
        pdg: r.i32()?,
        volume_code: r.i32()?,
        vtx_x: r.f64()?,
        vtx_y: r.f64()?,
        vtx_z: r.f64()?,
    })
}

fn encode_point(row: &PointRow, out: &mut Vec<u8>) {
    out.extend_from_slice(&row.event_id.to_le_bytes());
    out.extend_from_slice(&row.hit_id.to_le_bytes());
    out.extend_from_slice(&row.link.to_le_bytes());
    for v in [row.x, row.y, row.z] {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn decode_point(r: &mut ByteReader<'_>) -> Result<PointRow> {
    Ok(PointRow {
        event_id: r.u32()?,
        hit_id: r.i32()?,
        link: r.u32()?,
        x: r.f64()?,
        y: r.f64()?,
        z: r.f64()?,
    })
}

fn write_section<T>(kind: TableKind, rows: &[T], encode: fn(&T, &mut Vec<u8>), out: &mut Vec<u8>) {
    let row_width = kind.schema().row_width();
    let mut payload = Vec::with_capacity(rows.len() * row_width);
    for row in rows {
        encode(row, &mut payload);
    }
    debug_assert_eq!(payload.len(), rows.len() * row_width);

    let header = SectionHeader {
        magic: kind.magic(),
        row_count: rows.len() as u64,
        row_width: row_width as u32,
        payload_len: payload.len() as u64,
        checksum: calculate_checksum(&payload),
    };
    header.write(out);
    out.extend_from_slice(&payload);
}

/// Encode tables into a MUAR container
pub fn encode_tables(tables: &TableSet) -> Vec<u8> {
    let header = MuarHeader::for_tables(tables);
    let counts = tables.counts();
    let mut out = Vec::with_capacity(
        MuarHeader::SIZE
            + 3 * SectionHeader::SIZE
            + counts.hits as usize * TableKind::Hits.schema().row_width()
            + counts.trajectories as usize * TableKind::Trajectories.schema().row_width()
            + counts.points as usize * TableKind::Points.schema().row_width(),
    );

    header.write(&mut out);
    write_section(TableKind::Hits, &tables.hits, encode_hit, &mut out);
    write_section(TableKind::Trajectories, &tables.trajectories, encode_trajectory, &mut out);
    if header.flags & MuarFlags::POINTS != 0 {
        write_section(TableKind::Points, &tables.points, encode_point, &mut out);
    }
    out
}

fn read_section<T>(
    reader: &mut ByteReader<'_>,
    expected: TableKind,
    decode: fn(&mut ByteReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let header = SectionHeader::read(reader)?;
    validate_magic(&header.magic, expected.magic())?;

    let row_width = expected.schema().row_width();
    if header.row_width as usize != row_width {
        return Err(StorageError::invalid_format(format!(
            "{} section row width {} does not match schema width {}",
            expected.schema().name,
            header.row_width,
            row_width
        )));
    }
    let declared = header
        .row_count
        .checked_mul(row_width as u64)
        .filter(|&len| len == header.payload_len)
        .ok_or_else(|| {
            StorageError::invalid_format(format!(
                "{} section declares {} rows but {} payload bytes",
                expected.schema().name,
                header.row_count,
                header.payload_len
            ))
        })?;

    let payload = reader.take(declared as usize)?;
    validate_checksum(payload, header.checksum)?;

    let mut rows_reader = ByteReader::new(payload);
    let mut rows = Vec::with_capacity(header.row_count as usize);
    for _ in 0..header.row_count {
        rows.push(decode(&mut rows_reader)?);
    }
    Ok(rows)
}

/// Decode a MUAR container
pub fn decode_tables(data: &[u8]) -> Result<(MuarHeader, TableSet)> {
    let mut reader = ByteReader::new(data);
    let header = MuarHeader::read(&mut reader)?;
    header.validate()?;

    let mut tables = TableSet::new();
    tables.hits = read_section(&mut reader, TableKind::Hits, decode_hit)?;
    tables.trajectories = read_section(&mut reader, TableKind::Trajectories, decode_trajectory)?;
    if header.table_count == 3 {
        tables.points = read_section(&mut reader, TableKind::Points, decode_point)?;
    }

    if !reader.is_at_end() {
        return Err(StorageError::invalid_format("trailing bytes after last section"));
    }
    if tables.counts().total() != header.total_rows {
        return Err(StorageError::invalid_format(format!(
            "header declares {} rows, sections hold {}",
            header.total_rows,
            tables.counts().total()
        )));
    }

    Ok((header, tables))
}
