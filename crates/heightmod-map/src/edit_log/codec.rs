use super::{CellKey, EditLog, EditLogError, ModElement};
use crate::brush::{Brush, BrushShape, MAX_BRUSH_RADIUS};
use crate::core::static_assertions::const_assert_eq;

use bytemuck::{bytes_of, bytes_of_mut, Pod, Zeroable};
use std::io::{self, Read, Write};
use std::mem;
use thiserror::Error;

pub const HEADER_SIGNATURE: u32 = 0xDEAD_BEEF;
pub const TRAILER_SIGNATURE: u32 = 0xBEEF_DEAD;

/// The bytes are not an edit log, or not a complete one.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum FormatError {
    #[error("incorrect header marker {found:#010x}")]
    BadHeader { found: u32 },
    #[error("incorrect trailer marker {found:#010x}")]
    BadTrailer { found: u32 },
    #[error("data ends before the trailer marker")]
    Truncated,
    #[error("unknown brush shape code {code}")]
    InvalidShape { code: u32 },
    #[error("brush radius {radius} is larger than {}", MAX_BRUSH_RADIUS)]
    InvalidRadius { radius: u32 },
}

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct ModRecord {
    x: u16,
    y: u16,
    delta: i32,
}

const_assert_eq!(mem::size_of::<ModRecord>(), 8);

impl From<ModElement> for ModRecord {
    fn from(m: ModElement) -> Self {
        Self {
            x: m.key.x,
            y: m.key.y,
            delta: m.delta,
        }
    }
}

impl From<ModRecord> for ModElement {
    fn from(r: ModRecord) -> Self {
        ModElement::new(CellKey::new(r.x, r.y), r.delta)
    }
}

#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct BrushRecord {
    x: i32,
    y: i32,
    radius: u32,
    shape: u32,
    delta: i32,
}

const_assert_eq!(mem::size_of::<BrushRecord>(), 20);

impl From<&Brush> for BrushRecord {
    fn from(b: &Brush) -> Self {
        let center = b.center();
        Self {
            x: center.x,
            y: center.y,
            radius: b.radius(),
            shape: b.shape().code(),
            delta: b.delta(),
        }
    }
}

impl TryFrom<BrushRecord> for Brush {
    type Error = FormatError;

    fn try_from(r: BrushRecord) -> Result<Self, Self::Error> {
        let shape =
            BrushShape::from_code(r.shape).ok_or(FormatError::InvalidShape { code: r.shape })?;
        if r.radius > MAX_BRUSH_RADIUS {
            return Err(FormatError::InvalidRadius { radius: r.radius });
        }
        Ok(Brush::new(r.x, r.y, r.radius, shape, r.delta))
    }
}

/// Writes `log` as: header, mod count, mod records sorted by cell, brush count, brush records, trailer.
pub(super) fn encode(log: &EditLog, mut writer: impl Write) -> io::Result<()> {
    let mods = log.sorted_mods();

    write_u32(&mut writer, HEADER_SIGNATURE)?;
    write_u32(&mut writer, checked_count(mods.len())?)?;
    for m in mods {
        writer.write_all(bytes_of(&ModRecord::from(m)))?;
    }
    write_u32(&mut writer, checked_count(log.brush_history.len())?)?;
    for brush in log.brush_history.iter() {
        writer.write_all(bytes_of(&BrushRecord::from(brush)))?;
    }
    write_u32(&mut writer, TRAILER_SIGNATURE)
}

/// Reads a complete log. Nothing is returned unless both markers check out.
pub(super) fn decode(mut reader: impl Read) -> Result<EditLog, EditLogError> {
    let header = read_u32(&mut reader)?;
    if header != HEADER_SIGNATURE {
        return Err(FormatError::BadHeader { found: header }.into());
    }

    let mut log = EditLog::default();

    let num_mods = read_u32(&mut reader)?;
    for _ in 0..num_mods {
        let record: ModRecord = read_record(&mut reader)?;
        log.add(record.into());
    }

    let num_brushes = read_u32(&mut reader)?;
    // Don't trust the count for the allocation size.
    log.brush_history.reserve(num_brushes.min(4096) as usize);
    for _ in 0..num_brushes {
        let record: BrushRecord = read_record(&mut reader)?;
        log.brush_history.push(Brush::try_from(record)?);
    }

    let trailer = read_u32(&mut reader)?;
    if trailer != TRAILER_SIGNATURE {
        return Err(FormatError::BadTrailer { found: trailer }.into());
    }

    Ok(log)
}

fn checked_count(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} records do not fit in a 32-bit count", len),
        )
    })
}

fn write_u32(writer: &mut impl Write, v: u32) -> io::Result<()> {
    writer.write_all(&v.to_ne_bytes())
}

fn read_u32(reader: &mut impl Read) -> Result<u32, EditLogError> {
    let mut bytes = [0; 4];
    read_exact(reader, &mut bytes)?;
    Ok(u32::from_ne_bytes(bytes))
}

fn read_record<T: Pod>(reader: &mut impl Read) -> Result<T, EditLogError> {
    let mut record = T::zeroed();
    read_exact(reader, bytes_of_mut(&mut record))?;
    Ok(record)
}

fn read_exact(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), EditLogError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            EditLogError::from(FormatError::Truncated)
        } else {
            EditLogError::Io(e)
        }
    })
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
