//! Binary encode/decode for registry snapshots and the recorder log.
//!
//! All integers and floats are little-endian, with no alignment padding
//! and no header.
//!
//! ```text
//! snapshot: { [u32 name_len] [name] [u32 data_size] [data] }*
//! log:      { [f64 time] [u64 payload_size] [payload] }*
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::RegistryError;

// ── Primitive writers ───────────────────────────────────────────

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), RegistryError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), RegistryError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), RegistryError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Snapshot records ────────────────────────────────────────────

/// Append one snapshot record to `buf`.
///
/// `encode` appends exactly `data_size` bytes.
pub fn encode_record(
    buf: &mut Vec<u8>,
    name: &str,
    data_size: u32,
    encode: impl FnOnce(&mut Vec<u8>),
) {
    buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(&data_size.to_le_bytes());
    encode(buf);
}

/// One decoded snapshot record, borrowing from the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotRecord<'a> {
    /// Raw name bytes (UTF-8 when written by this crate).
    pub name: &'a [u8],
    /// Payload bytes.
    pub data: &'a [u8],
}

/// Sequential reader over a snapshot buffer.
#[derive(Debug)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], RegistryError> {
        let available = self.buf.len() - self.pos;
        if needed > available {
            return Err(RegistryError::Truncated {
                offset: self.pos,
                needed,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(out)
    }

    fn take_u32(&mut self) -> Result<u32, RegistryError> {
        let raw = self.take(4)?;
        let mut b = [0u8; 4];
        b.copy_from_slice(raw);
        Ok(u32::from_le_bytes(b))
    }

    /// Decode the next record, or `None` at the end of the buffer.
    pub fn next_record(&mut self) -> Result<Option<SnapshotRecord<'a>>, RegistryError> {
        if self.pos == self.buf.len() {
            return Ok(None);
        }
        let name_len = self.take_u32()? as usize;
        let name = self.take(name_len)?;
        let data_size = self.take_u32()? as usize;
        let data = self.take(data_size)?;
        Ok(Some(SnapshotRecord { name, data }))
    }
}

/// Decode a whole snapshot buffer.
pub fn decode_records(buf: &[u8]) -> Result<Vec<SnapshotRecord<'_>>, RegistryError> {
    let mut reader = RecordReader::new(buf);
    let mut records = Vec::new();
    while let Some(record) = reader.next_record()? {
        records.push(record);
    }
    Ok(records)
}

// ── Log frames ──────────────────────────────────────────────────

/// Encode one `(time, payload)` log frame.
pub fn encode_frame(w: &mut dyn Write, time: f64, payload: &[u8]) -> Result<(), RegistryError> {
    write_f64_le(w, time)?;
    write_u64_le(w, payload.len() as u64)?;
    w.write_all(payload)?;
    Ok(())
}

/// Decode one log frame, or `None` on a clean end of stream.
///
/// `index` only labels errors.
pub fn decode_frame(
    r: &mut dyn Read,
    index: u64,
) -> Result<Option<(f64, Vec<u8>)>, RegistryError> {
    // Byte-by-byte so a clean EOF (no bytes) is told apart from a
    // truncated time field.
    let mut time_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut time_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(RegistryError::MalformedFrame {
                    index,
                    detail: format!("truncated time field: got {filled} of 8 bytes"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(RegistryError::Io(e)),
        }
    }
    let time = f64::from_le_bytes(time_buf);

    let mut size_buf = [0u8; 8];
    r.read_exact(&mut size_buf)
        .map_err(|e| truncated_or_io(e, index, "payload size"))?;
    let size = u64::from_le_bytes(size_buf);

    // Bounded by what the stream holds, not by the declared size.
    let mut payload = Vec::new();
    Read::take(&mut *r, size).read_to_end(&mut payload)?;
    if payload.len() as u64 != size {
        return Err(RegistryError::MalformedFrame {
            index,
            detail: format!("truncated payload: got {} of {size} bytes", payload.len()),
        });
    }
    Ok(Some((time, payload)))
}

fn truncated_or_io(e: std::io::Error, index: u64, field: &str) -> RegistryError {
    if e.kind() == ErrorKind::UnexpectedEof {
        RegistryError::MalformedFrame {
            index,
            detail: format!("truncated {field}"),
        }
    } else {
        RegistryError::Io(e)
    }
}
