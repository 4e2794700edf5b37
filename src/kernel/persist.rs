//! Labeled-record plumbing between the flask-state cache and the host's save
//! file. The host owns the container; the cache only ever sees one
//! [`RecordSink`] while saving and one [`RecordSource`] while loading.
//!
//! Payload of the flask-state record, little-endian, fixed-width:
//! `[version: u32][count: u64][(actor_id: u32, ActorFlaskState) x count]`.

use std::io::{self, Read, Write};

use super::cache::FlaskStateCache;
use crate::error::PersistError;

/// Label of the flask-state record inside the host save.
pub const STATE_RECORD_LABEL: u32 = u32::from_be_bytes(*b"CDAD");

/// Bumped whenever the `ActorFlaskState` byte layout changes.
pub const STATE_FORMAT_VERSION: u32 = 2;

const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub label: u32,
    pub version: u32,
    pub length: u32,
}

/// Write side of the host serialization interface.
pub trait RecordSink: Write {
    /// Starts a new record; subsequent writes go into it. `false` if refused.
    fn open_record(&mut self, label: u32, version: u32) -> bool;
}

/// Read side of the host serialization interface.
pub trait RecordSource: Read {
    /// Advances to the next record, skipping whatever is left of the current one.
    fn next_record(&mut self) -> Option<RecordHeader>;
}

/// In-memory record container: `[label][version][length][payload]` repeated.
#[derive(Debug, Default)]
pub struct RecordWriter {
    bytes: Vec<u8>,
    open_length_at: Option<usize>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn close_current(&mut self) {
        if let Some(at) = self.open_length_at.take() {
            let length = (self.bytes.len() - at - 4) as u32;
            self.bytes[at..at + 4].copy_from_slice(&length.to_le_bytes());
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.close_current();
        self.bytes
    }
}

impl Write for RecordWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.open_length_at.is_none() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no open record"));
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RecordSink for RecordWriter {
    fn open_record(&mut self, label: u32, version: u32) -> bool {
        self.close_current();
        self.bytes.extend_from_slice(&label.to_le_bytes());
        self.bytes.extend_from_slice(&version.to_le_bytes());
        self.open_length_at = Some(self.bytes.len());
        self.bytes.extend_from_slice(&0u32.to_le_bytes());
        true
    }
}

/// Reader over bytes produced by [`RecordWriter`]. Reads never cross the end
/// of the current record.
#[derive(Debug)]
pub struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, end: 0 }
    }

    fn u32_at(&self, at: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[at..at + 4]);
        u32::from_le_bytes(raw)
    }
}

impl Read for RecordReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = &self.bytes[self.pos..self.end];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n;
        Ok(n)
    }
}

impl RecordSource for RecordReader<'_> {
    fn next_record(&mut self) -> Option<RecordHeader> {
        self.pos = self.end;
        if self.bytes.len().saturating_sub(self.pos) < HEADER_LEN {
            return None;
        }
        let header = RecordHeader {
            label: self.u32_at(self.pos),
            version: self.u32_at(self.pos + 4),
            length: self.u32_at(self.pos + 8),
        };
        self.pos += HEADER_LEN;
        self.end = (self.pos + header.length as usize).min(self.bytes.len());
        Some(header)
    }
}

/// Serializes the whole cache into a standalone record container.
pub fn write_state(cache: &FlaskStateCache) -> Result<Vec<u8>, PersistError> {
    let mut writer = RecordWriter::new();
    cache.save(&mut writer)?;
    Ok(writer.finish())
}

/// Replaces the cache contents with the record found in `bytes`.
/// Returns the number of restored actors.
pub fn read_state(cache: &FlaskStateCache, bytes: &[u8]) -> Result<usize, PersistError> {
    cache.load(&mut RecordReader::new(bytes))
}
