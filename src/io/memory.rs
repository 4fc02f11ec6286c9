//! In-memory random-access source.
//!
//! Archive entries can only be streamed forward, so they are read to
//! completion once and served from the resident buffer afterwards.

use super::{ReadChunk, ReaderAt};
use std::io::{self, Read};

/// An owned byte buffer readable at arbitrary offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReaderAt {
    data: Vec<u8>,
}

impl MemoryReaderAt {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Drain `stream` into a new buffer.
    ///
    /// Any read error discards everything read so far.
    pub fn from_stream<R: Read>(mut stream: R, size_hint: usize) -> io::Result<Self> {
        let mut data = Vec::with_capacity(size_hint);
        stream.read_to_end(&mut data)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

}

impl ReaderAt for MemoryReaderAt {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<ReadChunk> {
        let rest = match usize::try_from(offset).ok().and_then(|o| self.data.get(o..)) {
            Some(rest) if !rest.is_empty() => rest,
            _ => return Ok(ReadChunk::EndOfData),
        };
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        Ok(ReadChunk::Filled(n))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}
