//! Random-access byte sources.
//!
//! The ELF parser needs to read at arbitrary offsets. `ReaderAt` is the seam
//! both on-disk files and materialized archive entries plug into. Sources
//! already resident in memory hand the parser their bytes directly; any other
//! source is wrapped in a `ReadAtCursor`, the `Read + Seek` stream that
//! `object::read::ReadCache` consumes.

pub mod archive;
pub mod file;
pub mod memory;

pub use file::FileReaderAt;
pub use memory::MemoryReaderAt;

use std::io::{self, Read, Seek, SeekFrom};
use tracing::trace;

/// Outcome of a positional read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadChunk {
    /// This many bytes were copied into the front of the buffer. May be
    /// fewer than requested near the end of the source.
    Filled(usize),
    /// The offset is at or past the end of the source; nothing was copied.
    EndOfData,
}

impl ReadChunk {
    /// Number of bytes copied, zero at end of data.
    pub fn count(self) -> usize {
        match self {
            ReadChunk::Filled(n) => n,
            ReadChunk::EndOfData => 0,
        }
    }

    pub fn is_end_of_data(self) -> bool {
        self == ReadChunk::EndOfData
    }
}

/// A byte source readable at arbitrary offsets.
///
/// Reads take `&self` and never move a shared cursor, so repeated reads of
/// the same region return the same bytes.
pub trait ReaderAt: Send {
    /// Copy bytes starting at `offset` into `buf`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<ReadChunk>;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// The whole source as one resident slice, if it is held in memory.
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }
}

impl<R: ReaderAt + ?Sized> ReaderAt for Box<R> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<ReadChunk> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        (**self).as_bytes()
    }
}

/// Seekable stream view over a borrowed `ReaderAt`.
pub struct ReadAtCursor<'a> {
    inner: &'a dyn ReaderAt,
    pos: u64,
}

impl<'a> ReadAtCursor<'a> {
    pub fn new(inner: &'a dyn ReaderAt) -> Self {
        Self { inner, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl Read for ReadAtCursor<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.inner.read_at(buf, self.pos)?;
        trace!(offset = self.pos, requested = buf.len(), read = chunk.count(), "read_at");
        self.pos += chunk.count() as u64;
        Ok(chunk.count())
    }
}

impl Seek for ReadAtCursor<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(offset) => {
                self.pos = offset;
                return Ok(offset);
            }
            SeekFrom::End(delta) => (self.inner.size(), delta),
            SeekFrom::Current(delta) => (self.pos, delta),
        };
        match base.checked_add_signed(delta) {
            Some(offset) => {
                self.pos = offset;
                Ok(offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_reads_sequentially() {
        let source = MemoryReaderAt::new(b"hello world".to_vec());
        let mut cursor = ReadAtCursor::new(&source);
        let mut buf = [0u8; 5];
        assert_eq!(cursor.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(cursor.position(), 5);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b" world");
    }

    #[test]
    fn cursor_seek_from_end_and_current() {
        let source = MemoryReaderAt::new(b"hello world".to_vec());
        let mut cursor = ReadAtCursor::new(&source);
        assert_eq!(cursor.seek(SeekFrom::End(-5)).unwrap(), 6);
        assert_eq!(cursor.seek(SeekFrom::Current(-1)).unwrap(), 5);
        let mut buf = [0u8; 6];
        cursor.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b" world");
    }

    #[test]
    fn cursor_rejects_negative_seek() {
        let source = MemoryReaderAt::new(vec![0; 4]);
        let mut cursor = ReadAtCursor::new(&source);
        assert!(cursor.seek(SeekFrom::Current(-1)).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn cursor_past_end_reads_nothing() {
        let source = MemoryReaderAt::new(vec![1, 2, 3]);
        let mut cursor = ReadAtCursor::new(&source);
        cursor.seek(SeekFrom::Start(10)).unwrap();
        let mut buf = [0u8; 2];
        assert_eq!(cursor.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn boxed_source_delegates() {
        let boxed: Box<dyn ReaderAt> = Box::new(MemoryReaderAt::new(vec![9, 8, 7]));
        assert_eq!(boxed.size(), 3);
        let mut buf = [0u8; 1];
        assert_eq!(boxed.read_at(&mut buf, 2).unwrap(), ReadChunk::Filled(1));
        assert_eq!(buf, [7]);
        assert_eq!(boxed.as_bytes(), Some(&[9u8, 8, 7][..]));
    }
}
