//! On-disk random-access source.

use super::{ReadChunk, ReaderAt};
use crate::error::{ElfGuardError, Result};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file descriptor read at explicit offsets.
///
/// The descriptor is closed when the reader is dropped.
#[derive(Debug)]
pub struct FileReaderAt {
    path: PathBuf,
    file: File,
    file_size: u64,
}

impl FileReaderAt {
    /// Open `path`, refusing files larger than `max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, max_file_size: u64) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| ElfGuardError::FileOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let file_size = file.metadata().map_err(open_err)?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            max_file_size,
            "Opening file for random access"
        );

        if file_size > max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = max_file_size,
                "File is too large"
            );
            return Err(ElfGuardError::FileTooLarge {
                path: path.to_path_buf(),
                size: file_size,
                limit: max_file_size,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            file_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReaderAt for FileReaderAt {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<ReadChunk> {
        if offset >= self.file_size {
            return Ok(ReadChunk::EndOfData);
        }
        // `&File` implements Read + Seek, so positional reads need no `&mut`.
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        if filled == 0 && !buf.is_empty() {
            // Truncated underneath us since open.
            return Ok(ReadChunk::EndOfData);
        }
        Ok(ReadChunk::Filled(filled))
    }

    fn size(&self) -> u64 {
        self.file_size
    }
}
