//! Zip archive entries as random-access sources.

use super::{MemoryReaderAt, ReaderAt};
use crate::error::{ElfGuardError, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Open `entry` inside the zip archive at `archive_path` and read it fully
/// into memory.
///
/// Entries whose decompressed size exceeds `max_entry_size` are refused,
/// whether the archive declares that size up front or not.
pub fn open_archive_entry(
    archive_path: &Path,
    entry: &str,
    max_entry_size: u64,
) -> Result<MemoryReaderAt> {
    let archive_err = |source| ElfGuardError::ArchiveOpen {
        path: archive_path.to_path_buf(),
        source,
    };
    let file = File::open(archive_path).map_err(|e| archive_err(ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;

    let mut zip_entry = match archive.by_name(entry) {
        Ok(zip_entry) => zip_entry,
        Err(ZipError::FileNotFound) => {
            return Err(ElfGuardError::EntryNotFound {
                archive: archive_path.to_path_buf(),
                entry: entry.to_string(),
            })
        }
        Err(e) => {
            return Err(ElfGuardError::ArchiveRead {
                entry: entry.to_string(),
                source: io::Error::other(e),
            })
        }
    };

    let declared = zip_entry.size();
    debug!(
        archive = %archive_path.display(),
        entry,
        size = declared,
        compressed = zip_entry.compressed_size(),
        "Materializing archive entry"
    );

    let too_large = |size: u64| {
        warn!(entry, size, limit = max_entry_size, "Archive entry is too large");
        ElfGuardError::EntryTooLarge {
            entry: entry.to_string(),
            size,
            limit: max_entry_size,
        }
    };
    if declared > max_entry_size {
        return Err(too_large(declared));
    }

    // One byte past the limit is enough to tell a lying header apart.
    let bounded = (&mut zip_entry).take(max_entry_size.saturating_add(1));
    let reader = MemoryReaderAt::from_stream(bounded, declared as usize).map_err(|source| {
        ElfGuardError::ArchiveRead {
            entry: entry.to_string(),
            source,
        }
    })?;
    if reader.size() > max_entry_size {
        return Err(too_large(reader.size()));
    }

    Ok(reader)
}
