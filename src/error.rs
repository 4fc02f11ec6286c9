//! Error types for elfguard.
//!
//! Every failure surfaced by the crate is an `ElfGuardError`. Faults raised
//! inside the wrapped ELF parser are folded into `ElfGuardError::Parse`, either
//! as a passthrough `object` error or as an intercepted panic.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for elfguard operations.
#[derive(Debug, Error)]
pub enum ElfGuardError {
    /// A plain filesystem path could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A plain file exceeds the configured size limit.
    #[error("file {} is {size} bytes, exceeding the limit of {limit} bytes", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The outer part of a composite path is not an openable zip archive.
    #[error("failed to open archive {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive opened but holds no entry with the requested name.
    #[error("entry {entry:?} not found in archive {}", archive.display())]
    EntryNotFound { archive: PathBuf, entry: String },

    /// Reading or decompressing an archive entry failed part way.
    #[error("failed to read archive entry {entry:?}: {source}")]
    ArchiveRead {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// An archive entry exceeds the configured size limit.
    #[error("archive entry {entry:?} is larger than the limit of {limit} bytes (declared {size})")]
    EntryTooLarge { entry: String, size: u64, limit: u64 },

    /// The ELF parser rejected the input or panicked on it.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A read was issued on a handle that has already been closed.
    #[error("ELF handle used after close")]
    UseAfterClose,
}

/// Failures attributable to the wrapped ELF parser.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The parser panicked; `context` names the operation in progress.
    #[error("{context} panicked: {cause}")]
    Panicked { context: &'static str, cause: String },

    /// The parser reported an ordinary error, passed through unchanged.
    #[error(transparent)]
    Malformed(#[from] object::read::Error),

    /// The source parsed as an object file of some other format.
    #[error("not an ELF file")]
    NotElf,
}

/// Result type alias for elfguard operations
pub type Result<T> = std::result::Result<T, ElfGuardError>;
