//! Binary path resolution.
//!
//! A binary is addressed either by a plain filesystem path or by the
//! composite form `<archive>!<entry>[@<suffix>]`. The suffix lets callers
//! carry extra text in the same string; it plays no part in the lookup.

use std::fmt;
use std::path::{Path, PathBuf};

/// Separates the archive location from the entry name.
pub const ARCHIVE_SEPARATOR: char = '!';
/// Starts the ignored suffix of an entry name.
pub const SUFFIX_SEPARATOR: char = '@';

/// A resolved binary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryPath {
    /// A file on disk, opened as-is.
    File(PathBuf),
    /// A named entry inside a zip archive.
    ArchiveEntry { archive: PathBuf, entry: String },
}

impl BinaryPath {
    /// Resolve a path string into its structured form.
    ///
    /// Only the first `!` splits; anything after it, up to the first `@`,
    /// is the entry name.
    pub fn parse(path: &str) -> Self {
        match path.split_once(ARCHIVE_SEPARATOR) {
            Some((archive, remainder)) => {
                let entry = match remainder.split_once(SUFFIX_SEPARATOR) {
                    Some((entry, _suffix)) => entry,
                    None => remainder,
                };
                BinaryPath::ArchiveEntry {
                    archive: PathBuf::from(archive),
                    entry: entry.to_string(),
                }
            }
            None => BinaryPath::File(PathBuf::from(path)),
        }
    }

    /// Whether the path points inside an archive.
    pub fn is_archive_entry(&self) -> bool {
        matches!(self, BinaryPath::ArchiveEntry { .. })
    }

    /// The on-disk file that has to be opened first.
    pub fn outer_path(&self) -> &Path {
        match self {
            BinaryPath::File(path) => path,
            BinaryPath::ArchiveEntry { archive, .. } => archive,
        }
    }
}

impl From<&str> for BinaryPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for BinaryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryPath::File(path) => write!(f, "{}", path.display()),
            BinaryPath::ArchiveEntry { archive, entry } => {
                write!(f, "{}{}{}", archive.display(), ARCHIVE_SEPARATOR, entry)
            }
        }
    }
}
