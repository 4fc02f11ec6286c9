//! Defensive access to ELF binaries.
//!
//! elfguard opens ELF files from disk or from entries inside zip archives
//! (for example shared libraries packed in an APK) and exposes the parsed
//! sections and symbol tables. Panics raised by the underlying parser on
//! malformed input are caught at the call boundary and returned as errors.
//!
//! ```no_run
//! use elfguard::{ElfHandle, SHT_SYMTAB};
//!
//! let mut elf = ElfHandle::open_from_path("app.apk!lib/arm64-v8a/libfoo.so@42")?;
//! for section in elf.sections_by_type(SHT_SYMTAB)? {
//!     println!("{} at {:#x}", section.name, section.offset);
//! }
//! let exported = elf.dynamic_symbols()?;
//! println!("{} dynamic symbols", exported.len());
//! elf.close()?;
//! # Ok::<(), elfguard::ElfGuardError>(())
//! ```

pub mod config;
pub mod elf;
pub mod error;
pub mod io;
pub mod logging;
pub mod path;

pub use config::OpenLimits;
pub use elf::{ElfClass, ElfHandle, ElfInfo, Endianness, Section, Symbol};
pub use elf::types::{
    SHT_DYNAMIC, SHT_DYNSYM, SHT_NOBITS, SHT_NOTE, SHT_PROGBITS, SHT_STRTAB, SHT_SYMTAB,
};
pub use error::{ElfGuardError, ParseError, Result};
pub use io::{MemoryReaderAt, ReadChunk, ReaderAt};
pub use path::BinaryPath;
