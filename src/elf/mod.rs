//! Panic-isolating access to ELF binaries.
//!
//! `ElfHandle` wraps the `object` ELF parser. Every call into the parser runs
//! behind [`guard::catch_parser_panic`], so malformed input surfaces as
//! `ElfGuardError::Parse` instead of unwinding into the caller.
//!
//! In-memory sources are parsed in place. Other sources are read through an
//! `object::read::ReadCache` that is dropped when the call returns, so a
//! handle holds nothing beyond its source and the parsed section list.

mod guard;
pub mod types;

pub use types::*;

use crate::config::OpenLimits;
use crate::error::{ElfGuardError, ParseError, Result};
use crate::io::{archive, FileReaderAt, MemoryReaderAt, ReadAtCursor, ReaderAt};
use crate::path::BinaryPath;
use guard::{
    catch_parser_panic, READING_DYNAMIC_SYMBOLS, READING_FILE, READING_SECTION_DATA,
    READING_SYMBOLS,
};
use object::elf::{FileHeader32, FileHeader64};
use object::read::elf::{FileHeader, SectionHeader as _, Sym as _};
use object::read::ReadCache;
use object::{FileKind, ReadRef, SectionIndex};
use std::fmt;
use tracing::{debug, debug_span};

/// Bind `$data` to a `ReadRef` over `$source` and evaluate `$body` with it.
///
/// The body is expanded once per reader type, so it may call functions
/// generic over `ReadRef`.
macro_rules! with_read_ref {
    ($source:expr, |$data:ident| $body:expr) => {{
        let source: &dyn ReaderAt = $source;
        match source.as_bytes() {
            Some($data) => $body,
            None => {
                let cache = ReadCache::new(ReadAtCursor::new(source));
                let $data = &cache;
                $body
            }
        }
    }};
}

struct Opened {
    source: Box<dyn ReaderAt>,
    info: ElfInfo,
    sections: Vec<Section>,
}

enum State {
    Opened(Box<Opened>),
    Closed,
}

/// An opened ELF binary together with the source it was parsed from.
///
/// The source (a file descriptor or an in-memory archive entry) is released
/// on [`ElfHandle::close`] or when the handle is dropped, whichever comes
/// first. A handle is `Send` but not `Sync`; share one across threads only
/// behind external synchronization.
///
/// Parser panics are contained, but the process panic hook still runs for
/// each one. With the default hook that prints the panic message to stderr;
/// install a quieter hook with [`std::panic::set_hook`] if that matters.
pub struct ElfHandle {
    state: State,
}

impl ElfHandle {
    /// Open a plain path or an `archive!entry[@suffix]` path.
    pub fn open_from_path(path: &str) -> Result<Self> {
        Self::open_from_path_with_limits(path, &OpenLimits::default())
    }

    /// Like [`ElfHandle::open_from_path`], with explicit size limits.
    pub fn open_from_path_with_limits(path: &str, limits: &OpenLimits) -> Result<Self> {
        let _span = debug_span!("open_elf", path).entered();
        let resolved = BinaryPath::parse(path);
        debug!(resolved = %resolved, archive = resolved.is_archive_entry(), "Resolved binary path");

        match resolved {
            BinaryPath::File(path) => {
                Self::open_from_source(FileReaderAt::open(path, limits.max_file_size)?)
            }
            BinaryPath::ArchiveEntry { archive, entry } => Self::open_from_source(
                archive::open_archive_entry(&archive, &entry, limits.max_entry_size)?,
            ),
        }
    }

    /// Parse the file header and section table from any random-access source.
    pub fn open_from_source<S: ReaderAt + 'static>(source: S) -> Result<Self> {
        let source: Box<dyn ReaderAt> = Box::new(source);
        let (info, sections) = catch_parser_panic(READING_FILE, || {
            with_read_ref!(&*source, |data| parse_layout(data))
        })?;
        debug!(
            class = info.class.bits(),
            machine = info.machine,
            sections = sections.len(),
            "Parsed ELF layout"
        );

        Ok(Self {
            state: State::Opened(Box::new(Opened {
                source,
                info,
                sections,
            })),
        })
    }

    /// Parse an ELF image already held in memory.
    pub fn open_from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::open_from_source(MemoryReaderAt::new(data))
    }

    fn opened(&self) -> Result<&Opened> {
        match &self.state {
            State::Opened(opened) => Ok(&**opened),
            State::Closed => Err(ElfGuardError::UseAfterClose),
        }
    }

    /// File header fields.
    pub fn info(&self) -> Result<&ElfInfo> {
        Ok(&self.opened()?.info)
    }

    /// All sections in section header table order.
    pub fn sections(&self) -> Result<&[Section]> {
        Ok(&self.opened()?.sections)
    }

    /// Sections of type `sh_type`, in file order. Empty when none match.
    pub fn sections_by_type(&self, sh_type: u32) -> Result<Vec<&Section>> {
        Ok(self
            .sections()?
            .iter()
            .filter(|section| section.sh_type == sh_type)
            .collect())
    }

    /// The first section called `name`, if any.
    pub fn section_by_name(&self, name: &str) -> Result<Option<&Section>> {
        Ok(self.sections()?.iter().find(|section| section.name == name))
    }

    /// The static symbol table (`SHT_SYMTAB`), without the null symbol.
    ///
    /// A binary without a symbol table yields an empty list.
    pub fn symbols(&self) -> Result<Vec<Symbol>> {
        self.read_symbols(READING_SYMBOLS, object::elf::SHT_SYMTAB)
    }

    /// The dynamic symbol table (`SHT_DYNSYM`), without the null symbol.
    pub fn dynamic_symbols(&self) -> Result<Vec<Symbol>> {
        self.read_symbols(READING_DYNAMIC_SYMBOLS, object::elf::SHT_DYNSYM)
    }

    fn read_symbols(&self, context: &'static str, sh_type: u32) -> Result<Vec<Symbol>> {
        let opened = self.opened()?;
        let class = opened.info.class;
        let symbols = catch_parser_panic(context, || {
            with_read_ref!(&*opened.source, |data| read_symbol_table(data, class, sh_type))
        })?;
        debug!(context, count = symbols.len(), "Read symbol table");
        Ok(symbols)
    }

    /// The file contents of `section`. `SHT_NOBITS` sections are empty.
    pub fn section_data(&self, section: &Section) -> Result<Vec<u8>> {
        let opened = self.opened()?;
        let class = opened.info.class;
        let index = section.index;
        let bytes = catch_parser_panic(READING_SECTION_DATA, || {
            with_read_ref!(&*opened.source, |data| read_section_data(data, class, index))
        })?;
        Ok(bytes)
    }

    /// Release the underlying source. Closing again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let State::Opened(_) = std::mem::replace(&mut self.state, State::Closed) {
            debug!("Closed ELF handle");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }
}

impl fmt::Debug for ElfHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Opened(opened) => f
                .debug_struct("ElfHandle")
                .field("info", &opened.info)
                .field("sections", &opened.sections.len())
                .field("source_size", &opened.source.size())
                .finish(),
            State::Closed => f.write_str("ElfHandle(closed)"),
        }
    }
}

fn parse_layout<'data, R: ReadRef<'data>>(
    data: R,
) -> std::result::Result<(ElfInfo, Vec<Section>), ParseError> {
    match FileKind::parse(data)? {
        FileKind::Elf32 => parse_headers::<FileHeader32<Endianness>, _>(data, ElfClass::Elf32),
        FileKind::Elf64 => parse_headers::<FileHeader64<Endianness>, _>(data, ElfClass::Elf64),
        _ => Err(ParseError::NotElf),
    }
}

fn parse_headers<'data, Elf, R>(
    data: R,
    class: ElfClass,
) -> std::result::Result<(ElfInfo, Vec<Section>), ParseError>
where
    Elf: FileHeader<Endian = Endianness>,
    R: ReadRef<'data>,
{
    let header = Elf::parse(data)?;
    let endian = header.endian()?;
    let table = header.sections(endian, data)?;
    // Without a section name table every name is empty.
    let has_names = !table.is_empty() && header.shstrndx(endian, data)? != 0;

    let mut sections = Vec::with_capacity(table.len());
    for (index, sh) in table.iter().enumerate() {
        let name = if has_names {
            String::from_utf8_lossy(table.section_name(endian, sh)?).into_owned()
        } else {
            String::new()
        };
        sections.push(Section {
            index,
            name,
            sh_type: sh.sh_type(endian),
            flags: sh.sh_flags(endian).into(),
            addr: sh.sh_addr(endian).into(),
            offset: sh.sh_offset(endian).into(),
            size: sh.sh_size(endian).into(),
            link: sh.sh_link(endian),
            info: sh.sh_info(endian),
            addralign: sh.sh_addralign(endian).into(),
            entsize: sh.sh_entsize(endian).into(),
        });
    }

    let info = ElfInfo {
        class,
        endianness: endian,
        e_type: header.e_type(endian),
        machine: header.e_machine(endian),
        entry: header.e_entry(endian).into(),
    };
    Ok((info, sections))
}

fn read_symbol_table<'data, R: ReadRef<'data>>(
    data: R,
    class: ElfClass,
    sh_type: u32,
) -> std::result::Result<Vec<Symbol>, ParseError> {
    match class {
        ElfClass::Elf32 => symbol_table::<FileHeader32<Endianness>, _>(data, sh_type),
        ElfClass::Elf64 => symbol_table::<FileHeader64<Endianness>, _>(data, sh_type),
    }
}

fn symbol_table<'data, Elf, R>(data: R, sh_type: u32) -> std::result::Result<Vec<Symbol>, ParseError>
where
    Elf: FileHeader<Endian = Endianness>,
    R: ReadRef<'data>,
{
    let header = Elf::parse(data)?;
    let endian = header.endian()?;
    let table = header.sections(endian, data)?;
    let symtab = table.symbols(endian, data, sh_type)?;
    let strings = symtab.strings();

    // Index 0 is the reserved undefined symbol.
    let mut symbols = Vec::with_capacity(symtab.len().saturating_sub(1));
    for sym in symtab.iter().skip(1) {
        symbols.push(Symbol {
            name: String::from_utf8_lossy(sym.name(endian, strings)?).into_owned(),
            info: sym.st_info(),
            other: sym.st_other(),
            section_index: sym.st_shndx(endian),
            value: sym.st_value(endian).into(),
            size: sym.st_size(endian).into(),
        });
    }
    Ok(symbols)
}

fn read_section_data<'data, R: ReadRef<'data>>(
    data: R,
    class: ElfClass,
    index: usize,
) -> std::result::Result<Vec<u8>, ParseError> {
    match class {
        ElfClass::Elf32 => section_bytes::<FileHeader32<Endianness>, _>(data, index),
        ElfClass::Elf64 => section_bytes::<FileHeader64<Endianness>, _>(data, index),
    }
}

fn section_bytes<'data, Elf, R>(data: R, index: usize) -> std::result::Result<Vec<u8>, ParseError>
where
    Elf: FileHeader<Endian = Endianness>,
    R: ReadRef<'data>,
{
    // The null section has no contents, and `SectionTable::section` rejects
    // index 0.
    if index == 0 {
        return Ok(Vec::new());
    }
    let header = Elf::parse(data)?;
    let endian = header.endian()?;
    let table = header.sections(endian, data)?;
    let section = table.section(SectionIndex(index))?;
    let size: u64 = section.sh_size(endian).into();
    if size == 0 {
        return Ok(Vec::new());
    }
    Ok(section.data(endian, data)?.to_vec())
}
