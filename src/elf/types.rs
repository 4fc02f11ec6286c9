//! Owned descriptors extracted from the parser.

pub use object::elf::{
    SHT_DYNAMIC, SHT_DYNSYM, SHT_HASH, SHT_NOBITS, SHT_NOTE, SHT_NULL, SHT_PROGBITS, SHT_REL,
    SHT_RELA, SHT_STRTAB, SHT_SYMTAB, STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_FILE, STT_FUNC,
    STT_NOTYPE, STT_OBJECT, STT_SECTION, STT_TLS,
};
pub use object::Endianness;

/// ELF class (32-bit or 64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    pub fn bits(&self) -> u8 {
        match self {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 64,
        }
    }
}

/// File header fields of an opened binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfInfo {
    pub class: ElfClass,
    pub endianness: Endianness,
    /// `e_type`, e.g. `ET_DYN` for shared libraries.
    pub e_type: u16,
    pub machine: u16,
    pub entry: u64,
}

/// One entry of the section header table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position in the section header table.
    pub index: usize,
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

/// One entry of a symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub info: u8,
    pub other: u8,
    pub section_index: u16,
    pub value: u64,
    pub size: u64,
}

impl Symbol {
    /// Symbol type (`STT_*`).
    pub fn kind(&self) -> u8 {
        self.info & 0xf
    }

    /// Symbol binding (`STB_*`).
    pub fn binding(&self) -> u8 {
        self.info >> 4
    }

    /// Symbol visibility (`STV_*`).
    pub fn visibility(&self) -> u8 {
        self.other & 0x3
    }
}
