//! Shared fixtures: synthesized ELF images and zip archives.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;
pub const SHT_DYNSYM: u32 = 11;
pub const SHN_ABS: u16 = 0xfff1;

/// A symbol to encode into a fixture.
#[derive(Debug, Clone, Copy)]
pub struct TestSymbol {
    pub name: &'static str,
    pub info: u8,
    pub value: u64,
    pub size: u64,
}

impl TestSymbol {
    pub const fn func(name: &'static str, value: u64, size: u64) -> Self {
        // STB_GLOBAL, STT_FUNC
        Self { name, info: (1 << 4) | 2, value, size }
    }

    pub const fn object(name: &'static str, value: u64, size: u64) -> Self {
        // STB_GLOBAL, STT_OBJECT
        Self { name, info: (1 << 4) | 1, value, size }
    }
}

pub const STATIC_SYMBOLS: &[TestSymbol] = &[
    TestSymbol::func("foo_init", 0x1000, 0x40),
    TestSymbol::object("foo_table", 0x3000, 0x100),
];

pub const DYNAMIC_SYMBOLS: &[TestSymbol] = &[TestSymbol::func("Java_com_example_Foo_bar", 0x1100, 0x20)];

struct RawSection {
    name: &'static str,
    sh_type: u32,
    link: u32,
    info: u32,
    entsize: u64,
    data: Vec<u8>,
}

fn string_table<'a>(names: impl IntoIterator<Item = &'a str>) -> (Vec<u8>, Vec<u32>) {
    let mut table = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(table.len() as u32);
        table.extend_from_slice(name.as_bytes());
        table.push(0);
    }
    (table, offsets)
}

fn symbol_table(symbols: &[TestSymbol], name_offsets: &[u32]) -> Vec<u8> {
    // Entry 0 is the null symbol.
    let mut out = vec![0u8; 24];
    for (sym, &name) in symbols.iter().zip(name_offsets) {
        out.extend_from_slice(&name.to_le_bytes());
        out.push(sym.info);
        out.push(0);
        out.extend_from_slice(&SHN_ABS.to_le_bytes());
        out.extend_from_slice(&sym.value.to_le_bytes());
        out.extend_from_slice(&sym.size.to_le_bytes());
    }
    out
}

fn push_symbol_pair(
    sections: &mut Vec<RawSection>,
    names: (&'static str, &'static str),
    sh_type: u32,
    symbols: &[TestSymbol],
) {
    if symbols.is_empty() {
        return;
    }
    let (strings, offsets) = string_table(symbols.iter().map(|s| s.name));
    // Index 0 of the final table is the null section.
    let strtab_index = sections.len() as u32 + 2;
    sections.push(RawSection {
        name: names.0,
        sh_type,
        link: strtab_index,
        info: 1,
        entsize: 24,
        data: symbol_table(symbols, &offsets),
    });
    sections.push(RawSection {
        name: names.1,
        sh_type: SHT_STRTAB,
        link: 0,
        info: 0,
        entsize: 0,
        data: strings,
    });
}

fn align(out: &mut Vec<u8>, to: usize) {
    while out.len() % to != 0 {
        out.push(0);
    }
}

/// Build a little-endian ELF64 shared object holding the given symbol tables.
///
/// Section order: null, `.dynsym`/`.dynstr` (if any), `.symtab`/`.strtab`
/// (if any), `.shstrtab`.
pub fn build_elf64(symtab: &[TestSymbol], dynsym: &[TestSymbol]) -> Vec<u8> {
    let mut sections = Vec::new();
    push_symbol_pair(&mut sections, (".dynsym", ".dynstr"), SHT_DYNSYM, dynsym);
    push_symbol_pair(&mut sections, (".symtab", ".strtab"), SHT_SYMTAB, symtab);

    let mut names: Vec<&str> = sections.iter().map(|s| s.name).collect();
    names.push(".shstrtab");
    let (shstrtab, name_offsets) = string_table(names);
    sections.push(RawSection {
        name: ".shstrtab",
        sh_type: SHT_STRTAB,
        link: 0,
        info: 0,
        entsize: 0,
        data: shstrtab,
    });

    let mut out = vec![0u8; 64];
    let mut placement = Vec::with_capacity(sections.len());
    for section in &sections {
        align(&mut out, 8);
        placement.push((out.len() as u64, section.data.len() as u64));
        out.extend_from_slice(&section.data);
    }
    align(&mut out, 8);
    let shoff = out.len() as u64;

    // Null section header.
    out.extend_from_slice(&[0u8; 64]);
    for ((section, &(offset, size)), &name) in sections.iter().zip(&placement).zip(&name_offsets) {
        out.extend_from_slice(&name.to_le_bytes());
        out.extend_from_slice(&section.sh_type.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes()); // sh_flags
        out.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&section.link.to_le_bytes());
        out.extend_from_slice(&section.info.to_le_bytes());
        out.extend_from_slice(&8u64.to_le_bytes()); // sh_addralign
        out.extend_from_slice(&section.entsize.to_le_bytes());
    }

    let shnum = sections.len() as u16 + 1;
    let shstrndx = sections.len() as u16;

    out[0..4].copy_from_slice(b"\x7fELF");
    out[4] = 2; // ELFCLASS64
    out[5] = 1; // ELFDATA2LSB
    out[6] = 1; // EV_CURRENT
    out[16..18].copy_from_slice(&3u16.to_le_bytes()); // ET_DYN
    out[18..20].copy_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    out[20..24].copy_from_slice(&1u32.to_le_bytes());
    out[40..48].copy_from_slice(&shoff.to_le_bytes());
    out[52..54].copy_from_slice(&64u16.to_le_bytes()); // e_ehsize
    out[58..60].copy_from_slice(&64u16.to_le_bytes()); // e_shentsize
    out[60..62].copy_from_slice(&shnum.to_le_bytes());
    out[62..64].copy_from_slice(&shstrndx.to_le_bytes());
    out
}

/// The fixture most tests use: one `.symtab` and one `.dynsym`.
pub fn libfoo() -> Vec<u8> {
    build_elf64(STATIC_SYMBOLS, DYNAMIC_SYMBOLS)
}

/// Write a deflate-compressed zip archive at `dir/name`.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (entry, data) in entries {
        zip.start_file(*entry, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Write `data` to `dir/name`.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}
