#![no_main]
use elfguard::ElfHandle;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut elf) = ElfHandle::open_from_bytes(data.to_vec()) else {
        return;
    };
    let _ = elf.symbols();
    let _ = elf.dynamic_symbols();
    if let Ok(sections) = elf.sections() {
        for section in sections.to_vec() {
            let _ = elf.section_data(&section);
        }
    }
    let _ = elf.close();
});
