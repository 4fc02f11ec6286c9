#![no_main]
use elfguard::BinaryPath;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = BinaryPath::parse(data).to_string();
});
