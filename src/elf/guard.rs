//! The panic boundary around calls into the ELF parser.

use crate::error::ParseError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

pub(crate) const READING_FILE: &str = "reading ELF file";
pub(crate) const READING_SYMBOLS: &str = "reading ELF symbols";
pub(crate) const READING_DYNAMIC_SYMBOLS: &str = "reading ELF dynamic symbols";
pub(crate) const READING_SECTION_DATA: &str = "reading ELF section data";

/// Run `parse`, turning a panic raised inside it into `ParseError::Panicked`.
///
/// Only the closure is guarded. Errors it returns pass through untouched.
///
/// The panic hook is left as installed, so the default hook still reports
/// each contained panic on stderr before the error is returned.
pub(crate) fn catch_parser_panic<T, F>(context: &'static str, parse: F) -> Result<T, ParseError>
where
    F: FnOnce() -> Result<T, ParseError>,
{
    // The closure only borrows parser input; nothing it touches is observed
    // again in a half-updated state after an unwind.
    match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result,
        Err(payload) => {
            let cause = panic_cause(payload.as_ref());
            warn!(context, cause = %cause, "ELF parser panicked");
            Err(ParseError::Panicked { context, cause })
        }
    }
}

fn panic_cause(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
