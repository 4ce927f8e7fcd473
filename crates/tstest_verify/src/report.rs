//! Assertion emission.
//!
//! Turns matcher output into individually named test cases. The names are
//! part of the observable contract: consumers parsing test output key off
//! `"should have an error TS<code> at L<line+1>."` and
//! `"should not have an error TS<code>[ at <line+1>:<col+1>]"`.

use crate::sink::{AssertionError, ItFn};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tstest_diagnostics::Diagnostic;
use tstest_engine::SourceFile;

/// Emit one assertion for an expectation: passes iff a diagnostic was
/// matched to it. `key` is the `"TS<code> at L<line+1>"` display key.
pub(crate) fn report_expected_error(
    key: &str,
    diagnostic: Option<&Arc<Diagnostic>>,
    it: &mut ItFn,
) {
    let matched = diagnostic.is_some();
    it(&format!("should have an error {}.", key), &mut || {
        if matched {
            Ok(())
        } else {
            Err(AssertionError::new("no matching error was reported"))
        }
    });
}

/// Emit one always-failing assertion for a diagnostic no expectation
/// consumed. The description carries the location when the diagnostic has
/// one and its owning file is part of the program; the failure detail is
/// the flattened message.
pub(crate) fn report_unexpected_error<F: SourceFile>(
    diagnostic: &Arc<Diagnostic>,
    files_by_name: &FxHashMap<&str, &F>,
    it: &mut ItFn,
) {
    let mut description = format!("should not have an error TS{}", diagnostic.code);
    if let (Some(file_name), Some(start)) = (diagnostic.file.as_deref(), diagnostic.start()) {
        if let Some(file) = files_by_name.get(file_name) {
            let loc = file.line_and_character_of(start);
            description.push_str(&format!(" at {}:{}", loc.line + 1, loc.character + 1));
        }
    }

    let message = diagnostic.message.flatten("\n");
    it(&description, &mut || {
        Err(AssertionError::new(message.clone()))
    });
}
