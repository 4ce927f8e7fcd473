//! Test-runner integration.
//!
//! The verifier does not own a test runner; it drives whatever
//! `describe`/`it` pair it is given. Without one, both callbacks fall back
//! to immediate synchronous execution, so outside a harness verification
//! degrades to "run and panic on the first failing assertion".

use std::fmt;
use thiserror::Error;

/// A failed assertion, carrying the failure detail for diagnosis.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Declares a test group. Must invoke the body before returning; the body
/// borrows verification state and cannot be stored.
pub type DescribeFn = Box<dyn FnMut(&str, &mut dyn FnMut())>;

/// Declares a test case. The body returns `Err` when the assertion fails.
/// Must invoke the body before returning.
pub type ItFn = Box<dyn FnMut(&str, &mut dyn FnMut() -> Result<(), AssertionError>)>;

/// The options to construct a [`TypeTester`](crate::TypeTester) instance.
#[derive(Default)]
pub struct Options {
    /// Function to declare test suites. If omitted, the suite body runs
    /// immediately with no grouping side effect.
    pub describe: Option<DescribeFn>,
    /// Function to declare test cases. If omitted, the case body runs
    /// immediately and panics on failure.
    pub it: Option<ItFn>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("describe", &self.describe.as_ref().map(|_| "..."))
            .field("it", &self.it.as_ref().map(|_| "..."))
            .finish()
    }
}

pub(crate) fn fallback_describe() -> DescribeFn {
    Box::new(|_description, body| body())
}

pub(crate) fn fallback_it() -> ItFn {
    Box::new(|description, body| {
        if let Err(error) = body() {
            panic!("{}: {}", description, error);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_describe_runs_body() {
        let mut ran = false;
        (fallback_describe())("group", &mut || ran = true);
        assert!(ran);
    }

    #[test]
    fn test_fallback_it_passes() {
        (fallback_it())("case", &mut || Ok(()));
    }

    #[test]
    #[should_panic(expected = "case: boom")]
    fn test_fallback_it_panics_on_failure() {
        (fallback_it())("case", &mut || Err(AssertionError::new("boom")));
    }
}
