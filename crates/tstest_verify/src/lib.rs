//! tstest_verify: Diagnostic verification for type-declaration fixtures.
//!
//! Verifies that a type checker reports exactly the diagnostics a set of
//! fixture files expects, and nothing unexpected anywhere else in the
//! compiled program. Expectations are embedded in fixture source as
//! comment markers:
//!
//! ```ts
//! f("wrong"); // @expected 2345
//! ```
//!
//! [`TypeTester::verify`] compiles the fixtures through a
//! [`tstest_engine::Engine`], extracts the markers, matches them against
//! the error diagnostics the checker produced, and reports one pass/fail
//! test assertion per expectation and per unexpected diagnostic through
//! injected `describe`/`it` callbacks.

mod expect;
mod report;
mod sink;
mod verifier;

pub use expect::{collect_expected_errors, Expectation};
pub use sink::{AssertionError, DescribeFn, ItFn, Options};
pub use verifier::TypeTester;
