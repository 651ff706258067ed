//! Policy-violation counting over unified diffs.
//!
//! Counts unwrap/expect calls, `panic!` invocations, and word-boundary
//! `unsafe` occurrences in the in-scope added lines of a diff, with a
//! bounded context-window search for exempting `// SAFETY:` annotations.

mod checker;

pub use checker::{PolicyChecker, PolicyCounts};
