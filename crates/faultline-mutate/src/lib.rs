//! Syntax-aware diff mutation.
//!
//! Injects a chosen policy violation (unwrap, unsafe, panic) into the added
//! lines of a unified diff while trying to preserve compilability. Each mode
//! is an ordered rule table with an idempotence guard; a comment-annotation
//! fallback guarantees a distinguishable output when no structural rewrite
//! site exists.

mod engine;
mod rules;

pub use engine::{MutationEngine, MutationResult};
