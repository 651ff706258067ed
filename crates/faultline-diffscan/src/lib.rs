//! Unified-diff scanning and scope filtering.
//!
//! Walks diff text line-by-line, classifying each line and tracking the file
//! it targets, while preserving terminators so the sequence re-joins to the
//! exact input. The mutation engine and policy counter both consume this
//! line stream.

pub mod scanner;
pub mod scope;

pub use scanner::{scan, DiffLine, DiffLineKind};
pub use scope::ScopeFilter;
