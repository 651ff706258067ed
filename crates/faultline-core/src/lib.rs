//! Core types, configuration, and error handling for the Faultline toolkit.
//!
//! This crate provides the shared foundation used by all other Faultline crates:
//! - [`FaultlineError`] — unified error type using `thiserror`
//! - [`FaultlineConfig`] — configuration loaded from `.faultline.toml`
//! - Shared types: [`MutationMode`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{FaultlineConfig, MutationConfig, PolicyConfig, ScopeConfig};
pub use error::FaultlineError;
pub use types::{MutationMode, OutputFormat};

/// A convenience `Result` type for Faultline operations.
pub type Result<T> = std::result::Result<T, FaultlineError>;
