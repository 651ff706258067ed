use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The policy violation a mutation run injects into a patch.
///
/// Each mode owns an ordered list of rewrite rules plus one fallback rule;
/// the engine in `faultline-mutate` dispatches on this value.
///
/// # Examples
///
/// ```
/// use faultline_core::MutationMode;
///
/// let mode: MutationMode = "unwrap".parse().unwrap();
/// assert_eq!(mode, MutationMode::Unwrap);
/// assert_eq!(format!("{mode}"), "unwrap");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationMode {
    /// Turn error propagation into `.unwrap()` calls.
    Unwrap,
    /// Wrap calls in `unsafe { }` blocks.
    Unsafe,
    /// Replace control-flow statements with `panic!`.
    Panic,
}

impl fmt::Display for MutationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationMode::Unwrap => write!(f, "unwrap"),
            MutationMode::Unsafe => write!(f, "unsafe"),
            MutationMode::Panic => write!(f, "panic"),
        }
    }
}

impl FromStr for MutationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unwrap" => Ok(MutationMode::Unwrap),
            "unsafe" => Ok(MutationMode::Unsafe),
            "panic" => Ok(MutationMode::Panic),
            other => Err(format!("unknown mutation mode: {other}")),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use faultline_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
