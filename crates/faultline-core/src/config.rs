use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FaultlineError;

/// Top-level configuration loaded from `.faultline.toml`.
///
/// Every table and field has a default, so an empty or missing file yields a
/// fully usable configuration.
///
/// # Examples
///
/// ```
/// use faultline_core::FaultlineConfig;
///
/// let config = FaultlineConfig::default();
/// assert_eq!(config.scope.source_extension, "rs");
/// assert_eq!(config.policy.window_before, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultlineConfig {
    /// Which diff lines are eligible for mutation and counting.
    #[serde(default)]
    pub scope: ScopeConfig,
    /// Mutation engine settings.
    #[serde(default)]
    pub mutation: MutationConfig,
    /// Policy counter settings.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl FaultlineConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Io`] if the file cannot be read, or
    /// [`FaultlineError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use faultline_core::FaultlineConfig;
    /// use std::path::Path;
    ///
    /// let config = FaultlineConfig::from_file(Path::new(".faultline.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, FaultlineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FaultlineError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::FaultlineConfig;
    ///
    /// let toml = r#"
    /// [policy]
    /// window_before = 5
    /// "#;
    /// let config = FaultlineConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.policy.window_before, 5);
    /// assert_eq!(config.policy.window_after, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, FaultlineError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Scope filter configuration: which files in a diff are policy-relevant.
///
/// # Examples
///
/// ```
/// use faultline_core::ScopeConfig;
///
/// let config = ScopeConfig::default();
/// assert_eq!(config.excluded_dirs, vec!["tests", "benches"]);
/// assert!(config.skip_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// File extension of in-scope source files (default: `"rs"`).
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Directory segments that put a path out of scope (default: `tests`, `benches`).
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    /// Additional glob patterns to exclude (e.g. `"generated/**"`).
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

fn default_source_extension() -> String {
    "rs".into()
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["tests".into(), "benches".into()]
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_extension(),
            excluded_dirs: default_excluded_dirs(),
            skip_patterns: Vec::new(),
        }
    }
}

/// Mutation engine configuration.
///
/// # Examples
///
/// ```
/// use faultline_core::MutationConfig;
///
/// let config = MutationConfig::default();
/// assert!(config.fallback_enabled);
/// assert_eq!(config.panic_message, "mutation");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Append a marker comment when no structural rewrite site exists (default: true).
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,
    /// Message used in injected `panic!` invocations (default: `"mutation"`).
    #[serde(default = "default_panic_message")]
    pub panic_message: String,
}

fn default_fallback_enabled() -> bool {
    true
}

fn default_panic_message() -> String {
    "mutation".into()
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: default_fallback_enabled(),
            panic_message: default_panic_message(),
        }
    }
}

/// Policy counter configuration.
///
/// The annotation window is asymmetric because `// SAFETY:` comments
/// conventionally precede the unsafe block they cover.
///
/// # Examples
///
/// ```
/// use faultline_core::PolicyConfig;
///
/// let config = PolicyConfig::default();
/// assert!(config.check_safety_comments);
/// assert_eq!(config.window_before, 10);
/// assert_eq!(config.window_after, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Run the `// SAFETY:` exemption pass (default: true).
    #[serde(default = "default_check_safety_comments")]
    pub check_safety_comments: bool,
    /// Lines searched before an unsafe occurrence (default: 10).
    #[serde(default = "default_window_before")]
    pub window_before: usize,
    /// Lines searched after an unsafe occurrence (default: 3).
    #[serde(default = "default_window_after")]
    pub window_after: usize,
}

fn default_check_safety_comments() -> bool {
    true
}

fn default_window_before() -> usize {
    10
}

fn default_window_after() -> usize {
    3
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            check_safety_comments: default_check_safety_comments(),
            window_before: default_window_before(),
            window_after: default_window_after(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = FaultlineConfig::from_toml("").unwrap();
        assert_eq!(config.scope.source_extension, "rs");
        assert_eq!(config.scope.excluded_dirs, vec!["tests", "benches"]);
        assert!(config.mutation.fallback_enabled);
        assert_eq!(config.policy.window_before, 10);
        assert_eq!(config.policy.window_after, 3);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let toml = r#"
[scope]
excluded_dirs = ["tests", "benches", "fuzz"]

[mutation]
fallback_enabled = false
"#;
        let config = FaultlineConfig::from_toml(toml).unwrap();
        assert_eq!(config.scope.excluded_dirs.len(), 3);
        assert_eq!(config.scope.source_extension, "rs");
        assert!(!config.mutation.fallback_enabled);
        assert_eq!(config.mutation.panic_message, "mutation");
        assert!(config.policy.check_safety_comments);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let result = FaultlineConfig::from_toml("[scope\nbroken");
        assert!(result.is_err());
    }

    #[test]
    fn window_bounds_are_configurable() {
        let toml = r#"
[policy]
window_before = 2
window_after = 0
"#;
        let config = FaultlineConfig::from_toml(toml).unwrap();
        assert_eq!(config.policy.window_before, 2);
        assert_eq!(config.policy.window_after, 0);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = FaultlineConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed = FaultlineConfig::from_toml(&serialized).unwrap();
        assert_eq!(
            parsed.scope.source_extension,
            config.scope.source_extension
        );
        assert_eq!(parsed.policy.window_before, config.policy.window_before);
    }
}
