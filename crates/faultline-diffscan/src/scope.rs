//! Scope filtering: which diff paths count for mutation and policy checks.
//!
//! Only source files of the target language are in scope, and anything under
//! a test or bench directory is excluded so deliberate `unwrap()` calls in
//! test code never register as violations.

use std::path::Path;

use faultline_core::ScopeConfig;

/// Predicate over diff target paths combining an extension allowlist,
/// directory-segment exclusion, and custom glob skip patterns.
///
/// # Examples
///
/// ```
/// use faultline_diffscan::scope::ScopeFilter;
///
/// let filter = ScopeFilter::default_filter();
/// assert!(filter.is_in_scope("src/main.rs"));
/// assert!(!filter.is_in_scope("tests/integration.rs"));
/// assert!(!filter.is_in_scope("README.md"));
/// ```
pub struct ScopeFilter {
    source_extension: String,
    excluded_dirs: Vec<String>,
    skip_patterns: Vec<glob::Pattern>,
}

impl ScopeFilter {
    /// Create a filter with the default policy: Rust sources outside
    /// `tests/` and `benches/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_diffscan::scope::ScopeFilter;
    ///
    /// let filter = ScopeFilter::default_filter();
    /// assert!(!filter.is_in_scope("crates/foo/benches/large.rs"));
    /// ```
    pub fn default_filter() -> Self {
        Self::from_config(&ScopeConfig::default())
    }

    /// Create a filter from scope configuration.
    ///
    /// Invalid glob patterns are dropped silently, matching how the config
    /// layer treats optional noise filters.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_core::ScopeConfig;
    /// use faultline_diffscan::scope::ScopeFilter;
    ///
    /// let config = ScopeConfig {
    ///     skip_patterns: vec!["generated/**".into()],
    ///     ..ScopeConfig::default()
    /// };
    /// let filter = ScopeFilter::from_config(&config);
    /// assert!(!filter.is_in_scope("generated/bindings.rs"));
    /// ```
    pub fn from_config(config: &ScopeConfig) -> Self {
        let mut skip_patterns = Vec::new();
        for pat in &config.skip_patterns {
            if let Ok(p) = glob::Pattern::new(pat) {
                skip_patterns.push(p);
            }
        }

        Self {
            source_extension: config.source_extension.clone(),
            excluded_dirs: config.excluded_dirs.clone(),
            skip_patterns,
        }
    }

    /// Check whether a diff target path is in policy scope.
    pub fn is_in_scope(&self, path: &str) -> bool {
        if !self.has_source_extension(path) {
            return false;
        }
        if self.in_excluded_dir(path) {
            return false;
        }
        for pat in &self.skip_patterns {
            if pat.matches(path) {
                return false;
            }
        }
        true
    }

    fn has_source_extension(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == self.source_extension)
    }

    /// Excluded segments anchor at the path start or after a separator, so
    /// `src/tests_util.rs` stays in scope while `src/tests/util.rs` does not.
    fn in_excluded_dir(&self, path: &str) -> bool {
        for dir in &self.excluded_dirs {
            if path.starts_with(&format!("{dir}/")) || path.contains(&format!("/{dir}/")) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_sources_in_scope() {
        let filter = ScopeFilter::default_filter();
        assert!(filter.is_in_scope("src/main.rs"));
        assert!(filter.is_in_scope("crates/engine/src/lib.rs"));
        assert!(filter.is_in_scope("lib.rs"));
    }

    #[test]
    fn non_source_extensions_excluded() {
        let filter = ScopeFilter::default_filter();
        assert!(!filter.is_in_scope("Cargo.toml"));
        assert!(!filter.is_in_scope("README.md"));
        assert!(!filter.is_in_scope("src/main.py"));
        assert!(!filter.is_in_scope("no_extension"));
    }

    #[test]
    fn test_and_bench_dirs_excluded() {
        let filter = ScopeFilter::default_filter();
        assert!(!filter.is_in_scope("tests/integration.rs"));
        assert!(!filter.is_in_scope("benches/throughput.rs"));
        assert!(!filter.is_in_scope("crates/foo/tests/it.rs"));
        assert!(!filter.is_in_scope("crates/foo/benches/bench.rs"));
    }

    #[test]
    fn exclusion_is_segment_anchored() {
        let filter = ScopeFilter::default_filter();
        // "tests" as a substring of a segment does not exclude
        assert!(filter.is_in_scope("src/tests_util.rs"));
        assert!(filter.is_in_scope("contests/entry.rs"));
        // but a real segment does
        assert!(!filter.is_in_scope("src/tests/util.rs"));
    }

    #[test]
    fn custom_extension_from_config() {
        let config = ScopeConfig {
            source_extension: "zig".into(),
            ..ScopeConfig::default()
        };
        let filter = ScopeFilter::from_config(&config);
        assert!(filter.is_in_scope("src/main.zig"));
        assert!(!filter.is_in_scope("src/main.rs"));
    }

    #[test]
    fn custom_excluded_dirs_from_config() {
        let config = ScopeConfig {
            excluded_dirs: vec!["tests".into(), "benches".into(), "fuzz".into()],
            ..ScopeConfig::default()
        };
        let filter = ScopeFilter::from_config(&config);
        assert!(!filter.is_in_scope("fuzz/fuzz_targets/parse.rs"));
    }

    #[test]
    fn glob_skip_patterns() {
        let config = ScopeConfig {
            skip_patterns: vec!["generated/**".into(), "*.pb.rs".into()],
            ..ScopeConfig::default()
        };
        let filter = ScopeFilter::from_config(&config);
        assert!(!filter.is_in_scope("generated/api.rs"));
        assert!(!filter.is_in_scope("msg.pb.rs"));
        assert!(filter.is_in_scope("src/api.rs"));
    }

    #[test]
    fn invalid_glob_patterns_are_dropped() {
        let config = ScopeConfig {
            skip_patterns: vec!["[broken".into()],
            ..ScopeConfig::default()
        };
        let filter = ScopeFilter::from_config(&config);
        assert!(filter.is_in_scope("src/main.rs"));
    }
}
