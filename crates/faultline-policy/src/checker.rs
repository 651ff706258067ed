use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use faultline_core::{FaultlineConfig, PolicyConfig};
use faultline_diffscan::scanner::scan;
use faultline_diffscan::scope::ScopeFilter;

static UNWRAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.unwrap\(\)").unwrap());
static EXPECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.expect\(").unwrap());
static PANIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bpanic!\(").unwrap());
static UNSAFE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bunsafe\b").unwrap());
static SAFETY_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)//\s*SAFETY\s*:").unwrap());

/// Counts of policy-relevant constructs found in the added lines of a diff.
///
/// Invariant: `unsafe_without_safety_comment <= unsafe_count`.
///
/// # Examples
///
/// ```
/// use faultline_policy::PolicyChecker;
///
/// let checker = PolicyChecker::with_defaults();
/// let diff = "+++ b/src/lib.rs\n+    value.unwrap();\n";
/// let counts = checker.count(diff);
/// assert_eq!(counts.unwrap_count, 1);
/// assert_eq!(counts.notes, vec!["unwrap/expect found in added lines"]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCounts {
    /// `.unwrap()` and `.expect(` occurrences, summed.
    pub unwrap_count: usize,
    /// Word-boundary `unsafe` occurrences.
    pub unsafe_count: usize,
    /// `panic!(` occurrences.
    pub panic_count: usize,
    /// Unsafe occurrences with no `// SAFETY:` annotation in reach.
    pub unsafe_without_safety_comment: usize,
    /// One fixed message per nonzero counter, in declaration order.
    pub notes: Vec<String>,
}

impl PolicyCounts {
    /// Whether any counter is nonzero.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_policy::PolicyCounts;
    ///
    /// let counts = PolicyCounts::default();
    /// assert!(!counts.any_violation());
    /// ```
    pub fn any_violation(&self) -> bool {
        self.unwrap_count > 0
            || self.unsafe_count > 0
            || self.panic_count > 0
            || self.unsafe_without_safety_comment > 0
    }

    /// Render the counts as a Markdown table with notes.
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Policy Check\n\n");
        md.push_str("| Counter | Count |\n");
        md.push_str("|---------|-------|\n");
        md.push_str(&format!("| unwrap/expect | {} |\n", self.unwrap_count));
        md.push_str(&format!("| unsafe | {} |\n", self.unsafe_count));
        md.push_str(&format!("| panic! | {} |\n", self.panic_count));
        md.push_str(&format!(
            "| unsafe without SAFETY | {} |\n",
            self.unsafe_without_safety_comment
        ));
        if !self.notes.is_empty() {
            md.push('\n');
            for note in &self.notes {
                md.push_str(&format!("- {note}\n"));
            }
        }
        md
    }

    fn assemble_notes(&mut self) {
        if self.unwrap_count > 0 {
            self.notes.push("unwrap/expect found in added lines".into());
        }
        if self.unsafe_count > 0 {
            self.notes.push("unsafe found in added lines".into());
        }
        if self.panic_count > 0 {
            self.notes.push("panic! found in added lines".into());
        }
        if self.unsafe_without_safety_comment > 0 {
            self.notes
                .push("unsafe without //SAFETY comment found in added lines".into());
        }
    }
}

impl fmt::Display for PolicyCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Policy check:")?;
        writeln!(f, "  unwrap/expect:          {}", self.unwrap_count)?;
        writeln!(f, "  unsafe:                 {}", self.unsafe_count)?;
        writeln!(f, "  panic!:                 {}", self.panic_count)?;
        writeln!(
            f,
            "  unsafe without SAFETY:  {}",
            self.unsafe_without_safety_comment
        )?;
        for note in &self.notes {
            writeln!(f, "  note: {note}")?;
        }
        Ok(())
    }
}

/// Counts policy-relevant constructs in the in-scope added lines of a
/// unified diff, with an optional `// SAFETY:` exemption pass.
///
/// Pure and deterministic: no I/O, no shared state.
///
/// # Examples
///
/// ```
/// use faultline_policy::PolicyChecker;
///
/// let checker = PolicyChecker::with_defaults();
/// let diff = "+++ b/src/ffi.rs\n\
///             +// SAFETY: pointer validated above\n\
///             +unsafe { deref(p) };\n";
/// let counts = checker.count_with_annotation_check(diff);
/// assert_eq!(counts.unsafe_count, 1);
/// assert_eq!(counts.unsafe_without_safety_comment, 0);
/// ```
pub struct PolicyChecker {
    config: PolicyConfig,
    scope: ScopeFilter,
}

impl PolicyChecker {
    /// Create a checker from full configuration.
    pub fn new(config: &FaultlineConfig) -> Self {
        Self {
            config: config.policy.clone(),
            scope: ScopeFilter::from_config(&config.scope),
        }
    }

    /// Create a checker with default configuration: Rust sources outside
    /// `tests/`/`benches/`, 10-back/3-forward annotation window.
    pub fn with_defaults() -> Self {
        Self::new(&FaultlineConfig::default())
    }

    /// Count violations without the annotation-exemption pass.
    ///
    /// `unsafe_without_safety_comment` is always 0 in the result.
    pub fn count(&self, diff_text: &str) -> PolicyCounts {
        self.run(diff_text, false)
    }

    /// Count violations, exempting unsafe occurrences covered by a
    /// `// SAFETY:` comment on the same line or within the configured
    /// window of surrounding diff lines.
    ///
    /// The window is asymmetric (default 10 lines back, 3 forward) because
    /// justification comments conventionally precede the unsafe block they
    /// cover. The search spans raw diff lines regardless of their
    /// add/remove/context classification, structural lines included.
    pub fn count_with_annotation_check(&self, diff_text: &str) -> PolicyCounts {
        self.run(diff_text, true)
    }

    /// Count violations, running the annotation pass according to the
    /// `check_safety_comments` configuration flag.
    pub fn count_with_config(&self, diff_text: &str) -> PolicyCounts {
        self.run(diff_text, self.config.check_safety_comments)
    }

    fn run(&self, diff_text: &str, check_safety: bool) -> PolicyCounts {
        let lines = scan(diff_text);
        let mut counts = PolicyCounts::default();

        for (i, line) in lines.iter().enumerate() {
            if !line.is_in_scope(&self.scope) {
                continue;
            }

            let added = line.body();
            counts.unwrap_count += UNWRAP_RE.find_iter(added).count();
            counts.unwrap_count += EXPECT_RE.find_iter(added).count();
            counts.panic_count += PANIC_RE.find_iter(added).count();

            let unsafe_in_line = UNSAFE_RE.find_iter(added).count();
            counts.unsafe_count += unsafe_in_line;

            if check_safety && unsafe_in_line > 0 {
                // The flag resets per line; each unsafe line must find its
                // own annotation.
                let mut has_safety = SAFETY_COMMENT_RE.is_match(added);
                if !has_safety {
                    let start = i.saturating_sub(self.config.window_before);
                    let end = (i + self.config.window_after + 1).min(lines.len());
                    for neighbor in &lines[start..end] {
                        if SAFETY_COMMENT_RE.is_match(neighbor.text()) {
                            has_safety = true;
                            break;
                        }
                    }
                }
                if !has_safety {
                    counts.unsafe_without_safety_comment += unsafe_in_line;
                }
            }
        }

        counts.assemble_notes();
        counts
    }
}
