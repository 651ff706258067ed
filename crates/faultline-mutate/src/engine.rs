use serde::Serialize;

use faultline_core::{FaultlineConfig, MutationConfig, MutationMode};
use faultline_diffscan::scanner::{scan, DiffLineKind};
use faultline_diffscan::scope::ScopeFilter;

use crate::rules;

/// Outcome of a mutation run: the rewritten diff plus bookkeeping.
///
/// A fallback mutation is textual only (a marker comment, no semantic
/// change); callers should treat it as a weaker signal than a structural
/// rewrite, which is why [`fallback_used`](Self::fallback_used) is reported
/// separately.
///
/// # Examples
///
/// ```
/// use faultline_core::MutationMode;
/// use faultline_mutate::MutationEngine;
///
/// let engine = MutationEngine::with_defaults();
/// let diff = "+++ b/src/lib.rs\n+    let x = compute()?;\n";
/// let result = engine.mutate(diff, MutationMode::Unwrap);
/// assert_eq!(result.mutation_count, 1);
/// assert!(result.text.contains(".unwrap()"));
/// assert!(!result.fallback_used);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    /// The full mutated diff text, line-for-line identical to the input
    /// except at mutated positions.
    pub text: String,
    /// Number of lines changed. The fallback contributes at most 1.
    pub mutation_count: usize,
    /// Whether the comment-annotation fallback produced the only mutation.
    pub fallback_used: bool,
}

/// Applies one of three mutation strategies to the added lines of a unified
/// diff, injecting a policy violation while trying to preserve compilability.
///
/// The engine is a pure function of (diff text, mode): no I/O, no shared
/// state, safe to call from any number of threads.
///
/// # Examples
///
/// ```
/// use faultline_core::MutationMode;
/// use faultline_mutate::MutationEngine;
///
/// let engine = MutationEngine::with_defaults();
/// let diff = "+++ b/src/main.rs\n+    let y = risky_call();\n";
/// let result = engine.mutate(diff, MutationMode::Unsafe);
/// assert!(result.text.contains("unsafe { risky_call() }"));
/// ```
pub struct MutationEngine {
    config: MutationConfig,
    scope: ScopeFilter,
}

impl MutationEngine {
    /// Create an engine from full configuration.
    pub fn new(config: &FaultlineConfig) -> Self {
        Self {
            config: config.mutation.clone(),
            scope: ScopeFilter::from_config(&config.scope),
        }
    }

    /// Create an engine with default configuration: Rust sources outside
    /// `tests/`/`benches/`, fallback on, `panic!("mutation")`.
    pub fn with_defaults() -> Self {
        Self::new(&FaultlineConfig::default())
    }

    /// Mutate `diff_text` according to `mode`.
    ///
    /// Each in-scope added line is tried against the mode's ordered rule
    /// list; the first matching rule wins and no line is mutated twice. When
    /// no structural site exists anywhere in the diff, the fallback appends a
    /// marker comment to the first eligible line (if enabled).
    ///
    /// A result with `mutation_count == 0` is a valid, reportable outcome:
    /// the diff had no eligible lines, or every candidate already carried the
    /// mode's marker. Callers should flag such cases for manual attention.
    pub fn mutate(&self, diff_text: &str, mode: MutationMode) -> MutationResult {
        let lines = scan(diff_text);
        let last_added = lines.iter().rposition(|l| l.kind == DiffLineKind::Added);

        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut count = 0usize;

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_in_scope(&self.scope) {
                out.push(line.raw.clone());
                continue;
            }

            let body = line.body();
            let rewritten = match mode {
                MutationMode::Unwrap => rules::rewrite_unwrap(body),
                MutationMode::Unsafe => rules::rewrite_unsafe(body),
                MutationMode::Panic => {
                    let has_later_added = last_added.is_some_and(|last| last > idx);
                    rules::rewrite_panic(body, has_later_added, &self.config.panic_message)
                }
            };

            match rewritten {
                Some(new_body) => {
                    count += 1;
                    out.push(format!("+{new_body}{}", line.terminator()));
                }
                None => out.push(line.raw.clone()),
            }
        }

        let mut fallback_used = false;
        if count == 0 && self.config.fallback_enabled && self.apply_fallback(&lines, &mut out, mode)
        {
            count = 1;
            fallback_used = true;
        }

        MutationResult {
            text: out.concat(),
            mutation_count: count,
            fallback_used,
        }
    }

    /// Append the mode's marker comment to the first in-scope added line that
    /// is non-empty, not itself a comment, and free of the marker. Stops at
    /// the first eligible line, so the fallback contributes at most 1.
    fn apply_fallback(
        &self,
        lines: &[faultline_diffscan::DiffLine],
        out: &mut [String],
        mode: MutationMode,
    ) -> bool {
        let (marker, comment) = fallback_marker(mode);

        for (idx, line) in lines.iter().enumerate() {
            if !line.is_in_scope(&self.scope) {
                continue;
            }
            let body = line.body();
            let stripped = body.trim();
            if stripped.is_empty() || stripped.starts_with("//") || body.contains(marker) {
                continue;
            }
            out[idx] = format!("+{body}{comment}{}", line.terminator());
            return true;
        }

        false
    }
}

fn fallback_marker(mode: MutationMode) -> (&'static str, &'static str) {
    match mode {
        MutationMode::Unwrap => (".expect(", " // mutation_fallback .expect("),
        MutationMode::Unsafe => ("unsafe", " // mutation_fallback unsafe"),
        MutationMode::Panic => ("panic!", " // mutation_fallback panic!"),
    }
}
