use std::fmt;

use crate::scope::ScopeFilter;

/// Classification of a single unified-diff line.
///
/// # Examples
///
/// ```
/// use faultline_diffscan::scanner::{scan, DiffLineKind};
///
/// let lines = scan("+    foo();\n");
/// assert_eq!(lines[0].kind, DiffLineKind::Added);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineKind {
    /// Structural line: `diff --git`, `+++`, or `---` header.
    FileHeader,
    /// Line added by the patch (leading `+`).
    Added,
    /// Line removed by the patch (leading `-`).
    Removed,
    /// Unchanged context line (leading space).
    Context,
    /// Anything else: hunk headers, index lines, mode lines, noise.
    Other,
}

impl fmt::Display for DiffLineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLineKind::FileHeader => write!(f, "header"),
            DiffLineKind::Added => write!(f, "added"),
            DiffLineKind::Removed => write!(f, "removed"),
            DiffLineKind::Context => write!(f, "context"),
            DiffLineKind::Other => write!(f, "other"),
        }
    }
}

/// One line of unified-diff text, with its classification and target file.
///
/// `raw` keeps the leading marker and the original line terminator, so
/// re-joining a scanned sequence reproduces the input byte-for-byte.
///
/// # Examples
///
/// ```
/// use faultline_diffscan::scanner::scan;
///
/// let diff = "diff --git a/src/lib.rs b/src/lib.rs\n\
///             +++ b/src/lib.rs\n\
///             +    foo();\n";
/// let lines = scan(diff);
/// assert_eq!(lines[2].file.as_deref(), Some("src/lib.rs"));
/// assert_eq!(lines[2].body(), "    foo();");
/// ```
#[derive(Debug, Clone)]
pub struct DiffLine {
    /// Raw line text including marker and terminator.
    pub raw: String,
    /// Derived line classification.
    pub kind: DiffLineKind,
    /// The file this line targets; unset between a file reset and the next
    /// `+++ b/` header, and for file deletions.
    pub file: Option<String>,
}

impl DiffLine {
    /// The line without its terminator (marker included).
    pub fn text(&self) -> &str {
        &self.raw[..self.raw.len() - self.terminator().len()]
    }

    /// The original line terminator: `"\n"`, `"\r\n"`, or `""` at EOF.
    pub fn terminator(&self) -> &str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }

    /// The line content with the `+`/`-`/` ` marker stripped.
    ///
    /// Header and other lines are returned unchanged (minus terminator).
    pub fn body(&self) -> &str {
        let text = self.text();
        match self.kind {
            DiffLineKind::Added | DiffLineKind::Removed | DiffLineKind::Context => &text[1..],
            _ => text,
        }
    }

    /// Whether this line is an added line eligible for mutation or counting.
    ///
    /// Requires `kind == Added`, a resolved target file, and the filter
    /// accepting that file. A line with no resolvable file is never in scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use faultline_diffscan::scanner::scan;
    /// use faultline_diffscan::scope::ScopeFilter;
    ///
    /// let filter = ScopeFilter::default_filter();
    /// let lines = scan("+++ b/src/lib.rs\n+    foo();\n");
    /// assert!(lines[1].is_in_scope(&filter));
    ///
    /// let lines = scan("+++ b/tests/it.rs\n+    foo();\n");
    /// assert!(!lines[1].is_in_scope(&filter));
    /// ```
    pub fn is_in_scope(&self, filter: &ScopeFilter) -> bool {
        self.kind == DiffLineKind::Added
            && self
                .file
                .as_deref()
                .is_some_and(|path| filter.is_in_scope(path))
    }
}

/// Scan unified-diff text into an ordered sequence of [`DiffLine`] records.
///
/// Malformed input never fails: unrecognized lines are classified as
/// [`DiffLineKind::Other`] and left untouched by downstream passes.
///
/// Rules:
/// - `diff --git ` resets the current file.
/// - `+++ b/<path>` sets the current file; the `/dev/null` sentinel leaves it
///   unset (file deletions carry no addable lines).
/// - `+++`/`---` headers are never classified as added/removed lines.
///
/// # Examples
///
/// ```
/// use faultline_diffscan::scanner::scan;
///
/// let diff = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1,2 @@\n line\n+new\n";
/// let lines = scan(diff);
/// let rejoined: String = lines.iter().map(|l| l.raw.as_str()).collect();
/// assert_eq!(rejoined, diff);
/// ```
pub fn scan(diff: &str) -> Vec<DiffLine> {
    let mut lines: Vec<DiffLine> = Vec::new();
    let mut current_file: Option<String> = None;

    for raw in split_keepends(diff) {
        let text = trim_terminator(raw);

        let kind = if text.starts_with("diff --git ") {
            current_file = None;
            DiffLineKind::FileHeader
        } else if let Some(path) = text.strip_prefix("+++ b/") {
            let path = path.trim();
            current_file = if path == "/dev/null" {
                None
            } else {
                Some(path.to_string())
            };
            DiffLineKind::FileHeader
        } else if text.starts_with("+++") || text.starts_with("---") {
            DiffLineKind::FileHeader
        } else if text.starts_with('+') {
            DiffLineKind::Added
        } else if text.starts_with('-') {
            DiffLineKind::Removed
        } else if text.starts_with(' ') {
            DiffLineKind::Context
        } else {
            DiffLineKind::Other
        };

        lines.push(DiffLine {
            raw: raw.to_string(),
            kind,
            file: current_file.clone(),
        });
    }

    lines
}

fn split_keepends(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

fn trim_terminator(raw: &str) -> &str {
    raw.strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw)
}
