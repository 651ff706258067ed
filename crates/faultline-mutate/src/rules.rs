//! Per-line rewrite rules for each mutation mode.
//!
//! Each mode is an ordered list of (predicate, rewrite) rules evaluated in a
//! fixed priority order with early exit on first match. All functions take
//! the line body (marker and terminator stripped) and return the rewritten
//! body, or `None` when no rule applies.

use once_cell::sync::Lazy;
use regex::Regex;

/// Error-propagation sigil immediately followed by statement-terminating punctuation.
static QUESTION_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?([;,\)\]\}])").unwrap());

/// Error-propagation sigil followed by a semicolon, possibly across whitespace.
static QUESTION_SEMI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?[ \t]*;").unwrap());

/// Bare call-expression statement: identifier, parenthesized arguments,
/// terminator, optional trailing whitespace, nothing else.
static CALL_STMT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+[ \t]*\(.*\)[ \t]*;[ \t]*$").unwrap());

/// Closing paren + terminator at end of line, the rewrite site for call statements.
static CLOSE_SEMI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)[ \t]*;[ \t]*$").unwrap());

/// `let <name> = <expr>;` with optional trailing comment.
static LET_BINDING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*let[ \t]+[^=]+?=[ \t]*)(.+?);([ \t]*(//.*)?)$").unwrap());

/// Leading tokens that can never be wrapped in an unsafe block.
const DECL_KEYWORDS: &[&str] = &["use ", "fn ", "pub ", "struct ", "enum ", "impl "];

/// Turn error propagation or a plain call statement into an aborting unwrap.
///
/// Skips lines that already carry an unwrap-family call so repeated runs
/// never double-mutate.
pub(crate) fn rewrite_unwrap(body: &str) -> Option<String> {
    if body.contains(".unwrap(") || body.contains(".expect(") {
        return None;
    }

    if body.contains('?') {
        if QUESTION_PUNCT_RE.is_match(body) {
            return Some(QUESTION_PUNCT_RE.replace(body, ".unwrap()${1}").into_owned());
        }
        if QUESTION_SEMI_RE.is_match(body) {
            return Some(QUESTION_SEMI_RE.replace(body, ".unwrap();").into_owned());
        }
    }

    if CALL_STMT_RE.is_match(body) {
        return Some(CLOSE_SEMI_RE.replace(body, ").unwrap();").into_owned());
    }

    None
}

/// Wrap a call in an `unsafe { }` block, preserving binding prefix,
/// indentation, and trailing comment.
pub(crate) fn rewrite_unsafe(body: &str) -> Option<String> {
    if body.contains("unsafe") {
        return None;
    }

    if let Some(caps) = LET_BINDING_RE.captures(body) {
        let (prefix, expr, suffix) = (&caps[1], &caps[2], &caps[3]);
        if expr.contains('(') {
            return Some(format!("{prefix}unsafe {{ {expr} }};{suffix}"));
        }
    }

    let stripped = body.trim_start();
    if DECL_KEYWORDS.iter().any(|kw| stripped.starts_with(kw)) {
        return None;
    }

    if CALL_STMT_RE.is_match(body) {
        let ws = leading_whitespace(body);
        let stmt = body.trim().trim_end_matches(';');
        return Some(format!("{ws}unsafe {{ {stmt} }};"));
    }

    None
}

/// Replace a control-flow statement with an unconditional `panic!`.
///
/// `break;`/`continue;` are replaced unconditionally. `return` statements are
/// only replaced when a later added line exists in the diff; mutating the
/// final return of a hunk would truncate output in a way distinguishable
/// from realistic bugs.
pub(crate) fn rewrite_panic(body: &str, has_later_added: bool, message: &str) -> Option<String> {
    if body.contains("panic!") {
        return None;
    }

    let stripped = body.trim();
    let ws = leading_whitespace(body);

    if stripped == "break;" || stripped == "continue;" {
        return Some(format!("{ws}panic!(\"{message}\");"));
    }

    if stripped.starts_with("return") {
        if has_later_added {
            return Some(format!("{ws}panic!(\"{message}\");"));
        }
        return None;
    }

    None
}

fn leading_whitespace(body: &str) -> &str {
    &body[..body.len() - body.trim_start().len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_rewrites_try_before_semicolon() {
        assert_eq!(
            rewrite_unwrap("    let x = compute()?;").as_deref(),
            Some("    let x = compute().unwrap();")
        );
    }

    #[test]
    fn unwrap_rewrites_try_before_other_punctuation() {
        assert_eq!(
            rewrite_unwrap("    wrap(inner()?)").as_deref(),
            Some("    wrap(inner().unwrap())")
        );
        assert_eq!(
            rewrite_unwrap("    [first()?, second]").as_deref(),
            Some("    [first().unwrap(), second]")
        );
    }

    #[test]
    fn unwrap_rewrites_first_occurrence_only() {
        assert_eq!(
            rewrite_unwrap("    a()?; b()?;").as_deref(),
            Some("    a().unwrap(); b()?;")
        );
    }

    #[test]
    fn unwrap_rewrites_spaced_semicolon() {
        assert_eq!(
            rewrite_unwrap("    run()? ;").as_deref(),
            Some("    run().unwrap();")
        );
    }

    #[test]
    fn unwrap_appends_to_bare_call_statement() {
        assert_eq!(
            rewrite_unwrap("    do_work(a, b);").as_deref(),
            Some("    do_work(a, b).unwrap();")
        );
        assert_eq!(
            rewrite_unwrap("    flush();  ").as_deref(),
            Some("    flush().unwrap();")
        );
    }

    #[test]
    fn unwrap_skips_existing_unwrap_or_expect() {
        assert!(rewrite_unwrap("    x.unwrap();").is_none());
        assert!(rewrite_unwrap("    x.expect(\"msg\");").is_none());
    }

    #[test]
    fn unwrap_skips_non_statement_lines() {
        assert!(rewrite_unwrap("    let x = 5;").is_none());
        assert!(rewrite_unwrap("}").is_none());
        assert!(rewrite_unwrap("    // comment").is_none());
    }

    #[test]
    fn unsafe_wraps_let_binding_with_call() {
        assert_eq!(
            rewrite_unsafe("    let y = risky_call();").as_deref(),
            Some("    let y = unsafe { risky_call() };")
        );
    }

    #[test]
    fn unsafe_preserves_trailing_comment_on_binding() {
        assert_eq!(
            rewrite_unsafe("    let y = risky_call(); // note").as_deref(),
            Some("    let y = unsafe { risky_call() }; // note")
        );
    }

    #[test]
    fn unsafe_skips_binding_without_call() {
        // No call in the expression, and not a bare call statement either
        assert!(rewrite_unsafe("    let y = 5;").is_none());
    }

    #[test]
    fn unsafe_wraps_bare_call_statement() {
        assert_eq!(
            rewrite_unsafe("    do_thing(x);").as_deref(),
            Some("    unsafe { do_thing(x) };")
        );
    }

    #[test]
    fn unsafe_skips_declarations() {
        assert!(rewrite_unsafe("use std::fs::read(x);").is_none());
        assert!(rewrite_unsafe("    fn helper();").is_none());
        assert!(rewrite_unsafe("pub fn api(x: u8);").is_none());
        assert!(rewrite_unsafe("struct S(u8);").is_none());
        assert!(rewrite_unsafe("enum E { A }").is_none());
        assert!(rewrite_unsafe("impl Foo for Bar {}").is_none());
    }

    #[test]
    fn unsafe_skips_lines_already_unsafe() {
        assert!(rewrite_unsafe("    unsafe { do_thing() };").is_none());
        // Substring check is deliberate: the guard is idempotence, not parsing
        assert!(rewrite_unsafe("    call_unsafe_ffi();").is_none());
    }

    #[test]
    fn panic_replaces_break_and_continue() {
        assert_eq!(
            rewrite_panic("        break;", false, "mutation").as_deref(),
            Some("        panic!(\"mutation\");")
        );
        assert_eq!(
            rewrite_panic("    continue;", false, "mutation").as_deref(),
            Some("    panic!(\"mutation\");")
        );
    }

    #[test]
    fn panic_replaces_return_only_with_later_added_line() {
        assert_eq!(
            rewrite_panic("    return;", true, "mutation").as_deref(),
            Some("    panic!(\"mutation\");")
        );
        assert!(rewrite_panic("    return;", false, "mutation").is_none());
        assert_eq!(
            rewrite_panic("    return Ok(());", true, "mutation").as_deref(),
            Some("    panic!(\"mutation\");")
        );
    }

    #[test]
    fn panic_skips_existing_panic() {
        assert!(rewrite_panic("    panic!(\"boom\");", true, "mutation").is_none());
    }

    #[test]
    fn panic_uses_configured_message() {
        assert_eq!(
            rewrite_panic("    break;", false, "injected").as_deref(),
            Some("    panic!(\"injected\");")
        );
    }

    #[test]
    fn panic_skips_unrelated_statements() {
        assert!(rewrite_panic("    let x = 1;", true, "mutation").is_none());
        assert!(rewrite_panic("    break_even();", true, "mutation").is_none());
    }
}
