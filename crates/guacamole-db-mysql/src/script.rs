//! Splitting of multi-statement SQL scripts.
//!
//! The splitter is deliberately not SQL-aware: a `;` or `--` inside a quoted
//! string literal is treated as a statement boundary or a comment start.

/// Marker that starts a line comment.
const LINE_COMMENT: &str = "--";

/// Statement terminator.
const TERMINATOR: char = ';';

/// Splits a raw script into `;`-terminated statements.
///
/// Line comments are cut off and lines left empty or blank are dropped before
/// splitting. Every fragment between terminators is returned with its `;`
/// re-appended, including the fragment after the last terminator, so a
/// script ending in whitespace yields a trailing blank statement. Scripts
/// without any non-comment content yield no statements.
pub fn split(raw_script: &str) -> Vec<String> {
    let mut without_comments = String::with_capacity(raw_script.len());
    for line in raw_script.lines() {
        if let Some(code) = strip_comment(line) {
            without_comments.push_str(code);
            without_comments.push('\n');
        }
    }

    if without_comments.is_empty() {
        return Vec::new();
    }

    without_comments
        .split(TERMINATOR)
        .map(|fragment| format!("{fragment}{TERMINATOR}"))
        .collect()
}

/// Returns the part of `line` before any comment, or `None` when nothing but
/// whitespace is left.
fn strip_comment(line: &str) -> Option<&str> {
    let code = match line.find(LINE_COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    };
    if code.trim().is_empty() {
        None
    } else {
        Some(code)
    }
}
