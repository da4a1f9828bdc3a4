//! Text helpers for prompt embedding.

/// Replace line breaks with spaces so a passage fits on one prompt line.
pub fn nonewlines(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}
