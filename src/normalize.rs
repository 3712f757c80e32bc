//! Whitespace normalization for extracted question and answer text.
//!
//! Sites disagree on how line breaks and tabs inside a question should be
//! treated, so the policy is passed explicitly at each call site.

use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r\t]").unwrap());

/// What to do with newline, carriage return and tab characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    /// Drop them, then trim. Used for WHO.
    Delete,
    /// Replace each with a single space, then trim. Used for both CDC methods.
    Space,
    /// Leave the text untouched. Used for CNN.
    Raw,
}

/// Apply `policy` to `text`.
pub fn normalize(text: &str, policy: Whitespace) -> String {
    match policy {
        Whitespace::Delete => CONTROL_WS.replace_all(text, "").trim().to_string(),
        Whitespace::Space => CONTROL_WS.replace_all(text, " ").trim().to_string(),
        Whitespace::Raw => text.to_string(),
    }
}
