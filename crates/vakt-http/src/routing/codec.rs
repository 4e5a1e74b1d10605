//! Reversible text codec for scheme delimiters
//!
//! Route compilation chokes on a bare `://` inside a pattern or a logged
//! message that gets re-interpreted as a pattern. Every component that
//! feeds untrusted text into pattern machinery first rewrites reserved
//! scheme delimiters to a marker that carries no matcher syntax, and
//! rewrites them back at the human-facing boundary.
//!
//! The mapping is a static substring table, namespaced per scheme so the
//! reverse direction is unambiguous: `https://` becomes `https__//`,
//! `ws://` becomes `ws__//`, and so on. `decode` only rewrites exact
//! `<scheme>__//` sequences for schemes in the table, so surrounding text
//! is never touched.

use std::borrow::Cow;

/// Schemes whose delimiter is neutralized. Longer names first so a scan
/// never matches a prefix of another entry.
const SCHEMES: &[&str] = &["https", "http", "wss", "ws", "ftp"];

const DELIMITER: &str = "://";
const MARKER: &str = "__//";

/// Replace every reserved `<scheme>://` with `<scheme>__//`.
///
/// Pure and total; text without a delimiter is returned borrowed.
/// Already-encoded text contains no table delimiter, so a second pass is
/// a no-op.
pub fn encode(text: &str) -> Cow<'_, str> {
    if !text.contains(DELIMITER) {
        return Cow::Borrowed(text);
    }

    let mut out = text.to_string();
    for scheme in SCHEMES {
        let from = format!("{scheme}{DELIMITER}");
        if out.contains(&from) {
            out = out.replace(&from, &format!("{scheme}{MARKER}"));
        }
    }
    Cow::Owned(out)
}

/// Exact inverse of [`encode`]: rewrite every `<scheme>__//` back to
/// `<scheme>://` for schemes in the table.
pub fn decode(text: &str) -> Cow<'_, str> {
    if !text.contains(MARKER) {
        return Cow::Borrowed(text);
    }

    let mut out = text.to_string();
    for scheme in SCHEMES {
        let from = format!("{scheme}{MARKER}");
        if out.contains(&from) {
            out = out.replace(&from, &format!("{scheme}{DELIMITER}"));
        }
    }
    Cow::Owned(out)
}

/// [`encode`] lifted to JSON values: string values are encoded, anything
/// else passes through unchanged.
pub fn encode_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(encode(s).into_owned()),
        other => other.clone(),
    }
}

/// [`decode`] lifted to JSON values; non-strings pass through unchanged.
pub fn decode_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(decode(s).into_owned()),
        other => other.clone(),
    }
}
