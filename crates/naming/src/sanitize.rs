//! Identifier sanitization
//!
//! Display names coming from a remote API can contain anything. Block
//! identifiers may only use ASCII letters, digits, `_` and `-`, and must not
//! start with a digit.

/// Turn arbitrary display text into a valid block identifier.
///
/// Invalid characters become `_`, runs of `_` collapse into one, leading
/// and trailing `_` are dropped, and a `_` is prepended when the result is
/// empty or starts with a digit or `-`.
pub fn sanitize(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());

    for c in candidate.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' };
        if c == '_' && (out.is_empty() || out.ends_with('_')) {
            continue;
        }
        out.push(c);
    }

    while out.ends_with('_') {
        out.pop();
    }

    match out.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => out,
        _ => format!("_{out}"),
    }
}

/// Check whether `name` is already a valid block identifier
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
