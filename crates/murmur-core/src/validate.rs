//! Normalization for caller-supplied names and scope labels.

/// Lowercase, collapse whitespace runs to one hyphen, keep `[a-z0-9_-]`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        let c = c.to_ascii_lowercase();
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
            continue;
        }
        if pending_hyphen && !out.is_empty() {
            out.push('-');
        }
        pending_hyphen = false;
        out.push(c);
    }
    out
}

/// Drop a trailing `@...` component; callers never choose the scope.
pub fn strip_scope(raw: &str) -> &str {
    match raw.find('@') {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

/// Override text as it becomes an identity suffix.
pub fn override_suffix(raw: &str) -> String {
    sanitize_name(strip_scope(raw))
}
