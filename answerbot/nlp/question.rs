//! Punctuation fix-up applied to raw question text before parsing.

/// Normalizes a raw question: trims surrounding whitespace, drops trailing
/// periods, guarantees exactly one closing `?` is added, and upper-cases the
/// first character.
///
/// Empty or whitespace-only input yields `"?"`.
#[must_use]
pub fn normalize_question(text: &str) -> String {
    let trimmed = text.trim();
    let body = trimmed.strip_suffix('?').unwrap_or(trimmed);
    let body = body.trim_end_matches('.');

    let mut chars = body.chars();
    let mut normalized = String::with_capacity(body.len() + 1);
    if let Some(first) = chars.next() {
        normalized.extend(first.to_uppercase());
        normalized.push_str(chars.as_str());
    }
    normalized.push('?');
    normalized
}
