//! Canonicalization of table text
//!
//! Every header, key and value is passed through [`sanitize`] exactly once,
//! when a table is read. Everything downstream compares canonical strings
//! directly, so two raw values that canonicalize to the same string are the
//! same key.

/// Characters that cannot appear in a document path segment
const ILLEGAL_PATH_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Key used for rows whose key field is empty after canonicalization
pub const UNTITLED_KEY: &str = "Untitled";

/// Canonicalize a raw cell, header or table name
///
/// 1. Trim surrounding whitespace
/// 2. Strip trailing characters that are neither word characters nor
///    whitespace, with any whitespace between them
///    (`"Library."` -> `"Library"`, `"Library . ."` -> `"Library"`)
/// 3. Replace characters illegal in a path segment with `_`
pub fn sanitize(raw: &str) -> String {
    let mut stripped = raw.trim();
    // Punctuation separated by spaces (`"Library . ."`) takes several rounds
    loop {
        let next = stripped
            .trim_end_matches(|c: char| !is_word_char(c) && !c.is_whitespace())
            .trim_end();
        if next.len() == stripped.len() {
            break;
        }
        stripped = next;
    }

    stripped
        .chars()
        .map(|c| if ILLEGAL_PATH_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Canonicalize a key field, substituting [`UNTITLED_KEY`] for empty keys
pub fn sanitize_key(raw: &str) -> String {
    let key = sanitize(raw);
    if key.is_empty() {
        UNTITLED_KEY.to_string()
    } else {
        key
    }
}

/// Canonicalize a category path, keeping `/` as the subpath separator
///
/// Each segment is sanitized on its own; empty segments are dropped.
pub fn sanitize_category(raw: &str) -> String {
    raw.split('/')
        .map(sanitize)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
