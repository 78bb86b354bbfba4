//! Morphological variants used for matching
//!
//! Table authors write "Librarian's Desk" in one place and "Librarians Desk"
//! in another. [`expand`] returns every spelling that is treated as equal to
//! the input when comparing against catalog keys.

use std::collections::BTreeSet;

/// Expand a string into its variant set
///
/// The result always contains the input. Rules, all unioned:
/// - an apostrophe anywhere: apostrophes removed, and apostrophes as spaces
/// - trailing `'s`: stem, stem + `s`, stem + `'`, stem + `s'`
/// - else trailing `s'`: stem, stem + `s`, stem + `'s`, stem + `'`
/// - else trailing `s`: `s'`, `s's`, and the stem with `'` / `'s` appended
pub fn expand(s: &str) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    variants.insert(s.to_string());

    if s.contains('\'') {
        variants.insert(s.replace('\'', ""));
        variants.insert(s.replace('\'', " "));
    }

    if let Some(stem) = s.strip_suffix("'s") {
        insert_stem_forms(&mut variants, stem, &["", "s", "'", "s'"]);
    } else if let Some(stem) = s.strip_suffix("s'") {
        insert_stem_forms(&mut variants, stem, &["", "s", "'s", "'"]);
    } else if let Some(stem) = s.strip_suffix('s') {
        variants.insert(format!("{}'", s));
        variants.insert(format!("{}'s", s));
        insert_stem_forms(&mut variants, stem, &["'", "'s"]);
    }

    variants
}

fn insert_stem_forms(variants: &mut BTreeSet<String>, stem: &str, suffixes: &[&str]) {
    if stem.is_empty() {
        return;
    }
    for suffix in suffixes {
        variants.insert(format!("{}{}", stem, suffix));
    }
}
