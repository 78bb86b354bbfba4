//! Cell resolution
//!
//! Decides which catalog entries a single (header, value) pair refers to.
//! A header match means "this whole field denotes membership in X"; a value
//! match means "this field names X". Both contribute the same reference.
//!
//! Narrative fields (ledger transcripts and the like) additionally accept a
//! reference whose key occurs anywhere in the value, ignoring case. That
//! mode is deliberately loose: a short key such as `Ink` also matches inside
//! `Thinking`. It is only enabled for fields configured as narrative.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::reference::ReferenceId;
use crate::table::{Field, MatchMode};
use crate::variants::expand;

/// Resolve one field of the record owned by `owner`
///
/// Returns an empty set when nothing matches. Never mutates the catalog.
pub fn resolve(
    header: &str,
    value: &str,
    mode: MatchMode,
    owner: &ReferenceId,
    catalog: &Catalog,
) -> BTreeSet<ReferenceId> {
    let mut matches = BTreeSet::new();

    // Empty cells carry no reference; the owner's own key is not a link
    if value.is_empty() || value == owner.key() {
        return matches;
    }

    let mut candidates = expand(value);
    if !header.is_empty() {
        candidates.extend(expand(header));
    }

    for candidate in &candidates {
        matches.extend(catalog.with_key(candidate).iter().cloned());
    }

    if mode == MatchMode::Narrative {
        let haystack = value.to_lowercase();
        for reference in catalog.iter() {
            let key = reference.key();
            if !key.is_empty() && haystack.contains(&key.to_lowercase()) {
                matches.insert(reference.clone());
            }
        }
    }

    matches
}

/// Resolve a parsed [`Field`]
pub fn resolve_field(field: &Field, owner: &ReferenceId, catalog: &Catalog) -> BTreeSet<ReferenceId> {
    resolve(&field.header, &field.value, field.mode, owner, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;

    fn catalog(entries: &[(&str, &str)]) -> Catalog {
        let mut builder = CatalogBuilder::new();
        for (category, key) in entries {
            builder.register(category, key);
        }
        builder.finish()
    }

    fn names(refs: &BTreeSet<ReferenceId>) -> Vec<&str> {
        refs.iter().map(|r| r.as_str()).collect()
    }

    #[test]
    fn test_possessive_value_matches() {
        let catalog = catalog(&[("Rooms", "Library")]);
        let owner = ReferenceId::new("Books", "Atlas");
        let refs = resolve("Location", "Library's", MatchMode::Exact, &owner, &catalog);
        assert_eq!(names(&refs), vec!["Rooms/Library"]);
    }

    #[test]
    fn test_header_matches() {
        let catalog = catalog(&[("Principle", "Lantern")]);
        let owner = ReferenceId::new("Skills", "Illumination");
        let refs = resolve("Lantern", "2", MatchMode::Exact, &owner, &catalog);
        assert_eq!(names(&refs), vec!["Principle/Lantern"]);
    }

    #[test]
    fn test_header_and_value_collapse() {
        let catalog = catalog(&[("Rooms", "Library")]);
        let owner = ReferenceId::new("Books", "Atlas");
        let refs = resolve("Library", "Library", MatchMode::Exact, &owner, &catalog);
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_self_reference_guard() {
        let catalog = catalog(&[("Furniture", "Desk"), ("Rooms", "Desk")]);
        let owner = ReferenceId::new("Rooms", "Desk");
        let refs = resolve("Name", "Desk", MatchMode::Exact, &owner, &catalog);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_no_partial_match_in_exact_mode() {
        let catalog = catalog(&[("Rooms", "Library")]);
        let owner = ReferenceId::new("Books", "Atlas");
        let refs = resolve("Location", "Library Annex", MatchMode::Exact, &owner, &catalog);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_every_category_with_key_matches() {
        let catalog = catalog(&[("Rooms", "Library"), ("Skills", "Library")]);
        let owner = ReferenceId::new("Books", "Atlas");
        let refs = resolve("Location", "Library", MatchMode::Exact, &owner, &catalog);
        assert_eq!(names(&refs), vec!["Rooms/Library", "Skills/Library"]);
    }

    #[test]
    fn test_narrative_substring_case_insensitive() {
        let catalog = catalog(&[("Rooms", "Library"), ("Reagents", "Ink")]);
        let owner = ReferenceId::new("History", "1901");
        let refs = resolve(
            "Transcript",
            "the old LIBRARY was thinking of rain",
            MatchMode::Narrative,
            &owner,
            &catalog,
        );
        // "Ink" inside "thinking" is an accepted false positive of this mode
        assert_eq!(names(&refs), vec!["Reagents/Ink", "Rooms/Library"]);
    }

    #[test]
    fn test_narrative_off_for_exact_fields() {
        let catalog = catalog(&[("Rooms", "Library")]);
        let owner = ReferenceId::new("History", "1901");
        let refs = resolve("Event", "the library", MatchMode::Exact, &owner, &catalog);
        assert!(refs.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let catalog = catalog(&[("Rooms", "Library")]);
        let owner = ReferenceId::new("Books", "Atlas");
        assert!(resolve("", "", MatchMode::Narrative, &owner, &catalog).is_empty());
        // A matching header over an empty cell does not link
        assert!(resolve("Library", "", MatchMode::Exact, &owner, &catalog).is_empty());
    }
}
