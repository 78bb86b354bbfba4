//! Link section merging
//!
//! Applies a document's final link set to its stored text. Existing lines
//! are never rewritten: a missing `## Links` section is appended whole, an
//! existing one only gains the citations not already present anywhere in
//! the document. Citations are emitted in sorted order, so merging the same
//! set twice leaves the document byte-identical.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::reference::{DocumentId, ReferenceId};
use crate::storage::{DocumentStore, StoreError};

/// Heading of the link section
pub const LINK_SECTION_HEADING: &str = "## Links";

/// What a merge did to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new link section was appended
    SectionAdded { links: usize },
    /// Citations were appended to the existing section
    Appended { links: usize },
    /// Every citation was already present
    Unchanged,
}

/// Errors from merging into a store
#[derive(Error, Debug)]
pub enum MergeError {
    /// The document does not exist in the store
    #[error("Merge target '{0}' does not exist")]
    MissingDocument(DocumentId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Text to append to `content` so it carries every link in `links`
///
/// Returns `None` when nothing needs to change.
pub fn pending_addition(content: &str, links: &BTreeSet<ReferenceId>) -> Option<(String, MergeOutcome)> {
    let has_section = body(content)
        .lines()
        .any(|line| line.trim_end() == LINK_SECTION_HEADING);

    // Section separation depends on whether the content already ends a line
    let lead = if content.is_empty() || content.ends_with('\n') {
        ""
    } else {
        "\n"
    };

    if !has_section {
        let mut addition = format!("{}\n{}\n", lead, LINK_SECTION_HEADING);
        for link in links {
            addition.push_str(&citation_line(link));
        }
        return Some((addition, MergeOutcome::SectionAdded { links: links.len() }));
    }

    let missing: Vec<&ReferenceId> = links
        .iter()
        .filter(|link| !content.contains(&link.citation()))
        .collect();

    if missing.is_empty() {
        return None;
    }

    let mut addition = lead.to_string();
    for link in &missing {
        addition.push_str(&citation_line(link));
    }
    Some((addition, MergeOutcome::Appended { links: missing.len() }))
}

/// Merge `links` into `content`, returning the new text
pub fn merge_content(content: &str, links: &BTreeSet<ReferenceId>) -> String {
    match pending_addition(content, links) {
        Some((addition, _)) => format!("{}{}", content, addition),
        None => content.to_string(),
    }
}

/// Merge `links` into a stored document
pub fn merge(
    store: &dyn DocumentStore,
    doc: &DocumentId,
    links: &BTreeSet<ReferenceId>,
) -> Result<MergeOutcome, MergeError> {
    let content = store
        .read(doc)?
        .ok_or_else(|| MergeError::MissingDocument(doc.clone()))?;

    match pending_addition(&content, links) {
        Some((addition, outcome)) => {
            store.append(doc, &addition)?;
            debug!("Merged links into {}: {:?}", doc, outcome);
            Ok(outcome)
        }
        None => Ok(MergeOutcome::Unchanged),
    }
}

/// Content after a leading `---` front matter block
///
/// Field values inside the block may contain anything, including a line
/// that reads like the link heading.
fn body(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---\n") else {
        return content;
    };
    let mut offset = content.len() - rest.len();
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" {
            return &content[offset..];
        }
    }
    content
}

fn citation_line(link: &ReferenceId) -> String {
    format!("- {}\n", link.citation())
}
