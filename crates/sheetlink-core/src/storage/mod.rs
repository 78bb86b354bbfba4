//! Document storage
//!
//! The engine treats persisted documents as an opaque key-value text store
//! addressed by [`DocumentId`]. Only rendering and the link merger write to
//! it.
//!
//! ## Implementations
//!
//! - [`FsDocumentStore`]: one file per document under an output root
//! - [`MemoryStore`]: in-process map, for tests and embedding

pub mod error;
pub mod memory;
pub mod persistence;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use persistence::{clean_output, FsDocumentStore};

use crate::reference::DocumentId;

/// Text store for rendered documents
///
/// Implementations must be safe to share across worker threads. Callers
/// guarantee at most one writer per document at a time.
pub trait DocumentStore: Send + Sync {
    /// Check whether a document exists
    fn exists(&self, doc: &DocumentId) -> bool;

    /// Read a document in full. `None` if it does not exist.
    fn read(&self, doc: &DocumentId) -> StoreResult<Option<String>>;

    /// Replace a document's content, creating it if needed
    fn write(&self, doc: &DocumentId, content: &str) -> StoreResult<()>;

    /// Append to an existing document
    fn append(&self, doc: &DocumentId, content: &str) -> StoreResult<()>;
}
