use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio_stream::Stream;

use crate::models::issue::{Issue, NewIssue};

mod http;
mod memory;

pub use http::HttpCollection;
pub use memory::InMemoryCollection;

/// A full point-in-time copy of the collection, in the order the upstream
/// service keeps it (insertion/time order).
pub type Snapshot = Vec<Issue>;

pub type SnapshotStream = Pin<Box<dyn Stream<Item = Snapshot> + Send>>;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection request failed: {0}")]
    Request(String),
    #[error("collection returned malformed data: {0}")]
    Decode(String),
}

/// The external document-store abstraction. The store owns every record;
/// clients only ever hold read-only copies delivered through `subscribe` or
/// `fetch`. No update or delete exists on this seam.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Establishes a live subscription over the whole collection. Each item
    /// is a complete snapshot that supersedes the previous one.
    async fn subscribe(&self) -> Result<SnapshotStream, CollectionError>;

    /// Appends one record. The store assigns the identifier and creation
    /// timestamp and returns the new id.
    async fn insert(&self, issue: NewIssue) -> Result<String, CollectionError>;

    /// Looks up a single record by its assigned identifier.
    async fn fetch(&self, id: &str) -> Result<Option<Issue>, CollectionError>;
}
