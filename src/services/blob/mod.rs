use async_trait::async_trait;
use thiserror::Error;

mod http;
mod memory;

pub use http::HttpBlobStore;
pub use memory::InMemoryBlobStore;

/// Opaque reference to an uploaded object, valid only against the store that
/// issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub path: String,
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob request failed: {0}")]
    Request(String),
    #[error("blob store returned malformed data: {0}")]
    Decode(String),
}

/// The external blob-storage abstraction used for report photos.
///
/// `delete` exists solely so a failed multi-upload submission can take back
/// the objects it already wrote; nothing else removes blobs in this scope.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<BlobHandle, BlobError>;
    async fn resolve(&self, handle: &BlobHandle) -> Result<String, BlobError>;
    async fn delete(&self, handle: &BlobHandle) -> Result<(), BlobError>;
}
