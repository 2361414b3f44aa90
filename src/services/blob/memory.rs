use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{BlobError, BlobHandle, BlobStore};

/// In-process stand-in for the blob store. Upload order, injected failures,
/// and deletions are all observable so tests can pin down the submission
/// pipeline's exact behavior.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: DashMap<String, Vec<u8>>,
    pub uploaded_paths: Mutex<Vec<String>>,
    pub deleted_paths: Mutex<Vec<String>>,
    /// Fail the nth upload (1-based) and every one after it.
    pub fail_from_upload: Mutex<Option<usize>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads_from(&self, nth: usize) {
        *self.fail_from_upload.lock().unwrap() = Some(nth);
    }

    pub fn upload_count(&self) -> usize {
        self.uploaded_paths.lock().unwrap().len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.contains_key(path)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<BlobHandle, BlobError> {
        let attempt = {
            let mut uploaded = self.uploaded_paths.lock().unwrap();
            uploaded.push(path.to_string());
            uploaded.len()
        };

        if let Some(from) = *self.fail_from_upload.lock().unwrap() {
            if attempt >= from {
                return Err(BlobError::Request("upload refused".into()));
            }
        }

        self.objects.insert(path.to_string(), bytes);
        Ok(BlobHandle {
            path: path.to_string(),
        })
    }

    async fn resolve(&self, handle: &BlobHandle) -> Result<String, BlobError> {
        if !self.objects.contains_key(&handle.path) {
            return Err(BlobError::Request(format!(
                "no object at {}",
                handle.path
            )));
        }
        Ok(format!("memory://{}", handle.path))
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<(), BlobError> {
        self.objects.remove(&handle.path);
        self.deleted_paths.lock().unwrap().push(handle.path.clone());
        Ok(())
    }
}
