use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{BlobError, BlobHandle, BlobStore};

/// Live blob-store client: raw object bytes go up under a caller-chosen
/// path, and the store hands back public URLs on request.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct UploadAck {
    path: String,
}

#[derive(Deserialize)]
struct ResolveAck {
    url: String,
}

impl HttpBlobStore {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<BlobHandle, BlobError> {
        let res = self
            .client
            .post(format!("{}/objects/{}", self.base_url, path))
            .body(bytes)
            .send()
            .await
            .map_err(|err| BlobError::Request(err.to_string()))?;

        if !res.status().is_success() {
            return Err(BlobError::Request(format!(
                "upload returned {}",
                res.status()
            )));
        }

        let ack: UploadAck = res
            .json()
            .await
            .map_err(|err| BlobError::Decode(err.to_string()))?;
        Ok(BlobHandle { path: ack.path })
    }

    async fn resolve(&self, handle: &BlobHandle) -> Result<String, BlobError> {
        let res = self
            .client
            .get(format!(
                "{}/resolve?path={}",
                self.base_url,
                urlencoding::encode(&handle.path)
            ))
            .send()
            .await
            .map_err(|err| BlobError::Request(err.to_string()))?;

        if !res.status().is_success() {
            return Err(BlobError::Request(format!(
                "resolve returned {}",
                res.status()
            )));
        }

        let ack: ResolveAck = res
            .json()
            .await
            .map_err(|err| BlobError::Decode(err.to_string()))?;
        Ok(ack.url)
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<(), BlobError> {
        let res = self
            .client
            .delete(format!("{}/objects/{}", self.base_url, handle.path))
            .send()
            .await
            .map_err(|err| BlobError::Request(err.to_string()))?;

        if !res.status().is_success() {
            return Err(BlobError::Request(format!(
                "delete returned {}",
                res.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn upload_sends_raw_bytes_and_returns_the_handle() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/objects/issues/1/a.jpg")
                    .body("abc");
                then.status(200)
                    .json_body(json!({"path": "issues/1/a.jpg"}));
            })
            .await;

        let store = HttpBlobStore::new(Client::new(), server.base_url());
        let handle = store
            .upload("issues/1/a.jpg", b"abc".to_vec())
            .await
            .unwrap();

        assert_eq!(handle.path, "issues/1/a.jpg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn resolve_url_encodes_the_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/resolve")
                    .query_param("path", "issues/1/사진.jpg");
                then.status(200)
                    .json_body(json!({"url": "https://files.example/1.jpg"}));
            })
            .await;

        let store = HttpBlobStore::new(Client::new(), server.base_url());
        let url = store
            .resolve(&BlobHandle {
                path: "issues/1/사진.jpg".into(),
            })
            .await
            .unwrap();

        assert_eq!(url, "https://files.example/1.jpg");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_upload_surfaces_the_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path_contains("/objects/");
                then.status(507);
            })
            .await;

        let store = HttpBlobStore::new(Client::new(), server.base_url());
        let err = store.upload("a", vec![]).await.err().unwrap();
        assert!(matches!(err, BlobError::Request(_)));
    }
}
