use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CollectionError, CollectionStore, Snapshot, SnapshotStream};
use crate::models::issue::{Issue, NewIssue};

const MAX_POLL_BACKOFF: Duration = Duration::from_secs(30);

/// Live document-store client. The upstream live-query mechanism is opaque,
/// so snapshot delivery is rendered as periodic re-fetch with change
/// suppression: a snapshot is only emitted when the collection differs from
/// the last one delivered.
pub struct HttpCollection {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct InsertAck {
    id: String,
}

impl HttpCollection {
    pub fn new(client: Client, base_url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval,
        }
    }

    async fn fetch_all(&self) -> Result<Snapshot, CollectionError> {
        let res = self
            .client
            .get(format!("{}/issues", self.base_url))
            .send()
            .await
            .map_err(|err| CollectionError::Request(err.to_string()))?;

        if !res.status().is_success() {
            return Err(CollectionError::Request(format!(
                "listing returned {}",
                res.status()
            )));
        }

        res.json::<Snapshot>()
            .await
            .map_err(|err| CollectionError::Decode(err.to_string()))
    }
}

#[async_trait]
impl CollectionStore for HttpCollection {
    async fn subscribe(&self) -> Result<SnapshotStream, CollectionError> {
        // The initial fetch doubles as the establishment check: if it fails,
        // no subscription exists and the caller's cache stays empty.
        let initial = self.fetch_all().await?;

        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let poll_interval = self.poll_interval;

        let s = stream! {
            let mut last = initial.clone();
            yield initial;

            let mut delay = poll_interval;
            loop {
                tokio::time::sleep(delay).await;

                let res = client
                    .get(format!("{base_url}/issues"))
                    .send()
                    .await
                    .and_then(|res| res.error_for_status());

                let snapshot = match res {
                    Ok(res) => match res.json::<Snapshot>().await {
                        Ok(snapshot) => snapshot,
                        Err(err) => {
                            warn!(?err, "discarding malformed collection snapshot");
                            delay = (delay * 2).min(MAX_POLL_BACKOFF);
                            continue;
                        }
                    },
                    Err(err) => {
                        warn!(?err, "collection poll failed, backing off");
                        delay = (delay * 2).min(MAX_POLL_BACKOFF);
                        continue;
                    }
                };

                delay = poll_interval;
                if snapshot != last {
                    last = snapshot.clone();
                    yield snapshot;
                } else {
                    debug!("collection unchanged, suppressing snapshot");
                }
            }
        };

        Ok(Box::pin(s))
    }

    async fn insert(&self, issue: NewIssue) -> Result<String, CollectionError> {
        let res = self
            .client
            .post(format!("{}/issues", self.base_url))
            .json(&issue)
            .send()
            .await
            .map_err(|err| CollectionError::Request(err.to_string()))?;

        if !res.status().is_success() {
            return Err(CollectionError::Request(format!(
                "insert returned {}",
                res.status()
            )));
        }

        let ack: InsertAck = res
            .json()
            .await
            .map_err(|err| CollectionError::Decode(err.to_string()))?;
        Ok(ack.id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Issue>, CollectionError> {
        let res = self
            .client
            .get(format!("{}/issues/{}", self.base_url, id))
            .send()
            .await
            .map_err(|err| CollectionError::Request(err.to_string()))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(CollectionError::Request(format!(
                "fetch returned {}",
                res.status()
            )));
        }

        res.json::<Issue>()
            .await
            .map(Some)
            .map_err(|err| CollectionError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tokio_stream::StreamExt;

    fn collection(server: &MockServer) -> HttpCollection {
        HttpCollection::new(Client::new(), server.base_url(), Duration::from_millis(10))
    }

    fn issue_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "lat": 37.5665,
            "lng": 126.978,
            "category": "noise",
            "address": "서울 중구",
            "address_detail": null,
            "description": null,
            "photos": [],
            "created_at": "2025-03-01T09:30:00Z",
        })
    }

    #[tokio::test]
    async fn subscribe_delivers_the_initial_snapshot() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/issues");
                then.status(200).json_body(json!([issue_json("a")]));
            })
            .await;

        let mut stream = collection(&server).subscribe().await.unwrap();
        let snapshot = stream.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a");
    }

    #[tokio::test]
    async fn subscribe_fails_to_establish_on_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/issues");
                then.status(500);
            })
            .await;

        let err = collection(&server).subscribe().await.err().unwrap();
        assert!(matches!(err, CollectionError::Request(_)));
    }

    #[tokio::test]
    async fn insert_posts_the_record_and_returns_the_assigned_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/issues")
                    .json_body_partial(r#"{"category": "pest", "lat": 37.57}"#);
                then.status(200).json_body(json!({"id": "assigned-1"}));
            })
            .await;

        let store = collection(&server);
        let id = store
            .insert(NewIssue {
                location: crate::models::issue::Coordinates {
                    lat: 37.57,
                    lng: 126.975,
                },
                category: crate::models::issue::IssueCategory::Pest,
                address: "서울 어딘가".into(),
                address_detail: None,
                description: None,
                photos: vec![],
            })
            .await
            .unwrap();

        assert_eq!(id, "assigned-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_maps_not_found_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/issues/missing");
                then.status(404);
            })
            .await;

        let found = collection(&server).fetch("missing").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn fetch_decodes_a_single_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/issues/a");
                then.status(200).json_body(issue_json("a"));
            })
            .await;

        let found = collection(&server).fetch("a").await.unwrap().unwrap();
        assert_eq!(found.id, "a");
    }
}
