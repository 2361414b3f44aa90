use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use super::{CollectionError, CollectionStore, Snapshot, SnapshotStream};
use crate::models::issue::{Issue, NewIssue};

/// In-process stand-in for the document store. Keeps records in insertion
/// order and pushes a fresh snapshot to every subscriber after each insert.
/// Used by tests and by the demo wiring when no endpoint is configured.
pub struct InMemoryCollection {
    issues: Mutex<Vec<Issue>>,
    snapshots: watch::Sender<Snapshot>,
    pub should_fail: Mutex<bool>,
    pub insert_calls: Mutex<usize>,
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            issues: Mutex::new(Vec::new()),
            snapshots,
            should_fail: Mutex::new(false),
            insert_calls: Mutex::new(0),
        }
    }
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, assigning ids and timestamps as the real
    /// service would on insert.
    pub fn seeded(issues: Vec<NewIssue>) -> Self {
        let store = Self::new();
        {
            let mut held = store.issues.lock().unwrap();
            for issue in issues {
                held.push(assign(issue));
            }
            store.snapshots.send_replace(held.clone());
        }
        store
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock().unwrap() = fail;
    }

    fn failing(&self) -> bool {
        *self.should_fail.lock().unwrap()
    }
}

fn assign(issue: NewIssue) -> Issue {
    Issue {
        id: Uuid::new_v4().to_string(),
        location: issue.location,
        category: issue.category,
        address: issue.address,
        address_detail: issue.address_detail,
        description: issue.description,
        photos: issue.photos,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollection {
    async fn subscribe(&self) -> Result<SnapshotStream, CollectionError> {
        if self.failing() {
            return Err(CollectionError::Request("subscription refused".into()));
        }
        Ok(Box::pin(WatchStream::new(self.snapshots.subscribe())))
    }

    async fn insert(&self, issue: NewIssue) -> Result<String, CollectionError> {
        *self.insert_calls.lock().unwrap() += 1;
        if self.failing() {
            return Err(CollectionError::Request("insert refused".into()));
        }

        let stored = assign(issue);
        let id = stored.id.clone();
        let mut held = self.issues.lock().unwrap();
        held.push(stored);
        self.snapshots.send_replace(held.clone());
        Ok(id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Issue>, CollectionError> {
        if self.failing() {
            return Err(CollectionError::Request("fetch refused".into()));
        }
        let held = self.issues.lock().unwrap();
        Ok(held.iter().find(|issue| issue.id == id).cloned())
    }
}
