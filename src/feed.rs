use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::models::issue::Issue;
use crate::services::collection::{CollectionStore, Snapshot};

/// Read path of the map page: mirrors the live collection into a locally
/// cached sequence. Each upstream snapshot replaces the cache wholesale, in
/// the order the upstream delivers; nothing is merged or reordered locally.
pub struct ListingFeed;

impl ListingFeed {
    /// Establishes the subscription and starts the delivery task. If the
    /// subscription cannot be established the feed stays empty for the life
    /// of the handle; the caller still gets a handle, just one that never
    /// updates.
    pub async fn activate(store: Arc<dyn CollectionStore>) -> FeedHandle {
        let (tx, rx) = watch::channel(Vec::new());

        let (task, idle_tx) = match store.subscribe().await {
            Ok(mut stream) => {
                let task = tokio::spawn(async move {
                    while let Some(snapshot) = stream.next().await {
                        debug!(records = snapshot.len(), "feed snapshot received");
                        tx.send_replace(snapshot);
                    }
                    debug!("feed subscription stream ended");
                });
                (Some(task), None)
            }
            Err(err) => {
                warn!(?err, "failed to establish listing subscription");
                (None, Some(tx))
            }
        };

        FeedHandle {
            snapshots: rx,
            task,
            _idle_tx: idle_tx,
        }
    }
}

/// Owner of one active subscription. Dropping the handle (or calling
/// `deactivate`) aborts the delivery task; no snapshot lands after that.
pub struct FeedHandle {
    snapshots: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
    // Keeps watchers of a never-established feed alive instead of erroring.
    _idle_tx: Option<watch::Sender<Snapshot>>,
}

impl FeedHandle {
    /// The currently cached sequence, in upstream order.
    pub fn snapshot(&self) -> Vec<Issue> {
        self.snapshots.borrow().clone()
    }

    /// Change-notified view of the cache for render loops.
    pub fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Releases the subscription. Equivalent to dropping the handle, spelled
    /// out for call sites that tear down explicitly.
    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.release();
    }
}
