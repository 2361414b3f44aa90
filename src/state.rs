use std::sync::Arc;

use crate::config::Config;
use crate::services::blob::BlobStore;
use crate::services::collection::CollectionStore;
use crate::services::geocode::Geocoder;
use crate::session::SessionStore;

/// Everything the views are handed: the three external-service seams, the
/// session flag holder, and configuration. Cloning is cheap; all members are
/// shared.
#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<dyn CollectionStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub session: Arc<SessionStore>,
    pub config: Arc<Config>,
}
