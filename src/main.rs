use std::sync::Arc;

use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use maeul::config::Config;
use maeul::feed::ListingFeed;
use maeul::models::issue::{Coordinates, IssueCategory, NewIssue};
use maeul::routes::Route;
use maeul::services::blob::{HttpBlobStore, InMemoryBlobStore};
use maeul::services::collection::{HttpCollection, InMemoryCollection};
use maeul::services::geocode::{HttpGeocoder, StaticGeocoder};
use maeul::session::SessionStore;
use maeul::state::AppState;
use maeul::views::map::{MapView, MapViewport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env());
    let session = Arc::new(SessionStore::new());

    let state = match live_state(&config, session.clone())? {
        Some(state) => {
            info!("using configured live service endpoints");
            state
        }
        None => {
            info!("no endpoints configured, running against in-memory services");
            demo_state(config.clone(), session.clone())
        }
    };

    // The sign-up action stores a sentinel token; its presence is the whole
    // authentication contract in this scope.
    session.sign_in(Uuid::new_v4().to_string());
    info!(route = %Route::Map, "entering the map view");

    let viewport = MapViewport::default();
    info!(
        lat = viewport.center.lat,
        lng = viewport.center.lng,
        zoom = viewport.zoom,
        "handing viewport to the map widget"
    );

    let feed = ListingFeed::activate(state.collection.clone()).await;
    let mut view = MapView::new();
    view.apply_snapshot(feed.snapshot());
    info!(markers = view.markers().len(), "map ready");

    if !config.has_live_endpoints() {
        submit_demo_report(&state, &mut view).await;
    }

    let mut rx = feed.watch();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                view.apply_snapshot(rx.borrow().clone());
                info!(markers = view.markers().len(), "map updated");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    feed.deactivate();
    session.sign_out();
    Ok(())
}

/// Builds the live stack when (and only when) every endpoint is configured.
fn live_state(config: &Arc<Config>, session: Arc<SessionStore>) -> anyhow::Result<Option<AppState>> {
    let (Some(collection_url), Some(blob_url), Some(geocode_url)) = (
        config.collection_url.clone(),
        config.blob_url.clone(),
        config.geocode_url.clone(),
    ) else {
        return Ok(None);
    };

    let client = Client::builder().timeout(config.request_timeout).build()?;

    Ok(Some(AppState {
        collection: Arc::new(HttpCollection::new(
            client.clone(),
            collection_url,
            config.feed_poll_interval,
        )),
        blobs: Arc::new(HttpBlobStore::new(client.clone(), blob_url)),
        geocoder: Arc::new(HttpGeocoder::new(client, geocode_url)),
        session,
        config: config.clone(),
    }))
}

/// Offline stack: in-memory services seeded with the demo neighborhood.
fn demo_state(config: Arc<Config>, session: Arc<SessionStore>) -> AppState {
    AppState {
        collection: Arc::new(InMemoryCollection::seeded(demo_issues())),
        blobs: Arc::new(InMemoryBlobStore::new()),
        geocoder: Arc::new(StaticGeocoder::new().with_entry(
            "세종대로 110",
            "서울 중구 세종대로 110",
            37.5665,
            126.978,
        )),
        session,
        config,
    }
}

fn demo_issues() -> Vec<NewIssue> {
    vec![
        NewIssue {
            location: Coordinates {
                lat: 37.5665,
                lng: 126.978,
            },
            category: IssueCategory::Noise,
            address: "서울 중구 세종대로 110".into(),
            address_detail: None,
            description: Some("층간소음이 심합니다".into()),
            photos: vec![],
        },
        NewIssue {
            location: Coordinates {
                lat: 37.57,
                lng: 126.975,
            },
            category: IssueCategory::Pest,
            address: "서울 종로구 사직로 161".into(),
            address_detail: Some("지하 1층".into()),
            description: Some("바퀴벌레가 자주 나옵니다".into()),
            photos: vec![],
        },
        NewIssue {
            location: Coordinates {
                lat: 37.56,
                lng: 126.982,
            },
            category: IssueCategory::WaterLeak,
            address: "서울 중구 을지로 30".into(),
            address_detail: None,
            description: None,
            photos: vec![],
        },
    ]
}

/// Walks one report through the submission surface so the offline run shows
/// the full write path end to end.
async fn submit_demo_report(state: &AppState, view: &mut MapView) {
    view.composer.open();
    if let Some(draft) = view.composer.draft_mut() {
        draft.category = Some(IssueCategory::WaterLeak);
        draft.description = "싱크대 아래에서 물이 샙니다".into();
        if let Err(err) = draft
            .resolve_address(state.geocoder.as_ref(), "세종대로 110")
            .await
        {
            warn!(?err, "demo address did not resolve");
            return;
        }
    }

    match view.submit_draft(state).await {
        Ok(id) => info!(%id, "demo report submitted"),
        Err(notice) => warn!(message = %notice.message, "demo report was not saved"),
    }
}
