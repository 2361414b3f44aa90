use std::env;
use std::time::Duration;

/// Runtime configuration for the process shell. Endpoints are optional:
/// when any of the three is absent the shell falls back to the in-memory
/// services, which is the right behavior for local development.
#[derive(Debug, Clone)]
pub struct Config {
    pub collection_url: Option<String>,
    pub blob_url: Option<String>,
    pub geocode_url: Option<String>,
    /// Upper bound on any single external call made by the submission flow.
    pub request_timeout: Duration,
    /// How often the live collection client re-fetches for snapshot deltas.
    pub feed_poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection_url: None,
            blob_url: None,
            geocode_url: None,
            request_timeout: Duration::from_secs(10),
            feed_poll_interval: Duration::from_secs(2),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        Config {
            collection_url: env::var("MAEUL_COLLECTION_URL").ok(),
            blob_url: env::var("MAEUL_BLOB_URL").ok(),
            geocode_url: env::var("MAEUL_GEOCODE_URL").ok(),
            request_timeout: millis_var("MAEUL_REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout),
            feed_poll_interval: millis_var("MAEUL_FEED_POLL_MS")
                .unwrap_or(defaults.feed_poll_interval),
        }
    }

    /// All three endpoints must be configured before the live clients are
    /// used; a half-configured stack would mix real and fake services.
    pub fn has_live_endpoints(&self) -> bool {
        self.collection_url.is_some() && self.blob_url.is_some() && self.geocode_url.is_some()
    }
}

fn millis_var(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
}
