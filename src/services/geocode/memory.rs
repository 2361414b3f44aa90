use std::collections::HashMap;

use async_trait::async_trait;

use super::{GeocodeError, Geocoder, ResolvedAddress};
use crate::models::issue::Coordinates;

/// Table-backed geocoder for tests and offline demos: known queries resolve,
/// everything else is a not-found.
#[derive(Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, ResolvedAddress>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, query: &str, address: &str, lat: f64, lng: f64) -> Self {
        self.entries.insert(
            query.to_string(),
            ResolvedAddress {
                address: address.to_string(),
                location: Coordinates { lat, lng },
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> Result<ResolvedAddress, GeocodeError> {
        self.entries
            .get(query.trim())
            .cloned()
            .ok_or(GeocodeError::NotFound)
    }
}
