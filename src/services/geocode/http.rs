use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{GeocodeError, Geocoder, ResolvedAddress};
use crate::models::issue::Coordinates;

/// Live geocoding client. A query resolves to at most one match; the
/// service answers 404 when the address is unknown.
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct GeocodeAck {
    address: String,
    lat: f64,
    lng: f64,
}

impl HttpGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<ResolvedAddress, GeocodeError> {
        let res = self
            .client
            .get(format!(
                "{}/geocode?query={}",
                self.base_url,
                urlencoding::encode(query.trim())
            ))
            .send()
            .await
            .map_err(|err| GeocodeError::Request(err.to_string()))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(GeocodeError::NotFound);
        }
        if !res.status().is_success() {
            return Err(GeocodeError::Request(format!(
                "geocode returned {}",
                res.status()
            )));
        }

        let ack: GeocodeAck = res
            .json()
            .await
            .map_err(|err| GeocodeError::Decode(err.to_string()))?;

        Ok(ResolvedAddress {
            address: ack.address,
            location: Coordinates {
                lat: ack.lat,
                lng: ack.lng,
            },
        })
    }
}
