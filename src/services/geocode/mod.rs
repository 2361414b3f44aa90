use async_trait::async_trait;
use thiserror::Error;

use crate::models::issue::Coordinates;

mod http;
mod memory;

pub use http::HttpGeocoder;
pub use memory::StaticGeocoder;

/// Output of a successful address lookup: the normalized address string and
/// its coordinates. Exactly what the submission flow needs before a record
/// may be created.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: String,
    pub location: Coordinates,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no match for the given address")]
    NotFound,
    #[error("geocoding request failed: {0}")]
    Request(String),
    #[error("geocoder returned malformed data: {0}")]
    Decode(String),
}

/// The address-lookup seam. The interactive picker widget is UI; its output
/// (a raw address string) is this trait's input.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<ResolvedAddress, GeocodeError>;
}
