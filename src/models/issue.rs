use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Category of a reported housing problem. The wire form is kebab-case
/// (`noise`, `pest`, `water-leak`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    Noise,
    Pest,
    WaterLeak,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Noise => "noise",
            IssueCategory::Pest => "pest",
            IssueCategory::WaterLeak => "water-leak",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One stored issue report, as delivered by the collection service.
///
/// `id` and `created_at` are assigned by the service on insert and never
/// change afterwards. A record cannot exist without resolved coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(flatten)]
    pub location: Coordinates,
    pub category: IssueCategory,
    pub address: String,
    pub address_detail: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The client-constructed half of a record: everything except the
/// server-assigned identifier and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    #[serde(flatten)]
    pub location: Coordinates,
    pub category: IssueCategory,
    pub address: String,
    pub address_detail: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&IssueCategory::WaterLeak).unwrap();
        assert_eq!(json, "\"water-leak\"");

        let parsed: IssueCategory = serde_json::from_str("\"pest\"").unwrap();
        assert_eq!(parsed, IssueCategory::Pest);
    }

    #[test]
    fn issue_round_trips_with_flattened_coordinates() {
        let json = serde_json::json!({
            "id": "abc123",
            "lat": 37.5665,
            "lng": 126.978,
            "category": "noise",
            "address": "서울 중구 세종대로 110",
            "address_detail": "302호",
            "description": "층간소음이 심합니다",
            "photos": ["https://files.example/a.jpg"],
            "created_at": "2025-03-01T09:30:00Z",
        });

        let issue: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(issue.location.lat, 37.5665);
        assert_eq!(issue.category, IssueCategory::Noise);
        assert_eq!(issue.photos.len(), 1);
    }

    #[test]
    fn missing_photos_decode_as_empty() {
        let json = serde_json::json!({
            "id": "abc123",
            "lat": 37.56,
            "lng": 126.982,
            "category": "water-leak",
            "address": "서울 어딘가",
            "address_detail": null,
            "description": null,
            "created_at": "2025-03-01T09:30:00Z",
        });

        let issue: Issue = serde_json::from_value(json).unwrap();
        assert!(issue.photos.is_empty());
    }
}
