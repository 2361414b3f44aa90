use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One reply on a review page. Comments live only in the view that created
/// them; the id is a local time-of-creation token, not a stored identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
}

impl Comment {
    /// Builds a comment stamped with the current instant in unix
    /// milliseconds. `floor` guards ordering when two comments land within
    /// the same millisecond: the new id is always strictly greater.
    pub fn at_now(text: impl Into<String>, floor: Option<i64>) -> Self {
        let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let id = match floor {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        Comment {
            id,
            text: text.into(),
        }
    }
}
