use serde::Serialize;

/// What a failed notice asks of the user. Validation problems are fixable in
/// the form; service failures can only be retried manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    ServiceFailure,
    NotFound,
}

/// A blocking, user-visible notice, the application's only failure surface.
/// External-service failures all collapse into one generic message; no cause
/// detail leaks to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn validation(message: &str) -> Self {
        Self {
            kind: NoticeKind::Validation,
            message: message.to_string(),
        }
    }

    pub fn service_failure(message: &str) -> Self {
        Self {
            kind: NoticeKind::ServiceFailure,
            message: message.to_string(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self {
            kind: NoticeKind::NotFound,
            message: message.to_string(),
        }
    }
}
