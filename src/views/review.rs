use thiserror::Error;
use tracing::debug;

use crate::models::comment::Comment;
use crate::models::issue::Issue;
use crate::notice::Notice;
use crate::services::collection::CollectionError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("no report with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Service(#[from] CollectionError),
}

impl ReviewError {
    pub fn user_notice(&self) -> Notice {
        match self {
            ReviewError::NotFound(_) => Notice::not_found("That report no longer exists."),
            ReviewError::Service(_) => {
                Notice::service_failure("Could not load the report. Please try again.")
            }
        }
    }
}

/// The review page for one report: the record itself plus an append-only
/// comment thread held in view memory. Comments are not persisted beyond
/// the view's lifetime in this scope.
#[derive(Debug)]
pub struct ReviewView {
    pub issue: Issue,
    comments: Vec<Comment>,
    input: String,
}

impl ReviewView {
    /// Resolves the route's id against the same collection the map reads
    /// from. An id no record matches is a not-found, not a placeholder.
    pub async fn load(state: &AppState, id: &str) -> Result<Self, ReviewError> {
        let issue = state
            .collection
            .fetch(id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(id.to_string()))?;

        Ok(Self {
            issue,
            comments: Vec::new(),
            input: String::new(),
        })
    }

    /// In insertion order; insertion order is display order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Appends the current input as a comment. Whitespace-only input is a
    /// no-op that keeps the text in the box; a real comment is appended
    /// trimmed and the box is cleared.
    pub fn submit_comment(&mut self) -> bool {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            debug!("ignoring empty comment submission");
            return false;
        }

        let floor = self.comments.last().map(|comment| comment.id);
        self.comments.push(Comment::at_now(trimmed, floor));
        self.input.clear();
        true
    }
}
