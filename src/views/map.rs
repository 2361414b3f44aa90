use tracing::debug;

use crate::models::issue::{Coordinates, Issue};
use crate::notice::Notice;
use crate::state::AppState;
use crate::views::compose::{submit_issue, Composer};

/// Viewport defaults handed to the embedded map widget on first render. The
/// widget owns pan/zoom from then on; none of it comes back into app state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: Coordinates {
                lat: 37.5665,
                lng: 126.978,
            },
            zoom: 13,
        }
    }
}

/// State of the map page: the mirrored listing snapshot, the single selected
/// marker, and the report submission surface.
#[derive(Debug, Default)]
pub struct MapView {
    issues: Vec<Issue>,
    selected: Option<String>,
    pub composer: Composer,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the marker set with a fresh feed snapshot. A selection whose
    /// record is gone from the new snapshot is dropped rather than left
    /// dangling.
    pub fn apply_snapshot(&mut self, snapshot: Vec<Issue>) {
        self.issues = snapshot;
        if let Some(id) = &self.selected {
            if !self.issues.iter().any(|issue| &issue.id == id) {
                debug!(%id, "selected record left the snapshot, deselecting");
                self.selected = None;
            }
        }
    }

    /// One marker per record, in feed order.
    pub fn markers(&self) -> &[Issue] {
        &self.issues
    }

    /// Selects a marker, implicitly deselecting any other. Unknown ids are
    /// ignored and leave the current selection in place.
    pub fn select(&mut self, id: &str) -> bool {
        if self.issues.iter().any(|issue| issue.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Explicit close action on the detail overlay.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The record whose detail overlay is visible, if any.
    pub fn selected(&self) -> Option<&Issue> {
        let id = self.selected.as_ref()?;
        self.issues.iter().find(|issue| &issue.id == id)
    }

    /// Runs the composer's draft through the submission pipeline. On success
    /// the surface closes and the new record's id comes back; on failure the
    /// surface holds the preserved draft plus the notice to show.
    pub async fn submit_draft(&mut self, state: &AppState) -> Result<String, Notice> {
        let draft = match std::mem::take(&mut self.composer) {
            Composer::Editing(draft) => draft,
            other => {
                self.composer = other;
                return Err(Notice::validation("No report is being edited."));
            }
        };
        self.composer = Composer::Submitting(draft.clone());

        match submit_issue(
            &draft,
            state.collection.as_ref(),
            state.blobs.as_ref(),
            state.config.request_timeout,
        )
        .await
        {
            Ok(id) => {
                self.composer = Composer::Closed;
                Ok(id)
            }
            Err(err) => {
                let notice = err.user_notice();
                self.composer = Composer::Failed {
                    draft,
                    notice: notice.clone(),
                };
                Err(notice)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::issue::IssueCategory;
    use crate::state::test_support::memory_state;
    use time::macros::datetime;

    fn stored(id: &str) -> Issue {
        Issue {
            id: id.into(),
            location: Coordinates {
                lat: 37.57,
                lng: 126.975,
            },
            category: IssueCategory::Pest,
            address: "서울 어딘가".into(),
            address_detail: None,
            description: None,
            photos: vec![],
            created_at: datetime!(2025-03-01 09:30 UTC),
        }
    }

    #[test]
    fn the_default_viewport_is_the_city_center() {
        let viewport = MapViewport::default();
        assert_eq!(viewport.zoom, 13);
        assert!((viewport.center.lat - 37.5665).abs() < f64::EPSILON);
    }

    #[test]
    fn selecting_a_second_marker_deselects_the_first() {
        let mut view = MapView::new();
        view.apply_snapshot(vec![stored("a"), stored("b")]);

        assert!(view.select("a"));
        assert_eq!(view.selected().unwrap().id, "a");

        assert!(view.select("b"));
        assert_eq!(view.selected().unwrap().id, "b");
    }

    #[test]
    fn closing_the_overlay_clears_the_selection() {
        let mut view = MapView::new();
        view.apply_snapshot(vec![stored("a")]);
        view.select("a");

        view.clear_selection();
        assert!(view.selected().is_none());
    }

    #[test]
    fn selecting_an_unknown_id_changes_nothing() {
        let mut view = MapView::new();
        view.apply_snapshot(vec![stored("a")]);
        view.select("a");

        assert!(!view.select("ghost"));
        assert_eq!(view.selected().unwrap().id, "a");
    }

    #[test]
    fn a_snapshot_without_the_selected_record_drops_the_selection() {
        let mut view = MapView::new();
        view.apply_snapshot(vec![stored("a"), stored("b")]);
        view.select("a");

        view.apply_snapshot(vec![stored("b")]);
        assert!(view.selected().is_none());
    }

    #[tokio::test]
    async fn successful_submission_closes_the_surface() {
        let state = memory_state();
        let mut view = MapView::new();

        view.composer.open();
        {
            let draft = view.composer.draft_mut().unwrap();
            draft.category = Some(IssueCategory::Noise);
            draft
                .resolve_address(state.geocoder.as_ref(), "세종대로 110")
                .await
                .unwrap();
        }

        let id = view.submit_draft(&state).await.unwrap();
        assert!(!view.composer.is_open());
        assert!(state.collection.fetch(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn validation_failure_preserves_the_form_and_surfaces_a_notice() {
        let state = memory_state();
        let mut view = MapView::new();

        view.composer.open();
        {
            let draft = view.composer.draft_mut().unwrap();
            draft.category = Some(IssueCategory::Noise);
            draft.description = "주소 없이 제출".into();
            draft.attach_image("kept.jpg", vec![1, 2]);
        }

        let notice = view.submit_draft(&state).await.err().unwrap();
        assert_eq!(notice.kind, crate::notice::NoticeKind::Validation);

        // The draft, selected images included, survives the failure.
        let draft = view.composer.draft().unwrap();
        assert_eq!(draft.images.len(), 1);
        assert_eq!(draft.description, "주소 없이 제출");
    }

    #[tokio::test]
    async fn submitting_without_an_open_surface_is_rejected() {
        let state = memory_state();
        let mut view = MapView::new();

        let notice = view.submit_draft(&state).await.err().unwrap();
        assert_eq!(notice.kind, crate::notice::NoticeKind::Validation);
        assert!(!view.composer.is_open());
    }

    #[tokio::test]
    async fn a_submitted_report_lands_on_the_map_via_the_feed_round_trip() {
        let state = memory_state();
        let feed = crate::feed::ListingFeed::activate(state.collection.clone()).await;
        let mut rx = feed.watch();
        let mut view = MapView::new();

        view.composer.open();
        {
            let draft = view.composer.draft_mut().unwrap();
            draft.category = Some(IssueCategory::WaterLeak);
            draft
                .resolve_address(state.geocoder.as_ref(), "세종대로 110")
                .await
                .unwrap();
        }
        let id = view.submit_draft(&state).await.unwrap();

        rx.wait_for(|snapshot| !snapshot.is_empty()).await.unwrap();
        view.apply_snapshot(rx.borrow().clone());

        assert!(view.select(&id));
        assert_eq!(view.selected().unwrap().id, id);
    }
}
