use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::issue::{IssueCategory, NewIssue};
use crate::notice::Notice;
use crate::services::blob::{BlobError, BlobHandle, BlobStore};
use crate::services::collection::{CollectionError, CollectionStore};
use crate::services::geocode::{GeocodeError, Geocoder, ResolvedAddress};

/// An image the user selected but has not uploaded yet. Bytes stay
/// client-side until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The in-progress report form. A draft only ever gains coordinates through
/// a successful address resolution; there is no way to store half a lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueDraft {
    pub category: Option<IssueCategory>,
    pub address: Option<ResolvedAddress>,
    pub address_detail: String,
    pub description: String,
    pub images: Vec<PendingImage>,
}

impl IssueDraft {
    /// Runs the picked address string through the geocoder. On any failure
    /// the draft is left untouched.
    pub async fn resolve_address(
        &mut self,
        geocoder: &dyn Geocoder,
        query: &str,
    ) -> Result<(), GeocodeError> {
        let resolved = geocoder.geocode(query).await?;
        info!(address = %resolved.address, "address resolved");
        self.address = Some(resolved);
        Ok(())
    }

    /// Appends one image; selection order is upload order.
    pub fn attach_image(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        self.images.push(PendingImage {
            file_name: file_name.into(),
            bytes,
        });
    }

    pub fn has_coordinates(&self) -> bool {
        self.address.is_some()
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a resolved address is required before submitting")]
    MissingCoordinate,
    #[error("an issue category is required before submitting")]
    MissingCategory,
    #[error(transparent)]
    Upload(#[from] BlobError),
    #[error(transparent)]
    Insert(#[from] CollectionError),
    #[error("{0} call timed out")]
    Timeout(&'static str),
}

impl SubmitError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SubmitError::MissingCoordinate | SubmitError::MissingCategory
        )
    }

    /// The blocking notice shown for this failure. Service failures all
    /// collapse into one generic retry message.
    pub fn user_notice(&self) -> Notice {
        match self {
            SubmitError::MissingCoordinate => {
                Notice::validation("Please pick an address for the report first.")
            }
            SubmitError::MissingCategory => {
                Notice::validation("Please choose an issue category.")
            }
            _ => Notice::service_failure("Could not save your report. Please try again."),
        }
    }
}

/// The submission surface of the map page. The variants make the illegal
/// combinations (submitting while closed, editing while submitting)
/// unrepresentable.
#[derive(Debug, Default)]
pub enum Composer {
    #[default]
    Closed,
    Editing(IssueDraft),
    Submitting(IssueDraft),
    Failed { draft: IssueDraft, notice: Notice },
}

impl Composer {
    /// Opens the surface. A fresh open starts from the default (empty)
    /// draft; opening after a failure resumes the preserved one, selected
    /// images included.
    pub fn open(&mut self) {
        match std::mem::take(self) {
            Composer::Closed => *self = Composer::Editing(IssueDraft::default()),
            Composer::Failed { draft, .. } => *self = Composer::Editing(draft),
            other => *self = other,
        }
    }

    /// Closes the surface and discards the draft. A submission in flight
    /// cannot be closed out from under itself.
    pub fn close(&mut self) {
        if !matches!(self, Composer::Submitting(_)) {
            *self = Composer::Closed;
        }
    }

    pub fn draft(&self) -> Option<&IssueDraft> {
        match self {
            Composer::Editing(draft)
            | Composer::Submitting(draft)
            | Composer::Failed { draft, .. } => Some(draft),
            Composer::Closed => None,
        }
    }

    /// The draft is only editable while the surface is in `Editing`.
    pub fn draft_mut(&mut self) -> Option<&mut IssueDraft> {
        match self {
            Composer::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Composer::Failed { notice, .. } => Some(notice),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Composer::Closed)
    }
}

async fn timed<T, E>(
    limit: Duration,
    stage: &'static str,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, SubmitError>
where
    SubmitError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SubmitError::from(err)),
        Err(_) => Err(SubmitError::Timeout(stage)),
    }
}

/// Best-effort take-back of photos written by a submission that did not
/// produce a record. A blob the store refuses to delete is logged and left.
async fn roll_back_uploads(blobs: &dyn BlobStore, uploaded: &[BlobHandle]) {
    for handle in uploaded {
        if let Err(err) = blobs.delete(handle).await {
            warn!(?err, path = %handle.path, "failed to take back uploaded photo");
        }
    }
}

/// The one write path: validate, upload photos one at a time in selection
/// order, then append exactly one record. Any failure aborts the whole
/// submission before the insert; the caller keeps the draft for retry.
pub async fn submit_issue(
    draft: &IssueDraft,
    collection: &dyn CollectionStore,
    blobs: &dyn BlobStore,
    call_timeout: Duration,
) -> Result<String, SubmitError> {
    let address = draft.address.as_ref().ok_or(SubmitError::MissingCoordinate)?;
    let category = draft.category.ok_or(SubmitError::MissingCategory)?;

    let batch = Uuid::new_v4();
    let mut uploaded: Vec<BlobHandle> = Vec::with_capacity(draft.images.len());
    let mut photos: Vec<String> = Vec::with_capacity(draft.images.len());

    // Uploads run sequentially so the photo list keeps selection order.
    for (index, image) in draft.images.iter().enumerate() {
        let path = format!("issues/{batch}/{index:02}-{}", image.file_name);

        let handle = match timed(call_timeout, "upload", blobs.upload(&path, image.bytes.clone()))
            .await
        {
            Ok(handle) => handle,
            Err(err) => {
                warn!(%path, "photo upload failed, aborting submission");
                roll_back_uploads(blobs, &uploaded).await;
                return Err(err);
            }
        };

        let url = timed(call_timeout, "resolve", blobs.resolve(&handle)).await;
        uploaded.push(handle);
        match url {
            Ok(url) => photos.push(url),
            Err(err) => {
                warn!(%path, "photo url resolution failed, aborting submission");
                roll_back_uploads(blobs, &uploaded).await;
                return Err(err);
            }
        }
    }

    let record = NewIssue {
        location: address.location,
        category,
        address: address.address.clone(),
        address_detail: none_if_blank(&draft.address_detail),
        description: none_if_blank(&draft.description),
        photos,
    };

    match timed(call_timeout, "insert", collection.insert(record)).await {
        Ok(id) => {
            info!(%id, photos = uploaded.len(), "issue report created");
            Ok(id)
        }
        Err(err) => {
            roll_back_uploads(blobs, &uploaded).await;
            Err(err)
        }
    }
}

fn none_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
