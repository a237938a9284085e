//! Uploaded files in object storage.

use tracing::{info, warn};

use talent_storage::{object_key, Folder, UploadKind};

use crate::error::ApiResult;
use crate::extract::UploadedFile;
use crate::metrics;
use crate::state::AppState;

/// Validate the file type and store it under a fresh key in `folder`.
pub async fn store_upload(
    state: &AppState,
    file: UploadedFile,
    kind: UploadKind,
    folder: Folder,
) -> ApiResult<String> {
    let file_type = kind.resolve(file.filename.as_deref(), file.content_type.as_deref())?;
    let key = object_key(Some(folder), file_type.extension);
    let size = file.data.len();

    state
        .storage
        .upload_bytes(file.data, &key, file_type.content_type)
        .await?;

    metrics::record_upload(folder.as_str(), size);
    Ok(key)
}

/// Best-effort removal of a replaced object.
pub async fn remove_previous(state: &AppState, stored: Option<&str>) {
    let Some(key) = stored.and_then(|s| state.storage.key_from_url(s)) else {
        return;
    };
    match state.storage.delete_object(&key).await {
        Ok(()) => info!(key = %key, "Removed replaced object"),
        Err(e) => warn!(key = %key, "Failed to remove replaced object: {}", e),
    }
}

/// Presigned GET URL for a stored key or URL, `None` when absent or when
/// signing fails.
pub async fn presigned_url(state: &AppState, stored: Option<&str>) -> Option<String> {
    let key = stored.and_then(|s| state.storage.key_from_url(s))?;
    match state.storage.presign(&key).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(key = %key, "Failed to presign object: {}", e);
            None
        }
    }
}
