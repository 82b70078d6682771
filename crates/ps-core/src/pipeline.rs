//! Guest submission pipeline: quota gate plus the sequential upload queue.
//!
//! Items are persisted strictly in list order, one at a time. A failure on
//! item k aborts items k+1..n and leaves items 1..k-1 in place; there is no
//! rollback. The event counter is bumped once, by the accepted total, only
//! after every item has landed.

use crate::error::{AppError, Result};
use crate::models::{Photo, UploadItem, ANONYMOUS_UPLOADER};
use crate::quota;
use crate::traits::{BlobStore, EventRepo};
use chrono::Utc;
use uuid::Uuid;

/// Derives the lowercase file extension for the remote name, defaulting to
/// "jpg" when the client-side name carries none.
fn remote_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => "jpg".to_string(),
    }
}

/// Collision-free remote file name for one upload.
fn remote_file_name(original: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), remote_extension(original))
}

fn normalize_uploader(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS_UPLOADER)
        .to_string()
}

/// Runs the full submission for one guest session and returns the accepted
/// count. The quota is read immediately before the queue starts; see the
/// race note in [`crate::quota`].
pub async fn submit_batch(
    repo: &dyn EventRepo,
    store: &dyn BlobStore,
    slug: &str,
    uploader_name: Option<&str>,
    items: Vec<UploadItem>,
) -> Result<usize> {
    if items.is_empty() {
        return Ok(0);
    }

    let event = repo
        .get_event(slug)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::NotFound("event".into(), slug.into()))?;

    quota::admit_batch(&event, items.len())?;

    let uploader = normalize_uploader(uploader_name);
    let total = items.len();

    for (index, item) in items.into_iter().enumerate() {
        let file_name = remote_file_name(&item.file_name);
        let path = format!("events/{}/{}", slug, file_name);

        let download_url = store.put(&path, item.bytes).await.map_err(|e| {
            log::warn!(
                "upload {}/{} for event {} failed at storage: {}",
                index + 1,
                total,
                slug,
                e
            );
            AppError::internal(e)
        })?;

        let photo = Photo {
            id: Uuid::now_v7(),
            event_slug: slug.to_string(),
            file_name,
            download_url,
            uploader_name: uploader.clone(),
            uploaded_at: Utc::now(),
        };

        repo.create_photo(photo).await.map_err(|e| {
            log::warn!(
                "upload {}/{} for event {} failed at metadata write: {}",
                index + 1,
                total,
                slug,
                e
            );
            AppError::internal(e)
        })?;
    }

    // Single counter update for the whole batch, not one per photo.
    repo.increment_photo_count(slug, total as i64)
        .await
        .map_err(AppError::internal)?;

    log::info!("event {}: accepted {} photo(s) from {}", slug, total, uploader);
    Ok(total)
}
