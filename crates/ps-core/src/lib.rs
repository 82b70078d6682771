//! photoshare/crates/ps-core/src/lib.rs
//!
//! The central domain logic and interface definitions for PhotoShare:
//! models, ports, the quota guard and the guest submission pipeline.

pub mod error;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod quota;
pub mod slug;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_photo_creation_v7() {
        let id = Uuid::now_v7();
        let photo = Photo {
            id,
            event_slug: "festa-vicente".to_string(),
            file_name: "8b7f.jpg".to_string(),
            download_url: "http://blobs.local/events/festa-vicente/8b7f.jpg".to_string(),
            uploader_name: ANONYMOUS_UPLOADER.to_string(),
            uploaded_at: chrono::Utc::now(),
        };
        assert_eq!(photo.id, id);
        assert_eq!(photo.uploader_name, "anonymous");
    }
}
