//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::models::{Account, Event, EventStatus, Photo, Profile};
use async_trait::async_trait;
use uuid::Uuid;

/// Data persistence contract for events and their photo records.
#[async_trait]
pub trait EventRepo: Send + Sync {
    // Event operations
    async fn create_event(&self, event: Event) -> anyhow::Result<()>;
    async fn get_event(&self, slug: &str) -> anyhow::Result<Option<Event>>;
    /// Events with the given stored status, newest first.
    async fn list_events(&self, status: EventStatus) -> anyhow::Result<Vec<Event>>;
    async fn set_status(&self, slug: &str, status: EventStatus) -> anyhow::Result<()>;
    /// Atomic server-side counter update; `delta` may be negative.
    async fn increment_photo_count(&self, slug: &str, delta: i64) -> anyhow::Result<()>;

    // Photo operations
    async fn create_photo(&self, photo: Photo) -> anyhow::Result<()>;
    /// Photos of one event, newest upload first.
    async fn list_photos(&self, slug: &str) -> anyhow::Result<Vec<Photo>>;
    async fn get_photo(&self, slug: &str, id: Uuid) -> anyhow::Result<Option<Photo>>;
    /// Removes the record and decrements the event counter in one transaction.
    async fn delete_photo(&self, slug: &str, id: Uuid) -> anyhow::Result<()>;
}

/// Blob storage contract for raw file bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `data` under `path` and returns a publicly fetchable URL.
    async fn put(&self, path: &str, data: Vec<u8>) -> anyhow::Result<String>;
    /// Reads back a stored blob (used to load an event's overlay frame).
    async fn get(&self, path: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}

/// Identity contract. The identity service owns accounts and authentication;
/// this port only reads from it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies the admin password against the configured hash.
    async fn verify_admin_password(&self, password: &str) -> bool;
    /// All known accounts, for the bulk profile import.
    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>>;
}

/// Profile documents mirroring external accounts.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<Profile>>;
    async fn create_profile(&self, profile: Profile) -> anyhow::Result<()>;
}
