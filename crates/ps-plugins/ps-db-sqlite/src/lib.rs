//! # ps-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `ps-core` domain models.

use async_trait::async_trait;
use ps_core::models::{Event, EventStatus, Photo, PlanTier, Profile, Role};
use ps_core::traits::{EventRepo, ProfileRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

// One statement per entry; sqlx prepares statements individually.
const SCHEMA: [&str; 4] = [
    r#"
CREATE TABLE IF NOT EXISTS events (
    slug        TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TIMESTAMP NOT NULL,
    status      TEXT NOT NULL DEFAULT 'active',
    frame_path  TEXT,
    frame_url   TEXT,
    photo_count INTEGER NOT NULL DEFAULT 0,
    photo_limit INTEGER NOT NULL,
    is_private  INTEGER NOT NULL DEFAULT 0,
    plan        TEXT NOT NULL DEFAULT 'free',
    price_cents INTEGER NOT NULL DEFAULT 0
)"#,
    r#"
CREATE TABLE IF NOT EXISTS photos (
    id            BLOB PRIMARY KEY,
    event_slug    TEXT NOT NULL REFERENCES events(slug),
    file_name     TEXT NOT NULL,
    download_url  TEXT NOT NULL,
    uploader_name TEXT NOT NULL,
    uploaded_at   TIMESTAMP NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_photos_event ON photos(event_slug, uploaded_at)",
    r#"
CREATE TABLE IF NOT EXISTS profiles (
    uid        TEXT PRIMARY KEY,
    email      TEXT NOT NULL,
    name       TEXT NOT NULL,
    role       TEXT NOT NULL DEFAULT 'client',
    photo_url  TEXT,
    created_at TIMESTAMP NOT NULL
)"#,
];

impl SqliteEventRepo {
    /// Connects (creating the file if needed) and applies the schema.
    /// SQLite allows a single writer; one pooled connection keeps the
    /// counter updates serialized.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(SqliteEventRepo { pool })
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Event {
    Event {
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        status: EventStatus::parse(&row.get::<String, _>("status")).unwrap_or(EventStatus::Active),
        frame_path: row.get("frame_path"),
        frame_url: row.get("frame_url"),
        photo_count: row.get("photo_count"),
        photo_limit: row.get("photo_limit"),
        is_private: row.get("is_private"),
        plan: PlanTier::parse(&row.get::<String, _>("plan")).unwrap_or(PlanTier::Free),
        price_cents: row.get("price_cents"),
    }
}

fn row_to_photo(row: &sqlx::sqlite::SqliteRow) -> Photo {
    Photo {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        event_slug: row.get("event_slug"),
        file_name: row.get("file_name"),
        download_url: row.get("download_url"),
        uploader_name: row.get("uploader_name"),
        uploaded_at: row.get("uploaded_at"),
    }
}

#[async_trait]
impl EventRepo for SqliteEventRepo {
    async fn create_event(&self, event: Event) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO events (slug, name, created_at, status, frame_path, frame_url, \
             photo_count, photo_limit, is_private, plan, price_cents) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.slug)
        .bind(&event.name)
        .bind(event.created_at)
        .bind(event.status.as_str())
        .bind(&event.frame_path)
        .bind(&event.frame_url)
        .bind(event.photo_count)
        .bind(event.photo_limit)
        .bind(event.is_private)
        .bind(event.plan.as_str())
        .bind(event.price_cents)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_event(&self, slug: &str) -> anyhow::Result<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_event))
    }

    async fn list_events(&self, status: EventStatus) -> anyhow::Result<Vec<Event>> {
        let rows = sqlx::query("SELECT * FROM events WHERE status = ? ORDER BY created_at DESC")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_event).collect())
    }

    async fn set_status(&self, slug: &str, status: EventStatus) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE events SET status = ? WHERE slug = ?")
            .bind(status.as_str())
            .bind(slug)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("event {} does not exist", slug);
        }
        Ok(())
    }

    /// Server-side atomic counter update. Clients never write the absolute
    /// value, so concurrent batches cannot clobber each other's increments.
    async fn increment_photo_count(&self, slug: &str, delta: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE events SET photo_count = photo_count + ? WHERE slug = ?")
            .bind(delta)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_photo(&self, photo: Photo) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO photos (id, event_slug, file_name, download_url, uploader_name, uploaded_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(photo.id))
        .bind(&photo.event_slug)
        .bind(&photo.file_name)
        .bind(&photo.download_url)
        .bind(&photo.uploader_name)
        .bind(photo.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_photos(&self, slug: &str) -> anyhow::Result<Vec<Photo>> {
        let rows =
            sqlx::query("SELECT * FROM photos WHERE event_slug = ? ORDER BY uploaded_at DESC")
                .bind(slug)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(row_to_photo).collect())
    }

    async fn get_photo(&self, slug: &str, id: Uuid) -> anyhow::Result<Option<Photo>> {
        let row = sqlx::query("SELECT * FROM photos WHERE event_slug = ? AND id = ?")
            .bind(slug)
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_photo))
    }

    /// Record removal and counter decrement happen in one transaction, so a
    /// failure between them cannot leave the counter drifting further than
    /// the (separate, non-transactional) blob deletion already allows.
    async fn delete_photo(&self, slug: &str, id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM photos WHERE event_slug = ? AND id = ?")
            .bind(slug)
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("photo {} not found in event {}", id, slug);
        }

        sqlx::query("UPDATE events SET photo_count = photo_count - 1 WHERE slug = ?")
            .bind(slug)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepo for SqliteEventRepo {
    async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| Profile {
            uid: row.get("uid"),
            email: row.get("email"),
            name: row.get("name"),
            role: Role::parse(&row.get::<String, _>("role")).unwrap_or(Role::Client),
            photo_url: row.get("photo_url"),
            created_at: row.get("created_at"),
        }))
    }

    async fn create_profile(&self, profile: Profile) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO profiles (uid, email, name, role, photo_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.role.as_str())
        .bind(&profile.photo_url)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ps_core::models::ANONYMOUS_UPLOADER;

    async fn repo() -> SqliteEventRepo {
        SqliteEventRepo::new("sqlite::memory:").await.unwrap()
    }

    fn event(slug: &str, limit: i64) -> Event {
        Event {
            slug: slug.into(),
            name: slug.replace('-', " "),
            created_at: Utc::now(),
            status: EventStatus::Active,
            frame_path: None,
            frame_url: None,
            photo_count: 0,
            photo_limit: limit,
            is_private: false,
            plan: PlanTier::Standard,
            price_cents: 4900,
        }
    }

    fn photo(slug: &str) -> Photo {
        Photo {
            id: Uuid::now_v7(),
            event_slug: slug.into(),
            file_name: format!("{}.jpg", Uuid::new_v4()),
            download_url: "http://blobs.local/x.jpg".into(),
            uploader_name: ANONYMOUS_UPLOADER.into(),
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn event_roundtrip() {
        let repo = repo().await;
        repo.create_event(event("festa-vicente", 300)).await.unwrap();

        let loaded = repo.get_event("festa-vicente").await.unwrap().unwrap();
        assert_eq!(loaded.name, "festa vicente");
        assert_eq!(loaded.photo_limit, 300);
        assert_eq!(loaded.plan, PlanTier::Standard);
        assert!(repo.get_event("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let repo = repo().await;
        repo.create_event(event("dup", 10)).await.unwrap();
        assert!(repo.create_event(event("dup", 10)).await.is_err());
    }

    #[tokio::test]
    async fn counter_increments_are_cumulative() {
        let repo = repo().await;
        repo.create_event(event("festa", 300)).await.unwrap();

        repo.increment_photo_count("festa", 3).await.unwrap();
        repo.increment_photo_count("festa", 2).await.unwrap();

        let loaded = repo.get_event("festa").await.unwrap().unwrap();
        assert_eq!(loaded.photo_count, 5);
    }

    #[tokio::test]
    async fn photos_list_newest_first() {
        let repo = repo().await;
        repo.create_event(event("festa", 300)).await.unwrap();

        let mut older = photo("festa");
        older.uploaded_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = photo("festa");
        repo.create_photo(older.clone()).await.unwrap();
        repo.create_photo(newer.clone()).await.unwrap();

        let photos = repo.list_photos("festa").await.unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].id, newer.id);
        assert_eq!(photos[1].id, older.id);
    }

    #[tokio::test]
    async fn delete_removes_record_and_decrements_together() {
        let repo = repo().await;
        repo.create_event(event("festa", 300)).await.unwrap();
        let p = photo("festa");
        repo.create_photo(p.clone()).await.unwrap();
        repo.increment_photo_count("festa", 1).await.unwrap();

        repo.delete_photo("festa", p.id).await.unwrap();

        assert!(repo.get_photo("festa", p.id).await.unwrap().is_none());
        let loaded = repo.get_event("festa").await.unwrap().unwrap();
        assert_eq!(loaded.photo_count, 0);
    }

    #[tokio::test]
    async fn deleting_a_missing_photo_rolls_back_the_decrement() {
        // Simulates the failure-between-steps case: the record delete fails,
        // so the transaction must leave the counter untouched.
        let repo = repo().await;
        repo.create_event(event("festa", 300)).await.unwrap();
        repo.increment_photo_count("festa", 2).await.unwrap();

        let err = repo.delete_photo("festa", Uuid::now_v7()).await;
        assert!(err.is_err());

        let loaded = repo.get_event("festa").await.unwrap().unwrap();
        assert_eq!(loaded.photo_count, 2);
    }

    #[tokio::test]
    async fn listings_split_by_stored_status() {
        let repo = repo().await;
        repo.create_event(event("old-festa", 50)).await.unwrap();
        repo.create_event(event("new-festa", 50)).await.unwrap();
        repo.set_status("old-festa", EventStatus::Archived).await.unwrap();

        let active = repo.list_events(EventStatus::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].slug, "new-festa");

        let archived = repo.list_events(EventStatus::Archived).await.unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].slug, "old-festa");

        // Restore flips it back.
        repo.set_status("old-festa", EventStatus::Active).await.unwrap();
        assert_eq!(repo.list_events(EventStatus::Active).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn profile_roundtrip() {
        let repo = repo().await;
        let profile = Profile {
            uid: "u1".into(),
            email: "ana@example.com".into(),
            name: "Ana".into(),
            role: Role::Client,
            photo_url: None,
            created_at: Utc::now(),
        };
        repo.create_profile(profile.clone()).await.unwrap();

        let loaded = repo.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(loaded.email, "ana@example.com");
        assert_eq!(loaded.role, Role::Client);
        assert!(repo.get_profile("u2").await.unwrap().is_none());
        // Primary key makes re-creation fail rather than duplicate.
        assert!(repo.create_profile(profile).await.is_err());
    }
}
