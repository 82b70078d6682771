//! # Domain Models
//!
//! These structs represent the core entities of PhotoShare.
//! Photo records use UUID v7 for time-ordered, globally unique identification;
//! events are keyed by a human-readable slug derived from their display name.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uploader name recorded when a guest leaves the name field blank.
pub const ANONYMOUS_UPLOADER: &str = "anonymous";

/// Events older than this are treated as past their active window.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Lifecycle state of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Archived,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EventStatus::Active),
            "archived" => Some(EventStatus::Archived),
            _ => None,
        }
    }
}

/// Billing tier an event was sold under. The tier fixes the default photo
/// quota; the stored limit on the event is authoritative after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Standard,
    Premium,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Standard => "standard",
            PlanTier::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanTier::Free),
            "standard" => Some(PlanTier::Standard),
            "premium" => Some(PlanTier::Premium),
            _ => None,
        }
    }

    /// Photo quota granted when an event is created under this tier.
    pub fn default_photo_limit(&self) -> i64 {
        match self {
            PlanTier::Free => 50,
            PlanTier::Standard => 300,
            PlanTier::Premium => 1000,
        }
    }
}

/// Principal role, modelled as a tagged variant with explicit capability
/// methods rather than string comparisons scattered through handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "client" | "cliente" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn can_manage_events(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_delete_photos(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An organizer-created photo-collection campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// URL slug and primary key (e.g., "festa-vicente").
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: EventStatus,
    /// Storage path of the transparent overlay frame, when one is configured.
    pub frame_path: Option<String>,
    /// Public URL of the overlay frame.
    pub frame_url: Option<String>,
    /// Live photo counter; best-effort mirror of the photo rows (see quota docs).
    pub photo_count: i64,
    pub photo_limit: i64,
    pub is_private: bool,
    pub plan: PlanTier,
    pub price_cents: i64,
}

impl Event {
    /// Whether the event has aged out of its active window. Computed at read
    /// time; nothing flips the stored status automatically.
    pub fn is_past_active_window(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::days(ACTIVE_WINDOW_DAYS)
    }

    pub fn remaining_slots(&self) -> i64 {
        (self.photo_limit - self.photo_count).max(0)
    }

    pub fn has_frame(&self) -> bool {
        self.frame_url.is_some()
    }
}

/// One accepted guest upload. Owned by exactly one event (by reference).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub event_slug: String,
    /// Remote file name under the event's storage prefix.
    pub file_name: String,
    /// Publicly fetchable URL of the stored file.
    pub download_url: String,
    pub uploader_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A file a guest has selected but not yet submitted. Transient: lives only
/// for the duration of one upload session.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Original client-side file name (used to derive the remote extension).
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Identity record as reported by the external identity service. Read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile document mirroring an [`Account`], owned by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Builds the profile the bulk import creates for an unknown account.
    /// Display name falls back to the email local part, then to "user".
    pub fn from_account(account: &Account) -> Self {
        let email = account.email.clone().unwrap_or_default();
        let name = account
            .display_name
            .clone()
            .or_else(|| email.split('@').next().map(str::to_string))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "user".to_string());
        Profile {
            uid: account.uid.clone(),
            email,
            name,
            role: Role::Client,
            photo_url: account.photo_url.clone(),
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ages_out_after_thirty_days() {
        let event = Event {
            slug: "festa-vicente".into(),
            name: "Festa Vicente".into(),
            created_at: Utc::now() - Duration::days(31),
            status: EventStatus::Active,
            frame_path: None,
            frame_url: None,
            photo_count: 0,
            photo_limit: 300,
            is_private: false,
            plan: PlanTier::Standard,
            price_cents: 0,
        };
        assert!(event.is_past_active_window(Utc::now()));
        assert!(!Event {
            created_at: Utc::now() - Duration::days(29),
            ..event
        }
        .is_past_active_window(Utc::now()));
    }

    #[test]
    fn role_capabilities() {
        assert!(Role::Admin.can_manage_events());
        assert!(Role::Admin.can_delete_photos());
        assert!(!Role::Client.can_manage_events());
        assert!(!Role::Client.can_delete_photos());
        // Legacy records spell the role in Portuguese.
        assert_eq!(Role::parse("cliente"), Some(Role::Client));
    }

    #[test]
    fn profile_falls_back_to_email_local_part() {
        let account = Account {
            uid: "u1".into(),
            email: Some("ricardo@example.com".into()),
            display_name: None,
            photo_url: None,
            created_at: Utc::now(),
        };
        let profile = Profile::from_account(&account);
        assert_eq!(profile.name, "ricardo");
        assert_eq!(profile.role, Role::Client);
    }
}
