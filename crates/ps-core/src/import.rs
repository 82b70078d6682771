//! Bulk user import: mirrors identity-service accounts into profile records.
//!
//! Idempotent by construction: accounts that already have a profile are
//! skipped, so re-running against the same identity set creates nothing.
//! One account failing is counted and logged, not fatal.

use crate::models::Profile;
use crate::traits::{IdentityProvider, ProfileRepo};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

/// Ensures every identity-service account has a profile record.
pub async fn run_import(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileRepo,
) -> anyhow::Result<ImportSummary> {
    let accounts = identity.list_accounts().await?;
    log::info!("found {} account(s) in the identity service", accounts.len());

    let mut summary = ImportSummary::default();
    for account in &accounts {
        match profiles.get_profile(&account.uid).await {
            Ok(Some(_)) => {
                log::debug!("profile exists for {}", account.uid);
                summary.skipped += 1;
            }
            Ok(None) => match profiles.create_profile(Profile::from_account(account)).await {
                Ok(()) => {
                    log::info!("created profile for {}", account.uid);
                    summary.created += 1;
                }
                Err(e) => {
                    log::error!("failed to create profile for {}: {}", account.uid, e);
                    summary.failed += 1;
                }
            },
            Err(e) => {
                log::error!("failed to look up profile for {}: {}", account.uid, e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedIdentity {
        accounts: Vec<Account>,
    }

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn verify_admin_password(&self, _password: &str) -> bool {
            false
        }
        async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
            Ok(self.accounts.clone())
        }
    }

    #[derive(Default)]
    struct MemoryProfiles {
        profiles: Mutex<HashMap<String, Profile>>,
    }

    #[async_trait]
    impl ProfileRepo for MemoryProfiles {
        async fn get_profile(&self, uid: &str) -> anyhow::Result<Option<Profile>> {
            Ok(self.profiles.lock().unwrap().get(uid).cloned())
        }
        async fn create_profile(&self, profile: Profile) -> anyhow::Result<()> {
            self.profiles
                .lock()
                .unwrap()
                .insert(profile.uid.clone(), profile);
            Ok(())
        }
    }

    fn account(uid: &str) -> Account {
        Account {
            uid: uid.into(),
            email: Some(format!("{uid}@example.com")),
            display_name: None,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn second_run_creates_nothing() {
        let identity = FixedIdentity {
            accounts: vec![account("u1"), account("u2"), account("u3")],
        };
        let profiles = MemoryProfiles::default();

        let first = run_import(&identity, &profiles).await.unwrap();
        assert_eq!(first.created, 3);
        assert_eq!(first.skipped, 0);

        let second = run_import(&identity, &profiles).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(profiles.profiles.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn only_missing_profiles_are_created() {
        let identity = FixedIdentity {
            accounts: vec![account("u1"), account("u2")],
        };
        let profiles = MemoryProfiles::default();
        profiles
            .create_profile(Profile::from_account(&account("u1")))
            .await
            .unwrap();

        let summary = run_import(&identity, &profiles).await.unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 2);
    }
}
