//! # ps-auth-simple
//!
//! Argon2-based implementation of `IdentityProvider`.
//! The admin password is verified against a stored Argon2 hash; accounts are
//! read from a JSON export of the external identity service (the service
//! itself owns authentication, this plugin only consumes its records).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use ps_core::models::Account;
use ps_core::traits::IdentityProvider;
use std::path::PathBuf;
use tokio::fs;

pub struct SimpleIdentityProvider {
    /// Argon2 PHC-format hash of the admin password (from the environment).
    admin_password_hash: String,
    /// JSON export of the identity service's accounts, for the bulk import.
    accounts_path: Option<PathBuf>,
}

impl SimpleIdentityProvider {
    pub fn new(admin_password_hash: &str) -> Self {
        Self {
            admin_password_hash: admin_password_hash.to_string(),
            accounts_path: None,
        }
    }

    pub fn with_accounts_file(mut self, path: PathBuf) -> Self {
        self.accounts_path = Some(path);
        self
    }

    /// One-off helper for provisioning the admin hash.
    pub fn hash_password(password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))?;
        Ok(hash.to_string())
    }
}

#[async_trait]
impl IdentityProvider for SimpleIdentityProvider {
    /// Verifies if a provided password matches the stored Argon2 hash.
    async fn verify_admin_password(&self, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&self.admin_password_hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// All accounts known to the identity service. A missing export file
    /// reads as an empty account set rather than an error.
    async fn list_accounts(&self) -> anyhow::Result<Vec<Account>> {
        let Some(path) = &self.accounts_path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            log::warn!("account export {} not found, treating as empty", path.display());
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path).await?;
        let accounts: Vec<Account> = serde_json::from_str(&raw)?;
        Ok(accounts)
    }
}
