use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use parlor_types::models::Account;

use crate::error::{Result, StoreError};
use crate::{Store, keys};

/// Accounts registered under this username are administrators.
pub const ADMIN_USERNAME: &str = "admin";

impl Store {
    /// Register a new account. Returns `None` if the username or the email
    /// is already taken.
    ///
    /// Hashing runs on the blocking pool; the collection is read again
    /// afterwards so the append never overwrites records written meanwhile.
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        if is_taken(&self.load::<Account>(keys::USERS)?, username, email) {
            info!(username, "Registration rejected: username or email taken");
            return Ok(None);
        }

        let password_hash = hash_password(password.to_string()).await?;

        let mut accounts: Vec<Account> = self.load(keys::USERS)?;
        if is_taken(&accounts, username, email) {
            info!(username, "Registration rejected: username or email taken");
            return Ok(None);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            profile_image: String::new(),
            is_admin: username == ADMIN_USERNAME,
            created_at: Utc::now(),
        };

        accounts.push(account.clone());
        self.write(keys::USERS, &accounts)?;

        info!(user_id = %account.id, username, admin = account.is_admin, "Account created");
        Ok(Some(account))
    }

    /// Look up by email and check the password. Any mismatch is `None`.
    pub async fn validate_account(&self, email: &str, password: &str) -> Result<Option<Account>> {
        let accounts: Vec<Account> = self.load(keys::USERS)?;
        let Some(account) = accounts.into_iter().find(|a| a.email == email) else {
            return Ok(None);
        };

        if verify_password(password.to_string(), account.password.clone()).await? {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    pub fn get_account(&self, id: Uuid) -> Option<Account> {
        self.list_accounts().into_iter().find(|a| a.id == id)
    }

    pub fn get_account_by_username(&self, username: &str) -> Option<Account> {
        self.list_accounts().into_iter().find(|a| a.username == username)
    }

    /// Returns the updated account, or `None` (and writes nothing) if `id`
    /// is unknown.
    pub fn update_profile_image(&self, id: Uuid, profile_image: &str) -> Result<Option<Account>> {
        let mut accounts: Vec<Account> = self.load(keys::USERS)?;
        let Some(account) = accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        account.profile_image = profile_image.to_string();
        let updated = account.clone();

        self.write(keys::USERS, &accounts)?;
        Ok(Some(updated))
    }

    pub fn list_accounts(&self) -> Vec<Account> {
        self.read(keys::USERS)
    }

    /// Case-insensitive substring match on the username. An empty query
    /// matches everyone.
    pub fn search_accounts(&self, query: &str) -> Vec<Account> {
        let needle = query.to_lowercase();
        self.list_accounts()
            .into_iter()
            .filter(|a| a.username.to_lowercase().contains(&needle))
            .collect()
    }
}

fn is_taken(accounts: &[Account], username: &str, email: &str) -> bool {
    accounts
        .iter()
        .any(|a| a.username == username || a.email == email)
}

/// Argon2id with a fresh random salt, as a PHC string.
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::Hash(e.to_string()))
    })
    .await?
}

/// False for a wrong password and for a stored hash that does not parse.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool> {
    let matches = tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash does not parse: {}", e);
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await?;

    Ok(matches)
}
