use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use parlor_types::models::{Account, SessionRecord};

use crate::error::{Result, StoreError};
use crate::{Store, keys};

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// The currently signed-in account, persisted under `user_session`.
///
/// Expiry is absolute: a session lasts `ttl` from the moment it was
/// persisted and is never extended by activity. The manager does not
/// consult the account collection; the session holds its own snapshot.
pub struct SessionManager {
    store: Store,
    ttl: Duration,
    current: RwLock<Option<Account>>,
}

impl SessionManager {
    pub fn new(store: Store) -> Self {
        Self::with_ttl(store, Duration::days(DEFAULT_SESSION_TTL_DAYS))
    }

    pub fn with_ttl(store: Store, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            current: RwLock::new(None),
        }
    }

    /// Load the persisted session on start-up.
    pub fn hydrate(&self) -> Option<Account> {
        self.hydrate_at(Utc::now())
    }

    /// Like [`hydrate`](Self::hydrate) with an explicit "now". A record
    /// that has expired is deleted.
    pub fn hydrate_at(&self, now: DateTime<Utc>) -> Option<Account> {
        let record: SessionRecord = match self.store.read_value(keys::USER_SESSION) {
            Ok(record) => record?,
            Err(e) => {
                // the record may still be valid; leave it for the next start
                warn!("Failed to read saved session: {}", e);
                return None;
            }
        };

        if !record.is_valid_at(now) {
            info!(user_id = %record.user.id, "Discarding expired session");
            if let Err(e) = self.store.remove(keys::USER_SESSION) {
                warn!("Failed to discard expired session: {}", e);
            }
            return None;
        }

        info!(user_id = %record.user.id, username = %record.user.username, "Session restored");
        self.set_user(Some(record.user.clone()));
        Some(record.user)
    }

    /// Persist `account` as the signed-in user and make it current.
    pub fn persist(&self, account: &Account) -> Result<SessionRecord> {
        self.persist_at(account, Utc::now())
    }

    pub fn persist_at(&self, account: &Account, now: DateTime<Utc>) -> Result<SessionRecord> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(StoreError::ExpiryOutOfRange)?;
        let record = SessionRecord {
            user: account.clone(),
            expires_at: expires_at.timestamp_millis(),
        };

        self.store.write_value(keys::USER_SESSION, &record)?;
        self.set_user(Some(account.clone()));
        Ok(record)
    }

    /// Sign out: drop the persisted record and the in-memory user.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(keys::USER_SESSION)?;
        self.set_user(None);
        Ok(())
    }

    pub fn current(&self) -> Option<Account> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the in-memory user without touching storage.
    pub fn set_user(&self, account: Option<Account>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = account;
    }
}
