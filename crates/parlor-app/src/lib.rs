pub mod auth;
pub mod chat;
pub mod config;
pub mod feed;
pub mod settings;

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use parlor_store::{
    KeyValueStorage, MemoryStorage, SessionManager, SqliteStorage, StorageSignal, Store, StoreError,
};
use parlor_types::models::Account;

use crate::config::AppConfig;

/// What the user gets told when an action does not go through.
///
/// Data-layer failures are never shown in detail: they are logged and
/// collapse into [`Notice::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Notice {
    /// The input was rejected before touching storage.
    #[error("{0}")]
    Invalid(&'static str),

    /// The data layer answered "not found" or "not allowed".
    #[error("{0}")]
    Rejected(&'static str),

    #[error("Please sign in first")]
    SignedOut,

    #[error("Something went wrong")]
    Failed,
}

impl From<StoreError> for Notice {
    fn from(e: StoreError) -> Self {
        error!("Data layer failure: {}", e);
        Notice::Failed
    }
}

/// Counts of every stored collection, logged at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub accounts: usize,
    pub posts: usize,
    pub comments: usize,
    pub messages: usize,
    pub groups: usize,
}

/// Everything a front end needs: one store, one session, one config.
/// Built once during setup and passed to whatever renders the pages.
pub struct App {
    config: AppConfig,
    store: Store,
    session: SessionManager,
    /// Re-delivers other contexts' writes to this store's listeners.
    storage_events: Option<JoinHandle<()>>,
}

impl App {
    /// Open the configured backend and restore any saved session.
    pub fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match config.db_file() {
            Some(path) => Arc::new(SqliteStorage::open(&path)?),
            None => {
                info!("Using in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        };

        Ok(Self::with_storage(config, storage, None))
    }

    /// Build over an existing backend. Pass a `signal` shared with other
    /// contexts over the same backend to receive their change events; they
    /// are delivered by a task on the current tokio runtime.
    pub fn with_storage(
        config: AppConfig,
        storage: Arc<dyn KeyValueStorage>,
        signal: Option<StorageSignal>,
    ) -> Self {
        let (store, storage_events) = match signal {
            Some(signal) => {
                let rx = signal.subscribe();
                let store = Store::with_signal(storage, signal);
                let pump = match tokio::runtime::Handle::try_current() {
                    Ok(handle) => Some(handle.spawn(store.clone().run_storage_events(rx))),
                    Err(_) => {
                        warn!("No tokio runtime; changes from other contexts will not be delivered");
                        None
                    }
                };
                (store, pump)
            }
            None => (Store::new(storage), None),
        };
        let session = SessionManager::with_ttl(store.clone(), config.session_ttl());
        session.hydrate();

        Self {
            config,
            store,
            session,
            storage_events,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn summary(&self) -> Summary {
        use parlor_store::keys;
        use parlor_types::models::{Comment, Group, Message};

        Summary {
            accounts: self.store.list_accounts().len(),
            posts: self.store.get_posts().len(),
            comments: self.store.read::<Comment>(keys::COMMENTS).len(),
            messages: self.store.read::<Message>(keys::MESSAGES).len(),
            groups: self.store.read::<Group>(keys::GROUPS).len(),
        }
    }

    fn require_user(&self) -> Result<Account, Notice> {
        self.session.current().ok_or(Notice::SignedOut)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // the task holds a store clone, and with it a signal sender, so it
        // would never see the channel close on its own
        if let Some(task) = self.storage_events.take() {
            task.abort();
        }
    }
}

/// Install the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=debug,parlor_app=debug,parlor_store=debug".into()),
        )
        .init();
}

/// Rejects blank (all-whitespace) text.
fn require_text(text: &str, notice: &'static str) -> Result<(), Notice> {
    if text.trim().is_empty() {
        return Err(Notice::Invalid(notice));
    }
    Ok(())
}
