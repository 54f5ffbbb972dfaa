//! End-to-end checks of the data layer against both storage backends.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use uuid::Uuid;

use parlor_store::{
    KeyValueStorage, MemoryStorage, SessionManager, SqliteStorage, Store, StoreError, keys,
};
use parlor_types::models::{Post, Recipient};

fn memory_store() -> Store {
    Store::new(Arc::new(MemoryStorage::new()))
}

fn temp_db(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parlor_{}_{}.db", name, Uuid::new_v4()))
}

/// Memory storage whose reads can be switched to fail, like a busy or
/// locked database.
#[derive(Clone, Default)]
struct UnreadableStorage {
    items: MemoryStorage,
    failing: Arc<AtomicBool>,
}

impl UnreadableStorage {
    fn fail_reads(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

impl KeyValueStorage for UnreadableStorage {
    fn get_item(&self, key: &str) -> parlor_store::Result<Option<String>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::LockPoisoned("test storage"));
        }
        self.items.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> parlor_store::Result<()> {
        self.items.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> parlor_store::Result<()> {
        self.items.remove_item(key)
    }

    fn keys(&self) -> parlor_store::Result<Vec<String>> {
        self.items.keys()
    }
}

#[tokio::test]
async fn failed_registration_leaves_accounts_unchanged() {
    let store = memory_store();
    store
        .create_account("ada", "ada@example.com", "hunter22")
        .await
        .unwrap()
        .expect("first registration succeeds");
    let before = store.list_accounts();

    let second = store
        .create_account("ada2", "ada@example.com", "different")
        .await
        .unwrap();

    assert!(second.is_none());
    assert_eq!(store.list_accounts(), before);
}

#[tokio::test]
async fn created_credentials_validate_and_wrong_ones_do_not() {
    let store = memory_store();
    let pairs = [
        ("ada", "ada@example.com", "correct horse"),
        ("grace", "grace@example.com", "battery staple"),
    ];
    for (username, email, password) in pairs {
        store.create_account(username, email, password).await.unwrap();
    }

    for (username, email, password) in pairs {
        let found = store.validate_account(email, password).await.unwrap();
        assert_eq!(found.map(|a| a.username), Some(username.to_string()));

        let wrong = format!("{password}!");
        assert!(store.validate_account(email, &wrong).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn post_deletion_requires_owner_or_admin() {
    let store = memory_store();
    let owner = store.create_account("ada", "ada@example.com", "pw1234").await.unwrap().unwrap();
    let stranger = store.create_account("grace", "grace@example.com", "pw1234").await.unwrap().unwrap();
    let admin = store.create_account("admin", "root@example.com", "pw1234").await.unwrap().unwrap();

    let post = store.create_post(owner.id, "hello", None).unwrap();
    let other = store.create_post(owner.id, "second", None).unwrap();
    let before: Vec<Post> = store.get_posts();

    assert!(!store.delete_post(post.id, stranger.id).unwrap());
    assert_eq!(store.get_posts(), before);

    assert!(store.delete_post(post.id, owner.id).unwrap());
    assert_eq!(store.get_posts(), vec![other.clone()]);

    assert!(store.delete_post(other.id, admin.id).unwrap());
    assert!(store.get_posts().is_empty());
}

#[tokio::test]
async fn deleting_a_post_orphans_its_comments() {
    let store = memory_store();
    let owner = store.create_account("ada", "ada@example.com", "pw1234").await.unwrap().unwrap();
    let post = store.create_post(owner.id, "hello", None).unwrap();
    store.create_comment(post.id, owner.id, "first!").unwrap();

    assert!(store.delete_post(post.id, owner.id).unwrap());

    assert_eq!(store.get_comments(post.id).len(), 1);
}

#[test]
fn message_retrieval_modes() {
    let store = memory_store();
    let (ada, grace, alan) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let group = Uuid::new_v4();
    let other_group = Uuid::new_v4();

    let m1 = store.create_message(ada, "hi grace", Some(Recipient::Direct(grace))).unwrap();
    let m2 = store.create_message(grace, "hi ada", Some(Recipient::Direct(ada))).unwrap();
    store.create_message(ada, "hi alan", Some(Recipient::Direct(alan))).unwrap();
    store.create_message(alan, "hi grace", Some(Recipient::Direct(grace))).unwrap();
    let g1 = store.create_message(ada, "group 1", Some(Recipient::Group(group))).unwrap();
    let g2 = store.create_message(alan, "group 2", Some(Recipient::Group(group))).unwrap();
    store.create_message(grace, "elsewhere", Some(Recipient::Group(other_group))).unwrap();

    // any caller sees every message of the group
    assert_eq!(store.get_messages(grace, None, Some(group)), vec![g1, g2]);

    assert_eq!(store.get_messages(ada, Some(grace), None), vec![m1.clone(), m2.clone()]);
    assert_eq!(store.get_messages(grace, Some(ada), None), vec![m1, m2]);
}

#[test]
fn only_the_owner_manages_members() {
    let store = memory_store();
    let (owner, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let group = store.create_group("friends", owner, &[a, b]).unwrap();

    assert!(!store.remove_member(group.id, a, b).unwrap());
    assert_eq!(store.get_group(group.id).unwrap().members, vec![owner, a, b]);

    assert!(store.remove_member(group.id, owner, a).unwrap());
    assert_eq!(store.get_group(group.id).unwrap().members, vec![owner, b]);
}

#[test]
fn session_hydrates_only_before_expiry() {
    let storage = MemoryStorage::new();
    let now = Utc::now();
    let account = parlor_types::models::Account {
        id: Uuid::new_v4(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "$argon2id$stub".into(),
        profile_image: String::new(),
        is_admin: false,
        created_at: now,
    };

    let first_run = SessionManager::new(Store::new(Arc::new(storage.clone())));
    let record = first_run.persist_at(&account, now).unwrap();

    // a fresh start before expiry picks the session up
    let before = SessionManager::new(Store::new(Arc::new(storage.clone())));
    let restored = before.hydrate_at(now + Duration::days(6));
    assert_eq!(restored.map(|a| a.id), Some(account.id));
    assert!(before.is_authenticated());

    // after expiry it is gone, and the record is discarded
    let after = SessionManager::new(Store::new(Arc::new(storage.clone())));
    let expired_at = chrono::DateTime::from_timestamp_millis(record.expires_at).unwrap();
    assert!(after.hydrate_at(expired_at + Duration::seconds(1)).is_none());
    assert!(!after.is_authenticated());
    assert_eq!(storage.get_item(keys::USER_SESSION).unwrap(), None);
}

#[tokio::test]
async fn sqlite_backend_persists_across_reopen() {
    let path = temp_db("reopen");

    let ada_id = {
        let store = Store::new(Arc::new(SqliteStorage::open(&path).unwrap()));
        let ada = store.create_account("ada", "ada@example.com", "pw1234").await.unwrap().unwrap();
        store.create_post(ada.id, "persisted", None).unwrap();
        SessionManager::new(store).persist(&ada).unwrap();
        ada.id
    };

    let store = Store::new(Arc::new(SqliteStorage::open(&path).unwrap()));
    assert_eq!(store.get_posts().len(), 1);
    assert!(store.validate_account("ada@example.com", "pw1234").await.unwrap().is_some());
    assert_eq!(SessionManager::new(store).hydrate().map(|a| a.id), Some(ada_id));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn listeners_fire_once_per_repository_write() {
    let store = memory_store();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let id = store.subscribe(keys::POSTS, move || {
        h.fetch_add(1, Ordering::SeqCst);
    });

    let post = store.create_post(Uuid::new_v4(), "one", None).unwrap();
    store.create_comment(post.id, Uuid::new_v4(), "not a post write").unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert!(store.unsubscribe(keys::POSTS, id));
    store.create_post(Uuid::new_v4(), "two", None).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreadable_storage_never_overwrites_collections() {
    let storage = UnreadableStorage::default();
    let store = Store::new(Arc::new(storage.clone()));
    let ada = store.create_account("ada", "ada@example.com", "pw1234").await.unwrap().unwrap();
    let grace = Uuid::new_v4();
    for content in ["one", "two", "three"] {
        store.create_post(ada.id, content, None).unwrap();
    }
    let post = store.get_posts()[0].clone();
    store.create_comment(post.id, ada.id, "first").unwrap();
    store.create_message(ada.id, "hi", Some(Recipient::Direct(grace))).unwrap();
    let group = store.create_group("friends", ada.id, &[grace]).unwrap();

    let writes = Arc::new(AtomicUsize::new(0));
    for key in [keys::USERS, keys::POSTS, keys::COMMENTS, keys::MESSAGES, keys::GROUPS] {
        let w = writes.clone();
        store.subscribe(key, move || {
            w.fetch_add(1, Ordering::SeqCst);
        });
    }

    storage.fail_reads(true);

    assert!(store.create_post(ada.id, "four", None).is_err());
    assert!(store.delete_post(post.id, ada.id).is_err());
    assert!(store.create_comment(post.id, ada.id, "second").is_err());
    assert!(store.create_message(ada.id, "again", None).is_err());
    assert!(store.create_group("others", ada.id, &[grace]).is_err());
    assert!(store.add_member(group.id, ada.id, Uuid::new_v4()).is_err());
    assert!(store.remove_member(group.id, ada.id, grace).is_err());
    assert!(store.update_members(group.id, ada.id, &[]).is_err());
    assert!(store.update_profile_image(ada.id, "x").is_err());
    assert!(store.create_account("alan", "alan@example.com", "pw1234").await.is_err());
    assert!(store.validate_account("ada@example.com", "pw1234").await.is_err());

    // display reads fall back to empty
    assert!(store.get_posts().is_empty());
    assert_eq!(writes.load(Ordering::SeqCst), 0);

    storage.fail_reads(false);

    assert_eq!(store.get_posts().len(), 3);
    assert_eq!(store.get_comments(post.id).len(), 1);
    assert_eq!(store.get_messages(ada.id, None, None).len(), 1);
    assert_eq!(store.get_group(group.id).unwrap().members, vec![ada.id, grace]);
    assert_eq!(store.list_accounts(), vec![ada]);
}

#[test]
fn session_survives_an_unreadable_start() {
    let storage = UnreadableStorage::default();
    let account = parlor_types::models::Account {
        id: Uuid::new_v4(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "$argon2id$stub".into(),
        profile_image: String::new(),
        is_admin: false,
        created_at: Utc::now(),
    };
    SessionManager::new(Store::new(Arc::new(storage.clone())))
        .persist(&account)
        .unwrap();

    storage.fail_reads(true);
    assert!(SessionManager::new(Store::new(Arc::new(storage.clone()))).hydrate().is_none());

    // the saved record was left alone
    storage.fail_reads(false);
    let restored = SessionManager::new(Store::new(Arc::new(storage))).hydrate();
    assert_eq!(restored.map(|a| a.id), Some(account.id));
}
