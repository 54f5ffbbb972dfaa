use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use parlor_types::models::{Account, Post};

use crate::error::Result;
use crate::{Store, keys};

impl Store {
    pub fn create_post(&self, user_id: Uuid, content: &str, image_url: Option<&str>) -> Result<Post> {
        let mut posts: Vec<Post> = self.load(keys::POSTS)?;
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            image_url: image_url.map(str::to_string),
            created_at: Utc::now(),
        };

        posts.push(post.clone());
        self.write(keys::POSTS, &posts)?;
        Ok(post)
    }

    /// All posts in storage order (oldest first).
    pub fn get_posts(&self) -> Vec<Post> {
        self.read(keys::POSTS)
    }

    /// All posts, newest first.
    pub fn feed(&self) -> Vec<Post> {
        let mut posts = self.get_posts();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn get_post(&self, id: Uuid) -> Option<Post> {
        self.get_posts().into_iter().find(|p| p.id == id)
    }

    /// Delete a post on behalf of `user_id`, who must own it or be an
    /// administrator. `Ok(false)` when the post is missing or the caller
    /// is not allowed. Comments on the post are left in place.
    pub fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut posts: Vec<Post> = self.load(keys::POSTS)?;
        let Some(index) = posts.iter().position(|p| p.id == post_id) else {
            return Ok(false);
        };

        let is_owner = posts[index].user_id == user_id;
        let is_admin = self
            .load::<Account>(keys::USERS)?
            .iter()
            .any(|a| a.id == user_id && a.is_admin);
        if !is_owner && !is_admin {
            warn!(%post_id, %user_id, "Post deletion refused: not owner or admin");
            return Ok(false);
        }

        posts.remove(index);
        self.write(keys::POSTS, &posts)?;

        info!(%post_id, %user_id, by_admin = !is_owner, "Post deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use chrono::Duration;
    use std::sync::Arc;

    fn store() -> Store {
        Store::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn create_appends_in_order() {
        let store = store();
        let author = Uuid::new_v4();
        let first = store.create_post(author, "first", None).unwrap();
        let second = store.create_post(author, "second", Some("https://img.example/2.png")).unwrap();

        let posts = store.get_posts();
        assert_eq!(posts, vec![first, second.clone()]);
        assert_eq!(store.get_post(second.id).unwrap().image_url.as_deref(), Some("https://img.example/2.png"));
    }

    #[test]
    fn feed_is_newest_first() {
        let store = store();
        let author = Uuid::new_v4();
        let mut older = store.create_post(author, "older", None).unwrap();
        let newer = store.create_post(author, "newer", None).unwrap();

        // force a clear ordering regardless of clock resolution
        older.created_at = newer.created_at - Duration::seconds(60);
        store.write(keys::POSTS, &[older.clone(), newer.clone()]).unwrap();

        let feed: Vec<String> = store.feed().into_iter().map(|p| p.content).collect();
        assert_eq!(feed, vec!["newer", "older"]);
    }

    #[test]
    fn unknown_post_cannot_be_deleted() {
        let store = store();
        assert!(!store.delete_post(Uuid::new_v4(), Uuid::new_v4()).unwrap());
    }
}
