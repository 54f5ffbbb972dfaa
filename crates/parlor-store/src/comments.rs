use chrono::Utc;
use uuid::Uuid;

use parlor_types::models::Comment;

use crate::error::Result;
use crate::{Store, keys};

impl Store {
    /// The parent post is not checked; comments may outlive their post.
    pub fn create_comment(&self, post_id: Uuid, user_id: Uuid, content: &str) -> Result<Comment> {
        let mut comments: Vec<Comment> = self.load(keys::COMMENTS)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        comments.push(comment.clone());
        self.write(keys::COMMENTS, &comments)?;
        Ok(comment)
    }

    pub fn get_comments(&self, post_id: Uuid) -> Vec<Comment> {
        self.read::<Comment>(keys::COMMENTS)
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .collect()
    }

    pub fn comment_count(&self, post_id: Uuid) -> usize {
        self.read::<Comment>(keys::COMMENTS)
            .iter()
            .filter(|c| c.post_id == post_id)
            .count()
    }
}
