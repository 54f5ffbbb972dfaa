use uuid::Uuid;

use parlor_types::api::{FeedEntry, NewCommentRequest, NewPostRequest};
use parlor_types::models::{Comment, Post};

use crate::{App, Notice, require_text};

impl App {
    pub fn publish_post(&self, req: NewPostRequest) -> Result<Post, Notice> {
        let user = self.require_user()?;
        require_text(&req.content, "Post content cannot be empty")?;

        let image_url = req.image_url.as_deref().map(str::trim).filter(|url| !url.is_empty());
        Ok(self.store.create_post(user.id, &req.content, image_url)?)
    }

    pub fn add_comment(&self, req: NewCommentRequest) -> Result<Comment, Notice> {
        let user = self.require_user()?;
        require_text(&req.content, "Comment cannot be empty")?;

        Ok(self.store.create_comment(req.post_id, user.id, &req.content)?)
    }

    pub fn delete_post(&self, post_id: Uuid) -> Result<(), Notice> {
        let user = self.require_user()?;
        if self.store.delete_post(post_id, user.id)? {
            Ok(())
        } else {
            Err(Notice::Rejected("You can only delete your own posts"))
        }
    }

    /// Newest first, with author names and comment counts filled in.
    pub fn feed(&self) -> Vec<FeedEntry> {
        self.store
            .feed()
            .into_iter()
            .map(|post| FeedEntry {
                author_username: self.store.get_account(post.user_id).map(|a| a.username),
                comment_count: self.store.comment_count(post.id),
                post,
            })
            .collect()
    }

    pub fn comments(&self, post_id: Uuid) -> Vec<Comment> {
        self.store.get_comments(post_id)
    }
}
