//! Payloads crossing the UI boundary. Field names match the persisted
//! records (camelCase).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Post, Recipient};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPostRequest {
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCommentRequest {
    pub post_id: Uuid,
    pub content: String,
}

/// A post as the home feed shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    #[serde(flatten)]
    pub post: Post,
    /// `None` when the author's account no longer exists.
    pub author_username: Option<String>,
    pub comment_count: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub receiver_id: Option<Uuid>,
    #[serde(default)]
    pub group_id: Option<Uuid>,
}

impl SendMessageRequest {
    /// Group wins when a caller fills in both targets.
    pub fn recipient(&self) -> Option<Recipient> {
        match (self.group_id, self.receiver_id) {
            (Some(id), _) => Some(Recipient::Group(id)),
            (None, Some(id)) => Some(Recipient::Direct(id)),
            (None, None) => None,
        }
    }
}

// -- Groups --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGroupRequest {
    pub name: String,
    pub members: Vec<Uuid>,
}

// -- Settings --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub profile_image: String,
}
