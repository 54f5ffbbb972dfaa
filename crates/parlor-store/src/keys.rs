//! Storage keys. Each collection lives in full under exactly one key.

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const COMMENTS: &str = "comments";
pub const MESSAGES: &str = "messages";
pub const GROUPS: &str = "groups";
pub const USER_SESSION: &str = "user_session";
