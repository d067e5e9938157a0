use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::{Comment, Like, Post};

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct PostPayload {
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct PostsPayload {
    pub posts: Vec<Post>,
}
