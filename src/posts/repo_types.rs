use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Post record. `name` is the author's name when the post was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub text: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user: Uuid,
    pub name: String,
    pub text: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub date: OffsetDateTime,
}

impl NewPost {
    pub fn into_post(self, id: Uuid) -> Post {
        Post {
            id,
            user: self.user,
            name: self.name,
            text: self.text,
            likes: self.likes,
            comments: self.comments,
            date: self.date,
        }
    }
}
