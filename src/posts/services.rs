use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, Violations},
    posts::{
        dto::CreatePostRequest,
        repo_types::{NewPost, Post},
    },
    state::AppState,
};

const NOT_FOUND: &str = "Post not found";

pub async fn create(
    state: &AppState,
    user_id: Uuid,
    req: CreatePostRequest,
) -> Result<Post, AppError> {
    let text = req.text.unwrap_or_default();
    let mut v = Violations::new();
    v.check(!text.trim().is_empty(), "text", "Text is required");
    v.finish()?;

    let author = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let post = state
        .posts
        .create(NewPost {
            user: user_id,
            name: author.name,
            text,
            likes: req.likes,
            comments: req.comments,
            date: req.date.unwrap_or_else(OffsetDateTime::now_utc),
        })
        .await?;
    info!(user_id = %user_id, post_id = %post.id, "post created");
    Ok(post)
}

pub async fn list(state: &AppState) -> Result<Vec<Post>, AppError> {
    Ok(state.posts.list().await?)
}

pub async fn get(state: &AppState, raw_id: &str) -> Result<Post, AppError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound(NOT_FOUND))?;
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))
}

/// Only the owner can delete; anyone else gets `NotFound`.
pub async fn delete(state: &AppState, user_id: Uuid, raw_id: &str) -> Result<Post, AppError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound(NOT_FOUND))?;
    match state.posts.delete_owned(user_id, id).await? {
        Some(post) => {
            info!(user_id = %user_id, post_id = %id, "post deleted");
            Ok(post)
        }
        None => {
            warn!(user_id = %user_id, post_id = %id, "post not found for owner");
            Err(AppError::NotFound(NOT_FOUND))
        }
    }
}
