use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiResult, AppJson, Envelope},
    posts::{
        dto::{CreatePostRequest, PostPayload, PostsPayload},
        services,
    },
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).delete(delete_post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> ApiResult<PostPayload> {
    let post = services::create(&state, user_id, payload).await?;
    Ok(Envelope::ok(PostPayload { post }))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> ApiResult<PostsPayload> {
    let posts = services::list(&state).await?;
    Ok(Envelope::ok(PostsPayload { posts }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<PostPayload> {
    let post = services::get(&state, &id).await?;
    Ok(Envelope::ok(PostPayload { post }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<PostPayload> {
    let post = services::delete(&state, user_id, &id).await?;
    Ok(Envelope::ok(PostPayload { post }))
}
