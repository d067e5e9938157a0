use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiResult, AppJson, Envelope},
    profiles::{
        dto::{
            EducationRequest, ExperienceRequest, MessagePayload, ProfilePayload, ProfileRequest,
            ProfilesPayload, ReposPayload,
        },
        repo_types::{EntryKind, Profile, ProfileWithUser, SubEntry},
        services,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(list_profiles).post(submit_profile).delete(delete_profile),
        )
        .route("/profile/me", get(get_my_profile))
        .route("/profile/user/:user_id", get(get_profile_by_user))
        .route("/profile/github/:username", get(github_repos))
}

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> ApiResult<ProfilesPayload<ProfileWithUser>> {
    let profiles = services::list(&state).await?;
    Ok(Envelope::ok(ProfilesPayload { profiles }))
}

#[instrument(skip(state, payload))]
pub async fn submit_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ProfileRequest>,
) -> ApiResult<ProfilePayload<Profile>> {
    let profile = services::submit(&state, user_id, payload).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<MessagePayload> {
    services::remove(&state, user_id).await?;
    Ok(Envelope::ok(MessagePayload {
        msg: "Profile successfully removed",
    }))
}

#[instrument(skip(state))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<ProfilePayload<ProfileWithUser>> {
    let profile = services::me(&state, user_id).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state))]
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ProfilePayload<ProfileWithUser>> {
    let profile = services::get(&state, &user_id).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> ApiResult<ProfilePayload<Profile>> {
    let entry = services::build_experience(payload)?;
    let profile = services::add_entry(&state, user_id, SubEntry::Experience(entry)).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> ApiResult<ProfilePayload<Profile>> {
    let profile =
        services::remove_entry(&state, user_id, EntryKind::Experience, &exp_id).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<EducationRequest>,
) -> ApiResult<ProfilePayload<Profile>> {
    let entry = services::build_education(payload)?;
    let profile = services::add_entry(&state, user_id, SubEntry::Education(entry)).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> ApiResult<ProfilePayload<Profile>> {
    let profile =
        services::remove_entry(&state, user_id, EntryKind::Education, &edu_id).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

#[instrument(skip(state))]
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<ReposPayload> {
    let repos = state.github.oldest_repos(&username).await?;
    Ok(Envelope::ok(ReposPayload { repos }))
}
