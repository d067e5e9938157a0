use axum::{
    extract::State,
    routing::post,
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenPayload, UserPayload},
        extractors::AuthUser,
        services,
    },
    error::{ApiResult, AppJson, Envelope},
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/users/create", post(register))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", post(login).get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> ApiResult<TokenPayload> {
    let token = services::register(&state, payload).await?;
    Ok(Envelope::ok(TokenPayload { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<TokenPayload> {
    let token = services::login(&state, payload).await?;
    Ok(Envelope::ok(TokenPayload { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<UserPayload> {
    let user = services::current_user(&state, user_id).await?;
    Ok(Envelope::ok(UserPayload { user }))
}

#[cfg(test)]
mod me_tests {
    use crate::auth::dto::PublicUser;

    #[test]
    fn public_user_never_serializes_password() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "test@example.com".to_string(),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("1970-01-01T00:00:00Z"));
        assert!(!json.contains("password"));
    }
}
