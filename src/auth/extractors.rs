use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AppError;

pub const AUTH_HEADER: &str = "x-auth-token";
pub const NO_TOKEN: &str = "No token, authorization failed.";
pub const INVALID_TOKEN: &str = "Token is not valid.";

/// Extracts and validates the `x-auth-token` JWT, returning the user ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthenticated(NO_TOKEN))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthenticated(INVALID_TOKEN)
        })?;

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::Request;

    #[derive(Clone)]
    struct TestState(JwtKeys);

    impl FromRef<TestState> for JwtKeys {
        fn from_ref(state: &TestState) -> Self {
            state.0.clone()
        }
    }

    fn state() -> TestState {
        TestState(JwtKeys::new(&JwtConfig {
            secret: "gate-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_seconds: 60,
        }))
    }

    async fn extract(header: Option<&str>, st: &TestState) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(AUTH_HEADER, h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, st).await
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let err = extract(None, &state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(NO_TOKEN)));
        let err = extract(Some("  "), &state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(NO_TOKEN)));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected() {
        let err = extract(Some("garbage"), &state()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(INVALID_TOKEN)));
    }

    #[tokio::test]
    async fn valid_token_yields_user() {
        let st = state();
        let user_id = Uuid::new_v4();
        let token = st.0.issue(user_id).unwrap();
        let AuthUser(got) = extract(Some(&token), &st).await.unwrap();
        assert_eq!(got, user_id);
    }
}
