use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// One entry of the `errors` array in a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<&'static str>,
}

impl FieldError {
    pub fn new(param: &'static str, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: Some(param),
        }
    }

    fn message(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    AlreadyExists(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Upstream(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AlreadyExists(_) | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors(self) -> Vec<FieldError> {
        match self {
            Self::Validation(errors) => errors,
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                vec![FieldError::message("Server Error")]
            }
            other => vec![FieldError::message(other.to_string())],
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    /// Internal errors are logged here and surfaced as a generic `500`.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            errors: self.errors(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::message(rejection.body_text())])
    }
}

impl From<crate::db::StoreError> for AppError {
    fn from(e: crate::db::StoreError) -> Self {
        AppError::Internal(e.into())
    }
}

/// Success envelope: `{"success": true, ...payload}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Json<Self> {
        Json(Self {
            success: true,
            payload,
        })
    }
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

/// JSON body extractor whose rejections use the error envelope.
#[derive(axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Collects field violations, failing with every one of them at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, param: &'static str, msg: &'static str) {
        if !ok {
            self.0.push(FieldError::new(param, msg));
        }
    }

    pub fn push(&mut self, param: &'static str, msg: &'static str) {
        self.0.push(FieldError::new(param, msg));
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}
