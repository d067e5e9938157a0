use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        repo_types::{NewUser, User},
    },
    db::StoreError,
    error::{AppError, Violations},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: Option<String>) -> String {
    email.unwrap_or_default().trim().to_lowercase()
}

async fn hash_password(state: &AppState, password: String) -> Result<String, AppError> {
    let hasher = state.hasher.clone();
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("join password hashing task")??;
    Ok(hash)
}

async fn verify_password(state: &AppState, password: String, hash: String) -> Result<bool, AppError> {
    let hasher = state.hasher.clone();
    let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .context("join password verify task")?;
    Ok(ok)
}

fn issue_token(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    state
        .keys
        .issue(user_id)
        .map_err(|e| AppError::Internal(e.into()))
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<String, AppError> {
    let name = req.name.unwrap_or_default().trim().to_string();
    let email = normalize_email(req.email);
    let password = req.password.unwrap_or_default();

    let mut v = Violations::new();
    v.check(!name.is_empty(), "name", "Name is required");
    v.check(is_valid_email(&email), "email", "Please include a valid email");
    v.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        "password",
        "Please enter a password with 8 or more characters",
    );
    v.finish()?;

    if state.users.find_by_name_and_email(&name, &email).await?.is_some() {
        warn!(email = %email, "user already exists");
        return Err(AppError::AlreadyExists("User already exists"));
    }

    let password_hash = hash_password(state, password).await?;
    let user = match state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::Duplicate) => {
            warn!("email already registered");
            return Err(AppError::AlreadyExists("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    issue_token(state, user.id)
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<String, AppError> {
    let email = normalize_email(req.email);
    let password = req.password.unwrap_or_default();

    let mut v = Violations::new();
    v.check(is_valid_email(&email), "email", "Please include a valid email");
    v.check(!password.is_empty(), "password", "Password is required");
    v.finish()?;

    let Some(User {
        id, password_hash, ..
    }) = state.users.find_by_email(&email).await?
    else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(state, password, password_hash).await? {
        warn!(email = %email, user_id = %id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %id, "user logged in");
    issue_token(state, id)
}

pub async fn current_user(state: &AppState, user_id: Uuid) -> Result<PublicUser, AppError> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .map(PublicUser::from)
        .ok_or(AppError::NotFound("User not found"))
}
