use anyhow::Context;
use reqwest::{StatusCode, Url};
use tracing::{instrument, warn};

use crate::{config::GithubConfig, error::AppError};

const PAGE_SIZE: &str = "5";

/// Client for the public GitHub repository listing.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubClient {
    pub fn new(cfg: &GithubConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build github http client")?;
        Ok(Self {
            http,
            api_base: cfg.api_base.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        })
    }

    fn repos_url(&self, username: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.api_base).context("parse github api base")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("github api base cannot carry a path"))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", PAGE_SIZE)
            .append_pair("sort", "created")
            .append_pair("direction", "asc");
        Ok(url)
    }

    /// The user's five oldest repositories, passed through as returned.
    #[instrument(skip(self))]
    pub async fn oldest_repos(&self, username: &str) -> Result<serde_json::Value, AppError> {
        let url = self.repos_url(username)?;
        let mut req = self.http.get(url);
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            req = req.basic_auth(id, Some(secret));
        }

        let res = req.send().await.map_err(|e| {
            warn!(error = %e, "github request failed");
            AppError::Upstream("Github is unavailable")
        })?;
        match res.status() {
            StatusCode::OK => res.json().await.map_err(|e| {
                warn!(error = %e, "github returned an unreadable body");
                AppError::Upstream("Github is unavailable")
            }),
            StatusCode::NOT_FOUND => Err(AppError::NotFound("Github profile not found")),
            status => {
                warn!(%status, "github returned an unexpected status");
                Err(AppError::Upstream("Github is unavailable"))
            }
        }
    }
}
