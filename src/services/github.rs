use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::GithubConfig;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("no GitHub account for '{0}'")]
    NoAccount(String),

    #[error("invalid GitHub API base URL: {0}")]
    InvalidBase(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Forwards repository listings from the GitHub REST API
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http, config })
    }

    /// `{api_base}/users/{username}/repos`, five newest repositories
    pub fn repos_url(&self, username: &str) -> Result<Url, GithubError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| GithubError::InvalidBase(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| GithubError::InvalidBase(self.config.api_base.clone()))?
            .pop_if_empty()
            .extend(["users", username, "repos"]);

        url.query_pairs_mut()
            .append_pair("per_page", "5")
            .append_pair("sort", "created")
            .append_pair("direction", "desc");

        Ok(url)
    }

    pub async fn latest_repos(&self, username: &str) -> Result<Value, GithubError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GithubError::NoAccount(username.to_string()));
        }

        let mut request = self.http.get(self.repos_url(username)?);
        if let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(
                "GitHub answered {} for user '{}'",
                response.status(),
                username
            );
            return Err(GithubError::NoAccount(username.to_string()));
        }

        Ok(response.json::<Value>().await?)
    }
}
