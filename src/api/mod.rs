//! HTTP client for the Tree Hole endpoints.
//!
//! This module provides:
//! - [`TreeHoleApi`] trait for abstracting server access
//! - [`ApiClient`] production client backed by reqwest
//! - [`MockApi`] scripted client for tests, no network access
//!
//! Authenticated endpoints are guarded locally: when no session/CSRF
//! credentials are configured the client returns [`ApiError::AuthRequired`]
//! before any request leaves the process.

pub mod mock;

pub use mock::MockApi;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Deserialize;

use crate::models::{FlagOutcome, SearchSuggestions, VoteKind, VoteOutcome, VoteTarget};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No credentials configured, or the server answered 403.
    #[error("login required")]
    AuthRequired,
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered 2xx with `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("unexpected response body: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Server operations used by the interaction layer.
#[async_trait]
pub trait TreeHoleApi: Send + Sync {
    /// Whether credentials are present. Vote and flag requests are not
    /// attempted without them.
    fn has_credentials(&self) -> bool;

    /// Cast, toggle or switch a vote. Returns the authoritative counts.
    async fn vote(&self, target: &VoteTarget, kind: VoteKind) -> Result<VoteOutcome>;

    /// Flag a post or comment for moderator review. A duplicate flag comes
    /// back as `success: false` with a message, not as an error.
    async fn flag(&self, target: &VoteTarget) -> Result<FlagOutcome>;

    /// Autocomplete for the search box.
    async fn search_suggestions(&self, query: &str) -> Result<SearchSuggestions>;

    /// Tag suggestions for a draft post.
    async fn suggest_tags(&self, title: &str, body: &str) -> Result<Vec<String>>;
}

/// Session credentials for authenticated endpoints.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub session_id: String,
    pub csrf_token: String,
}

pub struct ApiClient {
    base_url: String,
    credentials: Option<Credentials>,
    client: ReqwestClient,
}

/// Raw vote response. Failure bodies carry only `success` and `message`,
/// so everything else stays optional until `success` has been checked.
#[derive(Debug, Deserialize)]
struct VoteResponseBody {
    success: bool,
    #[serde(default)]
    message: String,
    net_votes: Option<i64>,
    upvotes_count: Option<i64>,
    downvotes_count: Option<i64>,
    user_vote: Option<VoteKind>,
}

#[derive(Debug, Deserialize)]
struct SuggestTagsBody {
    #[serde(default)]
    tags: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client: ReqwestClient::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Attach the AJAX marker plus session and CSRF headers when present.
    fn decorate(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("X-Requested-With", "XMLHttpRequest");
        match &self.credentials {
            Some(creds) => request
                .header("X-CSRFToken", creds.csrf_token.clone())
                .header(
                    reqwest::header::COOKIE,
                    format!(
                        "sessionid={}; csrftoken={}",
                        creds.session_id, creds.csrf_token
                    ),
                ),
            None => request,
        }
    }

    fn require_credentials(&self) -> Result<()> {
        if self.credentials.is_none() {
            return Err(ApiError::AuthRequired);
        }
        Ok(())
    }

    fn check_status(status: StatusCode) -> Result<()> {
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::AuthRequired);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        Ok(())
    }
}

#[async_trait]
impl TreeHoleApi for ApiClient {
    fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    async fn vote(&self, target: &VoteTarget, kind: VoteKind) -> Result<VoteOutcome> {
        self.require_credentials()?;

        let url = self.url(&target.vote_path(kind));
        debug!("POST {}", url);
        let response = self.decorate(self.client.post(&url)).send().await?;
        Self::check_status(response.status())?;

        let body: VoteResponseBody = response.json().await?;
        if !body.success {
            return Err(ApiError::Rejected(body.message));
        }
        match (body.net_votes, body.upvotes_count, body.downvotes_count) {
            (Some(net_votes), Some(upvotes_count), Some(downvotes_count)) => Ok(VoteOutcome {
                message: body.message,
                net_votes,
                upvotes_count,
                downvotes_count,
                user_vote: body.user_vote,
            }),
            _ => Err(ApiError::InvalidResponse(
                "vote response is missing the vote counts".to_string(),
            )),
        }
    }

    async fn flag(&self, target: &VoteTarget) -> Result<FlagOutcome> {
        self.require_credentials()?;

        let url = self.url(&target.flag_path());
        debug!("POST {}", url);
        let response = self.decorate(self.client.post(&url)).send().await?;
        Self::check_status(response.status())?;

        Ok(response.json().await?)
    }

    async fn search_suggestions(&self, query: &str) -> Result<SearchSuggestions> {
        let url = self.url("api/search-suggestions/");
        let response = self
            .decorate(self.client.get(&url).query(&[("q", query)]))
            .send()
            .await?;
        Self::check_status(response.status())?;

        Ok(response.json().await?)
    }

    async fn suggest_tags(&self, title: &str, body: &str) -> Result<Vec<String>> {
        self.require_credentials()?;

        let url = self.url("api/suggest-tags/");
        let response = self
            .decorate(
                self.client
                    .post(&url)
                    .json(&serde_json::json!({ "title": title, "body": body })),
            )
            .send()
            .await?;
        Self::check_status(response.status())?;

        let body: SuggestTagsBody = response.json().await?;
        Ok(body.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_credentials() -> ApiClient {
        ApiClient::new("https://treehole.example/", None)
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = client_without_credentials();
        assert_eq!(
            client.url("posts/42/upvote/"),
            "https://treehole.example/posts/42/upvote/"
        );
    }

    #[tokio::test]
    async fn vote_without_credentials_short_circuits() {
        let client = client_without_credentials();
        let result = client
            .vote(&VoteTarget::Post("42".to_string()), VoteKind::Upvote)
            .await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
    }

    #[tokio::test]
    async fn flag_without_credentials_short_circuits() {
        let client = client_without_credentials();
        let result = client.flag(&VoteTarget::Comment("7".to_string())).await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
    }

    #[test]
    fn failure_body_decodes_without_counts() {
        let body: VoteResponseBody =
            serde_json::from_str(r#"{"success": false, "message": "Invalid method"}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.message, "Invalid method");
        assert!(body.net_votes.is_none());
    }
}
