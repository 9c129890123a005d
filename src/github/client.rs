// GitHub API HTTP client.
// Handles optional authentication, rate limit headers, and status-to-error mapping.

use std::future::Future;
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StatsError};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of upstream JSON documents.
///
/// Implemented by [`GitHubClient`] and by in-process fakes in tests.
pub trait Transport {
    /// GET `endpoint` with query `params` and decode the JSON body.
    fn get_json(
        &mut self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Whether requests carry an access token.
    fn has_token(&self) -> bool;
}

/// GitHub API client with optional authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    rate_limit: RateLimit,
    authenticated: bool,
}

impl GitHubClient {
    /// Create a new GitHub client, authenticated when a non-empty token is given.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StatsError::Config(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("ghstats-cli"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            rate_limit: RateLimit::default(),
            authenticated: token.is_some(),
        })
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &mut self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", GITHUB_API_BASE, endpoint);
        debug!(%url, "GET");
        let response = self.client.get(&url).query(params).send().await?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK | StatusCode::ACCEPTED => Ok(response),
            StatusCode::NOT_FOUND => {
                let url = response.url().path().to_string();
                Err(StatsError::NotFound(not_found_subject(&url)))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(StatsError::RateLimited {
                reset_at: format_reset(self.rate_limit.reset),
            }),
            status => Err(StatsError::Upstream {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

impl Transport for GitHubClient {
    async fn get_json(&mut self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let response = self.get_with_params(endpoint, params).await?;
        Ok(response.json().await?)
    }

    fn has_token(&self) -> bool {
        self.authenticated
    }
}

/// Name the missing subject from a request path (`/users/octocat/repos` -> `octocat`).
fn not_found_subject(path: &str) -> String {
    let mut segments = path.trim_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("repos"), Some(owner), Some(repo)) => format!("{}/{}", owner, repo),
        (Some(_), Some(subject), _) => subject.to_string(),
        _ => path.to_string(),
    }
}

/// Format a unix reset timestamp as a local wall-clock time.
fn format_reset(reset: u64) -> String {
    chrono::DateTime::from_timestamp(reset as i64, 0)
        .filter(|_| reset > 0)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
