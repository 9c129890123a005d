// GitHub API response types.
// Typed upstream payloads; required fields are non-optional so a missing one fails to parse.

use serde::{Deserialize, Serialize};

/// `GET /users/{username}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub public_gists: u64,
    pub created_at: String,
}

/// `GET /orgs/{org}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgPayload {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    #[serde(default)]
    pub public_members_count: u64,
    pub created_at: String,
}

/// Entry of `GET /users/{username}/repos` and `GET /orgs/{org}/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoPayload {
    pub name: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub updated_at: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Entry of `GET /repos/{owner}/{repo}/contributors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorPayload {
    pub login: String,
    pub contributions: u64,
}

/// Entry of `GET /repos/{owner}/{repo}/stats/commit_activity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityWeekPayload {
    pub week: i64,
    pub total: u64,
    #[serde(default)]
    pub days: Vec<u64>,
}

/// `GET /rate_limit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitPayload {
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResource {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
    #[serde(default)]
    pub used: u64,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
