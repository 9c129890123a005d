// Canonical records shared by every renderer.
// Built fresh on each request from the typed upstream payloads.

use serde::{Deserialize, Serialize};

/// Kind of account a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    #[default]
    User,
    Organization,
}

impl SubjectKind {
    /// Label for the free-text field (bio for users, description for orgs).
    pub fn about_label(&self) -> &'static str {
        match self {
            SubjectKind::User => "Bio",
            SubjectKind::Organization => "Description",
        }
    }

    /// Label for the gist/member counter.
    pub fn count_label(&self) -> &'static str {
        match self {
            SubjectKind::User => "Public Gists",
            SubjectKind::Organization => "Public Members",
        }
    }
}

/// Normalized view of a user or organization plus its top repositories.
///
/// Field order is the serialized order for JSON and YAML output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProfile {
    pub subject_id: String,
    pub display_name: Option<String>,
    pub bio_or_description: Option<String>,
    pub location: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repo_count: u64,
    pub public_gist_or_member_count: u64,
    pub created_at: String,
    pub top_repositories: Vec<CanonicalRepo>,
    #[serde(default)]
    pub kind: SubjectKind,
}

impl CanonicalProfile {
    /// The repository used for contributor and activity enrichment.
    pub fn top_repository(&self) -> Option<&CanonicalRepo> {
        self.top_repositories.first()
    }
}

/// Normalized repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRepo {
    pub name: String,
    pub stars: u64,
    pub language: Option<String>,
    pub forks: u64,
    pub open_issues: u64,
    pub updated_at: String,
    pub size_kb: Option<u64>,
}

/// Contributor to a repository, by commit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
}

/// One week of commit activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWeek {
    /// Start of the week as a unix timestamp.
    pub week: i64,
    pub total: u64,
    #[serde(default)]
    pub days: Vec<u64>,
}

/// Core API quota as reported by the rate limit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    #[serde(default)]
    pub used: u64,
    /// Reset time as a unix timestamp.
    pub reset: i64,
}

/// Optional data layered on top of a primary profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    /// Repository the enrichment was computed for.
    pub repository: Option<String>,
    pub contributors: Option<Vec<Contributor>>,
    pub activity: Option<Vec<ActivityWeek>>,
}
