// Upstream payload normalization.
// Turns raw GitHub JSON into canonical records and derives health scores and language counts.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, StatsError};
use crate::github::{
    ActivityWeekPayload, ContributorPayload, OrgPayload, RateLimitPayload, RepoPayload,
    UserPayload,
};
use crate::model::{
    ActivityWeek, CanonicalProfile, CanonicalRepo, Contributor, RateLimitStatus, SubjectKind,
};

/// Days since the last update that still earn the recency bonus.
pub const RECENT_UPDATE_DAYS: i64 = 30;

/// Health points granted to recently updated repositories.
pub const RECENT_UPDATE_BONUS: i64 = 10;

/// Bucket for repositories without a detected language.
pub const OTHER_LANGUAGE: &str = "Others";

/// Decode `value` as `T`, reporting missing or mistyped fields as a malformed response.
fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| StatsError::MalformedResponse(format!("{}: {}", what, e)))
}

/// Validate a user profile payload.
pub fn parse_user(value: &Value) -> Result<UserPayload> {
    decode(value, "user")
}

/// Validate an organization profile payload.
pub fn parse_org(value: &Value) -> Result<OrgPayload> {
    decode(value, "organization")
}

/// Normalize a repository list, keeping at most `max_repos` entries in upstream order.
pub fn normalize_repos(value: &Value, max_repos: usize) -> Result<Vec<CanonicalRepo>> {
    let repos: Vec<RepoPayload> = decode(value, "repository list")?;
    Ok(repos
        .into_iter()
        .take(max_repos)
        .map(|repo| CanonicalRepo {
            name: repo.name,
            stars: repo.stargazers_count,
            language: repo.language,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            updated_at: repo.updated_at,
            size_kb: repo.size,
        })
        .collect())
}

/// Combine a user payload with its normalized repositories.
pub fn user_profile(user: UserPayload, top_repositories: Vec<CanonicalRepo>) -> CanonicalProfile {
    CanonicalProfile {
        subject_id: user.login,
        display_name: user.name,
        bio_or_description: user.bio,
        location: user.location,
        followers: user.followers,
        following: user.following,
        public_repo_count: user.public_repos,
        public_gist_or_member_count: user.public_gists,
        created_at: user.created_at,
        top_repositories,
        kind: SubjectKind::User,
    }
}

/// Combine an organization payload with its normalized repositories.
pub fn org_profile(org: OrgPayload, top_repositories: Vec<CanonicalRepo>) -> CanonicalProfile {
    CanonicalProfile {
        subject_id: org.login,
        display_name: org.name,
        bio_or_description: org.description,
        location: org.location,
        followers: org.followers,
        following: org.following,
        public_repo_count: org.public_repos,
        public_gist_or_member_count: org.public_members_count,
        created_at: org.created_at,
        top_repositories,
        kind: SubjectKind::Organization,
    }
}

/// Normalize a user payload and its repository list in one step.
pub fn normalize_user(user: &Value, repos: &Value, max_repos: usize) -> Result<CanonicalProfile> {
    Ok(user_profile(parse_user(user)?, normalize_repos(repos, max_repos)?))
}

/// Normalize an organization payload and its repository list in one step.
pub fn normalize_org(org: &Value, repos: &Value, max_repos: usize) -> Result<CanonicalProfile> {
    Ok(org_profile(parse_org(org)?, normalize_repos(repos, max_repos)?))
}

/// Normalize a contributor list, keeping at most `max` entries.
pub fn normalize_contributors(value: &Value, max: usize) -> Result<Vec<Contributor>> {
    let contributors: Vec<ContributorPayload> = decode(value, "contributor list")?;
    Ok(contributors
        .into_iter()
        .take(max)
        .map(|c| Contributor {
            login: c.login,
            contributions: c.contributions,
        })
        .collect())
}

/// Normalize weekly commit activity.
pub fn normalize_activity(value: &Value) -> Result<Vec<ActivityWeek>> {
    let weeks: Vec<ActivityWeekPayload> = decode(value, "commit activity")?;
    Ok(weeks
        .into_iter()
        .map(|w| ActivityWeek {
            week: w.week,
            total: w.total,
            days: w.days,
        })
        .collect())
}

/// Extract the core quota from a rate limit payload.
pub fn normalize_rate_limit(value: &Value) -> Result<RateLimitStatus> {
    let payload: RateLimitPayload = decode(value, "rate limit")?;
    let core = payload.resources.core;
    Ok(RateLimitStatus {
        limit: core.limit,
        remaining: core.remaining,
        used: core.used,
        reset: core.reset,
    })
}

/// Health score of a repository evaluated at `now`.
///
/// `stars * 2 + forks * 3 - open_issues`, plus a bonus when updated within the
/// last 30 days. An unparseable `updated_at` earns no bonus.
pub fn health_score(repo: &CanonicalRepo, now: DateTime<Utc>) -> i64 {
    let base = repo.stars as i64 * 2 + repo.forks as i64 * 3 - repo.open_issues as i64;

    let recent = DateTime::parse_from_rfc3339(&repo.updated_at)
        .map(|updated| now.signed_duration_since(updated).num_days() <= RECENT_UPDATE_DAYS)
        .unwrap_or(false);

    if recent { base + RECENT_UPDATE_BONUS } else { base }
}

/// Repository count per language, in order of first appearance.
pub fn language_distribution(repos: &[CanonicalRepo]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for repo in repos {
        let language = repo.language.as_deref().unwrap_or(OTHER_LANGUAGE);
        match counts.iter_mut().find(|(name, _)| name == language) {
            Some((_, count)) => *count += 1,
            None => counts.push((language.to_string(), 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "login": "octocat",
            "name": "The Octocat",
            "location": "San Francisco",
            "followers": 100,
            "following": 9,
            "public_repos": 8,
            "public_gists": 7,
            "created_at": "2011-01-25T18:44:36Z"
        })
    }

    fn repo_json(name: &str, stars: u64) -> Value {
        json!({
            "name": name,
            "stargazers_count": stars,
            "forks_count": 1,
            "open_issues_count": 0,
            "language": "Rust",
            "updated_at": "2024-01-01T00:00:00Z",
            "size": 42
        })
    }

    fn repo(stars: u64, forks: u64, open_issues: u64, updated_at: &str) -> CanonicalRepo {
        CanonicalRepo {
            name: "repo".to_string(),
            stars,
            language: None,
            forks,
            open_issues,
            updated_at: updated_at.to_string(),
            size_kb: None,
        }
    }

    #[test]
    fn test_missing_bio_is_unknown() {
        let profile = normalize_user(&user_json(), &json!([]), 10).unwrap();
        assert_eq!(profile.subject_id, "octocat");
        assert_eq!(profile.bio_or_description, None);
        assert_eq!(profile.location.as_deref(), Some("San Francisco"));
        assert_eq!(profile.kind, SubjectKind::User);
    }

    #[test]
    fn test_null_bio_is_unknown() {
        let mut user = user_json();
        user["bio"] = Value::Null;
        let profile = normalize_user(&user, &json!([]), 10).unwrap();
        assert_eq!(profile.bio_or_description, None);
    }

    #[test]
    fn test_missing_followers_is_malformed() {
        let mut user = user_json();
        user.as_object_mut().unwrap().remove("followers");

        let err = normalize_user(&user, &json!([]), 10).unwrap_err();
        match err {
            StatsError::MalformedResponse(message) => assert!(message.contains("followers")),
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_login_is_malformed() {
        let mut user = user_json();
        user.as_object_mut().unwrap().remove("login");
        assert!(matches!(
            parse_user(&user),
            Err(StatsError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_repos_truncated_in_input_order() {
        let repos = json!([repo_json("a", 50), repo_json("b", 30), repo_json("c", 10)]);
        let profile = normalize_user(&user_json(), &repos, 2).unwrap();

        let stars: Vec<u64> = profile.top_repositories.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![50, 30]);
    }

    #[test]
    fn test_repos_not_resorted() {
        let repos = json!([repo_json("low", 1), repo_json("high", 99)]);
        let normalized = normalize_repos(&repos, 10).unwrap();
        assert_eq!(normalized[0].name, "low");
        assert_eq!(normalized[1].name, "high");
    }

    #[test]
    fn test_repo_optional_fields() {
        let repos = json!([{
            "name": "bare",
            "stargazers_count": 3,
            "forks_count": 0,
            "open_issues_count": 0,
            "language": null,
            "updated_at": "2024-01-01T00:00:00Z"
        }]);
        let normalized = normalize_repos(&repos, 10).unwrap();
        assert_eq!(normalized[0].language, None);
        assert_eq!(normalized[0].size_kb, None);
    }

    #[test]
    fn test_repo_missing_stars_is_malformed() {
        let repos = json!([{"name": "broken"}]);
        assert!(matches!(
            normalize_repos(&repos, 10),
            Err(StatsError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_org_profile() {
        let org = json!({
            "login": "rust-lang",
            "description": "The Rust programming language",
            "followers": 5000,
            "following": 0,
            "public_repos": 200,
            "created_at": "2010-06-04T00:00:00Z"
        });
        let profile = normalize_org(&org, &json!([repo_json("rust", 90000)]), 10).unwrap();
        assert_eq!(profile.kind, SubjectKind::Organization);
        assert_eq!(
            profile.bio_or_description.as_deref(),
            Some("The Rust programming language")
        );
        assert_eq!(profile.display_name, None);
        assert_eq!(profile.public_gist_or_member_count, 0);
        assert_eq!(profile.top_repositories.len(), 1);
    }

    #[test]
    fn test_health_score_recent_and_stale() {
        let now = Utc::now();
        let recent = (now - chrono::Duration::days(5)).to_rfc3339();
        let stale = (now - chrono::Duration::days(400)).to_rfc3339();

        assert_eq!(health_score(&repo(10, 5, 2, &recent), now), 43);
        assert_eq!(health_score(&repo(10, 5, 2, &stale), now), 33);
    }

    #[test]
    fn test_health_score_bonus_boundary() {
        let now = Utc::now();
        let edge = (now - chrono::Duration::days(30)).to_rfc3339();
        let past = (now - chrono::Duration::days(31)).to_rfc3339();

        assert_eq!(health_score(&repo(0, 0, 0, &edge), now), 10);
        assert_eq!(health_score(&repo(0, 0, 0, &past), now), 0);
    }

    #[test]
    fn test_health_score_unparseable_date() {
        assert_eq!(health_score(&repo(10, 5, 2, "yesterday"), Utc::now()), 33);
    }

    #[test]
    fn test_health_score_can_be_negative() {
        assert_eq!(health_score(&repo(0, 0, 7, "n/a"), Utc::now()), -7);
    }

    #[test]
    fn test_language_distribution() {
        let mut repos = vec![
            repo(1, 0, 0, ""),
            repo(1, 0, 0, ""),
            repo(1, 0, 0, ""),
            repo(1, 0, 0, ""),
        ];
        repos[0].language = Some("Rust".to_string());
        repos[1].language = None;
        repos[2].language = Some("Rust".to_string());
        repos[3].language = Some("Go".to_string());

        assert_eq!(
            language_distribution(&repos),
            vec![
                ("Rust".to_string(), 2),
                ("Others".to_string(), 1),
                ("Go".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_contributors_and_activity() {
        let contributors = json!([
            {"login": "a", "contributions": 10},
            {"login": "b", "contributions": 5},
            {"login": "c", "contributions": 1}
        ]);
        let normalized = normalize_contributors(&contributors, 2).unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].login, "a");

        let activity = json!([{"week": 1700000000, "total": 4, "days": [0, 1, 1, 2, 0, 0, 0]}]);
        let weeks = normalize_activity(&activity).unwrap();
        assert_eq!(weeks[0].total, 4);
        assert_eq!(weeks[0].days.len(), 7);

        // Stats still being computed upstream come back as an empty object.
        assert!(normalize_activity(&json!({})).is_err());
    }

    #[test]
    fn test_rate_limit() {
        let payload = json!({
            "resources": {"core": {"limit": 60, "remaining": 42, "reset": 1700000000, "used": 18}},
            "rate": {"limit": 60, "remaining": 42, "reset": 1700000000, "used": 18}
        });
        let status = normalize_rate_limit(&payload).unwrap();
        assert_eq!(status.limit, 60);
        assert_eq!(status.remaining, 42);
        assert_eq!(status.used, 18);
    }
}
