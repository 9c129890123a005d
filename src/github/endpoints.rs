// GitHub API endpoint paths and query parameters.
// Requests are issued through the retrieval layer so they can be cached.

use chrono::NaiveDate;

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: usize = 100;

/// Number of contributors requested for the top repository.
pub const DEFAULT_CONTRIBUTORS: usize = 5;

pub const RATE_LIMIT: &str = "/rate_limit";

/// Profile of a user account.
pub fn user(username: &str) -> String {
    format!("/users/{}", username)
}

/// Profile of an organization account.
pub fn org(org: &str) -> String {
    format!("/orgs/{}", org)
}

/// Repositories owned by a user.
pub fn user_repos(username: &str) -> String {
    format!("/users/{}/repos", username)
}

/// Repositories owned by an organization.
pub fn org_repos(org: &str) -> String {
    format!("/orgs/{}/repos", org)
}

/// Contributors of a repository.
pub fn contributors(owner: &str, repo: &str) -> String {
    format!("/repos/{}/{}/contributors", owner, repo)
}

/// Weekly commit totals for the last year of a repository.
pub fn commit_activity(owner: &str, repo: &str) -> String {
    format!("/repos/{}/{}/stats/commit_activity", owner, repo)
}

/// Query for a repository list sorted by stars, optionally limited to recent updates.
pub fn repo_list_params(max_repos: usize, since: Option<NaiveDate>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("sort", "stars".to_string()),
        ("direction", "desc".to_string()),
        ("per_page", max_repos.clamp(1, MAX_PER_PAGE).to_string()),
    ];
    if let Some(since) = since {
        params.push(("since", format!("{}T00:00:00Z", since.format("%Y-%m-%d"))));
    }
    params
}

/// Query for the top contributors of a repository.
pub fn contributors_params(max: usize) -> Vec<(&'static str, String)> {
    vec![("per_page", max.clamp(1, MAX_PER_PAGE).to_string())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(user("octocat"), "/users/octocat");
        assert_eq!(org_repos("rust-lang"), "/orgs/rust-lang/repos");
        assert_eq!(
            commit_activity("octocat", "hello"),
            "/repos/octocat/hello/stats/commit_activity"
        );
    }

    #[test]
    fn test_repo_list_params() {
        let params = repo_list_params(10, None);
        assert_eq!(
            params,
            vec![
                ("sort", "stars".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", "10".to_string()),
            ]
        );

        let since = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let params = repo_list_params(500, Some(since));
        assert!(params.contains(&("per_page", "100".to_string())));
        assert!(params.contains(&("since", "2024-03-01T00:00:00Z".to_string())));
    }
}
