// Cache key derivation.
// Keys depend only on request kind, subject, query parameters, and whether a token is used.

/// Kind of upstream request a cached payload answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    User,
    Org,
    UserRepos,
    OrgRepos,
    Contributors,
    Activity,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::User => "user",
            RequestKind::Org => "org",
            RequestKind::UserRepos => "repos",
            RequestKind::OrgRepos => "org_repos",
            RequestKind::Contributors => "contributors",
            RequestKind::Activity => "activity",
        }
    }
}

/// Build the cache key for a request.
pub fn cache_key(
    kind: RequestKind,
    subject_id: &str,
    params: &[(&str, String)],
    has_token: bool,
) -> String {
    let mut key = format!("{}:{}", kind.as_str(), subject_id);
    for (name, value) in params {
        key.push(':');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key.push_str(if has_token { ":token" } else { ":no_token" });
    key
}
