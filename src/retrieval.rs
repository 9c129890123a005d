// Retrieval façade.
// Composes cache lookups, upstream fetches, normalization, and history recording per subject.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::{RequestKind, ResponseCache, cache_key};
use crate::error::Result;
use crate::github::{Transport, endpoints};
use crate::history::{HistoryStore, RepoSnapshot, UserSnapshot};
use crate::model::{ActivityWeek, CanonicalProfile, Contributor, Enrichment, RateLimitStatus};
use crate::normalizer;

/// Parameters of a repository list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of repositories kept on the profile.
    pub max_repos: usize,
    /// Only list repositories updated since this date.
    pub since: Option<NaiveDate>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_repos: 10,
            since: None,
        }
    }
}

/// Which optional enrichments to load for the top repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub contributors: bool,
    pub activity: bool,
}

/// Orchestrates cache, transport, normalizer, and history for every subject kind.
pub struct Retriever<T> {
    transport: T,
    cache: ResponseCache,
    history: HistoryStore,
}

impl<T: Transport> Retriever<T> {
    pub fn new(transport: T, cache: ResponseCache, history: HistoryStore) -> Self {
        Self {
            transport,
            cache,
            history,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Serve a request from the cache, or fetch, normalize, then cache it.
    ///
    /// Nothing is cached when the fetch or the normalization fails.
    async fn fetch_cached<R>(
        &mut self,
        kind: RequestKind,
        subject: &str,
        endpoint: &str,
        params: Vec<(&'static str, String)>,
        normalize: impl Fn(&Value) -> Result<R>,
    ) -> Result<R> {
        let key = cache_key(kind, subject, &params, self.transport.has_token());

        if let Some(payload) = self.cache.get(&key) {
            match normalize(payload) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(%key, error = %e, "discarding unusable cached payload"),
            }
        }

        debug!(%key, endpoint, "cache miss");
        let payload = self.transport.get_json(endpoint, &params).await?;
        let value = normalize(&payload)?;
        self.cache.put(key, payload);
        Ok(value)
    }

    /// Fetch and normalize a user profile without recording history.
    pub async fn user_profile(
        &mut self,
        username: &str,
        options: &FetchOptions,
    ) -> Result<CanonicalProfile> {
        let user = self
            .fetch_cached(
                RequestKind::User,
                username,
                &endpoints::user(username),
                Vec::new(),
                normalizer::parse_user,
            )
            .await?;

        let max_repos = options.max_repos;
        let repos = self
            .fetch_cached(
                RequestKind::UserRepos,
                username,
                &endpoints::user_repos(username),
                endpoints::repo_list_params(max_repos, options.since),
                |value| normalizer::normalize_repos(value, max_repos),
            )
            .await?;

        Ok(normalizer::user_profile(user, repos))
    }

    /// Fetch and normalize an organization profile without recording history.
    pub async fn org_profile(
        &mut self,
        org: &str,
        options: &FetchOptions,
    ) -> Result<CanonicalProfile> {
        let payload = self
            .fetch_cached(
                RequestKind::Org,
                org,
                &endpoints::org(org),
                Vec::new(),
                normalizer::parse_org,
            )
            .await?;

        let max_repos = options.max_repos;
        let repos = self
            .fetch_cached(
                RequestKind::OrgRepos,
                org,
                &endpoints::org_repos(org),
                endpoints::repo_list_params(max_repos, options.since),
                |value| normalizer::normalize_repos(value, max_repos),
            )
            .await?;

        Ok(normalizer::org_profile(payload, repos))
    }

    /// Fetch a user profile and record a snapshot of it.
    #[instrument(skip(self, options))]
    pub async fn fetch_user(
        &mut self,
        username: &str,
        options: &FetchOptions,
    ) -> Result<CanonicalProfile> {
        let profile = self.user_profile(username, options).await?;
        self.record(&profile)?;
        Ok(profile)
    }

    /// Fetch an organization profile and record a snapshot of it.
    #[instrument(skip(self, options))]
    pub async fn fetch_org(&mut self, org: &str, options: &FetchOptions) -> Result<CanonicalProfile> {
        let profile = self.org_profile(org, options).await?;
        self.record(&profile)?;
        Ok(profile)
    }

    /// Fetch every user in order, then record all of them.
    ///
    /// The first failure aborts the comparison before any history is written.
    /// `on_fetched` is called after each subject completes.
    pub async fn compare(
        &mut self,
        usernames: &[String],
        options: &FetchOptions,
        mut on_fetched: impl FnMut(&str),
    ) -> Result<Vec<CanonicalProfile>> {
        let mut profiles = Vec::with_capacity(usernames.len());
        for username in usernames {
            profiles.push(self.user_profile(username, options).await?);
            on_fetched(username);
        }

        for profile in &profiles {
            self.record(profile)?;
        }
        Ok(profiles)
    }

    /// Append the user and repository snapshots of `profile` with one shared timestamp.
    pub fn record(&mut self, profile: &CanonicalProfile) -> Result<DateTime<Utc>> {
        let captured_at = Utc::now();
        self.history
            .record_user(&profile.subject_id, profile, captured_at)?;
        self.history
            .record_repos(&profile.subject_id, &profile.top_repositories, captured_at)?;
        Ok(captured_at)
    }

    /// Top contributors of a repository; empty when unavailable.
    pub async fn contributors(&mut self, owner: &str, repo: &str, max: usize) -> Vec<Contributor> {
        let subject = format!("{}/{}", owner, repo);
        let result = self
            .fetch_cached(
                RequestKind::Contributors,
                &subject,
                &endpoints::contributors(owner, repo),
                endpoints::contributors_params(max),
                |value| normalizer::normalize_contributors(value, max),
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(%subject, error = %e, "contributors unavailable");
            Vec::new()
        })
    }

    /// Weekly commit activity of a repository; empty when unavailable.
    pub async fn commit_activity(&mut self, owner: &str, repo: &str) -> Vec<ActivityWeek> {
        let subject = format!("{}/{}", owner, repo);
        let result = self
            .fetch_cached(
                RequestKind::Activity,
                &subject,
                &endpoints::commit_activity(owner, repo),
                Vec::new(),
                normalizer::normalize_activity,
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(%subject, error = %e, "commit activity unavailable");
            Vec::new()
        })
    }

    /// Load the requested enrichments for the profile's top repository.
    pub async fn enrich(
        &mut self,
        profile: &CanonicalProfile,
        request: EnrichmentRequest,
    ) -> Enrichment {
        let Some(top) = profile.top_repository() else {
            return Enrichment::default();
        };
        let owner = profile.subject_id.clone();
        let repo = top.name.clone();

        let contributors = if request.contributors {
            Some(
                self.contributors(&owner, &repo, endpoints::DEFAULT_CONTRIBUTORS)
                    .await,
            )
        } else {
            None
        };
        let activity = if request.activity {
            Some(self.commit_activity(&owner, &repo).await)
        } else {
            None
        };

        Enrichment {
            repository: Some(repo),
            contributors,
            activity,
        }
    }

    /// Current API quota. Never cached.
    pub async fn rate_limit(&mut self) -> Result<RateLimitStatus> {
        let payload = self
            .transport
            .get_json(endpoints::RATE_LIMIT, &[])
            .await?;
        normalizer::normalize_rate_limit(&payload)
    }

    /// Recorded snapshots of a subject, newest first.
    pub fn user_history(&self, username: &str, limit: usize) -> Result<Vec<UserSnapshot>> {
        self.history.query_user_history(username, limit)
    }

    /// Recorded snapshots of one repository, newest first.
    pub fn repo_history(
        &self,
        username: &str,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<RepoSnapshot>> {
        self.history.query_repo_history(username, repo, limit)
    }
}
