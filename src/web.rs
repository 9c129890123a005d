// Web front-end.
// Serves JSON, YAML, CSV, and HTML views over a shared retriever.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::cli::parse_since;
use crate::error::{Result, StatsError};
use crate::github::Transport;
use crate::model::CanonicalProfile;
use crate::render::{render_dashboard, render_index, to_csv, to_yaml};
use crate::retrieval::{FetchOptions, Retriever};

/// Shared handler state. Every pipeline run holds the lock for its whole duration.
pub struct WebState<T> {
    retriever: Arc<Mutex<Retriever<T>>>,
    default_max_repos: usize,
}

impl<T> Clone for WebState<T> {
    fn clone(&self) -> Self {
        Self {
            retriever: Arc::clone(&self.retriever),
            default_max_repos: self.default_max_repos,
        }
    }
}

impl<T> WebState<T> {
    pub fn new(retriever: Retriever<T>, default_max_repos: usize) -> Self {
        Self {
            retriever: Arc::new(Mutex::new(retriever)),
            default_max_repos,
        }
    }
}

/// Query parameters of the profile endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub format: Option<String>,
    pub max_repos: Option<usize>,
    pub since: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub users: Option<String>,
}

/// Error body `{"error": "..."}` with a status derived from the failure.
#[derive(Debug)]
pub struct ApiError(StatsError);

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self(StatsError::Other(message.into()))
    }

    fn status(&self) -> StatusCode {
        match self.0 {
            StatsError::NotFound(_) => StatusCode::NOT_FOUND,
            StatsError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl<E: Into<StatsError>> From<E> for ApiError {
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(%status, retryable = self.0.is_retryable(), error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the router over `state`.
pub fn router<T>(state: WebState<T>) -> Router
where
    T: Transport + Send + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/api/stats/{username}", get(api_user::<T>))
        .route("/api/org/{orgname}", get(api_org::<T>))
        .route("/api/compare", get(api_compare::<T>))
        .route("/stats/{username}", get(user_page::<T>))
        .route("/org/{orgname}", get(org_page::<T>))
        .with_state(state)
}

/// Listen on all interfaces until the process is stopped.
pub async fn serve<T>(retriever: Retriever<T>, default_max_repos: usize, port: u16) -> Result<()>
where
    T: Transport + Send + 'static,
{
    let app = router(WebState::new(retriever, default_max_repos));
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "web interface listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> ApiResult<Html<String>> {
    Ok(Html(render_index()?))
}

fn fetch_options(query: &ProfileQuery, default_max_repos: usize) -> ApiResult<FetchOptions> {
    let since = query
        .since
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_since)
        .transpose()
        .map_err(ApiError::bad_request)?;
    Ok(FetchOptions {
        max_repos: query.max_repos.unwrap_or(default_max_repos),
        since,
    })
}

fn format_profile(profile: &CanonicalProfile, format: Option<&str>) -> ApiResult<Response> {
    match format.unwrap_or("json") {
        "json" => Ok(Json(profile).into_response()),
        "yaml" => {
            let body = to_yaml(profile)?;
            Ok(([(header::CONTENT_TYPE, "application/x-yaml")], body).into_response())
        }
        "csv" => {
            let body = to_csv(profile)?;
            Ok(([(header::CONTENT_TYPE, "text/csv")], body).into_response())
        }
        other => Err(ApiError::bad_request(format!(
            "Unsupported format '{}', expected json, yaml, or csv",
            other
        ))),
    }
}

async fn api_user<T: Transport + Send + 'static>(
    State(state): State<WebState<T>>,
    Path(username): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Response> {
    let options = fetch_options(&query, state.default_max_repos)?;
    let profile = state.retriever.lock().await.fetch_user(&username, &options).await?;
    format_profile(&profile, query.format.as_deref())
}

async fn api_org<T: Transport + Send + 'static>(
    State(state): State<WebState<T>>,
    Path(orgname): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Response> {
    let options = fetch_options(&query, state.default_max_repos)?;
    let profile = state.retriever.lock().await.fetch_org(&orgname, &options).await?;
    format_profile(&profile, query.format.as_deref())
}

async fn api_compare<T: Transport + Send + 'static>(
    State(state): State<WebState<T>>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<Vec<CanonicalProfile>>> {
    let users: Vec<String> = query
        .users
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect();
    if users.len() < 2 {
        return Err(ApiError::bad_request(
            "At least two usernames are required for comparison",
        ));
    }

    let options = FetchOptions {
        max_repos: state.default_max_repos,
        since: None,
    };
    let profiles = state
        .retriever
        .lock()
        .await
        .compare(&users, &options, |_| {})
        .await?;
    Ok(Json(profiles))
}

async fn user_page<T: Transport + Send + 'static>(
    State(state): State<WebState<T>>,
    Path(username): Path<String>,
) -> ApiResult<Html<String>> {
    let options = fetch_options(&ProfileQuery::default(), state.default_max_repos)?;
    let profile = state.retriever.lock().await.fetch_user(&username, &options).await?;
    Ok(Html(render_dashboard(&profile, None)?))
}

async fn org_page<T: Transport + Send + 'static>(
    State(state): State<WebState<T>>,
    Path(orgname): Path<String>,
) -> ApiResult<Html<String>> {
    let options = fetch_options(&ProfileQuery::default(), state.default_max_repos)?;
    let profile = state.retriever.lock().await.fetch_org(&orgname, &options).await?;
    Ok(Html(render_dashboard(&profile, None)?))
}
