// History store for periodic snapshots.
// Append-only SQLite tables for user and repository metrics.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params, types::Type};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{CanonicalProfile, CanonicalRepo};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user_stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    date TEXT NOT NULL,
    followers INTEGER,
    following INTEGER,
    public_repos INTEGER,
    public_gists INTEGER
);
CREATE TABLE IF NOT EXISTS repo_stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    repo_name TEXT NOT NULL,
    date TEXT NOT NULL,
    stars INTEGER,
    forks INTEGER,
    open_issues INTEGER,
    language TEXT
);
CREATE INDEX IF NOT EXISTS idx_user_stats_username ON user_stats (username, date);
CREATE INDEX IF NOT EXISTS idx_repo_stats_username ON repo_stats (username, repo_name, date);
";

/// One capture of a subject's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSnapshot {
    pub username: String,
    pub captured_at: DateTime<Utc>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub public_gists: u64,
}

/// One capture of a repository's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSnapshot {
    pub username: String,
    pub repo_name: String,
    pub captured_at: DateTime<Utc>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub language: Option<String>,
}

/// Append-only log of snapshots backed by SQLite.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Append one row with the profile's counters.
    pub fn record_user(
        &self,
        subject_id: &str,
        profile: &CanonicalProfile,
        captured_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO user_stats (username, date, followers, following, public_repos, public_gists)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                subject_id,
                format_timestamp(captured_at),
                to_sql_int(profile.followers),
                to_sql_int(profile.following),
                to_sql_int(profile.public_repo_count),
                to_sql_int(profile.public_gist_or_member_count),
            ],
        )?;
        debug!(subject_id, "recorded user snapshot");
        Ok(())
    }

    /// Append one row per repository, all stamped with `captured_at`.
    pub fn record_repos(
        &mut self,
        subject_id: &str,
        repos: &[CanonicalRepo],
        captured_at: DateTime<Utc>,
    ) -> Result<usize> {
        let date = format_timestamp(captured_at);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO repo_stats (username, repo_name, date, stars, forks, open_issues, language)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for repo in repos {
                stmt.execute(params![
                    subject_id,
                    repo.name,
                    date,
                    to_sql_int(repo.stars),
                    to_sql_int(repo.forks),
                    to_sql_int(repo.open_issues),
                    repo.language,
                ])?;
            }
        }
        tx.commit()?;
        debug!(subject_id, count = repos.len(), "recorded repo snapshots");
        Ok(repos.len())
    }

    /// Up to `limit` user snapshots for `subject_id`, newest first.
    pub fn query_user_history(&self, subject_id: &str, limit: usize) -> Result<Vec<UserSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, date, followers, following, public_repos, public_gists
             FROM user_stats
             WHERE username = ?1 COLLATE NOCASE
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![subject_id, to_sql_limit(limit)], |row| {
                Ok(UserSnapshot {
                    username: row.get(0)?,
                    captured_at: timestamp_column(row, 1)?,
                    followers: count_column(row, 2)?,
                    following: count_column(row, 3)?,
                    public_repos: count_column(row, 4)?,
                    public_gists: count_column(row, 5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Up to `limit` snapshots of one repository, newest first.
    pub fn query_repo_history(
        &self,
        subject_id: &str,
        repo_name: &str,
        limit: usize,
    ) -> Result<Vec<RepoSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, repo_name, date, stars, forks, open_issues, language
             FROM repo_stats
             WHERE username = ?1 COLLATE NOCASE AND repo_name = ?2 COLLATE NOCASE
             ORDER BY date DESC, id DESC
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(params![subject_id, repo_name, to_sql_limit(limit)], |row| {
                Ok(RepoSnapshot {
                    username: row.get(0)?,
                    repo_name: row.get(1)?,
                    captured_at: timestamp_column(row, 2)?,
                    stars: count_column(row, 3)?,
                    forks: count_column(row, 4)?,
                    open_issues: count_column(row, 5)?,
                    language: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Fixed-width UTC timestamps so lexical order matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let value: Option<i64> = row.get(idx)?;
    Ok(value.unwrap_or(0).max(0) as u64)
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
