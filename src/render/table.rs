// Plain-text rendering.
// Grid tables for profiles, comparisons, history, enrichment, and rate limits.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, Utc};

use crate::history::{RepoSnapshot, UserSnapshot};
use crate::model::{CanonicalProfile, Enrichment, RateLimitStatus, SubjectKind};
use crate::normalizer::health_score;

/// Placeholder shown for unknown values.
pub const UNKNOWN: &str = "N/A";

/// Number of recent weeks listed in the activity table.
pub const RECENT_WEEKS: usize = 12;

/// Extra columns for the repository table.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub health: bool,
    pub sizes: bool,
    /// Evaluation time for health scores.
    pub now: DateTime<Utc>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            health: false,
            sizes: false,
            now: Utc::now(),
        }
    }
}

/// Grid table with a header row, drawn with ASCII box characters.
#[derive(Debug, Clone, Default)]
pub struct GridTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl GridTable {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize], fill: char) -> fmt::Result {
    f.write_char('+')?;
    for width in widths {
        for _ in 0..width + 2 {
            f.write_char(fill)?;
        }
        f.write_char('+')?;
    }
    f.write_char('\n')
}

fn write_cells(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    f.write_char('|')?;
    for (col, width) in widths.iter().enumerate() {
        let cell = cells.get(col).map(String::as_str).unwrap_or("");
        if is_numeric(cell) {
            write!(f, " {:>width$} |", cell, width = width)?;
        } else {
            write!(f, " {:<width$} |", cell, width = width)?;
        }
    }
    f.write_char('\n')
}

impl fmt::Display for GridTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_rule(f, &widths, '-')?;
        write_cells(f, &widths, &self.headers)?;
        write_rule(f, &widths, '=')?;
        for row in &self.rows {
            write_cells(f, &widths, row)?;
            write_rule(f, &widths, '-')?;
        }
        Ok(())
    }
}

fn or_unknown(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(UNKNOWN)
}

/// Header block plus the repository table.
pub fn render_profile(profile: &CanonicalProfile, options: &TableOptions) -> String {
    let mut out = String::new();
    let kind = profile.kind;

    match kind {
        SubjectKind::User => {
            let _ = writeln!(out, "GitHub Stats for: {}", profile.subject_id);
        }
        SubjectKind::Organization => {
            let _ = writeln!(out, "GitHub Stats for: {} (Organization)", profile.subject_id);
        }
    }
    let _ = writeln!(out, "Name: {}", or_unknown(profile.display_name.as_deref()));
    let _ = writeln!(
        out,
        "{}: {}",
        kind.about_label(),
        or_unknown(profile.bio_or_description.as_deref())
    );
    let _ = writeln!(out, "Location: {}", or_unknown(profile.location.as_deref()));
    let _ = writeln!(out, "Followers: {}", profile.followers);
    let _ = writeln!(out, "Following: {}", profile.following);
    let _ = writeln!(out, "Public Repos: {}", profile.public_repo_count);
    let _ = writeln!(
        out,
        "{}: {}",
        kind.count_label(),
        profile.public_gist_or_member_count
    );
    let _ = writeln!(out, "Account Created: {}", profile.created_at);

    out.push_str("\nTop Repositories (by stars):\n");
    out.push_str(&repository_table(profile, options).to_string());
    out
}

/// Repository rows with the optional health and size columns.
pub fn repository_table(profile: &CanonicalProfile, options: &TableOptions) -> GridTable {
    let mut headers = vec![
        "Name",
        "Stars",
        "Language",
        "Forks",
        "Open Issues",
        "Last Updated",
    ];
    if options.health {
        headers.push("Health Score");
    }
    if options.sizes {
        headers.push("Size (KB)");
    }

    let mut table = GridTable::new(headers);
    for repo in &profile.top_repositories {
        let mut row = vec![
            repo.name.clone(),
            repo.stars.to_string(),
            or_unknown(repo.language.as_deref()).to_string(),
            repo.forks.to_string(),
            repo.open_issues.to_string(),
            repo.updated_at.clone(),
        ];
        if options.health {
            row.push(health_score(repo, options.now).to_string());
        }
        if options.sizes {
            row.push(
                repo.size_kb
                    .map(|size| size.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
            );
        }
        table.push_row(row);
    }
    table
}

/// Contributor and activity sections; empty when nothing was requested.
pub fn render_enrichment(enrichment: &Enrichment) -> String {
    let mut out = String::new();
    let repo = enrichment.repository.as_deref().unwrap_or(UNKNOWN);

    if let Some(contributors) = &enrichment.contributors {
        if contributors.is_empty() {
            let _ = writeln!(out, "\nNo contributor data available for {}.", repo);
        } else {
            let _ = writeln!(out, "\nTop Contributors for {}:", repo);
            let mut table = GridTable::new(["Username", "Contributions"]);
            for contributor in contributors {
                table.push_row([
                    contributor.login.clone(),
                    contributor.contributions.to_string(),
                ]);
            }
            out.push_str(&table.to_string());
        }
    }

    if let Some(activity) = &enrichment.activity {
        if activity.is_empty() {
            let _ = writeln!(out, "\nNo commit activity available for {}.", repo);
        } else {
            let total: u64 = activity.iter().map(|week| week.total).sum();
            let _ = writeln!(
                out,
                "\nCommit Activity for {} (last {} weeks):",
                repo,
                activity.len()
            );
            let _ = writeln!(out, "Total Commits: {}", total);

            let recent = &activity[activity.len().saturating_sub(RECENT_WEEKS)..];
            let mut table = GridTable::new(["Week", "Commits"]);
            for week in recent {
                let label = DateTime::from_timestamp(week.week, 0)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| week.week.to_string());
                table.push_row([label, week.total.to_string()]);
            }
            out.push_str(&table.to_string());
        }
    }

    out
}

fn metric_row(
    label: &str,
    profiles: &[CanonicalProfile],
    value: impl Fn(&CanonicalProfile) -> String,
) -> Vec<String> {
    let mut row = vec![label.to_string()];
    row.extend(profiles.iter().map(value));
    row
}

/// One column per subject, one row per metric.
pub fn render_comparison(profiles: &[CanonicalProfile]) -> String {
    let mut headers = vec!["Stat".to_string()];
    headers.extend(profiles.iter().map(|p| p.subject_id.clone()));
    let mut table = GridTable::new(headers);

    table.push_row(metric_row("Name", profiles, |p| {
        or_unknown(p.display_name.as_deref()).to_string()
    }));
    table.push_row(metric_row("Followers", profiles, |p| p.followers.to_string()));
    table.push_row(metric_row("Following", profiles, |p| p.following.to_string()));
    table.push_row(metric_row("Public Repos", profiles, |p| {
        p.public_repo_count.to_string()
    }));
    table.push_row(metric_row("Public Gists", profiles, |p| {
        p.public_gist_or_member_count.to_string()
    }));
    table.push_row(metric_row("Account Created", profiles, |p| {
        p.created_at.clone()
    }));

    format!("User Comparison:\n{}", table)
}

/// Snapshot table for a subject, newest first.
pub fn render_history(subject: &str, limit: usize, history: &[UserSnapshot]) -> String {
    if history.is_empty() {
        return format!("No historical data found for {}\n", subject);
    }

    let mut table = GridTable::new(["Date", "Followers", "Following", "Public Repos", "Public Gists"]);
    for snapshot in history {
        table.push_row([
            snapshot.captured_at.format("%Y-%m-%d %H:%M").to_string(),
            snapshot.followers.to_string(),
            snapshot.following.to_string(),
            snapshot.public_repos.to_string(),
            snapshot.public_gists.to_string(),
        ]);
    }
    format!(
        "Historical data for {} (last {} snapshots):\n{}",
        subject, limit, table
    )
}

/// Snapshot table for one repository, newest first.
pub fn render_repo_history(subject: &str, repo: &str, history: &[RepoSnapshot]) -> String {
    if history.is_empty() {
        return format!("No historical data found for {}/{}\n", subject, repo);
    }

    let mut table = GridTable::new(["Date", "Stars", "Forks", "Open Issues", "Language"]);
    for snapshot in history {
        table.push_row([
            snapshot.captured_at.format("%Y-%m-%d %H:%M").to_string(),
            snapshot.stars.to_string(),
            snapshot.forks.to_string(),
            snapshot.open_issues.to_string(),
            or_unknown(snapshot.language.as_deref()).to_string(),
        ]);
    }
    format!("Historical data for {}/{}:\n{}", subject, repo, table)
}

/// Summary of the core API quota.
pub fn render_rate_limit(status: &RateLimitStatus) -> String {
    let reset = DateTime::from_timestamp(status.reset, 0)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| UNKNOWN.to_string());

    format!(
        "GitHub API Rate Limit Status:\nLimit: {}\nRemaining: {}\nUsed: {}\nReset Time: {}\n",
        status.limit, status.remaining, status.used, reset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityWeek, CanonicalRepo, Contributor};

    fn profile() -> CanonicalProfile {
        CanonicalProfile {
            subject_id: "octocat".to_string(),
            display_name: None,
            bio_or_description: Some("Tentacles".to_string()),
            location: None,
            followers: 10,
            following: 2,
            public_repo_count: 2,
            public_gist_or_member_count: 1,
            created_at: "2011-01-25T18:44:36Z".to_string(),
            top_repositories: vec![CanonicalRepo {
                name: "hello-world".to_string(),
                stars: 10,
                language: None,
                forks: 5,
                open_issues: 2,
                updated_at: "2011-01-26T19:14:43Z".to_string(),
                size_kb: Some(108),
            }],
            kind: SubjectKind::User,
        }
    }

    #[test]
    fn test_grid_table_layout() {
        let mut table = GridTable::new(["Name", "Stars"]);
        table.push_row(["abc", "5"]);
        table.push_row(["a", "50"]);

        let expected = "\
+------+-------+
| Name | Stars |
+======+=======+
| abc  |     5 |
+------+-------+
| a    |    50 |
+------+-------+
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_profile_shows_unknown_markers() {
        let text = render_profile(&profile(), &TableOptions::default());
        assert!(text.contains("Name: N/A"));
        assert!(text.contains("Bio: Tentacles"));
        assert!(text.contains("Location: N/A"));
        assert!(text.contains("| hello-world |"));
        assert!(!text.contains("Health Score"));
    }

    #[test]
    fn test_optional_columns() {
        let options = TableOptions {
            health: true,
            sizes: true,
            now: Utc::now(),
        };
        let text = render_profile(&profile(), &options);
        assert!(text.contains("Health Score"));
        assert!(text.contains("Size (KB)"));
        assert!(text.contains(" 33 |"));
        assert!(text.contains(" 108 |"));
    }

    #[test]
    fn test_org_labels() {
        let mut org = profile();
        org.kind = SubjectKind::Organization;
        let text = render_profile(&org, &TableOptions::default());
        assert!(text.contains("(Organization)"));
        assert!(text.contains("Description: Tentacles"));
        assert!(text.contains("Public Members: 1"));
    }

    #[test]
    fn test_comparison_columns_and_rows() {
        let mut other = profile();
        other.subject_id = "hubot".to_string();
        other.followers = 99;

        let text = render_comparison(&[profile(), other]);
        let header = text.lines().nth(2).unwrap();
        assert!(header.contains("octocat"));
        assert!(header.contains("hubot"));
        for label in [
            "Name",
            "Followers",
            "Following",
            "Public Repos",
            "Public Gists",
            "Account Created",
        ] {
            assert!(text.contains(&format!("| {label}")), "missing {label}");
        }
        assert!(text.contains(" 99 |"));
    }

    #[test]
    fn test_enrichment_sections() {
        let enrichment = Enrichment {
            repository: Some("hello-world".to_string()),
            contributors: Some(vec![Contributor {
                login: "octocat".to_string(),
                contributions: 42,
            }]),
            activity: Some(
                (0..20)
                    .map(|i| ActivityWeek {
                        week: 1_700_000_000 + i * 604_800,
                        total: 1,
                        days: vec![0; 7],
                    })
                    .collect(),
            ),
        };
        let text = render_enrichment(&enrichment);
        assert!(text.contains("Top Contributors for hello-world"));
        assert!(text.contains("Total Commits: 20"));

        let week_rows = text
            .lines()
            .filter(|line| line.starts_with("| 20"))
            .count();
        assert_eq!(week_rows, RECENT_WEEKS);
    }

    #[test]
    fn test_enrichment_no_data() {
        let enrichment = Enrichment {
            repository: Some("hello-world".to_string()),
            contributors: Some(Vec::new()),
            activity: None,
        };
        let text = render_enrichment(&enrichment);
        assert!(text.contains("No contributor data available"));
        assert!(!text.contains("Commit Activity"));
        assert!(render_enrichment(&Enrichment::default()).is_empty());
    }

    #[test]
    fn test_history_table() {
        assert_eq!(
            render_history("octocat", 30, &[]),
            "No historical data found for octocat\n"
        );

        let snapshot = UserSnapshot {
            username: "octocat".to_string(),
            captured_at: Utc::now(),
            followers: 7,
            following: 1,
            public_repos: 2,
            public_gists: 3,
        };
        let text = render_history("octocat", 30, &[snapshot]);
        assert!(text.starts_with("Historical data for octocat"));
        assert!(text.contains(" 7 |"));
    }
}
