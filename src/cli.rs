// Command-line arguments.
// Parsed with clap and resolved into exactly one run mode.

use chrono::NaiveDate;
use clap::{ArgAction, ArgGroup, Parser};

use crate::error::{Result, StatsError};

/// Default number of snapshots listed by `--history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Default port of the web front-end.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Parser)]
#[command(
    name = "ghstats",
    version,
    about = "Fetch GitHub user and organization statistics"
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["username", "org", "compare", "rate_limit", "web"])
))]
pub struct Cli {
    /// GitHub username to fetch stats for (use --compare for multiple)
    pub username: Option<String>,

    /// Get stats for an organization instead of a user
    #[arg(long, value_name = "NAME")]
    pub org: Option<String>,

    /// Compare stats of two or more users
    #[arg(long, value_name = "USER", num_args = 2..)]
    pub compare: Vec<String>,

    /// Output in JSON format
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Output in CSV format
    #[arg(long, action = ArgAction::SetTrue)]
    pub csv: bool,

    /// Output in YAML format
    #[arg(long, action = ArgAction::SetTrue)]
    pub yaml: bool,

    /// Generate a bar chart of top repositories by stars
    #[arg(long, action = ArgAction::SetTrue)]
    pub chart: bool,

    /// Generate a pie chart of programming languages
    #[arg(long, action = ArgAction::SetTrue)]
    pub pie: bool,

    /// Generate an HTML dashboard
    #[arg(long, action = ArgAction::SetTrue)]
    pub html: bool,

    /// Show top contributors for the top repository
    #[arg(long, action = ArgAction::SetTrue)]
    pub contributors: bool,

    /// Show weekly commit activity for the top repository
    #[arg(long, action = ArgAction::SetTrue)]
    pub activity: bool,

    /// Show repository health scores
    #[arg(long, action = ArgAction::SetTrue)]
    pub health: bool,

    /// Show repository sizes
    #[arg(long, action = ArgAction::SetTrue)]
    pub sizes: bool,

    /// Show the last N recorded snapshots
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "30",
        conflicts_with_all = ["rate_limit", "web"]
    )]
    pub history: Option<usize>,

    /// Show history of one repository instead of the subject
    #[arg(long, value_name = "NAME", requires = "history")]
    pub repo: Option<String>,

    /// Max number of repositories to display
    #[arg(long, value_name = "N")]
    pub max_repos: Option<usize>,

    /// Only include repositories updated since this date
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_since)]
    pub since: Option<NaiveDate>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Show current GitHub API rate limit status
    #[arg(long, action = ArgAction::SetTrue)]
    pub rate_limit: bool,

    /// Launch the web interface
    #[arg(long, action = ArgAction::SetTrue)]
    pub web: bool,

    /// Port of the web interface
    #[arg(long, default_value_t = DEFAULT_PORT, requires = "web")]
    pub port: u16,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    RateLimit,
    Web {
        port: u16,
    },
    History {
        subject: String,
        limit: usize,
        repo: Option<String>,
    },
    Compare(Vec<String>),
    Org(String),
    User(String),
}

impl Cli {
    pub fn mode(&self) -> Result<Mode> {
        if self.rate_limit {
            return Ok(Mode::RateLimit);
        }
        if self.web {
            return Ok(Mode::Web { port: self.port });
        }

        let subject = self
            .compare
            .first()
            .or(self.org.as_ref())
            .or(self.username.as_ref())
            .cloned()
            .ok_or_else(|| {
                StatsError::Other(
                    "Either provide a username, --org organization, or use --compare for multiple users"
                        .to_string(),
                )
            })?;

        if let Some(limit) = self.history {
            return Ok(Mode::History {
                subject,
                limit,
                repo: self.repo.clone(),
            });
        }
        if !self.compare.is_empty() {
            return Ok(Mode::Compare(self.compare.clone()));
        }
        if self.org.is_some() {
            return Ok(Mode::Org(subject));
        }
        Ok(Mode::User(subject))
    }

    /// Whether the text tables are printed; any other output format suppresses them.
    pub fn text_output(&self) -> bool {
        !(self.json || self.csv || self.yaml || self.chart || self.pie || self.html)
    }

    /// Token from the command line or environment, ignoring empty strings.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_since(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", value))
}
