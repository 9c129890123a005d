// Command-line application.
// Resolves configuration, builds the retriever, and dispatches one run mode.

use std::path::Path;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::cache::{ResponseCache, write_text};
use crate::cli::{Cli, Mode};
use crate::config::paths::BAR_CHART_FILE;
use crate::config::{Config, Paths};
use crate::error::Result;
use crate::github::GitHubClient;
use crate::history::HistoryStore;
use crate::model::CanonicalProfile;
use crate::render::{
    TableOptions, bar_chart_svg, pie_chart_svg, render_comparison, render_dashboard,
    render_enrichment, render_history, render_profile, render_rate_limit, render_repo_history,
    to_csv, to_json, to_yaml,
};
use crate::retrieval::{EnrichmentRequest, FetchOptions, Retriever};
use crate::web;

/// Open the cache, history database, and HTTP client named by `config`.
pub fn open_retriever(
    paths: &Paths,
    config: &Config,
    token: Option<&str>,
) -> Result<Retriever<GitHubClient>> {
    let client = GitHubClient::new(token)?;
    let cache = ResponseCache::open(paths.resolve(&config.cache_file), config.cache_ttl());
    let history = HistoryStore::open(&paths.resolve(&config.history_db))?;
    Ok(Retriever::new(client, cache, history))
}

/// Run one invocation in the working directory.
pub async fn run(cli: Cli) -> Result<()> {
    run_in(cli, Paths::default()).await
}

/// Run one invocation with state and artifacts under `paths`.
pub async fn run_in(cli: Cli, paths: Paths) -> Result<()> {
    let mode = cli.mode()?;
    let config = Config::load(&paths)?;
    let token = cli.token().or(config.token()).map(str::to_string);
    let options = FetchOptions {
        max_repos: cli.max_repos.unwrap_or(config.default_max_repos),
        since: cli.since,
    };
    debug!(?mode, authenticated = token.is_some(), "starting");

    let mut retriever = open_retriever(&paths, &config, token.as_deref())?;

    match mode {
        Mode::RateLimit => {
            let status = retriever.rate_limit().await?;
            print!("{}", render_rate_limit(&status));
        }
        Mode::Web { port } => {
            eprintln!("Open http://localhost:{} in your browser", port);
            web::serve(retriever, config.default_max_repos, port).await?;
        }
        Mode::History {
            subject,
            limit,
            repo,
        } => match repo {
            Some(repo) => {
                let history = retriever.repo_history(&subject, &repo, limit)?;
                print!("{}", render_repo_history(&subject, &repo, &history));
            }
            None => {
                let history = retriever.user_history(&subject, limit)?;
                print!("{}", render_history(&subject, limit, &history));
            }
        },
        Mode::Compare(usernames) => {
            let profiles = compare_with_progress(&mut retriever, &usernames, &options).await?;
            if cli.json {
                println!("{}", to_json(&profiles)?);
            } else if cli.yaml {
                print!("{}", to_yaml(&profiles)?);
            } else {
                print!("{}", render_comparison(&profiles));
            }
        }
        Mode::Org(org) => {
            let profile = retriever.fetch_org(&org, &options).await?;
            emit_profile(&cli, &mut retriever, &profile, &paths).await?;
        }
        Mode::User(username) => {
            let profile = retriever.fetch_user(&username, &options).await?;
            emit_profile(&cli, &mut retriever, &profile, &paths).await?;
        }
    }

    Ok(())
}

async fn compare_with_progress(
    retriever: &mut Retriever<GitHubClient>,
    usernames: &[String],
    options: &FetchOptions,
) -> Result<Vec<CanonicalProfile>> {
    let pb = ProgressBar::new(usernames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Fetching user data");

    let result = retriever
        .compare(usernames, options, |username| {
            debug!(username, "fetched");
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    result
}

/// Print or write every output format requested on the command line.
async fn emit_profile(
    cli: &Cli,
    retriever: &mut Retriever<GitHubClient>,
    profile: &CanonicalProfile,
    paths: &Paths,
) -> Result<()> {
    if cli.text_output() {
        let options = TableOptions {
            health: cli.health,
            sizes: cli.sizes,
            now: Utc::now(),
        };
        print!("{}", render_profile(profile, &options));

        let request = EnrichmentRequest {
            contributors: cli.contributors,
            activity: cli.activity,
        };
        if request.contributors || request.activity {
            let enrichment = retriever.enrich(profile, request).await;
            print!("{}", render_enrichment(&enrichment));
        }
    }

    if cli.json {
        println!("{}", to_json(profile)?);
    }
    if cli.csv {
        print!("{}", to_csv(profile)?);
    }
    if cli.yaml {
        print!("{}", to_yaml(profile)?);
    }
    if cli.chart {
        save_chart(&paths.bar_chart(), bar_chart_svg(profile), "Chart", profile)?;
    }
    if cli.pie {
        save_chart(&paths.pie_chart(), pie_chart_svg(profile), "Pie chart", profile)?;
    }
    if cli.html {
        let chart = paths.bar_chart().exists().then_some(BAR_CHART_FILE);
        let path = paths.dashboard();
        write_text(&path, &render_dashboard(profile, chart)?)?;
        info!(path = %path.display(), "wrote dashboard");
        eprintln!("HTML dashboard saved as {}", path.display());
    }

    Ok(())
}

fn save_chart(
    path: &Path,
    svg: Option<String>,
    label: &str,
    profile: &CanonicalProfile,
) -> Result<()> {
    let Some(svg) = svg else {
        eprintln!("No repositories to chart for {}", profile.subject_id);
        return Ok(());
    };
    write_text(path, &svg)?;
    info!(path = %path.display(), "wrote chart");
    eprintln!("{} saved as {}", label, path.display());
    Ok(())
}
