// HTML rendering.
// Dashboard and index pages from templates compiled into the binary.

use minijinja::{Environment, context};

use crate::error::Result;
use crate::model::{CanonicalProfile, SubjectKind};

const DASHBOARD: &str = "dashboard.html";
const INDEX: &str = "index.html";

fn environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(DASHBOARD, include_str!("templates/dashboard.html"))?;
    env.add_template(INDEX, include_str!("templates/index.html"))?;
    Ok(env)
}

/// Stat cards and the repository table, plus an `<img>` for `chart` when given.
pub fn render_dashboard(profile: &CanonicalProfile, chart: Option<&str>) -> Result<String> {
    let env = environment()?;
    let kind = match profile.kind {
        SubjectKind::User => "User",
        SubjectKind::Organization => "Organization",
    };
    let html = env.get_template(DASHBOARD)?.render(context! {
        profile => profile,
        kind => kind,
        count_label => profile.kind.count_label(),
        chart => chart,
    })?;
    Ok(html)
}

/// Landing page of the web front-end.
pub fn render_index() -> Result<String> {
    Ok(environment()?.get_template(INDEX)?.render(context! {})?)
}
