// Render pipeline.
// Text tables, machine-readable formats, SVG charts, and HTML pages.

pub mod chart;
pub mod formats;
pub mod html;
pub mod table;

pub use chart::{bar_chart_svg, pie_chart_svg};
pub use formats::{to_csv, to_json, to_yaml};
pub use html::{render_dashboard, render_index};
pub use table::{
    TableOptions, render_comparison, render_enrichment, render_history, render_profile,
    render_rate_limit, render_repo_history,
};
