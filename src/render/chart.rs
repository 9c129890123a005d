// Chart rendering.
// Self-contained SVG bar and pie charts built from a canonical profile.

use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::model::CanonicalProfile;
use crate::normalizer::language_distribution;

const BAR_WIDTH: f64 = 900.0;
const BAR_HEIGHT: f64 = 540.0;
const BAR_MARGIN_LEFT: f64 = 70.0;
const BAR_MARGIN_RIGHT: f64 = 30.0;
const BAR_MARGIN_TOP: f64 = 60.0;
const BAR_MARGIN_BOTTOM: f64 = 150.0;
const BAR_COLOR: &str = "#87ceeb";

const PIE_SIZE: f64 = 640.0;
const PIE_RADIUS: f64 = 220.0;
const PIE_LEGEND_WIDTH: f64 = 240.0;
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// One bar of the stars chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

/// One slice of the language chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
}

/// Bars in repository order.
pub fn bar_chart_data(profile: &CanonicalProfile) -> Vec<Bar> {
    profile
        .top_repositories
        .iter()
        .map(|repo| Bar {
            label: repo.name.clone(),
            value: repo.stars,
        })
        .collect()
}

/// Slices in order of first appearance of each language.
pub fn pie_chart_data(profile: &CanonicalProfile) -> Vec<Slice> {
    let counts = language_distribution(&profile.top_repositories);
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    counts
        .into_iter()
        .map(|(label, count)| Slice {
            fraction: count as f64 / total.max(1) as f64,
            label,
            count,
        })
        .collect()
}

/// Bar chart of stars per repository, or `None` without repositories.
pub fn bar_chart_svg(profile: &CanonicalProfile) -> Option<String> {
    let bars = bar_chart_data(profile);
    if bars.is_empty() {
        return None;
    }

    let plot_width = BAR_WIDTH - BAR_MARGIN_LEFT - BAR_MARGIN_RIGHT;
    let plot_height = BAR_HEIGHT - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;
    let baseline = BAR_MARGIN_TOP + plot_height;
    let max = bars.iter().map(|bar| bar.value).max().unwrap_or(0).max(1) as f64;
    let slot = plot_width / bars.len() as f64;
    let bar_width = slot * 0.7;

    let mut svg = svg_open(BAR_WIDTH, BAR_HEIGHT);
    let _ = writeln!(
        svg,
        r#"  <text class="title" x="{:.1}" y="32" text-anchor="middle" font-size="18">Top Repositories by Stars for {}</text>"#,
        BAR_WIDTH / 2.0,
        escape_xml(&profile.subject_id)
    );
    let _ = writeln!(
        svg,
        r##"  <line x1="{left:.1}" y1="{baseline:.1}" x2="{right:.1}" y2="{baseline:.1}" stroke="#333"/>"##,
        left = BAR_MARGIN_LEFT,
        right = BAR_WIDTH - BAR_MARGIN_RIGHT,
        baseline = baseline
    );
    let _ = writeln!(
        svg,
        r#"  <text x="18" y="{:.1}" transform="rotate(-90 18 {:.1})" text-anchor="middle" font-size="13">Stars</text>"#,
        BAR_MARGIN_TOP + plot_height / 2.0,
        BAR_MARGIN_TOP + plot_height / 2.0
    );

    for (i, bar) in bars.iter().enumerate() {
        let height = bar.value as f64 / max * plot_height;
        let x = BAR_MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = baseline - height;
        let center = x + bar_width / 2.0;
        let label = escape_xml(&bar.label);

        let _ = writeln!(
            svg,
            r#"  <rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{BAR_COLOR}"><title>{label}: {value}</title></rect>"#,
            value = bar.value
        );
        let _ = writeln!(
            svg,
            r#"  <text class="value" x="{center:.1}" y="{:.1}" text-anchor="middle" font-size="11">{}</text>"#,
            y - 4.0,
            bar.value
        );
        let _ = writeln!(
            svg,
            r#"  <text class="label" x="{center:.1}" y="{:.1}" transform="rotate(-45 {center:.1} {:.1})" text-anchor="end" font-size="12">{label}</text>"#,
            baseline + 16.0,
            baseline + 16.0
        );
    }

    let _ = writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">Repository</text>"#,
        BAR_MARGIN_LEFT + plot_width / 2.0,
        BAR_HEIGHT - 12.0
    );
    svg.push_str("</svg>\n");
    Some(svg)
}

/// Pie chart of repository languages, or `None` without repositories.
pub fn pie_chart_svg(profile: &CanonicalProfile) -> Option<String> {
    let slices = pie_chart_data(profile);
    if slices.is_empty() {
        return None;
    }

    let width = PIE_SIZE + PIE_LEGEND_WIDTH;
    let (cx, cy) = (PIE_SIZE / 2.0, PIE_SIZE / 2.0 + 20.0);
    let mut svg = svg_open(width, PIE_SIZE + 40.0);
    let _ = writeln!(
        svg,
        r#"  <text class="title" x="{:.1}" y="32" text-anchor="middle" font-size="18">Programming Languages Distribution for {}</text>"#,
        width / 2.0,
        escape_xml(&profile.subject_id)
    );

    // Angles run clockwise from 12 o'clock.
    let mut start = -PI / 2.0;
    for (i, slice) in slices.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let label = escape_xml(&slice.label);
        let percent = slice.fraction * 100.0;

        if slices.len() == 1 {
            let _ = writeln!(
                svg,
                r#"  <circle class="slice" cx="{cx:.1}" cy="{cy:.1}" r="{PIE_RADIUS:.1}" fill="{color}"><title>{label}: {count} ({percent:.1}%)</title></circle>"#,
                count = slice.count
            );
        } else {
            let end = start + slice.fraction * 2.0 * PI;
            let (x1, y1) = (cx + PIE_RADIUS * start.cos(), cy + PIE_RADIUS * start.sin());
            let (x2, y2) = (cx + PIE_RADIUS * end.cos(), cy + PIE_RADIUS * end.sin());
            let large_arc = u8::from(slice.fraction > 0.5);
            let _ = writeln!(
                svg,
                r##"  <path class="slice" d="M {cx:.1} {cy:.1} L {x1:.2} {y1:.2} A {PIE_RADIUS:.1} {PIE_RADIUS:.1} 0 {large_arc} 1 {x2:.2} {y2:.2} Z" fill="{color}" stroke="#fff"><title>{label}: {count} ({percent:.1}%)</title></path>"##,
                count = slice.count
            );
            start = end;
        }

        let legend_y = 80.0 + 24.0 * i as f64;
        let _ = writeln!(
            svg,
            r#"  <rect x="{:.1}" y="{:.1}" width="14" height="14" fill="{color}"/>"#,
            PIE_SIZE,
            legend_y - 11.0
        );
        let _ = writeln!(
            svg,
            r#"  <text class="legend" x="{:.1}" y="{legend_y:.1}" font-size="13">{label} ({percent:.1}%)</text>"#,
            PIE_SIZE + 22.0
        );
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

fn svg_open(width: f64, height: f64) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="Arial, sans-serif">"#,
            "\n",
            r#"  <rect width="100%" height="100%" fill="white"/>"#,
            "\n"
        ),
        w = width,
        h = height
    )
}

/// Escape text for use inside SVG elements and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
