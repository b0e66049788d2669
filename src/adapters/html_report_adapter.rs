//! HTML report adapter implementing ReportPort.
//!
//! Writes `<asset>_report.html`: an inline SVG line chart of every strategy
//! instance's PnL curve, titled with the window dates, beside the summary table.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::domain::error::LongbiasError;
use crate::domain::metrics::SUMMARY_HEADERS;
use crate::domain::portfolio::{PnlTable, PortfolioResult};
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 760.0;
const HEIGHT: f64 = 360.0;
const PADDING: f64 = 50.0;
const LEGEND_ROW: f64 = 16.0;

const SERIES_COLORS: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Runs of consecutive defined values in one column, as (row index, value).
fn segments(table: &PnlTable, col: usize) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, row) in table.rows.iter().enumerate() {
        match row[col] {
            Some(v) => current.push((i, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Line chart of a wide PnL table: one `<g class="series">` per column,
/// one polyline per run of defined values. The y range always includes 0.
pub fn pnl_chart_svg(table: &PnlTable, title: &str) -> String {
    if table.dates.is_empty() || table.columns.is_empty() {
        return "<p>No PnL data available.</p>".to_string();
    }

    let values = table.rows.iter().flatten().flatten().copied();
    let (min_pnl, max_pnl) =
        values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let legend_height = LEGEND_ROW * table.columns.len() as f64;
    let height = HEIGHT + legend_height;
    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let bottom = HEIGHT - PADDING;

    let range = max_pnl - min_pnl;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if table.dates.len() > 1 {
        plot_width / (table.dates.len() - 1) as f64
    } else {
        0.0
    };
    let x = |i: usize| PADDING + i as f64 * scale_x;
    let y = |v: f64| bottom - (v - min_pnl) * scale_y;

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{height:.0}"
 viewBox="0 0 {WIDTH:.0} {height:.0}" font-family="sans-serif" font-size="11">
<text x="{:.0}" y="20" text-anchor="middle" font-size="14">{}</text>
<line x1="{PADDING:.0}" y1="{PADDING:.0}" x2="{PADDING:.0}" y2="{bottom:.0}" stroke="#444"/>
<line x1="{PADDING:.0}" y1="{bottom:.0}" x2="{:.0}" y2="{bottom:.0}" stroke="#444"/>
<line x1="{PADDING:.0}" y1="{:.1}" x2="{:.0}" y2="{:.1}" stroke="#bbb" stroke-dasharray="4 3"/>
<text x="{:.0}" y="{:.1}" text-anchor="end">{max_pnl:.2}</text>
<text x="{:.0}" y="{:.1}" text-anchor="end">{min_pnl:.2}</text>
<text x="{PADDING:.0}" y="{:.0}">{}</text>
<text x="{:.0}" y="{:.0}" text-anchor="end">{}</text>
"##,
        WIDTH / 2.0,
        escape(title),
        WIDTH - PADDING,
        y(0.0),
        WIDTH - PADDING,
        y(0.0),
        PADDING - 4.0,
        y(max_pnl) + 4.0,
        PADDING - 4.0,
        y(min_pnl) + 4.0,
        bottom + 16.0,
        table.dates[0],
        WIDTH - PADDING,
        bottom + 16.0,
        table.dates[table.dates.len() - 1],
    );

    for (col, name) in table.columns.iter().enumerate() {
        let color = SERIES_COLORS[col % SERIES_COLORS.len()];
        let _ = writeln!(svg, r#"<g class="series" data-strategy="{}">"#, escape(name));
        for run in segments(table, col) {
            let points: Vec<String> = run
                .iter()
                .map(|&(i, v)| format!("{:.1},{:.1}", x(i), y(v)))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{}"/>"#,
                points.join(" ")
            );
        }
        let legend_y = HEIGHT + LEGEND_ROW * col as f64;
        let _ = writeln!(
            svg,
            r#"<rect x="{PADDING:.0}" y="{:.0}" width="10" height="10" fill="{color}"/>"#,
            legend_y - 9.0
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.0}" y="{:.0}">{}</text>"#,
            PADDING + 16.0,
            legend_y,
            escape(name)
        );
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>");
    svg
}

fn summary_table_html(result: &PortfolioResult) -> String {
    let mut html = String::from("<table class=\"summary\">\n<tr>");
    for header in SUMMARY_HEADERS {
        let _ = write!(html, "<th>{}</th>", escape(header));
    }
    html.push_str("</tr>\n");
    for record in &result.summaries {
        html.push_str("<tr>");
        for cell in record.to_row() {
            let _ = write!(html, "<td>{}</td>", escape(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

pub fn render_report(result: &PortfolioResult) -> String {
    let title = match (result.pnl.dates.first(), result.pnl.dates.last()) {
        (Some(start), Some(end)) => {
            format!("{} PnL (%) from {} to {}", result.asset, start, end)
        }
        _ => format!("{} PnL (%)", result.asset),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
.report {{ display: flex; flex-wrap: wrap; gap: 2em; align-items: flex-start; }}
table.summary {{ border-collapse: collapse; }}
table.summary th, table.summary td {{
  border: 1px solid #ccc; padding: 4px 8px; text-align: right;
}}
table.summary td:first-child {{ text-align: left; }}
</style>
</head>
<body>
<h1>{asset}</h1>
<div class="report">
<div class="chart">
{chart}
</div>
{table}
</div>
</body>
</html>
"#,
        title = escape(&title),
        asset = escape(&result.asset),
        chart = pnl_chart_svg(&result.pnl, &title),
        table = summary_table_html(result),
    )
}

pub struct HtmlReportAdapter {
    output_dir: PathBuf,
}

impl HtmlReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn report_path(&self, asset: &str) -> PathBuf {
        self.output_dir.join(format!("{}_report.html", asset))
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, result: &PortfolioResult) -> Result<(), LongbiasError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.report_path(&result.asset);
        fs::write(&path, render_report(result))?;
        info!(asset = %result.asset, path = %path.display(), "html report written");
        Ok(())
    }
}
