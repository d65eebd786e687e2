// ============================================================
// Layer 6 — SVG Plots
// ============================================================
// A minimal line-chart renderer used for the loss curves and the
// per-sample diagnostic overlays. Writes plain SVG: one polyline
// per series over a shared linear scale, axis frame, and a text
// legend. Callers treat rendering as best-effort — a failed
// write is logged and the run continues.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::{fs, path::Path};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN: f64 = 48.0;

/// One named curve of the chart.
pub struct Series<'a> {
    pub label:  &'a str,
    pub color:  &'a str,
    pub points: &'a [f64],
}

impl<'a> Series<'a> {
    pub fn new(label: &'a str, color: &'a str, points: &'a [f64]) -> Self {
        Self { label, color, points }
    }
}

/// Render `series` as an SVG line chart at `path`, creating
/// parent directories as needed. NaN points are skipped.
pub fn line_chart(path: &Path, title: &str, series: &[Series]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create plot directory '{}'", parent.display()))?;
    }

    let svg = render(title, series);
    fs::write(path, svg).with_context(|| format!("Cannot write plot '{}'", path.display()))?;
    tracing::debug!("Wrote plot '{}'", path.display());
    Ok(())
}

fn render(title: &str, series: &[Series]) -> String {
    let max_len = series.iter().map(|s| s.points.len()).max().unwrap_or(0);

    let finite = series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .filter(|v| v.is_finite());
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    for v in finite {
        y_min = y_min.min(v);
        y_max = y_max.max(v);
    }
    if y_min > y_max {
        // No finite data at all; draw an empty frame.
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max - y_min < f64::EPSILON {
        // Flat series: pad the range so the line is visible.
        y_min -= 0.5;
        y_max += 0.5;
    }

    let x_span = (max_len.saturating_sub(1)).max(1) as f64;
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;

    let x_at = |i: usize| MARGIN + (i as f64 / x_span) * plot_w;
    let y_at = |v: f64| MARGIN + (1.0 - (v - y_min) / (y_max - y_min)) * plot_h;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="24" font-family="sans-serif" font-size="16" text-anchor="middle">{title}</text>"#,
        WIDTH / 2.0
    );

    // Axis frame.
    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN}" y="{MARGIN}" width="{plot_w}" height="{plot_h}" fill="none" stroke="gray"/>"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="8" y="{}" font-family="sans-serif" font-size="11">{y_max:.4}</text>"#,
        MARGIN + 4.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="8" y="{}" font-family="sans-serif" font-size="11">{y_min:.4}</text>"#,
        MARGIN + plot_h
    );

    for s in series {
        let mut points = String::new();
        for (i, &v) in s.points.iter().enumerate() {
            if v.is_finite() {
                let _ = write!(points, "{:.2},{:.2} ", x_at(i), y_at(v));
            }
        }
        let _ = writeln!(
            svg,
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            s.color,
            points.trim_end()
        );
    }

    // Legend, top-right, one line per series.
    for (row, s) in series.iter().enumerate() {
        let y = MARGIN + 16.0 + row as f64 * 16.0;
        let x = WIDTH - MARGIN - 140.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{x}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="2"/>"#,
            x + 20.0,
            s.color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="12">{}</text>"#,
            x + 26.0,
            y + 4.0,
            s.label
        );
    }

    svg.push_str("</svg>\n");
    svg
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_is_written_with_one_polyline_per_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.svg");

        let train = [1.0, 0.5, 0.25];
        let valid = [1.2, 0.7, 0.4];
        line_chart(
            &path,
            "loss",
            &[
                Series::new("Train", "steelblue", &train),
                Series::new("Validation", "darkorange", &valid),
            ],
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("Validation"));
    }

    #[test]
    fn test_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/plot.svg");
        let points = [0.0, 1.0];
        line_chart(&path, "t", &[Series::new("s", "peru", &points)]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_flat_and_empty_series_do_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let flat = [2.0, 2.0, 2.0];
        line_chart(
            &dir.path().join("flat.svg"),
            "flat",
            &[Series::new("s", "gray", &flat)],
        )
        .unwrap();
        line_chart(&dir.path().join("empty.svg"), "empty", &[]).unwrap();
    }
}
