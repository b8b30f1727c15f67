//! Plotters drawing of the ranked elasticity bar chart.
//!
//! The same drawing routine feeds two backends:
//! - the SVG artifact written next to the results (`write_elasticity_chart`)
//! - the terminal widget in the TUI (via `plotters-ratatui-backend`)
//!
//! Bars are horizontal, one per presented product, first row at the top.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::domain::ProductRecord;
use crate::error::AppError;

/// File name of the chart inside the media directory.
pub const CHART_FILENAME: &str = "plot.svg";

const SVG_SIZE: (u32, u32) = (1200, 1000);

/// Labels longer than this are cut before wrapping.
const LABEL_MAX_CHARS: usize = 20;
const LABEL_WRAP_WIDTH: usize = 15;

/// A written chart and the URL it is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub url: String,
}

/// Sizes and colors for one rendering target.
#[derive(Debug, Clone)]
pub struct ChartTheme {
    pub margin: u32,
    pub left_label_area: u32,
    pub bottom_label_area: u32,
    pub font_size: f64,
    pub line_height: i32,
    pub bar_margin: u32,
    pub wrap_labels: bool,
    pub text: RGBColor,
    pub axis: RGBColor,
}

impl ChartTheme {
    pub fn svg() -> Self {
        Self {
            margin: 20,
            left_label_area: 180,
            bottom_label_area: 50,
            font_size: 14.0,
            line_height: 15,
            bar_margin: 4,
            wrap_labels: true,
            text: BLACK,
            axis: BLACK,
        }
    }

    /// Terminal cells are low-res, so keep label areas compact and single-line.
    pub fn terminal() -> Self {
        Self {
            margin: 1,
            left_label_area: 16,
            bottom_label_area: 3,
            font_size: 10.0,
            line_height: 1,
            bar_margin: 0,
            wrap_labels: false,
            text: WHITE,
            axis: WHITE,
        }
    }
}

/// Write the chart for `rows` into `media_dir` and return where it lives.
pub fn write_elasticity_chart(
    media_dir: &Path,
    media_url: &str,
    rows: &[ProductRecord],
) -> Result<ChartArtifact, AppError> {
    create_dir_all(media_dir).map_err(|e| {
        AppError::new(4, format!("Failed to create media dir '{}': {e}", media_dir.display()))
    })?;
    let path = media_dir.join(CHART_FILENAME);

    {
        let root = SVGBackend::new(&path, SVG_SIZE).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AppError::new(4, format!("Failed to render chart: {e}")))?;
        draw_elasticity_bars(&root, rows, &ChartTheme::svg())
            .map_err(|e| AppError::new(4, format!("Failed to render chart: {e}")))?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Failed to write chart '{}': {e}", path.display())))?;
    }

    let url = chart_url(media_url);
    info!(path = %path.display(), %url, bars = rows.len(), "wrote elasticity chart");
    Ok(ChartArtifact { path, url })
}

/// `media_url` joined with the chart file name.
pub fn chart_url(media_url: &str) -> String {
    if media_url.is_empty() || media_url.ends_with('/') {
        format!("{media_url}{CHART_FILENAME}")
    } else {
        format!("{media_url}/{CHART_FILENAME}")
    }
}

/// Draw the bar chart onto any Plotters drawing area.
pub fn draw_elasticity_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: &[ProductRecord],
    theme: &ChartTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (x0, x1) = elasticity_bounds(rows);
    let n = rows.len().max(1) as i32;
    // First row at the top.
    let slot = |i: usize| n - 1 - i as i32;

    let mut chart = ChartBuilder::on(root)
        .margin(theme.margin)
        .set_label_area_size(LabelAreaPosition::Left, theme.left_label_area)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.bottom_label_area)
        .build_cartesian_2d(x0..x1, (0..n).into_segmented())?;

    let font = ("sans-serif", theme.font_size);

    // Product labels are drawn by hand below so they can wrap.
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("price elasticity")
        .x_labels(7)
        .y_label_formatter(&|_| String::new())
        .x_label_formatter(&|v| format!("{v:.1}"))
        .label_style(font.into_font().color(&theme.text))
        .axis_style(&theme.axis)
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let color = Palette99::pick(i).mix(0.9);
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(slot(i))),
                (r.price_elasticity, SegmentValue::Exact(slot(i) + 1)),
            ],
            color.filled(),
        );
        bar.set_margin(theme.bar_margin, theme.bar_margin, 0, 0);
        bar
    }))?;

    // Value labels at the bar ends.
    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let hpos = if r.price_elasticity < 0.0 { HPos::Right } else { HPos::Left };
        let style = font
            .into_font()
            .color(&theme.text)
            .pos(Pos::new(hpos, VPos::Center));
        Text::new(
            format!("{:.2}", r.price_elasticity),
            (r.price_elasticity, SegmentValue::CenterOf(slot(i))),
            style,
        )
    }))?;

    let label_style = font
        .into_font()
        .color(&theme.text)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (i, r) in rows.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(x0, SegmentValue::CenterOf(slot(i))));
        let lines = if theme.wrap_labels {
            label_lines(&r.name)
        } else {
            vec![r.name.chars().take(LABEL_MAX_CHARS).collect()]
        };
        let first = py - (lines.len() as i32 - 1) * theme.line_height / 2;
        for (k, line) in lines.iter().enumerate() {
            root.draw(&Text::new(
                line.clone(),
                (px - 4, first + k as i32 * theme.line_height),
                label_style.clone(),
            ))?;
        }
    }

    Ok(())
}

/// X range covering zero and every bar, padded for value labels.
pub fn elasticity_bounds(rows: &[ProductRecord]) -> (f64, f64) {
    let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
    for r in rows {
        if r.price_elasticity.is_finite() {
            lo = lo.min(r.price_elasticity);
            hi = hi.max(r.price_elasticity);
        }
    }
    if hi - lo < 1e-12 {
        return (-1.0, 1.0);
    }
    let pad = (hi - lo) * 0.12;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

/// Axis label for a product: names over 20 chars are cut to 20 and wrapped at 15.
pub fn label_lines(name: &str) -> Vec<String> {
    if name.chars().count() <= LABEL_MAX_CHARS {
        return vec![name.to_string()];
    }
    let cut: String = name.chars().take(LABEL_MAX_CHARS).collect();
    wrap_words(&cut, LABEL_WRAP_WIDTH)
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let sep = usize::from(used > 0);
            if used + sep + word.len() <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if used > 0 {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            // Word alone does not fit: split it.
            let rest = word.split_off(width);
            lines.push(word.iter().collect());
            word = rest;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::record;

    #[test]
    fn short_labels_are_kept() {
        assert_eq!(label_lines("Sony A7 IV"), vec!["Sony A7 IV"]);
        assert_eq!(label_lines("exactly twenty chars"), vec!["exactly twenty chars"]);
    }

    #[test]
    fn long_labels_are_cut_and_wrapped() {
        let lines = label_lines("Samsung 65 inch Crystal UHD Smart TV");
        // Cut to "Samsung 65 inch Crys", wrapped at 15.
        assert_eq!(lines, vec!["Samsung 65 inch", "Crys"]);
        assert!(lines.iter().all(|l| l.chars().count() <= LABEL_WRAP_WIDTH));
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(
            wrap_words("abcdefghijklmnopqrst", 15),
            vec!["abcdefghijklmno", "pqrst"]
        );
    }

    #[test]
    fn bounds_include_zero_and_padding() {
        let rows = vec![record("a", -4.0), record("b", -1.0)];
        let (lo, hi) = elasticity_bounds(&rows);
        assert!(lo < -4.0);
        assert_eq!(hi, 0.0);
        assert_eq!(elasticity_bounds(&[]), (-1.0, 1.0));
    }

    #[test]
    fn chart_url_joins_prefix() {
        assert_eq!(chart_url("/media/"), "/media/plot.svg");
        assert_eq!(chart_url("https://cdn.example/m"), "https://cdn.example/m/plot.svg");
    }

    #[test]
    fn writes_svg_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        let rows = vec![
            record("Canon EOS R50 Mirrorless Kit", -3.2),
            record("Nikon Z fc", -1.1),
            record("Fujifilm X-T30 II", 0.4),
        ];
        let artifact = write_elasticity_chart(&media, "/media/", &rows).unwrap();
        assert_eq!(artifact.url, "/media/plot.svg");

        let svg = std::fs::read_to_string(&artifact.path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Nikon Z fc"));
        assert!(svg.contains("-3.20"));
    }

    #[test]
    fn empty_chart_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write_elasticity_chart(dir.path(), "/media/", &[]).unwrap();
        assert!(artifact.path.exists());
    }
}
