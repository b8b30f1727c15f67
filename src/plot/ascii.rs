//! ASCII bar chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! One row per product: `label |   ####|        -1.23`, with `|` marking zero.

use crate::domain::ProductRecord;
use crate::plot::chart::elasticity_bounds;
use crate::report::format::truncate;

const LABEL_WIDTH: usize = 20;

/// Render presented rows as horizontal bars `width` columns wide.
pub fn render_ascii_bars(rows: &[ProductRecord], width: usize) -> String {
    let width = width.max(10);
    let (lo, hi) = elasticity_bounds(rows);

    let mut out = String::new();
    out.push_str(&format!("Elasticity: [{lo:.2}, {hi:.2}] | n={}\n", rows.len()));

    let zero = map_x(0.0, lo, hi, width);
    for r in rows {
        let v = map_x(r.price_elasticity, lo, hi, width);
        let (from, to) = if v < zero { (v, zero) } else { (zero, v) };

        let mut bar = vec![' '; width];
        for cell in bar.iter_mut().take(to + 1).skip(from) {
            *cell = '#';
        }
        bar[zero] = '|';

        out.push_str(&format!(
            "{:<w$} {} {:>9.3}\n",
            truncate(&r.name, LABEL_WIDTH),
            bar.iter().collect::<String>(),
            r.price_elasticity,
            w = LABEL_WIDTH,
        ));
    }

    out
}

fn map_x(x: f64, lo: f64, hi: f64, width: usize) -> usize {
    let u = ((x - lo) / (hi - lo)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::record;

    #[test]
    fn bars_grow_away_from_zero() {
        let rows = vec![record("neg", -2.0), record("pos", 1.0)];
        let out = render_ascii_bars(&rows, 40);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);

        let neg = lines[1];
        let pos = lines[2];
        let zero_neg = neg.find('|').unwrap();
        let zero_pos = pos.find('|').unwrap();
        assert_eq!(zero_neg, zero_pos);
        // Negative bar lies left of the axis, positive bar to the right.
        assert_eq!(neg.as_bytes()[zero_neg - 1], b'#');
        assert_eq!(pos.as_bytes()[zero_pos + 1], b'#');
        assert!(neg.trim_end().ends_with("-2.000"));
    }

    #[test]
    fn output_is_deterministic() {
        let rows = vec![record("a", -0.5), record("b", -3.0)];
        assert_eq!(render_ascii_bars(&rows, 30), render_ascii_bars(&rows, 30));
    }
}
