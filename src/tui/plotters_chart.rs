//! Plotters-powered elasticity bar chart widget for Ratatui.
//!
//! The drawing itself is shared with the SVG artifact (`plot::draw_elasticity_bars`);
//! this widget only supplies the terminal theme and the backend.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::ProductRecord;
use crate::plot::{ChartTheme, draw_elasticity_bars};

/// Render-only view over the presented rows.
pub struct ElasticityChart<'a> {
    pub rows: &'a [ProductRecord],
}

impl<'a> Widget for ElasticityChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 30 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if self.rows.is_empty() {
            buf.set_string(
                area.x,
                area.y,
                "No products to chart.",
                Style::default().fg(Color::Gray),
            );
            return;
        }

        let rows = self.rows;
        let widget = widget_fn(move |root| {
            draw_elasticity_bars(&root, rows, &ChartTheme::terminal())?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
