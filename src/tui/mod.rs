//! Ratatui-based terminal UI.
//!
//! Pick a merchant and category on the left; the ranked elasticity chart and the
//! presented products follow the selection. Results are cached per selection for
//! the lifetime of the session.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{EstimateCache, RunOutput};
use crate::config::Settings;
use crate::domain::{MerchantCatalog, Selection};
use crate::error::AppError;
use crate::io::ingest::{Dataset, load_observations};

mod plotters_chart;

use plotters_chart::ElasticityChart;

/// Start the TUI, optionally preselecting a merchant/category.
pub fn run(
    settings: Settings,
    merchant: Option<String>,
    category: Option<String>,
) -> Result<(), AppError> {
    // Fail before touching the terminal if there is nothing to show.
    let catalog = settings.merchant_catalog()?;
    let dataset = load_observations(settings.data_path()?)?;

    let mut app = App::new(settings, catalog, dataset);
    app.preselect(merchant.as_deref(), category.as_deref());

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Merchant,
    Category,
    Products,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Merchant => Focus::Category,
            Focus::Category => Focus::Products,
            Focus::Products => Focus::Merchant,
        }
    }
}

struct App {
    settings: Settings,
    catalog: MerchantCatalog,
    merchants: Vec<String>,
    dataset: Dataset,
    cache: EstimateCache,
    merchant_idx: usize,
    category_idx: usize,
    product_idx: usize,
    focus: Focus,
    show_detail: bool,
    selection: Option<Selection>,
    status: String,
}

impl App {
    fn new(settings: Settings, catalog: MerchantCatalog, dataset: Dataset) -> Self {
        let merchants = catalog.merchants().map(str::to_string).collect();
        let mut app = Self {
            settings,
            catalog,
            merchants,
            dataset,
            cache: EstimateCache::new(),
            merchant_idx: 0,
            category_idx: 0,
            product_idx: 0,
            focus: Focus::Merchant,
            show_detail: false,
            selection: None,
            status: String::new(),
        };
        app.refresh();
        app
    }

    /// Jump to a merchant/category given on the command line.
    fn preselect(&mut self, merchant: Option<&str>, category: Option<&str>) {
        if merchant.is_none() && category.is_none() {
            return;
        }
        match self.catalog.validate(merchant, category) {
            Ok(selection) => {
                self.merchant_idx = self
                    .merchants
                    .iter()
                    .position(|m| *m == selection.merchant)
                    .unwrap_or(0);
                self.category_idx = self
                    .categories()
                    .iter()
                    .position(|c| *c == selection.category)
                    .unwrap_or(0);
                self.refresh();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn categories(&self) -> &[String] {
        self.merchants
            .get(self.merchant_idx)
            .map(|m| self.catalog.categories(m))
            .unwrap_or(&[])
    }

    /// Validate the highlighted pair and make sure its run is cached.
    fn refresh(&mut self) {
        self.product_idx = 0;
        self.show_detail = false;

        let merchant = self.merchants.get(self.merchant_idx).map(String::as_str);
        let category = self.categories().get(self.category_idx).map(String::as_str);
        match self.catalog.validate(merchant, category) {
            Ok(selection) => {
                let run = self.cache.get_or_run(&self.dataset, &selection);
                self.status = format!(
                    "{} of {} products presented ({} skipped)",
                    run.presented.len(),
                    run.products_fitted,
                    run.skipped.len(),
                );
                self.selection = Some(selection);
            }
            Err(err) => {
                self.selection = None;
                self.status = err.to_string();
            }
        }
    }

    fn run_output(&self) -> Option<&RunOutput> {
        self.selection.as_ref().and_then(|s| self.cache.get(s))
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.show_detail {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace) {
                self.show_detail = false;
            }
            return code == KeyCode::Char('q');
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up => self.step(-1),
            KeyCode::Down => self.step(1),
            KeyCode::Enter => {
                if self.focus == Focus::Products && self.presented_len() > 0 {
                    self.show_detail = true;
                }
            }
            KeyCode::Char('s') => self.save_chart(),
            _ => {}
        }
        false
    }

    fn presented_len(&self) -> usize {
        self.run_output().map(|r| r.presented.len()).unwrap_or(0)
    }

    fn step(&mut self, delta: i32) {
        match self.focus {
            Focus::Merchant => {
                let next = shift(self.merchant_idx, delta, self.merchants.len());
                if next != self.merchant_idx {
                    self.merchant_idx = next;
                    self.category_idx = 0;
                    self.refresh();
                }
            }
            Focus::Category => {
                let next = shift(self.category_idx, delta, self.categories().len());
                if next != self.category_idx {
                    self.category_idx = next;
                    self.refresh();
                }
            }
            Focus::Products => {
                self.product_idx = shift(self.product_idx, delta, self.presented_len());
            }
        }
    }

    fn save_chart(&mut self) {
        let Some(run) = self.run_output() else {
            self.status = "Please select both a valid merchant and category.".to_string();
            return;
        };
        self.status = match crate::plot::write_elasticity_chart(
            &self.settings.media_dir,
            &self.settings.media_url,
            &run.presented,
        ) {
            Ok(artifact) => format!("Wrote chart: {} ({})", artifact.url, artifact.path.display()),
            Err(err) => format!("Chart write failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_detail {
            self.draw_detail(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("elast", Style::default().fg(Color::Cyan)),
            Span::raw(" | price elasticity of demand"),
        ]));

        let summary = match (&self.selection, self.run_output()) {
            (Some(sel), Some(run)) => format!(
                "{} / {} | rows={} | fitted={} | significant={} | presented={}",
                sel.merchant,
                sel.category,
                run.rows_matched,
                run.products_fitted,
                run.table.len(),
                run.presented.len(),
            ),
            _ => "no valid selection".to_string(),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32),
                Constraint::Min(30),
                Constraint::Length(44),
            ])
            .split(area);

        let pickers = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(columns[0]);

        self.draw_picker(
            frame,
            pickers[0],
            "Merchant",
            &self.merchants,
            self.merchant_idx,
            self.focus == Focus::Merchant,
        );
        self.draw_picker(
            frame,
            pickers[1],
            "Category",
            self.categories(),
            self.category_idx,
            self.focus == Focus::Category,
        );
        self.draw_chart(frame, columns[1]);
        self.draw_products(frame, columns[2]);
    }

    fn draw_picker(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        items: &[String],
        selected: usize,
        focused: bool,
    ) {
        let list = List::new(items.iter().map(|s| ListItem::new(s.as_str())))
            .block(focus_block(title, focused))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(selected));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price elasticity").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = self.run_output() else {
            let msg = Paragraph::new("Please select both a valid merchant and category.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        frame.render_widget(ElasticityChart { rows: &run.presented }, inner);
    }

    fn draw_products(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = self.run_output().map(|r| r.presented.as_slice()).unwrap_or(&[]);
        let items: Vec<ListItem> = rows
            .iter()
            .map(|r| {
                ListItem::new(format!(
                    "{:<30} {:>8.3}",
                    crate::report::format::truncate(&r.name, 30),
                    r.price_elasticity
                ))
            })
            .collect();

        let list = List::new(items)
            .block(focus_block("Products (Enter: detail)", self.focus == Focus::Products))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.product_idx.min(rows.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(record) = self
            .run_output()
            .and_then(|r| r.presented.get(self.product_idx))
        else {
            return;
        };

        let lines: Vec<Line> = record
            .fields()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:<20}"), Style::default().fg(Color::Gray)),
                    Span::raw(value),
                ])
            })
            .collect();

        let rect = centered(area, 64, lines.len() as u16 + 2);
        frame.render_widget(Clear, rect);
        let p = Paragraph::new(Text::from(lines)).block(
            Block::default()
                .title("Product detail (Esc to close)")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(p, rect);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab focus  ↑/↓ select  Enter detail  s save chart  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

/// Move `idx` by `delta`, clamped to `0..len`.
fn shift(idx: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = idx as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn dataset() -> Dataset {
        let mut rows = Vec::new();
        for (period, (price, demand)) in [(10.0, 100.0), (11.0, 92.0), (12.0, 85.0), (13.0, 76.0), (14.0, 70.0)]
            .into_iter()
            .enumerate()
        {
            rows.push(Observation {
                name: "Dashcam".to_string(),
                merchant: "Walmart.com".to_string(),
                category: "car, gps, dash".to_string(),
                period: period as i64 + 1,
                price,
                demand,
                brand: Some("Acme".to_string()),
            });
        }
        Dataset::from_observations(rows)
    }

    fn app() -> App {
        App::new(Settings::default(), MerchantCatalog::default(), dataset())
    }

    #[test]
    fn shift_clamps_to_bounds() {
        assert_eq!(shift(0, -1, 3), 0);
        assert_eq!(shift(1, 1, 3), 2);
        assert_eq!(shift(2, 1, 3), 2);
        assert_eq!(shift(5, 1, 0), 0);
    }

    #[test]
    fn preselect_runs_and_caches_the_estimate() {
        let mut app = app();
        app.preselect(Some("Walmart.com"), Some("car, gps, dash"));
        let run = app.run_output().unwrap();
        assert_eq!(run.presented.len(), 1);
        assert_eq!(run.presented[0].name, "Dashcam");

        // Startup cached the first category; moving away and back adds nothing.
        let before = app.cache.len();
        assert_eq!(before, 2);
        app.focus = Focus::Category;
        app.step(-1);
        app.step(1);
        assert_eq!(app.cache.len(), before);
        assert_eq!(app.selection.as_ref().unwrap().category, "car, gps, dash");
    }

    #[test]
    fn invalid_preselect_reports_message() {
        let mut app = app();
        app.preselect(Some("target.com"), Some("toys"));
        assert_eq!(app.status, "Please select both a valid merchant and category.");
    }

    #[test]
    fn detail_opens_only_on_products() {
        let mut app = app();
        app.preselect(Some("Walmart.com"), Some("car, gps, dash"));
        assert!(!app.handle_key(KeyCode::Enter));
        assert!(!app.show_detail);

        app.focus = Focus::Products;
        app.handle_key(KeyCode::Enter);
        assert!(app.show_detail);
        app.handle_key(KeyCode::Esc);
        assert!(!app.show_detail);
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
