//! Ratatui-based terminal UI.
//!
//! One full-screen app with four pages (education, correlation, wealth,
//! literacy), each with its own selector fields and a plotters chart. Data
//! errors never exit the app; they land in the status line and the affected
//! chart is skipped.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotters::style::RGBColor;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
    Terminal,
};

use crate::app::pipeline::{self, CorrelationPage, EducationPage};
use crate::domain::{AppConfig, DiplomaTier, WealthTable};
use crate::error::AppError;
use crate::indicators::{correlation, literacy, wealth};
use crate::math::stats::Histogram;

mod plotters_chart;

use plotters_chart::{ChartLine, SeriesChart};

const CYAN: RGBColor = RGBColor(0, 255, 255);
const GREEN: RGBColor = RGBColor(0, 255, 0);
const YELLOW: RGBColor = RGBColor(255, 255, 0);

/// Start the TUI.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let datasets = pipeline::Datasets::load(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, datasets);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
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
enum Page {
    Education,
    Correlation,
    Wealth,
    Literacy,
}

impl Page {
    const ALL: [Page; 4] = [Page::Education, Page::Correlation, Page::Wealth, Page::Literacy];

    fn title(self) -> &'static str {
        match self {
            Page::Education => "Education",
            Page::Correlation => "Votes",
            Page::Wealth => "Wealth",
            Page::Literacy => "Literacy",
        }
    }

    fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    fn next(self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    fn prev(self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

struct App {
    config: AppConfig,
    datasets: pipeline::Datasets,
    page: Page,
    selected_field: usize,
    status: String,

    /// Years any commune has education counts for, sorted.
    education_years: Vec<u16>,
    tier: Option<DiplomaTier>,
    candidate_idx: usize,

    wealth_table_idx: usize,
    wealth_department_idx: usize,
    /// 0 = no commune selected, i = communes[i - 1].
    wealth_commune_idx: usize,
    wealth_column_idx: usize,

    lit_department_idx: usize,
    lit_commune_idx: usize,
    lit_year_idx: usize,

    education: Result<EducationPage, AppError>,
    correlation: Result<CorrelationPage, AppError>,
}

impl App {
    fn new(config: AppConfig, datasets: pipeline::Datasets) -> Self {
        let mut app = Self {
            config,
            datasets,
            page: Page::Education,
            selected_field: 0,
            status: String::new(),
            education_years: Vec::new(),
            tier: None,
            candidate_idx: 0,
            wealth_table_idx: 0,
            wealth_department_idx: 0,
            wealth_commune_idx: 0,
            wealth_column_idx: 0,
            lit_department_idx: 0,
            lit_commune_idx: 0,
            lit_year_idx: 0,
            education: Err(AppError::empty("not computed")),
            correlation: Err(AppError::empty("not computed")),
        };
        app.refresh_all();
        app
    }

    fn refresh_all(&mut self) {
        let mut years: Vec<u16> = self
            .datasets
            .communes
            .iter()
            .flat_map(|c| c.years.keys().copied())
            .collect();
        years.sort_unstable();
        years.dedup();
        self.education_years = years;

        self.refresh_education();
        self.refresh_correlation();
        self.status = format!(
            "{} communes, {} departments loaded",
            self.datasets.communes.len(),
            self.datasets.departments.len()
        );
    }

    fn refresh_education(&mut self) {
        self.education = pipeline::education_page(&self.datasets, &self.config);
        if let Err(e) = &self.education {
            self.status = e.to_string();
        }
    }

    fn refresh_correlation(&mut self) {
        self.correlation = pipeline::correlation_page(&self.datasets, &self.config);
        match &self.correlation {
            Ok(page) => {
                if self.candidate_idx >= page.candidates.len() {
                    self.candidate_idx = 0;
                }
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
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

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.switch_page(self.page.next()),
            KeyCode::BackTab => self.switch_page(self.page.prev()),
            KeyCode::Char('1') => self.switch_page(Page::Education),
            KeyCode::Char('2') => self.switch_page(Page::Correlation),
            KeyCode::Char('3') => self.switch_page(Page::Wealth),
            KeyCode::Char('4') => self.switch_page(Page::Literacy),
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.field_count() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('e') => {
                self.config.election = self.config.election.toggle();
                self.refresh_correlation();
                self.status = format!("election: {}", self.config.election.display_name());
            }
            KeyCode::Char('r') => match pipeline::Datasets::load(&self.config) {
                Ok(ds) => {
                    self.datasets = ds;
                    self.refresh_all();
                    self.status = "Reloaded datasets.".to_string();
                }
                Err(e) => self.status = format!("Reload failed: {e}"),
            },
            KeyCode::Char('d') => {
                match crate::debug::write_debug_bundle(&self.config, &self.datasets.summary()) {
                    Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
                    Err(e) => self.status = format!("Debug write failed: {e}"),
                }
            }
            _ => {}
        }
        false
    }

    fn switch_page(&mut self, page: Page) {
        self.page = page;
        self.selected_field = 0;
    }

    fn field_count(&self) -> usize {
        match self.page {
            Page::Education => 2,
            Page::Correlation => 3,
            Page::Wealth => 4,
            Page::Literacy => 3,
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        match (self.page, self.selected_field) {
            (Page::Education, 0) | (Page::Correlation, 0) => self.adjust_year(delta),
            (Page::Education, 1) => {
                let next = if delta >= 0 {
                    self.config.top_n.saturating_add(1)
                } else {
                    self.config.top_n.saturating_sub(1)
                };
                self.config.top_n = next.clamp(1, 30);
                self.refresh_education();
                self.status = format!("top-N: {}", self.config.top_n);
            }
            (Page::Correlation, 1) => {
                if let Ok(page) = &self.correlation {
                    if !page.candidates.is_empty() {
                        self.candidate_idx =
                            cycle(self.candidate_idx, page.candidates.len(), delta);
                        self.status = format!("candidate: {}", page.candidates[self.candidate_idx]);
                    }
                }
            }
            (Page::Correlation, 2) => {
                self.tier = cycle_tier(self.tier, delta);
                self.status = format!("indicator: {}", tier_label(self.tier));
            }
            (Page::Wealth, 0) => {
                self.wealth_table_idx = cycle(self.wealth_table_idx, WealthTable::ALL.len(), delta);
                self.wealth_department_idx = 0;
                self.wealth_commune_idx = 0;
                self.wealth_column_idx = 0;
                self.status = format!("table: {}", self.wealth_table().display_name());
            }
            (Page::Wealth, 1) => {
                let n = self.wealth_departments().len();
                if n > 0 {
                    self.wealth_department_idx = cycle(self.wealth_department_idx, n, delta);
                    self.wealth_commune_idx = 0;
                }
            }
            (Page::Wealth, 2) => {
                let n = self.wealth_communes().len();
                // Index 0 is "(none)".
                self.wealth_commune_idx = cycle(self.wealth_commune_idx, n + 1, delta);
            }
            (Page::Wealth, 3) => {
                if let Some(ds) = self.datasets.wealth_table(self.wealth_table()) {
                    if !ds.columns.is_empty() {
                        self.wealth_column_idx = cycle(self.wealth_column_idx, ds.columns.len(), delta);
                    }
                }
            }
            (Page::Literacy, 0) => {
                let n = literacy::departments(&self.datasets.literacy).len();
                if n > 0 {
                    self.lit_department_idx = cycle(self.lit_department_idx, n, delta);
                    self.lit_commune_idx = 0;
                    self.lit_year_idx = 0;
                }
            }
            (Page::Literacy, 1) => {
                let n = self.lit_communes().len();
                if n > 0 {
                    self.lit_commune_idx = cycle(self.lit_commune_idx, n, delta);
                    self.lit_year_idx = 0;
                }
            }
            (Page::Literacy, 2) => {
                let n = self.lit_years().len();
                if n > 0 {
                    self.lit_year_idx = cycle(self.lit_year_idx, n, delta);
                }
            }
            _ => {}
        }
    }

    fn adjust_year(&mut self, delta: i32) {
        let years = &self.education_years;
        if years.is_empty() {
            return;
        }
        let pos = years
            .iter()
            .position(|&y| y == self.config.year)
            .unwrap_or(years.len() - 1);
        let pos = cycle(pos, years.len(), delta);
        self.config.year = years[pos];
        self.refresh_education();
        self.refresh_correlation();
        self.status = format!("year: {}", self.config.year);
    }

    fn wealth_table(&self) -> WealthTable {
        WealthTable::ALL[self.wealth_table_idx % WealthTable::ALL.len()]
    }

    fn wealth_departments(&self) -> Vec<String> {
        self.datasets
            .wealth_table(self.wealth_table())
            .map(wealth::departments)
            .unwrap_or_default()
    }

    fn wealth_department(&self) -> Option<String> {
        let deps = self.wealth_departments();
        deps.get(self.wealth_department_idx % deps.len().max(1)).cloned()
    }

    fn wealth_communes(&self) -> Vec<String> {
        match (self.datasets.wealth_table(self.wealth_table()), self.wealth_department()) {
            (Some(ds), Some(dep)) => wealth::communes_in(ds, &dep),
            _ => Vec::new(),
        }
    }

    fn wealth_commune(&self) -> Option<String> {
        if self.wealth_commune_idx == 0 {
            return None;
        }
        self.wealth_communes().get(self.wealth_commune_idx - 1).cloned()
    }

    fn lit_department(&self) -> Option<String> {
        let deps = literacy::departments(&self.datasets.literacy);
        deps.get(self.lit_department_idx % deps.len().max(1)).cloned()
    }

    fn lit_communes(&self) -> Vec<String> {
        self.lit_department()
            .map(|dep| literacy::communes_in(&self.datasets.literacy, &dep))
            .unwrap_or_default()
    }

    fn lit_row(&self) -> Option<&crate::domain::LiteracyRow> {
        let dep = self.lit_department()?;
        let communes = self.lit_communes();
        let commune = communes.get(self.lit_commune_idx % communes.len().max(1))?;
        literacy::find_commune(&self.datasets.literacy, &dep, commune)
    }

    fn lit_years(&self) -> Vec<u16> {
        self.lit_row()
            .map(|r| r.literate_percent.keys().copied().collect())
            .unwrap_or_default()
    }

    fn lit_year(&self) -> Option<u16> {
        let years = self.lit_years();
        years.get(self.lit_year_idx % years.len().max(1)).copied()
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_tabs(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line> = Page::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| Line::from(format!("{} {}", i + 1, p.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.page.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .block(
                Block::default()
                    .title(Span::styled("hexastat", Style::default().fg(Color::Cyan)))
                    .borders(Borders::ALL),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length((self.field_count() as u16) + 2),
            ])
            .split(area);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(46)])
            .split(rows[0]);

        self.draw_chart(frame, cols[0]);
        self.draw_info(frame, cols[1]);
        self.draw_settings(frame, rows[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.page.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match self.page {
            Page::Education => self.draw_education_chart(frame, inner),
            Page::Correlation => self.draw_correlation_chart(frame, inner),
            Page::Wealth => self.draw_wealth_chart(frame, inner),
            Page::Literacy => self.draw_literacy_chart(frame, inner),
        }
    }

    fn draw_education_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let page = match &self.education {
            Ok(page) => page,
            Err(e) => return draw_chart_error(frame, area, e),
        };

        let sup = page.national_sup.points();
        let bac = page.national_bac.points();
        let lines = [
            ChartLine { color: CYAN, points: &sup },
            ChartLine { color: GREEN, points: &bac },
        ];
        let Some((x_bounds, y_bounds)) = bounds(&[&sup, &bac]) else {
            return draw_chart_error(frame, area, &AppError::empty("No national series."));
        };

        frame.render_widget(
            SeriesChart {
                lines: &lines,
                scatter: &[],
                bars: &[],
                x_bounds,
                y_bounds,
                x_label: "year",
                y_label: "psup / pbac (%)".to_string(),
                fmt_x: fmt_axis_year,
                fmt_y: fmt_axis_val,
            },
            area,
        );
    }

    fn draw_correlation_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let page = match &self.correlation {
            Ok(page) => page,
            Err(e) => return draw_chart_error(frame, area, e),
        };

        let (pairs, trend) = page.scatter(self.candidate_idx, self.tier);
        let Some((x_bounds, y_bounds)) = bounds(&[&pairs]) else {
            return draw_chart_error(frame, area, &AppError::empty("No scatter pairs."));
        };

        let trend_points: Vec<(f64, f64)> = trend
            .map(|t| {
                vec![
                    (x_bounds[0], t.predict(x_bounds[0])),
                    (x_bounds[1], t.predict(x_bounds[1])),
                ]
            })
            .unwrap_or_default();
        let lines = [ChartLine { color: CYAN, points: &trend_points }];

        let candidate = page
            .candidates
            .get(self.candidate_idx)
            .cloned()
            .unwrap_or_default();

        frame.render_widget(
            SeriesChart {
                lines: &lines,
                scatter: &pairs,
                bars: &[],
                x_bounds,
                y_bounds,
                x_label: tier_label(self.tier),
                y_label: format!("{candidate} share (%)"),
                fmt_x: fmt_axis_val,
                fmt_y: fmt_axis_val,
            },
            area,
        );
    }

    fn draw_wealth_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(ds) = self.datasets.wealth_table(self.wealth_table()) else {
            return draw_chart_error(
                frame,
                area,
                &AppError::empty(format!("Table '{}' is not loaded.", self.wealth_table().display_name())),
            );
        };
        let Some(department) = self.wealth_department() else {
            return draw_chart_error(frame, area, &AppError::empty("No department."));
        };
        let Some(column) = ds.columns.get(self.wealth_column_idx).cloned() else {
            return draw_chart_error(frame, area, &AppError::empty("No numeric columns."));
        };

        let Some(hist) = wealth::column_histogram(ds, &department, &column, 10) else {
            return draw_chart_error(
                frame,
                area,
                &AppError::empty(format!("No usable '{column}' values in {department}.")),
            );
        };

        let bars = histogram_bars(&hist);
        let x_bounds = [hist.edges[0], hist.edges[hist.edges.len() - 1]];
        let y_bounds = [0.0, (hist.max_count() as f64) * 1.05];

        frame.render_widget(
            SeriesChart {
                lines: &[],
                scatter: &[],
                bars: &bars,
                x_bounds,
                y_bounds,
                x_label: "value",
                y_label: "communes".to_string(),
                fmt_x: fmt_axis_val,
                fmt_y: fmt_axis_count,
            },
            area,
        );
    }

    fn draw_literacy_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let national = literacy::national_series(&self.datasets.literacy);
        let national_points = national.literate_percent.points();
        let commune_points = self
            .lit_row()
            .map(|r| literacy::commune_history(r).points())
            .unwrap_or_default();

        let Some((x_bounds, y_bounds)) = bounds(&[&national_points, &commune_points]) else {
            return draw_chart_error(frame, area, &AppError::empty("No literacy series."));
        };

        let lines = [
            ChartLine { color: CYAN, points: &national_points },
            ChartLine { color: YELLOW, points: &commune_points },
        ];

        frame.render_widget(
            SeriesChart {
                lines: &lines,
                scatter: &[],
                bars: &[],
                x_bounds,
                y_bounds,
                x_label: "year",
                y_label: "literate share (%)".to_string(),
                fmt_x: fmt_axis_year,
                fmt_y: fmt_axis_val,
            },
            area,
        );
    }

    fn draw_info(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = match self.page {
            Page::Education => self.education_info(),
            Page::Correlation => self.correlation_info(),
            Page::Wealth => self.wealth_info(),
            Page::Literacy => self.literacy_info(),
        };
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Summary").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn education_info(&self) -> Vec<Line<'static>> {
        let page = match &self.education {
            Ok(page) => page,
            Err(e) => return vec![error_line(e)],
        };

        let mut lines = Vec::new();
        lines.push(Line::from(format!(
            "{} communes with counts for {}",
            page.table.len(),
            page.year
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Top departments (psup{}):", page.year),
            Style::default().fg(Color::Cyan),
        )));
        for (i, (name, pct)) in page.top_departments.iter().enumerate() {
            lines.push(Line::from(format!("{:>2}. {:<22} {:>6.2}%", i + 1, name, pct)));
        }
        if let (Some((y, men)), Some((_, women))) =
            (page.gender_gap.men.last(), page.gender_gap.women.last())
        {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "Gender gap {y}: men {men:.1} vs women {women:.1}"
            )));
        }
        for d in page.distributions.iter().rev().take(3) {
            lines.push(Line::from(format!(
                "{}: median {:.1}% over {} communes",
                d.year, d.median, d.n
            )));
        }
        lines
    }

    fn correlation_info(&self) -> Vec<Line<'static>> {
        let page = match &self.correlation {
            Ok(page) => page,
            Err(e) => return vec![error_line(e)],
        };

        let mut lines = Vec::new();
        lines.push(Line::from(format!(
            "{} {} | {} communes joined",
            page.kind.display_name(),
            page.year,
            page.merged.len()
        )));
        lines.push(Line::from(""));
        for (idx, c) in page.matrix.iter().enumerate() {
            let marker = if idx == self.candidate_idx { "»" } else { " " };
            let r = match c.attainment {
                Some(v) => format!("{v:+.3} ({})", correlation::interpret(v)),
                None => "-".to_string(),
            };
            lines.push(Line::from(format!("{marker} {:<14} {r}", c.candidate)));
        }
        lines
    }

    fn wealth_info(&self) -> Vec<Line<'static>> {
        let page = match pipeline::wealth_page(
            &self.datasets,
            self.wealth_table(),
            self.wealth_department().as_deref(),
            self.wealth_commune().as_deref(),
        ) {
            Ok(page) => page,
            Err(e) => return vec![error_line(&e)],
        };

        let mut lines = Vec::new();
        lines.push(Line::from(format!("{} | {}", page.table.display_name(), page.department)));
        lines.push(Line::from(""));
        for s in &page.summaries {
            lines.push(Line::from(format!(
                "{:<18} n={:<4} mean={:.1}",
                s.column, s.describe.count, s.describe.mean
            )));
        }
        if let Some(b) = &page.breakdown {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                b.commune.clone(),
                Style::default().fg(Color::Cyan),
            )));
            for (column, value) in &b.entries {
                lines.push(Line::from(format!("{column:<18} {value:>12.1}")));
            }
        }
        lines
    }

    fn literacy_info(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let Some(row) = self.lit_row() else {
            return vec![Line::from("No commune selected.")];
        };

        lines.push(Line::from(format!("{} ({})", row.commune, row.department)));
        if let Some((year, pct)) = literacy::latest_percent(row) {
            lines.push(Line::from(format!("latest: {pct:.1}% in {year}")));
        }
        let history = literacy::commune_history(row);
        if let Some(p) = literacy::progression(&history) {
            lines.push(Line::from(format!(
                "{}-{}: {:+.1} points",
                p.first_year, p.last_year, p.change
            )));
        }
        if let Some(year) = self.lit_year() {
            if let Some(cmp) = literacy::department_comparison(
                &self.datasets.literacy,
                &row.department,
                &row.commune,
                year,
            ) {
                lines.push(Line::from(""));
                lines.push(Line::from(format!(
                    "{}: rank {}/{} in {}",
                    cmp.year, cmp.rank, cmp.total, cmp.department
                )));
                lines.push(Line::from(format!(
                    "dep mean {:.1}% | median {:.1}%",
                    cmp.describe.mean, cmp.describe.median
                )));
            }
        }
        lines
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .settings_items()
            .into_iter()
            .map(ListItem::new)
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn settings_items(&self) -> Vec<String> {
        match self.page {
            Page::Education => vec![
                format!("Year: {}", self.config.year),
                format!("Top-N: {}", self.config.top_n),
            ],
            Page::Correlation => {
                let candidate = self
                    .correlation
                    .as_ref()
                    .ok()
                    .and_then(|p| p.candidates.get(self.candidate_idx).cloned())
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    format!("Year: {}", self.config.year),
                    format!("Candidate: {candidate}"),
                    format!("Indicator: {}", tier_label(self.tier)),
                ]
            }
            Page::Wealth => {
                let column = self
                    .datasets
                    .wealth_table(self.wealth_table())
                    .and_then(|ds| ds.columns.get(self.wealth_column_idx).cloned())
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    format!("Table: {}", self.wealth_table().display_name()),
                    format!("Department: {}", self.wealth_department().unwrap_or_else(|| "-".to_string())),
                    format!("Commune: {}", self.wealth_commune().unwrap_or_else(|| "(none)".to_string())),
                    format!("Column: {column}"),
                ]
            }
            Page::Literacy => {
                let commune = self
                    .lit_row()
                    .map(|r| r.commune.clone())
                    .unwrap_or_else(|| "-".to_string());
                let year = self
                    .lit_year()
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    format!("Department: {}", self.lit_department().unwrap_or_else(|| "-".to_string())),
                    format!("Commune: {commune}"),
                    format!("Compare at: {year}"),
                ]
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1-4 page  ↑/↓ select  ←/→ adjust  e election  r reload  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_chart_error(frame: &mut ratatui::Frame<'_>, area: Rect, err: &AppError) {
    let msg = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Yellow));
    frame.render_widget(msg, area);
}

fn error_line(err: &AppError) -> Line<'static> {
    Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Yellow)))
}

/// Wrapping index adjustment for selector lists.
fn cycle(idx: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    if delta >= 0 {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

fn cycle_tier(tier: Option<DiplomaTier>, delta: i32) -> Option<DiplomaTier> {
    const ORDER: [Option<DiplomaTier>; 4] = [
        None,
        Some(DiplomaTier::Sup),
        Some(DiplomaTier::Bac),
        Some(DiplomaTier::Nodip),
    ];
    let pos = ORDER.iter().position(|t| *t == tier).unwrap_or(0);
    ORDER[cycle(pos, ORDER.len(), delta)]
}

fn tier_label(tier: Option<DiplomaTier>) -> &'static str {
    match tier {
        None => "attainment %",
        Some(t) => t.display_name(),
    }
}

/// `(x_bounds, y_bounds)` over several point sets, with 5% y padding.
fn bounds(series: &[&[(f64, f64)]]) -> Option<([f64; 2], [f64; 2])> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for points in series {
        for &(x, y) in *points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite())
        || x_max <= x_min
    {
        return None;
    }
    if y_max <= y_min {
        y_min -= 0.5;
        y_max += 0.5;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn histogram_bars(hist: &Histogram) -> Vec<(f64, f64, f64)> {
    hist.counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (hist.edges[i], hist.edges[i + 1], c as f64))
        .collect()
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_val(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn fmt_axis_count(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_both_directions() {
        assert_eq!(cycle(0, 3, 1), 1);
        assert_eq!(cycle(2, 3, 1), 0);
        assert_eq!(cycle(0, 3, -1), 2);
        assert_eq!(cycle(0, 0, 1), 0);
    }

    #[test]
    fn tier_order_cycles_through_all_indicators() {
        let mut tier = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(tier_label(tier).to_string());
            tier = cycle_tier(tier, 1);
        }
        assert_eq!(tier, None);
        assert_eq!(seen.len(), 4);
        assert!(seen.contains(&"attainment %".to_string()));
    }

    #[test]
    fn bounds_pad_and_reject_degenerate_x() {
        let pts = [(2010.0, 10.0), (2020.0, 20.0)];
        let (x, y) = bounds(&[&pts]).unwrap();
        assert_eq!(x, [2010.0, 2020.0]);
        assert!(y[0] < 10.0 && y[1] > 20.0);

        let flat = [(5.0, 1.0), (5.0, 2.0)];
        assert!(bounds(&[&flat]).is_none());
    }
}
