use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::config::Config;
use crate::data::{Character, CharacterSet};
use crate::state::ReadOnly;
use crate::ui::list_presenter::{ListPresenter, ViewSnapshot};
use crate::ui::table_display::summary_line;
use crate::utils::logging::LogRingBuffer;

/// How long to wait for input before redrawing, so fetch progress shows up
const TICK: Duration = Duration::from_millis(100);
const PAGE_SIZE: usize = 10;
const LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Search,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct TuiApp {
    presenter: ListPresenter,
    runtime: Handle,
    config: Config,
    characters: ReadOnly<CharacterSet>,
    log_buffer: Option<LogRingBuffer>,
    input: Input,
    focus: Focus,
    table_state: TableState,
    show_help: bool,
    show_logs: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl TuiApp {
    pub fn new(
        presenter: ListPresenter,
        runtime: Handle,
        config: Config,
        log_buffer: Option<LogRingBuffer>,
    ) -> Self {
        let input = Input::from(presenter.search_term());
        Self {
            characters: presenter.characters(),
            presenter,
            runtime,
            config,
            log_buffer,
            input,
            focus: Focus::Search,
            table_state: TableState::default(),
            show_help: false,
            show_logs: false,
            tasks: Vec::new(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if self.config.behavior.load_on_start {
            self.spawn(|p| async move { p.on_activate().await });
        }

        loop {
            self.tasks.retain(|task| !task.is_finished());
            self.sync_selection();
            terminal.draw(|f| self.ui(f))?;

            if !event::poll(TICK)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.handle_key(key) == Flow::Exit {
                    break;
                }
            }
        }

        for task in self.tasks.drain(..) {
            task.abort();
        }
        Ok(())
    }

    /// Run a presenter operation on the runtime without blocking the UI
    fn spawn<F, Fut>(&mut self, op: F)
    where
        F: FnOnce(ListPresenter) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = self.runtime.spawn(op(self.presenter.clone()));
        self.tasks.push(task);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Flow::Exit,
                KeyCode::Char('r') => {
                    info!(target: "tui", "Reload requested");
                    self.spawn(|p| async move { p.load_initial().await });
                    return Flow::Continue;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                if self.show_help || self.show_logs {
                    self.show_help = false;
                    self.show_logs = false;
                } else if self.focus == Focus::List {
                    self.focus = Focus::Search;
                } else {
                    return Flow::Exit;
                }
            }
            KeyCode::F(1) => self.show_help = !self.show_help,
            KeyCode::F(5) => self.show_logs = !self.show_logs,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Search => Focus::List,
                    Focus::List => Focus::Search,
                };
            }
            _ => match self.focus {
                Focus::Search => self.handle_search_key(key),
                Focus::List => self.handle_navigation(key.code),
            },
        }
        Flow::Continue
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if key.code != KeyCode::Enter {
            self.input.handle_event(&Event::Key(key));
            self.presenter.set_search_term(self.input.value());
        } else {
            debug!(target: "tui", "Search submitted: {:?}", self.input.value());
        }

        let code = key.code;
        self.spawn(move |p| async move { p.handle_key(code).await });
    }

    fn handle_navigation(&mut self, key: KeyCode) {
        let len = self.characters.with(|set| set.len());
        if len == 0 {
            return;
        }

        let current = self.table_state.selected().unwrap_or(0).min(len - 1);
        let next = match key {
            KeyCode::Up | KeyCode::Char('k') => current.checked_sub(1).unwrap_or(len - 1),
            KeyCode::Down | KeyCode::Char('j') => {
                if current + 1 < len {
                    current + 1
                } else {
                    0
                }
            }
            KeyCode::PageUp => current.saturating_sub(PAGE_SIZE),
            KeyCode::PageDown => (current + PAGE_SIZE).min(len - 1),
            KeyCode::Home | KeyCode::Char('g') => 0,
            KeyCode::End | KeyCode::Char('G') => len - 1,
            _ => current,
        };
        self.table_state.select(Some(next));
    }

    /// Reset the selection whenever a fetch replaces the character set
    fn sync_selection(&mut self) {
        if !self.characters.has_changed() {
            return;
        }
        self.characters.mark_seen();
        let empty = self.characters.with(|set| set.is_empty());
        self.table_state.select(if empty { None } else { Some(0) });
    }

    fn ui(&mut self, f: &mut Frame) {
        let view = self.presenter.snapshot();

        let error_height = if view.error_message.is_empty() { 0 } else { 3 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),            // Search input
                Constraint::Length(error_height), // Error banner
                Constraint::Min(5),               // List + details
                Constraint::Length(1),            // Status bar
            ])
            .split(f.area());

        self.render_search(f, chunks[0], &view);
        if !view.error_message.is_empty() {
            self.render_error(f, chunks[1], &view.error_message);
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);
        self.render_list(f, body[0], &view);
        self.render_details(f, body[1], &view);
        self.render_status(f, chunks[3], &view);

        if self.show_help {
            self.render_help_popup(f);
        } else if self.show_logs {
            self.render_log_popup(f);
        }
    }

    fn render_search(&self, f: &mut Frame, area: Rect, view: &ViewSnapshot) {
        let title = if view.loading {
            format!(
                "Search characters {} loading...",
                self.config.display.icons.loading
            )
        } else {
            "Search characters (Enter to search)".to_string()
        };

        let style = if self.focus == Focus::Search {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        // Leave the last inner column free for the cursor
        let width = area.width.saturating_sub(3) as usize;
        let scroll = self.input.visual_scroll(width);
        let input = Paragraph::new(self.input.value())
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(style)
            .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)));
        f.render_widget(input, area);

        if self.focus == Focus::Search && !self.show_help && !self.show_logs {
            let offset = self.input.visual_cursor().saturating_sub(scroll);
            let offset = u16::try_from(offset).unwrap_or(u16::MAX);
            f.set_cursor_position((
                area.x.saturating_add(1).saturating_add(offset),
                area.y.saturating_add(1),
            ));
        }
    }

    fn render_error(&self, f: &mut Frame, area: Rect, message: &str) {
        let banner = Paragraph::new(format!("{} {}", self.config.display.icons.error, message))
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(banner, area);
    }

    fn render_list(&mut self, f: &mut Frame, area: Rect, view: &ViewSnapshot) {
        let border_style = if self.focus == Focus::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        if !view.has_characters {
            let text = if view.loading {
                "Loading characters..."
            } else {
                "No characters to show"
            };
            let empty = Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title("Characters"),
            );
            f.render_widget(empty, area);
            return;
        }

        let show_numbers = self.config.display.show_row_numbers;
        let mut headers = vec!["Name", "Status", "Species", "Gender", "Origin"];
        if show_numbers {
            headers.insert(0, "#");
        }
        let header = Row::new(
            headers
                .into_iter()
                .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow))),
        )
        .height(1)
        .bottom_margin(1);

        let icons = &self.config.display.icons;
        let rows: Vec<Row> = view
            .characters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut cells = vec![
                    Cell::from(c.name.clone()),
                    Cell::from(format!("{} {}", icons.for_status(&c.status), c.status))
                        .style(status_style(&c.status)),
                    Cell::from(c.species.clone()),
                    Cell::from(c.gender.clone()),
                    Cell::from(c.origin.name.clone()),
                ];
                if show_numbers {
                    cells.insert(0, Cell::from((i + 1).to_string()));
                }
                Row::new(cells).height(1)
            })
            .collect();

        let mut widths = vec![
            Constraint::Percentage(30),
            Constraint::Percentage(15),
            Constraint::Percentage(15),
            Constraint::Percentage(12),
            Constraint::Percentage(28),
        ];
        if show_numbers {
            widths.insert(0, Constraint::Length(4));
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(format!(
                        "Characters ({})",
                        summary_line(view.characters.len(), view.page_info.as_ref())
                    )),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_details(&self, f: &mut Frame, area: Rect, view: &ViewSnapshot) {
        let selected = self
            .table_state
            .selected()
            .and_then(|i| view.characters.get(i));

        let lines = match selected {
            Some(character) => detail_lines(character),
            None => vec![Line::from("Select a character to see details")],
        };

        let details = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
        f.render_widget(details, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect, view: &ViewSnapshot) {
        let icons = &self.config.display.icons;
        let state = if view.loading {
            Span::styled(
                format!("{} Loading", icons.loading),
                Style::default().fg(Color::Yellow),
            )
        } else if !view.error_message.is_empty() {
            Span::styled(format!("{} Failed", icons.error), Style::default().fg(Color::Red))
        } else {
            Span::styled(
                format!("{} Ready", icons.success),
                Style::default().fg(Color::Green),
            )
        };

        let status_line = Line::from(vec![
            state,
            Span::raw(" | "),
            Span::styled(
                match self.focus {
                    Focus::Search => "SEARCH",
                    Focus::List => "LIST",
                },
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | Tab=Focus | Ctrl+R=Reload | F1=Help | F5=Logs | Esc=Back/Exit"),
        ]);

        let status = Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray));
        f.render_widget(status, area);
    }

    fn render_help_popup(&self, f: &mut Frame) {
        let area = centered_rect(70, 60, f.area());
        f.render_widget(Clear, area);

        let help = Paragraph::new(help_lines())
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(help, area);
    }

    fn render_log_popup(&self, f: &mut Frame) {
        let area = centered_rect(90, 80, f.area());
        f.render_widget(Clear, area);

        let entries = self
            .log_buffer
            .as_ref()
            .map(|b| b.get_recent(LOG_LINES))
            .unwrap_or_default();

        // Keep the newest entries visible
        let visible = area.height.saturating_sub(2) as usize;
        let skip = entries.len().saturating_sub(visible);
        let lines: Vec<Line> = entries
            .iter()
            .skip(skip)
            .map(|e| Line::from(e.format_for_display()))
            .collect();

        let logs = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Logs ({} entries)", entries.len())),
        );
        f.render_widget(logs, area);
    }
}

fn status_style(status: &str) -> Style {
    match status.to_ascii_lowercase().as_str() {
        "alive" => Style::default().fg(Color::Green),
        "dead" => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

fn detail_lines(character: &Character) -> Vec<Line<'static>> {
    let label = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(
                format!("{name:<10}"),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(value),
        ])
    };

    vec![
        Line::from(Span::styled(
            character.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        label("Status", character.status.clone()),
        label("Species", character.species_label()),
        label("Gender", character.gender.clone()),
        label("Origin", character.origin.name.clone()),
        label("Location", character.location.name.clone()),
        label("Episodes", character.episode_count().to_string()),
        label("Image", character.image.clone()),
        label("Created", character.created.clone()),
    ]
}

fn help_lines() -> Vec<Line<'static>> {
    let heading = |text: &'static str| {
        Line::from(text).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };

    vec![
        Line::from("Catalog CLI Help").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        heading("SEARCH BOX"),
        Line::from("  Enter    - Search by name (empty lists everything)"),
        Line::from("  Tab      - Move focus to the list"),
        Line::from(""),
        heading("LIST"),
        Line::from("  ↑↓ / j k - Move selection"),
        Line::from("  PgUp/PgDn - Move by page"),
        Line::from("  Home/End - First / last character"),
        Line::from("  Tab/Esc  - Back to the search box"),
        Line::from(""),
        heading("GLOBAL"),
        Line::from("  Ctrl+R   - Reload the full listing"),
        Line::from("  F1       - Toggle this help"),
        Line::from("  F5       - Toggle log panel"),
        Line::from("  Esc      - Close popup / exit"),
        Line::from("  Ctrl+C   - Exit"),
    ]
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Set up the terminal, run the app and restore the terminal afterwards
pub fn run_tui(
    presenter: ListPresenter,
    runtime: Handle,
    config: Config,
    log_buffer: Option<LogRingBuffer>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(presenter, runtime, config, log_buffer);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
