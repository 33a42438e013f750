use std::mem;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table,
    TableState, Tabs, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{
    create_book, delete_book, fetch_book, fetch_distinct_values, list_books, update_book,
    TextColumn,
};
use crate::export::write_csv_file;
use crate::filter::FilterField;
use crate::models::{BookType, ReadStatus};
use crate::sort::SortKey;
use crate::stats::FrequencyEntry;

use super::forms::{BookField, BookForm, ConfirmBookDelete, FilterForm, Suggestions};
use super::helpers::{centered_rect, surface_error};
use super::screens::{DashboardScreen, LibraryColumn, LibraryScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab strip at the top of the window.
const TAB_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown in the book list.
const PAGE_STEP: isize = 10;

/// Top-level views, mirrored by the tab strip.
enum Screen {
    Library,
    Dashboard,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: i64, form: BookForm },
    ConfirmBookDelete(ConfirmBookDelete),
    Filtering(FilterForm),
    ChoosingColumns { cursor: usize },
}

/// A committed add or edit, reported once the list is reloaded.
struct SavedBook {
    id: i64,
    title: String,
    verb: &'static str,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    export_dir: PathBuf,
    library: LibraryScreen,
    dashboard: DashboardScreen,
    suggestions: Suggestions,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    last_export: Option<PathBuf>,
}

impl App {
    /// Load the collection from `conn` and build the initial views.
    pub fn load(conn: Connection, sort: SortKey, export_dir: PathBuf) -> Result<Self> {
        let books = list_books(&conn).context("failed to load books")?;
        let mut app = Self {
            dashboard: DashboardScreen::new(&books),
            library: LibraryScreen::new(books, sort),
            conn,
            export_dir,
            suggestions: Suggestions::default(),
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
            last_export: None,
        };
        app.reload_suggestions()?;
        Ok(app)
    }

    /// Route a key press to the active mode. Returns `true` when the user
    /// asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_book_form(code, None, form)?,
            Mode::EditingBook { id, form } => self.handle_book_form(code, Some(id), form)?,
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Filtering(form) => self.handle_filter(code, form)?,
            Mode::ChoosingColumns { cursor } => self.handle_columns(code, cursor),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Up => self.library.move_selection(-1),
                KeyCode::Down => self.library.move_selection(1),
                KeyCode::PageUp => self.library.move_selection(-PAGE_STEP),
                KeyCode::PageDown => self.library.move_selection(PAGE_STEP),
                KeyCode::Home => self.library.select_first(),
                KeyCode::End => self.library.select_last(),
                KeyCode::Tab | KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.clear_status();
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::default()));
                }
                KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                    return Ok(self.open_editor());
                }
                KeyCode::Char('-') | KeyCode::Delete => {
                    if let Some(book) = self.library.current_book() {
                        let confirm = ConfirmBookDelete::from(book);
                        self.clear_status();
                        return Ok(Mode::ConfirmBookDelete(confirm));
                    }
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
                KeyCode::Char(' ') | KeyCode::Char('*') => self.toggle_favorite(),
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    let key = self.library.cycle_sort();
                    self.set_status(format!("Sorted by {}.", key.label()), StatusKind::Info);
                }
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    self.clear_status();
                    let form = FilterForm::new(self.library.filter.clone(), &self.suggestions);
                    return Ok(Mode::Filtering(form));
                }
                KeyCode::Char('c') | KeyCode::Char('C') => self.clear_filters(),
                KeyCode::Char('v') | KeyCode::Char('V') => {
                    self.clear_status();
                    return Ok(Mode::ChoosingColumns { cursor: 0 });
                }
                KeyCode::Char('x') | KeyCode::Char('X') => self.export_collection(),
                KeyCode::Char('o') | KeyCode::Char('O') => self.open_last_export(),
                _ => {}
            },
            Screen::Dashboard => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('l') => {
                    self.clear_status();
                    self.screen = Screen::Library;
                }
                KeyCode::Char('x') | KeyCode::Char('X') => self.export_collection(),
                KeyCode::Char('o') | KeyCode::Char('O') => self.open_last_export(),
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn handle_book_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: BookForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    let message = if id.is_some() {
                        "Edit cancelled."
                    } else {
                        "Add book cancelled."
                    };
                    self.set_status(message, StatusKind::Info);
                    keep_open = false;
                }
            }
            KeyCode::Tab => {
                let consumed = form.suggestion.is_some() && form.accept_suggestion();
                if !consumed {
                    form.move_focus(1);
                }
                form.update_suggestion(&self.suggestions);
            }
            KeyCode::Down => {
                form.move_focus(1);
                form.update_suggestion(&self.suggestions);
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.move_focus(-1);
                form.update_suggestion(&self.suggestions);
            }
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.suggestions);
            }
            KeyCode::Enter => match self.save_book(id, &form) {
                Ok(saved) => {
                    keep_open = false;
                    self.finish_save(saved);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    warn!(error = %message, "failed to save book");
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                    form.update_suggestion(&self.suggestions);
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::EditingBook { id, form },
            None => Mode::AddingBook(form),
        })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_book(&self.conn, confirm.id).context("failed to delete book") {
                    Ok(()) => {
                        self.finish_delete(&confirm);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        warn!(id = confirm.id, error = %message, "failed to delete book");
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmBookDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmBookDelete(confirm)),
        }
    }

    fn handle_filter(&mut self, code: KeyCode, mut form: FilterForm) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.set_status(self.shown_message(), StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }

        self.library.set_filter(form.spec.clone());
        Ok(Mode::Filtering(form))
    }

    fn handle_columns(&mut self, code: KeyCode, cursor: usize) -> Mode {
        let last = LibraryColumn::ALL.len() - 1;
        let cursor = match code {
            KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('V') | KeyCode::Char('q') => {
                return Mode::Normal;
            }
            KeyCode::Up | KeyCode::BackTab => cursor.checked_sub(1).unwrap_or(last),
            KeyCode::Down | KeyCode::Tab => (cursor + 1) % LibraryColumn::ALL.len(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let column = LibraryColumn::ALL[cursor];
                if !self.library.columns.toggle(column) {
                    self.set_status("At least one column must stay visible.", StatusKind::Error);
                }
                cursor
            }
            _ => cursor,
        };
        Mode::ChoosingColumns { cursor }
    }

    /// Ctrl+E exports from any screen unless a form is capturing input.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.export_collection();
        }
        Ok(())
    }

    /// Ctrl+L clears every filter, including while the filter bar is open.
    pub(crate) fn handle_ctrl_l(&mut self) -> Result<()> {
        match &mut self.mode {
            Mode::Filtering(form) => {
                form.spec.clear();
                self.clear_filters();
            }
            Mode::Normal => self.clear_filters(),
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT.min(area.height)),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.screen {
            Screen::Library => self.draw_library(frame, chunks[1]),
            Screen::Dashboard => self.draw_dashboard(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Filtering(form) => self.draw_filter_form(frame, area, form),
            Mode::ChoosingColumns { cursor } => self.draw_column_picker(frame, area, *cursor),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let selected = match self.screen {
            Screen::Library => 0,
            Screen::Dashboard => 1,
        };
        let tabs = Tabs::new(vec!["Library", "Dashboard"])
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Book Collection"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        frame.render_widget(Paragraph::new(self.library_info_line()), chunks[0]);
        let list_area = chunks[1];
        if list_area.height == 0 {
            return;
        }

        if self.library.books.is_empty() {
            let message =
                Paragraph::new("Your book collection is empty. Press '+' to add your first book!")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Books"));
            frame.render_widget(message, list_area);
            return;
        }

        if self.library.visible.is_empty() {
            let message = Paragraph::new("No books match the current filters. Press 'c' to clear them.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Books"));
            frame.render_widget(message, list_area);
            return;
        }

        let columns = self.library.columns.visible();
        let header = Row::new(columns.iter().map(|column| column.header()))
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.library.visible.iter().map(|book| {
            Row::new(
                columns
                    .iter()
                    .map(|column| Cell::from(column.cell_text(book))),
            )
        });
        let widths: Vec<Constraint> = columns.iter().map(|column| column.width()).collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Books ({})", self.library.visible.len())),
            )
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(self.library.selected));
        frame.render_stateful_widget(table, list_area, &mut state);
    }

    fn library_info_line(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::raw(" Sorted by "),
            Span::styled(self.library.sort.label().to_string(), key_style),
            Span::raw(format!(
                "   Showing {} of {}",
                self.library.visible.len(),
                self.library.books.len()
            )),
        ];

        let active: Vec<&str> = self
            .library
            .filter
            .active_fields()
            .map(FilterField::label)
            .collect();
        if !active.is_empty() {
            spans.push(Span::raw("   Filters: "));
            spans.push(Span::styled(
                active.join(", "),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect) {
        let summary = &self.dashboard.summary;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Min(4),
            ])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(rows[0]);
        let read = summary.read_status.get(Some(ReadStatus::Read));
        let read_percent = summary.status_percent(Some(ReadStatus::Read));
        let card_values = [
            ("Total Books", summary.total.to_string()),
            ("Read Books", format!("{read} ({read_percent}%)")),
            ("Favorite Books", summary.favorites.to_string()),
            (
                "Average Rating",
                format!("{} / 5", summary.average_rating_label()),
            ),
        ];
        for ((title, value), card) in card_values.into_iter().zip(cards.iter()) {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(paragraph, *card);
        }

        let upper = split_halves(rows[1]);
        let mut type_data: Vec<(String, u64)> = BookType::ALL
            .iter()
            .map(|kind| {
                (
                    kind.as_str().to_string(),
                    summary.book_types.get(Some(*kind)) as u64,
                )
            })
            .collect();
        if summary.book_types.unset > 0 {
            type_data.push(("Unset".to_string(), summary.book_types.unset as u64));
        }
        self.draw_bar_chart(frame, upper[0], "Book Types", &type_data);

        let mut status_data: Vec<(String, u64)> = ReadStatus::ALL
            .iter()
            .map(|status| {
                (
                    status.as_str().to_string(),
                    summary.read_status.get(Some(*status)) as u64,
                )
            })
            .collect();
        if summary.read_status.unset > 0 {
            status_data.push(("Unset".to_string(), summary.read_status.unset as u64));
        }
        self.draw_bar_chart(frame, upper[1], "Reading Status", &status_data);

        let lower = split_halves(rows[2]);
        self.draw_bar_chart(frame, lower[0], "Languages", &chart_data(&summary.languages));
        self.draw_bar_chart(
            frame,
            lower[1],
            "Genre Distribution",
            &chart_data(&summary.genres),
        );

        let lists = split_halves(rows[3]);
        self.draw_ranking(frame, lists[0], "Top Authors", &summary.top_authors);
        self.draw_ranking(frame, lists[1], "Top Publishers", &summary.top_publishers);
    }

    fn draw_bar_chart(&self, frame: &mut Frame, area: Rect, title: &str, data: &[(String, u64)]) {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        if data.iter().all(|(_, value)| *value == 0) {
            let message = Paragraph::new("No data yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2);
        let bar_width = (inner_width / data.len().max(1) as u16)
            .saturating_sub(1)
            .clamp(3, 14);
        let bars: Vec<Bar> = data
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .value(*value)
                    .label(Line::from(label.clone()))
                    .style(Style::default().fg(Color::Cyan))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1)
            .value_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(chart, area);
    }

    fn draw_ranking(&self, frame: &mut Frame, area: Rect, title: &str, entries: &[FrequencyEntry]) {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        if entries.is_empty() {
            let message = Paragraph::new("No data yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let noun = if entry.count == 1 { "book" } else { "books" };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}. {}", idx + 1, entry.value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {} {noun}", entry.count),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) | (_, Mode::EditingBook { .. }) => &[
                ("[Tab]", " Next/Accept   "),
                ("[←→]", " Change   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmBookDelete(_)) => &[("[Y]", " Delete   "), ("[N]", " Keep")],
            (_, Mode::ChoosingColumns { .. }) => &[
                ("[↑↓]", " Move   "),
                ("[Space]", " Show/Hide   "),
                ("[Esc]", " Close"),
            ],
            (_, Mode::Filtering(_)) => &[
                ("[Tab]", " Next   "),
                ("[←→]", " Cycle   "),
                ("[Ctrl+L]", " Clear   "),
                ("[Enter/Esc]", " Close"),
            ],
            (Screen::Library, Mode::Normal) => &[
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[Space]", " Favorite   "),
                ("[s]", " Sort   "),
                ("[f]", " Filter   "),
                ("[c]", " Clear   "),
                ("[v]", " Columns   "),
                ("[x]", " Export   "),
                ("[Tab]", " Dashboard   "),
                ("[q]", " Quit"),
            ],
            (Screen::Dashboard, Mode::Normal) => &[
                ("[Tab]", " Library   "),
                ("[x]", " Export   "),
                ("[o]", " Open Export   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(action.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to accept/switch • ←→ to change • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if let Some(offset) = form.cursor_offset() {
            let row = BookField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let cursor_x = (inner.x + offset as u16).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_filter_form(&self, frame: &mut Frame, area: Rect, form: &FilterForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Filter Books").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = FilterField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            self.shown_message(),
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(offset) = form.cursor_offset() {
            let row = FilterField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let cursor_x = (inner.x + offset as u16).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_column_picker(&self, frame: &mut Frame, area: Rect, cursor: usize) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Columns").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines: Vec<Line> = LibraryColumn::ALL
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let mark = if self.library.columns.is_visible(*column) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if idx == cursor {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{mark} {}", column.label()), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\" from your collection?", confirm.title)),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn shown_message(&self) -> String {
        format!(
            "Showing {} of {} books.",
            self.library.visible.len(),
            self.library.books.len()
        )
    }

    /// Write the form to the store. Once this returns `Ok` the change is
    /// committed, so the caller must close the form whatever happens next.
    fn save_book(&mut self, id: Option<i64>, form: &BookForm) -> Result<SavedBook> {
        let draft = form.parse_inputs()?;
        let title = draft.title.clone();
        match id {
            Some(id) => {
                update_book(&self.conn, &draft.with_id(id)).context("failed to update book")?;
                Ok(SavedBook {
                    id,
                    title,
                    verb: "Updated",
                })
            }
            None => {
                let id = create_book(&self.conn, &draft).context("failed to add book")?;
                Ok(SavedBook {
                    id,
                    title,
                    verb: "Added",
                })
            }
        }
    }

    fn finish_save(&mut self, saved: SavedBook) {
        let SavedBook { id, title, verb } = saved;
        if let Err(err) = self.reload(Some(id)) {
            let message = surface_error(&err);
            warn!(id, error = %message, "saved book but failed to reload");
            self.set_status(
                format!("{verb} \"{title}\", but the list could not be refreshed: {message}"),
                StatusKind::Error,
            );
            return;
        }

        let hidden = !self.library.visible.iter().any(|book| book.id == id);
        let suffix = if hidden {
            " (hidden by the current filters)"
        } else {
            ""
        };
        self.set_status(format!("{verb} \"{title}\"{suffix}."), StatusKind::Info);
    }

    fn finish_delete(&mut self, confirm: &ConfirmBookDelete) {
        match self.reload(None) {
            Ok(()) => {
                self.set_status(format!("Deleted \"{}\".", confirm.title), StatusKind::Info)
            }
            Err(err) => {
                let message = surface_error(&err);
                warn!(id = confirm.id, error = %message, "deleted book but failed to reload");
                self.set_status(
                    format!(
                        "Deleted \"{}\", but the list could not be refreshed: {message}",
                        confirm.title
                    ),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Re-read the latest copy of the selected book and open the edit form.
    fn open_editor(&mut self) -> Mode {
        let Some(id) = self.library.current_book().map(|book| book.id) else {
            self.set_status("No book selected to edit.", StatusKind::Error);
            return Mode::Normal;
        };

        match fetch_book(&self.conn, id).context("failed to load book") {
            Ok(book) => {
                self.clear_status();
                Mode::EditingBook {
                    id,
                    form: BookForm::from_book(&book),
                }
            }
            Err(err) => {
                self.report_failure("failed to open book", &err);
                if let Err(reload_err) = self.reload(None) {
                    warn!(error = %surface_error(&reload_err), "reload after failed edit");
                }
                Mode::Normal
            }
        }
    }

    fn toggle_favorite(&mut self) {
        let Some(mut book) = self.library.current_book().cloned() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        book.favorite = !book.favorite;

        let result = update_book(&self.conn, &book)
            .context("failed to update favorite")
            .and_then(|()| self.reload(Some(book.id)));
        match result {
            Ok(()) => {
                let message = if book.favorite {
                    format!("Added \"{}\" to favorites.", book.title)
                } else {
                    format!("Removed \"{}\" from favorites.", book.title)
                };
                self.set_status(message, StatusKind::Info);
            }
            Err(err) => self.report_failure("failed to toggle favorite", &err),
        }
    }

    fn clear_filters(&mut self) {
        self.library.clear_filter();
        self.set_status("Filters cleared.", StatusKind::Info);
    }

    /// Export the whole collection, not just the filtered view.
    fn export_collection(&mut self) {
        let books = &self.library.books;
        if books.is_empty() {
            self.set_status("Nothing to export yet.", StatusKind::Error);
            return;
        }

        match write_csv_file(books, &self.export_dir) {
            Ok(path) => {
                let message = format!(
                    "Exported {} books to {}. Press 'o' to open it.",
                    books.len(),
                    path.display()
                );
                self.last_export = Some(path);
                self.set_status(message, StatusKind::Info);
            }
            Err(err) => self.report_failure("failed to export collection", &err),
        }
    }

    fn open_last_export(&mut self) {
        let Some(path) = self.last_export.clone() else {
            self.set_status("Nothing exported yet. Press 'x' first.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => {
                info!(path = %path.display(), "opened export");
                self.set_status(format!("Opened {}.", path.display()), StatusKind::Info);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to open export");
                self.set_status(format!("Failed to open export: {err}"), StatusKind::Error);
            }
        }
    }

    fn report_failure(&mut self, action: &str, err: &anyhow::Error) {
        let message = surface_error(err);
        warn!(error = %message, "{action}");
        self.set_status(message, StatusKind::Error);
    }

    /// Pull the record set again and rebuild every derived view.
    fn reload(&mut self, focus_id: Option<i64>) -> Result<()> {
        let books = list_books(&self.conn).context("failed to reload books")?;
        self.dashboard.refresh(&books);
        self.library.set_books(books, focus_id);
        self.reload_suggestions()
    }

    fn reload_suggestions(&mut self) -> Result<()> {
        self.suggestions = Suggestions {
            authors: fetch_distinct_values(&self.conn, TextColumn::Author)
                .context("failed to load authors")?,
            publishers: fetch_distinct_values(&self.conn, TextColumn::Publisher)
                .context("failed to load publishers")?,
            genres: fetch_distinct_values(&self.conn, TextColumn::Genre)
                .context("failed to load genres")?,
            languages: fetch_distinct_values(&self.conn, TextColumn::Language)
                .context("failed to load languages")?,
        };
        Ok(())
    }
}

fn chart_data(entries: &[FrequencyEntry]) -> Vec<(String, u64)> {
    entries
        .iter()
        .map(|entry| (entry.value.clone(), entry.count as u64))
        .collect()
}

fn split_halves(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
        .to_vec()
}
