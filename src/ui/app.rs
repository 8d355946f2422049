use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::PersistenceError;
use crate::library::{Library, Outcome};
use crate::models::Book;
use crate::storage::{JsonFileStore, Persistence};

use super::forms::{BookForm, ConfirmRemove};
use super::helpers::{bar, book_card_lines, centered_rect, describe_error};
use super::screens::{SearchScreen, Selection};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp/PageDown.
const PAGE: isize = 5;

/// High-level navigation states.
enum Screen {
    Library(Selection),
    Search(SearchScreen),
    Statistics,
}

/// Modes layered on top of the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmRemove(ConfirmRemove),
    /// Keystrokes edit the search term.
    Typing,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// Central application state for the terminal front-end. All changes to the
/// collection go through [`Library`].
pub struct App<P: Persistence = JsonFileStore> {
    library: Library<P>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<P: Persistence> App<P> {
    /// Wrap an initialized library. `load_warning` is the failure returned by
    /// [`Library::initialize`], shown until the next action.
    pub fn new(library: Library<P>, load_warning: Option<PersistenceError>) -> Self {
        let mut app = Self {
            library,
            screen: Screen::Library(Selection::default()),
            mode: Mode::Normal,
            status: None,
        };
        if let Some(err) = load_warning {
            app.set_status(
                format!(
                    "Could not load saved library, starting empty: {}",
                    describe_error(&err)
                ),
                StatusKind::Error,
            );
        }
        app
    }

    pub fn library(&self) -> &Library<P> {
        &self.library
    }

    /// Feed one key press through the state machine. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
            Mode::Typing => self.handle_typing(code)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('1') | KeyCode::Char('l') => {
                self.clear_status();
                self.open_library_view();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') | KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                if !matches!(self.screen, Screen::Search(_)) {
                    self.screen = Screen::Search(SearchScreen::new(&self.library));
                }
                return Ok(Mode::Typing);
            }
            KeyCode::Char('3') | KeyCode::Char('t') => {
                self.clear_status();
                self.screen = Screen::Statistics;
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        let len = self.visible_len();
        match &mut self.screen {
            Screen::Library(selection) => match code {
                KeyCode::Esc => *exit = true,
                KeyCode::Up => selection.move_by(-1, len),
                KeyCode::Down => selection.move_by(1, len),
                KeyCode::PageUp => selection.move_by(-PAGE, len),
                KeyCode::PageDown => selection.move_by(PAGE, len),
                KeyCode::Home => selection.select_first(),
                KeyCode::End => selection.select_last(len),
                KeyCode::Char('-') | KeyCode::Delete => {
                    let index = selection.selected;
                    return Ok(self.confirm_remove(index));
                }
                _ => {}
            },
            Screen::Search(search) => match code {
                KeyCode::Esc => {
                    self.clear_status();
                    self.open_library_view();
                }
                KeyCode::Up => search.move_selection(-1),
                KeyCode::Down => search.move_selection(1),
                KeyCode::PageUp => search.move_selection(-PAGE),
                KeyCode::PageDown => search.move_selection(PAGE),
                KeyCode::Home => search.selection.select_first(),
                KeyCode::End => search.selection.select_last(len),
                KeyCode::Tab => search.cycle_field(&self.library),
                KeyCode::Enter => return Ok(Mode::Typing),
                KeyCode::Char('-') | KeyCode::Delete => {
                    return match search.current_index() {
                        Some(index) => Ok(self.confirm_remove(index)),
                        None => {
                            self.set_status("No matching book selected.", StatusKind::Error);
                            Ok(Mode::Normal)
                        }
                    };
                }
                _ => {}
            },
            Screen::Statistics => {
                if code == KeyCode::Esc {
                    self.open_library_view();
                }
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_typing(&mut self, code: KeyCode) -> Result<Mode> {
        let search = match &mut self.screen {
            Screen::Search(search) => search,
            _ => return Ok(Mode::Normal),
        };

        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Down => return Ok(Mode::Normal),
            KeyCode::Tab => search.cycle_field(&self.library),
            KeyCode::Backspace => {
                search.query.pop();
                search.refresh(&self.library);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                search.query.push(ch);
                search.refresh(&self.library);
            }
            _ => {}
        }
        Ok(Mode::Typing)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => form.cycle(-1),
            KeyCode::Right => form.cycle(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let added = form
                    .parse_inputs()
                    .and_then(|new_book| Ok(self.library.add(new_book)?));
                match added {
                    Ok(outcome) => {
                        self.report_change("Added", outcome);
                        self.after_mutation();
                        return Ok(Mode::Normal);
                    }
                    Err(err) => {
                        let message = format!("{err:#}");
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.library.remove(confirm.index) {
                    Ok(outcome) => {
                        self.report_change("Removed", outcome);
                        self.after_mutation();
                    }
                    Err(err) => self.set_status(describe_error(&err), StatusKind::Error),
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    fn confirm_remove(&mut self, index: usize) -> Mode {
        match self.library.get(index).cloned() {
            Some(book) => {
                self.clear_status();
                Mode::ConfirmRemove(ConfirmRemove { index, book })
            }
            None => {
                self.set_status("No book selected to remove.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    /// Footer message for a mutation, flagging changes that did not reach disk.
    fn report_change(&mut self, verb: &str, outcome: Outcome<Book>) {
        let (book, warning) = outcome.into_parts();
        match warning {
            None => self.set_status(
                format!("{verb} {}.", book.display_title()),
                StatusKind::Info,
            ),
            Some(err) => self.set_status(
                format!(
                    "{verb} {}, but it was not saved and may be lost on restart: {}",
                    book.display_title(),
                    describe_error(&err)
                ),
                StatusKind::Error,
            ),
        }
    }

    /// Keep cursors and search hits valid after the collection changed.
    fn after_mutation(&mut self) {
        let len = self.library.len();
        match &mut self.screen {
            Screen::Library(selection) => selection.ensure_in_bounds(len),
            Screen::Search(search) => search.refresh(&self.library),
            Screen::Statistics => {}
        }
    }

    fn open_library_view(&mut self) {
        let mut selection = Selection::default();
        selection.ensure_in_bounds(self.library.len());
        self.screen = Screen::Library(selection);
    }

    /// Number of rows in the current list view.
    fn visible_len(&self) -> usize {
        match &self.screen {
            Screen::Library(_) | Screen::Statistics => self.library.len(),
            Screen::Search(search) => search.hits.len(),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library(selection) => self.draw_library(frame, content_area, selection),
            Screen::Search(search) => self.draw_search(frame, content_area, search),
            Screen::Statistics => self.draw_statistics(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::Typing | Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect, selection: &Selection) {
        let title = format!("Library ({} books)", self.library.len());
        if self.library.is_empty() {
            let message = Paragraph::new("Your library is empty. Press '+' to add a book.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        let positions: Vec<usize> = (0..self.library.len()).collect();
        self.render_book_list(frame, area, title, &positions, selection.selected);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, search: &SearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let typing = matches!(self.mode, Mode::Typing);
        let prompt = format!("Search by {}: ", search.field);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(if typing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        let input = Paragraph::new(Line::from(vec![
            Span::styled(prompt.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(search.query.clone()),
        ]))
        .block(block.clone());
        frame.render_widget(input, chunks[0]);

        if typing {
            let inner = block.inner(chunks[0]);
            let cursor_x = inner.x + (prompt.len() + search.query.chars().count()) as u16;
            frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
        }

        let title = format!("{} matching", search.hits.len());
        if search.hits.is_empty() {
            let text = if self.library.is_empty() {
                "Your library is empty."
            } else {
                "No books match the current search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_book_list(frame, chunks[1], title, &search.hits, search.selection.selected);
    }

    fn render_book_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        positions: &[usize],
        selected: usize,
    ) {
        let items: Vec<ListItem> = positions
            .iter()
            .filter_map(|index| {
                self.library
                    .get(*index)
                    .map(|book| ListItem::new(book_card_lines(*index, book)))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect) {
        let stats = self.library.statistics();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(area);

        let year_span = match (stats.oldest_year, stats.newest_year) {
            (Some(oldest), Some(newest)) => format!("{oldest} - {newest}"),
            _ => "n/a".to_string(),
        };
        let summary = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("Total books: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(stats.total.to_string()),
                Span::raw(format!("   Read: {}   Unread: {}", stats.read, stats.unread)),
            ]),
            Line::from(format!("Publication years: {year_span}")),
        ])
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
        frame.render_widget(summary, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Read"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(stats.read_fraction.clamp(0.0, 1.0))
            .label(format!("{:.1}%", stats.read_percentage()));
        frame.render_widget(gauge, chunks[1]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let ranked = stats.genres_by_count();
        let genre_max = ranked.first().map(|(_, count)| *count).unwrap_or(0);
        let genre_lines: Vec<Line> = ranked
            .iter()
            .map(|(genre, count)| {
                Line::from(vec![
                    Span::raw(format!("{:<12}", genre.label())),
                    Span::styled(bar(*count, genre_max), Style::default().fg(Color::Cyan)),
                    Span::raw(format!(" {count}")),
                ])
            })
            .collect();

        let decade_max = stats.decades.values().copied().max().unwrap_or(0);
        let decade_lines: Vec<Line> = stats
            .decades
            .iter()
            .map(|(decade, count)| {
                Line::from(vec![
                    Span::raw(format!("{decade}s  ")),
                    Span::styled(bar(*count, decade_max), Style::default().fg(Color::Magenta)),
                    Span::raw(format!(" {count}")),
                ])
            })
            .collect();

        frame.render_widget(
            distribution(genre_lines, "By Genre", "No genres yet."),
            columns[0],
        );
        frame.render_widget(
            distribution(decade_lines, "By Decade", "No publication years yet."),
            columns[1],
        );
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup);

        let mut lines = form.lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                StatusKind::Error.style(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "[Tab] Next field  [</>] Change choice  [Enter] Save  [Esc] Cancel",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default().borders(Borders::ALL).title("Add Book");
        let paragraph = Paragraph::new(lines)
            .block(block.clone())
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);

        if let Some(column) = form.cursor_column() {
            let inner = block.inner(popup);
            let cursor_x = (inner.x + column as u16).min(inner.right().saturating_sub(1));
            let cursor_y = inner.y + form.active_row() as u16;
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);

        let text = vec![
            Line::from(Span::styled(
                confirm.book.display_title(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} | {} | {}",
                confirm.book.publication_year,
                confirm.book.genre,
                confirm.book.read_label()
            )),
            Line::from(""),
            Line::from("Remove this book from your library? [y/n]"),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Remove Book"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => &[
                ("[Tab]", " Next   "),
                ("[←→]", " Choose   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmRemove(_)) => &[("[y]", " Remove   "), ("[n]", " Keep")],
            (_, Mode::Typing) => &[
                ("[Tab]", " Field   "),
                ("[Enter]", " Done   "),
                ("[Esc]", " Done"),
            ],
            (Screen::Search(_), _) => &[
                ("[↑↓]", " Select   "),
                ("[Enter]", " Edit Term   "),
                ("[Tab]", " Field   "),
                ("[-]", " Remove   "),
                ("[+]", " Add   "),
                ("[Esc]", " Library   "),
                ("[q]", " Quit"),
            ],
            (Screen::Statistics, _) => &[
                ("[1]", " Library   "),
                ("[2]", " Search   "),
                ("[+]", " Add   "),
                ("[q]", " Quit"),
            ],
            (Screen::Library(_), _) => &[
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[-]", " Remove   "),
                ("[f]", " Search   "),
                ("[t]", " Statistics   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| {
                    [Span::styled(*key, key_style), Span::raw(*label)]
                })
                .collect::<Vec<_>>(),
        )
    }
}

/// Bordered list of distribution rows, or a placeholder when empty.
fn distribution<'a>(lines: Vec<Line<'a>>, title: &'a str, empty: &'a str) -> Paragraph<'a> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if lines.is_empty() {
        Paragraph::new(empty)
            .alignment(Alignment::Center)
            .block(block)
    } else {
        Paragraph::new(lines).block(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn app_in(dir: &TempDir) -> App {
        let (library, warning) = Library::initialize(JsonFileStore::in_dir(dir.path())).into_parts();
        App::new(library, warning)
    }

    fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(*code).unwrap();
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add_book(app: &mut App, title: &str, author: &str, year: &str) {
        press(app, &[KeyCode::Char('+')]);
        type_text(app, title);
        press(app, &[KeyCode::Tab]);
        type_text(app, author);
        press(app, &[KeyCode::Tab]);
        for _ in 0..4 {
            press(app, &[KeyCode::Backspace]);
        }
        type_text(app, year);
        press(app, &[KeyCode::Enter]);
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn adding_through_the_form_persists() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, "Dune", "Frank Herbert", "1965");

        assert_eq!(app.library().len(), 1);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            app.status.as_ref().map(|s| s.kind),
            Some(StatusKind::Info)
        );

        let reloaded = Library::initialize(JsonFileStore::in_dir(dir.path())).value;
        assert_eq!(reloaded.books(), app.library().books());
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, &[KeyCode::Char('+'), KeyCode::Enter]);

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some("Title is required."))
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.library().is_empty());

        press(&mut app, &[KeyCode::Esc]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn remove_requires_confirmation() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, "Emma", "Jane Austen", "1815");
        add_book(&mut app, "Persuasion", "Jane Austen", "1817");

        press(&mut app, &[KeyCode::Down, KeyCode::Char('-'), KeyCode::Char('n')]);
        assert_eq!(app.library().len(), 2);

        press(&mut app, &[KeyCode::Char('-'), KeyCode::Char('y')]);
        assert_eq!(app.library().len(), 1);
        assert_eq!(app.library().books()[0].title, "Emma");
        match &app.screen {
            Screen::Library(selection) => assert_eq!(selection.selected, 0),
            _ => panic!("expected library view"),
        }
    }

    #[test]
    fn remove_prompt_holds_selected_book() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, "Emma", "Jane Austen", "1815");
        add_book(&mut app, "Persuasion", "Jane Austen", "1817");

        press(&mut app, &[KeyCode::Down, KeyCode::Delete]);
        match &app.mode {
            Mode::ConfirmRemove(confirm) => {
                assert_eq!(confirm.index, 1);
                assert_eq!(&confirm.book, &app.library().books()[1]);
            }
            _ => panic!("expected removal prompt"),
        }
        assert!(app.status.is_none());
        assert!(render(&app).contains("Persuasion"));
    }

    #[test]
    fn remove_on_empty_library_reports_error() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, &[KeyCode::Char('-')]);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            app.status.as_ref().map(|s| s.kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn search_filters_as_you_type_and_removes_hits() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        add_book(&mut app, "Dune", "Frank Herbert", "1965");
        add_book(&mut app, "Emma", "Jane Austen", "1815");
        add_book(&mut app, "Dune Messiah", "herbert", "1969");

        press(&mut app, &[KeyCode::Char('f'), KeyCode::Tab]);
        type_text(&mut app, "HERB");
        match &app.screen {
            Screen::Search(search) => assert_eq!(search.hits, vec![0, 2]),
            _ => panic!("expected search view"),
        }

        press(&mut app, &[KeyCode::Enter, KeyCode::Down, KeyCode::Char('-'), KeyCode::Char('y')]);
        assert_eq!(app.library().len(), 2);
        match &app.screen {
            Screen::Search(search) => assert_eq!(search.hits, vec![0]),
            _ => panic!("expected search view"),
        }
    }

    #[test]
    fn corrupt_file_shows_warning_and_stays_usable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("library.json"), "garbage").unwrap();
        let mut app = app_in(&dir);

        assert_eq!(
            app.status.as_ref().map(|s| s.kind),
            Some(StatusKind::Error)
        );
        add_book(&mut app, "Beloved", "Toni Morrison", "1987");
        assert_eq!(app.library().len(), 1);
    }

    #[test]
    fn screens_render() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        assert!(render(&app).contains("Your library is empty."));

        add_book(&mut app, "Dune", "Frank Herbert", "1965");
        assert!(render(&app).contains("Dune"));

        press(&mut app, &[KeyCode::Char('t')]);
        let stats = render(&app);
        assert!(stats.contains("Total books: 1"));
        assert!(stats.contains("1960s"));

        press(&mut app, &[KeyCode::Char('+')]);
        assert!(render(&app).contains("Add Book"));
    }

    #[test]
    fn quit_key_exits() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
