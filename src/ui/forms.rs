use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, Genre, NewBook};

/// Longest title or author the form accepts.
pub(crate) const MAX_TEXT_LEN: usize = 100;
/// Years are typed as at most four digits.
const MAX_YEAR_DIGITS: usize = 4;

/// Form state for adding a book. Title, author, and year are free text; genre
/// and read status are picked with the arrow keys.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: Genre,
    pub(crate) read: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Focusable fields, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum BookField {
    Title,
    Author,
    Year,
    Genre,
    ReadStatus,
}

impl BookField {
    const ORDER: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::ReadStatus,
    ];

    fn step(self, offset: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let current = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(current + offset).rem_euclid(len) as usize]
    }

    fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Publication Year",
            BookField::Genre => "Genre",
            BookField::ReadStatus => "Read Status",
        }
    }
}

impl Default for BookForm {
    /// Empty form with the year pre-filled to the current year.
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: Local::now().year().to_string(),
            genre: Genre::default(),
            read: false,
            active: BookField::Title,
            error: None,
        }
    }
}

impl BookForm {
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.step(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.step(-1);
    }

    /// Append a character to the active field. Returns `false` when the input
    /// is not allowed there (non-digits in the year, overlong text, ...).
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => push_limited(&mut self.title, ch, MAX_TEXT_LEN),
            BookField::Author => push_limited(&mut self.author, ch, MAX_TEXT_LEN),
            BookField::Year => ch.is_ascii_digit() && push_limited(&mut self.year, ch, MAX_YEAR_DIGITS),
            BookField::ReadStatus if ch == ' ' => {
                self.read = !self.read;
                true
            }
            BookField::Genre | BookField::ReadStatus => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre | BookField::ReadStatus => {}
        }
    }

    /// Left/right on a picker field. Text fields ignore it.
    pub(crate) fn cycle(&mut self, offset: isize) {
        match self.active {
            BookField::Genre => self.genre = self.genre.cycle(offset),
            BookField::ReadStatus => self.read = !self.read,
            _ => {}
        }
    }

    /// Turn the raw inputs into a [`NewBook`]. Only the year needs parsing
    /// here; the library applies the field constraints.
    pub(crate) fn parse_inputs(&self) -> Result<NewBook> {
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .context("Publication year must be a number.")?;
        Ok(NewBook::new(
            self.title.clone(),
            self.author.clone(),
            year,
            self.genre,
            self.read,
        ))
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        BookField::ORDER
            .iter()
            .map(|field| self.build_line(*field))
            .collect()
    }

    fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, placeholder) = match field {
            BookField::Title => required_text(&self.title),
            BookField::Author => required_text(&self.author),
            BookField::Year => required_text(&self.year),
            BookField::Genre => (format!("< {} >", self.genre), false),
            BookField::ReadStatus => {
                let label = if self.read { "Read" } else { "Unread" };
                (format!("< {label} >"), false)
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if placeholder {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor offset inside the active line, or `None` for picker fields.
    pub(crate) fn cursor_column(&self) -> Option<usize> {
        let value = match self.active {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre | BookField::ReadStatus => return None,
        };
        Some(self.active.label().len() + 2 + value.chars().count())
    }

    pub(crate) fn active_row(&self) -> usize {
        BookField::ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0)
    }
}

fn push_limited(target: &mut String, ch: char, limit: usize) -> bool {
    if target.chars().count() >= limit {
        return false;
    }
    target.push(ch);
    true
}

fn required_text(value: &str) -> (String, bool) {
    if value.is_empty() {
        ("<required>".to_string(), true)
    } else {
        (value.to_string(), false)
    }
}

/// Pending confirmation before removing the book at `index`.
#[derive(Clone)]
pub(crate) struct ConfirmRemove {
    pub(crate) index: usize,
    pub(crate) book: Book,
}
