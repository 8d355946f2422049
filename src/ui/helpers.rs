use std::error::Error;

use anyhow::Chain;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Width of the longest statistics bar, in cells.
pub(crate) const BAR_WIDTH: usize = 30;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}

/// Join an error and its sources into one footer-friendly sentence.
pub(crate) fn describe_error(err: &(dyn Error + 'static)) -> String {
    Chain::new(err)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Two-line card for a book: title and author, then the details row with a
/// coloured read badge.
pub(crate) fn book_card_lines(position: usize, book: &Book) -> Vec<Line<'static>> {
    let badge_style = if book.read_status {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::Black).bg(Color::LightRed)
    };

    vec![
        Line::from(vec![
            Span::styled(
                format!("{:>3}. ", position + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                book.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  by {}", book.author)),
        ]),
        Line::from(vec![
            Span::raw(format!(
                "     {}  |  {}  |  added {}  ",
                book.publication_year,
                book.genre,
                book.added_date()
            )),
            Span::styled(format!(" {} ", book.read_label()), badge_style),
        ]),
    ]
}

/// Horizontal bar scaled so that `max` fills [`BAR_WIDTH`] cells. Non-zero
/// counts always get at least one cell.
pub(crate) fn bar(count: usize, max: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let cells = (count * BAR_WIDTH).div_ceil(max).clamp(1, BAR_WIDTH);
    "#".repeat(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn bar_scales_to_max() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(3, 0), "");
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1000).len(), 1);
    }

    #[test]
    fn describe_error_includes_sources() {
        let err = PersistenceError::Write {
            path: PathBuf::from("library.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            describe_error(&err),
            "failed to write library.json: permission denied"
        );
    }

    #[test]
    fn describe_error_matches_form_error_text() {
        let unreadable = || PersistenceError::Read {
            path: PathBuf::from("library.json"),
            source: io::Error::new(io::ErrorKind::Other, "device busy"),
        };
        assert_eq!(
            describe_error(&unreadable()),
            format!("{:#}", anyhow::Error::from(unreadable()))
        );
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 50, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 20);
        assert!(rect.x >= 20 && rect.y >= 10);
    }
}
