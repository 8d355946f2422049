use std::collections::BTreeMap;

use crate::models::{Book, Genre};

/// Aggregate figures over a collection. Every field is well defined for an
/// empty collection: counts are zero, maps are empty, the read fraction is 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    /// `read / total`, in `[0, 1]`.
    pub read_fraction: f64,
    /// Count per genre, only for genres that occur.
    pub genres: BTreeMap<Genre, usize>,
    /// Count per publication year.
    pub years: BTreeMap<i32, usize>,
    /// Count per decade, keyed by the decade's first year (1960 for 1965).
    pub decades: BTreeMap<i32, usize>,
    pub oldest_year: Option<i32>,
    pub newest_year: Option<i32>,
}

impl Statistics {
    pub fn from_books(books: &[Book]) -> Self {
        let mut stats = Statistics {
            total: books.len(),
            ..Statistics::default()
        };

        for book in books {
            if book.read_status {
                stats.read += 1;
            }
            *stats.genres.entry(book.genre).or_default() += 1;
            *stats.years.entry(book.publication_year).or_default() += 1;
            *stats
                .decades
                .entry(decade_of(book.publication_year))
                .or_default() += 1;
        }

        stats.unread = stats.total - stats.read;
        if stats.total > 0 {
            stats.read_fraction = stats.read as f64 / stats.total as f64;
        }
        stats.oldest_year = stats.years.keys().next().copied();
        stats.newest_year = stats.years.keys().next_back().copied();
        stats
    }

    /// Read fraction scaled to 0..=100 for display.
    pub fn read_percentage(&self) -> f64 {
        self.read_fraction * 100.0
    }

    /// Genres ordered by descending count, ties broken by genre order.
    pub fn genres_by_count(&self) -> Vec<(Genre, usize)> {
        let mut ranked: Vec<(Genre, usize)> =
            self.genres.iter().map(|(genre, count)| (*genre, *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

fn decade_of(year: i32) -> i32 {
    year - year.rem_euclid(10)
}
