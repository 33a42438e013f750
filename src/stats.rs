//! Aggregation engine behind the dashboard. `summarize` is a pure function of
//! the full record set; the dashboard recomputes it after every reload.
//!
//! Ranked tables break ties by the order in which values were first seen
//! while scanning the books in `list_books` order, which keeps the output
//! deterministic.

use std::collections::HashMap;

use crate::models::{Book, BookType, ReadStatus};

/// Number of genres kept in the genre distribution.
pub const TOP_GENRES: usize = 10;
/// Number of authors and publishers kept in their rankings.
pub const TOP_CONTRIBUTORS: usize = 5;

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Books per reading status, including those without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub read: usize,
    pub unread: usize,
    pub did_not_finish: usize,
    pub unset: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Option<ReadStatus>) -> usize {
        match status {
            Some(ReadStatus::Read) => self.read,
            Some(ReadStatus::Unread) => self.unread,
            Some(ReadStatus::DidNotFinish) => self.did_not_finish,
            None => self.unset,
        }
    }

    fn bump(&mut self, status: Option<ReadStatus>) {
        match status {
            Some(ReadStatus::Read) => self.read += 1,
            Some(ReadStatus::Unread) => self.unread += 1,
            Some(ReadStatus::DidNotFinish) => self.did_not_finish += 1,
            None => self.unset += 1,
        }
    }

    pub fn sum(&self) -> usize {
        self.read + self.unread + self.did_not_finish + self.unset
    }
}

/// Books per format, including those without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub paper: usize,
    pub ebook: usize,
    pub audiobook: usize,
    pub unset: usize,
}

impl TypeCounts {
    pub fn get(&self, kind: Option<BookType>) -> usize {
        match kind {
            Some(BookType::Paper) => self.paper,
            Some(BookType::Ebook) => self.ebook,
            Some(BookType::Audiobook) => self.audiobook,
            None => self.unset,
        }
    }

    fn bump(&mut self, kind: Option<BookType>) {
        match kind {
            Some(BookType::Paper) => self.paper += 1,
            Some(BookType::Ebook) => self.ebook += 1,
            Some(BookType::Audiobook) => self.audiobook += 1,
            None => self.unset += 1,
        }
    }
}

/// Snapshot of the collection's statistics at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    pub total: usize,
    pub read_status: StatusCounts,
    pub book_types: TypeCounts,
    /// Mean of ratings above zero, rounded to one decimal. `None` when no
    /// book is rated.
    pub average_rating: Option<f64>,
    pub favorites: usize,
    /// Every language with its count, in first-seen order.
    pub languages: Vec<FrequencyEntry>,
    pub genres: Vec<FrequencyEntry>,
    pub top_authors: Vec<FrequencyEntry>,
    pub top_publishers: Vec<FrequencyEntry>,
}

impl CollectionSummary {
    /// Share of the collection with `status`, as a whole percentage.
    pub fn status_percent(&self, status: Option<ReadStatus>) -> u32 {
        percent(self.read_status.get(status), self.total)
    }

    pub fn average_rating_label(&self) -> String {
        match self.average_rating {
            Some(avg) => format!("{avg:.1}"),
            None => "N/A".to_string(),
        }
    }
}

/// Compute the dashboard snapshot for `books`.
pub fn summarize(books: &[Book]) -> CollectionSummary {
    let mut read_status = StatusCounts::default();
    let mut book_types = TypeCounts::default();
    let mut favorites = 0;
    let mut rating_sum = 0u32;
    let mut rated = 0u32;

    for book in books {
        read_status.bump(book.read_status);
        book_types.bump(book.book_type);
        if book.favorite {
            favorites += 1;
        }
        if book.is_rated() {
            rating_sum += u32::from(book.rating);
            rated += 1;
        }
    }

    let average_rating = if rated == 0 {
        None
    } else {
        let mean = f64::from(rating_sum) / f64::from(rated);
        Some((mean * 10.0).round() / 10.0)
    };

    CollectionSummary {
        total: books.len(),
        read_status,
        book_types,
        average_rating,
        favorites,
        languages: frequency_table(books.iter().map(|b| b.language.as_str())),
        genres: top_n(
            frequency_table(books.iter().map(|b| b.genre.as_str())),
            TOP_GENRES,
        ),
        top_authors: top_n(
            frequency_table(books.iter().map(|b| b.author.as_str())),
            TOP_CONTRIBUTORS,
        ),
        top_publishers: top_n(
            frequency_table(books.iter().map(|b| b.publisher.as_str())),
            TOP_CONTRIBUTORS,
        ),
    }
}

/// Count each non-empty value, keeping first-seen order.
pub fn frequency_table<'a>(values: impl Iterator<Item = &'a str>) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for value in values {
        if value.is_empty() {
            continue;
        }
        match positions.get(value) {
            Some(&idx) => entries[idx].count += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push(FrequencyEntry {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    entries
}

/// Highest counts first; the stable sort leaves ties in first-seen order.
fn top_n(mut entries: Vec<FrequencyEntry>, limit: usize) -> Vec<FrequencyEntry> {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 * 100.0 / total as f64).round() as u32
    }
}
