//! Domain models that mirror the SQLite schema and get passed throughout the
//! library and the TUI. These types stay light-weight data holders so other
//! layers can focus on filtering, aggregation, presentation and persistence.
//!
//! Optional text fields are plain `String`s where the empty string means
//! "unset"; the store writes them as SQL `NULL`.

use std::fmt;
use std::str::FromStr;

/// Highest rating a user can give. `0` means "not rated".
pub const MAX_RATING: u8 = 5;

/// Physical or digital format of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookType {
    Paper,
    Ebook,
    Audiobook,
}

impl BookType {
    /// Every format in display order.
    pub const ALL: [BookType; 3] = [BookType::Paper, BookType::Ebook, BookType::Audiobook];

    /// Label persisted in the database and written to CSV exports.
    pub fn as_str(self) -> &'static str {
        match self {
            BookType::Paper => "Paper",
            BookType::Ebook => "E-book",
            BookType::Audiobook => "Audiobook",
        }
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Reading progress of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadStatus {
    Read,
    Unread,
    DidNotFinish,
}

impl ReadStatus {
    /// Every status in display order.
    pub const ALL: [ReadStatus; 3] = [
        ReadStatus::Read,
        ReadStatus::Unread,
        ReadStatus::DidNotFinish,
    ];

    /// Label persisted in the database and written to CSV exports.
    pub fn as_str(self) -> &'static str {
        match self {
            ReadStatus::Read => "Read",
            ReadStatus::Unread => "Unread",
            ReadStatus::DidNotFinish => "Did not finish",
        }
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Returned when text does not name a known `BookType` or `ReadStatus`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label `{0}`")]
pub struct UnknownLabel(pub String);

/// A book that has not been saved yet. It carries every editable field but no
/// identifier, so it can never be mistaken for a persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publish_date: String,
    pub genre: String,
    pub language: String,
    pub book_type: Option<BookType>,
    pub read_status: Option<ReadStatus>,
    pub date_of_reading: String,
    /// `0` means "not rated".
    pub rating: u8,
    pub favorite: bool,
    pub comment: String,
}

impl BookDraft {
    /// Convenience constructor used by tests and quick-add flows.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            publish_date: self.publish_date,
            genre: self.genre,
            language: self.language,
            book_type: self.book_type,
            read_status: self.read_status,
            date_of_reading: self.date_of_reading,
            rating: self.rating,
            favorite: self.favorite,
            comment: self.comment,
        }
    }
}

/// A persisted book. The `id` is assigned by the store on creation and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publish_date: String,
    pub genre: String,
    pub language: String,
    pub book_type: Option<BookType>,
    pub read_status: Option<ReadStatus>,
    pub date_of_reading: String,
    pub rating: u8,
    pub favorite: bool,
    pub comment: String,
}

impl Book {
    /// Drop the identifier, e.g. to seed an edit form.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            publish_date: self.publish_date.clone(),
            genre: self.genre.clone(),
            language: self.language.clone(),
            book_type: self.book_type,
            read_status: self.read_status,
            date_of_reading: self.date_of_reading.clone(),
            rating: self.rating,
            favorite: self.favorite,
            comment: self.comment.clone(),
        }
    }

    /// Compose a `Title - Author` string that omits the hyphen when the
    /// author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }

    pub fn is_rated(&self) -> bool {
        self.rating > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back_to_variants() {
        for kind in BookType::ALL {
            assert_eq!(kind.as_str().parse::<BookType>(), Ok(kind));
        }
        for status in ReadStatus::ALL {
            assert_eq!(status.as_str().parse::<ReadStatus>(), Ok(status));
        }
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!("e-book".parse::<BookType>().is_err());
        assert_eq!(
            "did not finish".parse::<ReadStatus>(),
            Err(UnknownLabel("did not finish".to_string()))
        );
    }

    #[test]
    fn display_title_skips_blank_author() {
        let mut book = BookDraft::titled("Dune").with_id(1);
        assert_eq!(book.display_title(), "Dune");
        book.author = "Frank Herbert".to_string();
        assert_eq!(book.display_title(), "Dune - Frank Herbert");
    }

    #[test]
    fn draft_round_trips_through_book() {
        let draft = BookDraft {
            title: "Solaris".into(),
            rating: 4,
            favorite: true,
            book_type: Some(BookType::Ebook),
            ..BookDraft::default()
        };
        let book = draft.clone().with_id(7);
        assert_eq!(book.id, 7);
        assert_eq!(book.to_draft(), draft);
    }
}
