//! Filter engine for the list view. The supported fields form a closed set
//! (`FilterField`); each one is paired with its predicate in
//! [`FilterField::admits`], so every criterion is known at compile time.

use crate::models::{Book, BookType, ReadStatus};

/// Criteria for narrowing the book list. Empty strings and `None` impose no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive substring.
    pub title: String,
    /// Case-insensitive substring.
    pub author: String,
    /// Case-insensitive substring.
    pub publisher: String,
    /// Exact, case-sensitive match.
    pub genre: String,
    /// Exact, case-sensitive match.
    pub language: String,
    pub book_type: Option<BookType>,
    pub read_status: Option<ReadStatus>,
    pub favorite: Option<bool>,
}

/// Every field a `FilterSpec` can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Title,
    Author,
    Publisher,
    Genre,
    Language,
    BookType,
    ReadStatus,
    Favorite,
}

impl FilterField {
    pub const ALL: [FilterField; 8] = [
        FilterField::Title,
        FilterField::Author,
        FilterField::Publisher,
        FilterField::Genre,
        FilterField::Language,
        FilterField::BookType,
        FilterField::ReadStatus,
        FilterField::Favorite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Title => "Title",
            FilterField::Author => "Author",
            FilterField::Publisher => "Publisher",
            FilterField::Genre => "Genre",
            FilterField::Language => "Language",
            FilterField::BookType => "Book Type",
            FilterField::ReadStatus => "Status",
            FilterField::Favorite => "Favorite",
        }
    }

    /// Whether `spec` places a constraint on this field.
    pub fn is_active(self, spec: &FilterSpec) -> bool {
        match self {
            FilterField::Title => !spec.title.is_empty(),
            FilterField::Author => !spec.author.is_empty(),
            FilterField::Publisher => !spec.publisher.is_empty(),
            FilterField::Genre => !spec.genre.is_empty(),
            FilterField::Language => !spec.language.is_empty(),
            FilterField::BookType => spec.book_type.is_some(),
            FilterField::ReadStatus => spec.read_status.is_some(),
            FilterField::Favorite => spec.favorite.is_some(),
        }
    }

    /// Whether `book` satisfies this field's criterion. Inactive criteria
    /// admit everything.
    pub fn admits(self, spec: &FilterSpec, book: &Book) -> bool {
        match self {
            FilterField::Title => contains_ignore_case(&book.title, &spec.title),
            FilterField::Author => contains_ignore_case(&book.author, &spec.author),
            FilterField::Publisher => contains_ignore_case(&book.publisher, &spec.publisher),
            FilterField::Genre => spec.genre.is_empty() || book.genre == spec.genre,
            FilterField::Language => spec.language.is_empty() || book.language == spec.language,
            FilterField::BookType => spec.book_type.is_none() || book.book_type == spec.book_type,
            FilterField::ReadStatus => {
                spec.read_status.is_none() || book.read_status == spec.read_status
            }
            FilterField::Favorite => spec.favorite.map_or(true, |wanted| book.favorite == wanted),
        }
    }
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.active_fields().next().is_none()
    }

    /// Fields currently constraining the list, in display order.
    pub fn active_fields(&self) -> impl Iterator<Item = FilterField> + '_ {
        FilterField::ALL
            .into_iter()
            .filter(move |field| field.is_active(self))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when `book` passes every active criterion.
    pub fn matches(&self, book: &Book) -> bool {
        FilterField::ALL
            .iter()
            .all(|field| field.admits(self, book))
    }
}

/// Keep the books matching every active criterion, preserving their order.
pub fn filter_books(books: &[Book], spec: &FilterSpec) -> Vec<Book> {
    books
        .iter()
        .filter(|book| spec.matches(book))
        .cloned()
        .collect()
}

/// An empty needle matches everything; an unset (empty) field matches only an
/// empty needle.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookDraft;

    fn book(id: i64, title: &str, author: &str, genre: &str, favorite: bool) -> Book {
        BookDraft {
            author: author.into(),
            genre: genre.into(),
            favorite,
            ..BookDraft::titled(title)
        }
        .with_id(id)
    }

    fn shelf() -> Vec<Book> {
        vec![
            book(1, "The Hobbit", "J.R.R. Tolkien", "Fantasy", true),
            book(2, "Hyperion", "Dan Simmons", "Science Fiction", false),
            book(3, "The Silmarillion", "J.R.R. Tolkien", "fantasy", false),
            book(4, "Untitled notes", "", "", false),
        ]
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn empty_spec_keeps_everything() {
        let spec = FilterSpec::default();
        assert!(spec.is_empty());
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn title_is_case_insensitive_substring() {
        let spec = FilterSpec {
            title: "THE".into(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![1, 3]);
    }

    #[test]
    fn unset_author_never_matches_text_filter() {
        let spec = FilterSpec {
            author: "t".into(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![1, 3]);
    }

    #[test]
    fn genre_is_exact_and_case_sensitive() {
        let spec = FilterSpec {
            genre: "Fantasy".into(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![1]);
    }

    #[test]
    fn favorite_filter_compares_booleans() {
        let mut spec = FilterSpec {
            favorite: Some(true),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![1]);
        spec.favorite = Some(false);
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![2, 3, 4]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let spec = FilterSpec {
            author: "tolkien".into(),
            favorite: Some(false),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&shelf(), &spec)), vec![3]);
        assert_eq!(
            spec.active_fields().collect::<Vec<_>>(),
            vec![FilterField::Author, FilterField::Favorite]
        );
    }

    #[test]
    fn enum_fields_filter_exactly() {
        let mut books = shelf();
        books[1].book_type = Some(BookType::Audiobook);
        books[2].read_status = Some(ReadStatus::DidNotFinish);

        let spec = FilterSpec {
            book_type: Some(BookType::Audiobook),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&books, &spec)), vec![2]);

        let spec = FilterSpec {
            read_status: Some(ReadStatus::DidNotFinish),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_books(&books, &spec)), vec![3]);
    }

    #[test]
    fn clear_resets_every_criterion() {
        let mut spec = FilterSpec {
            title: "x".into(),
            language: "German".into(),
            favorite: Some(true),
            ..FilterSpec::default()
        };
        spec.clear();
        assert!(spec.is_empty());
    }
}
