//! Sort engine for the list view.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use feruca::Collator;

use crate::models::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Title,
    Author,
    DateOfReading,
    Rating,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Author,
        SortKey::DateOfReading,
        SortKey::Rating,
    ];

    /// Identifier accepted on the command line and in the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::DateOfReading => "date-of-reading",
            SortKey::Rating => "rating",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::DateOfReading => "Date Read",
            SortKey::Rating => "Rating",
        }
    }

    /// The key after this one, wrapping around. Drives the sort shortcut.
    pub fn next(self) -> SortKey {
        let idx = SortKey::ALL.iter().position(|key| *key == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }

    /// Total order used for this key.
    pub fn compare(self, a: &Book, b: &Book) -> Ordering {
        self.compare_with(&mut Collator::default(), a, b)
    }

    fn compare_with(self, collator: &mut Collator, a: &Book, b: &Book) -> Ordering {
        match self {
            SortKey::Title => collate(collator, &a.title, &b.title),
            SortKey::Author => collate(collator, &a.author, &b.author),
            SortKey::DateOfReading => a.date_of_reading.cmp(&b.date_of_reading),
            SortKey::Rating => b.rating.cmp(&a.rating),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "dateofreading" => "date-of-reading".to_string(),
            other => other.to_string(),
        };
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| {
                format!("unknown sort key `{s}` (expected title, author, date-of-reading or rating)")
            })
    }
}

/// Return a new list ordered by `key`. Equal elements keep their input order.
pub fn sort_books(books: &[Book], key: SortKey) -> Vec<Book> {
    let mut collator = Collator::default();
    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| key.compare_with(&mut collator, a, b));
    sorted
}

/// Unicode collation (CLDR root order), so accents and case only matter once
/// the base letters tie. The raw text breaks any remaining tie. Unset text is
/// empty and sorts first.
fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookDraft;

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn title_sort_ignores_case() {
        let books = vec![
            BookDraft::titled("banana").with_id(1),
            BookDraft::titled("Apple").with_id(2),
            BookDraft::titled("cherry").with_id(3),
        ];
        assert_eq!(
            titles(&sort_books(&books, SortKey::Title)),
            vec!["Apple", "banana", "cherry"]
        );
    }

    #[test]
    fn accented_titles_sort_with_their_base_letter() {
        let books = vec![
            BookDraft::titled("Zola").with_id(1),
            BookDraft::titled("Émile").with_id(2),
            BookDraft::titled("Fable").with_id(3),
            BookDraft::titled("élan").with_id(4),
        ];
        assert_eq!(
            titles(&sort_books(&books, SortKey::Title)),
            vec!["élan", "Émile", "Fable", "Zola"]
        );
    }

    #[test]
    fn unset_author_sorts_first() {
        let mut books = vec![
            BookDraft::titled("B").with_id(1),
            BookDraft::titled("A").with_id(2),
        ];
        books[0].author = "Zola".into();
        assert_eq!(titles(&sort_books(&books, SortKey::Author)), vec!["A", "B"]);
    }

    #[test]
    fn date_sort_is_textual() {
        let mut books = vec![
            BookDraft::titled("late").with_id(1),
            BookDraft::titled("early").with_id(2),
            BookDraft::titled("never").with_id(3),
        ];
        books[0].date_of_reading = "2024-10-01".into();
        books[1].date_of_reading = "2024-09-30".into();
        assert_eq!(
            titles(&sort_books(&books, SortKey::DateOfReading)),
            vec!["never", "early", "late"]
        );
    }

    #[test]
    fn rating_sort_is_descending_and_stable() {
        let ratings = [(1, "A", 5), (2, "B", 0), (3, "C", 3), (4, "D", 5)];
        let books: Vec<Book> = ratings
            .iter()
            .map(|(id, title, rating)| {
                BookDraft {
                    rating: *rating,
                    ..BookDraft::titled(*title)
                }
                .with_id(*id)
            })
            .collect();
        assert_eq!(
            titles(&sort_books(&books, SortKey::Rating)),
            vec!["A", "D", "C", "B"]
        );
    }

    #[test]
    fn sorting_leaves_input_untouched() {
        let books = vec![
            BookDraft::titled("b").with_id(1),
            BookDraft::titled("a").with_id(2),
        ];
        let _ = sort_books(&books, SortKey::Title);
        assert_eq!(titles(&books), vec!["b", "a"]);
    }

    #[test]
    fn keys_parse_from_cli_spellings() {
        assert_eq!("rating".parse::<SortKey>(), Ok(SortKey::Rating));
        assert_eq!("Date-Of-Reading".parse::<SortKey>(), Ok(SortKey::DateOfReading));
        assert_eq!("date_of_reading".parse::<SortKey>(), Ok(SortKey::DateOfReading));
        assert_eq!("dateOfReading".parse::<SortKey>(), Ok(SortKey::DateOfReading));
        assert!("published".parse::<SortKey>().is_err());
    }

    #[test]
    fn next_cycles_through_every_key() {
        let mut key = SortKey::Title;
        for _ in 0..SortKey::ALL.len() {
            key = key.next();
        }
        assert_eq!(key, SortKey::Title);
        assert_eq!(SortKey::Title.next(), SortKey::Author);
    }
}
