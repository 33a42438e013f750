use book_collection_manager::{
    filter_books, sort_books, Book, BookDraft, BookType, FilterSpec, ReadStatus, SortKey,
};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-cA-CéÉ ]{1,6}"]
}

fn book_type() -> impl Strategy<Value = Option<BookType>> {
    prop_oneof![
        Just(None),
        Just(Some(BookType::Paper)),
        Just(Some(BookType::Ebook)),
        Just(Some(BookType::Audiobook)),
    ]
}

fn read_status() -> impl Strategy<Value = Option<ReadStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(ReadStatus::Read)),
        Just(Some(ReadStatus::Unread)),
        Just(Some(ReadStatus::DidNotFinish)),
    ]
}

fn books() -> impl Strategy<Value = Vec<Book>> {
    prop::collection::vec(
        (
            (text(), text(), text()),
            (text(), text(), book_type(), read_status()),
            (text(), 0u8..=5, any::<bool>()),
        ),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(
                |(idx, ((title, author, publisher), (genre, language, book_type, read_status), (date_of_reading, rating, favorite)))| {
                    BookDraft {
                        title,
                        author,
                        publisher,
                        genre,
                        language,
                        book_type,
                        read_status,
                        date_of_reading,
                        rating,
                        favorite,
                        ..BookDraft::default()
                    }
                    .with_id(idx as i64 + 1)
                },
            )
            .collect()
    })
}

fn filters() -> impl Strategy<Value = FilterSpec> {
    (
        (text(), text(), text(), text(), text()),
        (book_type(), read_status(), prop::option::of(any::<bool>())),
    )
        .prop_map(
            |((title, author, publisher, genre, language), (book_type, read_status, favorite))| {
                FilterSpec {
                    title,
                    author,
                    publisher,
                    genre,
                    language,
                    book_type,
                    read_status,
                    favorite,
                }
            },
        )
}

fn sort_key() -> impl Strategy<Value = SortKey> {
    prop::sample::select(SortKey::ALL.to_vec())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Straightforward restatement of the filter rules.
fn admitted(book: &Book, spec: &FilterSpec) -> bool {
    contains(&book.title, &spec.title)
        && contains(&book.author, &spec.author)
        && contains(&book.publisher, &spec.publisher)
        && (spec.genre.is_empty() || book.genre == spec.genre)
        && (spec.language.is_empty() || book.language == spec.language)
        && spec.book_type.map_or(true, |kind| book.book_type == Some(kind))
        && spec
            .read_status
            .map_or(true, |status| book.read_status == Some(status))
        && spec.favorite.map_or(true, |fav| book.favorite == fav)
}

proptest! {
    #[test]
    fn filter_matches_the_reference(books in books(), spec in filters()) {
        let expected: Vec<i64> = books.iter().filter(|b| admitted(b, &spec)).map(|b| b.id).collect();
        let actual: Vec<i64> = filter_books(&books, &spec).iter().map(|b| b.id).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn empty_filter_keeps_everything(books in books()) {
        prop_assert_eq!(filter_books(&books, &FilterSpec::default()), books);
    }

    #[test]
    fn sort_is_a_stable_ordered_permutation(books in books(), key in sort_key()) {
        let sorted = sort_books(&books, key);

        let mut before: Vec<i64> = books.iter().map(|b| b.id).collect();
        let mut after: Vec<i64> = sorted.iter().map(|b| b.id).collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);

        for pair in sorted.windows(2) {
            let ordering = key.compare(&pair[0], &pair[1]);
            prop_assert_ne!(ordering, std::cmp::Ordering::Greater);
            if ordering == std::cmp::Ordering::Equal {
                // Input ids ascend, so equal keys keep their input order.
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn rating_sort_is_descending(books in books()) {
        let sorted = sort_books(&books, SortKey::Rating);
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].rating >= pair[1].rating);
        }
    }
}
