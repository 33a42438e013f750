use book_collection_manager::{
    create_book, delete_book, list_books, open_in_memory_store, open_store, update_book,
    BookDraft, BookType, ReadStatus, StoreError,
};
use proptest::prelude::*;

#[test]
fn ids_are_unique_and_never_reused() {
    let conn = open_in_memory_store().unwrap();
    let first = create_book(&conn, &BookDraft::titled("First")).unwrap();
    let second = create_book(&conn, &BookDraft::titled("Second")).unwrap();
    assert_ne!(first, second);

    delete_book(&conn, second).unwrap();
    let third = create_book(&conn, &BookDraft::titled("Third")).unwrap();
    assert!(third != first && third != second);
}

#[test]
fn deleting_twice_is_harmless() {
    let conn = open_in_memory_store().unwrap();
    let id = create_book(&conn, &BookDraft::titled("Gone")).unwrap();
    delete_book(&conn, id).unwrap();
    delete_book(&conn, id).unwrap();
    delete_book(&conn, 9_999).unwrap();
    assert!(list_books(&conn).unwrap().is_empty());
}

#[test]
fn update_replaces_every_field() {
    let conn = open_in_memory_store().unwrap();
    let id = create_book(
        &conn,
        &BookDraft {
            author: "Someone".into(),
            rating: 2,
            ..BookDraft::titled("Before")
        },
    )
    .unwrap();

    let replacement = BookDraft {
        author: "Someone Else".into(),
        book_type: Some(BookType::Audiobook),
        read_status: Some(ReadStatus::DidNotFinish),
        rating: 4,
        favorite: true,
        ..BookDraft::titled("After")
    }
    .with_id(id);
    update_book(&conn, &replacement).unwrap();

    assert_eq!(list_books(&conn).unwrap(), vec![replacement]);
}

#[test]
fn updating_a_missing_book_reports_not_found() {
    let conn = open_in_memory_store().unwrap();
    let ghost = BookDraft::titled("Ghost").with_id(42);
    assert!(matches!(
        update_book(&conn, &ghost),
        Err(StoreError::NotFound(42))
    ));
}

#[test]
fn records_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("books.sqlite");

    let id = {
        let conn = open_store(&path).unwrap();
        create_book(
            &conn,
            &BookDraft {
                genre: "Poetry".into(),
                favorite: true,
                ..BookDraft::titled("Leaves of Grass")
            },
        )
        .unwrap()
    };

    let conn = open_store(&path).unwrap();
    let books = list_books(&conn).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, id);
    assert_eq!(books[0].genre, "Poetry");
    assert!(books[0].favorite);
}

fn title() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Zéüß]{1,8}[ ]{0,2}"
}

fn text() -> impl Strategy<Value = String> {
    "[ a-zA-Zéñø,'\"\t]{0,8}"
}

fn drafts() -> impl Strategy<Value = BookDraft> {
    (
        (title(), text(), text(), text()),
        (text(), text(), text(), text()),
        (
            prop::option::of(prop::sample::select(BookType::ALL.to_vec())),
            prop::option::of(prop::sample::select(ReadStatus::ALL.to_vec())),
            0u8..=5,
            any::<bool>(),
        ),
    )
        .prop_map(
            |(
                (title, author, publisher, publish_date),
                (genre, language, date_of_reading, comment),
                (book_type, read_status, rating, favorite),
            )| BookDraft {
                title,
                author,
                publisher,
                publish_date,
                genre,
                language,
                book_type,
                read_status,
                date_of_reading,
                rating,
                favorite,
                comment,
            },
        )
}

proptest! {
    #[test]
    fn stored_book_equals_last_update(first in drafts(), second in drafts()) {
        let conn = open_in_memory_store().unwrap();
        let id = create_book(&conn, &first).unwrap();
        prop_assert_eq!(list_books(&conn).unwrap(), vec![first.with_id(id)]);

        let updated = second.with_id(id);
        update_book(&conn, &updated).unwrap();
        prop_assert_eq!(list_books(&conn).unwrap(), vec![updated]);
    }
}
