use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{Book, BookDraft, BookType, ReadStatus, MAX_RATING};

const SELECT_BOOK_COLUMNS: &str = "SELECT id, title, author, publisher, publish_date, genre, \
     language, book_type, read_status, date_of_reading, rating, favorite, comment FROM books";

/// Free-text columns whose distinct values feed auto-complete and the filter
/// bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    Author,
    Publisher,
    Genre,
    Language,
}

impl TextColumn {
    fn column_name(self) -> &'static str {
        match self {
            TextColumn::Author => "author",
            TextColumn::Publisher => "publisher",
            TextColumn::Genre => "genre",
            TextColumn::Language => "language",
        }
    }
}

impl ToSql for BookType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BookType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for ReadStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ReadStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Retrieve every persisted book in insertion order. The UI calls this after
/// each mutation rather than patching its own copy.
pub fn list_books(conn: &Connection) -> Result<Vec<Book>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_BOOK_COLUMNS} ORDER BY id"))?;

    let books = stmt
        .query_map([], book_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = books.len(), "loaded books");
    Ok(books)
}

/// Load a single book by identifier.
pub fn fetch_book(conn: &Connection, id: i64) -> Result<Book, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_BOOK_COLUMNS} WHERE id = ?1"))?;
    let book = stmt.query_row([id], book_from_row).optional()?;
    book.ok_or(StoreError::NotFound(id))
}

/// Insert a draft and return the identifier the store assigned to it.
pub fn create_book(conn: &Connection, draft: &BookDraft) -> Result<i64, StoreError> {
    validate(draft)?;

    conn.execute(
        "INSERT INTO books (title, author, publisher, publish_date, genre, language,
                            book_type, read_status, date_of_reading, rating, favorite, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            draft.title,
            nullable(&draft.author),
            nullable(&draft.publisher),
            nullable(&draft.publish_date),
            nullable(&draft.genre),
            nullable(&draft.language),
            draft.book_type,
            draft.read_status,
            nullable(&draft.date_of_reading),
            draft.rating,
            draft.favorite,
            nullable(&draft.comment),
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!(id, title = %draft.title, "created book");
    Ok(id)
}

/// Replace every field of an existing book. Surfaces `NotFound` when no row
/// carries the identifier so the UI can report it instead of silently
/// continuing.
pub fn update_book(conn: &Connection, book: &Book) -> Result<(), StoreError> {
    let draft = book.to_draft();
    validate(&draft)?;

    let updated = conn.execute(
        "UPDATE books
         SET title = ?1, author = ?2, publisher = ?3, publish_date = ?4, genre = ?5,
             language = ?6, book_type = ?7, read_status = ?8, date_of_reading = ?9,
             rating = ?10, favorite = ?11, comment = ?12
         WHERE id = ?13",
        params![
            draft.title,
            nullable(&draft.author),
            nullable(&draft.publisher),
            nullable(&draft.publish_date),
            nullable(&draft.genre),
            nullable(&draft.language),
            draft.book_type,
            draft.read_status,
            nullable(&draft.date_of_reading),
            draft.rating,
            draft.favorite,
            nullable(&draft.comment),
            book.id,
        ],
    )?;

    if updated == 0 {
        Err(StoreError::NotFound(book.id))
    } else {
        info!(id = book.id, "updated book");
        Ok(())
    }
}

/// Remove a book. Deleting an identifier that is already gone is a no-op.
pub fn delete_book(conn: &Connection, id: i64) -> Result<(), StoreError> {
    let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;

    if deleted == 0 {
        debug!(id, "delete skipped, book already absent");
    } else {
        info!(id, "deleted book");
    }
    Ok(())
}

/// Distinct non-empty values of a text column, ordered by lowercase first but
/// falling back to the original text to keep accents and capitalization
/// intact.
pub fn fetch_distinct_values(
    conn: &Connection,
    column: TextColumn,
) -> Result<Vec<String>, StoreError> {
    let name = column.column_name();
    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT {name} FROM books
         WHERE {name} IS NOT NULL AND {name} <> ''
         ORDER BY LOWER({name}), {name}"
    ))?;

    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(values)
}

fn validate(draft: &BookDraft) -> Result<(), StoreError> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::validation("Title is required."));
    }
    if draft.rating > MAX_RATING {
        return Err(StoreError::validation(format!(
            "Rating must be between 0 and {MAX_RATING}."
        )));
    }
    Ok(())
}

/// Empty text is stored as `NULL` so "unset" has a single representation.
/// Anything else, whitespace included, is stored as given.
fn nullable(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: text(row, 2)?,
        publisher: text(row, 3)?,
        publish_date: text(row, 4)?,
        genre: text(row, 5)?,
        language: text(row, 6)?,
        book_type: row.get(7)?,
        read_status: row.get(8)?,
        date_of_reading: text(row, 9)?,
        rating: row.get(10)?,
        favorite: row.get(11)?,
        comment: text(row, 12)?,
    })
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}
