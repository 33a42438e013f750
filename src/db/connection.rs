use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreError;

/// Every non-key column of the `books` table with the definition used when
/// the column has to be added to an older database. The order matches the
/// `CREATE TABLE` statement below.
const BOOK_COLUMNS: &[(&str, &str)] = &[
    ("title", "TEXT NOT NULL DEFAULT ''"),
    ("author", "TEXT"),
    ("publisher", "TEXT"),
    ("publish_date", "TEXT"),
    ("genre", "TEXT"),
    ("language", "TEXT"),
    ("book_type", "TEXT"),
    ("read_status", "TEXT"),
    ("date_of_reading", "TEXT"),
    ("rating", "INTEGER NOT NULL DEFAULT 0"),
    ("favorite", "INTEGER NOT NULL DEFAULT 0"),
    ("comment", "TEXT"),
];

/// Open (or create) the SQLite database at `path` and bring its schema up to
/// date. Parent directories are created on demand.
pub fn open_store(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "opened book store");
    Ok(conn)
}

/// Fresh, schema-initialised store that lives only as long as the
/// connection. Used by tests and the headless commands' dry runs.
pub fn open_in_memory_store() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `books` table if needed and add any column missing from an
/// older layout. `AUTOINCREMENT` keeps identifiers from being reused after a
/// deletion.
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT '',
            author TEXT,
            publisher TEXT,
            publish_date TEXT,
            genre TEXT,
            language TEXT,
            book_type TEXT,
            read_status TEXT,
            date_of_reading TEXT,
            rating INTEGER NOT NULL DEFAULT 0,
            favorite INTEGER NOT NULL DEFAULT 0,
            comment TEXT
        )",
        [],
    )?;

    add_missing_columns(conn)
}

fn add_missing_columns(conn: &Connection) -> Result<(), StoreError> {
    let existing = existing_columns(conn)?;

    for (name, definition) in BOOK_COLUMNS {
        if existing.iter().any(|column| column == name) {
            continue;
        }
        debug!(column = name, "adding missing column to books table");
        conn.execute(
            &format!("ALTER TABLE books ADD COLUMN {name} {definition}"),
            [],
        )?;
    }

    Ok(())
}

fn existing_columns(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare("PRAGMA table_info(books)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_every_column() {
        let conn = open_in_memory_store().unwrap();
        let columns = existing_columns(&conn).unwrap();
        assert_eq!(columns[0], "id");
        for (name, _) in BOOK_COLUMNS {
            assert!(columns.iter().any(|c| c == name), "missing {name}");
        }
    }

    #[test]
    fn ensure_schema_is_repeatable() {
        let conn = open_in_memory_store().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(existing_columns(&conn).unwrap().len(), BOOK_COLUMNS.len() + 1);
    }

    #[test]
    fn older_tables_gain_new_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT
            )",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO books (title, author) VALUES ('Emma', 'Jane Austen')",
            [],
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let (rating, favorite): (i64, i64) = conn
            .query_row("SELECT rating, favorite FROM books", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((rating, favorite), (0, 0));
        assert!(existing_columns(&conn).unwrap().iter().any(|c| c == "comment"));
    }
}
