//! CSV export of the collection. The layout is fixed so files stay
//! compatible with earlier exports: an unquoted header row, every text column
//! quoted with embedded quotes doubled, bare numeric ratings and `Yes`/`No`
//! favourites, rows separated by `\n` without a trailing newline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::Book;

/// File name used for every export.
pub const EXPORT_FILE_NAME: &str = "book_collection.csv";
/// Media type advertised for the export.
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

/// Column headers in output order.
pub const CSV_HEADERS: [&str; 12] = [
    "Title",
    "Author",
    "Publisher",
    "Published",
    "Genre",
    "Language",
    "Book Type",
    "Status",
    "Date Read",
    "Rating",
    "Favorite",
    "Comment",
];

/// Serialize `books` into CSV text, header included.
pub fn export_csv(books: &[Book]) -> String {
    let mut lines = Vec::with_capacity(books.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    lines.extend(books.iter().map(csv_row));
    lines.join("\n")
}

/// Write the export into `dir`, creating the directory when needed, and
/// return the full path of the file.
pub fn write_csv_file(books: &[Book], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, export_csv(books))
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), books = books.len(), "exported collection");
    Ok(path)
}

fn csv_row(book: &Book) -> String {
    let book_type = book.book_type.map(|kind| kind.as_str()).unwrap_or("");
    let read_status = book.read_status.map(|status| status.as_str()).unwrap_or("");

    [
        quote(&book.title),
        quote(&book.author),
        quote(&book.publisher),
        quote(&book.publish_date),
        quote(&book.genre),
        quote(&book.language),
        quote(book_type),
        quote(read_status),
        quote(&book.date_of_reading),
        book.rating.to_string(),
        if book.favorite { "Yes" } else { "No" }.to_string(),
        quote(&book.comment),
    ]
    .join(",")
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookDraft, BookType, ReadStatus};

    #[test]
    fn empty_collection_is_just_the_header() {
        assert_eq!(
            export_csv(&[]),
            "Title,Author,Publisher,Published,Genre,Language,Book Type,Status,Date Read,Rating,Favorite,Comment"
        );
    }

    #[test]
    fn rows_follow_the_header_layout() {
        let book = BookDraft {
            author: "N. K. Jemisin".into(),
            book_type: Some(BookType::Ebook),
            read_status: Some(ReadStatus::DidNotFinish),
            rating: 4,
            favorite: true,
            ..BookDraft::titled("The Fifth Season")
        }
        .with_id(3);

        let csv = export_csv(&[book]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""The Fifth Season","N. K. Jemisin","","","","","E-book","Did not finish","",4,Yes,"""#
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn unrated_books_export_zero_and_no() {
        let csv = export_csv(&[BookDraft::titled("Plain").with_id(1)]);
        assert!(csv.ends_with(r#","",0,No,"""#));
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn write_csv_file_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let path = write_csv_file(&[BookDraft::titled("X").with_id(1)], &target).unwrap();
        assert_eq!(path, target.join(EXPORT_FILE_NAME));
        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with("Title,Author"));
        assert!(written.ends_with(r#""X","","","","","","","","",0,No,"""#));
    }
}
