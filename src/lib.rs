//! Core library surface for the Book Collection Manager.
//!
//! The data layer (`db`) stores books in an embedded SQLite file; `filter`,
//! `sort`, `stats` and `export` are pure functions over the record set that
//! power the list view, the dashboard and CSV export. The terminal UI in `ui`
//! only consumes their outputs and feeds user input back in.
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod models;
pub mod sort;
pub mod stats;
pub mod ui;

/// Record store operations.
pub use db::{create_book, delete_book, list_books, open_in_memory_store, open_store, update_book};

/// Derived views over a record set.
pub use export::export_csv;
pub use filter::{filter_books, FilterSpec};
pub use sort::{sort_books, SortKey};
pub use stats::{summarize, CollectionSummary};

pub use error::StoreError;
pub use models::{Book, BookDraft, BookType, ReadStatus};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
