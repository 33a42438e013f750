//! Persistence module split across logical submodules.

mod books;
mod connection;

pub use books::{
    create_book, delete_book, fetch_book, fetch_distinct_values, list_books, update_book,
    TextColumn,
};
pub use connection::{ensure_schema, open_in_memory_store, open_store};
