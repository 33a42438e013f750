use ratatui::layout::Constraint;

use crate::filter::{filter_books, FilterSpec};
use crate::models::{Book, BookType, ReadStatus};
use crate::sort::{sort_books, SortKey};
use crate::stats::{summarize, CollectionSummary};

use super::helpers::{or_dash, rating_stars};

/// Columns of the book table, in display order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LibraryColumn {
    Favorite,
    Title,
    Author,
    Publisher,
    PublishDate,
    Genre,
    Language,
    BookType,
    ReadStatus,
    DateOfReading,
    Rating,
}

impl LibraryColumn {
    pub(crate) const ALL: [LibraryColumn; 11] = [
        LibraryColumn::Favorite,
        LibraryColumn::Title,
        LibraryColumn::Author,
        LibraryColumn::Publisher,
        LibraryColumn::PublishDate,
        LibraryColumn::Genre,
        LibraryColumn::Language,
        LibraryColumn::BookType,
        LibraryColumn::ReadStatus,
        LibraryColumn::DateOfReading,
        LibraryColumn::Rating,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            LibraryColumn::Favorite => "Favorite",
            LibraryColumn::Title => "Title",
            LibraryColumn::Author => "Author",
            LibraryColumn::Publisher => "Publisher",
            LibraryColumn::PublishDate => "Published",
            LibraryColumn::Genre => "Genre",
            LibraryColumn::Language => "Language",
            LibraryColumn::BookType => "Type",
            LibraryColumn::ReadStatus => "Status",
            LibraryColumn::DateOfReading => "Date Read",
            LibraryColumn::Rating => "Rating",
        }
    }

    /// Header text; the favourite marker column is too narrow for a label.
    pub(crate) fn header(self) -> &'static str {
        match self {
            LibraryColumn::Favorite => "",
            other => other.label(),
        }
    }

    pub(crate) fn width(self) -> Constraint {
        match self {
            LibraryColumn::Favorite => Constraint::Length(2),
            LibraryColumn::Title => Constraint::Percentage(22),
            LibraryColumn::Author => Constraint::Percentage(15),
            LibraryColumn::Publisher => Constraint::Percentage(11),
            LibraryColumn::PublishDate => Constraint::Length(10),
            LibraryColumn::Genre => Constraint::Percentage(9),
            LibraryColumn::Language => Constraint::Percentage(8),
            LibraryColumn::BookType => Constraint::Length(10),
            LibraryColumn::ReadStatus => Constraint::Length(15),
            LibraryColumn::DateOfReading => Constraint::Length(11),
            LibraryColumn::Rating => Constraint::Length(6),
        }
    }

    pub(crate) fn cell_text(self, book: &Book) -> String {
        match self {
            LibraryColumn::Favorite => if book.favorite { "♥" } else { " " }.to_string(),
            LibraryColumn::Title => book.title.clone(),
            LibraryColumn::Author => or_dash(&book.author),
            LibraryColumn::Publisher => or_dash(&book.publisher),
            LibraryColumn::PublishDate => or_dash(&book.publish_date),
            LibraryColumn::Genre => or_dash(&book.genre),
            LibraryColumn::Language => or_dash(&book.language),
            LibraryColumn::BookType => book.book_type.map_or("-", BookType::as_str).to_string(),
            LibraryColumn::ReadStatus => {
                book.read_status.map_or("-", ReadStatus::as_str).to_string()
            }
            LibraryColumn::DateOfReading => or_dash(&book.date_of_reading),
            LibraryColumn::Rating => {
                if book.is_rated() {
                    rating_stars(book.rating)
                } else {
                    "-".to_string()
                }
            }
        }
    }
}

/// Which table columns are shown. Everything starts visible, and the last
/// visible column cannot be hidden.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ColumnVisibility {
    hidden: Vec<LibraryColumn>,
}

impl ColumnVisibility {
    pub(crate) fn is_visible(&self, column: LibraryColumn) -> bool {
        !self.hidden.contains(&column)
    }

    pub(crate) fn visible(&self) -> Vec<LibraryColumn> {
        LibraryColumn::ALL
            .into_iter()
            .filter(|column| self.is_visible(*column))
            .collect()
    }

    /// Flip `column`. Returns `false` when that would leave no column.
    pub(crate) fn toggle(&mut self, column: LibraryColumn) -> bool {
        if let Some(idx) = self.hidden.iter().position(|hidden| *hidden == column) {
            self.hidden.remove(idx);
            return true;
        }
        if self.hidden.len() + 1 >= LibraryColumn::ALL.len() {
            return false;
        }
        self.hidden.push(column);
        true
    }
}

/// State behind the book list: the full record set as last loaded from the
/// store plus the filtered, sorted view derived from it. The view is rebuilt
/// whenever the books, the filter or the sort key change.
pub(crate) struct LibraryScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) visible: Vec<Book>,
    pub(crate) filter: FilterSpec,
    pub(crate) sort: SortKey,
    pub(crate) columns: ColumnVisibility,
    pub(crate) selected: usize,
}

impl LibraryScreen {
    pub(crate) fn new(books: Vec<Book>, sort: SortKey) -> Self {
        let mut screen = Self {
            books,
            visible: Vec::new(),
            filter: FilterSpec::default(),
            sort,
            columns: ColumnVisibility::default(),
            selected: 0,
        };
        screen.refresh_view();
        screen
    }

    pub(crate) fn refresh_view(&mut self) {
        let filtered = filter_books(&self.books, &self.filter);
        self.visible = sort_books(&filtered, self.sort);
        self.ensure_in_bounds();
    }

    /// Replace the record set after a reload, keeping `focus_id` selected
    /// when it is still visible.
    pub(crate) fn set_books(&mut self, books: Vec<Book>, focus_id: Option<i64>) {
        self.books = books;
        self.refresh_view();
        if let Some(id) = focus_id {
            self.select_id(id);
        }
    }

    pub(crate) fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.refresh_view();
    }

    pub(crate) fn clear_filter(&mut self) {
        self.filter.clear();
        self.refresh_view();
    }

    /// Advance to the next sort key, keeping the current book selected.
    pub(crate) fn cycle_sort(&mut self) -> SortKey {
        let focus = self.current_book().map(|book| book.id);
        self.sort = self.sort.next();
        self.refresh_view();
        if let Some(id) = focus {
            self.select_id(id);
        }
        self.sort
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.visible.get(self.selected)
    }

    pub(crate) fn select_id(&mut self, id: i64) {
        if let Some(idx) = self.visible.iter().position(|book| book.id == id) {
            self.selected = idx;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }
}

/// Statistics shown on the dashboard, recomputed from the full record set
/// after every reload.
pub(crate) struct DashboardScreen {
    pub(crate) summary: CollectionSummary,
}

impl DashboardScreen {
    pub(crate) fn new(books: &[Book]) -> Self {
        Self {
            summary: summarize(books),
        }
    }

    pub(crate) fn refresh(&mut self, books: &[Book]) {
        self.summary = summarize(books);
    }
}
