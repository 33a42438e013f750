use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::filter::{FilterField, FilterSpec};
use crate::models::{Book, BookDraft, BookType, ReadStatus, MAX_RATING};

use super::helpers::rating_stars;

/// Known values for the free-text fields that offer auto-complete.
#[derive(Default, Clone)]
pub(crate) struct Suggestions {
    pub(crate) authors: Vec<String>,
    pub(crate) publishers: Vec<String>,
    pub(crate) genres: Vec<String>,
    pub(crate) languages: Vec<String>,
}

impl Suggestions {
    fn candidates(&self, field: BookField) -> &[String] {
        match field {
            BookField::Author => &self.authors,
            BookField::Publisher => &self.publishers,
            BookField::Genre => &self.genres,
            BookField::Language => &self.languages,
            _ => &[],
        }
    }
}

/// Fields of the add/edit book form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
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
    Favorite,
    Comment,
}

impl BookField {
    pub(crate) const ALL: [BookField; 12] = [
        BookField::Title,
        BookField::Author,
        BookField::Publisher,
        BookField::PublishDate,
        BookField::Genre,
        BookField::Language,
        BookField::BookType,
        BookField::ReadStatus,
        BookField::DateOfReading,
        BookField::Rating,
        BookField::Favorite,
        BookField::Comment,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Publisher => "Publisher",
            BookField::PublishDate => "Published",
            BookField::Genre => "Genre",
            BookField::Language => "Language",
            BookField::BookType => "Book Type",
            BookField::ReadStatus => "Status",
            BookField::DateOfReading => "Date Read",
            BookField::Rating => "Rating",
            BookField::Favorite => "Favorite",
            BookField::Comment => "Comment",
        }
    }

    fn index(self) -> usize {
        BookField::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn offset(self, delta: isize) -> BookField {
        let len = BookField::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(len);
        BookField::ALL[idx as usize]
    }

    fn is_text(self) -> bool {
        !matches!(
            self,
            BookField::BookType | BookField::ReadStatus | BookField::Rating | BookField::Favorite
        )
    }

    fn autocompletes(self) -> bool {
        matches!(
            self,
            BookField::Author | BookField::Publisher | BookField::Genre | BookField::Language
        )
    }
}

/// Step through `None` followed by every value in `all`.
fn cycle_option<T: Copy + PartialEq>(current: Option<T>, all: &[T], forward: bool) -> Option<T> {
    let len = all.len() as isize + 1;
    let idx = match current {
        None => 0,
        Some(value) => all.iter().position(|v| *v == value).map_or(0, |p| p as isize + 1),
    };
    let next = (idx + if forward { 1 } else { -1 }).rem_euclid(len);
    if next == 0 {
        None
    } else {
        Some(all[next as usize - 1])
    }
}

/// Form state for adding or editing a book, including auto-complete
/// tracking for the author, publisher, genre and language fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) publisher: String,
    pub(crate) publish_date: String,
    pub(crate) genre: String,
    pub(crate) language: String,
    pub(crate) book_type: Option<BookType>,
    pub(crate) read_status: Option<ReadStatus>,
    pub(crate) date_of_reading: String,
    pub(crate) rating: u8,
    pub(crate) favorite: bool,
    pub(crate) comment: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl BookForm {
    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            publish_date: book.publish_date.clone(),
            genre: book.genre.clone(),
            language: book.language.clone(),
            book_type: book.book_type,
            read_status: book.read_status,
            date_of_reading: book.date_of_reading.clone(),
            rating: book.rating,
            favorite: book.favorite,
            comment: book.comment.clone(),
            ..Self::default()
        }
    }

    fn text_mut(&mut self, field: BookField) -> Option<&mut String> {
        match field {
            BookField::Title => Some(&mut self.title),
            BookField::Author => Some(&mut self.author),
            BookField::Publisher => Some(&mut self.publisher),
            BookField::PublishDate => Some(&mut self.publish_date),
            BookField::Genre => Some(&mut self.genre),
            BookField::Language => Some(&mut self.language),
            BookField::DateOfReading => Some(&mut self.date_of_reading),
            BookField::Comment => Some(&mut self.comment),
            _ => None,
        }
    }

    fn text(&self, field: BookField) -> Option<&str> {
        match field {
            BookField::Title => Some(&self.title),
            BookField::Author => Some(&self.author),
            BookField::Publisher => Some(&self.publisher),
            BookField::PublishDate => Some(&self.publish_date),
            BookField::Genre => Some(&self.genre),
            BookField::Language => Some(&self.language),
            BookField::DateOfReading => Some(&self.date_of_reading),
            BookField::Comment => Some(&self.comment),
            _ => None,
        }
    }

    /// Move focus forward (`1`) or backward (`-1`).
    pub(crate) fn move_focus(&mut self, delta: isize) {
        self.active = self.active.offset(delta);
        self.autocomplete_disabled = false;
        self.suggestion = None;
    }

    /// Insert a character into the active field. Digits set the rating, space
    /// toggles the favourite flag and cycles the enumerated fields.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Rating => match ch.to_digit(10) {
                Some(value) if value <= u32::from(MAX_RATING) => {
                    self.rating = value as u8;
                    true
                }
                _ => false,
            },
            BookField::Favorite => {
                if ch == ' ' {
                    self.favorite = !self.favorite;
                    true
                } else {
                    false
                }
            }
            BookField::BookType | BookField::ReadStatus => {
                if ch == ' ' {
                    self.cycle_choice(true);
                    true
                } else {
                    false
                }
            }
            field => {
                if field.autocompletes() {
                    self.autocomplete_disabled = false;
                }
                if let Some(value) = self.text_mut(field) {
                    value.push(ch);
                }
                true
            }
        }
    }

    /// Remove a character from the active field; non-text fields reset.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Rating => self.rating = 0,
            BookField::Favorite => self.favorite = false,
            BookField::BookType => self.book_type = None,
            BookField::ReadStatus => self.read_status = None,
            field => {
                if let Some(value) = self.text_mut(field) {
                    value.pop();
                }
                self.autocomplete_disabled = false;
            }
        }
    }

    /// Step the active enumerated field (or rating) forward or backward.
    pub(crate) fn cycle_choice(&mut self, forward: bool) {
        match self.active {
            BookField::BookType => {
                self.book_type = cycle_option(self.book_type, &BookType::ALL, forward);
            }
            BookField::ReadStatus => {
                self.read_status = cycle_option(self.read_status, &ReadStatus::ALL, forward);
            }
            BookField::Rating => {
                self.rating = if forward {
                    (self.rating + 1).min(MAX_RATING)
                } else {
                    self.rating.saturating_sub(1)
                };
            }
            BookField::Favorite => self.favorite = !self.favorite,
            _ => {}
        }
    }

    /// Validate and normalize form inputs before they are written to the
    /// database.
    pub(crate) fn parse_inputs(&self) -> Result<BookDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        Ok(BookDraft {
            title: title.to_string(),
            author: self.author.trim().to_string(),
            publisher: self.publisher.trim().to_string(),
            publish_date: self.publish_date.trim().to_string(),
            genre: self.genre.trim().to_string(),
            language: self.language.trim().to_string(),
            book_type: self.book_type,
            read_status: self.read_status,
            date_of_reading: self.date_of_reading.trim().to_string(),
            rating: self.rating,
            favorite: self.favorite,
            comment: self.comment.trim().to_string(),
        })
    }

    /// Update the auto-complete suggestion for the active field.
    pub(crate) fn update_suggestion(&mut self, suggestions: &Suggestions) {
        let field = self.active;
        if !field.autocompletes() || self.autocomplete_disabled {
            self.suggestion = None;
            return;
        }
        let current = self.text(field).unwrap_or_default();
        self.suggestion = suggest(current, suggestions.candidates(field));
    }

    /// Apply the suggested value, marking auto-complete as satisfied.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        let Some(candidate) = self.suggestion.take() else {
            return false;
        };
        let field = self.active;
        if let Some(value) = self.text_mut(field) {
            *value = candidate;
        }
        self.autocomplete_disabled = true;
        true
    }

    /// Explicitly disable auto-complete for the rest of this interaction.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    /// Remaining characters to display as a ghosted auto-complete hint.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let current_len = self.text(self.active)?.chars().count();
        let suffix: String = candidate.chars().skip(current_len).collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, is_unset) = match field {
            BookField::BookType => match self.book_type {
                Some(kind) => (format!("< {kind} >"), false),
                None => ("< unset >".to_string(), true),
            },
            BookField::ReadStatus => match self.read_status {
                Some(status) => (format!("< {status} >"), false),
                None => ("< unset >".to_string(), true),
            },
            BookField::Rating => {
                if self.rating == 0 {
                    ("not rated".to_string(), true)
                } else {
                    (rating_stars(self.rating), false)
                }
            }
            BookField::Favorite => {
                let text = if self.favorite { "Yes" } else { "No" };
                (text.to_string(), !self.favorite)
            }
            text_field => {
                let value = self.text(text_field).unwrap_or_default();
                if value.is_empty() {
                    let placeholder = if text_field == BookField::Title {
                        "<required>"
                    } else {
                        "<optional>"
                    };
                    (placeholder.to_string(), true)
                } else {
                    (value.to_string(), false)
                }
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if is_unset {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ];
        if is_active && field.autocompletes() && !is_unset {
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        }
        Line::from(spans)
    }

    /// Character length of the active text field, used to place the cursor.
    pub(crate) fn cursor_offset(&self) -> Option<usize> {
        if !self.active.is_text() {
            return None;
        }
        let value = self.text(self.active)?;
        Some(self.active.label().len() + 2 + value.chars().count())
    }
}

/// First candidate starting with `current` (case-insensitively), unless the
/// input already equals it. Two characters are needed before suggesting.
pub(crate) fn suggest(current: &str, candidates: &[String]) -> Option<String> {
    if current.chars().count() < 2 {
        return None;
    }
    let current_lower = current.to_lowercase();
    candidates
        .iter()
        .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
        .filter(|candidate| candidate.to_lowercase() != current_lower)
        .cloned()
}

/// Favourite criterion cycle: any → favourites only → non-favourites.
fn cycle_favorite(current: Option<bool>, forward: bool) -> Option<bool> {
    cycle_option(current, &[true, false], forward)
}

/// Live-edited filter bar. Every keystroke updates `spec`, and the caller
/// re-applies it to the list view.
#[derive(Clone)]
pub(crate) struct FilterForm {
    pub(crate) spec: FilterSpec,
    pub(crate) active: FilterField,
    genres: Vec<String>,
    languages: Vec<String>,
}

impl FilterForm {
    pub(crate) fn new(spec: FilterSpec, suggestions: &Suggestions) -> Self {
        Self {
            spec,
            active: FilterField::Title,
            genres: suggestions.genres.clone(),
            languages: suggestions.languages.clone(),
        }
    }

    pub(crate) fn move_focus(&mut self, delta: isize) {
        let len = FilterField::ALL.len() as isize;
        let idx = FilterField::ALL
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as isize;
        self.active = FilterField::ALL[(idx + delta).rem_euclid(len) as usize];
    }

    fn text_mut(&mut self, field: FilterField) -> Option<&mut String> {
        match field {
            FilterField::Title => Some(&mut self.spec.title),
            FilterField::Author => Some(&mut self.spec.author),
            FilterField::Publisher => Some(&mut self.spec.publisher),
            FilterField::Genre => Some(&mut self.spec.genre),
            FilterField::Language => Some(&mut self.spec.language),
            _ => None,
        }
    }

    /// Type into text criteria; space cycles the choice criteria.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        if let Some(value) = self.text_mut(field) {
            value.push(ch);
            return true;
        }
        if ch == ' ' {
            self.cycle_choice(true);
            return true;
        }
        false
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        match field {
            FilterField::BookType => self.spec.book_type = None,
            FilterField::ReadStatus => self.spec.read_status = None,
            FilterField::Favorite => self.spec.favorite = None,
            _ => {
                if let Some(value) = self.text_mut(field) {
                    value.pop();
                }
            }
        }
    }

    /// Step through the allowed values of the active criterion. Genre and
    /// language cycle through the values present in the collection.
    pub(crate) fn cycle_choice(&mut self, forward: bool) {
        match self.active {
            FilterField::BookType => {
                self.spec.book_type = cycle_option(self.spec.book_type, &BookType::ALL, forward);
            }
            FilterField::ReadStatus => {
                self.spec.read_status =
                    cycle_option(self.spec.read_status, &ReadStatus::ALL, forward);
            }
            FilterField::Favorite => {
                self.spec.favorite = cycle_favorite(self.spec.favorite, forward);
            }
            FilterField::Genre => {
                self.spec.genre = cycle_text(&self.spec.genre, &self.genres, forward);
            }
            FilterField::Language => {
                self.spec.language = cycle_text(&self.spec.language, &self.languages, forward);
            }
            _ => {}
        }
    }

    pub(crate) fn build_line(&self, field: FilterField) -> Line<'static> {
        let display = match field {
            FilterField::Title => self.spec.title.clone(),
            FilterField::Author => self.spec.author.clone(),
            FilterField::Publisher => self.spec.publisher.clone(),
            FilterField::Genre => self.spec.genre.clone(),
            FilterField::Language => self.spec.language.clone(),
            FilterField::BookType => self
                .spec
                .book_type
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            FilterField::ReadStatus => self
                .spec
                .read_status
                .map(|status| status.to_string())
                .unwrap_or_default(),
            FilterField::Favorite => match self.spec.favorite {
                Some(true) => "Favorites only".to_string(),
                Some(false) => "Not favorites".to_string(),
                None => String::new(),
            },
        };

        let is_active = self.active == field;
        let (display, style) = if display.is_empty() {
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ("<any>".to_string(), style)
        } else if is_active {
            (display, Style::default().fg(Color::Yellow))
        } else {
            (display, Style::default().fg(Color::Green))
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn cursor_offset(&self) -> Option<usize> {
        let value = match self.active {
            FilterField::Title => &self.spec.title,
            FilterField::Author => &self.spec.author,
            FilterField::Publisher => &self.spec.publisher,
            FilterField::Genre => &self.spec.genre,
            FilterField::Language => &self.spec.language,
            _ => return None,
        };
        Some(self.active.label().len() + 2 + value.chars().count())
    }
}

/// Move to the next/previous known value; an empty string means "any".
fn cycle_text(current: &str, values: &[String], forward: bool) -> String {
    let current = if current.is_empty() {
        None
    } else {
        values.iter().position(|value| value == current)
    };
    cycle_option(current, &(0..values.len()).collect::<Vec<_>>(), forward)
        .map(|idx| values[idx].clone())
        .unwrap_or_default()
}

/// State for confirming permanent book deletion.
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.display_title(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inputs_trims_and_requires_title() {
        let mut form = BookForm::default();
        assert!(form.parse_inputs().is_err());

        form.title = "  Piranesi ".into();
        form.author = " Susanna Clarke".into();
        form.rating = 5;
        let draft = form.parse_inputs().unwrap();
        assert_eq!(draft.title, "Piranesi");
        assert_eq!(draft.author, "Susanna Clarke");
        assert_eq!(draft.rating, 5);
    }

    #[test]
    fn rating_field_only_accepts_valid_digits() {
        let mut form = BookForm {
            active: BookField::Rating,
            ..BookForm::default()
        };
        assert!(form.push_char('4'));
        assert_eq!(form.rating, 4);
        assert!(!form.push_char('9'));
        assert!(!form.push_char('x'));
        assert_eq!(form.rating, 4);
        form.backspace();
        assert_eq!(form.rating, 0);
    }

    #[test]
    fn enumerated_fields_cycle_through_unset() {
        let mut form = BookForm {
            active: BookField::BookType,
            ..BookForm::default()
        };
        form.cycle_choice(true);
        assert_eq!(form.book_type, Some(BookType::Paper));
        form.cycle_choice(false);
        assert_eq!(form.book_type, None);
        form.cycle_choice(false);
        assert_eq!(form.book_type, Some(BookType::Audiobook));
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = BookForm::default();
        form.move_focus(-1);
        assert_eq!(form.active, BookField::Comment);
        form.move_focus(1);
        assert_eq!(form.active, BookField::Title);
    }

    #[test]
    fn author_suggestion_completes_on_accept() {
        let suggestions = Suggestions {
            authors: vec!["Terry Pratchett".into()],
            ..Suggestions::default()
        };
        let mut form = BookForm {
            active: BookField::Author,
            ..BookForm::default()
        };
        for ch in "ter".chars() {
            form.push_char(ch);
        }
        form.update_suggestion(&suggestions);
        assert_eq!(form.suggestion_suffix().as_deref(), Some("ry Pratchett"));
        assert!(form.accept_suggestion());
        assert_eq!(form.author, "Terry Pratchett");
    }

    #[test]
    fn suggest_needs_two_characters_and_a_difference() {
        let candidates = vec!["Penguin".to_string()];
        assert_eq!(suggest("p", &candidates), None);
        assert_eq!(suggest("pe", &candidates), Some("Penguin".to_string()));
        assert_eq!(suggest("penguin", &candidates), None);
    }

    #[test]
    fn filter_form_cycles_known_genres() {
        let suggestions = Suggestions {
            genres: vec!["Drama".into(), "Poetry".into()],
            ..Suggestions::default()
        };
        let mut form = FilterForm::new(FilterSpec::default(), &suggestions);
        form.active = FilterField::Genre;
        form.cycle_choice(true);
        assert_eq!(form.spec.genre, "Drama");
        form.cycle_choice(true);
        assert_eq!(form.spec.genre, "Poetry");
        form.cycle_choice(true);
        assert_eq!(form.spec.genre, "");
    }

    #[test]
    fn filter_form_favorite_cycle() {
        let mut form = FilterForm::new(FilterSpec::default(), &Suggestions::default());
        form.active = FilterField::Favorite;
        assert!(form.push_char(' '));
        assert_eq!(form.spec.favorite, Some(true));
        form.cycle_choice(true);
        assert_eq!(form.spec.favorite, Some(false));
        form.backspace();
        assert_eq!(form.spec.favorite, None);
    }
}
