//! Interactive menu loop.
//!
//! # Responsibility
//! - Map menu choices to core service calls.
//! - Turn every core error into a message and return to the menu.
//!
//! # Invariants
//! - End of input exits the loop cleanly, even mid-operation.
//! - Only terminal I/O failures leave the loop with an error.

use std::io::{self, BufRead, Write};

use bookbuddy_core::{
    parse_publication_year, parse_rating, BookId, BookPatch, BookService, Database,
    DeleteOutcome, GenreService, NewBook, NewReview, ReadingStatus, RepoError, StatsService,
};
use log::warn;

use crate::render;

const MENU: &str = "\n=== BookBuddy CLI Menu ===
1. Add a new book
2. List all books
3. Search books
4. Update a book
5. Delete a book
6. View book details
7. Exit
8. Add a review
9. Collection statistics
10. Top-rated books
11. List genres";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddBook,
    ListBooks,
    SearchBooks,
    UpdateBook,
    DeleteBook,
    ViewDetails,
    Exit,
    AddReview,
    Statistics,
    TopRated,
    ListGenres,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        let choice = match input.trim() {
            "1" => Self::AddBook,
            "2" => Self::ListBooks,
            "3" => Self::SearchBooks,
            "4" => Self::UpdateBook,
            "5" => Self::DeleteBook,
            "6" => Self::ViewDetails,
            "7" => Self::Exit,
            "8" => Self::AddReview,
            "9" => Self::Statistics,
            "10" => Self::TopRated,
            "11" => Self::ListGenres,
            _ => return None,
        };
        Some(choice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Menu-driven shell over any line reader and writer.
pub struct Shell<'db, R, W> {
    db: &'db Database,
    input: R,
    output: W,
}

impl<'db, R: BufRead, W: Write> Shell<'db, R, W> {
    pub fn new(db: &'db Database, input: R, output: W) -> Self {
        Self { db, input, output }
    }

    /// Runs the menu until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n=== Welcome to BookBuddy CLI ===")?;
        writeln!(
            self.output,
            "Your personal book collection manager (v{})",
            bookbuddy_core::core_version()
        )?;

        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(line) = self.ask("\nEnter your choice (1-11): ")? else {
                break;
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "\nInvalid choice. Please try again.")?;
                continue;
            };
            if choice == MenuChoice::Exit {
                break;
            }
            if self.dispatch(choice)? == Flow::Exit || self.pause()? == Flow::Exit {
                break;
            }
        }

        writeln!(self.output, "\nThank you for using BookBuddy CLI!")?;
        self.output.flush()
    }

    fn dispatch(&mut self, choice: MenuChoice) -> io::Result<Flow> {
        match choice {
            MenuChoice::AddBook => self.add_book(),
            MenuChoice::ListBooks => self.list_books(),
            MenuChoice::SearchBooks => self.search_books(),
            MenuChoice::UpdateBook => self.update_book(),
            MenuChoice::DeleteBook => self.delete_book(),
            MenuChoice::ViewDetails => self.view_details(),
            MenuChoice::AddReview => self.add_review(),
            MenuChoice::Statistics => self.statistics(),
            MenuChoice::TopRated => self.top_rated(),
            MenuChoice::ListGenres => self.list_genres(),
            MenuChoice::Exit => Ok(Flow::Exit),
        }
    }

    fn add_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Add New Book ===")?;
        let Some(title) = self.ask("Enter book title: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(author) = self.ask("Enter author name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(isbn) = self.ask("Enter ISBN: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(year) = self.ask("Enter publication year (optional): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(genre) = self.ask("Enter genre (optional): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(status) = self.ask("Enter reading status [to read/reading/completed]: ")? else {
            return Ok(Flow::Exit);
        };

        let year = match parse_publication_year(&year) {
            Ok(year) => year,
            Err(err) => return self.message(&format!("Invalid publication year: {err}")),
        };
        let status = match parse_optional_status(&status) {
            Ok(status) => status.unwrap_or_default(),
            Err(err) => return self.message(&err.to_string()),
        };

        let new_book = NewBook::new(title, author, isbn)
            .with_publication_year(year)
            .with_genre(Some(genre.as_str()))
            .with_status(status);
        match BookService::new(self.db).add_book(&new_book) {
            Ok(book) => self.message(&format!("\nBook added successfully! (ID: {})", book.id)),
            Err(err) => self.failure("adding book", &err),
        }
    }

    fn list_books(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Book List ===")?;
        match BookService::new(self.db).list_books() {
            Ok(books) if books.is_empty() => self.message("No books found in the database."),
            Ok(books) => {
                for book in &books {
                    writeln!(self.output, "\n{}", render::book_summary(book))?;
                }
                Ok(Flow::Continue)
            }
            Err(err) => self.failure("listing books", &err),
        }
    }

    fn search_books(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Search Books ===")?;
        let Some(term) = self.ask("Enter search term (title, author, or ISBN): ")? else {
            return Ok(Flow::Exit);
        };

        match BookService::new(self.db).search_books(&term) {
            Ok(books) if books.is_empty() => self.message("No books found matching your search."),
            Ok(books) => {
                writeln!(self.output, "\nSearch Results:")?;
                for book in &books {
                    writeln!(self.output, "\n{}", render::book_summary(book))?;
                }
                Ok(Flow::Continue)
            }
            Err(err) => self.failure("searching books", &err),
        }
    }

    fn update_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Update Book ===")?;
        let Some(id) = self.ask_book_id("Enter book ID to update: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };

        let service = BookService::new(self.db);
        let details = match service.get_book_details(id) {
            Ok(details) => details,
            Err(err) => return self.failure("loading book", &err),
        };
        let book = &details.book;
        let year_label = book
            .publication_year
            .map(|year| year.to_string())
            .unwrap_or_default();
        let genre_label = details
            .genre
            .as_ref()
            .map(|genre| genre.name.clone())
            .unwrap_or_default();

        writeln!(self.output, "\nCurrent book details:")?;
        writeln!(self.output, "{}", render::book_details(&details))?;
        writeln!(
            self.output,
            "\nEnter new details (press Enter to keep current value):"
        )?;

        let prompts = [
            format!("New title [{}]: ", book.title),
            format!("New author [{}]: ", book.author),
            format!("New ISBN [{}]: ", book.isbn),
            format!("New publication year [{year_label}]: "),
            format!("New genre [{genre_label}]: "),
            format!("New status [{}]: ", book.status),
        ];
        let mut answers = Vec::with_capacity(prompts.len());
        for prompt in &prompts {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(Flow::Exit);
            };
            answers.push(answer);
        }
        let [title, author, isbn, year, genre, status]: [String; 6] = match answers.try_into() {
            Ok(answers) => answers,
            Err(_) => return Ok(Flow::Continue),
        };

        let publication_year = match parse_publication_year(&year) {
            Ok(year) => year,
            Err(err) => {
                return self.message(&format!("Invalid publication year: {err}. Update cancelled."))
            }
        };
        let status = match parse_optional_status(&status) {
            Ok(status) => status,
            Err(err) => return self.message(&format!("{err}. Update cancelled.")),
        };

        let patch = BookPatch {
            title: non_blank(title),
            author: non_blank(author),
            isbn: non_blank(isbn),
            publication_year,
            status,
            genre: non_blank(genre),
        };
        if patch.is_empty() {
            return self.message("\nNo changes made.");
        }

        match service.update_book(id, &patch) {
            Ok(_) => self.message("\nBook updated successfully!"),
            Err(err) => self.failure("updating book", &err),
        }
    }

    fn delete_book(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Delete Book ===")?;
        let Some(id) = self.ask_book_id("Enter book ID to delete: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };

        let service = BookService::new(self.db);
        let shown = match service.get_book(id) {
            Ok(book) => book,
            Err(err) => return self.failure("loading book", &err),
        };
        let prompt = format!(
            "Are you sure you want to delete '{}' by {}? (y/n): ",
            shown.title, shown.author
        );
        let Some(answer) = self.ask(&prompt)? else {
            return Ok(Flow::Exit);
        };
        if !is_yes(&answer) {
            return self.message("\nDeletion cancelled.");
        }

        // The prompt ran outside the unit of work; only delete what was shown.
        match service.delete_book(id, |current| *current == shown) {
            Ok(DeleteOutcome::Deleted {
                reviews_removed, ..
            }) => self.message(&format!(
                "\nBook deleted successfully! ({reviews_removed} review(s) removed)"
            )),
            Ok(DeleteOutcome::Declined { .. }) => {
                self.message("\nBook changed since it was shown; nothing deleted.")
            }
            Err(err) => self.failure("deleting book", &err),
        }
    }

    fn view_details(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== View Book Details ===")?;
        let Some(id) = self.ask_book_id("Enter book ID: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };

        match BookService::new(self.db).get_book_details(id) {
            Ok(details) => {
                writeln!(self.output, "\nBook Details:")?;
                self.message(&render::book_details(&details))
            }
            Err(err) => self.failure("loading book", &err),
        }
    }

    fn add_review(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Add Review ===")?;
        let Some(id) = self.ask_book_id("Enter book ID to review: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(id) = id else {
            return Ok(Flow::Continue);
        };
        let Some(rating) = self.ask("Enter rating (0-5): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(comment) = self.ask("Enter comment (optional): ")? else {
            return Ok(Flow::Exit);
        };

        let rating = match parse_rating(&rating) {
            Ok(rating) => rating,
            Err(err) => return self.message(&format!("Invalid rating: {err}")),
        };
        let review = NewReview::new(id, rating, Some(comment.as_str()));
        match BookService::new(self.db).add_review(&review) {
            Ok(stored) => self.message(&format!(
                "\nReview added on {} for book {}.",
                stored.date_added, stored.book_id
            )),
            Err(err) => self.failure("adding review", &err),
        }
    }

    fn statistics(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Collection Statistics ===")?;
        match StatsService::new(self.db).statistics() {
            Ok(stats) => self.message(&render::statistics(&stats)),
            Err(err) => self.failure("computing statistics", &err),
        }
    }

    fn top_rated(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Top-Rated Books ===")?;
        match StatsService::new(self.db).top_rated_books(None) {
            Ok(ranking) => self.message(&render::top_rated(&ranking)),
            Err(err) => self.failure("ranking books", &err),
        }
    }

    fn list_genres(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Genres ===")?;
        match GenreService::new(self.db).list_genres() {
            Ok(genres) => self.message(&render::genres(&genres)),
            Err(err) => self.failure("listing genres", &err),
        }
    }

    /// Reads a book id. Outer `None` is end of input; inner `None` means the
    /// input was rejected and already reported.
    fn ask_book_id(&mut self, prompt: &str) -> io::Result<Option<Option<BookId>>> {
        let Some(line) = self.ask(prompt)? else {
            return Ok(None);
        };
        match line.trim().parse::<BookId>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(_) => {
                writeln!(self.output, "Invalid book ID. Please enter a valid number.")?;
                Ok(Some(None))
            }
        }
    }

    /// Prints `prompt` and reads one line without its terminator.
    ///
    /// Bytes that are not UTF-8 decode to U+FFFD, so they fail validation
    /// like any other bad entry instead of ending the session.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn pause(&mut self) -> io::Result<Flow> {
        match self.ask("\nPress Enter to return to the main menu...")? {
            Some(_) => Ok(Flow::Continue),
            None => Ok(Flow::Exit),
        }
    }

    fn message(&mut self, text: &str) -> io::Result<Flow> {
        writeln!(self.output, "{text}")?;
        Ok(Flow::Continue)
    }

    fn failure(&mut self, action: &str, err: &RepoError) -> io::Result<Flow> {
        if !err.is_not_found() && !matches!(err, RepoError::Validation(_)) {
            warn!("event=shell_action module=cli status=error action={action:?}");
        }
        self.message(&format!("\nError {action}: {err}"))
    }
}

fn parse_optional_status(
    input: &str,
) -> Result<Option<ReadingStatus>, bookbuddy_core::ValidationError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input.parse().map(Some)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::{is_yes, MenuChoice, Shell};
    use bookbuddy_core::{seed_sample_data, BookService, Database, NewBook, NewReview};
    use std::io::Cursor;

    fn run_script(db: &Database, script: &str) -> String {
        let mut output = Vec::new();
        Shell::new(db, Cursor::new(script.as_bytes()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn menu_choices_parse_with_whitespace() {
        assert_eq!(MenuChoice::parse(" 1 "), Some(MenuChoice::AddBook));
        assert_eq!(MenuChoice::parse("10"), Some(MenuChoice::TopRated));
        assert_eq!(MenuChoice::parse("12"), None);
        assert_eq!(MenuChoice::parse("one"), None);
        assert!(is_yes(" Y "));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn invalid_choice_reprompts_and_end_of_input_exits() {
        let db = Database::open_in_memory().unwrap();
        let output = run_script(&db, "banana\n");

        assert!(output.contains("Invalid choice. Please try again."));
        assert_eq!(output.matches("=== BookBuddy CLI Menu ===").count(), 2);
        assert!(output.ends_with("Thank you for using BookBuddy CLI!\n"));
    }

    #[test]
    fn add_book_then_list_shows_it() {
        let db = Database::open_in_memory().unwrap();
        let output = run_script(
            &db,
            "1\nDune\nFrank Herbert\n978-0441172719\n1965\nScience Fiction\nreading\n\n2\n\n7\n",
        );

        assert!(output.contains("Book added successfully! (ID: 1)"));
        assert!(output.contains("Title: Dune"));
        assert!(output.contains("Status: Reading"));

        let books = BookService::new(&db).list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert!(books[0].genre_id.is_some());
    }

    #[test]
    fn bad_year_is_reported_and_nothing_is_stored() {
        let db = Database::open_in_memory().unwrap();
        let output = run_script(&db, "1\nDune\nFrank Herbert\nisbn\nsoon\n\n\n\n7\n");

        assert!(output.contains("Invalid publication year"));
        assert!(BookService::new(&db).list_books().unwrap().is_empty());
    }

    #[test]
    fn duplicate_isbn_is_reported_as_error_message() {
        let db = Database::open_in_memory().unwrap();
        BookService::new(&db)
            .add_book(&NewBook::new("Dune", "Frank Herbert", "isbn-1"))
            .unwrap();

        let output = run_script(&db, "1\nCopy\nSomeone\nisbn-1\n\n\n\n\n7\n");
        assert!(output.contains("Error adding book: constraint violation"));
        assert_eq!(BookService::new(&db).list_books().unwrap().len(), 1);
    }

    #[test]
    fn update_keeps_blank_fields() {
        let db = Database::open_in_memory().unwrap();
        let book = BookService::new(&db)
            .add_book(&NewBook::new("Dune", "Frank Herbert", "isbn-1"))
            .unwrap();

        let output = run_script(&db, "4\n1\nDune Messiah\n\n\n\n\ncompleted\n\n7\n");
        assert!(output.contains("Book updated successfully!"));

        let updated = BookService::new(&db).get_book(book.id).unwrap();
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.status.to_string(), "Completed");
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let db = Database::open_in_memory().unwrap();
        let service = BookService::new(&db);
        let book = service
            .add_book(&NewBook::new("Dune", "Frank Herbert", "isbn-1"))
            .unwrap();
        service
            .add_review(&NewReview::new(book.id, 4.0, None))
            .unwrap();

        let output = run_script(&db, "5\n1\nn\n\n7\n");
        assert!(output.contains("Deletion cancelled."));
        assert_eq!(service.list_books().unwrap().len(), 1);

        let output = run_script(&db, "5\n1\ny\n\n7\n");
        assert!(output.contains("Book deleted successfully! (1 review(s) removed)"));
        assert!(service.list_books().unwrap().is_empty());
    }

    #[test]
    fn non_numeric_and_unknown_ids_are_reported() {
        let db = Database::open_in_memory().unwrap();
        let output = run_script(&db, "6\nabc\n\n6\n42\n\n7\n");

        assert!(output.contains("Invalid book ID. Please enter a valid number."));
        assert!(output.contains("Error loading book: book 42 not found"));
    }

    #[test]
    fn reports_cover_seeded_collection() {
        let db = Database::open_in_memory().unwrap();
        seed_sample_data(&db).unwrap();

        let output = run_script(&db, "9\n\n10\n\n11\n\n8\n3\n6\nwow\n\n7\n");
        assert!(output.contains("Total books: 7"));
        assert!(output.contains("1. Dune by Frank Herbert (5.00, 1 review(s))"));
        assert!(output.contains("Science Fiction"));
        assert!(output.contains("Invalid rating"));
    }

    #[test]
    fn non_utf8_input_reprompts_instead_of_failing() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        Shell::new(&db, Cursor::new(&b"\xff\xfe\n2\n\n7\n"[..]), &mut output)
            .run()
            .unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Invalid choice. Please try again."));
        assert!(output.contains("No books found in the database."));
        assert!(output.ends_with("Thank you for using BookBuddy CLI!\n"));
    }

    #[test]
    fn non_utf8_book_fields_are_stored_lossily() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        Shell::new(
            &db,
            Cursor::new(&b"1\nDune\xff\nFrank Herbert\nisbn-1\n\n\n\n\n7\n"[..]),
            &mut output,
        )
        .run()
        .unwrap();

        let books = BookService::new(&db).list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune\u{FFFD}");
    }

    #[test]
    fn end_of_input_mid_operation_exits_cleanly() {
        let db = Database::open_in_memory().unwrap();
        let output = run_script(&db, "1\nDune\n");

        assert!(output.contains("Enter author name: "));
        assert!(output.ends_with("Thank you for using BookBuddy CLI!\n"));
        assert!(BookService::new(&db).list_books().unwrap().is_empty());
    }
}
