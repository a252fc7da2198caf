use std::sync::Arc;

use bookshelf_db::StoreError;
use thiserror::Error;

use super::models::{Book, BookView, PartialUpdate, SearchFilter};
use super::query::BookQuery;
use super::repository::BookRepository;
use super::validation;

pub const BOOK_UPDATED: &str = "Book details updated";

#[derive(Error, Debug)]
pub enum BookError {
    /// Create request violates field constraints; one message per violation, `; `-joined
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error("Book not found with id: {0}")]
    NotFound(String),

    #[error("book store failure: {0}")]
    Store(#[from] StoreError),
}

/// Book operations over a [`BookRepository`]. Holds no mutable state.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    /// Validate and store a new book, returning its store-assigned id.
    pub async fn create(&self, view: BookView) -> Result<String, BookError> {
        let violations = validation::validate_view(&view);
        if !violations.is_empty() {
            return Err(BookError::Validation(validation::combined_message(
                &violations,
            )));
        }

        let saved = self.repository.save(Book::from(view)).await?;
        let id = saved.id.ok_or(StoreError::MissingId)?;

        tracing::info!(book_id = %id, "book created");
        Ok(id)
    }

    pub async fn search(&self, filter: SearchFilter) -> Result<Vec<BookView>, BookError> {
        let query = BookQuery::resolve(filter);
        let books = self.repository.find(&query).await?;

        tracing::debug!(query = query.kind(), matches = books.len(), "book search");
        Ok(books.into_iter().map(BookView::from).collect())
    }

    /// Titles of every available book.
    pub async fn available_titles(&self) -> Result<Vec<String>, BookError> {
        let books = self
            .repository
            .find(&BookQuery::Available { available: true })
            .await?;

        Ok(books.into_iter().map(|book| book.title).collect())
    }

    /// Apply a partial update. Nothing is persisted unless every check passes.
    pub async fn update(
        &self,
        id: &str,
        updates: Option<PartialUpdate>,
    ) -> Result<&'static str, BookError> {
        let mut book = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        let updates = updates.ok_or(BookError::InvalidArgument("No update data provided"))?;
        apply_update(&mut book, updates)?;

        self.repository.save(book).await?;
        tracing::info!(book_id = %id, "book updated");
        Ok(BOOK_UPDATED)
    }

    pub async fn delete(&self, id: &str) -> Result<String, BookError> {
        let book = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        self.repository.delete(&book).await?;
        tracing::info!(book_id = %id, "book deleted");
        Ok(format!("Book with id {} deleted", id))
    }
}

// Length limits are not re-checked here, only title blankness.
fn apply_update(book: &mut Book, updates: PartialUpdate) -> Result<(), BookError> {
    if let Some(available) = updates.available {
        book.available = available;
    }

    if let Some(title) = updates.title {
        if validation::is_blank(&title) {
            return Err(BookError::InvalidArgument("Title cannot be blank"));
        }
        book.title = title;
    }

    if let Some(description) = updates.description {
        book.description = Some(description);
    }

    if let Some(author) = updates.author {
        book.author = author;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::CollectionBookRepository;
    use async_trait::async_trait;
    use bookshelf_db::Collection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Delegates to a real collection while counting writes and recording queries.
    struct RecordingRepository {
        inner: CollectionBookRepository,
        saves: AtomicUsize,
        deletes: AtomicUsize,
        queries: Mutex<Vec<BookQuery>>,
    }

    impl RecordingRepository {
        fn new() -> Self {
            Self {
                inner: CollectionBookRepository::new(Collection::new("books")),
                saves: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }

        fn deletes(&self) -> usize {
            self.deletes.load(Ordering::SeqCst)
        }

        fn last_query(&self) -> Option<BookQuery> {
            self.queries.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl BookRepository for RecordingRepository {
        async fn save(&self, book: Book) -> Result<Book, StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(book).await
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn delete(&self, book: &Book) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(book).await
        }

        async fn find(&self, query: &BookQuery) -> Result<Vec<Book>, StoreError> {
            self.queries.lock().unwrap().push(query.clone());
            self.inner.find(query).await
        }
    }

    fn setup() -> (Arc<RecordingRepository>, BookService) {
        let repository = Arc::new(RecordingRepository::new());
        let service = BookService::new(repository.clone());
        (repository, service)
    }

    fn clean_code() -> BookView {
        BookView {
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            description: Some("A Handbook of Agile Software Craftsmanship".to_string()),
            available: true,
        }
    }

    fn view(title: &str, author: &str, available: bool) -> BookView {
        BookView {
            title: title.to_string(),
            author: author.to_string(),
            description: None,
            available,
        }
    }

    fn all() -> SearchFilter {
        SearchFilter::default()
    }

    #[tokio::test]
    async fn test_create_then_search_returns_equal_view() {
        let (repository, service) = setup();

        let id = service.create(clean_code()).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(repository.saves(), 1);

        let found = service.search(all()).await.unwrap();
        assert_eq!(found, vec![clean_code()]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_view_without_persisting() {
        let (repository, service) = setup();

        let err = service
            .create(view(" ", &"a".repeat(51), true))
            .await
            .unwrap_err();

        match err {
            BookError::Validation(message) => assert_eq!(
                message,
                "Title must not be blank; Author cannot exceed 50 characters"
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repository.saves(), 0);
    }

    #[tokio::test]
    async fn test_search_by_title_and_availability_is_case_insensitive() {
        let (_, service) = setup();
        service.create(clean_code()).await.unwrap();
        service
            .create(view("Clean Architecture", "Robert C. Martin", false))
            .await
            .unwrap();

        let found = service
            .search(SearchFilter {
                title: Some("clean".to_string()),
                author: None,
                available: Some(true),
            })
            .await
            .unwrap();

        assert_eq!(found, vec![clean_code()]);
    }

    #[tokio::test]
    async fn test_search_dispatches_resolved_query() {
        let (repository, service) = setup();

        service
            .search(SearchFilter {
                title: Some("rust".to_string()),
                author: Some("klabnik".to_string()),
                available: None,
            })
            .await
            .unwrap();
        assert_eq!(
            repository.last_query(),
            Some(BookQuery::Title {
                title: "rust".to_string()
            })
        );

        service.search(all()).await.unwrap();
        assert_eq!(repository.last_query(), Some(BookQuery::All));
    }

    #[tokio::test]
    async fn test_title_and_author_search_ignores_author() {
        let (_, service) = setup();
        service
            .create(view("The Rust Programming Language", "Steve Klabnik", true))
            .await
            .unwrap();

        let found = service
            .search(SearchFilter {
                title: Some("rust".to_string()),
                author: Some("no such author".to_string()),
                available: None,
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_available_titles_lists_only_available_books() {
        let (repository, service) = setup();
        service.create(view("On Shelf", "A", true)).await.unwrap();
        service.create(view("Checked Out", "B", false)).await.unwrap();

        let titles = service.available_titles().await.unwrap();

        assert_eq!(titles, vec!["On Shelf"]);
        assert_eq!(
            repository.last_query(),
            Some(BookQuery::Available { available: true })
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (repository, service) = setup();

        let err = service
            .update("missing-id", Some(PartialUpdate::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, BookError::NotFound(ref id) if id == "missing-id"));
        assert_eq!(err.to_string(), "Book not found with id: missing-id");
        assert_eq!(repository.saves(), 0);
    }

    #[tokio::test]
    async fn test_update_without_data_never_persists() {
        let (repository, service) = setup();
        let id = service.create(clean_code()).await.unwrap();

        let err = service.update(&id, None).await.unwrap_err();

        assert!(matches!(err, BookError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "No update data provided");
        assert_eq!(repository.saves(), 1);
    }

    #[tokio::test]
    async fn test_update_with_blank_title_never_persists() {
        let (repository, service) = setup();
        let id = service.create(clean_code()).await.unwrap();

        let updates = PartialUpdate {
            title: Some(" ".to_string()),
            available: Some(false),
            ..PartialUpdate::default()
        };
        let err = service.update(&id, Some(updates)).await.unwrap_err();

        assert_eq!(err.to_string(), "Title cannot be blank");
        assert_eq!(repository.saves(), 1);
        // `available` was applied to the working copy only
        assert_eq!(service.search(all()).await.unwrap(), vec![clean_code()]);
    }

    #[tokio::test]
    async fn test_update_only_availability_leaves_other_fields() {
        let (_, service) = setup();
        let id = service.create(clean_code()).await.unwrap();

        let updates = PartialUpdate {
            available: Some(false),
            ..PartialUpdate::default()
        };
        let message = service.update(&id, Some(updates)).await.unwrap();
        assert_eq!(message, "Book details updated");

        let expected = BookView {
            available: false,
            ..clean_code()
        };
        assert_eq!(service.search(all()).await.unwrap(), vec![expected]);
    }

    #[tokio::test]
    async fn test_update_skips_length_checks() {
        let (_, service) = setup();
        let id = service.create(clean_code()).await.unwrap();

        let long_title = "t".repeat(150);
        let updates = PartialUpdate {
            title: Some(long_title.clone()),
            author: Some("New Author".to_string()),
            description: Some("New description".to_string()),
            available: None,
        };
        service.update(&id, Some(updates)).await.unwrap();

        let found = service.search(all()).await.unwrap();
        assert_eq!(
            found,
            vec![BookView {
                title: long_title,
                author: "New Author".to_string(),
                description: Some("New description".to_string()),
                available: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_unknown_id_never_calls_delete() {
        let (repository, service) = setup();

        let err = service.delete("missing-id").await.unwrap_err();

        assert_eq!(err.to_string(), "Book not found with id: missing-id");
        assert_eq!(repository.deletes(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_book() {
        let (repository, service) = setup();
        let id = service.create(clean_code()).await.unwrap();

        let message = service.delete(&id).await.unwrap();

        assert_eq!(message, format!("Book with id {} deleted", id));
        assert_eq!(repository.deletes(), 1);
        assert!(service.search(all()).await.unwrap().is_empty());
    }
}
