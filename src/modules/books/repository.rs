use async_trait::async_trait;
use bookshelf_db::{Collection, StoreError};

use super::models::Book;
use super::query::BookQuery;

/// Persistence surface the book service depends on.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persist a book, assigning an id when it has none.
    async fn save(&self, book: Book) -> Result<Book, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    async fn delete(&self, book: &Book) -> Result<(), StoreError>;

    /// Run one resolved search query, in store order.
    async fn find(&self, query: &BookQuery) -> Result<Vec<Book>, StoreError>;
}

/// [`BookRepository`] backed by a document collection.
#[derive(Clone)]
pub struct CollectionBookRepository {
    books: Collection<Book>,
}

impl CollectionBookRepository {
    pub fn new(books: Collection<Book>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl BookRepository for CollectionBookRepository {
    async fn save(&self, book: Book) -> Result<Book, StoreError> {
        self.books.save(book).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        self.books.find_by_id(id).await
    }

    async fn delete(&self, book: &Book) -> Result<(), StoreError> {
        self.books.delete(book).await.map(|_| ())
    }

    async fn find(&self, query: &BookQuery) -> Result<Vec<Book>, StoreError> {
        match query {
            BookQuery::All => self.books.find_all().await,
            query => self.books.find_where(|book| query.matches(book)).await,
        }
    }
}
