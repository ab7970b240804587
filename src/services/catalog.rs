//! Catalogue management service

use crate::{
    error::AppResult,
    models::book::{Book, BookSummary, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Keyword search over titles and author identifiers
    pub async fn search_books(&self, keyword: &str) -> AppResult<Vec<BookSummary>> {
        self.repository.books.search(keyword).await
    }

    /// Add a book to the catalogue
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        let created = self.repository.books.create(&book).await?;

        tracing::info!(
            "Catalogue add: book id={} title={:?} quantity={}",
            created.book_id,
            created.title,
            created.quantity
        );

        Ok(created)
    }

    /// Get a single book by its catalogue number
    pub async fn get_book(&self, book_id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(book_id).await
    }
}
