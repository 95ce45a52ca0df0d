//! Book catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{is_valid_isbn, Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search the catalog with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !is_valid_isbn(&data.isbn) {
            return Err(AppError::Validation("Invalid ISBN".to_string()));
        }
        if self.repository.books.isbn_exists(&data.isbn).await? {
            return Err(AppError::Conflict("ISBN already exists".to_string()));
        }

        let book = self.repository.books.create(&data).await?;
        tracing::info!(book_id = book.id, isbn = %book.isbn, "Book added to catalog");
        Ok(book)
    }

    /// Update a book (copy counts adjust inside the repository transaction)
    pub async fn update(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.update(id, &data).await
    }

    /// Remove a book. Refused while copies are out on loan.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        let active = self.repository.books.active_loan_count(id).await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "{} copies are out on loan",
                active
            )));
        }

        self.repository.books.delete(id).await
    }
}
