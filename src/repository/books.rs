//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

use super::{normalize_search, page_bounds};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let (_, limit, offset) = page_bounds(query.page, query.limit);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", normalize_search(search)));
            let n = params.len();
            conditions.push(format!("(LOWER(title) LIKE ${n} OR LOWER(author) LIKE ${n})"));
        }
        if let Some(ref category) = query.category {
            params.push(category.clone());
            conditions.push(format!("category = ${}", params.len()));
        }
        if let Some(ref isbn) = query.isbn {
            params.push(isbn.clone());
            conditions.push(format!("isbn = ${}", params.len()));
        }
        if query.available == Some(true) {
            conditions.push("available_copies > 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM books {} ORDER BY title LIMIT ${} OFFSET ${}",
            where_clause,
            params.len() + 1,
            params.len() + 2
        );
        let mut list_query = sqlx::query_as::<_, Book>(&list_sql);
        for p in &params {
            list_query = list_query.bind(p);
        }
        let books = list_query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a book. New books start with all copies available.
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (isbn, title, author, category, publisher, published_year,
                               total_copies, available_copies, shelf_location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.isbn)
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.category)
        .bind(&data.publisher)
        .bind(data.published_year)
        .bind(data.total_copies)
        .bind(&data.shelf_location)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Update a book. Changing total_copies adjusts available_copies by the
    /// same delta; shrinking below the number of copies currently out fails.
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let (total, available) = match data.total_copies {
            Some(new_total) => {
                let out = current.total_copies - current.available_copies;
                if new_total < out {
                    return Err(AppError::Conflict(format!(
                        "{} copies are out on loan or held; total_copies cannot go below that",
                        out
                    )));
                }
                (new_total, new_total - out)
            }
            None => (current.total_copies, current.available_copies),
        };

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, category = $3, publisher = $4,
                published_year = $5, total_copies = $6, available_copies = $7,
                shelf_location = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(data.title.as_ref().unwrap_or(&current.title))
        .bind(data.author.as_ref().unwrap_or(&current.author))
        .bind(data.category.as_ref().or(current.category.as_ref()))
        .bind(data.publisher.as_ref().or(current.publisher.as_ref()))
        .bind(data.published_year.or(current.published_year))
        .bind(total)
        .bind(available)
        .bind(data.shelf_location.as_ref().or(current.shelf_location.as_ref()))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Count of active loans for a book
    pub async fn active_loan_count(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE book_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Delete a book (refused upstream while loans are active)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
