//! Book (library catalog) model

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// ISBN-10 or ISBN-13, hyphens optional
static ISBN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:97[89][- ]?)?\d{1,5}[- ]?\d{1,7}[- ]?\d{1,7}[- ]?[\dX]$").unwrap()
});

pub fn is_valid_isbn(isbn: &str) -> bool {
    let digits = isbn.chars().filter(|c| c.is_ascii_digit() || *c == 'X').count();
    (digits == 10 || digits == 13) && ISBN_RE.is_match(isbn)
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Search in title and author
    pub search: Option<String>,
    pub category: Option<String>,
    pub isbn: Option<String>,
    /// Only books with available copies
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    #[validate(range(min = 1, message = "At least one copy is required"))]
    pub total_copies: i32,
    pub shelf_location: Option<String>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub published_year: Option<i16>,
    #[validate(range(min = 1, message = "At least one copy is required"))]
    pub total_copies: Option<i32>,
    pub shelf_location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn_shapes() {
        assert!(is_valid_isbn("978-0-306-40615-7"));
        assert!(is_valid_isbn("9780306406157"));
        assert!(is_valid_isbn("0-306-40615-2"));
        assert!(is_valid_isbn("030640615X"));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("not-an-isbn"));
        assert!(!is_valid_isbn("97803064061579"));
    }
}
