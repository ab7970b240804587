//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full book record from the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub author_id: i64,
    pub category_id: i64,
    /// Copies currently on the shelf (never negative)
    pub quantity: i64,
    pub publisher: String,
}

/// Short book representation for search results
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub book_id: i64,
    pub title: String,
    pub author_id: i64,
    pub quantity: i64,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// Caller-assigned identifier (catalogue number)
    #[validate(range(min = 1, message = "Book id must be a positive integer"))]
    pub book_id: i64,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub author_id: i64,
    pub category_id: i64,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "Publisher must not be empty"))]
    pub publisher: String,
}
