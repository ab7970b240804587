//! Catalogue endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookSummary, CreateBook},
};

/// Book search parameters
#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Keyword matched against title and author id; empty matches everything
    #[serde(default)]
    pub keyword: String,
}

/// Search the catalogue by keyword
#[utoipa::path(
    get,
    path = "/search_books",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookSummary>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.catalog.search_books(&query.keyword).await?;
    Ok(Json(books))
}

/// Add a book to the catalogue
#[utoipa::path(
    post,
    path = "/add_book",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Book id already in use")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    book.validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

    let created = state.services.catalog.add_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
