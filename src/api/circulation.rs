//! Circulation endpoints for borrowing and renewing books

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Catalogue number of the book to borrow
    pub book_id: i64,
}

/// Borrow response with the recorded loan
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Transaction id of the new loan
    pub transaction_id: i64,
    /// Date the loan falls due
    pub due_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Renew request
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    /// Transaction to renew
    pub transaction_id: i64,
}

/// Renew response with the pushed-back due date
#[derive(Serialize, ToSchema)]
pub struct RenewResponse {
    /// New date the loan falls due
    pub new_due_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow/{member_number}",
    tag = "circulation",
    params(
        ("member_number" = i64, Path, description = "Borrowing member")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book issued", body = BorrowResponse),
        (status = 404, description = "Member or book not found"),
        (status = 422, description = "No copies available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Path(member_number): Path<i64>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let (transaction_id, due_date) = state
        .services
        .circulation
        .borrow_book(member_number, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            transaction_id,
            due_date,
            message: "Book borrowed successfully".to_string(),
        }),
    ))
}

/// Renew a borrowed book
#[utoipa::path(
    post,
    path = "/renew/{member_number}",
    tag = "circulation",
    params(
        ("member_number" = i64, Path, description = "Member holding the loan")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewResponse),
        (status = 404, description = "No matching active loan")
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    Path(member_number): Path<i64>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<RenewResponse>> {
    let new_due_date = state
        .services
        .circulation
        .renew_book(member_number, request.transaction_id)
        .await?;

    Ok(Json(RenewResponse {
        new_due_date,
        message: "Book renewed successfully".to_string(),
    }))
}
