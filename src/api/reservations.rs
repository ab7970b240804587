//! Reservation endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::reservation::Reservation};

/// Reserve request
#[derive(Deserialize, ToSchema)]
pub struct ReserveRequest {
    /// Catalogue number of the book to reserve
    pub book_id: i64,
}

/// Reserve response
#[derive(Serialize, ToSchema)]
pub struct ReserveResponse {
    /// Id of the queued reservation
    pub reservation_id: i64,
    /// Status message
    pub message: String,
}

/// Reserve an out-of-stock book
#[utoipa::path(
    post,
    path = "/reserve/{member_number}",
    tag = "reservations",
    params(
        ("member_number" = i64, Path, description = "Reserving member")
    ),
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Reservation queued", body = ReserveResponse),
        (status = 400, description = "Book has copies available"),
        (status = 404, description = "Member or book not found")
    )
)]
pub async fn reserve_book(
    State(state): State<crate::AppState>,
    Path(member_number): Path<i64>,
    Json(request): Json<ReserveRequest>,
) -> AppResult<(StatusCode, Json<ReserveResponse>)> {
    let reservation_id = state
        .services
        .reservations
        .reserve_book(member_number, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse {
            reservation_id,
            message: "Book reserved successfully".to_string(),
        }),
    ))
}

/// List a member's reservations
#[utoipa::path(
    get,
    path = "/reservations/{member_number}",
    tag = "reservations",
    params(
        ("member_number" = i64, Path, description = "Member to list reservations for")
    ),
    responses(
        (status = 200, description = "Reservations placed by the member", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Path(member_number): Path<i64>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .services
        .reservations
        .list_for_member(member_number)
        .await?;

    Ok(Json(reservations))
}
