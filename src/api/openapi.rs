//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, circulation, health, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atheneum API",
        version = "1.0.0",
        description = "Library record service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        // Books
        books::search_books,
        books::add_book,
        // Circulation
        circulation::borrow_book,
        circulation::renew_book,
        // Reservations
        reservations::reserve_book,
        reservations::list_reservations,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::RegisterResponse,
            crate::models::user::Role,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            // Circulation
            circulation::BorrowRequest,
            circulation::BorrowResponse,
            circulation::RenewRequest,
            circulation::RenewResponse,
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionStatus,
            // Reservations
            reservations::ReserveRequest,
            reservations::ReserveResponse,
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and registration"),
        (name = "books", description = "Catalogue search and maintenance"),
        (name = "circulation", description = "Borrowing and renewals"),
        (name = "reservations", description = "Reservation queue")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
