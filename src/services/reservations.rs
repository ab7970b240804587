//! Reservation queue service

use chrono::Utc;

use crate::{error::AppResult, models::reservation::Reservation, repository::Repository};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Queue a reservation for an out-of-stock book. Returns the reservation id.
    pub async fn reserve_book(&self, member_number: i64, book_id: i64) -> AppResult<i64> {
        let reservation_date = Utc::now().date_naive();

        let reservation_id = self
            .repository
            .reservations
            .reserve(member_number, book_id, reservation_date)
            .await?;

        tracing::info!(
            "Reserved book {} for member {} (reservation {})",
            book_id,
            member_number,
            reservation_id
        );

        Ok(reservation_id)
    }

    /// All reservations placed by a member
    pub async fn list_for_member(&self, member_number: i64) -> AppResult<Vec<Reservation>> {
        self.repository
            .reservations
            .list_for_member(member_number)
            .await
    }
}
