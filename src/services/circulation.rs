//! Circulation service for issuing and renewing loans

use chrono::{Duration, NaiveDate, Utc};

use crate::{error::AppResult, repository::Repository};

/// Days a freshly issued or renewed loan runs before it falls due
pub const LOAN_PERIOD_DAYS: i64 = 10;

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Issue a book to a member. Returns the transaction id and the due date.
    pub async fn borrow_book(
        &self,
        member_number: i64,
        book_id: i64,
    ) -> AppResult<(i64, NaiveDate)> {
        let issue_date = Utc::now().date_naive();
        let due_date = issue_date + Duration::days(LOAN_PERIOD_DAYS);

        let transaction_id = self
            .repository
            .transactions
            .issue(member_number, book_id, issue_date, due_date)
            .await?;

        tracing::info!(
            "Issued book {} to member {} (transaction {}, due {})",
            book_id,
            member_number,
            transaction_id,
            due_date
        );

        Ok((transaction_id, due_date))
    }

    /// Extend an open loan by a fresh loan period counted from today.
    /// Returns the new due date.
    pub async fn renew_book(
        &self,
        member_number: i64,
        transaction_id: i64,
    ) -> AppResult<NaiveDate> {
        let new_due_date = Utc::now().date_naive() + Duration::days(LOAN_PERIOD_DAYS);

        self.repository
            .transactions
            .renew(member_number, transaction_id, new_due_date)
            .await?;

        Ok(new_due_date)
    }
}
