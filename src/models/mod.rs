//! Data models for Atheneum

pub mod book;
pub mod reservation;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookSummary, CreateBook};
pub use reservation::{Reservation, ReservationStatus};
pub use transaction::{Transaction, TransactionStatus};
pub use user::{Role, User};
