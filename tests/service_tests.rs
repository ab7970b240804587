//! Service-level tests against an in-memory database

use chrono::{Duration, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use atheneum_server::error::AppError;
use atheneum_server::models::book::CreateBook;
use atheneum_server::models::reservation::ReservationStatus;
use atheneum_server::models::transaction::TransactionStatus;
use atheneum_server::models::user::Role;
use atheneum_server::repository::Repository;
use atheneum_server::services::Services;

/// Open a fresh in-memory database with the schema applied.
///
/// The pool is capped at a single connection so every query lands on the
/// same in-memory database.
async fn setup() -> (Services, Repository) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let repository = Repository::new(pool);
    (Services::new(repository.clone()), repository)
}

fn sample_book(book_id: i64, title: &str, quantity: i64) -> CreateBook {
    CreateBook {
        book_id,
        title: title.to_string(),
        author_id: 42,
        category_id: 3,
        quantity,
        publisher: "Tor Books".to_string(),
    }
}

async fn register_member(services: &Services, user_name: &str) -> i64 {
    services
        .users
        .register(user_name, "correct horse", "member")
        .await
        .expect("registration failed")
        .expect("member number missing")
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// --- Registration ---

#[tokio::test]
async fn registration_assigns_sequential_member_numbers() {
    let (services, _) = setup().await;

    assert_eq!(register_member(&services, "alice").await, 1);
    assert_eq!(register_member(&services, "bob").await, 2);
    assert_eq!(register_member(&services, "carol").await, 3);
}

#[tokio::test]
async fn admins_carry_no_member_number() {
    let (services, repository) = setup().await;

    let allocated = services
        .users
        .register("librarian", "correct horse", "admin")
        .await
        .expect("registration failed");
    assert_eq!(allocated, None);

    let admin = repository
        .users
        .get_by_name("librarian")
        .await
        .expect("query failed")
        .expect("admin missing");
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.member_number, None);

    // The admin row must not consume a number
    assert_eq!(register_member(&services, "alice").await, 1);
}

#[tokio::test]
async fn registration_rejects_unknown_roles() {
    let (services, _) = setup().await;

    let result = services
        .users
        .register("alice", "correct horse", "librarian")
        .await;

    match result {
        Err(AppError::InvalidArgument(msg)) => {
            assert_eq!(msg, "Role must be 'admin' or 'member'")
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[tokio::test]
async fn registration_accepts_mixed_case_roles() {
    let (services, _) = setup().await;

    let allocated = services
        .users
        .register("alice", "correct horse", "Member")
        .await
        .expect("registration failed");
    assert_eq!(allocated, Some(1));
}

#[tokio::test]
async fn registration_rejects_duplicate_user_names() {
    let (services, _) = setup().await;

    register_member(&services, "alice").await;
    let result = services
        .users
        .register("alice", "another pass", "member")
        .await;

    match result {
        Err(AppError::Conflict(msg)) => assert!(msg.contains("alice")),
        other => panic!("expected Conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn concurrent_registrations_allocate_distinct_member_numbers() {
    let (services, _) = setup().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let services = services.clone();
        handles.push(tokio::spawn(async move {
            services
                .users
                .register(&format!("member-{}", i), "correct horse", "member")
                .await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let allocated = handle
            .await
            .expect("task panicked")
            .expect("registration failed")
            .expect("member number missing");
        numbers.push(allocated);
    }

    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<i64>>());
}

// --- Authentication ---

#[tokio::test]
async fn login_returns_the_stored_account() {
    let (services, _) = setup().await;

    let member_number = register_member(&services, "alice").await;

    let user = services
        .users
        .authenticate("alice", "correct horse")
        .await
        .expect("authentication failed");

    assert_eq!(user.user_name, "alice");
    assert_eq!(user.role, Role::Member);
    assert_eq!(user.member_number, Some(member_number));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (services, _) = setup().await;

    register_member(&services, "alice").await;

    let wrong_password = services.users.authenticate("alice", "nope").await;
    let unknown_user = services.users.authenticate("mallory", "nope").await;

    let messages: Vec<String> = [wrong_password, unknown_user]
        .into_iter()
        .map(|result| match result {
            Err(AppError::Unauthorized(msg)) => msg,
            other => panic!("expected Unauthorized, got {:?}", other),
        })
        .collect();

    assert_eq!(messages[0], messages[1]);
    assert_eq!(messages[0], "Invalid user name or password");
}

// --- Catalogue ---

#[tokio::test]
async fn added_books_come_back_from_search() {
    let (services, _) = setup().await;

    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 3))
        .await
        .expect("add_book failed");

    let results = services
        .catalog
        .search_books("gideon")
        .await
        .expect("search failed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].book_id, 7);
    assert_eq!(results[0].title, "Gideon the Ninth");
    assert_eq!(results[0].author_id, 42);
    assert_eq!(results[0].quantity, 3);
}

#[tokio::test]
async fn search_matches_author_ids_and_orders_by_book_id() {
    let (services, _) = setup().await;

    for (id, title) in [(9, "Harrow the Ninth"), (2, "Nona the Ninth")] {
        services
            .catalog
            .add_book(sample_book(id, title, 1))
            .await
            .expect("add_book failed");
    }

    // author_id is 42 for both records
    let results = services
        .catalog
        .search_books("42")
        .await
        .expect("search failed");
    let ids: Vec<i64> = results.iter().map(|b| b.book_id).collect();
    assert_eq!(ids, vec![2, 9]);
}

#[tokio::test]
async fn empty_keyword_lists_the_whole_catalogue() {
    let (services, _) = setup().await;

    for id in [4, 1, 8] {
        services
            .catalog
            .add_book(sample_book(id, &format!("Volume {}", id), 1))
            .await
            .expect("add_book failed");
    }

    let results = services.catalog.search_books("").await.expect("search failed");
    let ids: Vec<i64> = results.iter().map(|b| b.book_id).collect();
    assert_eq!(ids, vec![1, 4, 8]);
}

#[tokio::test]
async fn unmatched_keyword_yields_an_empty_list() {
    let (services, _) = setup().await;

    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 3))
        .await
        .expect("add_book failed");

    let results = services
        .catalog
        .search_books("dune")
        .await
        .expect("search failed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn duplicate_book_ids_are_rejected() {
    let (services, _) = setup().await;

    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 3))
        .await
        .expect("add_book failed");

    let result = services
        .catalog
        .add_book(sample_book(7, "Another Title", 1))
        .await;

    match result {
        Err(AppError::Conflict(msg)) => assert!(msg.contains("7")),
        other => panic!("expected Conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_book_payloads_fail_validation() {
    use validator::Validate;

    let mut book = sample_book(7, "Gideon the Ninth", 3);
    book.quantity = -1;
    assert!(book.validate().is_err());

    let mut book = sample_book(7, "", 3);
    book.title.clear();
    assert!(book.validate().is_err());

    assert!(sample_book(7, "Gideon the Ninth", 0).validate().is_ok());
}

// --- Circulation ---

#[tokio::test]
async fn borrowing_issues_a_loan_and_decrements_stock() {
    let (services, repository) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 3))
        .await
        .expect("add_book failed");

    let (transaction_id, due_date) = services
        .circulation
        .borrow_book(member_number, 7)
        .await
        .expect("borrow failed");

    assert_eq!(due_date, today() + Duration::days(10));

    let transaction = repository
        .transactions
        .get_by_id(transaction_id)
        .await
        .expect("transaction missing");
    assert_eq!(transaction.book_id, 7);
    assert_eq!(transaction.member_number, member_number);
    assert_eq!(transaction.issue_date, today());
    assert_eq!(transaction.due_date, due_date);
    assert_eq!(transaction.status, TransactionStatus::Issued);

    let quantity = repository.books.get_quantity(7).await.expect("query failed");
    assert_eq!(quantity, Some(2));
}

#[tokio::test]
async fn borrowing_requires_a_known_member() {
    let (services, repository) = setup().await;

    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 3))
        .await
        .expect("add_book failed");

    let result = services.circulation.borrow_book(99, 7).await;
    match result {
        Err(AppError::NotFound(msg)) => assert!(msg.contains("Member")),
        other => panic!("expected NotFound, got {:?}", other),
    }

    // The shelf count must be untouched
    let quantity = repository.books.get_quantity(7).await.expect("query failed");
    assert_eq!(quantity, Some(3));
}

#[tokio::test]
async fn borrowing_requires_a_known_book() {
    let (services, _) = setup().await;

    let member_number = register_member(&services, "alice").await;

    let result = services.circulation.borrow_book(member_number, 99).await;
    match result {
        Err(AppError::NotFound(msg)) => assert!(msg.contains("Book")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn exhausted_books_cannot_be_borrowed() {
    let (services, repository) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 0))
        .await
        .expect("add_book failed");

    let result = services.circulation.borrow_book(member_number, 7).await;
    match result {
        Err(AppError::Unavailable(_)) => {}
        other => panic!("expected Unavailable, got {:?}", other),
    }

    let quantity = repository.books.get_quantity(7).await.expect("query failed");
    assert_eq!(quantity, Some(0));
}

#[tokio::test]
async fn concurrent_borrows_never_oversell_the_last_copy() {
    let (services, repository) = setup().await;

    let member_a = register_member(&services, "alice").await;
    let member_b = register_member(&services, "bob").await;
    services
        .catalog
        .add_book(sample_book(5, "Last Copy", 1))
        .await
        .expect("add_book failed");

    let first = tokio::spawn({
        let services = services.clone();
        async move { services.circulation.borrow_book(member_a, 5).await }
    });
    let second = tokio::spawn({
        let services = services.clone();
        async move { services.circulation.borrow_book(member_b, 5).await }
    });

    let outcomes = [
        first.await.expect("task panicked"),
        second.await.expect("task panicked"),
    ];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1);

    let quantity = repository.books.get_quantity(5).await.expect("query failed");
    assert_eq!(quantity, Some(0));
}

#[tokio::test]
async fn renewal_pushes_the_due_date_forward() {
    let (services, repository) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 1))
        .await
        .expect("add_book failed");

    let (transaction_id, _) = services
        .circulation
        .borrow_book(member_number, 7)
        .await
        .expect("borrow failed");

    // Age the loan so the renewal is observable
    sqlx::query("UPDATE transactions SET due_date = ?1 WHERE transaction_id = ?2")
        .bind(today() + Duration::days(2))
        .bind(transaction_id)
        .execute(&repository.pool)
        .await
        .expect("update failed");

    let new_due_date = services
        .circulation
        .renew_book(member_number, transaction_id)
        .await
        .expect("renew failed");
    assert_eq!(new_due_date, today() + Duration::days(10));

    let transaction = repository
        .transactions
        .get_by_id(transaction_id)
        .await
        .expect("transaction missing");
    assert_eq!(transaction.due_date, new_due_date);
    assert_eq!(transaction.status, TransactionStatus::Issued);
}

#[tokio::test]
async fn renewal_is_limited_to_the_owning_member() {
    let (services, repository) = setup().await;

    let member_a = register_member(&services, "alice").await;
    let member_b = register_member(&services, "bob").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 1))
        .await
        .expect("add_book failed");

    let (transaction_id, due_date) = services
        .circulation
        .borrow_book(member_a, 7)
        .await
        .expect("borrow failed");

    let result = services.circulation.renew_book(member_b, transaction_id).await;
    match result {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }

    let transaction = repository
        .transactions
        .get_by_id(transaction_id)
        .await
        .expect("transaction missing");
    assert_eq!(transaction.due_date, due_date);
}

#[tokio::test]
async fn returned_loans_cannot_be_renewed() {
    let (services, repository) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 1))
        .await
        .expect("add_book failed");

    let (transaction_id, _) = services
        .circulation
        .borrow_book(member_number, 7)
        .await
        .expect("borrow failed");

    sqlx::query("UPDATE transactions SET status = 'Returned' WHERE transaction_id = ?1")
        .bind(transaction_id)
        .execute(&repository.pool)
        .await
        .expect("update failed");

    let result = services
        .circulation
        .renew_book(member_number, transaction_id)
        .await;
    match result {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_transactions_cannot_be_renewed() {
    let (services, _) = setup().await;

    let member_number = register_member(&services, "alice").await;

    let result = services.circulation.renew_book(member_number, 99).await;
    match result {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

// --- Reservations ---

#[tokio::test]
async fn exhausted_books_can_be_reserved() {
    let (services, _) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 0))
        .await
        .expect("add_book failed");

    let reservation_id = services
        .reservations
        .reserve_book(member_number, 7)
        .await
        .expect("reserve failed");

    let reservations = services
        .reservations
        .list_for_member(member_number)
        .await
        .expect("list failed");
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].reservation_id, reservation_id);
    assert_eq!(reservations[0].book_id, 7);
    assert_eq!(reservations[0].member_number, member_number);
    assert_eq!(reservations[0].reservation_date, today());
    assert_eq!(reservations[0].status, ReservationStatus::Pending);
}

#[tokio::test]
async fn available_books_cannot_be_reserved() {
    let (services, _) = setup().await;

    let member_number = register_member(&services, "alice").await;
    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 1))
        .await
        .expect("add_book failed");

    let result = services.reservations.reserve_book(member_number, 7).await;
    match result {
        Err(AppError::InvalidArgument(msg)) => {
            assert_eq!(msg, "Book is available, no need to reserve")
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[tokio::test]
async fn reservations_require_a_known_member_and_book() {
    let (services, _) = setup().await;

    services
        .catalog
        .add_book(sample_book(7, "Gideon the Ninth", 0))
        .await
        .expect("add_book failed");

    let unknown_member = services.reservations.reserve_book(99, 7).await;
    match unknown_member {
        Err(AppError::NotFound(msg)) => assert!(msg.contains("Member")),
        other => panic!("expected NotFound, got {:?}", other),
    }

    let member_number = register_member(&services, "alice").await;
    let unknown_book = services.reservations.reserve_book(member_number, 99).await;
    match unknown_book {
        Err(AppError::NotFound(msg)) => assert!(msg.contains("Book")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn reservation_listing_is_scoped_to_the_member() {
    let (services, _) = setup().await;

    let member_a = register_member(&services, "alice").await;
    let member_b = register_member(&services, "bob").await;
    for id in [5, 6, 7] {
        services
            .catalog
            .add_book(sample_book(id, &format!("Volume {}", id), 0))
            .await
            .expect("add_book failed");
    }

    services
        .reservations
        .reserve_book(member_a, 5)
        .await
        .expect("reserve failed");
    services
        .reservations
        .reserve_book(member_b, 6)
        .await
        .expect("reserve failed");
    services
        .reservations
        .reserve_book(member_a, 7)
        .await
        .expect("reserve failed");

    let mine = services
        .reservations
        .list_for_member(member_a)
        .await
        .expect("list failed");
    let books: Vec<i64> = mine.iter().map(|r| r.book_id).collect();
    assert_eq!(books, vec![5, 7]);

    // Unknown members simply have no reservations
    let nobody = services
        .reservations
        .list_for_member(99)
        .await
        .expect("list failed");
    assert!(nobody.is_empty());
}
