//! PostgreSQL store tests.
//!
//! These need a live server (`DATABASE_URL`) and are ignored by default:
//! `cargo test -p carline-db -- --ignored`.

use assert_matches::assert_matches;
use carline_core::car_number::CarNumber;
use carline_core::queue::{NewQueueEntry, QueueStatus};
use carline_core::store::{Collection, CompletionOutcome, DismissalStore, QueueStore, RosterStore};
use carline_core::student::CreateStudent;
use carline_db::PgStore;
use sqlx::PgPool;

fn car(n: i64) -> CarNumber {
    CarNumber::new(n).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn students_round_trip_in_directory_order(pool: PgPool) {
    let store = PgStore::connect(pool).await.unwrap();
    for (first, last) in [("Ben", "Diaz"), ("Ana", "Diaz"), ("Zoe", "Adams")] {
        let input = CreateStudent::new(first, last, 7).validate_into().unwrap();
        store.insert_student(&input).await.unwrap();
    }

    let names: Vec<String> = store
        .students_by_car(car(7))
        .await
        .unwrap()
        .iter()
        .map(|s| s.display_name())
        .collect();
    assert_eq!(names, vec!["Zoe Adams", "Ana Diaz", "Ben Diaz"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn completion_is_conditional(pool: PgPool) {
    let store = PgStore::connect(pool).await.unwrap();
    let input = NewQueueEntry::new(car(5), vec![1], vec!["Ana Diaz".into()]).unwrap();
    let entry = store.insert_entry(&input).await.unwrap();
    assert_eq!(entry.status, QueueStatus::Waiting);
    assert_eq!(entry.student_names, vec!["Ana Diaz"]);

    let first = store.complete_entry(entry.id).await.unwrap();
    let completed_at = match first {
        CompletionOutcome::Completed(e) => e.completed_at.unwrap(),
        other => panic!("expected completion, got {other:?}"),
    };
    assert_matches!(
        store.complete_entry(entry.id).await.unwrap(),
        CompletionOutcome::AlreadyCompleted(e) if e.completed_at == Some(completed_at)
    );
    assert_eq!(
        store.complete_entry(entry.id + 1000).await.unwrap(),
        CompletionOutcome::NotFound
    );
    assert!(store.waiting_entries().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn writes_arrive_on_change_feed(pool: PgPool) {
    let store = PgStore::connect(pool).await.unwrap();
    let mut changes = store.subscribe_changes();

    let input = NewQueueEntry::new(car(9), Vec::new(), Vec::new()).unwrap();
    store.insert_entry(&input).await.unwrap();

    let change = tokio::time::timeout(std::time::Duration::from_secs(5), changes.recv())
        .await
        .expect("notification should arrive")
        .unwrap();
    assert_eq!(change.collection, Collection::QueueEntries);
}
