//! End-to-end tests for the session service
//!
//! These drive the full path the product takes: draft a session, seat
//! players, save incrementally, end the session, and watch profiles settle
//! exactly once against stores that sometimes fail.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;

use app_session::{AppError, SessionService};
use core_kernel::Money;
use domain_session::SessionStatus;
use infra_store::MemoryStore;
use test_utils::{FlakyProfileStore, FlakySessionStore, MoneyFixtures, SessionBuilder};

fn money(value: rust_decimal::Decimal) -> Money {
    Money::new(value)
}

fn service_over(store: Arc<MemoryStore>) -> SessionService {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    SessionService::new(store.clone(), store)
}

#[tokio::test]
async fn draft_is_invisible_until_first_save() {
    let store = Arc::new(MemoryStore::new());
    let mut service = service_over(store.clone());
    let now = Utc::now();

    service.create_draft(Some("Thursday game"), "sam", now);
    service
        .add_player("Alice", MoneyFixtures::standard_buy_in(), now)
        .unwrap();

    // Nothing hits either store before the explicit save.
    assert_eq!(store.session_count(), 0);
    assert_eq!(store.profile_count(), 0);
    assert!(service.current().unwrap().is_draft());

    service.save(now).await.unwrap();

    assert_eq!(store.session_count(), 1);
    assert_eq!(store.profile_count(), 1);
    assert!(service.current().unwrap().is_active());

    let recent = service.recent_sessions(7).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].status(), SessionStatus::Active);
}

#[tokio::test]
async fn full_lifecycle_settles_profiles_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let mut service = service_over(store.clone());
    let start = Utc::now();

    service.create_draft(Some("Friday game"), "sam", start);
    service.add_player("Alice", money(dec!(100)), start).unwrap();
    service.add_player("Bob", money(dec!(50)), start).unwrap();
    service.add_player("Carol", money(dec!(50)), start).unwrap();
    service.save(start).await.unwrap();

    // Mid-session: Alice cashes out 20, incremental sync runs again.
    let mid = start + Duration::hours(2);
    service.add_cash_out("Alice", money(dec!(20)), mid).unwrap();
    service.save(mid).await.unwrap();

    // Incremental sync never touches lifetime totals.
    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), Money::ZERO);
    assert_eq!(alice.sessions_played(), 0);

    // Settlement: Alice declares 70 (superseding her cash-out), Bob 30,
    // Carol 100. Buy-ins 200 equal declared stacks 70 + 30 + 100.
    let end = start + Duration::hours(4);
    service.set_final_stack("Alice", money(dec!(70)), end).unwrap();
    service.set_final_stack("Bob", money(dec!(30)), end).unwrap();
    service.set_final_stack("Carol", money(dec!(100)), end).unwrap();
    assert!(service.is_balanced().unwrap());

    let session_id = service.current().unwrap().id();
    service.end_session(end).await.unwrap();
    assert!(service.current().is_none());

    // The stored session is completed and frozen.
    let stored = service.recent_sessions(7).await.unwrap();
    assert_eq!(stored[0].status(), SessionStatus::Completed);
    assert_eq!(stored[0].id(), session_id);

    // Alice: invested 100, left with 70 (cash-out superseded) -> -30.
    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), money(dec!(100)));
    assert_eq!(alice.lifetime_cash_out(), money(dec!(70)));
    assert_eq!(alice.lifetime_profit(), money(dec!(-30)));
    assert_eq!(alice.sessions_played(), 1);
    assert!(alice.is_finalized(session_id));
    assert_eq!(alice.recent_sessions().len(), 1);
    assert_eq!(alice.recent_sessions()[0].profit(), money(dec!(-30)));

    let bob = service.player_profile("Bob").await.unwrap().unwrap();
    assert_eq!(bob.lifetime_profit(), money(dec!(-20)));

    let carol = service.player_profile("Carol").await.unwrap().unwrap();
    assert_eq!(carol.lifetime_profit(), money(dec!(50)));
}

#[tokio::test]
async fn end_session_retry_applies_each_profile_exactly_once() {
    let memory = Arc::new(MemoryStore::new());
    let profiles = Arc::new(FlakyProfileStore::new(memory.clone()));
    let mut service = SessionService::new(memory.clone(), profiles.clone());
    let now = Utc::now();

    service.create_draft(Some("Flaky night"), "sam", now);
    service.add_player("Alice", money(dec!(100)), now).unwrap();
    service.add_player("Bob", money(dec!(100)), now).unwrap();
    service.save(now).await.unwrap();
    service.set_final_stack("Alice", money(dec!(150)), now).unwrap();
    service.set_final_stack("Bob", money(dec!(50)), now).unwrap();

    // Let Alice's finalization write land, then fail Bob's.
    profiles.fail_saves(1, 1);
    let error = service.end_session(now).await.unwrap_err();
    assert!(error.is_retryable());

    // The session is still loaded and retryable; Alice is settled, Bob not.
    assert!(service.current().is_some());
    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), money(dec!(100)));
    let bob = service.player_profile("Bob").await.unwrap().unwrap();
    assert_eq!(bob.lifetime_buy_in(), Money::ZERO);
    assert_eq!(bob.sessions_played(), 0);

    // Retry: Alice is caught by the replay guard, Bob settles now.
    service.end_session(now).await.unwrap();
    assert!(service.current().is_none());

    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), money(dec!(100)));
    assert_eq!(alice.sessions_played(), 1);
    assert_eq!(alice.recent_sessions().len(), 1);

    let bob = service.player_profile("Bob").await.unwrap().unwrap();
    assert_eq!(bob.lifetime_buy_in(), money(dec!(100)));
    assert_eq!(bob.lifetime_cash_out(), money(dec!(50)));
    assert_eq!(bob.sessions_played(), 1);
}

#[tokio::test]
async fn failed_session_save_leaves_memory_authoritative() {
    let memory = Arc::new(MemoryStore::new());
    let sessions = Arc::new(FlakySessionStore::new(memory.clone()));
    let mut service = SessionService::new(sessions.clone(), memory.clone());
    let now = Utc::now();

    service.create_draft(None, "sam", now);
    service.add_player("Alice", money(dec!(100)), now).unwrap();

    sessions.fail_saves(0, 1);
    let error = service.save(now).await.unwrap_err();
    assert!(error.is_retryable());
    assert_eq!(memory.session_count(), 0);

    // In-memory state survived the failure untouched.
    assert_eq!(service.total_buy_in().unwrap(), money(dec!(100)));

    service.save(now).await.unwrap();
    assert_eq!(memory.session_count(), 1);
}

#[tokio::test]
async fn delete_session_reverses_lifetime_totals() {
    let store = Arc::new(MemoryStore::new());
    let mut service = service_over(store.clone());

    // Two completed sessions for Alice.
    let first_start = Utc::now() - Duration::days(7);
    service.create_draft(Some("Last week"), "sam", first_start);
    service.add_player("Alice", money(dec!(100)), first_start).unwrap();
    service.save(first_start).await.unwrap();
    service
        .set_final_stack("Alice", money(dec!(250)), first_start)
        .unwrap();
    service.end_session(first_start + Duration::hours(3)).await.unwrap();

    let second_start = Utc::now() - Duration::days(1);
    service.create_draft(Some("Yesterday"), "sam", second_start);
    service.add_player("Alice", money(dec!(80)), second_start).unwrap();
    service.save(second_start).await.unwrap();
    service
        .set_final_stack("Alice", money(dec!(0)), second_start)
        .unwrap();
    service.end_session(second_start + Duration::hours(3)).await.unwrap();

    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), money(dec!(180)));
    assert_eq!(alice.lifetime_cash_out(), money(dec!(250)));

    // Deleting the losing session recomputes lifetime totals from what
    // remains.
    let completed = service.completed_sessions(30).await.unwrap();
    let losing = completed.iter().find(|s| s.name() == "Yesterday").unwrap();
    service.delete_session(losing.id()).await.unwrap();

    let alice = service.player_profile("Alice").await.unwrap().unwrap();
    assert_eq!(alice.lifetime_buy_in(), money(dec!(100)));
    assert_eq!(alice.lifetime_cash_out(), money(dec!(250)));
    assert_eq!(alice.sessions_played(), 1);
    assert_eq!(service.recent_sessions(30).await.unwrap().len(), 1);
}

#[tokio::test]
async fn load_restores_a_session_for_further_play() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let session = SessionBuilder::new()
        .with_name("Resumable")
        .with_started_at(now)
        .with_player("Alice", money(dec!(100)))
        .with_player("Bob", money(dec!(60)))
        .build();
    let id = session.id();
    {
        use domain_session::SessionStore;
        store.save(&session).await.unwrap();
    }

    let mut service = service_over(store);
    assert!(service.load(id).await.unwrap());

    let current = service.current().unwrap();
    assert_eq!(current.total_buy_in(), money(dec!(160)));
    assert!(current.validate_integrity());

    // Play continues on the restored ledger.
    service.add_cash_out("Bob", money(dec!(10)), now).unwrap();
    assert_eq!(service.total_cash_out().unwrap(), money(dec!(10)));

    assert!(!service.load(core_kernel::SessionId::new()).await.unwrap());
}

#[tokio::test]
async fn mutations_require_a_loaded_session() {
    let store = Arc::new(MemoryStore::new());
    let mut service = service_over(store);
    let now = Utc::now();

    let result = service.add_player("Alice", money(dec!(50)), now);
    assert!(matches!(result, Err(AppError::NoCurrentSession)));
    assert!(matches!(service.save(now).await, Err(AppError::NoCurrentSession)));
    assert!(matches!(
        service.end_session(now).await,
        Err(AppError::NoCurrentSession)
    ));
}

#[tokio::test]
async fn active_and_completed_session_lists_are_disjoint() {
    let store = Arc::new(MemoryStore::new());
    let mut service = service_over(store.clone());
    let now = Utc::now();

    service.create_draft(Some("Running"), "sam", now);
    service.add_player("Alice", money(dec!(50)), now).unwrap();
    service.save(now).await.unwrap();

    service.create_draft(Some("Done"), "sam", now);
    service.add_player("Bob", money(dec!(50)), now).unwrap();
    service.set_final_stack("Bob", money(dec!(50)), now).unwrap();
    service.end_session(now).await.unwrap();

    let active = service.active_sessions(7).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name(), "Running");

    let completed = service.completed_sessions(7).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].name(), "Done");
}
