use super::*;
use serde_json::json;
use std::sync::Arc;

fn relay_parts() -> (Arc<dyn KeyStore>, Arc<MockLedger>) {
    (Arc::new(MemKeyStore::new()), Arc::new(MockLedger::new()))
}

#[tokio::test]
async fn end_to_end_relay() {
    let (store, ledger) = relay_parts();
    let keys = KeyRelay::new(store.clone(), ledger.clone(), RelayPolicy::default());
    let votes = VoteRelay::new(ledger.clone(), DEFAULT_GAS);
    let views = ViewGateway::new(ledger.clone());

    ledger.set_voting_options(Ok(json!([["Alice", 0], ["Bob", 0]])));
    let options = views.voting_options().await.unwrap();
    assert_eq!(options.len(), 2);

    // Two voters register, nothing reaches the ledger yet
    assert!(keys.enqueue_and_maybe_flush("k1").await.unwrap().flush.is_none());
    assert!(keys.enqueue_and_maybe_flush("k2").await.unwrap().flush.is_none());
    assert!(ledger.registered_keys().is_empty());

    // The third registration releases all three, in shuffled order
    let admission = keys.enqueue_and_maybe_flush("k3").await.unwrap();
    assert_eq!(admission.flush.unwrap().registered.len(), 3);
    assert_eq!(store.len().await.unwrap(), 0);

    let mut registered = ledger.registered_keys();
    registered.sort();
    assert_eq!(registered, vec!["k1", "k2", "k3"]);

    // A registered voter casts a vote
    ledger.set_vote_outcome(Ok(SubmissionOutcome::with_logs(vec!["Vote cast for Bob"])));
    let result = votes.cast_vote("k2", &json!("Bob")).await.unwrap();
    assert_eq!(result.log, "Vote cast for Bob");
}

#[tokio::test]
async fn flushed_ids_leave_the_store_whatever_the_outcome() {
    let (store, ledger) = relay_parts();
    ledger.fail_key("k1");
    ledger.fail_key("k3");
    let keys = KeyRelay::new(store.clone(), ledger.clone(), RelayPolicy::default());

    for key in &["k1", "k2", "k3", "k4"] {
        store.try_register(key).await.unwrap();
    }
    let queued: Vec<KeyId> = store
        .take_batch(10)
        .await
        .unwrap()
        .iter()
        .map(|pending| pending.id)
        .collect();

    let report = keys.force_flush().await.unwrap();
    assert_eq!(report.registered.len(), 2);
    assert_eq!(report.failed.len(), 2);

    let mut flushed: Vec<KeyId> = report
        .registered
        .iter()
        .copied()
        .chain(report.failed.iter().map(|(id, _)| *id))
        .collect();
    flushed.sort_unstable();
    assert_eq!(flushed, queued);

    let remaining = store.take_batch(10).await.unwrap();
    assert!(remaining.iter().all(|pending| !queued.contains(&pending.id)));
}

#[tokio::test]
async fn sqlite_backed_relay() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store: Arc<dyn KeyStore> =
        Arc::new(SqliteKeyStore::from_pool(pool, "pending_keys").await.unwrap());
    let ledger = Arc::new(MockLedger::new());
    let keys = KeyRelay::new(store.clone(), ledger.clone(), RelayPolicy::default());

    assert!(keys.enqueue_and_maybe_flush("k1").await.unwrap().accepted);
    assert!(!keys.enqueue_and_maybe_flush("k1").await.unwrap().accepted);
    assert!(keys.enqueue_and_maybe_flush("k2").await.unwrap().flush.is_none());

    let admission = keys.enqueue_and_maybe_flush("k3").await.unwrap();
    assert_eq!(admission.flush.unwrap().attempted(), 3);
    assert_eq!(store.len().await.unwrap(), 0);
}
