//! Integration tests for the transaction state machine: the full transition
//! table, nesting delegation, drop behavior, and expiry.

use chrono::{Duration, Utc};
use tessara::store::{
    FactStore, IsolationLevel, StoreError, TransactionError, TransactionOptions, TransactionState,
};

fn store() -> FactStore {
    FactStore::new()
}

#[test]
fn test_lifecycle_commit_path() {
    let store = store();
    let tx = store.begin_transaction(TransactionOptions::named("commit-path"));

    assert_eq!(tx.state(), TransactionState::Running);
    assert!(tx.finished_at().is_none());

    assert!(tx.commit().unwrap());
    assert_eq!(tx.state(), TransactionState::Committed);
    assert!(tx.finished_at().is_some());

    // terminal: every further transition fails
    assert!(matches!(
        tx.commit(),
        Err(TransactionError::AlreadyCommitted(_))
    ));
    assert!(matches!(
        tx.rollback(),
        Err(TransactionError::AlreadyCommitted(_))
    ));
    assert!(matches!(
        tx.begin_nested("late"),
        Err(TransactionError::AlreadyCommitted(_))
    ));
}

#[test]
fn test_lifecycle_rollback_path() {
    let store = store();
    let tx = store.begin_transaction(TransactionOptions::named("rollback-path"));

    assert!(tx.rollback().unwrap());
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert!(tx.finished_at().is_some());

    assert!(matches!(
        tx.rollback(),
        Err(TransactionError::AlreadyRolledBack(_))
    ));
    assert!(matches!(
        tx.commit(),
        Err(TransactionError::AlreadyRolledBack(_))
    ));
    assert!(matches!(
        tx.begin_nested("late"),
        Err(TransactionError::AlreadyRolledBack(_))
    ));
}

#[test]
fn test_nested_delegation_rule() {
    let store = store();
    let parent = store.begin_transaction(TransactionOptions::named("parent"));
    let child = parent.begin_nested("child").unwrap();

    assert_eq!(parent.state(), TransactionState::Nested);

    // the parent cannot commit over its open child
    assert!(matches!(
        parent.commit(),
        Err(TransactionError::NestedCommitConflict { .. })
    ));
    // nor roll back past it
    assert!(matches!(
        parent.rollback(),
        Err(TransactionError::NestedRollback(_))
    ));

    child.commit().unwrap();
    assert!(parent.commit().unwrap());
    assert_eq!(parent.state(), TransactionState::Committed);
}

#[test]
fn test_sequential_nesting() {
    let store = store();
    let parent = store.begin_transaction(TransactionOptions::named("parent"));

    let first = parent.begin_nested("first").unwrap();
    first.commit().unwrap();

    // nesting again from the derived nested state is allowed
    let second = parent.begin_nested("second").unwrap();
    assert_eq!(parent.child_count(), 2);

    // the most recent child gates the parent, not the first
    assert!(matches!(
        parent.commit(),
        Err(TransactionError::NestedCommitConflict { .. })
    ));
    second.commit().unwrap();
    assert!(parent.commit().unwrap());
}

#[test]
fn test_nested_grandchildren() {
    let store = store();
    let root = store.begin_transaction(TransactionOptions::named("root"));
    let child = root.begin_nested("child").unwrap();
    let grandchild = child.begin_nested("grandchild").unwrap();

    assert_eq!(root.state(), TransactionState::Nested);
    assert_eq!(child.state(), TransactionState::Nested);

    grandchild.commit().unwrap();
    child.commit().unwrap();
    root.commit().unwrap();
}

#[test]
fn test_nested_settings_inheritance() {
    let store = store();
    let parent = store.begin_transaction(
        TransactionOptions::named("parent")
            .distributed()
            .long_running()
            .with_isolation(IsolationLevel::Serializable),
    );
    let child = parent.begin_nested("child").unwrap();

    assert!(child.is_distributed());
    assert!(child.is_long_running());
    assert_eq!(child.isolation_level(), IsolationLevel::Serializable);
    assert_eq!(child.store_id(), store.id());

    child.commit().unwrap();
    parent.commit().unwrap();
}

#[test]
fn test_drop_forces_rollback() {
    let store = store();
    let parent = store.begin_transaction(TransactionOptions::named("parent"));
    {
        let _abandoned = parent.begin_nested("abandoned").unwrap();
        // dropped here while still running
    }

    // the child rolled itself back, which blocks the parent's commit
    assert!(matches!(
        parent.commit(),
        Err(TransactionError::NestedCommitConflict { .. })
    ));
}

#[test]
fn test_expired_transaction_rejects_store_work() {
    let store = store();
    let tx = store.begin_transaction(
        TransactionOptions::named("stale").expiring_at(Utc::now() - Duration::seconds(1)),
    );

    assert!(tx.is_expired());
    let err = store
        .add_in_transaction(&tx, "a", "p", "b", None)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Transaction(TransactionError::Expired { .. })
    ));
    assert!(store.is_empty());

    // finishing an expired transaction is still allowed
    assert!(tx.rollback().unwrap());
}

#[test]
fn test_unexpired_deadline_allows_work() {
    let store = store();
    let tx = store.begin_transaction(
        TransactionOptions::named("fresh").expiring_at(Utc::now() + Duration::hours(1)),
    );

    store.add_in_transaction(&tx, "a", "p", "b", None).unwrap();
    assert!(tx.commit().unwrap());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_facts_record_their_transaction() {
    let store = store();
    let tx = store.begin_transaction(TransactionOptions::named("writer"));

    let in_tx = store.add_in_transaction(&tx, "a", "p", "b", None).unwrap();
    let outside = store.add("c", "p", "d").unwrap();

    assert_eq!(in_tx.transaction_id, Some(tx.id()));
    assert_eq!(outside.transaction_id, None);
    tx.commit().unwrap();
}

#[test]
fn test_transaction_metadata() {
    let store = store();
    let before = Utc::now();
    let tx = store.begin_transaction(TransactionOptions::named("meta"));

    assert_eq!(tx.name(), "meta");
    assert_eq!(tx.store_id(), store.id());
    assert!(tx.created_at() >= before);
    assert!(!tx.is_distributed());
    assert!(!tx.is_long_running());
    assert!(tx.invalidated_at().is_none());
    tx.commit().unwrap();
}
