//! Transaction lifecycle and state machine
//!
//! A [`Transaction`] is an explicit handle returned by
//! [`FactStore::begin_transaction`](crate::store::FactStore::begin_transaction)
//! and passed back into store calls that should run under it. There is no
//! ambient "current transaction"; whoever holds the handle owns the unit of
//! work.
//!
//! Stored state is one of `Running`, `Committing`, `Committed`,
//! `RollingBack`, `RolledBack`. The sixth reported state,
//! [`TransactionState::Nested`], is derived: a running transaction with at
//! least one child reports itself as nested, and its commit is then gated on
//! the most recent child having committed. Dropping a handle that is still
//! running forces a rollback.

use super::types::{StoreId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use thiserror::Error;
use tracing::{debug, warn};

/// Isolation level requested for a transaction.
///
/// Recorded and inherited by nested transactions; no isolation behavior is
/// attached to it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl Default for IsolationLevel {
    fn default() -> Self {
        IsolationLevel::ReadCommitted
    }
}

/// The observable lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Active, no children.
    Running,
    /// Active with at least one nested transaction. Never stored; derived
    /// from `Running` plus a non-empty child list.
    Nested,
    /// Commit has started but not finished.
    Committing,
    /// Terminal success.
    Committed,
    /// Rollback has started but not finished.
    RollingBack,
    /// Terminal abort.
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Running => "running",
            TransactionState::Nested => "nested",
            TransactionState::Committing => "committing",
            TransactionState::Committed => "committed",
            TransactionState::RollingBack => "rolling back",
            TransactionState::RolledBack => "rolled back",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised by illegal state transitions or invalid use of a handle.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction {0} is already committed")]
    AlreadyCommitted(TransactionId),

    #[error("transaction {0} is already rolled back")]
    AlreadyRolledBack(TransactionId),

    #[error("transaction {0} has a commit in progress")]
    CommitInProgress(TransactionId),

    #[error("transaction {0} has a rollback in progress")]
    RollbackInProgress(TransactionId),

    #[error("transaction {id} cannot commit: nested transaction {child} has not committed")]
    NestedCommitConflict {
        id: TransactionId,
        child: TransactionId,
    },

    #[error("transaction {0} has nested transactions and cannot be rolled back directly")]
    NestedRollback(TransactionId),

    #[error("transaction {id} expired at {invalidated_at}")]
    Expired {
        id: TransactionId,
        invalidated_at: DateTime<Utc>,
    },

    #[error("transaction {id} is {state} and cannot accept new work")]
    NotActive {
        id: TransactionId,
        state: TransactionState,
    },
}

pub type TransactionResult<T> = Result<T, TransactionError>;

/// Settings for a new top-level transaction.
///
/// `distributed` and `long_running` are recorded for callers to inspect;
/// neither changes behavior. `creation_time` defaults to now when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOptions {
    pub name: String,
    pub distributed: bool,
    pub long_running: bool,
    pub isolation_level: IsolationLevel,
    pub creation_time: Option<DateTime<Utc>>,
    pub invalidation_time: Option<DateTime<Utc>>,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            name: "transaction".to_string(),
            distributed: false,
            long_running: false,
            isolation_level: IsolationLevel::default(),
            creation_time: None,
            invalidation_time: None,
        }
    }
}

impl TransactionOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn distributed(mut self) -> Self {
        self.distributed = true;
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    pub fn with_isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = level;
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.invalidation_time = Some(at);
        self
    }
}

/// Settings for a commit. The asynchronous flag is accepted and recorded but
/// commits always complete synchronously.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub comment: Option<String>,
    pub asynchronous: bool,
}

impl CommitOptions {
    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
            asynchronous: false,
        }
    }
}

/// Settings for a rollback, mirroring [`CommitOptions`].
#[derive(Debug, Clone, Default)]
pub struct RollbackOptions {
    pub comment: Option<String>,
    pub asynchronous: bool,
}

impl RollbackOptions {
    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
            asynchronous: false,
        }
    }
}

#[derive(Debug)]
struct TransactionInner {
    id: TransactionId,
    store_id: StoreId,
    name: String,
    distributed: bool,
    long_running: bool,
    isolation_level: IsolationLevel,
    creation_time: DateTime<Utc>,
    invalidation_time: Option<DateTime<Utc>>,
    finishing_time: Mutex<Option<DateTime<Utc>>>,
    comment: Mutex<Option<String>>,
    state: Mutex<TransactionState>,
    parent: Option<Weak<TransactionInner>>,
    children: Mutex<Vec<Arc<TransactionInner>>>,
}

impl TransactionInner {
    /// Stored state plus the derived nested case.
    fn current_state(&self) -> TransactionState {
        let stored = *self.state.lock().unwrap();
        if stored == TransactionState::Running && !self.children.lock().unwrap().is_empty() {
            TransactionState::Nested
        } else {
            stored
        }
    }
}

/// Handle to one unit of work against a store.
///
/// The handle is deliberately not cloneable: whoever holds it decides the
/// outcome. Dropping it while still running rolls the transaction back.
#[derive(Debug)]
pub struct Transaction {
    inner: Arc<TransactionInner>,
}

impl Transaction {
    pub(crate) fn begin(store_id: StoreId, options: TransactionOptions) -> Self {
        Self::spawn(store_id, options, None)
    }

    fn spawn(
        store_id: StoreId,
        options: TransactionOptions,
        parent: Option<Weak<TransactionInner>>,
    ) -> Self {
        let inner = Arc::new(TransactionInner {
            id: TransactionId::random(),
            store_id,
            name: options.name,
            distributed: options.distributed,
            long_running: options.long_running,
            isolation_level: options.isolation_level,
            creation_time: options.creation_time.unwrap_or_else(Utc::now),
            invalidation_time: options.invalidation_time,
            finishing_time: Mutex::new(None),
            comment: Mutex::new(None),
            state: Mutex::new(TransactionState::Running),
            parent,
            children: Mutex::new(Vec::new()),
        });
        Transaction { inner }
    }

    // ── Inspection ─────────────────────────────────────

    pub fn id(&self) -> TransactionId {
        self.inner.id
    }

    pub fn store_id(&self) -> StoreId {
        self.inner.store_id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_distributed(&self) -> bool {
        self.inner.distributed
    }

    pub fn is_long_running(&self) -> bool {
        self.inner.long_running
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.inner.isolation_level
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.creation_time
    }

    pub fn invalidated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.invalidation_time
    }

    /// Set once the transaction reaches a terminal state.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.finishing_time.lock().unwrap()
    }

    /// Comment recorded by the commit or rollback that finished this
    /// transaction.
    pub fn comment(&self) -> Option<String> {
        self.inner.comment.lock().unwrap().clone()
    }

    pub fn is_nested(&self) -> bool {
        self.inner.parent.is_some()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.lock().unwrap().len()
    }

    pub fn state(&self) -> TransactionState {
        self.inner.current_state()
    }

    /// Whether the recorded invalidation time has passed.
    pub fn is_expired(&self) -> bool {
        match self.inner.invalidation_time {
            Some(at) => Utc::now() >= at,
            None => false,
        }
    }

    /// Guard used by store mutations: the transaction must be active and
    /// unexpired to accept new facts or children.
    pub(crate) fn ensure_accepts_work(&self) -> TransactionResult<()> {
        match self.state() {
            TransactionState::Running | TransactionState::Nested => {
                if let Some(at) = self.inner.invalidation_time {
                    if Utc::now() >= at {
                        return Err(TransactionError::Expired {
                            id: self.inner.id,
                            invalidated_at: at,
                        });
                    }
                }
                Ok(())
            }
            state => Err(TransactionError::NotActive {
                id: self.inner.id,
                state,
            }),
        }
    }

    // ── Transitions ────────────────────────────────────

    /// Commit with default options.
    pub fn commit(&self) -> TransactionResult<bool> {
        self.commit_with(CommitOptions::default())
    }

    /// Move `Running -> Committing -> Committed` and record the finishing
    /// time. Returns `Ok(true)` when this call performed the transition and
    /// `Ok(false)` when a commit was already in progress.
    ///
    /// A nested parent (running with children) may only commit once its most
    /// recent child has committed; anything else is a conflict. Terminal and
    /// rolling-back states refuse with the matching error.
    pub fn commit_with(&self, options: CommitOptions) -> TransactionResult<bool> {
        let mut state = self.inner.state.lock().unwrap();
        match *state {
            TransactionState::Running => {
                {
                    let children = self.inner.children.lock().unwrap();
                    if let Some(last) = children.last() {
                        if last.current_state() != TransactionState::Committed {
                            return Err(TransactionError::NestedCommitConflict {
                                id: self.inner.id,
                                child: last.id,
                            });
                        }
                    }
                }
                *state = TransactionState::Committing;
                drop(state);

                if options.asynchronous {
                    debug!(
                        "asynchronous commit requested for transaction {}; completing synchronously",
                        self.inner.id
                    );
                }
                if options.comment.is_some() {
                    *self.inner.comment.lock().unwrap() = options.comment;
                }
                *self.inner.finishing_time.lock().unwrap() = Some(Utc::now());
                *self.inner.state.lock().unwrap() = TransactionState::Committed;
                debug!("committed transaction {} ({})", self.inner.id, self.inner.name);
                Ok(true)
            }
            TransactionState::Committing => Ok(false),
            TransactionState::Committed => Err(TransactionError::AlreadyCommitted(self.inner.id)),
            TransactionState::RollingBack => {
                Err(TransactionError::RollbackInProgress(self.inner.id))
            }
            TransactionState::RolledBack => {
                Err(TransactionError::AlreadyRolledBack(self.inner.id))
            }
            TransactionState::Nested => unreachable!("nested state is never stored"),
        }
    }

    /// Roll back with default options.
    pub fn rollback(&self) -> TransactionResult<bool> {
        self.rollback_with(RollbackOptions::default())
    }

    /// Move `Running -> RollingBack -> RolledBack` and record the finishing
    /// time. Returns `Ok(true)` when this call performed the transition and
    /// `Ok(false)` when a rollback was already in progress.
    ///
    /// A nested parent can never be rolled back directly; its children decide
    /// their own fate first. Committing and terminal states refuse with the
    /// matching error.
    pub fn rollback_with(&self, options: RollbackOptions) -> TransactionResult<bool> {
        let mut state = self.inner.state.lock().unwrap();
        match *state {
            TransactionState::Running => {
                if !self.inner.children.lock().unwrap().is_empty() {
                    return Err(TransactionError::NestedRollback(self.inner.id));
                }
                *state = TransactionState::RollingBack;
                drop(state);

                if options.asynchronous {
                    debug!(
                        "asynchronous rollback requested for transaction {}; completing synchronously",
                        self.inner.id
                    );
                }
                if options.comment.is_some() {
                    *self.inner.comment.lock().unwrap() = options.comment;
                }
                *self.inner.finishing_time.lock().unwrap() = Some(Utc::now());
                *self.inner.state.lock().unwrap() = TransactionState::RolledBack;
                debug!(
                    "rolled back transaction {} ({})",
                    self.inner.id, self.inner.name
                );
                Ok(true)
            }
            TransactionState::RollingBack => Ok(false),
            TransactionState::Committing => {
                Err(TransactionError::CommitInProgress(self.inner.id))
            }
            TransactionState::Committed => Err(TransactionError::AlreadyCommitted(self.inner.id)),
            TransactionState::RolledBack => {
                Err(TransactionError::AlreadyRolledBack(self.inner.id))
            }
            TransactionState::Nested => unreachable!("nested state is never stored"),
        }
    }

    /// Open a child transaction sharing this transaction's distributed,
    /// long-running and isolation settings. Allowed only while the stored
    /// state is `Running` (which includes the derived nested case) and the
    /// transaction is unexpired.
    pub fn begin_nested(&self, name: impl Into<String>) -> TransactionResult<Transaction> {
        let state = self.inner.state.lock().unwrap();
        match *state {
            TransactionState::Running => {
                if let Some(at) = self.inner.invalidation_time {
                    if Utc::now() >= at {
                        return Err(TransactionError::Expired {
                            id: self.inner.id,
                            invalidated_at: at,
                        });
                    }
                }
                let child = Self::spawn(
                    self.inner.store_id,
                    TransactionOptions {
                        name: name.into(),
                        distributed: self.inner.distributed,
                        long_running: self.inner.long_running,
                        isolation_level: self.inner.isolation_level,
                        creation_time: None,
                        invalidation_time: self.inner.invalidation_time,
                    },
                    Some(Arc::downgrade(&self.inner)),
                );
                self.inner
                    .children
                    .lock()
                    .unwrap()
                    .push(Arc::clone(&child.inner));
                debug!(
                    "began nested transaction {} under {}",
                    child.inner.id, self.inner.id
                );
                Ok(child)
            }
            TransactionState::Committing => {
                Err(TransactionError::CommitInProgress(self.inner.id))
            }
            TransactionState::Committed => Err(TransactionError::AlreadyCommitted(self.inner.id)),
            TransactionState::RollingBack => {
                Err(TransactionError::RollbackInProgress(self.inner.id))
            }
            TransactionState::RolledBack => {
                Err(TransactionError::AlreadyRolledBack(self.inner.id))
            }
            TransactionState::Nested => unreachable!("nested state is never stored"),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_state(&self, state: TransactionState) {
        *self.inner.state.lock().unwrap() = state;
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock().unwrap();
        // A running transaction is forcibly rolled back on scope exit; this
        // also finishes a rollback that never reached its terminal state.
        // Commit-side and terminal states are left untouched.
        if matches!(
            *state,
            TransactionState::Running | TransactionState::RollingBack
        ) {
            let was_running = *state == TransactionState::Running;
            *state = TransactionState::RolledBack;
            drop(state);
            *self.inner.finishing_time.lock().unwrap() = Some(Utc::now());
            if was_running {
                warn!(
                    "transaction {} ({}) dropped without commit; rolled back",
                    self.inner.id, self.inner.name
                );
            }
        }
    }
}
