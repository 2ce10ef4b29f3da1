//! Quad fact store with index-free adjacency
//!
//! This module implements the storage half of the engine:
//! - Facts as subject-predicate-object-context quads with store-minted identities
//! - A primary index plus four secondary indices, all safe for concurrent insert
//! - Followed-by reference linking so traversals hop fact-to-fact without index scans
//! - Pattern queries driven by the smallest bound index bucket
//! - Explicit transaction handles with nesting and a strict state machine

pub mod config;
pub mod fact;
pub mod indices;
pub mod pattern;
pub mod store;
pub mod transaction;
pub mod types;

// Re-export main types
pub use config::StoreConfig;
pub use fact::Fact;
pub use indices::IndexKind;
pub use pattern::FactPattern;
pub use store::{FactStore, StoreError, StoreResult};
pub use transaction::{
    CommitOptions, IsolationLevel, RollbackOptions, Transaction, TransactionError,
    TransactionOptions, TransactionResult, TransactionState,
};
pub use types::{FactId, StoreId, Term, TransactionId};
