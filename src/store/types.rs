//! Core type definitions for the fact store

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A value occupying one of the four positions of a fact
/// (subject, predicate, object or context).
///
/// The empty string is the reserved "unset" sentinel of the storage layer;
/// the store rejects it on insert. `Term` itself performs no validation so
/// that pattern building and tests stay cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Term(String);

impl Term {
    pub fn new(term: impl Into<String>) -> Self {
        Term(term.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this term is the reserved empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term(s)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term(s.to_string())
    }
}

/// Unique identifier for a fact, minted by the owning store's atomic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FactId(pub u64);

impl FactId {
    pub fn new(id: u64) -> Self {
        FactId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactId({})", self.0)
    }
}

impl From<u64> for FactId {
    fn from(id: u64) -> Self {
        FactId(id)
    }
}

/// Unique identifier for a fact store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct StoreId(Uuid);

impl StoreId {
    /// Mint a fresh random store identifier.
    pub fn random() -> Self {
        StoreId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for StoreId {
    fn from(id: Uuid) -> Self {
        StoreId(id)
    }
}

/// Unique identifier for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Mint a fresh random transaction identifier.
    pub fn random() -> Self {
        TransactionId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        TransactionId(id)
    }
}
