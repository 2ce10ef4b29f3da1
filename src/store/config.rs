//! Store configuration

use super::types::Term;
use serde::{Deserialize, Serialize};

/// Configuration for a [`FactStore`](super::store::FactStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Human-readable store name, used in log output.
    pub name: String,

    /// Context substituted when a fact is added without one.
    pub default_context: Term,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>, default_context: impl Into<Term>) -> Self {
        Self {
            name: name.into(),
            default_context: default_context.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "tessara".to_string(),
            default_context: Term::new("default"),
        }
    }
}
