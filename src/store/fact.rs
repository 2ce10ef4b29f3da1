//! Fact implementation — the atomic stored unit
//!
//! A fact is an immutable (subject, predicate, object, context) quad plus the
//! identity the store assigned to it. Facts are built by the store's insert
//! path and shared between the primary and all secondary indices as a single
//! allocation; callers never construct them directly in normal use.

use super::types::{FactId, StoreId, Term, TransactionId};
use serde::{Deserialize, Serialize};

/// A subject–predicate–object–context quad with store-assigned identity.
///
/// Identity, ordering and hashing are defined solely by [`Fact::id`]. The quad
/// positions never hold the empty sentinel term — the store validates that on
/// insert. Back-references ("followed by" links) are not part of the fact
/// value; they live in the store's reference index so that facts stay plain,
/// cycle-free data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    /// Identifier of the store that minted this fact.
    pub store_id: StoreId,

    /// Transaction this fact was added under, if any.
    pub transaction_id: Option<TransactionId>,

    /// Store-unique fact identity.
    pub id: FactId,

    /// Subject position of the quad.
    pub subject: Term,

    /// Predicate position of the quad.
    pub predicate: Term,

    /// Object position of the quad.
    pub object: Term,

    /// Context (named graph) this fact belongs to.
    pub context: Term,

    /// Position of this fact in an external persistence layer, when one
    /// manages it. Never set or interpreted by this crate.
    pub disk_position: Option<u64>,
}

impl Fact {
    /// Build a fact record. Crate-internal: the store is the only caller.
    pub(crate) fn new(
        store_id: StoreId,
        transaction_id: Option<TransactionId>,
        id: FactId,
        subject: Term,
        predicate: Term,
        object: Term,
        context: Term,
    ) -> Self {
        Fact {
            store_id,
            transaction_id,
            id,
            subject,
            predicate,
            object,
            context,
            disk_position: None,
        }
    }

    /// The four quad positions in storage order.
    pub fn as_quad(&self) -> (&Term, &Term, &Term, &Term) {
        (&self.subject, &self.predicate, &self.object, &self.context)
    }

    /// True when the quad positions (identity aside) equal the given values.
    pub fn matches_quad(&self, subject: &Term, predicate: &Term, object: &Term, context: &Term) -> bool {
        &self.subject == subject
            && &self.predicate == predicate
            && &self.object == object
            && &self.context == context
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fact {}

impl std::hash::Hash for Fact {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Fact {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fact {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
