//! Selector patterns for bulk fact queries and removal

use super::fact::Fact;
use super::types::Term;
use serde::{Deserialize, Serialize};

/// A quad pattern with optional positions (None = wildcard).
///
/// Used by [`FactStore::get_facts`](super::store::FactStore::get_facts) and
/// [`FactStore::remove_facts`](super::store::FactStore::remove_facts). The
/// store picks the most selective bound position to drive an index lookup and
/// filters the candidates against the remaining positions; a pattern with no
/// bound position falls back to a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPattern {
    /// Subject (None = wildcard)
    pub subject: Option<Term>,
    /// Predicate (None = wildcard)
    pub predicate: Option<Term>,
    /// Object (None = wildcard)
    pub object: Option<Term>,
    /// Context (None = wildcard)
    pub context: Option<Term>,
}

impl FactPattern {
    /// Create a pattern from explicit optional positions.
    pub fn new(
        subject: Option<Term>,
        predicate: Option<Term>,
        object: Option<Term>,
        context: Option<Term>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            context,
        }
    }

    /// Pattern matching every fact in the store.
    pub fn any() -> Self {
        Self::default()
    }

    /// Bind the subject position.
    pub fn with_subject(mut self, subject: impl Into<Term>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Bind the predicate position.
    pub fn with_predicate(mut self, predicate: impl Into<Term>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Bind the object position.
    pub fn with_object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Bind the context position.
    pub fn with_context(mut self, context: impl Into<Term>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// True when no position is bound (a full-store pattern).
    pub fn is_unbound(&self) -> bool {
        self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
            && self.context.is_none()
    }

    /// Check whether a fact matches this pattern.
    pub fn matches(&self, fact: &Fact) -> bool {
        if let Some(ref s) = self.subject {
            if s != &fact.subject {
                return false;
            }
        }
        if let Some(ref p) = self.predicate {
            if p != &fact.predicate {
                return false;
            }
        }
        if let Some(ref o) = self.object {
            if o != &fact.object {
                return false;
            }
        }
        if let Some(ref c) = self.context {
            if c != &fact.context {
                return false;
            }
        }
        true
    }
}
