//! The quad fact store
//!
//! [`FactStore`] owns the index set and mints fact identities through an
//! atomic compare-and-swap loop, so concurrent adds never hand out the same
//! id and never take a lock. Every insert lands in all five indices and, by
//! default, is immediately wired into the followed-by adjacency so traversals
//! can walk fact-to-fact without touching the secondary indices again.
//!
//! Pattern queries pick the smallest bound index bucket as the candidate set
//! and filter the remainder of the pattern over it; a fully unbound pattern
//! falls back to a primary-index scan.

use super::config::StoreConfig;
use super::fact::Fact;
use super::indices::{IndexKind, ReferenceIndexSet};
use super::pattern::FactPattern;
use super::transaction::{Transaction, TransactionError, TransactionOptions};
use super::types::{FactId, StoreId, Term, TransactionId};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subject term must not be empty")]
    EmptySubject,

    #[error("predicate term must not be empty")]
    EmptyPredicate,

    #[error("object term must not be empty")]
    EmptyObject,

    #[error("context term must not be empty")]
    EmptyContext,

    /// A fact identity landed on an occupied index slot. This means the
    /// store's uniqueness invariant is broken; the condition is fatal and
    /// never retried.
    #[error("{index} index already holds an entry for {id}")]
    IndexCorruption { index: IndexKind, id: FactId },

    #[error("transaction {transaction} belongs to a different store than {store}")]
    ForeignTransaction {
        transaction: TransactionId,
        store: StoreId,
    },

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A concurrent quad store with index-free adjacency.
#[derive(Debug)]
pub struct FactStore {
    id: StoreId,
    config: StoreConfig,
    indices: ReferenceIndexSet,
    /// Last identity handed out; the next fact gets `last + 1`.
    next_id: AtomicU64,
}

impl FactStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let store = Self {
            id: StoreId::random(),
            config,
            indices: ReferenceIndexSet::new(),
            next_id: AtomicU64::new(0),
        };
        info!("created fact store {} ({})", store.id, store.config.name);
        store
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn default_context(&self) -> &Term {
        &self.config.default_context
    }

    // ── Adding facts ───────────────────────────────────

    /// Add a fact under the default context and link it into the adjacency.
    pub fn add(
        &self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> StoreResult<Arc<Fact>> {
        self.insert_fact(subject.into(), predicate.into(), object.into(), None, None, true)
    }

    /// Add a fact under an explicit context and link it into the adjacency.
    pub fn add_quad(
        &self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        context: impl Into<Term>,
    ) -> StoreResult<Arc<Fact>> {
        self.insert_fact(
            subject.into(),
            predicate.into(),
            object.into(),
            Some(context.into()),
            None,
            true,
        )
    }

    /// Add a fact without wiring it into the followed-by adjacency.
    /// [`FactStore::link_references`] can connect it later.
    pub fn add_detached(
        &self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        context: Option<Term>,
    ) -> StoreResult<Arc<Fact>> {
        self.insert_fact(subject.into(), predicate.into(), object.into(), context, None, false)
    }

    /// Add a fact under a transaction handle. The transaction must belong to
    /// this store, be running (or nested) and be unexpired; the new fact
    /// records the transaction id.
    pub fn add_in_transaction(
        &self,
        transaction: &Transaction,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        context: Option<Term>,
    ) -> StoreResult<Arc<Fact>> {
        if transaction.store_id() != self.id {
            return Err(StoreError::ForeignTransaction {
                transaction: transaction.id(),
                store: self.id,
            });
        }
        transaction.ensure_accepts_work()?;
        self.insert_fact(
            subject.into(),
            predicate.into(),
            object.into(),
            context,
            Some(transaction.id()),
            true,
        )
    }

    /// Bulk load quads in parallel; a `None` context takes the store default.
    /// Identity allocation and index inserts are safe under concurrency, so
    /// the quads are distributed across the rayon pool; returned facts keep
    /// the input order.
    pub fn add_all(
        &self,
        quads: Vec<(Term, Term, Term, Option<Term>)>,
    ) -> StoreResult<Vec<Arc<Fact>>> {
        let facts = quads
            .into_par_iter()
            .map(|(s, p, o, c)| self.insert_fact(s, p, o, c, None, true))
            .collect::<StoreResult<Vec<_>>>()?;
        info!("bulk added {} facts to store {}", facts.len(), self.id);
        Ok(facts)
    }

    fn insert_fact(
        &self,
        subject: Term,
        predicate: Term,
        object: Term,
        context: Option<Term>,
        transaction_id: Option<TransactionId>,
        connect: bool,
    ) -> StoreResult<Arc<Fact>> {
        if subject.is_empty() {
            return Err(StoreError::EmptySubject);
        }
        if predicate.is_empty() {
            return Err(StoreError::EmptyPredicate);
        }
        if object.is_empty() {
            return Err(StoreError::EmptyObject);
        }
        let context = match context {
            Some(c) if c.is_empty() => return Err(StoreError::EmptyContext),
            Some(c) => c,
            None => self.config.default_context.clone(),
        };

        let fact = Arc::new(Fact::new(
            self.id,
            transaction_id,
            self.mint_id(),
            subject,
            predicate,
            object,
            context,
        ));
        self.indices.insert(Arc::clone(&fact))?;
        if connect {
            self.indices.link(&fact);
        }
        Ok(fact)
    }

    /// Allocate the next fact identity with a compare-and-swap retry loop.
    fn mint_id(&self) -> FactId {
        loop {
            let current = self.next_id.load(Ordering::SeqCst);
            if self
                .next_id
                .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return FactId::new(current + 1);
            }
        }
    }

    /// Wire an existing fact into the followed-by adjacency. Returns `false`
    /// when the id is unknown. Re-linking an already connected fact is a
    /// no-op.
    pub fn link_references(&self, id: FactId) -> bool {
        match self.indices.get(id) {
            Some(fact) => {
                self.indices.link(&fact);
                true
            }
            None => false,
        }
    }

    // ── Reading facts ──────────────────────────────────

    /// Primary-index lookup.
    pub fn get_fact(&self, id: FactId) -> Option<Arc<Fact>> {
        self.indices.get(id)
    }

    pub fn contains(&self, id: FactId) -> bool {
        self.indices.contains(id)
    }

    /// The facts that continue from the given fact, i.e. every fact whose
    /// subject equals its object.
    pub fn followed_by(&self, id: FactId) -> Vec<Arc<Fact>> {
        self.indices
            .followed_by_ids(id)
            .into_iter()
            .filter_map(|fid| self.indices.get(fid))
            .collect()
    }

    pub fn followed_by_ids(&self, id: FactId) -> Vec<FactId> {
        self.indices.followed_by_ids(id)
    }

    /// Every fact matching the pattern.
    ///
    /// The smallest bucket among the bound fields drives the search; the
    /// rest of the pattern filters its candidates. A bound term that appears
    /// in no bucket short-circuits to an empty result.
    pub fn get_facts(&self, pattern: &FactPattern) -> Vec<Arc<Fact>> {
        if pattern.is_unbound() {
            return self.indices.scan();
        }

        let bound = [
            (IndexKind::Subject, pattern.subject.as_ref()),
            (IndexKind::Predicate, pattern.predicate.as_ref()),
            (IndexKind::Object, pattern.object.as_ref()),
            (IndexKind::Context, pattern.context.as_ref()),
        ];

        let mut best: Option<(IndexKind, &Term, usize)> = None;
        for (kind, term) in bound {
            let Some(term) = term else { continue };
            let len = self.indices.bucket_len(kind, term);
            if len == 0 {
                return Vec::new();
            }
            if best.map_or(true, |(_, _, shortest)| len < shortest) {
                best = Some((kind, term, len));
            }
        }
        let Some((kind, term, _)) = best else {
            return Vec::new();
        };

        self.indices
            .bucket(kind, term)
            .into_iter()
            .filter_map(|id| self.indices.get(id))
            .filter(|fact| pattern.matches(fact))
            .collect()
    }

    /// All facts in the store.
    pub fn facts(&self) -> Vec<Arc<Fact>> {
        self.indices.scan()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Distinct subject terms currently indexed.
    pub fn subjects(&self) -> Vec<Term> {
        self.indices.keys(IndexKind::Subject)
    }

    /// Distinct predicate terms currently indexed.
    pub fn predicates(&self) -> Vec<Term> {
        self.indices.keys(IndexKind::Predicate)
    }

    /// Distinct object terms currently indexed.
    pub fn objects(&self) -> Vec<Term> {
        self.indices.keys(IndexKind::Object)
    }

    /// Distinct context terms currently indexed.
    pub fn contexts(&self) -> Vec<Term> {
        self.indices.keys(IndexKind::Context)
    }

    // ── Removing facts ─────────────────────────────────

    /// Remove every fact matching the pattern, scrubbing the adjacency links
    /// that pointed at them. Returns the removed facts.
    pub fn remove_facts(&self, pattern: &FactPattern) -> Vec<Arc<Fact>> {
        let victims = self.get_facts(pattern);
        for fact in &victims {
            self.indices.remove(fact);
        }
        if !victims.is_empty() {
            debug!("removed {} facts from store {}", victims.len(), self.id);
        }
        victims
    }

    /// Remove one fact by identity, returning it if present.
    pub fn remove_fact(&self, id: FactId) -> Option<Arc<Fact>> {
        let fact = self.indices.get(id)?;
        self.indices.remove(&fact);
        Some(fact)
    }

    // ── Transactions ───────────────────────────────────

    /// Open a transaction handle against this store. Handles are explicit;
    /// opening a second one while another is running is allowed, and each is
    /// validated when it is used.
    pub fn begin_transaction(&self, options: TransactionOptions) -> Transaction {
        let transaction = Transaction::begin(self.id, options);
        debug!(
            "began transaction {} ({}) on store {}",
            transaction.id(),
            transaction.name(),
            self.id
        );
        transaction
    }
}

impl Default for FactStore {
    fn default() -> Self {
        Self::new()
    }
}
