//! Concurrent index set backing the fact store
//!
//! Five maps hold every fact: a primary index keyed by fact identity and four
//! secondary indices keyed by the quad positions. A sixth map — the
//! followed-by index — carries the index-free adjacency links between facts.
//! All maps are sharded concurrent maps, so inserts from parallel threads need
//! no external lock; followed-by sets are mutated under the entry guard, which
//! makes the read-then-append of reference linking atomic per fact.

use super::fact::Fact;
use super::store::StoreError;
use super::types::{FactId, Term};
use dashmap::DashMap;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies which of the five fact maps detected an inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    Primary,
    Subject,
    Predicate,
    Object,
    Context,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Primary => "primary",
            IndexKind::Subject => "subject",
            IndexKind::Predicate => "predicate",
            IndexKind::Object => "object",
            IndexKind::Context => "context",
        };
        write!(f, "{}", name)
    }
}

/// The store's complete index set.
///
/// A fact is one `Arc` allocation shared by the primary index and referenced
/// by id from the four secondary buckets, so the five maps never disagree
/// about a fact's content — only about its presence, which
/// [`ReferenceIndexSet::insert`] treats as fatal corruption.
#[derive(Debug, Default)]
pub struct ReferenceIndexSet {
    /// Fact identity -> the fact itself.
    primary: DashMap<FactId, Arc<Fact>>,

    /// Subject term -> facts with that subject.
    subjects: DashMap<Term, Vec<FactId>>,

    /// Predicate term -> facts with that predicate.
    predicates: DashMap<Term, Vec<FactId>>,

    /// Object term -> facts with that object.
    objects: DashMap<Term, Vec<FactId>>,

    /// Context term -> facts stored under that context.
    contexts: DashMap<Term, Vec<FactId>>,

    /// fact -> facts that continue from it (`g` is here iff
    /// `g.subject == fact.object`).
    followed_by: DashMap<FactId, IndexSet<FactId>>,
}

impl ReferenceIndexSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ── Mutations ──────────────────────────────────────

    /// Insert a fact into all five maps.
    ///
    /// An occupied identity slot in any map means two facts were minted with
    /// the same id; that is a broken store invariant, reported per index and
    /// never retried.
    pub(crate) fn insert(&self, fact: Arc<Fact>) -> Result<(), StoreError> {
        let id = fact.id;

        match self.primary.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(StoreError::IndexCorruption {
                    index: IndexKind::Primary,
                    id,
                });
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&fact));
            }
        }

        Self::push_bucket(&self.subjects, &fact.subject, id, IndexKind::Subject)?;
        Self::push_bucket(&self.predicates, &fact.predicate, id, IndexKind::Predicate)?;
        Self::push_bucket(&self.objects, &fact.object, id, IndexKind::Object)?;
        Self::push_bucket(&self.contexts, &fact.context, id, IndexKind::Context)?;

        Ok(())
    }

    fn push_bucket(
        map: &DashMap<Term, Vec<FactId>>,
        key: &Term,
        id: FactId,
        kind: IndexKind,
    ) -> Result<(), StoreError> {
        let mut bucket = map.entry(key.clone()).or_default();
        if bucket.contains(&id) {
            return Err(StoreError::IndexCorruption { index: kind, id });
        }
        bucket.push(id);
        Ok(())
    }

    /// Wire a freshly inserted fact into the followed-by index.
    ///
    /// Two directions: every existing fact whose object equals the new
    /// subject is now followed by the new fact, and the new fact is followed
    /// by every fact whose subject equals the new object. Each append happens
    /// under the followed-by entry guard; the sets reject duplicates, so
    /// re-linking is idempotent.
    pub(crate) fn link(&self, fact: &Fact) {
        if let Some(predecessors) = self.objects.get(&fact.subject) {
            for &prior in predecessors.iter() {
                self.followed_by.entry(prior).or_default().insert(fact.id);
            }
        }

        if let Some(successors) = self.subjects.get(&fact.object) {
            let mut own = self.followed_by.entry(fact.id).or_default();
            for &next in successors.iter() {
                own.insert(next);
            }
        }
    }

    /// Detach a fact from every map, including followed-by sets that point at
    /// it. The facts that can hold such a link all share the removed fact's
    /// subject as their object, so the scrub walks one object bucket instead
    /// of the whole store.
    pub(crate) fn remove(&self, fact: &Fact) {
        let id = fact.id;

        self.primary.remove(&id);
        Self::drop_from_bucket(&self.subjects, &fact.subject, id);
        Self::drop_from_bucket(&self.predicates, &fact.predicate, id);
        Self::drop_from_bucket(&self.objects, &fact.object, id);
        Self::drop_from_bucket(&self.contexts, &fact.context, id);

        self.followed_by.remove(&id);
        let predecessors: Vec<FactId> = self
            .objects
            .get(&fact.subject)
            .map(|bucket| bucket.clone())
            .unwrap_or_default();
        for prior in predecessors {
            if let Some(mut set) = self.followed_by.get_mut(&prior) {
                set.shift_remove(&id);
            }
        }
        self.followed_by.retain(|_, set| !set.is_empty());
    }

    fn drop_from_bucket(map: &DashMap<Term, Vec<FactId>>, key: &Term, id: FactId) {
        let emptied = if let Some(mut bucket) = map.get_mut(key) {
            bucket.retain(|fid| *fid != id);
            bucket.is_empty()
        } else {
            false
        };
        if emptied {
            map.remove_if(key, |_, bucket| bucket.is_empty());
        }
    }

    // ── Queries ────────────────────────────────────────

    pub(crate) fn get(&self, id: FactId) -> Option<Arc<Fact>> {
        self.primary.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn contains(&self, id: FactId) -> bool {
        self.primary.contains_key(&id)
    }

    /// Ids in the bucket of one secondary index (empty when the key is
    /// absent).
    pub(crate) fn bucket(&self, kind: IndexKind, key: &Term) -> Vec<FactId> {
        self.bucket_map(kind)
            .get(key)
            .map(|bucket| bucket.clone())
            .unwrap_or_default()
    }

    /// Number of ids in one secondary bucket without cloning it.
    pub(crate) fn bucket_len(&self, kind: IndexKind, key: &Term) -> usize {
        self.bucket_map(kind)
            .get(key)
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    fn bucket_map(&self, kind: IndexKind) -> &DashMap<Term, Vec<FactId>> {
        match kind {
            IndexKind::Subject => &self.subjects,
            IndexKind::Predicate => &self.predicates,
            IndexKind::Object => &self.objects,
            IndexKind::Context => &self.contexts,
            IndexKind::Primary => panic!("primary index is not term-keyed"),
        }
    }

    /// Ids of the facts that follow the given fact.
    pub(crate) fn followed_by_ids(&self, id: FactId) -> Vec<FactId> {
        self.followed_by
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every fact in the store (primary-index scan).
    pub(crate) fn scan(&self) -> Vec<Arc<Fact>> {
        self.primary
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Distinct keys of one secondary index.
    pub(crate) fn keys(&self, kind: IndexKind) -> Vec<Term> {
        self.bucket_map(kind)
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.primary.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::StoreId;

    fn fact(id: u64, s: &str, p: &str, o: &str) -> Arc<Fact> {
        Arc::new(Fact::new(
            StoreId::random(),
            None,
            FactId::new(id),
            Term::new(s),
            Term::new(p),
            Term::new(o),
            Term::new("default"),
        ))
    }

    #[test]
    fn test_insert_and_get() {
        let set = ReferenceIndexSet::new();
        let f = fact(1, "a", "loves", "b");
        set.insert(Arc::clone(&f)).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(FactId::new(1)).unwrap().subject, Term::new("a"));
        assert_eq!(set.bucket(IndexKind::Subject, &Term::new("a")), vec![FactId::new(1)]);
        assert_eq!(set.bucket(IndexKind::Predicate, &Term::new("loves")), vec![FactId::new(1)]);
        assert_eq!(set.bucket(IndexKind::Object, &Term::new("b")), vec![FactId::new(1)]);
        assert_eq!(set.bucket(IndexKind::Context, &Term::new("default")), vec![FactId::new(1)]);
    }

    #[test]
    fn test_duplicate_identity_is_corruption() {
        let set = ReferenceIndexSet::new();
        set.insert(fact(1, "a", "p", "b")).unwrap();

        let err = set.insert(fact(1, "x", "q", "y")).unwrap_err();
        match err {
            StoreError::IndexCorruption { index, id } => {
                assert_eq!(index, IndexKind::Primary);
                assert_eq!(id, FactId::new(1));
            }
            other => panic!("expected corruption, got {other:?}"),
        }
    }

    #[test]
    fn test_link_forward_and_backward() {
        let set = ReferenceIndexSet::new();
        let ab = fact(1, "a", "loves", "b");
        let bc = fact(2, "b", "loves", "c");

        set.insert(Arc::clone(&ab)).unwrap();
        set.link(&ab);
        set.insert(Arc::clone(&bc)).unwrap();
        set.link(&bc);

        // (a,loves,b) is followed by (b,loves,c)
        assert_eq!(set.followed_by_ids(FactId::new(1)), vec![FactId::new(2)]);
        // (b,loves,c) follows nothing yet
        assert!(set.followed_by_ids(FactId::new(2)).is_empty());
    }

    #[test]
    fn test_link_absorbs_existing_successors() {
        // Insert the continuation first; the late fact must still pick it up.
        let set = ReferenceIndexSet::new();
        let bc = fact(1, "b", "loves", "c");
        let ab = fact(2, "a", "loves", "b");

        set.insert(Arc::clone(&bc)).unwrap();
        set.link(&bc);
        set.insert(Arc::clone(&ab)).unwrap();
        set.link(&ab);

        assert_eq!(set.followed_by_ids(FactId::new(2)), vec![FactId::new(1)]);
    }

    #[test]
    fn test_link_is_idempotent() {
        let set = ReferenceIndexSet::new();
        let ab = fact(1, "a", "loves", "b");
        let bc = fact(2, "b", "loves", "c");
        set.insert(Arc::clone(&ab)).unwrap();
        set.link(&ab);
        set.insert(Arc::clone(&bc)).unwrap();
        set.link(&bc);
        set.link(&bc);

        assert_eq!(set.followed_by_ids(FactId::new(1)), vec![FactId::new(2)]);
    }

    #[test]
    fn test_reflexive_fact_follows_itself() {
        let set = ReferenceIndexSet::new();
        let aa = fact(1, "a", "is", "a");
        set.insert(Arc::clone(&aa)).unwrap();
        set.link(&aa);

        assert_eq!(set.followed_by_ids(FactId::new(1)), vec![FactId::new(1)]);
    }

    #[test]
    fn test_remove_scrubs_links_and_buckets() {
        let set = ReferenceIndexSet::new();
        let ab = fact(1, "a", "loves", "b");
        let bc = fact(2, "b", "loves", "c");
        set.insert(Arc::clone(&ab)).unwrap();
        set.link(&ab);
        set.insert(Arc::clone(&bc)).unwrap();
        set.link(&bc);

        set.remove(&bc);

        assert_eq!(set.len(), 1);
        assert!(set.get(FactId::new(2)).is_none());
        assert!(set.bucket(IndexKind::Subject, &Term::new("b")).is_empty());
        // the predecessor no longer claims to be followed by the removed fact
        assert!(set.followed_by_ids(FactId::new(1)).is_empty());
    }

    #[test]
    fn test_concurrent_inserts_do_not_panic() {
        use std::thread;

        let set = Arc::new(ReferenceIndexSet::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    for j in 0..50 {
                        let id = i * 50 + j + 1;
                        let f = fact(id, "hub", "spokes", &format!("rim-{id}"));
                        set.insert(f).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(set.len(), 400);
        assert_eq!(set.bucket_len(IndexKind::Subject, &Term::new("hub")), 400);
    }
}
