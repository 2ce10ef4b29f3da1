//! Read-only property-graph view over a fact store
//!
//! [`GraphView`] is a copyable borrow of a [`FactStore`] that answers the
//! structural questions traversal steps ask: which edges leave a vertex,
//! which arrive at it, which vertices a context (hyperedge) touches. Out- and
//! in-edges come straight from the subject and object indices, so a hop is a
//! bucket lookup, never a scan.

use super::element::{Edge, HyperEdge, MultiEdge, Vertex};
use crate::store::{FactId, FactPattern, FactStore, Term};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Direction of an edge hop relative to a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges whose tail is the vertex.
    Outgoing,
    /// Edges whose head is the vertex.
    Incoming,
}

/// A cheap, copyable read handle over a store's graph structure.
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    store: &'a FactStore,
}

impl<'a> GraphView<'a> {
    pub fn new(store: &'a FactStore) -> Self {
        GraphView { store }
    }

    pub fn store(&self) -> &'a FactStore {
        self.store
    }

    /// True when the term occurs in subject or object position of any fact.
    pub fn contains_vertex(&self, vertex: &Vertex) -> bool {
        !self
            .store
            .get_facts(&FactPattern::any().with_subject(vertex.term.clone()))
            .is_empty()
            || !self
                .store
                .get_facts(&FactPattern::any().with_object(vertex.term.clone()))
                .is_empty()
    }

    /// Every distinct vertex, subjects first, then objects not already seen.
    pub fn vertices(&self) -> Vec<Vertex> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for term in self.store.subjects().into_iter().chain(self.store.objects()) {
            if seen.insert(term.clone()) {
                out.push(Vertex::new(term));
            }
        }
        out
    }

    /// Edges leaving the vertex (facts with this subject).
    pub fn out_edges(&self, vertex: &Vertex) -> Vec<Edge> {
        self.store
            .get_facts(&FactPattern::any().with_subject(vertex.term.clone()))
            .into_iter()
            .map(|fact| Edge::new((*fact).clone()))
            .collect()
    }

    /// Edges arriving at the vertex (facts with this object).
    pub fn in_edges(&self, vertex: &Vertex) -> Vec<Edge> {
        self.store
            .get_facts(&FactPattern::any().with_object(vertex.term.clone()))
            .into_iter()
            .map(|fact| Edge::new((*fact).clone()))
            .collect()
    }

    /// Edges touching the vertex in the given direction.
    pub fn edges(&self, vertex: &Vertex, direction: Direction) -> Vec<Edge> {
        match direction {
            Direction::Outgoing => self.out_edges(vertex),
            Direction::Incoming => self.in_edges(vertex),
        }
    }

    /// Resolve one edge by its fact identity.
    pub fn edge(&self, id: FactId) -> Option<Edge> {
        self.store.get_fact(id).map(|fact| Edge::new((*fact).clone()))
    }

    /// Values of a vertex property: the objects of facts `(vertex, key, ?)`.
    pub fn vertex_properties(&self, vertex: &Vertex, key: &Term) -> Vec<Term> {
        self.store
            .get_facts(
                &FactPattern::any()
                    .with_subject(vertex.term.clone())
                    .with_predicate(key.clone()),
            )
            .into_iter()
            .map(|fact| fact.object.clone())
            .collect()
    }

    /// The out-edges of a vertex grouped by label: one [`MultiEdge`] per
    /// distinct predicate, heads in insertion order.
    pub fn multi_edges(&self, vertex: &Vertex) -> Vec<MultiEdge> {
        let mut groups: BTreeMap<Term, Vec<Vertex>> = BTreeMap::new();
        for edge in self.out_edges(vertex) {
            groups.entry(edge.label().clone()).or_default().push(edge.head());
        }
        groups
            .into_iter()
            .map(|(label, heads)| MultiEdge::new(vertex.clone(), label, heads))
            .collect()
    }

    /// The hyperedge for one context, if any fact is stored under it. Members
    /// are the distinct subjects and objects of those facts in first-seen
    /// order.
    pub fn hyperedge(&self, context: &Term) -> Option<HyperEdge> {
        let facts = self
            .store
            .get_facts(&FactPattern::any().with_context(context.clone()));
        if facts.is_empty() {
            return None;
        }

        let mut seen = FxHashSet::default();
        let mut members = Vec::new();
        for fact in facts {
            for term in [&fact.subject, &fact.object] {
                if seen.insert(term.clone()) {
                    members.push(Vertex::new(term.clone()));
                }
            }
        }
        Some(HyperEdge::new(context.clone(), members))
    }

    /// One hyperedge per context present in the store.
    pub fn hyperedges(&self) -> Vec<HyperEdge> {
        self.store
            .contexts()
            .into_iter()
            .filter_map(|context| self.hyperedge(&context))
            .collect()
    }
}
