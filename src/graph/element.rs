//! Property-graph elements derived from stored facts
//!
//! The graph layer never stores anything of its own; every element is a view
//! over quads. A vertex is a term seen in subject or object position, an edge
//! is a single fact (predicate as label), a multi-edge is the fan-out of one
//! subject-predicate pair, and a hyperedge is a context with the vertices that
//! occur under it. [`GraphElement`] tags the four structural kinds in one
//! enum.

use crate::store::{Fact, FactId, Term};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex, identified by the term naming it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Vertex {
    pub term: Term,
}

impl Vertex {
    pub fn new(term: impl Into<Term>) -> Self {
        Vertex { term: term.into() }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

impl From<Term> for Vertex {
    fn from(term: Term) -> Self {
        Vertex { term }
    }
}

impl From<&str> for Vertex {
    fn from(s: &str) -> Self {
        Vertex::new(s)
    }
}

/// A directed, labeled edge: one fact viewed structurally.
///
/// The subject is the tail (out-vertex), the object is the head (in-vertex)
/// and the predicate is the label. Identity follows the fact's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    fact: Fact,
}

impl Edge {
    pub fn new(fact: Fact) -> Self {
        Edge { fact }
    }

    pub fn id(&self) -> FactId {
        self.fact.id
    }

    pub fn label(&self) -> &Term {
        &self.fact.predicate
    }

    /// The vertex this edge leaves from (the fact's subject).
    pub fn tail(&self) -> Vertex {
        Vertex::new(self.fact.subject.clone())
    }

    /// The vertex this edge arrives at (the fact's object).
    pub fn head(&self) -> Vertex {
        Vertex::new(self.fact.object.clone())
    }

    pub fn fact(&self) -> &Fact {
        &self.fact
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.fact.id == other.fact.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.fact.id.hash(state);
    }
}

/// The fan-out of one (tail, label) pair: a single edge with several heads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiEdge {
    pub tail: Vertex,
    pub label: Term,
    pub heads: Vec<Vertex>,
}

impl MultiEdge {
    pub fn new(tail: Vertex, label: Term, heads: Vec<Vertex>) -> Self {
        MultiEdge { tail, label, heads }
    }
}

/// A hyperedge: a context term together with the distinct vertices that occur
/// under it, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperEdge {
    pub label: Term,
    pub members: Vec<Vertex>,
}

impl HyperEdge {
    pub fn new(label: Term, members: Vec<Vertex>) -> Self {
        HyperEdge { label, members }
    }

    pub fn label(&self) -> &Term {
        &self.label
    }

    pub fn members(&self) -> &[Vertex] {
        &self.members
    }
}

/// The four structural kinds as one tagged value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphElement {
    Vertex(Vertex),
    Edge(Edge),
    MultiEdge(MultiEdge),
    HyperEdge(HyperEdge),
}

impl GraphElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            GraphElement::Vertex(_) => ElementKind::Vertex,
            GraphElement::Edge(_) => ElementKind::Edge,
            GraphElement::MultiEdge(_) => ElementKind::MultiEdge,
            GraphElement::HyperEdge(_) => ElementKind::HyperEdge,
        }
    }
}

/// Discriminant of [`GraphElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
    MultiEdge,
    HyperEdge,
}
