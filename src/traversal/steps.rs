//! Structural traversal steps
//!
//! Each step is a pipe: a lazy iterator that pulls from its upstream only
//! when asked for the next element. Steps are built right-to-left (the
//! consumer's constructor takes the producer by value), so a whole chain is
//! assembled before anything is pulled, and a chain computes nothing until it
//! is advanced. Steps are `&mut self` state machines; exhaustion is `None`.

use crate::graph::{Direction, Edge, GraphView, HyperEdge, Vertex};
use crate::store::Term;
use std::collections::VecDeque;

/// Which end of an edge a hop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    /// The object side (the vertex the edge arrives at).
    Head,
    /// The subject side (the vertex the edge leaves from).
    Tail,
}

/// Vertex -> its edges in one direction.
///
/// Pulls one vertex, loads its edge bucket through the view, and drains the
/// bucket one edge per advance before pulling the next vertex.
pub struct VertexEdgesPipe<'a, I> {
    view: GraphView<'a>,
    input: I,
    direction: Direction,
    pending: VecDeque<Edge>,
}

impl<'a, I> VertexEdgesPipe<'a, I>
where
    I: Iterator<Item = Vertex>,
{
    pub fn new(view: GraphView<'a>, input: I, direction: Direction) -> Self {
        Self {
            view,
            input,
            direction,
            pending: VecDeque::new(),
        }
    }
}

impl<'a, I> Iterator for VertexEdgesPipe<'a, I>
where
    I: Iterator<Item = Vertex>,
{
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        loop {
            if let Some(edge) = self.pending.pop_front() {
                return Some(edge);
            }
            let vertex = self.input.next()?;
            self.pending = self.view.edges(&vertex, self.direction).into();
        }
    }
}

/// Edge -> one of its end vertices.
pub struct EdgeVertexPipe<I> {
    input: I,
    end: EdgeEnd,
}

impl<I> EdgeVertexPipe<I>
where
    I: Iterator<Item = Edge>,
{
    pub fn new(input: I, end: EdgeEnd) -> Self {
        Self { input, end }
    }
}

impl<I> Iterator for EdgeVertexPipe<I>
where
    I: Iterator<Item = Edge>,
{
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        let edge = self.input.next()?;
        Some(match self.end {
            EdgeEnd::Head => edge.head(),
            EdgeEnd::Tail => edge.tail(),
        })
    }
}

/// Hyperedge -> its incident vertices, flattened.
///
/// Optionally keeps only hyperedges whose label is in an OR-set, or those a
/// custom predicate accepts. The current hyperedge's members are drained one
/// per advance before the next hyperedge is pulled.
pub struct HyperEdgeVerticesPipe<I> {
    input: I,
    labels: Option<Vec<Term>>,
    predicate: Option<Box<dyn Fn(&HyperEdge) -> bool>>,
    pending: VecDeque<Vertex>,
}

impl<I> HyperEdgeVerticesPipe<I>
where
    I: Iterator<Item = HyperEdge>,
{
    /// All incident vertices of every upstream hyperedge.
    pub fn new(input: I) -> Self {
        Self {
            input,
            labels: None,
            predicate: None,
            pending: VecDeque::new(),
        }
    }

    /// Only hyperedges carrying one of the given labels contribute.
    pub fn with_labels(input: I, labels: Vec<Term>) -> Self {
        Self {
            input,
            labels: Some(labels),
            predicate: None,
            pending: VecDeque::new(),
        }
    }

    /// Only hyperedges the predicate accepts contribute.
    pub fn with_predicate(input: I, predicate: impl Fn(&HyperEdge) -> bool + 'static) -> Self {
        Self {
            input,
            labels: None,
            predicate: Some(Box::new(predicate)),
            pending: VecDeque::new(),
        }
    }

    fn accepts(&self, hyperedge: &HyperEdge) -> bool {
        if let Some(ref labels) = self.labels {
            if !labels.contains(hyperedge.label()) {
                return false;
            }
        }
        if let Some(ref predicate) = self.predicate {
            if !predicate(hyperedge) {
                return false;
            }
        }
        true
    }
}

impl<I> Iterator for HyperEdgeVerticesPipe<I>
where
    I: Iterator<Item = HyperEdge>,
{
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        loop {
            if let Some(vertex) = self.pending.pop_front() {
                return Some(vertex);
            }
            let hyperedge = self.input.next()?;
            if self.accepts(&hyperedge) {
                self.pending = hyperedge.members.into();
            }
        }
    }
}
