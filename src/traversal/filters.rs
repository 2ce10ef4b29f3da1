//! Filter pipes
//!
//! Filters share one shape: `next` keeps pulling upstream until an element
//! passes or upstream is exhausted. The comparison-based filters take a
//! [`Comparison`] so callers pick the relation at construction time; the
//! friend-of-a-friend traversal uses `NotEqual` to exclude a label during a
//! hop.

use crate::graph::{Edge, GraphView, Vertex};
use crate::store::Term;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::hash::Hash;

/// The pluggable relation of the comparison-based filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Comparison {
    /// Apply the relation to an ordered pair.
    pub fn evaluate<T: Ord>(&self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
            Comparison::GreaterThan => left.cmp(right) == Ordering::Greater,
            Comparison::GreaterOrEqual => left.cmp(right) != Ordering::Less,
            Comparison::LessThan => left.cmp(right) == Ordering::Less,
            Comparison::LessOrEqual => left.cmp(right) != Ordering::Greater,
        }
    }
}

/// Generic predicate filter: passes elements the predicate accepts.
pub struct FilterPipe<I, F> {
    input: I,
    predicate: F,
}

impl<I, F> FilterPipe<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> bool,
{
    pub fn new(input: I, predicate: F) -> Self {
        Self { input, predicate }
    }
}

impl<I, F> Iterator for FilterPipe<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        loop {
            let item = self.input.next()?;
            if (self.predicate)(&item) {
                return Some(item);
            }
        }
    }
}

/// Edge filter comparing the edge label against an expected term.
pub struct LabelFilterPipe<I> {
    input: I,
    label: Term,
    comparison: Comparison,
}

impl<I> LabelFilterPipe<I>
where
    I: Iterator<Item = Edge>,
{
    pub fn new(input: I, label: impl Into<Term>, comparison: Comparison) -> Self {
        Self {
            input,
            label: label.into(),
            comparison,
        }
    }
}

impl<I> Iterator for LabelFilterPipe<I>
where
    I: Iterator<Item = Edge>,
{
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        loop {
            let edge = self.input.next()?;
            if self.comparison.evaluate(edge.label(), &self.label) {
                return Some(edge);
            }
        }
    }
}

/// Vertex filter on a property value.
///
/// A vertex passes when ANY of its values for the key satisfies the
/// comparison; a vertex without the property never passes.
pub struct PropertyFilterPipe<'a, I> {
    view: GraphView<'a>,
    input: I,
    key: Term,
    expected: Term,
    comparison: Comparison,
}

impl<'a, I> PropertyFilterPipe<'a, I>
where
    I: Iterator<Item = Vertex>,
{
    pub fn new(
        view: GraphView<'a>,
        input: I,
        key: impl Into<Term>,
        expected: impl Into<Term>,
        comparison: Comparison,
    ) -> Self {
        Self {
            view,
            input,
            key: key.into(),
            expected: expected.into(),
            comparison,
        }
    }
}

impl<'a, I> Iterator for PropertyFilterPipe<'a, I>
where
    I: Iterator<Item = Vertex>,
{
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        loop {
            let vertex = self.input.next()?;
            let passes = self
                .view
                .vertex_properties(&vertex, &self.key)
                .iter()
                .any(|value| self.comparison.evaluate(value, &self.expected));
            if passes {
                return Some(vertex);
            }
        }
    }
}

/// Vertex filter matching the vertex term against a regular expression.
pub struct RegexFilterPipe<I> {
    input: I,
    regex: Regex,
}

impl<I> RegexFilterPipe<I>
where
    I: Iterator<Item = Vertex>,
{
    /// The regex is compiled by the caller, so construction cannot fail.
    pub fn new(input: I, regex: Regex) -> Self {
        Self { input, regex }
    }
}

impl<I> Iterator for RegexFilterPipe<I>
where
    I: Iterator<Item = Vertex>,
{
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        loop {
            let vertex = self.input.next()?;
            if self.regex.is_match(vertex.term().as_str()) {
                return Some(vertex);
            }
        }
    }
}

/// Suppresses elements already produced earlier in the stream.
pub struct DedupPipe<I>
where
    I: Iterator,
{
    input: I,
    seen: FxHashSet<I::Item>,
}

impl<I> DedupPipe<I>
where
    I: Iterator,
    I::Item: Clone + Eq + Hash,
{
    pub fn new(input: I) -> Self {
        Self {
            input,
            seen: FxHashSet::default(),
        }
    }
}

impl<I> Iterator for DedupPipe<I>
where
    I: Iterator,
    I::Item: Clone + Eq + Hash,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        loop {
            let item = self.input.next()?;
            if self.seen.insert(item.clone()) {
                return Some(item);
            }
        }
    }
}

/// Suppresses elements contained in a fixed exclusion set.
pub struct ExcludePipe<I>
where
    I: Iterator,
{
    input: I,
    excluded: FxHashSet<I::Item>,
}

impl<I> ExcludePipe<I>
where
    I: Iterator,
    I::Item: Eq + Hash,
{
    pub fn new(input: I, excluded: FxHashSet<I::Item>) -> Self {
        Self { input, excluded }
    }
}

impl<I> Iterator for ExcludePipe<I>
where
    I: Iterator,
    I::Item: Eq + Hash,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        loop {
            let item = self.input.next()?;
            if !self.excluded.contains(&item) {
                return Some(item);
            }
        }
    }
}
