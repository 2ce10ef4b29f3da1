//! Property-graph layer derived from the quad store
//!
//! This module implements the structural view traversals operate on:
//! - Vertices, edges, multi-edges and hyperedges as views over stored facts
//! - A copyable [`GraphView`] answering adjacency questions through the
//!   store's indices

pub mod element;
pub mod view;

// Re-export main types
pub use element::{Edge, ElementKind, GraphElement, HyperEdge, MultiEdge, Vertex};
pub use view::{Direction, GraphView};
