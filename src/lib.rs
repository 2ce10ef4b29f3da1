//! Tessara
//!
//! An embedded quad-based fact store with index-free adjacency and a lazy,
//! composable traversal-pipe layer.
//!
//! # Architecture
//!
//! Three subsystems, leaves first:
//!
//! - [`store`] — facts as subject-predicate-object-context quads, a primary
//!   index plus four secondary indices (all safe for concurrent insert),
//!   followed-by reference links between adjacent facts, pattern queries and
//!   removal, and explicit transactions with nesting and a strict state
//!   machine.
//! - [`graph`] — the property-graph reading of the quad store: vertices,
//!   labeled edges, multi-edges and hyperedges as views over facts, served by
//!   a copyable [`GraphView`](graph::GraphView).
//! - [`traversal`] — pull-based pipes implementing `Iterator`: structural
//!   steps (vertex to edges, edge to vertex, hyperedge to vertices), filters
//!   (predicate, label, property, regex, dedup, exclusion), and composed
//!   friend-of-a-friend traversals.
//!
//! # Example
//!
//! ```
//! use tessara::graph::{GraphView, Vertex};
//! use tessara::store::FactStore;
//! use tessara::traversal::foaf_vertex;
//!
//! let store = FactStore::new();
//! store.add("alice", "knows", "bob").unwrap();
//! store.add("bob", "knows", "carol").unwrap();
//!
//! let view = GraphView::new(&store);
//! let friends_of_friends = foaf_vertex(view, &Vertex::new("alice"));
//! assert_eq!(friends_of_friends, vec![Vertex::new("carol")]);
//! ```

pub mod graph;
pub mod store;
pub mod traversal;

// Re-export the main surface at the crate root
pub use graph::{Direction, Edge, GraphElement, GraphView, HyperEdge, MultiEdge, Vertex};
pub use store::{
    Fact, FactId, FactPattern, FactStore, StoreConfig, StoreError, StoreResult, Term, Transaction,
    TransactionError, TransactionOptions, TransactionResult, TransactionState,
};
pub use traversal::{foaf, foaf_excluding_label, Comparison};
