//! Lazy traversal pipes
//!
//! A pipe is a single-step, pull-based transformation over graph elements,
//! rendered as an `Iterator` implementation: `next` pulls upstream as many
//! times as it needs to produce one output, and `None` is the normal
//! end-of-sequence signal. Chains are built right-to-left by constructor
//! composition and compute nothing until advanced, so a multi-hop traversal
//! over a large graph touches only what its consumer actually pulls.
//!
//! - Structural steps hop between vertices and edges ([`steps`])
//! - Filter pipes drop elements by predicate, label, property, or pattern
//!   ([`filters`])
//! - Composed traversals chain steps into whole queries ([`foaf`])

pub mod filters;
pub mod foaf;
pub mod steps;

// Re-export main types
pub use filters::{
    Comparison, DedupPipe, ExcludePipe, FilterPipe, LabelFilterPipe, PropertyFilterPipe,
    RegexFilterPipe,
};
pub use foaf::{foaf, foaf_excluding_label, foaf_vertex, foaf_vertex_excluding_label};
pub use steps::{EdgeEnd, EdgeVertexPipe, HyperEdgeVerticesPipe, VertexEdgesPipe};
