//! Composed friend-of-a-friend traversals
//!
//! The 2-hop neighborhood of a set of origin vertices, built by chaining the
//! structural steps: out-edges then head-vertex, applied twice, then dedup and
//! origin exclusion. The label-excluding variant inserts a `NotEqual` label
//! filter after each edge expansion, so only hops over differently-labeled
//! edges count. The pipelines are assembled before any element is pulled;
//! evaluation happens during the final collect.

use super::filters::{Comparison, DedupPipe, ExcludePipe, FilterPipe, LabelFilterPipe};
use super::steps::{EdgeEnd, EdgeVertexPipe, VertexEdgesPipe};
use crate::graph::{Direction, GraphView, Vertex};
use crate::store::Term;
use rustc_hash::FxHashSet;

/// Vertices exactly two out-hops away from any origin, excluding the origins
/// themselves, duplicates removed.
pub fn foaf(view: GraphView<'_>, origins: Vec<Vertex>) -> Vec<Vertex> {
    let origin_set: FxHashSet<Vertex> = origins.iter().cloned().collect();

    let first_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, origins.into_iter(), Direction::Outgoing),
        EdgeEnd::Head,
    );
    let second_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
        EdgeEnd::Head,
    );

    ExcludePipe::new(DedupPipe::new(second_hop), origin_set).collect()
}

/// As [`foaf`], but edges carrying the given label do not count as hops.
pub fn foaf_excluding_label(
    view: GraphView<'_>,
    origins: Vec<Vertex>,
    label: impl Into<Term>,
) -> Vec<Vertex> {
    let label = label.into();
    let origin_set: FxHashSet<Vertex> = origins.iter().cloned().collect();

    let first_hop = EdgeVertexPipe::new(
        LabelFilterPipe::new(
            VertexEdgesPipe::new(view, origins.into_iter(), Direction::Outgoing),
            label.clone(),
            Comparison::NotEqual,
        ),
        EdgeEnd::Head,
    );
    let second_hop = EdgeVertexPipe::new(
        LabelFilterPipe::new(
            VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
            label,
            Comparison::NotEqual,
        ),
        EdgeEnd::Head,
    );

    ExcludePipe::new(DedupPipe::new(second_hop), origin_set).collect()
}

/// Single-origin convenience over [`foaf`]. Skips the origin-set allocation
/// and excludes the origin by direct comparison.
pub fn foaf_vertex(view: GraphView<'_>, origin: &Vertex) -> Vec<Vertex> {
    let first_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, std::iter::once(origin.clone()), Direction::Outgoing),
        EdgeEnd::Head,
    );
    let second_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
        EdgeEnd::Head,
    );

    let origin = origin.clone();
    FilterPipe::new(DedupPipe::new(second_hop), move |v: &Vertex| *v != origin).collect()
}

/// Single-origin convenience over [`foaf_excluding_label`].
pub fn foaf_vertex_excluding_label(
    view: GraphView<'_>,
    origin: &Vertex,
    label: impl Into<Term>,
) -> Vec<Vertex> {
    let label = label.into();

    let first_hop = EdgeVertexPipe::new(
        LabelFilterPipe::new(
            VertexEdgesPipe::new(view, std::iter::once(origin.clone()), Direction::Outgoing),
            label.clone(),
            Comparison::NotEqual,
        ),
        EdgeEnd::Head,
    );
    let second_hop = EdgeVertexPipe::new(
        LabelFilterPipe::new(
            VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
            label,
            Comparison::NotEqual,
        ),
        EdgeEnd::Head,
    );

    let origin = origin.clone();
    FilterPipe::new(DedupPipe::new(second_hop), move |v: &Vertex| *v != origin).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FactStore;

    /// The fixture from the source: A loves B loves C loves D.
    fn loves_chain() -> FactStore {
        let store = FactStore::new();
        store.add("a", "loves", "b").unwrap();
        store.add("b", "loves", "c").unwrap();
        store.add("c", "loves", "d").unwrap();
        store
    }

    #[test]
    fn test_foaf_two_hops_from_single_origin() {
        let store = loves_chain();
        let view = GraphView::new(&store);

        assert_eq!(foaf(view, vec![Vertex::new("a")]), vec![Vertex::new("c")]);
        assert_eq!(foaf_vertex(view, &Vertex::new("a")), vec![Vertex::new("c")]);
    }

    #[test]
    fn test_foaf_excluding_only_label_is_empty() {
        let store = loves_chain();
        let view = GraphView::new(&store);

        // every path uses "loves" edges, so excluding that label leaves nothing
        assert!(foaf_excluding_label(view, vec![Vertex::new("a")], "loves").is_empty());
        assert!(foaf_vertex_excluding_label(view, &Vertex::new("a"), "loves").is_empty());
    }

    #[test]
    fn test_foaf_excluding_other_label_keeps_path() {
        let store = loves_chain();
        let view = GraphView::new(&store);

        assert_eq!(
            foaf_excluding_label(view, vec![Vertex::new("a")], "hates"),
            vec![Vertex::new("c")]
        );
    }

    #[test]
    fn test_foaf_multiple_origins() {
        let store = loves_chain();
        let view = GraphView::new(&store);

        let mut result = foaf(view, vec![Vertex::new("a"), Vertex::new("b")]);
        result.sort();
        // a reaches c, b reaches d
        assert_eq!(result, vec![Vertex::new("c"), Vertex::new("d")]);
    }

    #[test]
    fn test_foaf_never_returns_an_origin() {
        let store = FactStore::new();
        // a -> b -> a: the 2-hop neighborhood of a is a itself
        store.add("a", "knows", "b").unwrap();
        store.add("b", "knows", "a").unwrap();
        let view = GraphView::new(&store);

        assert!(foaf(view, vec![Vertex::new("a")]).is_empty());
        assert!(foaf_vertex(view, &Vertex::new("a")).is_empty());
    }

    #[test]
    fn test_foaf_deduplicates_converging_paths() {
        let store = FactStore::new();
        // two distinct 2-hop paths from a to d
        store.add("a", "knows", "b").unwrap();
        store.add("a", "knows", "c").unwrap();
        store.add("b", "knows", "d").unwrap();
        store.add("c", "knows", "d").unwrap();
        let view = GraphView::new(&store);

        assert_eq!(foaf(view, vec![Vertex::new("a")]), vec![Vertex::new("d")]);
    }
}
