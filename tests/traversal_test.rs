//! Integration tests for the traversal layer: pipe laziness, step
//! composition, and the friend-of-a-friend pipelines end to end.

use std::cell::Cell;
use tessara::graph::{Direction, GraphView, Vertex};
use tessara::store::{FactStore, Term};
use tessara::traversal::{
    foaf, foaf_excluding_label, foaf_vertex, foaf_vertex_excluding_label, Comparison, DedupPipe,
    EdgeEnd, EdgeVertexPipe, HyperEdgeVerticesPipe, LabelFilterPipe, VertexEdgesPipe,
};

/// The reference fixture: a loves b loves c loves d.
fn loves_chain() -> FactStore {
    let store = FactStore::new();
    store.add("a", "loves", "b").unwrap();
    store.add("b", "loves", "c").unwrap();
    store.add("c", "loves", "d").unwrap();
    store
}

#[test]
fn test_chain_construction_pulls_nothing() {
    let store = loves_chain();
    let view = GraphView::new(&store);

    let pulls = Cell::new(0usize);
    let source = std::iter::repeat(Vertex::new("a"))
        .take(1_000_000)
        .inspect(|_| pulls.set(pulls.get() + 1));

    // a four-step chain over a huge source, fully assembled
    let first_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, source, Direction::Outgoing),
        EdgeEnd::Head,
    );
    let mut second_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
        EdgeEnd::Head,
    );

    assert_eq!(pulls.get(), 0, "construction must not advance the source");

    // one output needs exactly one origin pull here: every hop fans out 1:1
    assert_eq!(second_hop.next(), Some(Vertex::new("c")));
    assert_eq!(pulls.get(), 1);

    // the next output pulls the next origin, nothing more
    assert_eq!(second_hop.next(), Some(Vertex::new("c")));
    assert_eq!(pulls.get(), 2);
}

#[test]
fn test_filter_pulls_minimum_needed() {
    let store = FactStore::new();
    store.add("a", "loves", "b").unwrap();
    store.add("a", "admires", "c").unwrap();
    let view = GraphView::new(&store);

    let pulls = Cell::new(0usize);
    let source = std::iter::once(Vertex::new("a")).inspect(|_| pulls.set(pulls.get() + 1));

    let mut filtered = LabelFilterPipe::new(
        VertexEdgesPipe::new(view, source, Direction::Outgoing),
        "loves",
        Comparison::NotEqual,
    );

    assert_eq!(pulls.get(), 0);
    // the filter skips the rejected edge within one advance
    let edge = filtered.next().unwrap();
    assert_eq!(edge.label(), &Term::new("admires"));
    assert_eq!(pulls.get(), 1);
    assert_eq!(filtered.next(), None);
}

#[test]
fn test_foaf_unlabeled_on_loves_chain() {
    let store = loves_chain();
    let view = GraphView::new(&store);

    // a's 2-hop neighborhood via two "loves" hops is exactly {c}
    assert_eq!(foaf(view, vec![Vertex::new("a")]), vec![Vertex::new("c")]);
    assert_eq!(foaf_vertex(view, &Vertex::new("a")), vec![Vertex::new("c")]);
}

#[test]
fn test_foaf_label_exclusion_on_loves_chain() {
    let store = loves_chain();
    let view = GraphView::new(&store);

    // no alternate-labeled path exists, so excluding "loves" yields nothing
    assert!(foaf_excluding_label(view, vec![Vertex::new("a")], "loves").is_empty());
    assert!(foaf_vertex_excluding_label(view, &Vertex::new("a"), "loves").is_empty());
}

#[test]
fn test_foaf_label_exclusion_with_alternate_path() {
    let store = loves_chain();
    // an alternate 2-hop path from a over differently-labeled edges
    store.add("a", "admires", "b").unwrap();
    store.add("b", "admires", "x").unwrap();
    let view = GraphView::new(&store);

    assert_eq!(
        foaf_excluding_label(view, vec![Vertex::new("a")], "loves"),
        vec![Vertex::new("x")]
    );
}

#[test]
fn test_foaf_output_has_no_duplicates_and_no_origins() {
    let store = FactStore::new();
    // diamond: two 2-hop paths a->d, plus a cycle back to a
    store.add("a", "knows", "b").unwrap();
    store.add("a", "knows", "c").unwrap();
    store.add("b", "knows", "d").unwrap();
    store.add("c", "knows", "d").unwrap();
    store.add("b", "knows", "a").unwrap();
    let view = GraphView::new(&store);

    let result = foaf(view, vec![Vertex::new("a")]);
    assert_eq!(result, vec![Vertex::new("d")]);
}

#[test]
fn test_foaf_multi_origin_excludes_whole_origin_set() {
    let store = FactStore::new();
    store.add("a", "knows", "b").unwrap();
    store.add("b", "knows", "c").unwrap();
    store.add("c", "knows", "a").unwrap();
    let view = GraphView::new(&store);

    // from {a, b}: a reaches c, b reaches a — but a is an origin
    let result = foaf(view, vec![Vertex::new("a"), Vertex::new("b")]);
    assert_eq!(result, vec![Vertex::new("c")]);
}

#[test]
fn test_hyperedge_traversal_over_store_contexts() {
    let store = FactStore::new();
    store.add_quad("a", "loves", "b", "couples").unwrap();
    store.add_quad("c", "knows", "d", "colleagues").unwrap();
    store.add_quad("d", "knows", "e", "colleagues").unwrap();
    let view = GraphView::new(&store);

    let members: Vec<_> = HyperEdgeVerticesPipe::with_labels(
        view.hyperedges().into_iter(),
        vec![Term::new("colleagues")],
    )
    .collect();

    assert_eq!(members.len(), 3);
    assert!(members.contains(&Vertex::new("c")));
    assert!(members.contains(&Vertex::new("d")));
    assert!(members.contains(&Vertex::new("e")));
    assert!(!members.contains(&Vertex::new("a")));
}

#[test]
fn test_manual_composition_matches_foaf() {
    let store = loves_chain();
    let view = GraphView::new(&store);
    let origin = Vertex::new("a");

    let first_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, std::iter::once(origin.clone()), Direction::Outgoing),
        EdgeEnd::Head,
    );
    let second_hop = EdgeVertexPipe::new(
        VertexEdgesPipe::new(view, first_hop, Direction::Outgoing),
        EdgeEnd::Head,
    );
    let by_hand: Vec<_> = DedupPipe::new(second_hop)
        .filter(|v| *v != origin)
        .collect();

    assert_eq!(by_hand, foaf_vertex(view, &Vertex::new("a")));
}
