use braid_graphlib::{EdgeKey, Graph, GraphOptions};

#[test]
fn nodes_keep_insertion_order() {
    let mut g: Graph<i32, (), ()> = Graph::default();
    g.set_node("c", 3);
    g.set_node("a", 1);
    g.set_node("b", 2);
    g.set_node("a", 10);

    assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    assert_eq!(g.node("a"), Some(&10));
    assert_eq!(g.node_count(), 3);
}

#[test]
fn set_edge_creates_missing_endpoints_with_default_labels() {
    let mut g: Graph<i32, (), ()> = Graph::default();
    g.set_edge("a", "b");

    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert_eq!(g.node("a"), Some(&0));
    assert!(g.has_edge("a", "b", None));
    assert!(!g.has_edge("b", "a", None));
}

#[test]
fn set_edge_keeps_the_existing_label_unless_one_is_given() {
    let mut g: Graph<(), Vec<u32>, ()> = Graph::default();
    g.set_edge_with_label("a", "b", vec![1]);
    g.set_edge("a", "b");
    assert_eq!(g.edge("a", "b", None), Some(&vec![1]));

    g.edge_mut("a", "b", None).unwrap().push(2);
    assert_eq!(g.edge("a", "b", None), Some(&vec![1, 2]));
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn edge_names_are_ignored_for_simple_graphs() {
    let mut g: Graph<(), i32, ()> = Graph::default();
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));

    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&2));
    assert_eq!(g.edge("a", "b", Some("anything")), Some(&2));
}

#[test]
fn multigraph_edges_are_told_apart_by_name() {
    let mut g: Graph<(), i32, ()> = Graph::new(GraphOptions { multigraph: true });
    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));

    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.edge("a", "b", Some("x")), Some(&1));
    assert_eq!(g.edge("a", "b", Some("y")), Some(&2));
    assert_eq!(g.edge_by_key(&EdgeKey::new("a", "b", Some("y"))), Some(&2));
    assert_eq!(g.successors("a"), vec!["b"]);
    assert_eq!(g.out_edges("a", None).len(), 2);
    assert_eq!(g.degree("a"), 2);
}

#[test]
fn successors_predecessors_and_neighbors() {
    let mut g: Graph<(), (), ()> = Graph::default();
    g.set_path(&["a", "b", "c"]);
    g.set_edge("c", "b");

    assert_eq!(g.successors("b"), vec!["c"]);
    assert_eq!(g.predecessors("b"), vec!["a", "c"]);
    assert_eq!(g.neighbors("b"), vec!["c", "a"]);
    assert!(g.is_adjacent("a", "b"));
    assert!(g.is_adjacent("b", "a"));
    assert!(!g.is_adjacent("a", "c"));
    assert!(g.successors("missing").is_empty());
}

#[test]
fn in_and_out_edges_can_be_filtered_by_the_other_endpoint() {
    let mut g: Graph<(), (), ()> = Graph::default();
    g.set_edge("a", "c");
    g.set_edge("b", "c");

    assert_eq!(g.in_edges("c", None).len(), 2);
    assert_eq!(
        g.in_edges("c", Some("b")),
        vec![EdgeKey::new("b", "c", None::<String>)]
    );
    assert!(g.out_edges("c", None).is_empty());
}

#[test]
fn remove_node_drops_incident_edges_and_reindexes() {
    let mut g: Graph<(), (), ()> = Graph::default();
    g.set_path(&["a", "b", "c", "d"]);

    assert!(g.remove_node("b"));
    assert!(!g.remove_node("b"));

    assert_eq!(g.nodes().collect::<Vec<_>>(), vec!["a", "c", "d"]);
    assert_eq!(g.edge_count(), 1);
    assert!(g.has_edge("c", "d", None));
    assert_eq!(g.successors("c"), vec!["d"]);
    assert_eq!(g.degree("a"), 0);
    assert_eq!(g.degree("c"), 1);
}

#[test]
fn cloned_graphs_are_independent() {
    let mut g: Graph<(), (), String> = Graph::default();
    g.set_graph("original".to_string());
    g.set_edge("a", "b");

    let mut h = g.clone();
    h.set_edge("b", "c");
    h.graph_mut().push_str("-copy");

    assert_eq!(g.edge_count(), 1);
    assert_eq!(h.edge_count(), 2);
    assert_eq!(g.graph(), "original");
    assert_eq!(h.graph(), "original-copy");
}

#[test]
fn labels_can_be_updated_in_place() {
    let mut g: Graph<Vec<&str>, u32, ()> = Graph::new(GraphOptions { multigraph: true });
    g.set_node("a", vec!["first"]);
    g.node_mut("a").unwrap().push("second");
    assert_eq!(g.node("a"), Some(&vec!["first", "second"]));
    assert!(g.node_mut("missing").is_none());

    g.set_edge_named("a", "b", Some("x"), Some(1));
    g.set_edge_named("a", "b", Some("y"), Some(2));
    g.set_edge_with_label("b", "c", 3);

    let mut seen = Vec::new();
    g.for_each_edge(|key, label| seen.push((key.v.clone(), key.w.clone(), *label)));
    assert_eq!(
        seen,
        vec![
            ("a".to_string(), "b".to_string(), 1),
            ("a".to_string(), "b".to_string(), 2),
            ("b".to_string(), "c".to_string(), 3),
        ]
    );
}

#[test]
fn edge_keys_display_their_endpoints_and_name() {
    let mut g: Graph<(), (), ()> = Graph::new(GraphOptions { multigraph: true });
    g.set_edge_named("a", "b", Some("wheat|*"), None);
    g.set_edge("b", "c");

    let shown: Vec<String> = g.edges().map(ToString::to_string).collect();
    assert_eq!(shown, vec!["a -> b (wheat|*)", "b -> c"]);
}
