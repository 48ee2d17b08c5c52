use braid::Side;
use braid::graphlib::Graph;
use braid::heuristic::{
    fill_unknown, median_value, neighbour_positions, new_node_index_flat, new_node_indices,
};

type Plain = Graph<(), (), ()>;

fn graph(edges: &[(&str, &str)]) -> Plain {
    let mut g = Plain::default();
    for (v, w) in edges {
        g.set_edge(*v, *w);
    }
    g
}

fn layer(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn bands(items: &[&[&str]]) -> Vec<Vec<String>> {
    items.iter().map(|band| layer(band)).collect()
}

// Two-layer example from Barth, Jünger and Mutzel (2004).
fn two_level() -> (Plain, Vec<Vec<String>>) {
    let g = graph(&[
        ("n0", "s0"),
        ("n1", "s1"),
        ("n1", "s2"),
        ("n2", "s0"),
        ("n2", "s3"),
        ("n2", "s4"),
        ("n3", "s0"),
        ("n3", "s2"),
        ("n4", "s3"),
        ("n5", "s2"),
        ("n5", "s4"),
    ]);
    let order = vec![
        layer(&["n0", "n1", "n2", "n3", "n4", "n5"]),
        layer(&["s0", "s1", "s2", "s3", "s4"]),
    ];
    (g, order)
}

#[test]
fn neighbour_positions_look_both_ways() {
    let (g, order) = two_level();
    assert_eq!(neighbour_positions(&g, &order[1], "n2"), vec![0, 3, 4]);
    assert_eq!(neighbour_positions(&g, &order[1], "n0"), vec![0]);
    assert_eq!(neighbour_positions(&g, &order[0], "s4"), vec![2, 5]);
    assert_eq!(neighbour_positions(&g, &order[0], "s0"), vec![0, 2, 3]);
}

#[test]
fn median_value_picks_the_weighted_middle() {
    assert_eq!(median_value(&[3, 4, 6]), Some(4.0));
    assert_eq!(median_value(&[3, 4]), Some(3.5));
    assert_eq!(median_value(&[]), None);
    assert_eq!(median_value(&[0, 5, 6, 7, 8, 9]), Some(6.75));
}

#[test]
fn fill_unknown_takes_the_nearest_known_value() {
    assert_eq!(fill_unknown(&[Some(0.0), Some(1.0), Some(2.0)], Side::Above), vec![0.0, 1.0, 2.0]);
    assert_eq!(fill_unknown(&[Some(0.0), Some(1.0), Some(2.0)], Side::Below), vec![0.0, 1.0, 2.0]);

    assert_eq!(fill_unknown(&[Some(0.0), None, Some(2.0)], Side::Above), vec![0.0, 2.0, 2.0]);
    assert_eq!(fill_unknown(&[Some(0.0), None, Some(2.0)], Side::Below), vec![0.0, 0.0, 2.0]);

    assert!(fill_unknown(&[], Side::Above).is_empty());
    assert!(fill_unknown(&[], Side::Below).is_empty());

    assert_eq!(fill_unknown(&[None], Side::Above), vec![1.0]);
    assert_eq!(fill_unknown(&[None], Side::Below), vec![0.0]);
    assert_eq!(fill_unknown(&[None, None], Side::Above), vec![2.0, 2.0]);
    assert_eq!(fill_unknown(&[None, None], Side::Below), vec![0.0, 0.0]);
}

#[test]
fn new_node_index_flat_aligns_with_neighbours() {
    let l0 = layer(&["a", "b"]);
    let l1 = layer(&["x", "y", "z"]);

    // a--x, n--y, b--z
    let g = graph(&[("a", "x"), ("b", "z"), ("y", "n")]);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::Below), 1);

    // n--x, a--y, b--z
    let g = graph(&[("a", "y"), ("b", "z"), ("x", "n")]);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::Below), 0);
}

#[test]
fn new_node_index_flat_breaks_ties_by_side() {
    // {a, n}--x
    let g = graph(&[("a", "x"), ("n", "x")]);
    let l0 = layer(&["a"]);
    let l1 = layer(&["x"]);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::Above), 0);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::Below), 1);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::default()), 1);
}

#[test]
fn new_node_index_flat_with_uneven_layers() {
    // {a, b, c}--x, n--y
    let g = graph(&[("a", "x"), ("b", "x"), ("c", "x"), ("y", "n")]);
    let l0 = layer(&["a", "b", "c"]);
    let l1 = layer(&["x", "y"]);
    assert_eq!(new_node_index_flat(&g, &l0, &l1, "n", Side::Below), 3);
}

#[test]
fn new_node_indices_picks_the_band_of_the_median() {
    let g = graph(&[("a", "x"), ("b", "z"), ("y", "n")]);

    // a--x, n--y || b--z
    let this = bands(&[&["a"], &["b"]]);
    let other = bands(&[&["x", "y"], &["z"]]);
    assert_eq!(new_node_indices(&g, &this, &other, "n", Side::Below), (0, 1));

    // a--x || b--z, n--y
    let this = bands(&[&["a"], &["b"]]);
    let other = bands(&[&["x"], &["z", "y"]]);
    assert_eq!(new_node_indices(&g, &this, &other, "n", Side::Below), (1, 1));

    // n--y || a--x, b--z
    let this = bands(&[&[], &["a", "b"]]);
    let other = bands(&[&["y"], &["x", "z"]]);
    assert_eq!(new_node_indices(&g, &this, &other, "n", Side::Below), (0, 0));
}

#[test]
fn new_node_indices_in_an_empty_rank() {
    let g = graph(&[("x", "n")]);
    let empty = bands(&[&[]]);
    let other = bands(&[&["x"]]);
    assert_eq!(new_node_indices(&g, &empty, &other, "n", Side::Below), (0, 0));
}

#[test]
fn new_node_indices_fills_unknown_medians_by_side() {
    let g = graph(&[("a", "c"), ("b", "d"), ("origin", "new")]);
    let this = bands(&[&["a", "target", "b"]]);
    let other = bands(&[&["c", "origin", "d"]]);
    assert_eq!(new_node_indices(&g, &this, &other, "new", Side::Above), (0, 1));
    assert_eq!(new_node_indices(&g, &this, &other, "new", Side::Below), (0, 2));
}

#[test]
fn new_node_indices_without_neighbours_goes_first() {
    let g = Plain::default();
    let empty = bands(&[&[]]);
    let other = bands(&[&["x"]]);
    assert_eq!(new_node_indices(&g, &empty, &other, "n", Side::Below), (0, 0));
}
