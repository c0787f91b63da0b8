use narwhal::{Error, Graph, MAX_DEGREE};

#[test]
fn validate_indexes_vertices_in_insertion_order() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
    let ig = g.validate().unwrap();
    assert_eq!(ig.vertex_count(), 3);
    assert_eq!(ig.edge_count(), 3);
    assert_eq!(ig.vertex_ix("b"), Some(1));
    assert_eq!(ig.id(2), "c");
    assert_eq!(ig.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(ig.degree(1), 2);
    assert_eq!(ig.component_count(), 1);
}

#[test]
fn add_node_ignores_repeated_ids() {
    let mut g = Graph::new();
    g.add_node("a").add_node("a").add_edge("a", "b");
    assert_eq!(g.nodes, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn set_path_chains_edges() {
    let mut g = Graph::new();
    g.set_path(&["a", "b", "c", "d"]);
    assert_eq!(g.edges.len(), 3);
    assert_eq!(g.edges[2], ("c".to_string(), "d".to_string()));
}

#[test]
fn duplicate_vertex_is_rejected_first() {
    let g = Graph {
        nodes: vec!["a".into(), "a".into()],
        edges: vec![("a".into(), "a".into())],
    };
    match g.validate() {
        Err(Error::DuplicateVertex { vertex }) => assert_eq!(vertex, "a"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn edge_to_missing_vertex_is_rejected() {
    let g = Graph {
        nodes: vec!["a".into()],
        edges: vec![("a".into(), "ghost".into())],
    };
    match g.validate() {
        Err(Error::MissingEndpoint { from, to }) => {
            assert_eq!((from.as_str(), to.as_str()), ("a", "ghost"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn edge_checks_run_in_edge_order() {
    let g = Graph {
        nodes: vec!["a".into(), "b".into()],
        edges: vec![
            ("a".into(), "b".into()),
            ("b".into(), "a".into()),
            ("b".into(), "b".into()),
        ],
    };
    // The duplicate comes first in edge order, so it is reported first.
    assert!(matches!(g.validate(), Err(Error::DuplicateEdge { .. })));

    let g = Graph {
        nodes: vec!["a".into(), "b".into()],
        edges: vec![("b".into(), "b".into()), ("a".into(), "b".into())],
    };
    match g.validate() {
        Err(Error::SelfLoop { vertex }) => assert_eq!(vertex, "b"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn vertex_with_five_edges_exceeds_the_degree_limit() {
    let g = Graph::from_edges(&[
        ("hub", "n1"),
        ("hub", "n2"),
        ("hub", "n3"),
        ("hub", "n4"),
        ("hub", "n5"),
    ]);
    match g.validate() {
        Err(Error::DegreeExceeded { vertex, degree }) => {
            assert_eq!(vertex, "hub");
            assert_eq!(degree, MAX_DEGREE + 1);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn degree_is_checked_before_connectivity() {
    let mut g = Graph::from_edges(&[
        ("hub", "n1"),
        ("hub", "n2"),
        ("hub", "n3"),
        ("hub", "n4"),
        ("hub", "n5"),
    ]);
    g.add_node("island");
    assert!(matches!(g.validate(), Err(Error::DegreeExceeded { .. })));
}

#[test]
fn disconnected_graph_reports_component_count() {
    let mut g = Graph::from_edges(&[("a", "b"), ("c", "d")]);
    g.add_node("e");
    match g.validate() {
        Err(Error::Disconnected { components }) => assert_eq!(components, 3),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn graph_round_trips_through_json() {
    let json = r#"{"nodes": ["a", "b", "c"], "edges": [["a", "b"], ["b", "c"]]}"#;
    let g = Graph::from_json(json).unwrap();
    assert_eq!(g, Graph::from_edges(&[("a", "b"), ("b", "c")]));
    let back = serde_json::to_string(&g).unwrap();
    assert_eq!(Graph::from_json(&back).unwrap(), g);
}
