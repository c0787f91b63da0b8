use narwhal::embedding::{self, PlanarEmbedding};
use narwhal::graph::{Graph, Point, Positions};
use narwhal::planarity;
use narwhal::Error;

fn complete(n: usize) -> Graph {
    let ids: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
    let mut g = Graph::new();
    for i in 0..n {
        for j in i + 1..n {
            g.add_edge(ids[i].clone(), ids[j].clone());
        }
    }
    g
}

fn cube() -> Graph {
    Graph::from_edges(&[
        ("a", "b"),
        ("b", "c"),
        ("c", "d"),
        ("d", "a"),
        ("e", "f"),
        ("f", "g"),
        ("g", "h"),
        ("h", "e"),
        ("a", "e"),
        ("b", "f"),
        ("c", "g"),
        ("d", "h"),
    ])
}

fn embed(g: &Graph) -> Result<PlanarEmbedding, Error> {
    planarity::embed(&g.validate().unwrap())
}

#[test]
fn square_embeds_as_a_single_cycle() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
    let emb = embed(&g).unwrap();
    assert_eq!(emb.rotation(0), &[1, 3]);
    assert_eq!(emb.rotation(1), &[0, 2]);
    assert_eq!(emb.rotation(2), &[1, 3]);
    assert_eq!(emb.rotation(3), &[2, 0]);
    assert_eq!(emb.face_count(), 2);
    assert!(emb.check_structure());
}

#[test]
fn k4_and_the_cube_are_planar() {
    let k4 = embed(&complete(4)).unwrap();
    assert!(k4.check_structure());
    assert_eq!(k4.edge_count(), 6);
    assert_eq!(k4.face_count(), 4);

    let cube = embed(&cube()).unwrap();
    assert!(cube.is_planar());
    assert_eq!(cube.face_count(), 6);
}

#[test]
fn k5_is_not_planar() {
    assert!(matches!(embed(&complete(5)), Err(Error::NotPlanar)));
}

#[test]
fn k33_is_not_planar() {
    let mut g = Graph::new();
    for a in ["a1", "a2", "a3"] {
        for b in ["b1", "b2", "b3"] {
            g.add_edge(a, b);
        }
    }
    assert!(matches!(embed(&g), Err(Error::NotPlanar)));
}

#[test]
fn blocks_are_split_at_cut_vertices() {
    // Two triangles sharing `c`, plus a pendant edge.
    let g = Graph::from_edges(&[
        ("a", "b"),
        ("b", "c"),
        ("c", "a"),
        ("c", "d"),
        ("d", "e"),
        ("e", "c"),
        ("e", "f"),
    ]);
    let ig = g.validate().unwrap();
    let mut blocks = planarity::biconnected_components(&ig);
    for b in &mut blocks {
        b.sort_unstable();
    }
    blocks.sort();
    assert_eq!(blocks, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);

    let emb = planarity::embed(&ig).unwrap();
    assert!(emb.is_planar());
    assert_eq!(emb.rotation(ig.vertex_ix("c").unwrap()).len(), 4);
    // V - E + F = 2 with V = 6, E = 7.
    assert_eq!(emb.face_count(), 3);
}

#[test]
fn trees_have_one_face() {
    let g = Graph::from_edges(&[("c", "x"), ("c", "y"), ("c", "z"), ("z", "w")]);
    let emb = embed(&g).unwrap();
    assert_eq!(emb.face_count(), 1);
    assert!(emb.is_planar());
}

#[test]
fn positions_order_neighbors_counter_clockwise() {
    let g = Graph::from_edges(&[("o", "e"), ("o", "n"), ("o", "w"), ("o", "s")]);
    let ig = g.validate().unwrap();
    let pos = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(-1.0, 0.0),
        Point::new(0.0, -1.0),
    ];
    let emb = embedding::from_positions(&ig, &pos).unwrap();
    // atan2 order: s (-pi/2), e (0), n (pi/2), w (pi).
    assert_eq!(emb.rotation(0), &[4, 1, 2, 3]);
    assert_eq!(emb.ccw_after(0, 3), Some(4));
}

#[test]
fn crossing_drawing_is_rejected() {
    let g = Graph::from_edges(&[("a", "c"), ("b", "d"), ("a", "b")]);
    let ig = g.validate().unwrap();
    let positions: Positions = [
        ("a", Point::new(0.0, 0.0)),
        ("c", Point::new(1.0, 1.0)),
        ("b", Point::new(1.0, 0.0)),
        ("d", Point::new(0.0, 1.0)),
    ]
    .into_iter()
    .map(|(k, p)| (k.to_string(), p))
    .collect();
    let pos = embedding::resolve_positions(&ig, &positions).unwrap();
    match embedding::build(&ig, Some(&pos)) {
        Err(Error::CrossingEdges { first, second }) => {
            assert_eq!(first, ("a".to_string(), "c".to_string()));
            assert_eq!(second, ("b".to_string(), "d".to_string()));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_and_coincident_positions_are_rejected() {
    let g = Graph::from_edges(&[("a", "b")]);
    let ig = g.validate().unwrap();

    let mut positions = Positions::new();
    positions.insert("a".into(), Point::new(0.0, 0.0));
    match embedding::resolve_positions(&ig, &positions) {
        Err(Error::MissingPosition { vertex }) => assert_eq!(vertex, "b"),
        other => panic!("unexpected: {other:?}"),
    }

    positions.insert("b".into(), Point::new(0.0, 0.0));
    let pos = embedding::resolve_positions(&ig, &positions).unwrap();
    assert!(matches!(
        embedding::from_positions(&ig, &pos),
        Err(Error::CoincidentPositions { .. })
    ));
}

#[test]
fn non_finite_positions_are_rejected() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c")]);
    let ig = g.validate().unwrap();

    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut positions = Positions::new();
        positions.insert("a".into(), Point::new(0.0, 0.0));
        positions.insert("b".into(), Point::new(1.0, bad));
        positions.insert("c".into(), Point::new(2.0, 0.0));
        match embedding::resolve_positions(&ig, &positions) {
            Err(Error::NonFinitePosition { vertex }) => assert_eq!(vertex, "b"),
            other => panic!("unexpected for {bad}: {other:?}"),
        }

        positions.insert("b".into(), Point::new(bad, 1.0));
        assert!(matches!(
            embedding::resolve_positions(&ig, &positions),
            Err(Error::NonFinitePosition { .. })
        ));
    }
}

#[test]
fn segments_touching_at_an_endpoint_intersect() {
    let p = Point::new;
    assert!(embedding::segments_intersect(
        p(0.0, 0.0),
        p(2.0, 0.0),
        p(1.0, 0.0),
        p(1.0, 3.0)
    ));
    assert!(!embedding::segments_intersect(
        p(0.0, 0.0),
        p(2.0, 0.0),
        p(0.0, 1.0),
        p(2.0, 1.0)
    ));
}
