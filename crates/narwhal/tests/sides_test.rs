use narwhal::bends;
use narwhal::dcel::HalfEdgeIx;
use narwhal::sides::{self, Side};
use narwhal::{Graph, Orthogonalization, Planarization};

#[test]
fn side_helpers() {
    assert_eq!(Side::North.rotate(1), Side::East);
    assert_eq!(Side::West.rotate(1), Side::North);
    assert_eq!(Side::East.rotate(3), Side::North);
    assert_eq!(Side::South.opposite(), Side::North);
    assert_eq!(Side::from_index(6), Side::South);
    assert_eq!(Side::West.step(), (-1, 0));
    assert_eq!(Side::from_direction(3.0, -1.0), Side::East);
    assert_eq!(Side::from_direction(-0.5, 2.0), Side::North);
    assert_eq!(Side::from_direction(1.0, -1.0), Side::East);
    assert_eq!(Side::from_direction(0.0, -2.0), Side::South);
    assert!(Side::South.is_vertical());
}

#[test]
fn square_sides_follow_the_corners() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
    let orth = Orthogonalization::new(Planarization::new(&g, None).unwrap()).unwrap();
    let p = orth.planarization();
    let expanded = bends::expand_bends(p.working_copy(), orth.shape()).unwrap();
    assert_eq!(expanded.bend_count, 0);

    let labels = sides::assign_sides(&expanded.dcel, &expanded.corners, p.external_face(), None)
        .unwrap();
    let got: Vec<Side> = (0..8).map(|he| labels.get(HalfEdgeIx(he))).collect();
    assert_eq!(
        got,
        vec![
            Side::North, // a -> b
            Side::South,
            Side::West, // b -> c
            Side::East,
            Side::South, // c -> d
            Side::North,
            Side::East, // d -> a
            Side::West,
        ]
    );
}

#[test]
fn anchor_rotates_the_whole_drawing() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
    let orth = Orthogonalization::new(Planarization::new(&g, None).unwrap()).unwrap();
    let p = orth.planarization();
    let expanded = bends::expand_bends(p.working_copy(), orth.shape()).unwrap();

    let labels = sides::assign_sides(
        &expanded.dcel,
        &expanded.corners,
        p.external_face(),
        Some((HalfEdgeIx(0), Side::East)),
    )
    .unwrap();
    assert_eq!(labels.get(HalfEdgeIx(0)), Side::East);
    assert_eq!(labels.get(HalfEdgeIx(2)), Side::North);
    assert_eq!(labels.get(HalfEdgeIx(7)), Side::North);
}

#[test]
fn bent_triangle_gets_consistent_sides() {
    let g = Graph::from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
    let orth = Orthogonalization::new(Planarization::new(&g, None).unwrap()).unwrap();
    let p = orth.planarization();
    let expanded = bends::expand_bends(p.working_copy(), orth.shape()).unwrap();
    assert_eq!(expanded.bend_count, 1);
    assert_eq!(expanded.dcel.vertex_count(), 4);
    assert_eq!(expanded.corners.len(), 8);

    let labels = sides::assign_sides(&expanded.dcel, &expanded.corners, p.external_face(), None)
        .unwrap();
    assert_eq!(labels.len(), 8);
    for he in expanded.dcel.half_edge_ixs() {
        assert_eq!(
            labels.get(expanded.dcel.twin(he)),
            labels.get(he).opposite()
        );
    }
    // The inner face is now a rectangle with one segment per direction.
    let inner = expanded
        .dcel
        .face_ixs()
        .find(|&f| !expanded.dcel.face(f).external)
        .unwrap();
    let mut inner_sides: Vec<Side> = expanded
        .dcel
        .face_cycle(inner)
        .into_iter()
        .map(|he| labels.get(he))
        .collect();
    inner_sides.sort();
    assert_eq!(
        inner_sides,
        vec![Side::North, Side::East, Side::South, Side::West]
    );
}
