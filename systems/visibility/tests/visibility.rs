use ringdelve_core::{Segment, Vec2};
use ringdelve_system_visibility::{
    calculate_visibility, load_map, Rect, VisibilityEdge, FAR_DISTANCE,
};

const TOLERANCE: f32 = 1e-3;

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < TOLERANCE
}

fn distance_to_segment(point: Vec2, segment: &Segment) -> f32 {
    let along = segment.p2 - segment.p1;
    let t = ((point - segment.p1).dot(along) / along.length_squared()).clamp(0.0, 1.0);
    point.distance(segment.p1 + along * t)
}

#[test]
fn box_around_origin_yields_its_four_walls() {
    let map = load_map(Vec2::ZERO, Some(Rect::around(Vec2::ZERO, 10.0)), &[], &[]);
    let edges = calculate_visibility(&map);

    let expected = [
        (Vec2::new(-10.0, 10.0), Vec2::new(-10.0, -10.0)),
        (Vec2::new(-10.0, -10.0), Vec2::new(10.0, -10.0)),
        (Vec2::new(10.0, -10.0), Vec2::new(10.0, 10.0)),
        (Vec2::new(10.0, 10.0), Vec2::new(-10.0, 10.0)),
    ];
    assert_eq!(edges.len(), expected.len(), "edges: {edges:?}");
    for (edge, (begin, end)) in edges.iter().zip(expected) {
        assert!(close(edge.begin, begin), "{edge:?} should begin at {begin}");
        assert!(close(edge.end, end), "{edge:?} should end at {end}");
    }
}

#[test]
fn edges_without_segments_stay_on_far_boundary() {
    let origin = Vec2::new(3.0, -4.0);
    let map = load_map(origin, None, &[], &[]);
    let edges = calculate_visibility(&map);

    assert_eq!(edges.len(), 4);
    for VisibilityEdge { begin, end } in &edges {
        assert!((begin.distance(origin) - FAR_DISTANCE).abs() < 0.1);
        assert!((end.distance(origin) - FAR_DISTANCE).abs() < 0.1);
    }
    for pair in edges.windows(2) {
        assert!(close(pair[0].end, pair[1].begin));
    }
    assert!(close(edges[3].end, edges[0].begin));
}

#[test]
fn inner_wall_occludes_the_room_behind_it() {
    let wall = Segment::new(5.0, -2.0, 5.0, 2.0);
    let map = load_map(
        Vec2::ZERO,
        Some(Rect::around(Vec2::ZERO, 20.0)),
        &[],
        &[wall],
    );
    let edges = calculate_visibility(&map);

    for edge in &edges {
        for point in [edge.begin, edge.end] {
            let on_some_segment = map
                .segments()
                .iter()
                .any(|segment| distance_to_segment(point, segment) < TOLERANCE);
            assert!(on_some_segment, "{point} lies on no wall");
        }
    }

    let wall_edge = edges
        .iter()
        .find(|edge| (edge.begin.x - 5.0).abs() < TOLERANCE && (edge.end.x - 5.0).abs() < TOLERANCE)
        .expect("the inner wall should be visible");
    assert!(close(wall_edge.begin, wall.p1));
    assert!(close(wall_edge.end, wall.p2));

    assert!(
        edges
            .iter()
            .all(|edge| edge.begin.y.abs() > 2.0 - TOLERANCE || edge.begin.x <= 5.0 + TOLERANCE),
        "nothing directly behind the wall may be visible"
    );
}

#[test]
fn off_centre_viewer_sees_closed_polygon() {
    let origin = Vec2::new(4.0, 1.0);
    let map = load_map(
        origin,
        Some(Rect::around(Vec2::ZERO, 10.0)),
        &[Rect::new(-6.0, -2.0, 3.0, 3.0)],
        &[],
    );
    let edges = calculate_visibility(&map);

    assert!(edges.len() >= 4);
    for pair in edges.windows(2) {
        assert!(
            pair[0].end.distance(origin) > 0.0 && pair[1].begin.distance(origin) > 0.0,
            "edges must not collapse onto the viewer"
        );
    }
}
