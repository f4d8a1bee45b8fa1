use ringdelve_core::{Segment, Vec2};
use ringdelve_system_raycast::{cast_ray, cast_ray_detailed};

#[test]
fn empty_segment_list_never_hits() {
    assert_eq!(cast_ray(Vec2::ZERO, Vec2::X, &[]), f32::INFINITY);
    assert_eq!(cast_ray_detailed(Vec2::ZERO, Vec2::X, &[]), None);
}

#[test]
fn nearest_of_several_walls_wins() {
    let segments = [
        Segment::new(9.0, -1.0, 9.0, 1.0),
        Segment::new(5.0, -1.0, 5.0, 1.0),
        Segment::new(7.0, -1.0, 7.0, 1.0),
    ];

    let hit = cast_ray_detailed(Vec2::ZERO, Vec2::X, &segments).expect("wall ahead");
    assert_eq!(hit.segment, 1);
    assert!((hit.distance - 5.0).abs() < 1e-5);
    assert!((hit.point(Vec2::ZERO, Vec2::X) - Vec2::new(5.0, 0.0)).length() < 1e-5);
}

#[test]
fn direction_length_does_not_scale_distance() {
    let segments = [Segment::new(5.0, -1.0, 5.0, 1.0)];
    let short = cast_ray(Vec2::ZERO, Vec2::new(0.1, 0.0), &segments);
    let long = cast_ray(Vec2::ZERO, Vec2::new(40.0, 0.0), &segments);
    assert!((short - 5.0).abs() < 1e-5);
    assert!((long - 5.0).abs() < 1e-5);
}

#[test]
fn diagonal_ray_reports_euclidean_distance() {
    let segments = [Segment::new(3.0, -10.0, 3.0, 10.0)];
    let distance = cast_ray(Vec2::ZERO, Vec2::new(1.0, 1.0), &segments);
    assert!((distance - 3.0 * 2f32.sqrt()).abs() < 1e-4);
}

#[test]
fn zero_direction_hits_nothing() {
    let segments = [Segment::new(5.0, -1.0, 5.0, 1.0)];
    assert_eq!(cast_ray(Vec2::ZERO, Vec2::ZERO, &segments), f32::INFINITY);
}
