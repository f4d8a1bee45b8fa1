#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ray versus segment intersection used for movement clamping, line of sight
//! and projectile resolution.

use ringdelve_core::{Segment, Vec2};

/// Denominators smaller than this treat the ray and segment as parallel.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Closest intersection reported by [`cast_ray_detailed`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Index of the struck segment in the slice passed to the cast.
    pub segment: usize,
}

impl RayHit {
    /// World position of the hit along the provided ray.
    #[must_use]
    pub fn point(&self, origin: Vec2, direction: Vec2) -> Vec2 {
        origin + direction.normalize_or_zero() * self.distance
    }
}

/// Distance along `direction` from `origin` to the segment `a`-`b`.
///
/// `direction` is used as given; callers wanting world units must pass a unit
/// vector. Returns `None` when the ray runs parallel to the segment, points
/// away from it or passes beyond either endpoint.
#[must_use]
pub fn ray_segment_distance(origin: Vec2, direction: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let to_origin = origin - a;
    let along = b - a;
    let normal = direction.perp();
    let denominator = along.dot(normal);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let distance = along.perp_dot(to_origin) / denominator;
    let fraction = to_origin.dot(normal) / denominator;
    if distance >= 0.0 && (0.0..=1.0).contains(&fraction) {
        Some(distance)
    } else {
        None
    }
}

/// Casts a ray and reports the nearest struck segment.
///
/// Ties keep the earliest segment in `segments`.
#[must_use]
pub fn cast_ray_detailed(origin: Vec2, direction: Vec2, segments: &[Segment]) -> Option<RayHit> {
    let direction = direction.normalize_or_zero();
    if direction == Vec2::ZERO {
        return None;
    }

    let mut closest: Option<RayHit> = None;
    for (index, segment) in segments.iter().enumerate() {
        let Some(distance) = ray_segment_distance(origin, direction, segment.p1, segment.p2) else {
            continue;
        };
        if closest.map_or(true, |hit| distance < hit.distance) {
            closest = Some(RayHit {
                distance,
                segment: index,
            });
        }
    }
    closest
}

/// Distance to the nearest segment along the ray, or [`f32::INFINITY`] when
/// nothing is struck.
#[must_use]
pub fn cast_ray(origin: Vec2, direction: Vec2, segments: &[Segment]) -> f32 {
    cast_ray_detailed(origin, direction, segments).map_or(f32::INFINITY, |hit| hit.distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_segment_is_hit_at_its_distance() {
        let distance = ray_segment_distance(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(5.0, -1.0),
            Vec2::new(5.0, 1.0),
        );
        assert_eq!(distance, Some(5.0));
    }

    #[test]
    fn parallel_segment_is_skipped() {
        let distance = ray_segment_distance(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(1.0, 1.0),
            Vec2::new(4.0, 1.0),
        );
        assert_eq!(distance, None);
    }

    #[test]
    fn segment_behind_origin_is_skipped() {
        let distance = ray_segment_distance(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(-3.0, -1.0),
            Vec2::new(-3.0, 1.0),
        );
        assert_eq!(distance, None);
    }

    #[test]
    fn ray_passing_beside_segment_misses() {
        let distance = ray_segment_distance(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(5.0, 1.0),
            Vec2::new(5.0, 3.0),
        );
        assert_eq!(distance, None);
    }

    #[test]
    fn endpoint_graze_counts_as_hit() {
        let distance = ray_segment_distance(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 2.0),
        );
        assert_eq!(distance, Some(5.0));
    }
}
