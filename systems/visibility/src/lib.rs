#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Angular-sweep visibility polygon computation.
//!
//! Walls are flattened into a segment arena, every endpoint is tagged with
//! its angle around the viewer and whether the sweep enters the segment
//! there, and a two-pass sweep tracks the nearest open segment. Each change
//! of the nearest segment closes one visible edge.

use std::f32::consts::{FRAC_PI_2, PI};

use ringdelve_core::{Segment, Vec2};

/// Radius of the implicit boundary used where no segment blocks the view.
pub const FAR_DISTANCE: f32 = 500.0;

/// Fraction used to probe a point just inside each endpoint of a segment.
const PROBE_FRACTION: f32 = 0.01;

/// Axis-aligned rectangle converted into four wall segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x: f32,
    /// Minimum y coordinate.
    pub y: f32,
    /// Extent along x.
    pub width: f32,
    /// Extent along y.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its minimum corner and extent.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle centred on `center` that contains a disc of `radius`.
    #[must_use]
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }
}

/// Converts a rectangle into its four edges.
#[must_use]
pub fn rectangle_segments(rect: Rect) -> [Segment; 4] {
    let min = Vec2::new(rect.x, rect.y);
    let max = Vec2::new(rect.x + rect.width, rect.y + rect.height);
    let min_max = Vec2::new(min.x, max.y);
    let max_min = Vec2::new(max.x, min.y);
    [
        Segment::from_points(min, max_min),
        Segment::from_points(min, min_max),
        Segment::from_points(max_min, max),
        Segment::from_points(min_max, max),
    ]
}

/// Segment endpoint annotated for the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndPoint {
    /// Position of the endpoint.
    pub point: Vec2,
    /// Index of the owning segment in [`LoadedMap::segments`].
    pub segment: usize,
    /// Angle of the endpoint around the viewer in `(-PI, PI]`.
    pub angle: f32,
    /// Whether the sweep enters the segment at this endpoint.
    pub begins_segment: bool,
}

/// Segment arena prepared for a single viewer position.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedMap {
    origin: Vec2,
    segments: Vec<Segment>,
    endpoints: Vec<EndPoint>,
}

impl LoadedMap {
    /// Viewer position the endpoints were annotated for.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Every segment considered by the sweep.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Annotated endpoints, two per segment, in segment order.
    #[must_use]
    pub fn endpoints(&self) -> &[EndPoint] {
        &self.endpoints
    }
}

/// Visible boundary edge produced by [`calculate_visibility`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEdge {
    /// Edge endpoint at the start of the angular interval.
    pub begin: Vec2,
    /// Edge endpoint at the end of the angular interval.
    pub end: Vec2,
}

/// Flattens the optional room, blocks and walls into a sweep-ready arena.
#[must_use]
pub fn load_map(origin: Vec2, room: Option<Rect>, blocks: &[Rect], walls: &[Segment]) -> LoadedMap {
    let segments: Vec<Segment> = room
        .into_iter()
        .chain(blocks.iter().copied())
        .flat_map(rectangle_segments)
        .chain(walls.iter().copied())
        .collect();

    let mut endpoints = Vec::with_capacity(segments.len() * 2);
    for (index, segment) in segments.iter().enumerate() {
        let angle1 = angle_from(origin, segment.p1);
        let angle2 = angle_from(origin, segment.p2);
        let first_begins = wrap_angle(angle2 - angle1) > 0.0;
        endpoints.push(EndPoint {
            point: segment.p1,
            segment: index,
            angle: angle1,
            begins_segment: first_begins,
        });
        endpoints.push(EndPoint {
            point: segment.p2,
            segment: index,
            angle: angle2,
            begins_segment: !first_begins,
        });
    }

    LoadedMap {
        origin,
        segments,
        endpoints,
    }
}

/// Sweeps the loaded map and returns the visible edges in angular order.
///
/// With no segments at all the view is bounded only by [`FAR_DISTANCE`] and
/// four quarter-circle chords are returned.
#[must_use]
pub fn calculate_visibility(map: &LoadedMap) -> Vec<VisibilityEdge> {
    let origin = map.origin;
    if map.segments.is_empty() {
        return unobstructed_edges(origin);
    }

    let mut sorted = map.endpoints.clone();
    sorted.sort_by(|a, b| {
        a.angle
            .total_cmp(&b.angle)
            .then_with(|| b.begins_segment.cmp(&a.begins_segment))
    });

    let mut open: Vec<usize> = Vec::new();
    let mut output = Vec::new();
    let mut begin_angle = 0.0;

    for pass in 0..2 {
        for endpoint in &sorted {
            let nearest_before = open.first().copied();

            if endpoint.begins_segment {
                let incoming = &map.segments[endpoint.segment];
                let index = open
                    .iter()
                    .position(|&open_index| {
                        !segment_in_front_of(&map.segments[open_index], incoming, origin)
                    })
                    .unwrap_or(open.len());
                open.insert(index, endpoint.segment);
            } else if let Some(index) = open.iter().position(|&open_index| open_index == endpoint.segment) {
                let _ = open.remove(index);
            }

            if nearest_before != open.first().copied() {
                if pass == 1 {
                    let blocker = nearest_before.map(|index| &map.segments[index]);
                    output.push(edge_between(origin, begin_angle, endpoint.angle, blocker));
                }
                begin_angle = endpoint.angle;
            }
        }
    }

    output
}

/// Whether `front` shields `back` from the viewer at `origin`.
///
/// Both segments are probed slightly inside their endpoints so that shared
/// corners do not decide the order.
#[must_use]
pub fn segment_in_front_of(front: &Segment, back: &Segment, origin: Vec2) -> bool {
    let back_start = left_of(front, probe(back.p1, back.p2));
    let back_end = left_of(front, probe(back.p2, back.p1));
    let viewer_beside_front = left_of(front, origin);
    let front_start = left_of(back, probe(front.p1, front.p2));
    let front_end = left_of(back, probe(front.p2, front.p1));
    let viewer_beside_back = left_of(back, origin);

    // `back` lies wholly on the far side of `front`.
    if back_start == back_end && back_end != viewer_beside_front {
        return true;
    }
    // `front` lies wholly on the viewer's side of `back`.
    if front_start == front_end && front_end == viewer_beside_back {
        return true;
    }
    false
}

fn probe(from: Vec2, to: Vec2) -> Vec2 {
    from.lerp(to, PROBE_FRACTION)
}

fn left_of(segment: &Segment, point: Vec2) -> bool {
    (segment.p2 - segment.p1).perp_dot(point - segment.p1) < 0.0
}

fn angle_from(origin: Vec2, point: Vec2) -> f32 {
    let delta = point - origin;
    delta.y.atan2(delta.x)
}

fn wrap_angle(mut angle: f32) -> f32 {
    if angle <= -PI {
        angle += 2.0 * PI;
    }
    if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

fn unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

fn edge_between(origin: Vec2, begin: f32, end: f32, blocker: Option<&Segment>) -> VisibilityEdge {
    let (line_a, line_b) = match blocker {
        Some(segment) => (segment.p1, segment.p2),
        None => (
            origin + unit(begin) * FAR_DISTANCE,
            origin + unit(end) * FAR_DISTANCE,
        ),
    };
    VisibilityEdge {
        begin: line_intersection(line_a, line_b, origin, origin + unit(begin)),
        end: line_intersection(line_a, line_b, origin, origin + unit(end)),
    }
}

/// Point where the line through `a`-`b` meets the line through `c`-`d`.
///
/// Parallel lines fall back to `a`.
fn line_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Vec2 {
    let denominator = (d.y - c.y) * (b.x - a.x) - (d.x - c.x) * (b.y - a.y);
    if denominator.abs() < f32::EPSILON {
        return a;
    }
    let s = ((d.x - c.x) * (a.y - c.y) - (d.y - c.y) * (a.x - c.x)) / denominator;
    a + (b - a) * s
}

fn unobstructed_edges(origin: Vec2) -> Vec<VisibilityEdge> {
    (0..4)
        .map(|quarter| {
            let begin = -PI + FRAC_PI_2 * quarter as f32;
            let end = begin + FRAC_PI_2;
            edge_between(origin, begin, end, None)
        })
        .collect()
}
