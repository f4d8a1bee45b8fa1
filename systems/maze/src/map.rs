use std::f32::consts::PI;

use ringdelve_core::Segment;

use crate::{maze::polar, Maze};

/// Longest arc approximated by a single wall chord.
const MAX_CHORD_ANGLE: f32 = PI / 16.0;

/// Slack keeping exact multiples of the chord angle from rounding up.
const CHORD_SLACK: f32 = 1e-3;

/// Flat list of wall segments derived from a maze.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    walls: Vec<Segment>,
}

impl Map {
    /// Extracts the walls of every blocked tile edge plus the outer boundary.
    ///
    /// Inner arcs are approximated by chords. Rings with a single tile have no
    /// radial walls.
    #[must_use]
    pub fn from_maze(maze: &Maze) -> Self {
        let depth = maze.ring_depth();
        let mut walls = Vec::new();

        for (coord, tile) in maze.tiles() {
            let Some(angle) = maze.tile_angle(coord.ring()) else {
                continue;
            };
            let start = angle * coord.tile() as f32;
            let inner = coord.ring() as f32 * depth;

            if tile.inner_blocked && coord.ring() > 0 {
                push_arc(&mut walls, inner, start, start + angle);
            }
            if tile.clockwise_blocked && maze.ring_len(coord.ring()) > Some(1) {
                let edge = start + angle;
                walls.push(Segment::from_points(
                    polar(inner, edge),
                    polar(inner + depth, edge),
                ));
            }
        }

        let outermost = maze.ring_count().saturating_sub(1);
        if let (Some(len), Some(angle)) = (maze.ring_len(outermost), maze.tile_angle(outermost)) {
            for tile in 0..len {
                let start = angle * tile as f32;
                push_arc(&mut walls, maze.radius(), start, start + angle);
            }
        }

        Self { walls }
    }

    /// Creates a map from explicit wall segments.
    #[must_use]
    pub fn from_walls(walls: Vec<Segment>) -> Self {
        Self { walls }
    }

    /// Every wall segment of the map.
    #[must_use]
    pub fn walls(&self) -> &[Segment] {
        &self.walls
    }
}

fn push_arc(walls: &mut Vec<Segment>, radius: f32, from: f32, to: f32) {
    let chords = ((to - from) / MAX_CHORD_ANGLE - CHORD_SLACK).ceil().max(1.0) as u32;
    let step = (to - from) / chords as f32;
    walls.extend((0..chords).map(|chord| {
        let a = from + step * chord as f32;
        Segment::from_points(polar(radius, a), polar(radius, a + step))
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    #[test]
    fn open_single_ring_only_has_boundary() {
        let maze = Maze::from_rings(10.0, vec![vec![Tile::default()]]).expect("valid maze");
        let map = Map::from_maze(&maze);
        assert_eq!(map.walls().len(), 32);
        for wall in map.walls() {
            assert!((wall.p1.length() - 10.0).abs() < 1e-4);
            assert!((wall.p2.length() - 10.0).abs() < 1e-4);
        }
    }

    #[test]
    fn blocked_edges_add_walls() {
        let mut rings = vec![vec![Tile::default()], vec![Tile::default(); 2]];
        rings[1][0] = Tile {
            inner_blocked: true,
            clockwise_blocked: true,
        };
        let maze = Maze::from_rings(20.0, rings).expect("valid maze");
        let map = Map::from_maze(&maze);

        // Half-circle inner arc, one radial wall and the full boundary.
        assert_eq!(map.walls().len(), 16 + 1 + 32);
        let radial = map
            .walls()
            .iter()
            .find(|wall| (wall.p1.length() - 10.0).abs() < 1e-4 && (wall.p2.length() - 20.0).abs() < 1e-4)
            .expect("radial wall");
        assert!((radial.p1.x + 10.0).abs() < 1e-4);
        assert!(radial.p1.y.abs() < 1e-4);
    }
}
