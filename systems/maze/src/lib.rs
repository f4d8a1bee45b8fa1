#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Radial maze generation, wall extraction and tile navigation.
//!
//! A maze is a stack of concentric rings. Ring zero holds a single tile and
//! every other ring holds either the same number of tiles as the ring inside
//! it or exactly twice as many, so that each tile has exactly one parent.

mod level;
mod map;
mod maze;
mod navmesh;
mod options;

pub use level::{generate_level, GeneratedLevel, MAX_GENERATION_ATTEMPTS};
pub use map::Map;
pub use maze::{Maze, Tile};
pub use navmesh::NavMesh;
pub use options::{
    ring_tile_counts, slice_sphere, LayoutOptions, MazeOptions, SphereOptions, MAX_LEVEL_COUNT,
    MAX_TILE_COUNT,
};
