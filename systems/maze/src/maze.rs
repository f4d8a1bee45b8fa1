use std::f32::consts::TAU;

use rand::Rng;
use ringdelve_core::{GenerationError, TileCoord, Vec2};

use crate::{navmesh::NavMesh, options::ring_tile_counts, MazeOptions};

/// Wall flags of a single maze tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Wall between the tile and its parent in the ring inside.
    pub inner_blocked: bool,
    /// Wall between the tile and the next tile clockwise.
    pub clockwise_blocked: bool,
}

/// Concentric rings of tiles plus the navigation graph derived from them.
#[derive(Clone, Debug)]
pub struct Maze {
    radius: f32,
    rings: Vec<Vec<Tile>>,
    nav_mesh: NavMesh,
}

impl Maze {
    /// Builds a maze from explicit tile rings.
    ///
    /// The centre tile's inner wall is always cleared.
    pub fn from_rings(radius: f32, mut rings: Vec<Vec<Tile>>) -> Result<Self, GenerationError> {
        validate_rings(&rings)?;
        rings[0][0].inner_blocked = false;

        let mut maze = Self {
            radius,
            rings,
            nav_mesh: NavMesh::default(),
        };
        maze.nav_mesh = NavMesh::build(&maze);
        Ok(maze)
    }

    /// Generates a maze whose walls are closed independently with the
    /// configured probability.
    pub fn generate<R: Rng + ?Sized>(
        options: &MazeOptions,
        rng: &mut R,
    ) -> Result<Self, GenerationError> {
        Self::from_rings(options.radius, random_rings(options, rng)?)
    }

    /// Outer radius of the maze.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Depth of every ring.
    #[must_use]
    pub fn ring_depth(&self) -> f32 {
        self.radius / self.rings.len() as f32
    }

    /// Number of rings.
    #[must_use]
    pub fn ring_count(&self) -> u32 {
        self.rings.len() as u32
    }

    /// Number of tiles in `ring`, if the ring exists.
    #[must_use]
    pub fn ring_len(&self, ring: u32) -> Option<u32> {
        self.rings.get(ring as usize).map(|tiles| tiles.len() as u32)
    }

    /// Total number of tiles across every ring.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// Wall flags of the tile at `coord`.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.rings
            .get(coord.ring() as usize)?
            .get(coord.tile() as usize)
    }

    /// Iterates every tile, innermost ring first.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        self.rings.iter().enumerate().flat_map(|(ring, tiles)| {
            tiles
                .iter()
                .enumerate()
                .map(move |(tile, flags)| (TileCoord::new(ring as u32, tile as u32), flags))
        })
    }

    /// Navigation graph over the tiles.
    #[must_use]
    pub fn nav_mesh(&self) -> &NavMesh {
        &self.nav_mesh
    }

    /// Angle subtended by each tile of `ring`.
    #[must_use]
    pub fn tile_angle(&self, ring: u32) -> Option<f32> {
        self.ring_len(ring).map(|len| TAU / len as f32)
    }

    /// World position of the centre of a tile.
    #[must_use]
    pub fn tile_center(&self, coord: TileCoord) -> Option<Vec2> {
        let _ = self.tile(coord)?;
        if coord.ring() == 0 {
            return Some(Vec2::ZERO);
        }
        let angle = self.tile_angle(coord.ring())? * (coord.tile() as f32 + 0.5);
        Some(polar((coord.ring() as f32 + 0.5) * self.ring_depth(), angle))
    }

    /// Tile containing `point`, or `None` outside the maze.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<TileCoord> {
        let distance = point.length();
        if distance >= self.radius {
            return None;
        }
        let ring = ((distance / self.ring_depth()) as u32).min(self.ring_count() - 1);
        let len = self.ring_len(ring)?;
        let angle = point.y.atan2(point.x).rem_euclid(TAU);
        let tile = ((angle / TAU * len as f32) as u32).min(len - 1);
        Some(TileCoord::new(ring, tile))
    }

    /// Tile in the ring inside that `coord` opens onto.
    #[must_use]
    pub fn parent(&self, coord: TileCoord) -> Option<TileCoord> {
        if coord.ring() == 0 {
            return None;
        }
        let len = self.ring_len(coord.ring())?;
        let parent_ring = coord.ring() - 1;
        let parent_len = self.ring_len(parent_ring)?;
        let tile = if parent_len < len {
            coord.tile() / 2
        } else {
            coord.tile()
        };
        Some(TileCoord::new(parent_ring, tile))
    }

    /// Tiles in the ring outside whose parent is `coord`.
    #[must_use]
    pub fn children(&self, coord: TileCoord) -> Vec<TileCoord> {
        let (Some(len), Some(child_len)) = (
            self.ring_len(coord.ring()),
            self.ring_len(coord.ring() + 1),
        ) else {
            return Vec::new();
        };
        if coord.tile() >= len {
            return Vec::new();
        }
        let child_ring = coord.ring() + 1;
        if child_len > len {
            vec![
                TileCoord::new(child_ring, coord.tile() * 2),
                TileCoord::new(child_ring, coord.tile() * 2 + 1),
            ]
        } else {
            vec![TileCoord::new(child_ring, coord.tile())]
        }
    }

    /// Tile one step clockwise within the same ring.
    #[must_use]
    pub fn clockwise(&self, coord: TileCoord) -> Option<TileCoord> {
        let len = self.ring_len(coord.ring())?;
        Some(TileCoord::new(coord.ring(), (coord.tile() + 1) % len))
    }
}

/// Opens both walls of a tile so that it always connects to a neighbour.
pub(crate) fn clear_walls(rings: &mut [Vec<Tile>], coord: TileCoord) {
    if let Some(tile) = rings
        .get_mut(coord.ring() as usize)
        .and_then(|ring| ring.get_mut(coord.tile() as usize))
    {
        *tile = Tile::default();
    }
}

/// Tile rings with independently randomised walls.
pub(crate) fn random_rings<R: Rng + ?Sized>(
    options: &MazeOptions,
    rng: &mut R,
) -> Result<Vec<Vec<Tile>>, GenerationError> {
    let chance = options.block_chance;
    let rings: Vec<Vec<Tile>> = ring_tile_counts(options)?
        .into_iter()
        .enumerate()
        .map(|(ring, count)| {
            if ring == 0 {
                return vec![Tile::default()];
            }
            (0..count)
                .map(|_| Tile {
                    inner_blocked: rng.gen_bool(chance),
                    clockwise_blocked: rng.gen_bool(chance),
                })
                .collect()
        })
        .collect();
    Ok(rings)
}

pub(crate) fn polar(radius: f32, angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * radius
}

fn validate_rings(rings: &[Vec<Tile>]) -> Result<(), GenerationError> {
    let Some(center) = rings.first() else {
        return Err(GenerationError::NoRings);
    };
    if center.len() != 1 {
        return Err(GenerationError::InvalidRing {
            ring: 0,
            count: center.len() as u32,
            parent: 1,
        });
    }
    for (ring, pair) in rings.windows(2).enumerate() {
        let parent = pair[0].len();
        let count = pair[1].len();
        if count != parent && count != parent * 2 {
            return Err(GenerationError::InvalidRing {
                ring: ring as u32 + 1,
                count: count as u32,
                parent: parent as u32,
            });
        }
    }
    Ok(())
}
