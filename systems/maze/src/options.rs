use std::f32::consts::TAU;

use ringdelve_core::GenerationError;
use serde::Deserialize;

/// Largest number of tiles a single maze may hold.
pub const MAX_TILE_COUNT: usize = 1 << 16;
/// Largest number of levels a sphere may be sliced into.
pub const MAX_LEVEL_COUNT: u32 = 256;

/// Parameters of a single radial maze.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MazeOptions {
    /// Outer radius of the maze in world units.
    pub radius: f32,
    /// Number of concentric rings; every ring has depth `radius / ring_count`.
    pub ring_count: u32,
    /// Target arc width of a tile measured on the ring's outer edge.
    pub min_tile_width: f32,
    /// Probability that each individual tile wall is closed.
    pub block_chance: f64,
}

impl MazeOptions {
    /// Checks that every setting lies in the range generation supports.
    pub fn validate(&self) -> Result<(), GenerationError> {
        positive("radius", self.radius)?;
        positive("min_tile_width", self.min_tile_width)?;
        probability("block_chance", self.block_chance)?;
        if self.ring_count == 0 {
            return Err(GenerationError::NoRings);
        }
        if self.ring_count as usize > MAX_TILE_COUNT {
            return Err(GenerationError::TooManyTiles {
                limit: MAX_TILE_COUNT,
            });
        }
        Ok(())
    }
}

impl Default for MazeOptions {
    fn default() -> Self {
        Self {
            radius: 150.0,
            ring_count: 6,
            min_tile_width: 25.0,
            block_chance: 0.4,
        }
    }
}

/// Parameters of the sphere sliced into a stack of levels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SphereOptions {
    /// Radius of the sphere.
    pub radius: f32,
    /// Height of the polar caps removed before slicing; larger caps keep the
    /// top and bottom levels from becoming tiny.
    pub cap_height: f32,
    /// Number of slices, one per level.
    pub slice_count: u32,
    /// Probability that each individual tile wall is closed.
    pub block_chance: f64,
    /// Minimum depth of a ring; smaller slices get fewer rings.
    pub min_ring_depth: f32,
    /// Target arc width of a tile.
    pub min_tile_width: f32,
}

impl SphereOptions {
    /// Checks that every setting lies in the range slicing supports.
    pub fn validate(&self) -> Result<(), GenerationError> {
        positive("radius", self.radius)?;
        positive("min_ring_depth", self.min_ring_depth)?;
        positive("min_tile_width", self.min_tile_width)?;
        probability("block_chance", self.block_chance)?;
        if !(self.cap_height > 0.0 && self.cap_height < self.radius) {
            return Err(GenerationError::InvalidOption {
                option: "cap_height",
                reason: "must be positive and smaller than the radius",
            });
        }
        if self.slice_count == 0 {
            return Err(GenerationError::NoLevels);
        }
        if self.slice_count > MAX_LEVEL_COUNT {
            return Err(GenerationError::InvalidOption {
                option: "slice_count",
                reason: "must not exceed 256 levels",
            });
        }
        Ok(())
    }
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 150.0,
            cap_height: 30.0,
            slice_count: 5,
            block_chance: 0.4,
            min_ring_depth: 20.0,
            min_tile_width: 25.0,
        }
    }
}

/// Parameters controlling how a generated maze is populated.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Lower bound of the fraction of free reachable tiles that spawn hostiles.
    pub min_spawn_fraction: f64,
    /// Upper bound of the fraction of free reachable tiles that spawn hostiles.
    pub max_spawn_fraction: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_spawn_fraction: 0.05,
            max_spawn_fraction: 0.10,
        }
    }
}

fn positive(option: &'static str, value: f32) -> Result<(), GenerationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GenerationError::InvalidOption {
            option,
            reason: "must be a positive finite number",
        })
    }
}

fn probability(option: &'static str, value: f64) -> Result<(), GenerationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GenerationError::InvalidOption {
            option,
            reason: "must lie between 0 and 1",
        })
    }
}

/// Number of tiles in each ring of a maze built from `options`.
///
/// Ring zero always has one tile. Outer rings use the next power of two that
/// fits their circumference, clamped so a ring holds the same or double the
/// tiles of its parent. Layouts exceeding [`MAX_TILE_COUNT`] tiles in total
/// are rejected.
pub fn ring_tile_counts(options: &MazeOptions) -> Result<Vec<u32>, GenerationError> {
    options.validate()?;
    let too_many = GenerationError::TooManyTiles {
        limit: MAX_TILE_COUNT,
    };

    let depth = options.radius / options.ring_count as f32;
    let mut counts = Vec::with_capacity(options.ring_count as usize);
    counts.push(1_u32);
    let mut total = 1_usize;
    for ring in 1..options.ring_count {
        let circumference = TAU * (ring + 1) as f32 * depth;
        let fitting = (circumference / options.min_tile_width).ceil().max(1.0) as u32;
        let parent = counts[counts.len() - 1];
        let doubled = parent.checked_mul(2).ok_or_else(|| too_many.clone())?;
        let count = fitting
            .checked_next_power_of_two()
            .map_or(doubled, |power| power.clamp(parent, doubled));

        total += count as usize;
        if total > MAX_TILE_COUNT {
            return Err(too_many);
        }
        counts.push(count);
    }
    Ok(counts)
}

/// Maze options for every horizontal slice of the sphere, top to bottom.
pub fn slice_sphere(options: &SphereOptions) -> Result<Vec<MazeOptions>, GenerationError> {
    options.validate()?;

    let total_height = (options.radius - options.cap_height) * 2.0;
    let slice_height = total_height / options.slice_count as f32;
    (0..options.slice_count)
        .map(|slice| {
            let height = total_height / 2.0 - slice_height * slice as f32;
            let radius = (options.radius.powi(2) - height.powi(2)).max(0.0).sqrt();
            let rings = (radius / options.min_ring_depth).floor();
            if rings > MAX_TILE_COUNT as f32 {
                return Err(GenerationError::TooManyTiles {
                    limit: MAX_TILE_COUNT,
                });
            }
            Ok(MazeOptions {
                radius,
                ring_count: (rings as u32).max(1),
                min_tile_width: options.min_tile_width,
                block_chance: options.block_chance,
            })
        })
        .collect()
}
