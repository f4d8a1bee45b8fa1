use rand::{seq::SliceRandom, Rng};
use ringdelve_core::{GenerationError, TileCoord};

use crate::{
    maze::{clear_walls, random_rings},
    options::ring_tile_counts,
    LayoutOptions, Map, Maze, MazeOptions, Tile,
};

/// Number of mazes rolled before generation gives up on finding an exit.
pub const MAX_GENERATION_ATTEMPTS: u32 = 32;

/// Maze plus the tiles chosen for the entry, the exit and hostile spawns.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    /// Generated tiles and navigation graph.
    pub maze: Maze,
    /// Walls extracted from the maze.
    pub map: Map,
    /// Tile the player arrives on; both of its walls are open.
    pub entry: TileCoord,
    /// Tile reachable from the entry that leads onward.
    pub exit: TileCoord,
    /// Reachable tiles, distinct from entry and exit, that spawn hostiles.
    pub spawns: Vec<TileCoord>,
}

/// Generates a maze whose exit is always reachable from its entry.
///
/// Mazes in which the entry is cut off are discarded and rolled again up to
/// [`MAX_GENERATION_ATTEMPTS`] times.
pub fn generate_level<R: Rng + ?Sized>(
    options: &MazeOptions,
    layout: &LayoutOptions,
    rng: &mut R,
) -> Result<GeneratedLevel, GenerationError> {
    let tile_count: usize = ring_tile_counts(options)?
        .iter()
        .map(|&count| count as usize)
        .sum();
    if tile_count < 2 {
        return Err(GenerationError::TooFewTiles(tile_count));
    }

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let mut rings = random_rings(options, rng)?;
        let entry = tile_by_index(&rings, rng.gen_range(0..tile_count));
        clear_walls(&mut rings, entry);
        let maze = Maze::from_rings(options.radius, rings)?;

        let reachable: Vec<TileCoord> = maze
            .nav_mesh()
            .reachable_from(entry)
            .into_iter()
            .filter(|&coord| coord != entry)
            .collect();
        let Some(&exit) = reachable.choose(rng) else {
            log::warn!("maze attempt {attempt} has no exit reachable from {entry:?}; rerolling");
            continue;
        };

        let free: Vec<TileCoord> = reachable
            .into_iter()
            .filter(|&coord| coord != exit)
            .collect();
        let spawn_count = spawn_count(free.len(), layout, rng);
        let spawns = free.choose_multiple(rng, spawn_count).copied().collect();

        log::debug!(
            "generated maze with {tile_count} tiles on attempt {attempt}: entry {entry:?}, exit {exit:?}, {spawn_count} spawns"
        );
        return Ok(GeneratedLevel {
            map: Map::from_maze(&maze),
            maze,
            entry,
            exit,
            spawns,
        });
    }

    Err(GenerationError::UnreachableExit {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

fn spawn_count<R: Rng + ?Sized>(free: usize, layout: &LayoutOptions, rng: &mut R) -> usize {
    let low = layout.min_spawn_fraction.min(layout.max_spawn_fraction).max(0.0);
    let high = layout.max_spawn_fraction.max(layout.min_spawn_fraction).min(1.0);
    let fraction = if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    };
    ((free as f64 * fraction).round() as usize).min(free)
}

fn tile_by_index(rings: &[Vec<Tile>], mut index: usize) -> TileCoord {
    for (ring, tiles) in rings.iter().enumerate() {
        if index < tiles.len() {
            return TileCoord::new(ring as u32, index as u32);
        }
        index -= tiles.len();
    }
    TileCoord::CENTER
}
