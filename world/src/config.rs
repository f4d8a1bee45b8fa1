use ringdelve_system_maze::{LayoutOptions, SphereOptions};
use serde::Deserialize;

/// Seed used when a configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Everything needed to generate a run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed of the game's random number generator.
    pub seed: u64,
    /// Shape of the sphere sliced into levels.
    pub sphere: SphereOptions,
    /// How each level is populated.
    pub layout: LayoutOptions,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            sphere: SphereOptions::default(),
            layout: LayoutOptions::default(),
        }
    }
}
