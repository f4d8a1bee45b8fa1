#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ringdelve engine.
//!
//! This crate defines the plain data that flows between the pure systems
//! (ray casting, visibility, maze generation), the authoritative world and
//! the adapters. Adapters install [`Command`] values on entities, the world
//! advances them one tick at a time and reports what happened through
//! [`GameEvent`] values. Entity templates are process-wide statics addressed
//! by [`EntityKind`].

pub use glam::Vec2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Straight wall or silhouette segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint of the segment.
    pub p1: Vec2,
    /// Second endpoint of the segment.
    pub p2: Vec2,
}

impl Segment {
    /// Creates a segment from raw coordinates.
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            p1: Vec2::new(x1, y1),
            p2: Vec2::new(x2, y2),
        }
    }

    /// Creates a segment spanning the two provided points.
    #[must_use]
    pub const fn from_points(p1: Vec2, p2: Vec2) -> Self {
        Self { p1, p2 }
    }

    /// Length of the segment in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.p1.distance(self.p2)
    }

    /// Point halfway between both endpoints.
    #[must_use]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }
}

/// Location of a maze tile expressed as ring and tile indices.
///
/// Ring zero holds the single innermost tile. Tile indices grow clockwise
/// within a ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    ring: u32,
    tile: u32,
}

impl TileCoord {
    /// The single innermost tile.
    pub const CENTER: Self = Self::new(0, 0);

    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(ring: u32, tile: u32) -> Self {
        Self { ring, tile }
    }

    /// Zero-based ring index counted outward from the centre.
    #[must_use]
    pub const fn ring(&self) -> u32 {
        self.ring
    }

    /// Zero-based tile index within the ring.
    #[must_use]
    pub const fn tile(&self) -> u32 {
        self.tile
    }
}

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual colour of an entity, opaque to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EntityColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a colour from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            red: ((hex >> 16) & 0xff) as u8,
            green: ((hex >> 8) & 0xff) as u8,
            blue: (hex & 0xff) as u8,
        }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Shape a presentation layer should use for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Appearance {
    /// Round actor marker.
    Ring,
    /// Staircase leading down.
    StairsDown,
    /// Staircase leading up.
    StairsUp,
    /// Carried item.
    Item,
}

/// Mutable vital statistics of a living entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    /// Distance multiplier applied to every movement step.
    pub move_speed: f32,
    /// Remaining health; the entity dies at zero or below.
    pub health: i32,
    /// Health the entity starts with.
    pub max_health: i32,
}

/// Dice expression such as `2d6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiceRoll {
    /// Number of dice thrown.
    pub count: u32,
    /// Number of faces on each die.
    pub sides: u32,
}

impl DiceRoll {
    /// Creates a new dice expression.
    #[must_use]
    pub const fn new(count: u32, sides: u32) -> Self {
        Self { count, sides }
    }

    /// Smallest total the expression can produce.
    #[must_use]
    pub const fn min(&self) -> u32 {
        if self.sides == 0 {
            0
        } else {
            self.count
        }
    }

    /// Largest total the expression can produce.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.count * self.sides
    }
}

/// Parameters of a weapon able to fire projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedWeapon {
    /// Accuracy in `0.0..=1.0`; higher values narrow the spread cone.
    pub accuracy: f32,
    /// Dice rolled for damage.
    pub damage_roll: DiceRoll,
    /// Flat damage added to every roll.
    pub damage_bonus: i32,
    /// Ticks spent aiming before the shot leaves the weapon.
    pub steady_tick_count: u32,
    /// Ticks spent recovering after the shot.
    pub recover_tick_count: u32,
    /// Rounds held by a full magazine.
    pub ammo_capacity: u32,
    /// Rounds restored by a single reload.
    pub reload_count: u32,
    /// Ticks a reload takes.
    pub reload_tick_count: u32,
}

impl RangedWeapon {
    /// Total number of ticks a single attack occupies.
    #[must_use]
    pub const fn attack_tick_count(&self) -> u32 {
        self.steady_tick_count + self.recover_tick_count
    }
}

/// Rounds currently loaded into a ranged weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ammunition {
    /// Number of rounds ready to fire.
    pub loaded: u32,
}

/// Names the AI strategy attached to entities of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    /// Wanders between random points of the level.
    RandomMovement,
    /// Hunts and shoots the player.
    Enemy,
}

/// Command produced when an entity of a type is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UseCommand {
    /// Takes the stairs in the given direction.
    TakeStairs {
        /// Whether the stairs lead up.
        up: bool,
    },
}

impl UseCommand {
    /// Builds the fresh command triggered by using the entity.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::TakeStairs { up } => Command::take_stairs(up),
        }
    }
}

/// Identity of an entity template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player character.
    Human,
    /// Hostile gunner.
    Orc,
    /// Harmless wanderer.
    Rat,
    /// Sidearm carried by humans and orcs.
    Pistol,
    /// Staircase leading to the level below.
    StairsDown,
    /// Staircase leading to the level above.
    StairsUp,
}

impl EntityKind {
    /// Every template shipped with the game.
    pub const ALL: [Self; 6] = [
        Self::Human,
        Self::Orc,
        Self::Rat,
        Self::Pistol,
        Self::StairsDown,
        Self::StairsUp,
    ];

    /// Immutable template shared by every entity of this kind.
    #[must_use]
    pub fn definition(self) -> &'static EntityType {
        match self {
            Self::Human => &HUMAN,
            Self::Orc => &ORC,
            Self::Rat => &RAT,
            Self::Pistol => &PISTOL,
            Self::StairsDown => &STAIRS_DOWN,
            Self::StairsUp => &STAIRS_UP,
        }
    }
}

/// Immutable template describing a family of entities.
#[derive(Debug, PartialEq)]
pub struct EntityType {
    /// Noun used in event messages.
    pub noun: &'static str,
    /// Shape used by presentation layers.
    pub appearance: Appearance,
    /// Colour used by presentation layers.
    pub color: EntityColor,
    /// Physical radius of the entity in world units.
    pub scale: f32,
    /// Statistics copied into new entities; `None` for props.
    pub initial_stats: Option<Stats>,
    /// Item placed in the hands of new entities.
    pub initial_held: Option<EntityKind>,
    /// AI strategy attached to new entities.
    pub controller: Option<ControllerKind>,
    /// Command installed on the user when the entity is used.
    pub use_command: Option<UseCommand>,
    /// Ranged weapon parameters when the entity is a gun.
    pub ranged_weapon: Option<RangedWeapon>,
}

static HUMAN: EntityType = EntityType {
    noun: "human",
    appearance: Appearance::Ring,
    color: EntityColor::from_hex(0x5555ff),
    scale: 5.0,
    initial_stats: Some(Stats {
        move_speed: 5.0,
        health: 10,
        max_health: 10,
    }),
    initial_held: Some(EntityKind::Pistol),
    controller: None,
    use_command: None,
    ranged_weapon: None,
};

static ORC: EntityType = EntityType {
    noun: "orc",
    appearance: Appearance::Ring,
    color: EntityColor::from_hex(0x33ff33),
    scale: 5.0,
    initial_stats: Some(Stats {
        move_speed: 3.0,
        health: 6,
        max_health: 6,
    }),
    initial_held: Some(EntityKind::Pistol),
    controller: Some(ControllerKind::Enemy),
    use_command: None,
    ranged_weapon: None,
};

static RAT: EntityType = EntityType {
    noun: "rat",
    appearance: Appearance::Ring,
    color: EntityColor::from_hex(0x8b5a2b),
    scale: 2.5,
    initial_stats: Some(Stats {
        move_speed: 4.0,
        health: 2,
        max_health: 2,
    }),
    initial_held: None,
    controller: Some(ControllerKind::RandomMovement),
    use_command: None,
    ranged_weapon: None,
};

static PISTOL: EntityType = EntityType {
    noun: "pistol",
    appearance: Appearance::Item,
    color: EntityColor::from_hex(0xaaaaaa),
    scale: 1.0,
    initial_stats: None,
    initial_held: None,
    controller: None,
    use_command: None,
    ranged_weapon: Some(RangedWeapon {
        accuracy: 0.75,
        damage_roll: DiceRoll::new(1, 6),
        damage_bonus: 0,
        steady_tick_count: 4,
        recover_tick_count: 2,
        ammo_capacity: 6,
        reload_count: 6,
        reload_tick_count: 12,
    }),
};

static STAIRS_DOWN: EntityType = EntityType {
    noun: "stairs down",
    appearance: Appearance::StairsDown,
    color: EntityColor::from_hex(0xffffff),
    scale: 4.0,
    initial_stats: None,
    initial_held: None,
    controller: None,
    use_command: Some(UseCommand::TakeStairs { up: false }),
    ranged_weapon: None,
};

static STAIRS_UP: EntityType = EntityType {
    noun: "stairs up",
    appearance: Appearance::StairsUp,
    color: EntityColor::from_hex(0xffffff),
    scale: 4.0,
    initial_stats: None,
    initial_held: None,
    controller: None,
    use_command: Some(UseCommand::TakeStairs { up: true }),
    ranged_weapon: None,
};

/// Multi-tick behaviour executed by a single entity.
///
/// Variants carry their own progress counters so that a command can be
/// stepped without consulting anything but the entity and the game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Waits for the remaining number of ticks.
    Idle {
        /// Ticks left before the command completes.
        remaining: u32,
    },
    /// Walks in a straight line toward the target.
    Move {
        /// Destination of the walk.
        target: Vec2,
    },
    /// Channels a staircase transition.
    TakeStairs {
        /// Whether the stairs lead up.
        up: bool,
        /// Ticks already spent on the stairs.
        elapsed: u32,
    },
    /// Aims, fires and recovers at a target entity.
    RangedAttack {
        /// Entity the shot is aimed at.
        target: EntityId,
        /// Ticks already spent on the attack.
        elapsed: u32,
    },
    /// Refills the held weapon's magazine.
    Reload {
        /// Ticks already spent reloading.
        elapsed: u32,
    },
}

impl Command {
    /// Creates an idle command lasting `ticks` ticks.
    #[must_use]
    pub const fn idle(ticks: u32) -> Self {
        Self::Idle { remaining: ticks }
    }

    /// Creates a move command toward `target`.
    #[must_use]
    pub const fn move_to(target: Vec2) -> Self {
        Self::Move { target }
    }

    /// Creates a fresh stairs command.
    #[must_use]
    pub const fn take_stairs(up: bool) -> Self {
        Self::TakeStairs { up, elapsed: 0 }
    }

    /// Creates a fresh ranged attack against `target`.
    #[must_use]
    pub const fn ranged_attack(target: EntityId) -> Self {
        Self::RangedAttack { target, elapsed: 0 }
    }

    /// Creates a fresh reload command.
    #[must_use]
    pub const fn reload() -> Self {
        Self::Reload { elapsed: 0 }
    }
}

/// Outcome of stepping a command by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    /// The command needs more ticks.
    InProgress,
    /// The command finished during this tick.
    Complete,
}

/// Overall state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// The run is in progress.
    Running,
    /// The player climbed past the last level.
    Victory,
    /// The player died or left the dungeon.
    GameOver,
}

/// Line drawn by a presentation layer for a ranged attack.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Muzzle position.
    pub from: Vec2,
    /// Point where the projectile stopped.
    pub to: Vec2,
    /// Whether the projectile struck an entity.
    pub is_hit: bool,
}

/// Immutable log record produced while advancing the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Narrative text shown to the player.
    pub message: String,
    /// Projectile traces attached to the event.
    pub traces: Vec<Trace>,
}

impl GameEvent {
    /// Creates an event carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            traces: Vec::new(),
        }
    }

    /// Attaches a projectile trace to the event.
    #[must_use]
    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }
}

/// Contract violations raised by the world.
///
/// These abort the current operation; they indicate a corrupted level or a
/// misused API and are never part of normal play.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GameError {
    /// The entity handle does not refer to a live entity.
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    /// The entity has no statistics.
    #[error("entity {0:?} has no stats")]
    MissingStats(EntityId),
    /// The entity holds nothing.
    #[error("entity {0:?} holds no item")]
    MissingHeldItem(EntityId),
    /// The entity's held item is not a ranged weapon.
    #[error("item held by entity {0:?} is not a ranged weapon")]
    MissingRangedWeapon(EntityId),
    /// The ranged weapon carries no ammunition component.
    #[error("weapon {0:?} has no ammunition")]
    MissingAmmunition(EntityId),
    /// The entity is already executing a command.
    #[error("entity {0:?} is already executing a command")]
    EntityBusy(EntityId),
    /// `tick` was called while the player has no command.
    #[error("the player is waiting for a command")]
    WaitingForCommand,
    /// The run is over or has not started.
    #[error("the game is not running")]
    NotRunning,
    /// No level has been entered yet.
    #[error("no level has been entered")]
    NoCurrentLevel,
    /// A level index outside the generated levels was addressed.
    #[error("level {0} does not exist")]
    UnknownLevel(usize),
    /// The level does not contain exactly one staircase of the kind.
    #[error("expected exactly one {kind:?} on the level, found {found}")]
    MissingStairs {
        /// Kind of staircase looked up.
        kind: EntityKind,
        /// Number of matching entities present.
        found: usize,
    },
    /// Only the player can move between levels.
    #[error("entity {0:?} cannot take stairs")]
    StairsRequirePlayer(EntityId),
}

/// Failures raised while generating mazes and levels.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// A maze needs at least one ring.
    #[error("a maze requires at least one ring")]
    NoRings,
    /// A dungeon needs at least one level.
    #[error("a dungeon requires at least one level")]
    NoLevels,
    /// A ring does not hold the same or double the tiles of its parent.
    #[error("ring {ring} holds {count} tiles but its parent holds {parent}")]
    InvalidRing {
        /// Offending ring index.
        ring: u32,
        /// Tiles in the offending ring.
        count: u32,
        /// Tiles in the parent ring.
        parent: u32,
    },
    /// The maze has too few tiles to place an entry and an exit.
    #[error("a level requires at least two tiles, found {0}")]
    TooFewTiles(usize),
    /// Every attempt produced an entry with no other reachable tile.
    #[error("no reachable exit after {attempts} attempts")]
    UnreachableExit {
        /// Number of mazes rolled.
        attempts: u32,
    },
    /// A generation setting lies outside its supported range.
    #[error("invalid {option}: {reason}")]
    InvalidOption {
        /// Name of the offending setting as it appears in configuration.
        option: &'static str,
        /// What the setting must satisfy.
        reason: &'static str,
    },
    /// The settings ask for more tiles than a single maze may hold.
    #[error("a maze may hold at most {limit} tiles")]
    TooManyTiles {
        /// Largest supported tile count.
        limit: usize,
    },
}
