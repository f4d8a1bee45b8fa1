use ringdelve_core::{
    Ammunition, Command, EntityId, EntityKind, EntityType, RangedWeapon, Segment, Stats, Vec2,
};

use crate::ai::AiController;

/// Command currently executed by an entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandState {
    /// Live command, or `None` while the entity is idle.
    pub current: Option<Command>,
    /// Ticks the live command has been stepped.
    pub tick_count: u32,
}

impl CommandState {
    /// Installs a fresh command.
    pub(crate) fn install(&mut self, command: Command) {
        self.current = Some(command);
        self.tick_count = 0;
    }
}

/// Mutable instance of an entity template living in the game arena.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Stable identifier; never reused within a game.
    pub id: EntityId,
    /// Template the entity was created from.
    pub kind: EntityKind,
    /// Current world position.
    pub position: Vec2,
    /// Vital statistics; props carry none.
    pub stats: Option<Stats>,
    /// Item owned by the entity. Held items never appear in a level.
    pub held: Option<EntityId>,
    /// Loaded rounds, present exactly when the template is a ranged weapon.
    pub ammunition: Option<Ammunition>,
    /// Command currently executed by the entity.
    pub command_state: CommandState,
    /// Strategy choosing commands while the entity is idle.
    pub controller: Option<AiController>,
    /// Tick on which the entity was last damaged.
    pub last_hit_tick: Option<u64>,
    /// Whether presentation layers should draw the entity.
    pub is_visible: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind, position: Vec2) -> Self {
        let definition = kind.definition();
        Self {
            id,
            kind,
            position,
            stats: definition.initial_stats,
            held: None,
            ammunition: definition.ranged_weapon.map(|weapon| Ammunition {
                loaded: weapon.ammo_capacity,
            }),
            command_state: CommandState::default(),
            controller: definition.controller.map(AiController::from_kind),
            last_hit_tick: None,
            is_visible: true,
        }
    }

    /// Template shared by every entity of this kind.
    #[must_use]
    pub fn definition(&self) -> &'static EntityType {
        self.kind.definition()
    }

    /// Physical radius of the entity.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.definition().scale
    }

    /// Ranged weapon parameters when the entity itself is a gun.
    #[must_use]
    pub fn ranged_weapon(&self) -> Option<&'static RangedWeapon> {
        self.definition().ranged_weapon.as_ref()
    }

    /// Whether the entity has stats and positive health.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.is_some_and(|stats| stats.health > 0)
    }

    /// Whether the entity is executing a command.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.command_state.current.is_some()
    }

    /// Segment of width `scale` through the entity, facing a ray travelling
    /// along `direction`.
    #[must_use]
    pub fn silhouette(&self, direction: Vec2) -> Segment {
        let across = direction.normalize_or_zero().perp() * (self.scale() * 0.5);
        Segment::from_points(self.position - across, self.position + across)
    }
}
