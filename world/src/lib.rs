#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Ringdelve.
//!
//! [`Game`] owns every level, every entity and the random number generator.
//! Adapters install commands on the player through the public setters and
//! advance time with [`Game::tick`]; all other entities receive commands from
//! their [`AiController`].

mod ai;
mod commands;
mod config;
mod dice;
mod entity;
pub mod query;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ringdelve_core::{
    Ammunition, Command, CommandStatus, EntityId, EntityKind, GameError, GameEvent,
    GenerationError, RangedWeapon, RunState, Stats, TileCoord, Vec2,
};
use ringdelve_system_maze::{generate_level, slice_sphere, GeneratedLevel, Map, Maze};
use ringdelve_system_raycast::{cast_ray, cast_ray_detailed};

pub use ai::{AiController, EnemyMemory};
pub use config::{GameConfig, DEFAULT_SEED};
pub use entity::{CommandState, Entity};

/// Distance within which the player can use an entity.
pub const USE_REACH: f32 = 10.0;

/// Probability that a spawn point produces an orc rather than a rat.
const ORC_SPAWN_CHANCE: f64 = 0.75;

/// One floor of the dungeon.
#[derive(Clone, Debug)]
pub struct Level {
    entities: Vec<EntityId>,
    map: Map,
    maze: Maze,
}

impl Level {
    fn new(maze: Maze, map: Map) -> Self {
        Self {
            entities: Vec::new(),
            map,
            maze,
        }
    }

    /// Entities present on the level in the order they arrived.
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Walls of the level.
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Tiles and navigation graph of the level.
    #[must_use]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Whether the entity is present on the level.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }
}

/// First obstruction struck by [`Game::cast_ray_entities`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityHit {
    /// Distance from the ray origin.
    pub distance: f32,
    /// World position of the obstruction.
    pub point: Vec2,
    /// Entity struck, or `None` when a wall stopped the ray.
    pub entity: Option<EntityId>,
}

/// Authoritative simulation state.
#[derive(Debug)]
pub struct Game {
    levels: Vec<Level>,
    current_level: Option<usize>,
    entities: Vec<Option<Entity>>,
    player: EntityId,
    tick_count: u64,
    run_state: RunState,
    events: Vec<GameEvent>,
    rng: ChaCha8Rng,
}

impl Game {
    /// Generates one level per sphere slice and populates each with stairs
    /// and hostiles.
    ///
    /// Level zero is the topmost slice. The down stairs of every level sit on
    /// its entry tile and the up stairs on its exit tile.
    pub fn new(config: &GameConfig) -> Result<Self, GenerationError> {
        let slices = slice_sphere(&config.sphere)?;

        let mut game = Self::empty(config.seed);
        for (index, options) in slices.iter().enumerate() {
            let GeneratedLevel {
                maze,
                map,
                entry,
                exit,
                spawns,
            } = generate_level(options, &config.layout, &mut game.rng)?;
            let center = |coord: TileCoord| maze.tile_center(coord).unwrap_or(Vec2::ZERO);
            let entry = center(entry);
            let exit = center(exit);
            let spawns: Vec<Vec2> = spawns.into_iter().map(center).collect();

            game.levels.push(Level::new(maze, map));
            let _ = game.place(index, EntityKind::StairsDown, entry);
            let _ = game.place(index, EntityKind::StairsUp, exit);
            for position in spawns {
                let kind = if game.rng.gen_bool(ORC_SPAWN_CHANCE) {
                    EntityKind::Orc
                } else {
                    EntityKind::Rat
                };
                let _ = game.place(index, kind, position);
            }
        }

        log::info!(
            "generated {} levels from seed {:#x}",
            game.levels.len(),
            config.seed
        );
        Ok(game)
    }

    /// Creates a game over prebuilt mazes with no entities besides the
    /// player, who is not yet placed on any level.
    #[must_use]
    pub fn from_mazes(mazes: Vec<Maze>, seed: u64) -> Self {
        let mut game = Self::empty(seed);
        game.levels = mazes
            .into_iter()
            .map(|maze| {
                let map = Map::from_maze(&maze);
                Level::new(maze, map)
            })
            .collect();
        game
    }

    fn empty(seed: u64) -> Self {
        let mut game = Self {
            levels: Vec::new(),
            current_level: None,
            entities: Vec::new(),
            player: EntityId::new(0),
            tick_count: 0,
            run_state: RunState::Running,
            events: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        game.player = game.create(EntityKind::Human, Vec2::ZERO);
        game
    }

    /// Creates an entity from its template and adds it to a level.
    pub fn spawn(
        &mut self,
        level: usize,
        kind: EntityKind,
        position: Vec2,
    ) -> Result<EntityId, GameError> {
        if level >= self.levels.len() {
            return Err(GameError::UnknownLevel(level));
        }
        Ok(self.place(level, kind, position))
    }

    fn place(&mut self, level: usize, kind: EntityKind, position: Vec2) -> EntityId {
        let id = self.create(kind, position);
        self.levels[level].entities.push(id);
        id
    }

    fn create(&mut self, kind: EntityKind, position: Vec2) -> EntityId {
        let id = EntityId::new(self.entities.len() as u32);
        self.entities.push(Some(Entity::new(id, kind, position)));
        if let Some(held_kind) = kind.definition().initial_held {
            let held = self.create(held_kind, position);
            if let Some(entity) = self.entity_mut(id) {
                entity.held = Some(held);
            }
        }
        id
    }

    /// Handle of the player entity.
    #[must_use]
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current state of the run.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Number of levels in the dungeon.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Index of the level the player is on.
    #[must_use]
    pub fn current_level_index(&self) -> Option<usize> {
        self.current_level
    }

    /// Level the player is on.
    #[must_use]
    pub fn current_level(&self) -> Option<&Level> {
        self.levels.get(self.current_level?)
    }

    /// Level at `index`.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Live entity behind a handle.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.get() as usize)?.as_ref()
    }

    /// Mutable access to a live entity, for scenario setup.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.get() as usize)?.as_mut()
    }

    /// Every entity on the current level.
    #[must_use]
    pub fn visible_entities(&self) -> Vec<&Entity> {
        self.current_level()
            .map(|level| {
                level
                    .entities
                    .iter()
                    .filter_map(|&id| self.entity(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the entity is present on the current level.
    #[must_use]
    pub fn is_on_current_level(&self, id: EntityId) -> bool {
        self.current_level().is_some_and(|level| level.contains(id))
    }

    /// Enters level zero and places the player on its down stairs.
    pub fn start_game(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.levels.is_empty() {
            return Err(GameError::UnknownLevel(0));
        }
        let _ = self.enter_level(0);
        let stairs = self.find_single(0, EntityKind::StairsDown)?;
        let position = self.entity_ref(stairs)?.position;
        let player = self.player;
        self.entity_ref_mut(player)?.position = position;
        Ok(self.take_events())
    }

    /// Whether the run is waiting for the player to receive a command.
    #[must_use]
    pub fn is_waiting_for_command(&self) -> bool {
        self.run_state == RunState::Running
            && self
                .entity(self.player)
                .is_some_and(|player| !player.is_busy())
    }

    /// Advances every entity on the current level by one tick.
    ///
    /// Idle AI-controlled entities first receive a command from their
    /// controller. Processing stops early once the player changes level or
    /// the run ends.
    pub fn tick(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.run_state != RunState::Running {
            return Err(GameError::NotRunning);
        }
        if self.is_waiting_for_command() {
            return Err(GameError::WaitingForCommand);
        }
        let level = self.current_level.ok_or(GameError::NoCurrentLevel)?;

        let ids = self.levels[level].entities.clone();
        for id in ids {
            if self.current_level != Some(level) || self.run_state != RunState::Running {
                break;
            }
            if !self.levels[level].contains(id) {
                continue;
            }
            self.step_entity(id)?;
        }

        self.tick_count += 1;
        log::debug!("completed tick {}", self.tick_count);
        Ok(self.take_events())
    }

    fn step_entity(&mut self, id: EntityId) -> Result<(), GameError> {
        let is_player = id == self.player;
        let entity = self.entity_ref_mut(id)?;
        if !is_player && !entity.is_busy() {
            if let Some(mut controller) = entity.controller.take() {
                let decision = controller.next_command(id, self);
                if let Some(entity) = self.entity_mut(id) {
                    entity.controller = Some(controller);
                }
                let command = decision?;
                log::debug!("entity {id:?} chose {command:?}");
                if let Some(entity) = self.entity_mut(id) {
                    entity.command_state.install(command);
                }
            }
        }

        let Some(entity) = self.entity_mut(id) else {
            return Ok(());
        };
        let Some(mut command) = entity.command_state.current.take() else {
            return Ok(());
        };
        entity.command_state.tick_count += 1;

        let status = commands::advance(&mut command, id, self)?;
        if status == CommandStatus::InProgress {
            if let Some(entity) = self.entity_mut(id) {
                if entity.command_state.current.is_none() {
                    entity.command_state.current = Some(command);
                }
            }
        }
        Ok(())
    }

    /// Installs a move toward `point` on the player.
    ///
    /// The target is not clamped against walls; see
    /// [`Game::maximum_move_towards_point`].
    pub fn move_to(&mut self, point: Vec2) -> Result<(), GameError> {
        let player = self.player;
        let _ = self.stats(player)?;
        self.idle_entity(player)?
            .command_state
            .install(Command::move_to(point));
        Ok(())
    }

    /// Makes the player use `target`.
    ///
    /// Unusable and out-of-reach targets are reported as events and leave
    /// the player idle.
    pub fn use_entity(&mut self, target: EntityId) -> Result<(), GameError> {
        let player = self.player;
        let _ = self.idle_entity(player)?;
        let definition = self.entity_ref(target)?.definition();

        let Some(use_command) = definition.use_command else {
            self.push_event(GameEvent::message(format!(
                "You can't use the {}.",
                definition.noun
            )));
            return Ok(());
        };
        if !self.is_in_reach_of_player(target) {
            self.push_event(GameEvent::message(format!(
                "The {} is out of reach.",
                definition.noun
            )));
            return Ok(());
        }

        self.idle_entity(player)?
            .command_state
            .install(use_command.command());
        Ok(())
    }

    /// Makes `actor` shoot at `target` with its held weapon.
    ///
    /// Targets that cannot be shot are reported as events. An empty magazine
    /// is only discovered when the shot is fired.
    pub fn fire_at(&mut self, actor: EntityId, target: EntityId) -> Result<(), GameError> {
        let _ = self.idle_entity(actor)?;
        let _ = self.held_weapon(actor)?;
        let noun = self.entity_ref(target)?.definition().noun;

        if !self.can_fire(actor, target) {
            let predicate = format!("can't shoot the {noun}.");
            let message = self.sentence(actor, &predicate, &predicate);
            self.push_event(GameEvent::message(message));
            return Ok(());
        }

        self.idle_entity(actor)?
            .command_state
            .install(Command::ranged_attack(target));
        Ok(())
    }

    /// Makes the player wait for `ticks` ticks.
    pub fn rest(&mut self, ticks: u32) -> Result<(), GameError> {
        let player = self.player;
        self.idle_entity(player)?
            .command_state
            .install(Command::idle(ticks));
        Ok(())
    }

    /// Makes the player reload the held weapon.
    pub fn reload(&mut self) -> Result<(), GameError> {
        let player = self.player;
        let _ = self.held_weapon(player)?;
        self.idle_entity(player)?
            .command_state
            .install(Command::reload());
        Ok(())
    }

    /// Drains events raised since the last flush.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the entity defines a use command.
    #[must_use]
    pub fn is_usable(&self, target: EntityId) -> bool {
        self.entity(target)
            .is_some_and(|entity| entity.definition().use_command.is_some())
    }

    /// Whether `target` is close enough for the player to use.
    #[must_use]
    pub fn is_in_reach_of_player(&self, target: EntityId) -> bool {
        match (self.entity(self.player), self.entity(target)) {
            (Some(player), Some(target)) => {
                player.position.distance(target.position) <= USE_REACH
            }
            _ => false,
        }
    }

    /// Whether `actor` holds a ranged weapon and `target` is a living entity
    /// other than the actor.
    #[must_use]
    pub fn can_fire(&self, actor: EntityId, target: EntityId) -> bool {
        actor != target
            && self.held_weapon(actor).is_ok()
            && self.entity(target).is_some_and(Entity::is_alive)
    }

    /// Farthest point toward `point` the entity can reach without entering a
    /// wall on the current level.
    ///
    /// Targets closer than the first wall are returned unchanged.
    pub fn maximum_move_towards_point(
        &self,
        entity: EntityId,
        point: Vec2,
    ) -> Result<Vec2, GameError> {
        let mover = self.entity_ref(entity)?;
        let level = self.current_level_ref()?;
        let origin = mover.position;
        let offset = point - origin;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Ok(point);
        }

        let clearance = cast_ray(origin, offset, level.map.walls()) - mover.scale();
        if distance <= clearance {
            Ok(point)
        } else {
            Ok(origin + offset / distance * clearance.max(0.0))
        }
    }

    /// Uniformly random point inside the current level's disc.
    pub fn random_point_in_map(&mut self) -> Result<Vec2, GameError> {
        let radius = self.current_level_ref()?.maze.radius();
        let distance = radius * self.rng.gen::<f32>().sqrt();
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        Ok(Vec2::from_angle(angle) * distance)
    }

    /// Casts a ray from `actor` against the current level's walls and the
    /// silhouettes of every other living entity on it.
    pub fn cast_ray_entities(
        &self,
        actor: EntityId,
        direction: Vec2,
    ) -> Result<Option<EntityHit>, GameError> {
        let origin = self.entity_ref(actor)?.position;
        let level = self.current_level_ref()?;

        let mut segments = level.map.walls().to_vec();
        let wall_count = segments.len();
        let mut owners = Vec::new();
        for &id in &level.entities {
            if id == actor {
                continue;
            }
            let Some(entity) = self.entity(id) else {
                continue;
            };
            if entity.is_alive() {
                segments.push(entity.silhouette(direction));
                owners.push(id);
            }
        }

        Ok(cast_ray_detailed(origin, direction, &segments).map(|hit| EntityHit {
            distance: hit.distance,
            point: hit.point(origin, direction),
            entity: hit
                .segment
                .checked_sub(wall_count)
                .and_then(|index| owners.get(index).copied()),
        }))
    }

    /// Removes an entity from play.
    ///
    /// The player stays in the arena so that its final state can be
    /// inspected; killing it ends the run.
    pub fn kill_entity(&mut self, id: EntityId) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        let held = entity.held;
        let message = self.sentence(id, "die.", "dies.");
        self.push_event(GameEvent::message(message));

        for level in &mut self.levels {
            level.entities.retain(|&present| present != id);
        }

        if id == self.player {
            if let Some(player) = self.entity_mut(id) {
                player.command_state = CommandState::default();
            }
            if self.run_state == RunState::Running {
                self.run_state = RunState::GameOver;
                log::info!("player died on tick {}", self.tick_count);
            }
        } else {
            for slot in std::iter::once(id).chain(held) {
                if let Some(entry) = self.entities.get_mut(slot.get() as usize) {
                    *entry = None;
                }
            }
        }
    }

    /// Moves the player onto the level at `index`.
    ///
    /// Returns `false` and logs an error when the level does not exist.
    pub fn enter_level(&mut self, index: usize) -> bool {
        if index >= self.levels.len() {
            log::error!(
                "cannot enter level {index}: the dungeon has {} levels",
                self.levels.len()
            );
            return false;
        }

        let player = self.player;
        if let Some(previous) = self.current_level {
            self.levels[previous]
                .entities
                .retain(|&present| present != player);
        }
        self.levels[index].entities.push(player);
        self.current_level = Some(index);

        log::info!("player entered level {index}");
        self.push_event(GameEvent::message(format!(
            "You enter level {}.",
            index + 1
        )));
        true
    }

    /// Ends the run with the player leaving the dungeon.
    pub fn quit(&mut self) {
        self.finish(RunState::GameOver, "You leave the dungeon.");
    }

    /// Ends the run with the player escaping the dungeon.
    pub fn win(&mut self) {
        self.finish(RunState::Victory, "You climb out of the dungeon. Victory!");
    }

    fn finish(&mut self, state: RunState, message: &str) {
        if self.run_state != RunState::Running {
            return;
        }
        let player = self.player;
        for level in &mut self.levels {
            level.entities.retain(|&present| present != player);
        }
        self.run_state = state;
        log::info!("run finished on tick {} with {state:?}", self.tick_count);
        self.push_event(GameEvent::message(message));
    }

    /// Moves the player one level up or down and onto the matching stairs.
    pub(crate) fn take_stairs(&mut self, up: bool) -> Result<(), GameError> {
        let current = self.current_level.ok_or(GameError::NoCurrentLevel)?;
        let destination = match (up, current) {
            (false, 0) => {
                self.quit();
                return Ok(());
            }
            (true, index) if index + 1 >= self.levels.len() => {
                self.win();
                return Ok(());
            }
            (true, index) => index + 1,
            (false, index) => index - 1,
        };

        if !self.enter_level(destination) {
            return Ok(());
        }
        let arrival = if up {
            EntityKind::StairsDown
        } else {
            EntityKind::StairsUp
        };
        let stairs = self.find_single(destination, arrival)?;
        let position = self.entity_ref(stairs)?.position;
        let player = self.player;
        self.entity_ref_mut(player)?.position = position;
        Ok(())
    }

    fn find_single(&self, level: usize, kind: EntityKind) -> Result<EntityId, GameError> {
        let level = self.levels.get(level).ok_or(GameError::UnknownLevel(level))?;
        let matches: Vec<EntityId> = level
            .entities
            .iter()
            .copied()
            .filter(|&id| self.entity(id).is_some_and(|entity| entity.kind == kind))
            .collect();
        match matches.as_slice() {
            [single] => Ok(*single),
            _ => Err(GameError::MissingStairs {
                kind,
                found: matches.len(),
            }),
        }
    }

    fn idle_entity(&mut self, id: EntityId) -> Result<&mut Entity, GameError> {
        let entity = self.entity_ref_mut(id)?;
        if entity.is_busy() {
            return Err(GameError::EntityBusy(id));
        }
        Ok(entity)
    }

    pub(crate) fn entity_ref(&self, id: EntityId) -> Result<&Entity, GameError> {
        self.entity(id).ok_or(GameError::UnknownEntity(id))
    }

    pub(crate) fn entity_ref_mut(&mut self, id: EntityId) -> Result<&mut Entity, GameError> {
        self.entity_mut(id).ok_or(GameError::UnknownEntity(id))
    }

    pub(crate) fn current_level_ref(&self) -> Result<&Level, GameError> {
        self.current_level().ok_or(GameError::NoCurrentLevel)
    }

    pub(crate) fn stats(&self, id: EntityId) -> Result<Stats, GameError> {
        self.entity_ref(id)?
            .stats
            .ok_or(GameError::MissingStats(id))
    }

    pub(crate) fn stats_mut(&mut self, id: EntityId) -> Result<&mut Stats, GameError> {
        self.entity_ref_mut(id)?
            .stats
            .as_mut()
            .ok_or(GameError::MissingStats(id))
    }

    /// Held item of `actor` and its ranged weapon parameters.
    pub(crate) fn held_weapon(
        &self,
        actor: EntityId,
    ) -> Result<(EntityId, &'static RangedWeapon), GameError> {
        let held = self
            .entity_ref(actor)?
            .held
            .ok_or(GameError::MissingHeldItem(actor))?;
        let weapon = self
            .entity_ref(held)?
            .ranged_weapon()
            .ok_or(GameError::MissingRangedWeapon(actor))?;
        Ok((held, weapon))
    }

    pub(crate) fn ammunition_mut(&mut self, item: EntityId) -> Result<&mut Ammunition, GameError> {
        self.entity_ref_mut(item)?
            .ammunition
            .as_mut()
            .ok_or(GameError::MissingAmmunition(item))
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Name used for an entity inside a sentence.
    pub(crate) fn name(&self, id: EntityId) -> String {
        if id == self.player {
            return "you".to_owned();
        }
        match self.entity(id) {
            Some(entity) => format!("the {}", entity.definition().noun),
            None => "something".to_owned(),
        }
    }

    /// Sentence with `actor` as its subject, conjugated for the player or a
    /// third party.
    pub(crate) fn sentence(&self, actor: EntityId, player_form: &str, other_form: &str) -> String {
        if actor == self.player {
            format!("You {player_form}")
        } else {
            let name = self.name(actor);
            let mut chars = name.chars();
            let capitalised: String = chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default();
            format!("{capitalised} {other_form}")
        }
    }
}
