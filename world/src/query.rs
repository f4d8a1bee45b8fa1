//! Read-only views over a [`Game`] for adapters.

use ringdelve_core::{ControllerKind, EntityId, EntityKind, Segment, Vec2};
use ringdelve_system_visibility::{calculate_visibility, load_map, Rect, VisibilityEdge};
use serde::Serialize;

use crate::Game;

/// Plain copy of the state of one entity on the current level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Template of the entity.
    pub kind: EntityKind,
    /// World position.
    pub position: Vec2,
    /// Remaining health, for entities with stats.
    pub health: Option<i32>,
    /// Rounds loaded in the held weapon.
    pub loaded: Option<u32>,
    /// Whether the entity is the player.
    pub is_player: bool,
}

/// Snapshot of every entity on the current level, ordered by identifier.
#[must_use]
pub fn entities(game: &Game) -> Vec<EntitySnapshot> {
    let mut snapshots: Vec<EntitySnapshot> = game
        .visible_entities()
        .into_iter()
        .map(|entity| EntitySnapshot {
            id: entity.id,
            kind: entity.kind,
            position: entity.position,
            health: entity.stats.map(|stats| stats.health),
            loaded: entity
                .held
                .and_then(|held| game.entity(held))
                .and_then(|held| held.ammunition)
                .map(|ammo| ammo.loaded),
            is_player: entity.id == game.player(),
        })
        .collect();
    snapshots.sort_by_key(|snapshot| snapshot.id);
    snapshots
}

/// Snapshot of the player while it is on a level.
#[must_use]
pub fn player(game: &Game) -> Option<EntitySnapshot> {
    entities(game).into_iter().find(|snapshot| snapshot.is_player)
}

/// Walls of the current level.
#[must_use]
pub fn walls(game: &Game) -> &[Segment] {
    game.current_level()
        .map(|level| level.map().walls())
        .unwrap_or_default()
}

/// Living enemies on the current level with a clear line of fire from the player,
/// nearest first.
#[must_use]
pub fn hostiles_in_sight(game: &Game) -> Vec<EntityId> {
    let player = game.player();
    let Some(origin) = game
        .entity(player)
        .filter(|_| game.is_on_current_level(player))
        .map(|entity| entity.position)
    else {
        return Vec::new();
    };

    let mut sighted: Vec<(f32, EntityId)> = game
        .visible_entities()
        .into_iter()
        .filter(|entity| {
            entity.is_alive() && entity.definition().controller == Some(ControllerKind::Enemy)
        })
        .filter_map(|entity| {
            let hit = game
                .cast_ray_entities(player, entity.position - origin)
                .ok()??;
            (hit.entity == Some(entity.id)).then_some((hit.distance, entity.id))
        })
        .collect();
    sighted.sort_by(|a, b| a.0.total_cmp(&b.0));
    sighted.into_iter().map(|(_, id)| id).collect()
}

/// Visibility polygon of the player on the current level.
///
/// Only walls occlude the view. Entity silhouettes are ignored here even
/// though they stop shots and enemy sight lines, so a hostile standing behind
/// another entity is drawn as visible yet cannot be hit through it.
///
/// Returns no edges while the player is not on a level.
#[must_use]
pub fn visibility(game: &Game) -> Vec<VisibilityEdge> {
    let Some(level) = game.current_level() else {
        return Vec::new();
    };
    let Some(player) = game.entity(game.player()) else {
        return Vec::new();
    };
    let bounds = Rect::around(Vec2::ZERO, level.maze().radius());
    let map = load_map(player.position, Some(bounds), &[], level.map().walls());
    calculate_visibility(&map)
}
