use rand::Rng;
use ringdelve_core::{Command, ControllerKind, EntityId, GameError, Vec2};

use crate::Game;

/// Distance within which an enemy opens fire on a visible player.
const SHOOT_RANGE: f32 = 100.0;
/// Ticks after which an enemy stops chasing a player it lost sight of.
const FORGET_TICKS: u64 = 50;
/// Distance at which a chase toward the last sighting is considered done.
const CHASE_EPSILON: f32 = 1.0;
/// Ticks an enemy waits when it has nothing better to do.
const IDLE_TICKS: u32 = 10;
/// Probability that an enemy notices its empty magazine before shooting.
const NOTICE_EMPTY_CHANCE: f64 = 0.8;

/// What an enemy remembers about the player.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyMemory {
    /// Where the player was last seen.
    pub last_seen_position: Option<Vec2>,
    /// Tick on which the player was last seen.
    pub last_seen_tick: Option<u64>,
    /// Whether the enemy is heading for the last sighting.
    pub is_chasing: bool,
}

/// Strategy choosing the next command for an idle entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiController {
    /// Walks toward random points of the level.
    RandomMovement,
    /// Hunts and shoots the player.
    Enemy(EnemyMemory),
}

impl AiController {
    pub(crate) fn from_kind(kind: ControllerKind) -> Self {
        match kind {
            ControllerKind::RandomMovement => Self::RandomMovement,
            ControllerKind::Enemy => Self::Enemy(EnemyMemory::default()),
        }
    }

    /// Chooses the next command for `actor`.
    pub fn next_command(&mut self, actor: EntityId, game: &mut Game) -> Result<Command, GameError> {
        match self {
            Self::RandomMovement => {
                let point = game.random_point_in_map()?;
                let destination = game.maximum_move_towards_point(actor, point)?;
                Ok(Command::move_to(destination))
            }
            Self::Enemy(memory) => hunt(memory, actor, game),
        }
    }
}

fn hunt(memory: &mut EnemyMemory, actor: EntityId, game: &mut Game) -> Result<Command, GameError> {
    let player = game.player();
    let origin = game.entity_ref(actor)?.position;
    let Some(player_position) = game
        .entity(player)
        .filter(|_| game.is_on_current_level(player))
        .map(|entity| entity.position)
    else {
        return Ok(Command::idle(IDLE_TICKS));
    };

    let offset = player_position - origin;
    let sees_player = offset != Vec2::ZERO
        && game
            .cast_ray_entities(actor, offset)?
            .and_then(|hit| hit.entity)
            == Some(player);
    if sees_player {
        memory.last_seen_position = Some(player_position);
        memory.last_seen_tick = Some(game.tick_count());
        memory.is_chasing = true;
    }

    let (held, weapon) = game.held_weapon(actor)?;
    let loaded = game.entity_ref(held)?.ammunition.map_or(0, |ammo| ammo.loaded);

    if sees_player && offset.length() <= SHOOT_RANGE {
        if loaded == 0 && game.rng().gen_bool(NOTICE_EMPTY_CHANCE) {
            log::debug!("{actor:?} reloads before shooting");
            return Ok(Command::reload());
        }
        log::debug!("{actor:?} shoots at the player");
        return Ok(Command::ranged_attack(player));
    }

    if memory.is_chasing {
        let forgotten = memory
            .last_seen_tick
            .map_or(true, |seen| game.tick_count().saturating_sub(seen) >= FORGET_TICKS);
        match memory.last_seen_position {
            Some(target) if !forgotten && origin.distance(target) > CHASE_EPSILON => {
                let destination = game.maximum_move_towards_point(actor, target)?;
                return Ok(Command::move_to(destination));
            }
            _ => {
                log::debug!("{actor:?} gives up the chase");
                memory.is_chasing = false;
            }
        }
    }

    if loaded < weapon.ammo_capacity {
        return Ok(Command::reload());
    }
    Ok(Command::idle(IDLE_TICKS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enemies_start_without_memory() {
        assert_eq!(
            AiController::from_kind(ControllerKind::Enemy),
            AiController::Enemy(EnemyMemory::default())
        );
        assert_eq!(
            AiController::from_kind(ControllerKind::RandomMovement),
            AiController::RandomMovement
        );
    }
}
