//! Per-tick execution of entity commands.

use std::f32::consts::{FRAC_PI_4, PI};

use rand::Rng;
use rand_distr::StandardNormal;
use ringdelve_core::{
    Command, CommandStatus, EntityId, GameError, GameEvent, RangedWeapon, Trace, Vec2,
};

use crate::{dice, EntityHit, Game};

/// Fraction of the move speed covered per tick.
const MOVE_STEP_FACTOR: f32 = 0.5;
/// Ticks spent on the stairs by an entity with zero speed.
const STAIRS_BASE_TICKS: f32 = 30.0;
/// Half-angle of the spread cone of a weapon with zero accuracy.
const WIDE_CONE: f32 = FRAC_PI_4;
/// Half-angle of the spread cone of a perfectly accurate weapon.
const NARROW_CONE: f32 = PI / 64.0;
const SPREAD_DEVIATION: f32 = 0.1;
const SPREAD_SAMPLE_ATTEMPTS: usize = 16;
/// Length of the trace drawn for a shot that left the map.
const MISS_TRACE_LENGTH: f32 = 500.0;

/// Steps `command` by one tick on behalf of `actor`.
pub(crate) fn advance(
    command: &mut Command,
    actor: EntityId,
    game: &mut Game,
) -> Result<CommandStatus, GameError> {
    match command {
        Command::Idle { remaining } => Ok(idle(remaining)),
        Command::Move { target } => step_towards(actor, *target, game),
        Command::TakeStairs { up, elapsed } => climb(actor, *up, elapsed, game),
        Command::RangedAttack { target, elapsed } => attack(actor, *target, elapsed, game),
        Command::Reload { elapsed } => reload(actor, elapsed, game),
    }
}

fn status(done: bool) -> CommandStatus {
    if done {
        CommandStatus::Complete
    } else {
        CommandStatus::InProgress
    }
}

fn idle(remaining: &mut u32) -> CommandStatus {
    *remaining = remaining.saturating_sub(1);
    status(*remaining == 0)
}

fn step_towards(actor: EntityId, target: Vec2, game: &mut Game) -> Result<CommandStatus, GameError> {
    let step = game.stats(actor)?.move_speed * MOVE_STEP_FACTOR;
    let entity = game.entity_ref_mut(actor)?;
    let offset = target - entity.position;
    let distance = offset.length();

    if distance <= step {
        entity.position = target;
        return Ok(CommandStatus::Complete);
    }
    entity.position += offset / distance * step;
    Ok(CommandStatus::InProgress)
}

fn climb(
    actor: EntityId,
    up: bool,
    elapsed: &mut u32,
    game: &mut Game,
) -> Result<CommandStatus, GameError> {
    if actor != game.player() {
        return Err(GameError::StairsRequirePlayer(actor));
    }
    let speed = game.stats(actor)?.move_speed;
    let duration = (STAIRS_BASE_TICKS - speed).max(1.0) as u32;

    *elapsed += 1;
    if *elapsed == 1 {
        let direction = if up { "up" } else { "down" };
        game.push_event(GameEvent::message(format!(
            "You start climbing the stairs {direction}."
        )));
    }
    if *elapsed < duration {
        return Ok(CommandStatus::InProgress);
    }

    game.take_stairs(up)?;
    Ok(CommandStatus::Complete)
}

fn attack(
    actor: EntityId,
    target: EntityId,
    elapsed: &mut u32,
    game: &mut Game,
) -> Result<CommandStatus, GameError> {
    let (held, weapon) = game.held_weapon(actor)?;
    let _ = game.stats(actor)?;
    let steady = weapon.steady_tick_count.max(1);
    let total = steady.max(weapon.attack_tick_count());

    *elapsed += 1;
    if *elapsed == steady {
        fire(actor, target, held, weapon, game)?;
    }
    Ok(status(*elapsed >= total))
}

fn fire(
    actor: EntityId,
    target: EntityId,
    held: EntityId,
    weapon: &RangedWeapon,
    game: &mut Game,
) -> Result<(), GameError> {
    let Some(target_position) = game
        .entity(target)
        .filter(|entity| entity.is_alive() && game.is_on_current_level(target))
        .map(|entity| entity.position)
    else {
        log::debug!("shot by {actor:?} fizzled: {target:?} is gone");
        return Ok(());
    };

    let weapon_noun = game.entity_ref(held)?.definition().noun;
    if game.ammunition_mut(held)?.loaded == 0 {
        let message = game.sentence(
            actor,
            &format!("pull the trigger, but the {weapon_noun} fails to fire."),
            &format!("pulls the trigger, but the {weapon_noun} fails to fire."),
        );
        game.push_event(GameEvent::message(message));
        return Ok(());
    }
    game.ammunition_mut(held)?.loaded -= 1;

    let origin = game.entity_ref(actor)?.position;
    let aim = (target_position - origin)
        .try_normalize()
        .unwrap_or(Vec2::X);
    let accuracy = weapon.accuracy.clamp(0.0, 1.0);
    let cone = WIDE_CONE + (NARROW_CONE - WIDE_CONE) * accuracy;
    let spread = (spread_sample(game.rng()) - 0.5) * 2.0 * cone;
    let direction = Vec2::from_angle(spread).rotate(aim);

    match game.cast_ray_entities(actor, direction)? {
        Some(EntityHit {
            entity: Some(victim),
            point,
            ..
        }) => {
            let rolled = dice::roll(weapon.damage_roll, game.rng()) as i32;
            let critical = victim == target && dice::is_critical(game.rng());
            let mut damage = (rolled + weapon.damage_bonus).max(0);
            if critical {
                damage *= 2;
            }

            let tick = game.tick_count();
            let stats = game.stats_mut(victim)?;
            stats.health -= damage;
            let health = stats.health;
            game.entity_ref_mut(victim)?.last_hit_tick = Some(tick);

            let victim_name = game.name(victim);
            let mut message = game.sentence(
                actor,
                &format!("shoot {victim_name}."),
                &format!("shoots {victim_name}."),
            );
            if critical {
                message.push_str(" Critical hit!");
            }
            game.push_event(GameEvent::message(message).with_trace(Trace {
                from: origin,
                to: point,
                is_hit: true,
            }));
            log::debug!("{actor:?} hit {victim:?} for {damage}, health now {health}");

            if health <= 0 {
                game.kill_entity(victim);
            }
        }
        hit => {
            let to = hit.map_or(origin + direction * MISS_TRACE_LENGTH, |hit| hit.point);
            let message = game.sentence(actor, "fire and miss.", "fires and misses.");
            game.push_event(GameEvent::message(message).with_trace(Trace {
                from: origin,
                to,
                is_hit: false,
            }));
        }
    }
    Ok(())
}

/// Draws a sample in `[0, 1]` from a normal distribution centred on one half.
fn spread_sample<R: Rng>(rng: &mut R) -> f32 {
    for _ in 0..SPREAD_SAMPLE_ATTEMPTS {
        let deviation: f32 = rng.sample(StandardNormal);
        let sample = 0.5 + deviation * SPREAD_DEVIATION;
        if (0.0..=1.0).contains(&sample) {
            return sample;
        }
    }
    0.5
}

fn reload(actor: EntityId, elapsed: &mut u32, game: &mut Game) -> Result<CommandStatus, GameError> {
    let (held, weapon) = game.held_weapon(actor)?;
    let loaded = game.ammunition_mut(held)?.loaded;
    if loaded >= weapon.ammo_capacity {
        return Ok(CommandStatus::Complete);
    }

    *elapsed += 1;
    if *elapsed < weapon.reload_tick_count.max(1) {
        return Ok(CommandStatus::InProgress);
    }

    game.ammunition_mut(held)?.loaded += weapon.reload_count.min(weapon.ammo_capacity - loaded);
    let weapon_noun = game.entity_ref(held)?.definition().noun;
    let message = game.sentence(
        actor,
        &format!("reload the {weapon_noun}."),
        &format!("reloads the {weapon_noun}."),
    );
    game.push_event(GameEvent::message(message));
    Ok(CommandStatus::Complete)
}
