use glam::Vec2;
use ringdelve_core::{EntityId, EntityKind, GameError, TileCoord};
use ringdelve_system_maze::Maze;
use ringdelve_world::{query, Game};

/// Distance within which a sighted hostile is worth a shot.
const FIRE_RANGE: f32 = 100.0;
/// Distance at which a waypoint counts as reached.
const WAYPOINT_EPSILON: f32 = 1.0;
/// Progress below which a planned move is considered blocked.
const STUCK_EPSILON: f32 = 0.5;

/// Plays the player: shoots visible hostiles, otherwise heads for the up
/// stairs along the navigation graph.
pub(crate) fn issue_command(game: &mut Game) -> Result<(), GameError> {
    let player = game.player();
    let Some(snapshot) = query::player(game) else {
        return Ok(());
    };

    if let Some(&target) = query::hostiles_in_sight(game).first() {
        let in_range = game
            .entity(target)
            .is_some_and(|hostile| hostile.position.distance(snapshot.position) <= FIRE_RANGE);
        if in_range {
            return if snapshot.loaded == Some(0) {
                game.reload()
            } else {
                game.fire_at(player, target)
            };
        }
    }
    if snapshot.loaded == Some(0) {
        return game.reload();
    }

    let Some(stairs) = find_on_level(game, EntityKind::StairsUp) else {
        log::warn!("no up stairs on the current level");
        return game.rest(1);
    };
    if game.is_in_reach_of_player(stairs) {
        return game.use_entity(stairs);
    }

    let waypoint = next_waypoint(game, snapshot.position, stairs);
    let destination = game.maximum_move_towards_point(player, waypoint)?;
    if destination.distance(snapshot.position) < STUCK_EPSILON {
        log::debug!("path toward {waypoint} is blocked, wandering instead");
        let point = game.random_point_in_map()?;
        let destination = game.maximum_move_towards_point(player, point)?;
        return game.move_to(destination);
    }
    game.move_to(destination)
}

fn find_on_level(game: &Game, kind: EntityKind) -> Option<EntityId> {
    game.visible_entities()
        .into_iter()
        .find(|entity| entity.kind == kind)
        .map(|entity| entity.id)
}

/// Next point to walk to on the way from `position` to `stairs`.
fn next_waypoint(game: &Game, position: Vec2, stairs: EntityId) -> Vec2 {
    let Some(goal) = game.entity(stairs).map(|entity| entity.position) else {
        return position;
    };
    let Some(maze) = game.current_level().map(|level| level.maze()) else {
        return goal;
    };
    let (Some(from), Some(to)) = (maze.tile_at(position), maze.tile_at(goal)) else {
        return goal;
    };
    let Some(path) = maze.nav_mesh().find_path(from, to) else {
        return goal;
    };

    match path.as_slice() {
        [_, next, ..] => {
            let portal = portal(maze, from, *next).unwrap_or(position);
            if portal.distance(position) > WAYPOINT_EPSILON {
                portal
            } else {
                maze.tile_center(*next).unwrap_or(goal)
            }
        }
        _ => goal,
    }
}

/// Midpoint of the open boundary between two connected tiles.
fn portal(maze: &Maze, a: TileCoord, b: TileCoord) -> Option<Vec2> {
    if a.ring() == b.ring() {
        let angle = maze.tile_angle(a.ring())?;
        let crossing = if maze.clockwise(a) == Some(b) && !maze.tile(a)?.clockwise_blocked {
            a
        } else {
            b
        };
        let radius = (a.ring() as f32 + 0.5) * maze.ring_depth();
        return Some(Vec2::from_angle((crossing.tile() + 1) as f32 * angle) * radius);
    }

    let child = if a.ring() > b.ring() { a } else { b };
    let angle = maze.tile_angle(child.ring())?;
    let radius = child.ring() as f32 * maze.ring_depth();
    Some(Vec2::from_angle((child.tile() as f32 + 0.5) * angle) * radius)
}
