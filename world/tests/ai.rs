use ringdelve_core::{Command, EntityId, EntityKind, Vec2};
use ringdelve_system_maze::{Maze, Tile};
use ringdelve_world::{AiController, EnemyMemory, Game};

const ORC_POST: Vec2 = Vec2::new(-30.0, 0.0);

/// Open single-tile level with the player resting on the down stairs at the
/// origin.
fn hall(radius: f32, seed: u64) -> Game {
    let maze = Maze::from_rings(radius, vec![vec![Tile::default()]]).expect("valid maze");
    let mut game = Game::from_mazes(vec![maze], seed);
    let _ = game
        .spawn(0, EntityKind::StairsDown, Vec2::ZERO)
        .expect("level exists");
    let _ = game.start_game().expect("stairs present");
    game.rest(1_000).expect("player idle");
    game
}

fn spawn_orc(game: &mut Game, position: Vec2) -> EntityId {
    game.spawn(0, EntityKind::Orc, position).expect("level exists")
}

/// Puts a rat without a controller on the line between the orc and the
/// player so that its silhouette hides the player.
fn block_sight(game: &mut Game) {
    let rat = game
        .spawn(0, EntityKind::Rat, Vec2::new(-10.0, 0.0))
        .expect("level exists");
    if let Some(entity) = game.entity_mut(rat) {
        entity.controller = None;
    }
}

fn set_loaded(game: &mut Game, holder: EntityId, loaded: u32) {
    let gun = game
        .entity(holder)
        .and_then(|entity| entity.held)
        .expect("holder is armed");
    if let Some(ammunition) = game
        .entity_mut(gun)
        .and_then(|gun| gun.ammunition.as_mut())
    {
        ammunition.loaded = loaded;
    }
}

fn set_memory(game: &mut Game, orc: EntityId, memory: EnemyMemory) {
    if let Some(entity) = game.entity_mut(orc) {
        entity.controller = Some(AiController::Enemy(memory));
    }
}

fn memory(game: &Game, orc: EntityId) -> EnemyMemory {
    match game.entity(orc).and_then(|entity| entity.controller) {
        Some(AiController::Enemy(memory)) => memory,
        other => panic!("orc lost its enemy controller: {other:?}"),
    }
}

/// Command the orc is executing after deciding and stepping once.
fn decide(game: &mut Game, orc: EntityId) -> Option<Command> {
    let _ = game.tick().expect("tick succeeds");
    game.entity(orc).expect("orc").command_state.current
}

#[test]
fn visible_player_in_range_is_shot() {
    let mut game = hall(60.0, 3);
    let orc = spawn_orc(&mut game, ORC_POST);

    let command = decide(&mut game, orc);

    assert_eq!(
        command,
        Some(Command::RangedAttack {
            target: game.player(),
            elapsed: 1,
        })
    );
    let memory = memory(&game, orc);
    assert_eq!(memory.last_seen_position, Some(Vec2::ZERO));
    assert_eq!(memory.last_seen_tick, Some(0));
    assert!(memory.is_chasing);
}

#[test]
fn empty_magazine_is_usually_noticed_before_shooting() {
    let mut reloads = 0;
    let mut attacks = 0;
    for seed in 0..200 {
        let mut game = hall(60.0, seed);
        let orc = spawn_orc(&mut game, ORC_POST);
        set_loaded(&mut game, orc, 0);

        match decide(&mut game, orc) {
            Some(Command::Reload { .. }) => reloads += 1,
            Some(Command::RangedAttack { .. }) => attacks += 1,
            other => panic!("seed {seed}: unexpected decision {other:?}"),
        }
    }

    assert_eq!(reloads + attacks, 200);
    assert!((120..=190).contains(&reloads), "reloads={reloads}");
    assert!(attacks > 0, "the empty magazine must sometimes go unnoticed");
}

#[test]
fn partially_loaded_enemy_shoots_without_reloading() {
    for seed in 0..20 {
        let mut game = hall(60.0, seed);
        let orc = spawn_orc(&mut game, ORC_POST);
        set_loaded(&mut game, orc, 1);

        assert!(
            matches!(decide(&mut game, orc), Some(Command::RangedAttack { .. })),
            "seed {seed}"
        );
    }
}

#[test]
fn visible_player_out_of_range_is_chased() {
    let mut game = hall(200.0, 3);
    let orc = spawn_orc(&mut game, Vec2::new(150.0, 0.0));

    let command = decide(&mut game, orc);

    assert_eq!(command, Some(Command::Move { target: Vec2::ZERO }));
    let position = game.entity(orc).expect("orc").position;
    assert!((position - Vec2::new(148.5, 0.0)).length() < 1e-4, "{position}");
    assert!(memory(&game, orc).is_chasing);
}

#[test]
fn hidden_player_is_chased_to_the_last_sighting() {
    let mut game = hall(60.0, 3);
    let orc = spawn_orc(&mut game, ORC_POST);
    block_sight(&mut game);
    let sighting = Vec2::new(-30.0, 20.0);
    set_memory(
        &mut game,
        orc,
        EnemyMemory {
            last_seen_position: Some(sighting),
            last_seen_tick: Some(0),
            is_chasing: true,
        },
    );

    assert_eq!(decide(&mut game, orc), Some(Command::Move { target: sighting }));
    assert!(memory(&game, orc).is_chasing);
}

#[test]
fn chase_ends_on_reaching_the_last_sighting() {
    let mut game = hall(60.0, 3);
    let orc = spawn_orc(&mut game, ORC_POST);
    block_sight(&mut game);
    set_memory(
        &mut game,
        orc,
        EnemyMemory {
            last_seen_position: Some(ORC_POST + Vec2::new(0.5, 0.0)),
            last_seen_tick: Some(0),
            is_chasing: true,
        },
    );

    assert_eq!(decide(&mut game, orc), Some(Command::Idle { remaining: 9 }));
    assert!(!memory(&game, orc).is_chasing);
    assert_eq!(game.entity(orc).expect("orc").position, ORC_POST);
}

#[test]
fn enemies_forget_the_player_after_fifty_ticks() {
    for (seen, expect_chase) in [(1, true), (0, false)] {
        let mut game = hall(60.0, 3);
        let orc = spawn_orc(&mut game, ORC_POST);
        block_sight(&mut game);
        if let Some(entity) = game.entity_mut(orc) {
            entity.controller = None;
        }
        for _ in 0..50 {
            let _ = game.tick().expect("tick succeeds");
        }
        assert_eq!(game.tick_count(), 50);

        let sighting = Vec2::new(-30.0, 20.0);
        set_memory(
            &mut game,
            orc,
            EnemyMemory {
                last_seen_position: Some(sighting),
                last_seen_tick: Some(seen),
                is_chasing: true,
            },
        );

        let command = decide(&mut game, orc);
        if expect_chase {
            assert_eq!(command, Some(Command::Move { target: sighting }));
        } else {
            assert_eq!(command, Some(Command::Idle { remaining: 9 }));
        }
        assert_eq!(memory(&game, orc).is_chasing, expect_chase, "seen at {seen}");
    }
}

#[test]
fn hidden_player_lets_the_enemy_top_off_its_magazine() {
    let mut game = hall(60.0, 3);
    let orc = spawn_orc(&mut game, ORC_POST);
    block_sight(&mut game);
    set_loaded(&mut game, orc, 3);

    assert_eq!(decide(&mut game, orc), Some(Command::Reload { elapsed: 1 }));
    assert_eq!(memory(&game, orc), EnemyMemory::default());
}

#[test]
fn idle_is_the_fallback_with_a_full_magazine() {
    let mut game = hall(60.0, 3);
    let orc = spawn_orc(&mut game, ORC_POST);
    block_sight(&mut game);

    assert_eq!(decide(&mut game, orc), Some(Command::Idle { remaining: 9 }));
    assert_eq!(memory(&game, orc), EnemyMemory::default());
}

#[test]
fn enemies_wait_while_the_player_is_elsewhere() {
    let maze = Maze::from_rings(60.0, vec![vec![Tile::default()]]).expect("valid maze");
    let mut game = Game::from_mazes(vec![maze.clone(), maze], 3);
    let _ = game
        .spawn(0, EntityKind::StairsDown, Vec2::ZERO)
        .expect("level exists");
    let orc = game
        .spawn(1, EntityKind::Orc, ORC_POST)
        .expect("level exists");
    let _ = game.start_game().expect("stairs present");
    assert!(game.enter_level(1));
    game.kill_entity(game.player());

    let decision = game
        .entity(orc)
        .and_then(|entity| entity.controller)
        .map(|mut controller| controller.next_command(orc, &mut game));

    assert_eq!(decision, Some(Ok(Command::idle(10))));
}
