use ringdelve_core::{EntityId, EntityKind, GameError, GameEvent, Vec2};
use ringdelve_system_maze::{Maze, Tile};
use ringdelve_world::Game;

fn arena() -> Game {
    seeded_arena(11)
}

fn seeded_arena(seed: u64) -> Game {
    let maze = Maze::from_rings(60.0, vec![vec![Tile::default()]]).expect("valid maze");
    let mut game = Game::from_mazes(vec![maze], seed);
    let _ = game
        .spawn(0, EntityKind::StairsDown, Vec2::ZERO)
        .expect("level exists");
    let _ = game.start_game().expect("stairs present");
    game
}

fn spawn_dummy(game: &mut Game, kind: EntityKind, position: Vec2) -> EntityId {
    let id = game.spawn(0, kind, position).expect("level exists");
    if let Some(entity) = game.entity_mut(id) {
        entity.controller = None;
    }
    id
}

fn run_until_idle(game: &mut Game) -> (u32, Vec<GameEvent>) {
    let mut ticks = 0;
    let mut events = Vec::new();
    while !game.is_waiting_for_command() {
        events.extend(game.tick().expect("tick succeeds"));
        ticks += 1;
        assert!(ticks < 200, "command never completed");
    }
    (ticks, events)
}

fn player_ammo(game: &Game) -> u32 {
    let pistol = game
        .entity(game.player())
        .and_then(|player| player.held)
        .expect("player is armed");
    game.entity(pistol)
        .and_then(|pistol| pistol.ammunition)
        .expect("pistol has ammunition")
        .loaded
}

fn set_player_ammo(game: &mut Game, loaded: u32) {
    let pistol = game
        .entity(game.player())
        .and_then(|player| player.held)
        .expect("player is armed");
    if let Some(ammunition) = game
        .entity_mut(pistol)
        .and_then(|pistol| pistol.ammunition.as_mut())
    {
        ammunition.loaded = loaded;
    }
}

fn messages(events: &[GameEvent]) -> Vec<&str> {
    events.iter().map(|event| event.message.as_str()).collect()
}

#[test]
fn move_advances_half_the_speed_each_tick() {
    let mut game = arena();
    game.move_to(Vec2::new(10.0, 0.0)).expect("player idle");

    let _ = game.tick().expect("tick succeeds");
    let position = game.entity(game.player()).expect("player").position;
    assert!((position - Vec2::new(2.5, 0.0)).length() < 1e-5, "{position}");

    let (ticks, _) = run_until_idle(&mut game);
    assert_eq!(ticks, 3);
    assert_eq!(
        game.entity(game.player()).expect("player").position,
        Vec2::new(10.0, 0.0)
    );
}

#[test]
fn ticking_without_a_command_is_rejected() {
    let mut game = arena();
    assert_eq!(game.tick(), Err(GameError::WaitingForCommand));
}

#[test]
fn busy_player_rejects_new_commands() {
    let mut game = arena();
    game.move_to(Vec2::new(30.0, 0.0)).expect("player idle");
    assert_eq!(
        game.rest(5),
        Err(GameError::EntityBusy(game.player()))
    );
}

#[test]
fn rest_lasts_the_requested_ticks() {
    let mut game = arena();
    game.rest(3).expect("player idle");
    let (ticks, _) = run_until_idle(&mut game);
    assert_eq!(ticks, 3);
    assert_eq!(game.tick_count(), 3);
}

#[test]
fn reloading_a_full_weapon_changes_nothing() {
    let mut game = arena();
    let capacity = player_ammo(&game);
    game.reload().expect("player idle");

    let (ticks, events) = run_until_idle(&mut game);
    assert_eq!(ticks, 1);
    assert_eq!(player_ammo(&game), capacity);
    assert!(events.is_empty(), "{:?}", messages(&events));
}

#[test]
fn reloading_refills_the_magazine() {
    let mut game = arena();
    set_player_ammo(&mut game, 1);
    game.reload().expect("player idle");

    let (ticks, events) = run_until_idle(&mut game);
    assert_eq!(ticks, 12);
    assert_eq!(player_ammo(&game), 6);
    assert_eq!(messages(&events), ["You reload the pistol."]);
}

#[test]
fn empty_weapon_fails_to_fire() {
    let mut game = arena();
    let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(30.0, 0.0));
    set_player_ammo(&mut game, 0);

    game.fire_at(game.player(), orc).expect("valid attack");
    let (ticks, events) = run_until_idle(&mut game);

    assert_eq!(ticks, 6);
    assert_eq!(player_ammo(&game), 0);
    assert_eq!(
        messages(&events),
        ["You pull the trigger, but the pistol fails to fire."]
    );
    assert!(events[0].traces.is_empty());
}

#[test]
fn firing_spends_exactly_one_round() {
    let mut game = arena();
    let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(30.0, 0.0));
    let before = player_ammo(&game);

    game.fire_at(game.player(), orc).expect("valid attack");
    let (_, events) = run_until_idle(&mut game);

    assert_eq!(player_ammo(&game), before - 1);
    let traces: Vec<_> = events.iter().flat_map(|event| &event.traces).collect();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].from, Vec2::ZERO);
}

#[test]
fn shots_damage_the_target() {
    let mut game = arena();
    let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(8.0, 0.0));

    let mut hits = 0;
    for _ in 0..6 {
        if game.entity(orc).is_none() {
            break;
        }
        game.fire_at(game.player(), orc).expect("valid attack");
        let (_, events) = run_until_idle(&mut game);
        hits += events
            .iter()
            .filter(|event| event.traces.iter().any(|trace| trace.is_hit))
            .count();
    }

    assert!(hits > 0);
    match game.entity(orc) {
        Some(orc) => {
            let stats = orc.stats.expect("orc has stats");
            assert!(stats.health < stats.max_health);
            assert!(orc.last_hit_tick.is_some());
        }
        None => assert!(!game.level(0).expect("level").contains(orc)),
    }
}

#[test]
fn entities_in_the_line_of_fire_take_stray_hits() {
    let mut stray_hits = 0;
    for seed in 0..200 {
        let mut game = seeded_arena(seed);
        let _ = spawn_dummy(&mut game, EntityKind::Rat, Vec2::new(10.0, 0.0));
        let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(40.0, 0.0));

        game.fire_at(game.player(), orc).expect("valid attack");
        let (_, events) = run_until_idle(&mut game);

        let orc_stats = game
            .entity(orc)
            .and_then(|orc| orc.stats)
            .expect("orc survives");
        assert_eq!(orc_stats.health, orc_stats.max_health, "seed {seed}");
        assert!(game.entity(orc).expect("orc").last_hit_tick.is_none());

        let hits = events
            .iter()
            .filter(|event| event.traces.iter().any(|trace| trace.is_hit));
        for event in hits {
            assert_eq!(event.message, "You shoot the rat.", "seed {seed}");
            stray_hits += 1;
        }
        assert!(
            events.iter().all(|event| !event.message.contains("Critical hit!")),
            "seed {seed}: {:?}",
            messages(&events)
        );
    }

    assert!(stray_hits > 150, "stray_hits={stray_hits}");
}

#[test]
fn the_intended_target_can_take_critical_hits() {
    let mut criticals = 0;
    for seed in 0..400 {
        let mut game = seeded_arena(seed);
        let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(8.0, 0.0));

        game.fire_at(game.player(), orc).expect("valid attack");
        let (_, events) = run_until_idle(&mut game);
        criticals += events
            .iter()
            .filter(|event| event.message == "You shoot the orc. Critical hit!")
            .count();
    }

    assert!(criticals > 0);
}

#[test]
fn use_rejections_are_reported_as_events() {
    let mut game = arena();
    let orc = spawn_dummy(&mut game, EntityKind::Orc, Vec2::new(5.0, 0.0));
    let far_stairs = spawn_dummy(&mut game, EntityKind::StairsUp, Vec2::new(40.0, 0.0));

    game.use_entity(orc).expect("valid target");
    game.use_entity(far_stairs).expect("valid target");

    assert!(game.is_waiting_for_command());
    assert_eq!(
        messages(&game.take_events()),
        ["You can't use the orc.", "The stairs up is out of reach."]
    );
}

#[test]
fn fire_rejections_are_reported_as_events() {
    let mut game = arena();
    let stairs = spawn_dummy(&mut game, EntityKind::StairsUp, Vec2::new(20.0, 0.0));
    let player = game.player();

    game.fire_at(player, player).expect("valid actor");
    game.fire_at(player, stairs).expect("valid actor");

    assert!(game.is_waiting_for_command());
    assert_eq!(
        messages(&game.take_events()),
        ["You can't shoot the human.", "You can't shoot the stairs up."]
    );
}

#[test]
fn unknown_targets_are_contract_violations() {
    let mut game = arena();
    let ghost = EntityId::new(999);
    assert_eq!(
        game.fire_at(game.player(), ghost),
        Err(GameError::UnknownEntity(ghost))
    );
    assert_eq!(game.use_entity(ghost), Err(GameError::UnknownEntity(ghost)));
}

#[test]
fn unarmed_entities_cannot_fire() {
    let mut game = arena();
    let rat = spawn_dummy(&mut game, EntityKind::Rat, Vec2::new(10.0, 0.0));
    assert_eq!(
        game.fire_at(rat, game.player()),
        Err(GameError::MissingHeldItem(rat))
    );
}

#[test]
fn moves_stop_short_of_walls() {
    let game = arena();
    let player = game.player();
    let clamped = game
        .maximum_move_towards_point(player, Vec2::new(100.0, 0.0))
        .expect("player on level");
    let scale = game.entity(player).expect("player").scale();

    assert!(clamped.x < 60.0 - scale + 0.5, "{clamped}");
    assert!(clamped.x > 50.0, "{clamped}");
    assert_eq!(
        game.maximum_move_towards_point(player, Vec2::new(20.0, 0.0)),
        Ok(Vec2::new(20.0, 0.0))
    );
}
