use bullet_purgatory::game::run_session_with;
use bullet_purgatory::prelude::*;
use bullet_purgatory::systems::ALL_SYSTEMS;

fn shared(surface: HeadlessSurface) -> (std::rc::Rc<std::cell::RefCell<HeadlessSurface>>, SurfaceRef) {
    let headless = surface.into_shared();
    let surface: SurfaceRef = headless.clone();
    (headless, surface)
}

fn seeded() -> GameConfig {
    GameConfig {
        seed: Some(1234),
        ..GameConfig::default()
    }
}

#[test]
fn test_session_registers_every_system() {
    let (_headless, surface) = shared(HeadlessSurface::new());
    let mut manager = EcsManager::new();
    build_session(&mut manager, &surface, &seeded(), GameState::new(0, 5)).unwrap();

    for id in ALL_SYSTEMS {
        assert!(manager.is_registered(id), "system {id} missing");
    }
}

#[test]
fn test_close_request_ends_session() {
    let (headless, surface) = shared(HeadlessSurface::new().with_player_name("Grace").close_after(120));

    let outcome =
        run_session_with(&seeded(), &surface, GameState::new(3, 5), &mut FixedClock::new(60)).unwrap();

    assert_eq!(outcome.name, "Grace");
    assert_eq!(outcome.score, 3);
    let headless = headless.borrow();
    assert!(headless.ticks() >= 120);
    assert!(!headless.game_over_shown());
}

#[test]
fn test_dead_player_ends_session() {
    let (headless, surface) = shared(HeadlessSurface::new());

    let outcome =
        run_session_with(&seeded(), &surface, GameState::new(5, 0), &mut FixedClock::new(60)).unwrap();

    assert_eq!(outcome.score, 5);
    let headless = headless.borrow();
    assert!(headless.game_over_shown());
    assert_eq!(headless.tracked_entity(), None);
}

#[test]
fn test_enemies_arrive_over_time() {
    let (headless, surface) = shared(HeadlessSurface::new());
    let mut manager = EcsManager::new();
    build_session(&mut manager, &surface, &seeded(), GameState::new(0, 5)).unwrap();
    manager.setup(&surface).unwrap();

    for _ in 0..120 {
        assert_eq!(manager.run_tick(1.0 / 60.0).unwrap(), Continuation::Continue);
    }

    // Player and spawner, plus whatever the waves produced
    assert!(manager.entity_count() > 2);
    assert!(headless.borrow().object_count() > 2);

    manager.cleanup(&surface).unwrap();
    assert_eq!(manager.entity_count(), 0);
    assert_eq!(manager.system_count(), 0);
}

#[test]
fn test_same_seed_same_session() {
    let run = || {
        let (_headless, surface) = shared(HeadlessSurface::new());
        let mut manager = EcsManager::new();
        build_session(&mut manager, &surface, &seeded(), GameState::new(0, 5)).unwrap();
        manager.setup(&surface).unwrap();
        for _ in 0..90 {
            manager.run_tick(1.0 / 60.0).unwrap();
        }

        let mut positions = Vec::new();
        for entity in manager.entities() {
            if let Some(slot) = manager.fetch::<Transform2D>(entity).unwrap() {
                let transform = *slot.get::<Transform2D>().unwrap();
                positions.push((entity, transform.px, transform.py));
            }
        }
        positions
    };

    assert_eq!(run(), run());
}

#[test]
fn test_held_fire_key_shoots_player_bullets() {
    let (headless, surface) = shared(HeadlessSurface::new());
    headless
        .borrow_mut()
        .push_event(SurfaceEvent::KeyPressed("j".to_string()));

    let mut manager = EcsManager::new();
    let player = build_session(&mut manager, &surface, &seeded(), GameState::new(0, 5)).unwrap();
    manager.setup(&surface).unwrap();
    for _ in 0..3 {
        manager.run_tick(1.0 / 60.0).unwrap();
    }

    let player_bullets = manager
        .entities()
        .into_iter()
        .filter(|&entity| entity != player)
        .filter(|&entity| {
            manager.has::<BulletTag>(entity).unwrap() && manager.has::<PlayerTag>(entity).unwrap()
        })
        .count();
    // One shot per primary cooldown, no matter how long the key is held
    assert_eq!(player_bullets, 1);
}

#[test]
fn test_escape_pauses_simulation() {
    let (headless, surface) = shared(HeadlessSurface::new());
    let mut manager = EcsManager::new();
    build_session(&mut manager, &surface, &seeded(), GameState::new(0, 5)).unwrap();
    manager.setup(&surface).unwrap();
    manager.run_tick(1.0 / 60.0).unwrap();

    headless
        .borrow_mut()
        .push_event(SurfaceEvent::KeyPressed("Escape".to_string()));
    manager.run_tick(1.0 / 60.0).unwrap();

    assert!(manager.is_paused());
    assert!(headless.borrow().menu_shown());

    manager.run_tick(1.0 / 60.0).unwrap();
    assert_eq!(manager.time().delta_seconds(), 0.0);
}
