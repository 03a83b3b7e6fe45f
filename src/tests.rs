// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cross-module scenarios for the manager, executor and game systems

#[cfg(test)]
mod tests {
    #![allow(dead_code)]
    #![allow(clippy::module_inception)]
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::components::{BulletTag, Collider2D, Lives, StaleTag, Transform2D, Velocity2D};
    use crate::config::GameConfig;
    use crate::game::{build_session, run_session_with};
    use crate::persistence::GameState;
    use crate::surface::HeadlessSurface;
    use crate::systems::{Collider2DSystem, Physics2DSystem};
    use crate::time::FixedClock;
    use crate::{
        archetype, impl_component, Action, ArchetypeRow, Continuation, EcsError, EcsManager,
        Result, SurfaceRef, System, SystemId,
    };

    #[derive(Debug, PartialEq)]
    struct Alpha(u32);

    #[derive(Debug, PartialEq)]
    struct Beta(u32);

    impl_component! {
        Alpha => 600,
        Beta => 601,
    }

    /// Binds one action to `[Alpha, Beta]` and records every visit
    struct Watcher {
        id: u32,
        log: Rc<RefCell<Vec<(u32, usize)>>>,
        stop: bool,
    }

    impl Watcher {
        fn new(id: u32, log: &Rc<RefCell<Vec<(u32, usize)>>>) -> Self {
            Self {
                id,
                log: Rc::clone(log),
                stop: false,
            }
        }
    }

    impl System for Watcher {
        fn id(&self) -> SystemId {
            SystemId(self.id)
        }

        fn name(&self) -> &'static str {
            "watcher"
        }

        fn actions(&self) -> Vec<Action> {
            vec![Action::new("watch", archetype![Alpha, Beta])]
        }

        fn run(
            &mut self,
            _action: &str,
            _dt: f32,
            _manager: &mut EcsManager,
            rows: &[ArchetypeRow],
        ) -> Result<Continuation> {
            self.log.borrow_mut().push((self.id, rows.len()));
            Ok(if self.stop {
                Continuation::Stop
            } else {
                Continuation::Continue
            })
        }
    }

    fn new_log() -> Rc<RefCell<Vec<(u32, usize)>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn headless() -> (Rc<RefCell<HeadlessSurface>>, SurfaceRef) {
        let headless = HeadlessSurface::new().into_shared();
        let surface: SurfaceRef = headless.clone();
        (headless, surface)
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut manager = EcsManager::new();
        let first = manager.create_entity();
        let second = manager.create_entity();
        manager.destroy_entity(second).unwrap();
        let third = manager.create_entity();

        assert!(first < second);
        assert!(second < third);
        assert_eq!(manager.entities(), vec![first, third]);
    }

    #[test]
    fn test_unknown_entity_leaves_everything_untouched() {
        let mut manager = EcsManager::new();
        let log = new_log();
        manager.register_system(Watcher::new(1, &log));
        let live = manager.create_entity();
        let ghost = manager.create_entity();
        manager.destroy_entity(ghost).unwrap();

        assert_eq!(
            manager.register_component(ghost, Alpha(1)).unwrap_err(),
            EcsError::UnknownEntity(ghost)
        );
        assert!(manager.fetch::<Alpha>(ghost).is_err());
        assert!(manager.deregister::<Alpha>(ghost).is_err());
        assert!(manager.destroy_entity(ghost).is_err());

        assert_eq!(manager.entities(), vec![live]);
        let rows = manager.fetch_archetype(&archetype![Alpha, Beta]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_bucket_membership_either_registration_order() {
        let mut manager = EcsManager::new();
        let log = new_log();
        manager.register_system(Watcher::new(1, &log));
        let key = archetype![Alpha, Beta];

        let a_first = manager.create_entity();
        manager.register_component(a_first, Alpha(1)).unwrap();
        assert!(!manager.archetype_index().contains_entity(&key, a_first));
        manager.register_component(a_first, Beta(1)).unwrap();

        let b_first = manager.create_entity();
        manager.register_component(b_first, Beta(2)).unwrap();
        manager.register_component(b_first, Alpha(2)).unwrap();

        assert!(manager.archetype_index().contains_entity(&key, a_first));
        assert!(manager.archetype_index().contains_entity(&key, b_first));

        manager.deregister::<Alpha>(a_first).unwrap();
        assert!(!manager.archetype_index().contains_entity(&key, a_first));
        assert!(manager.archetype_index().contains_entity(&key, b_first));
        assert_eq!(manager.archetype_index().bucket_len(&key), Some(1));
    }

    #[test]
    fn test_destroy_returns_held_components() {
        let mut manager = EcsManager::new();
        let log = new_log();
        manager.register_system(Watcher::new(1, &log));
        let key = archetype![Alpha, Beta];

        let entity = manager.create_entity();
        manager.register_component(entity, Beta(9)).unwrap();
        manager.register_component(entity, Alpha(3)).unwrap();

        let held = manager.destroy_entity(entity).unwrap();
        assert_eq!(held.len(), 2);
        assert_eq!(*held[0].get::<Alpha>().unwrap(), Alpha(3));
        assert_eq!(*held[1].get::<Beta>().unwrap(), Beta(9));

        assert!(!manager.is_alive(entity));
        assert!(!manager.archetype_index().contains_entity(&key, entity));
        assert_eq!(manager.archetype_index().bucket_len(&key), Some(0));
    }

    #[test]
    fn test_system_registration_is_idempotent() {
        let mut manager = EcsManager::new();
        let log = new_log();
        assert!(manager.register_system(Watcher::new(1, &log)));
        assert!(!manager.register_system(Watcher::new(1, &log)));
        assert_eq!(manager.system_count(), 1);

        let entity = manager.create_entity();
        manager.register_component(entity, Alpha(1)).unwrap();
        manager.register_component(entity, Beta(1)).unwrap();
        manager.run_tick(0.1).unwrap();

        assert_eq!(*log.borrow(), vec![(1, 1)]);
    }

    #[test]
    fn test_shared_archetype_survives_until_last_system_leaves() {
        let mut manager = EcsManager::new();
        let log = new_log();
        manager.register_system(Watcher::new(1, &log));
        manager.register_system(Watcher::new(2, &log));
        let key = archetype![Alpha, Beta];

        assert!(manager.deregister_system(SystemId(1)));
        assert!(manager.archetype_index().contains(&key));

        assert!(manager.deregister_system(SystemId(2)));
        assert!(!manager.archetype_index().contains(&key));
        assert!(manager.fetch_archetype(&key).is_none());
        assert!(!manager.deregister_system(SystemId(2)));
    }

    #[test]
    fn test_stop_halts_tick_and_cleanup_tears_down() {
        let mut manager = EcsManager::new();
        let log = new_log();
        let mut stopper = Watcher::new(1, &log);
        stopper.stop = true;
        manager.register_system(stopper);
        manager.register_system(Watcher::new(2, &log));

        let entity = manager.create_entity();
        manager.register_component(entity, Alpha(1)).unwrap();
        manager.register_component(entity, Beta(1)).unwrap();

        let (_headless, surface) = headless();
        manager.setup(&surface).unwrap();
        manager.process_with(&mut FixedClock::new(60)).unwrap();
        assert_eq!(*log.borrow(), vec![(1, 1)]);

        manager.cleanup(&surface).unwrap();
        assert_eq!(manager.system_count(), 0);
        assert_eq!(manager.entity_count(), 0);
    }

    #[test]
    fn test_physics_moves_by_velocity() {
        let mut manager = EcsManager::new();
        manager.register_system(Physics2DSystem::new());

        let entity = manager.create_entity();
        manager
            .register_component(entity, Transform2D::new(0.0, 0.0, 0.0))
            .unwrap();
        manager
            .register_component(entity, Velocity2D::new(10.0, 0.0))
            .unwrap();

        manager.run_tick(0.5).unwrap();

        let slot = manager.fetch::<Transform2D>(entity).unwrap().unwrap();
        let transform = *slot.get::<Transform2D>().unwrap();
        assert_eq!(transform.px, 5.0);
        assert_eq!(transform.py, 0.0);
    }

    #[test]
    fn test_bullet_costs_target_a_life() {
        let mut manager = EcsManager::new();
        manager.register_system(Collider2DSystem::new());

        let bullet = manager.create_entity();
        manager
            .register_component(bullet, Transform2D::new(0.0, 0.0, 0.0))
            .unwrap();
        manager
            .register_component(bullet, Collider2D::new(10.0, 10.0))
            .unwrap();
        manager.register_component(bullet, BulletTag).unwrap();

        let target = manager.create_entity();
        manager
            .register_component(target, Transform2D::new(5.0, 0.0, 0.0))
            .unwrap();
        manager
            .register_component(target, Collider2D::new(10.0, 10.0))
            .unwrap();
        manager.register_component(target, Lives { count: 1 }).unwrap();

        manager.run_tick(0.1).unwrap();

        let slot = manager.fetch::<Lives>(target).unwrap().unwrap();
        assert_eq!(slot.get::<Lives>().unwrap().count, 0);
        assert!(manager.has::<StaleTag>(bullet).unwrap());
    }

    #[test]
    fn test_built_session_tracks_player() {
        let mut manager = EcsManager::new();
        let (headless, surface) = headless();
        let config = GameConfig::default();

        let player = build_session(&mut manager, &surface, &config, GameState::new(12, 3)).unwrap();

        assert_eq!(manager.system_count(), 10);
        assert_eq!(manager.entity_count(), 2);
        assert_eq!(headless.borrow().tracked_entity(), Some(player));

        let lives = manager.fetch::<Lives>(player).unwrap().unwrap();
        assert_eq!(lives.get::<Lives>().unwrap().count, 3);
    }

    #[test]
    fn test_session_runs_until_closed() {
        let headless = HeadlessSurface::new()
            .with_player_name("Ada")
            .close_after(30)
            .into_shared();
        let surface: SurfaceRef = headless.clone();
        let config = GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        };

        let outcome = run_session_with(
            &config,
            &surface,
            GameState::new(42, 5),
            &mut FixedClock::new(60),
        )
        .unwrap();

        assert_eq!(outcome.name, "Ada");
        assert_eq!(outcome.score, 42);
        assert!(headless.borrow().ticks() >= 30);
        assert!(!headless.borrow().game_over_shown());
    }
}
