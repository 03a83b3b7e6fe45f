use std::f32::consts::TAU;

use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{
    BulletData, BulletTag, Collider2D, EnemyTag, FireLinearBulletEmitter, FireRadialBulletEmitter,
    Lifespan, LinearBulletEmitter, PlayerTag, RadialBulletEmitter, ScreenElement, Transform2D,
    Velocity2D,
};
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::{Action, Continuation, System, SystemId};

use super::{attached, BULLET_EMITTER};

const PROCESS_LINEAR: &str = "process_linear";
const PROCESS_RADIAL: &str = "process_radial";

/// Shooter's side, inherited by its bullets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Faction {
    Player,
    Enemy,
    Neutral,
}

impl Faction {
    fn of(manager: &EcsManager, entity: EntityId) -> Result<Self> {
        Ok(if manager.has::<PlayerTag>(entity)? {
            Faction::Player
        } else if manager.has::<EnemyTag>(entity)? {
            Faction::Enemy
        } else {
            Faction::Neutral
        })
    }
}

/// Spawns bullets for emitters whose fire tag is set, consuming the tag
pub struct BulletEmitterSystem {
    surface: Option<SurfaceRef>,
    /// Bullets live long enough to cross the playfield diagonal
    diagonal: f32,
}

impl BulletEmitterSystem {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            surface: None,
            diagonal: config.diagonal(),
        }
    }

    fn spawn_bullet(
        &self,
        manager: &mut EcsManager,
        surface: &SurfaceRef,
        data: &mut BulletData,
        origin: (f32, f32),
        velocity: Velocity2D,
        faction: Faction,
    ) -> Result<EntityId> {
        let colour = data.next_colour();
        let handle = surface.borrow_mut().draw_poly(&data.vertices, &colour);

        let bullet = manager.create_entity();
        manager.register_component(bullet, Transform2D::new(origin.0, origin.1, 0.0))?;
        manager.register_component(bullet, Collider2D::new(data.size, data.size))?;
        manager.register_component(bullet, velocity)?;
        manager.register_component(
            bullet,
            Lifespan {
                ttl: self.diagonal / data.speed.abs(),
            },
        )?;
        manager.register_component(
            bullet,
            ScreenElement {
                handle,
                vertices: data.vertices.clone(),
            },
        )?;
        manager.register_component(bullet, BulletTag)?;
        match faction {
            Faction::Player => {
                manager.register_component(bullet, PlayerTag)?;
            }
            Faction::Enemy => {
                manager.register_component(bullet, EnemyTag)?;
            }
            Faction::Neutral => {}
        }
        Ok(bullet)
    }

    fn process_linear(&mut self, manager: &mut EcsManager, rows: &[ArchetypeRow]) -> Result<Continuation> {
        let surface = attached(&self.surface, "BulletEmitterSystem")?.clone();

        for row in rows {
            let entity = row.entity();
            if manager.deregister::<FireLinearBulletEmitter>(entity)?.is_none() {
                continue;
            }

            let origin = match row.get::<Transform2D>(0) {
                Some(transform) => (transform.px, transform.py),
                None => continue,
            };
            let faction = Faction::of(manager, entity)?;
            let Some(mut emitter) = row.get_mut::<LinearBulletEmitter>(2) else {
                continue;
            };
            let velocity = Velocity2D::new(0.0, emitter.velocity_y());
            self.spawn_bullet(manager, &surface, &mut emitter.data, origin, velocity, faction)?;
        }
        Ok(Continuation::Continue)
    }

    fn process_radial(&mut self, manager: &mut EcsManager, rows: &[ArchetypeRow]) -> Result<Continuation> {
        let surface = attached(&self.surface, "BulletEmitterSystem")?.clone();

        for row in rows {
            let entity = row.entity();
            if manager.deregister::<FireRadialBulletEmitter>(entity)?.is_none() {
                continue;
            }

            let origin = match row.get::<Transform2D>(0) {
                Some(transform) => (transform.px, transform.py),
                None => continue,
            };
            let faction = Faction::of(manager, entity)?;
            let Some(mut emitter) = row.get_mut::<RadialBulletEmitter>(2) else {
                continue;
            };
            if emitter.bullet_count == 0 {
                continue;
            }

            // Speed is projected from the y axis, rotated clockwise by theta
            let sweep = TAU / emitter.bullet_count as f32;
            let speed = emitter.data.speed;
            for n in 0..emitter.bullet_count {
                let theta = emitter.arc_offset + n as f32 * sweep;
                let velocity = Velocity2D::new(theta.sin() * speed, theta.cos() * speed);
                self.spawn_bullet(manager, &surface, &mut emitter.data, origin, velocity, faction)?;
            }
        }
        Ok(Continuation::Continue)
    }
}

impl System for BulletEmitterSystem {
    fn id(&self) -> SystemId {
        BULLET_EMITTER
    }

    fn name(&self) -> &'static str {
        "BulletEmitterSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![
            Action::new(
                PROCESS_LINEAR,
                archetype![Transform2D, Collider2D, LinearBulletEmitter],
            ),
            Action::new(
                PROCESS_RADIAL,
                archetype![Transform2D, Collider2D, RadialBulletEmitter],
            ),
        ]
    }

    fn setup(&mut self, _manager: &mut EcsManager, surface: &SurfaceRef) -> Result<()> {
        self.surface = Some(surface.clone());
        Ok(())
    }

    fn run(
        &mut self,
        action: &str,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        // No shooting while paused
        if dt == 0.0 {
            return Ok(Continuation::Continue);
        }

        match action {
            PROCESS_LINEAR => self.process_linear(manager, rows),
            PROCESS_RADIAL => self.process_radial(manager, rows),
            _ => Ok(Continuation::Continue),
        }
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.surface = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::surface::HeadlessSurface;

    fn data(speed: f32) -> BulletData {
        BulletData {
            size: 10.0,
            speed,
            vertices: vec![-5.0, 0.0, 0.0, 5.0, 5.0, 0.0, 0.0, -5.0],
            colours: vec!["#00ffff".into()],
            colour_idx: 0,
        }
    }

    fn setup() -> (EcsManager, Rc<RefCell<HeadlessSurface>>, EntityId) {
        let mut manager = EcsManager::new();
        manager.register_system(BulletEmitterSystem::new(&GameConfig::default()));
        let headless = HeadlessSurface::new().into_shared();
        let surface: SurfaceRef = headless.clone();
        manager.setup(&surface).unwrap();

        let shooter = manager.create_entity();
        manager
            .register_component(shooter, Transform2D::new(100.0, 200.0, 0.0))
            .unwrap();
        manager
            .register_component(shooter, Collider2D::new(10.0, 20.0))
            .unwrap();
        manager.register_component(shooter, PlayerTag).unwrap();
        (manager, headless, shooter)
    }

    fn bullets(manager: &EcsManager, shooter: EntityId) -> Vec<EntityId> {
        manager
            .entities()
            .into_iter()
            .filter(|&e| e != shooter)
            .collect()
    }

    #[test]
    fn test_linear_fire_consumes_tag() {
        let (mut manager, headless, shooter) = setup();
        manager
            .register_component(
                shooter,
                LinearBulletEmitter {
                    data: data(-270.0),
                    direction: -1,
                },
            )
            .unwrap();
        manager.register_component(shooter, FireLinearBulletEmitter).unwrap();

        manager.run_tick(0.1).unwrap();
        assert!(!manager.has::<FireLinearBulletEmitter>(shooter).unwrap());

        let spawned = bullets(&manager, shooter);
        assert_eq!(spawned.len(), 1);
        let bullet = spawned[0];
        assert!(manager.has::<BulletTag>(bullet).unwrap());
        assert!(manager.has::<PlayerTag>(bullet).unwrap());

        let velocity = manager.fetch::<Velocity2D>(bullet).unwrap().unwrap();
        assert_eq!(*velocity.get::<Velocity2D>().unwrap(), Velocity2D::new(0.0, -270.0));
        let lifespan = manager.fetch::<Lifespan>(bullet).unwrap().unwrap();
        assert!((lifespan.get::<Lifespan>().unwrap().ttl - 943.398 / 270.0).abs() < 1e-3);
        assert_eq!(headless.borrow().shape_count(), 1);

        manager.run_tick(0.1).unwrap();
        assert_eq!(bullets(&manager, shooter).len(), 1);
    }

    #[test]
    fn test_linear_direction_sets_sign() {
        let (mut manager, _headless, shooter) = setup();
        manager
            .register_component(
                shooter,
                LinearBulletEmitter {
                    data: data(-180.0),
                    direction: 1,
                },
            )
            .unwrap();
        manager.register_component(shooter, FireLinearBulletEmitter).unwrap();

        manager.run_tick(0.1).unwrap();

        let spawned = bullets(&manager, shooter);
        assert_eq!(spawned.len(), 1);
        let velocity = manager.fetch::<Velocity2D>(spawned[0]).unwrap().unwrap();
        assert_eq!(*velocity.get::<Velocity2D>().unwrap(), Velocity2D::new(0.0, 180.0));
    }

    #[test]
    fn test_radial_spread() {
        let (mut manager, _headless, shooter) = setup();
        manager
            .register_component(
                shooter,
                RadialBulletEmitter {
                    data: data(100.0),
                    bullet_count: 4,
                    arc_offset: 0.0,
                },
            )
            .unwrap();
        manager.register_component(shooter, FireRadialBulletEmitter).unwrap();

        manager.run_tick(0.1).unwrap();

        let spawned = bullets(&manager, shooter);
        assert_eq!(spawned.len(), 4);
        let first = manager.fetch::<Velocity2D>(spawned[0]).unwrap().unwrap();
        let first = *first.get::<Velocity2D>().unwrap();
        assert!(first.vx.abs() < 1e-3);
        assert!((first.vy - 100.0).abs() < 1e-3);

        let second = manager.fetch::<Velocity2D>(spawned[1]).unwrap().unwrap();
        let second = *second.get::<Velocity2D>().unwrap();
        assert!((second.vx - 100.0).abs() < 1e-3);
        assert!(second.vy.abs() < 1e-3);
    }

    #[test]
    fn test_paused_does_not_fire() {
        let (mut manager, _headless, shooter) = setup();
        manager
            .register_component(
                shooter,
                LinearBulletEmitter {
                    data: data(-270.0),
                    direction: -1,
                },
            )
            .unwrap();
        manager.register_component(shooter, FireLinearBulletEmitter).unwrap();

        manager.pause();
        manager.run_tick(0.1).unwrap();
        assert!(manager.has::<FireLinearBulletEmitter>(shooter).unwrap());
        assert!(bullets(&manager, shooter).is_empty());
    }
}
