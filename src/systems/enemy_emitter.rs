use ahash::AHashMap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{EnemyEmitterCooldown, FireLinearBulletEmitter, FireRadialBulletEmitter};
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::{Action, Continuation, System, SystemId};

use super::{retain_rows, ENEMY_EMITTER};

/// Makes armed enemies fire at random intervals
pub struct EnemyEmitterSystem {
    rng: ChaCha8Rng,
    cooldowns: AHashMap<EntityId, f32>,
}

impl EnemyEmitterSystem {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            cooldowns: AHashMap::new(),
        }
    }

    /// Uniform in `[min, max]`; `min` if the range is empty
    fn roll(&mut self, cooldown: &EnemyEmitterCooldown) -> f32 {
        if cooldown.max <= cooldown.min {
            cooldown.min
        } else {
            self.rng.gen_range(cooldown.min..=cooldown.max)
        }
    }
}

impl System for EnemyEmitterSystem {
    fn id(&self) -> SystemId {
        ENEMY_EMITTER
    }

    fn name(&self) -> &'static str {
        "EnemyEmitterSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![EnemyEmitterCooldown])]
    }

    fn run(
        &mut self,
        _action: &str,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        retain_rows(&mut self.cooldowns, rows);

        for row in rows {
            let entity = row.entity();
            let mut remaining = self.cooldowns.get(&entity).copied().unwrap_or(0.0) - dt;

            if remaining <= 0.0 {
                let Some(cooldown) = row.get::<EnemyEmitterCooldown>(0).map(|c| *c) else {
                    continue;
                };
                manager.register_component(entity, FireLinearBulletEmitter)?;
                manager.register_component(entity, FireRadialBulletEmitter)?;
                remaining = self.roll(&cooldown);
            }

            self.cooldowns.insert(entity, remaining);
        }
        Ok(Continuation::Continue)
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.cooldowns.clear();
        Ok(())
    }
}
