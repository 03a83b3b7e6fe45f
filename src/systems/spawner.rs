use ahash::AHashMap;
use tracing::debug;

use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::Spawner;
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::{Action, Continuation, System, SystemId};

use super::{attached, retain_rows, SPAWNER};

/// Runs every [`Spawner`]: when its cooldown expires, the spawner's source
/// picks the next position and builds the entity there.
#[derive(Default)]
pub struct SpawnerSystem {
    surface: Option<SurfaceRef>,
    cooldowns: AHashMap<EntityId, f32>,
}

impl SpawnerSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds until `spawner` next spawns
    pub fn remaining(&self, spawner: EntityId) -> f32 {
        self.cooldowns.get(&spawner).copied().unwrap_or(0.0)
    }
}

impl System for SpawnerSystem {
    fn id(&self) -> SystemId {
        SPAWNER
    }

    fn name(&self) -> &'static str {
        "SpawnerSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![Spawner])]
    }

    fn setup(&mut self, _manager: &mut EcsManager, surface: &SurfaceRef) -> Result<()> {
        self.surface = Some(surface.clone());
        self.cooldowns.clear();
        Ok(())
    }

    fn run(
        &mut self,
        _action: &str,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        let surface = attached(&self.surface, "SpawnerSystem")?.clone();
        retain_rows(&mut self.cooldowns, rows);

        for row in rows {
            let entity = row.entity();
            let mut remaining = self.cooldowns.get(&entity).copied().unwrap_or(0.0) - dt;

            if remaining <= 0.0 {
                let Some(mut spawner) = row.get_mut::<Spawner>(0) else {
                    continue;
                };
                let score = surface.borrow().score();
                let step = spawner.source.next_spawn(score);
                let spawned = spawner
                    .source
                    .instantiate(step.position, score, manager, &surface)?;
                debug!("Spawner {entity} spawned {spawned} at {:?}", step.position);
                remaining = step.cooldown;
            }

            self.cooldowns.insert(entity, remaining);
        }
        Ok(Continuation::Continue)
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.surface = None;
        self.cooldowns.clear();
        Ok(())
    }
}
