use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::Lifespan;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::system::{Action, Continuation, System, SystemId};

use super::{mark_stale, LIFESPAN};

/// Counts lifespans down and expires entities that run out
#[derive(Default)]
pub struct LifespanSystem;

impl LifespanSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for LifespanSystem {
    fn id(&self) -> SystemId {
        LIFESPAN
    }

    fn name(&self) -> &'static str {
        "LifespanSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![Lifespan])]
    }

    fn run(
        &mut self,
        _action: &str,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        for row in rows {
            let expired = match row.get_mut::<Lifespan>(0) {
                Some(mut lifespan) => {
                    lifespan.ttl -= dt;
                    lifespan.ttl < 0.0
                }
                None => false,
            };
            if expired {
                mark_stale(manager, row.entity())?;
            }
        }
        Ok(Continuation::Continue)
    }
}
