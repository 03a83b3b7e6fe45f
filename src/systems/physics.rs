use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{Transform2D, Velocity2D};
use crate::error::Result;
use crate::manager::EcsManager;
use crate::system::{Action, Continuation, System, SystemId};

use super::PHYSICS_2D;

/// Integrates velocity into position
#[derive(Default)]
pub struct Physics2DSystem;

impl Physics2DSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for Physics2DSystem {
    fn id(&self) -> SystemId {
        PHYSICS_2D
    }

    fn name(&self) -> &'static str {
        "Physics2DSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![Transform2D, Velocity2D])]
    }

    fn run(
        &mut self,
        _action: &str,
        dt: f32,
        _manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        for row in rows {
            if let (Some(mut transform), Some(velocity)) =
                (row.get_mut::<Transform2D>(0), row.get::<Velocity2D>(1))
            {
                transform.px += velocity.vx * dt;
                transform.py += velocity.vy * dt;
            }
        }
        Ok(Continuation::Continue)
    }
}
