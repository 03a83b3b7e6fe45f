use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{Collider2D, EdgeHarm, Lives, Transform2D};
use crate::error::Result;
use crate::manager::EcsManager;
use crate::system::{Action, Continuation, System, SystemId};

use super::{mark_stale, EDGE_HARM};

/// Entities that cross their harm line cost the target a life and expire
#[derive(Default)]
pub struct EdgeHarmSystem;

impl EdgeHarmSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for EdgeHarmSystem {
    fn id(&self) -> SystemId {
        EDGE_HARM
    }

    fn name(&self) -> &'static str {
        "EdgeHarmSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new(
            "process",
            archetype![Transform2D, Collider2D, EdgeHarm],
        )]
    }

    fn run(
        &mut self,
        _action: &str,
        _dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        for row in rows {
            let crossed = match (
                row.get::<Transform2D>(0),
                row.get::<Collider2D>(1),
                row.get::<EdgeHarm>(2),
            ) {
                (Some(transform), Some(collider), Some(edge)) => {
                    let half_height = (collider.sy / 2.0).floor();
                    (edge.py - half_height < transform.py).then_some(edge.target)
                }
                _ => None,
            };
            let Some(target) = crossed else {
                continue;
            };

            if manager.is_alive(target) {
                if let Some(slot) = manager.fetch::<Lives>(target)? {
                    if let Some(mut lives) = slot.get_mut::<Lives>() {
                        lives.count -= 1;
                    }
                }
            }
            mark_stale(manager, row.entity())?;
        }
        Ok(Continuation::Continue)
    }
}
