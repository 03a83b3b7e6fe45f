use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{ScreenElement, StaleTag, Transform2D};
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::{Action, Continuation, System, SystemId};

use super::{attached, RENDER_2D};

const PROCESS_ACTIVE: &str = "process_active";
const PROCESS_STALE: &str = "process_stale";

/// Moves screen elements to their transforms, redraws the HUD and removes
/// stale entities.
#[derive(Default)]
pub struct Render2DSystem {
    surface: Option<SurfaceRef>,
    coords: Vec<f32>,
}

impl Render2DSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn process_active(
        &mut self,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        let surface = attached(&self.surface, "Render2DSystem")?;
        let mut surface = surface.borrow_mut();

        for row in rows {
            let (Some(transform), Some(element)) =
                (row.get::<Transform2D>(0), row.get::<ScreenElement>(1))
            else {
                continue;
            };

            // Even indices are x, odd are y
            self.coords.clear();
            self.coords.extend(element.vertices.iter().enumerate().map(|(i, v)| {
                if i % 2 == 0 {
                    v + transform.px
                } else {
                    v + transform.py
                }
            }));
            surface.set_coords(element.handle, &self.coords);
        }

        surface.tick(dt, manager);
        Ok(Continuation::Continue)
    }

    fn process_stale(&mut self, manager: &mut EcsManager, rows: &[ArchetypeRow]) -> Result<Continuation> {
        let surface = attached(&self.surface, "Render2DSystem")?;

        for row in rows {
            let entity = row.entity();
            if let Some(slot) = manager.fetch::<ScreenElement>(entity)? {
                if let Some(element) = slot.get::<ScreenElement>() {
                    surface.borrow_mut().remove(element.handle);
                }
            }
            manager.destroy_entity(entity)?;
        }
        Ok(Continuation::Continue)
    }
}

impl System for Render2DSystem {
    fn id(&self) -> SystemId {
        RENDER_2D
    }

    fn name(&self) -> &'static str {
        "Render2DSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![
            Action::new(PROCESS_ACTIVE, archetype![Transform2D, ScreenElement]),
            Action::new(PROCESS_STALE, archetype![StaleTag]),
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
        match action {
            PROCESS_ACTIVE => self.process_active(dt, manager, rows),
            PROCESS_STALE => self.process_stale(manager, rows),
            _ => Ok(Continuation::Continue),
        }
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.surface = None;
        Ok(())
    }
}
