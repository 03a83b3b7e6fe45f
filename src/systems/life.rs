use tracing::{debug, info};

use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{EnemyTag, Lives, PlayerTag, Score};
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::{Action, Continuation, System, SystemId};

use super::{attached, mark_stale, LIFE};

/// Expires entities out of lives, credits the player for dead enemies and
/// ends the session when the player dies.
#[derive(Default)]
pub struct LifeSystem {
    surface: Option<SurfaceRef>,
    game_over: bool,
}

impl LifeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the player has died this session
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

impl System for LifeSystem {
    fn id(&self) -> SystemId {
        LIFE
    }

    fn name(&self) -> &'static str {
        "LifeSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![Lives])]
    }

    fn setup(&mut self, _manager: &mut EcsManager, surface: &SurfaceRef) -> Result<()> {
        self.surface = Some(surface.clone());
        self.game_over = false;
        Ok(())
    }

    fn run(
        &mut self,
        _action: &str,
        _dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        let surface = attached(&self.surface, "LifeSystem")?.clone();
        let mut player: Option<EntityId> = None;
        let mut kills = 0;

        for row in rows {
            let entity = row.entity();
            let is_player = manager.has::<PlayerTag>(entity)?;
            if is_player {
                player = Some(entity);
            }

            let dead = row.get::<Lives>(0).is_some_and(|lives| lives.count <= 0);
            if !dead {
                continue;
            }

            if is_player && !self.game_over {
                info!("Player {entity} died");
                manager.pause();
                let mut surface = surface.borrow_mut();
                surface.set_tracked_entity(None);
                surface.show_game_over();
                self.game_over = true;
            }
            if manager.has::<EnemyTag>(entity)? {
                kills += 1;
            }
            mark_stale(manager, entity)?;
        }

        if let Some(player) = player.filter(|_| kills > 0) {
            if let Some(slot) = manager.fetch::<Score>(player)? {
                if let Some(mut score) = slot.get_mut::<Score>() {
                    score.count += kills;
                }
            }
        }

        if self.game_over && surface.borrow().game_over_acknowledged() {
            debug!("Game over acknowledged");
            return Ok(Continuation::Stop);
        }
        Ok(Continuation::Continue)
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.surface = None;
        Ok(())
    }
}
