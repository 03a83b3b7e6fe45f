use std::path::PathBuf;

use ahash::AHashMap;
use tracing::{debug, info, warn};

use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{
    Collider2D, FireLinearBulletEmitter, FireRadialBulletEmitter, Lives, Score, Transform2D,
    UserInput, Velocity2D,
};
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::error::Result;
use crate::input::{CheatCode, InputAction, InputBitmask};
use crate::manager::EcsManager;
use crate::persistence::GameState;
use crate::surface::{SurfaceEvent, SurfaceRef};
use crate::system::{Action, Continuation, System, SystemId};

use super::{attached, USER_INPUT};

/// Lives granted by the cheat code
const CHEAT_LIVES: i64 = 30;

/// Rate-limited player actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cooldown {
    FirePrimary,
    FireSecondary,
    Menu,
    BossKey,
}

/// Overlay that paused the game; only it may unpause
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Overlay {
    Menu,
    BossImage,
}

impl Overlay {
    fn cooldown(self) -> Cooldown {
        match self {
            Overlay::Menu => Cooldown::Menu,
            Overlay::BossImage => Cooldown::BossKey,
        }
    }
}

/// Moves and fires the player ship from keyboard input, and handles the
/// pause menu, the boss key and window close.
pub struct UserInputSystem {
    surface: Option<SurfaceRef>,
    input: InputBitmask,
    cheat: CheatCode,
    /// Remaining seconds per entity and action; absent means ready
    cooldowns: AHashMap<(EntityId, Cooldown), f32>,
    paused_by: Option<Overlay>,
    continuation: Continuation,
    save_requested: bool,
    width: f32,
    height: f32,
    durations: [(Cooldown, f32); 4],
    state_path: PathBuf,
}

impl UserInputSystem {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            surface: None,
            input: InputBitmask::new(),
            cheat: CheatCode::new(),
            cooldowns: AHashMap::new(),
            paused_by: None,
            continuation: Continuation::Continue,
            save_requested: false,
            width: config.width,
            height: config.height,
            durations: [
                (Cooldown::FirePrimary, config.primary_cooldown),
                (Cooldown::FireSecondary, config.secondary_cooldown),
                (Cooldown::Menu, config.menu_cooldown),
                (Cooldown::BossKey, config.boss_key_cooldown),
            ],
            state_path: config.state_path.clone(),
        }
    }

    pub fn input(&self) -> InputBitmask {
        self.input
    }

    /// Seconds left before `entity` may use `cooldown` again
    pub fn remaining(&self, entity: EntityId, cooldown: Cooldown) -> f32 {
        self.cooldowns.get(&(entity, cooldown)).copied().unwrap_or(0.0)
    }

    fn ready(&self, entity: EntityId, cooldown: Cooldown) -> bool {
        !self.cooldowns.contains_key(&(entity, cooldown))
    }

    fn arm(&mut self, entity: EntityId, cooldown: Cooldown) {
        let duration = self
            .durations
            .iter()
            .find(|(kind, _)| *kind == cooldown)
            .map_or(0.0, |(_, seconds)| *seconds);
        if duration > 0.0 {
            self.cooldowns.insert((entity, cooldown), duration);
        }
    }

    /// Cooldowns run on unscaled time so they expire while paused
    fn tick_cooldowns(&mut self, raw_dt: f32, rows: &[ArchetypeRow]) {
        self.cooldowns.retain(|(entity, _), remaining| {
            *remaining -= raw_dt;
            *remaining > 0.0 && rows.iter().any(|row| row.entity() == *entity)
        });
    }

    fn handle_events(&mut self, events: Vec<SurfaceEvent>) {
        for event in events {
            match event {
                SurfaceEvent::KeyPressed(key) => {
                    self.cheat.advance(&key);
                    self.input.key_pressed(&key);
                }
                SurfaceEvent::KeyReleased(key) => self.input.key_released(&key),
                SurfaceEvent::CloseRequested | SurfaceEvent::QuitRequested => {
                    debug!("Close requested");
                    self.continuation = Continuation::Stop;
                }
                SurfaceEvent::SaveRequested => self.save_requested = true,
            }
        }
    }

    fn toggle_overlay(
        &mut self,
        manager: &mut EcsManager,
        surface: &SurfaceRef,
        entity: EntityId,
        overlay: Overlay,
    ) {
        let cooldown = overlay.cooldown();
        if !self.ready(entity, cooldown) {
            return;
        }

        match self.paused_by {
            // Paused by something else, e.g. game over
            None if manager.is_paused() => return,
            None => {
                manager.pause();
                self.paused_by = Some(overlay);
            }
            Some(current) if current == overlay => {
                manager.unpause();
                self.paused_by = None;
            }
            Some(_) => return,
        }

        match overlay {
            Overlay::Menu => surface.borrow_mut().toggle_menu(),
            Overlay::BossImage => surface.borrow_mut().toggle_boss_image(),
        }
        self.arm(entity, cooldown);
    }

    fn save_state(&self, manager: &EcsManager, entity: EntityId) -> Result<()> {
        let score = manager.fetch::<Score>(entity)?;
        let lives = manager.fetch::<Lives>(entity)?;
        let (Some(score), Some(lives)) = (score, lives) else {
            warn!("Entity {entity} has no score or lives to save");
            return Ok(());
        };
        let state = match (score.get::<Score>(), lives.get::<Lives>()) {
            (Some(score), Some(lives)) => GameState::new(score.count, lives.count),
            _ => return Ok(()),
        };
        if let Err(err) = state.save(&self.state_path) {
            warn!("Could not save game state: {err}");
        }
        Ok(())
    }

    /// Steer and clamp one entity
    fn steer(&self, row: &ArchetypeRow) {
        let (Some(mut transform), Some(collider), Some(mut velocity), Some(user_input)) = (
            row.get_mut::<Transform2D>(0),
            row.get::<Collider2D>(1),
            row.get_mut::<Velocity2D>(2),
            row.get::<UserInput>(3),
        ) else {
            return;
        };

        // Normalise so diagonals are no faster than straight lines
        let (dx, dy) = self.input.direction();
        let magnitude = dx.hypot(dy);
        let (mut vx, mut vy) = if magnitude > 0.0 {
            (dx / magnitude * user_input.speed, dy / magnitude * user_input.speed)
        } else {
            (0.0, 0.0)
        };

        let half_width = (collider.sx / 2.0).floor();
        let half_height = (collider.sy / 2.0).floor();
        if transform.px < half_width {
            transform.px += 1.0;
            vx = 0.0;
        } else if self.width - half_width < transform.px {
            transform.px -= 1.0;
            vx = 0.0;
        }
        if transform.py < half_height {
            transform.py += 1.0;
            vy = 0.0;
        } else if self.height - half_height < transform.py {
            transform.py -= 1.0;
            vy = 0.0;
        }

        velocity.vx = vx;
        velocity.vy = vy;
    }
}

impl System for UserInputSystem {
    fn id(&self) -> SystemId {
        USER_INPUT
    }

    fn name(&self) -> &'static str {
        "UserInputSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new(
            "process",
            archetype![Transform2D, Collider2D, Velocity2D, UserInput],
        )]
    }

    fn setup(&mut self, _manager: &mut EcsManager, surface: &SurfaceRef) -> Result<()> {
        self.surface = Some(surface.clone());
        self.continuation = Continuation::Continue;
        Ok(())
    }

    fn run(
        &mut self,
        _action: &str,
        _dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        let surface = attached(&self.surface, "UserInputSystem")?.clone();
        let events = surface.borrow_mut().poll_events();
        self.handle_events(events);
        self.tick_cooldowns(manager.time().raw_delta_seconds(), rows);

        for row in rows {
            let entity = row.entity();

            if self.cheat.is_pending() {
                if let Some(slot) = manager.fetch::<Lives>(entity)? {
                    if let Some(mut lives) = slot.get_mut::<Lives>() {
                        info!("Cheat code entered");
                        lives.count = CHEAT_LIVES;
                        self.cheat.consume();
                    }
                }
            }

            if self.save_requested {
                self.save_state(manager, entity)?;
            }

            if self.input.pressed(InputAction::Menu) {
                self.toggle_overlay(manager, &surface, entity, Overlay::Menu);
            }
            if self.input.pressed(InputAction::BossKey) {
                self.toggle_overlay(manager, &surface, entity, Overlay::BossImage);
            }

            self.steer(row);

            if self.input.pressed(InputAction::FirePrimary) && self.ready(entity, Cooldown::FirePrimary) {
                manager.register_component(entity, FireLinearBulletEmitter)?;
                self.arm(entity, Cooldown::FirePrimary);
            }
            if self.input.pressed(InputAction::FireSecondary)
                && self.ready(entity, Cooldown::FireSecondary)
            {
                manager.register_component(entity, FireRadialBulletEmitter)?;
                self.arm(entity, Cooldown::FireSecondary);
            }
        }
        self.save_requested = false;

        Ok(self.continuation)
    }

    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        self.surface = None;
        self.cooldowns.clear();
        Ok(())
    }
}
