//! Display/input surface boundary
//!
//! The core never draws or reads pixels itself. It asks a [`Surface`] to
//! create and move polygon handles, to redraw the HUD once per tick, and it
//! pulls input events from it. [`HeadlessSurface`] is an in-memory
//! implementation that records every call; it backs the tests, the bench and
//! the headless binary.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::components::{Lives, Score};
use crate::entity::EntityId;
use crate::manager::EcsManager;

/// Opaque handle to a drawn element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Events delivered by the windowing side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Key pressed, by key name (`"w"`, `"Escape"`, `"Up"`, ...)
    KeyPressed(String),
    KeyReleased(String),
    /// Window close button
    CloseRequested,
    /// Quit button in the pause menu
    QuitRequested,
    /// Save button in the pause menu
    SaveRequested,
}

/// Display surface contract
pub trait Surface {
    /// Create a polygon from a flat `[x0, y0, x1, y1, ..]` list
    fn draw_poly(&mut self, vertices: &[f32], colour: &str) -> Handle;

    /// Move a polygon to absolute coordinates
    fn set_coords(&mut self, handle: Handle, coords: &[f32]);

    fn remove(&mut self, handle: Handle);

    /// Per-frame redraw, including the HUD (FPS, object count, score, lives)
    fn tick(&mut self, dt: f32, manager: &EcsManager);

    /// Drain input events received since the last call
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Entity whose score and lives the HUD shows
    fn set_tracked_entity(&mut self, entity: Option<EntityId>);

    /// Last score shown on the HUD
    fn score(&self) -> i64;

    /// Last lives count shown on the HUD
    fn lives(&self) -> i64;

    fn toggle_menu(&mut self);

    fn toggle_boss_image(&mut self);

    /// Show the game-over overlay and start collecting the player's name
    fn show_game_over(&mut self);

    /// Whether the player has dismissed the game-over overlay
    fn game_over_acknowledged(&self) -> bool;

    fn player_name(&self) -> String;
}

/// Shared surface handle. Systems keep a clone from `setup`.
pub type SurfaceRef = Rc<RefCell<dyn Surface>>;

/// A polygon drawn on a [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub coords: Vec<f32>,
    pub colour: String,
}

/// In-memory surface that records calls and replays scripted input
#[derive(Debug)]
pub struct HeadlessSurface {
    next_handle: u64,
    shapes: AHashMap<Handle, Shape>,
    removed: Vec<Handle>,
    pending: VecDeque<SurfaceEvent>,
    scheduled: Vec<(u64, SurfaceEvent)>,
    close_after: Option<u64>,
    ticks: u64,
    tracked: Option<EntityId>,
    score: i64,
    lives: i64,
    fps: Option<f32>,
    object_count: usize,
    menu_shown: bool,
    boss_image_shown: bool,
    game_over_shown: bool,
    game_over_acknowledged: bool,
    auto_acknowledge: bool,
    player_name: String,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            shapes: AHashMap::new(),
            removed: Vec::new(),
            pending: VecDeque::new(),
            scheduled: Vec::new(),
            close_after: None,
            ticks: 0,
            tracked: None,
            score: 0,
            lives: 0,
            fps: None,
            object_count: 0,
            menu_shown: false,
            boss_image_shown: false,
            game_over_shown: false,
            game_over_acknowledged: false,
            auto_acknowledge: true,
            player_name: String::from("John Doe"),
        }
    }

    /// Wrap in a shared handle
    pub fn into_shared(self) -> Rc<RefCell<HeadlessSurface>> {
        Rc::new(RefCell::new(self))
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Request a window close once `ticks` HUD ticks have happened
    pub fn close_after(mut self, ticks: u64) -> Self {
        self.close_after = Some(ticks);
        self
    }

    /// Whether `show_game_over` is acknowledged immediately
    pub fn set_auto_acknowledge(&mut self, auto_acknowledge: bool) {
        self.auto_acknowledge = auto_acknowledge;
    }

    pub fn acknowledge_game_over(&mut self) {
        if self.game_over_shown {
            self.game_over_acknowledged = true;
        }
    }

    /// Queue an event for the next poll
    pub fn push_event(&mut self, event: SurfaceEvent) {
        self.pending.push_back(event);
    }

    /// Deliver an event on the first poll after `tick` HUD ticks
    pub fn schedule_event(&mut self, tick: u64, event: SurfaceEvent) {
        self.scheduled.push((tick, event));
    }

    pub fn shape(&self, handle: Handle) -> Option<&Shape> {
        self.shapes.get(&handle)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn removed(&self) -> &[Handle] {
        &self.removed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn tracked_entity(&self) -> Option<EntityId> {
        self.tracked
    }

    pub fn menu_shown(&self) -> bool {
        self.menu_shown
    }

    pub fn boss_image_shown(&self) -> bool {
        self.boss_image_shown
    }

    pub fn game_over_shown(&self) -> bool {
        self.game_over_shown
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for HeadlessSurface {
    fn draw_poly(&mut self, vertices: &[f32], colour: &str) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(
            handle,
            Shape {
                coords: vertices.to_vec(),
                colour: colour.to_string(),
            },
        );
        handle
    }

    fn set_coords(&mut self, handle: Handle, coords: &[f32]) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.coords.clear();
            shape.coords.extend_from_slice(coords);
        }
    }

    fn remove(&mut self, handle: Handle) {
        if self.shapes.remove(&handle).is_some() {
            self.removed.push(handle);
        }
    }

    fn tick(&mut self, dt: f32, manager: &EcsManager) {
        if let Some(entity) = self.tracked.filter(|&entity| manager.is_alive(entity)) {
            if let Ok(Some(slot)) = manager.fetch::<Lives>(entity) {
                if let Some(lives) = slot.get::<Lives>() {
                    self.lives = lives.count;
                }
            }
            if let Ok(Some(slot)) = manager.fetch::<Score>(entity) {
                if let Some(score) = slot.get::<Score>() {
                    self.score = score.count;
                }
            }
        }

        if dt != 0.0 {
            self.fps = Some(1.0 / dt);
        }
        self.object_count = manager.entity_count();
        self.ticks += 1;
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        let ticks = self.ticks;
        let (due, later): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|(tick, _)| *tick <= ticks);
        self.scheduled = later;

        let mut events: Vec<SurfaceEvent> = self.pending.drain(..).collect();
        events.extend(due.into_iter().map(|(_, event)| event));
        if self.close_after.is_some_and(|limit| ticks >= limit) {
            events.push(SurfaceEvent::CloseRequested);
        }
        events
    }

    fn set_tracked_entity(&mut self, entity: Option<EntityId>) {
        self.tracked = entity;
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn lives(&self) -> i64 {
        self.lives
    }

    fn toggle_menu(&mut self) {
        self.menu_shown = !self.menu_shown;
    }

    fn toggle_boss_image(&mut self) {
        self.boss_image_shown = !self.boss_image_shown;
    }

    fn show_game_over(&mut self) {
        self.game_over_shown = true;
        if self.auto_acknowledge {
            self.game_over_acknowledged = true;
        }
    }

    fn game_over_acknowledged(&self) -> bool {
        self.game_over_acknowledged
    }

    fn player_name(&self) -> String {
        self.player_name.clone()
    }
}
