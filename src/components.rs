// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gameplay components
//!
//! Every component type id is assigned in the single table at the bottom of
//! this file. Ids are part of the archetype keys, so they must never be
//! reused for a different type.

use std::fmt;

use crate::entity::EntityId;
use crate::error::Result;
use crate::impl_component;
use crate::manager::EcsManager;
use crate::surface::{Handle, SurfaceRef};

/// Position (pixels) and rotation (radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform2D {
    pub px: f32,
    pub py: f32,
    pub theta: f32,
}

impl Transform2D {
    pub fn new(px: f32, py: f32, theta: f32) -> Self {
        Self { px, py, theta }
    }
}

/// Axis-aligned bounding box size, centred on the transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider2D {
    pub sx: f32,
    pub sy: f32,
}

impl Collider2D {
    pub fn new(sx: f32, sy: f32) -> Self {
        Self { sx, sy }
    }
}

/// Velocity in pixels per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity2D {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity2D {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

/// Drawn polygon and its vertices relative to the transform
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenElement {
    pub handle: Handle,
    pub vertices: Vec<f32>,
}

/// Marks an entity for removal on the next stale sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaleTag;

/// Costs `target` a life once the entity passes `py`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHarm {
    pub target: EntityId,
    pub py: f32,
}

/// Driven by keyboard input at `speed` pixels per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserInput {
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lives {
    pub count: i64,
}

/// Remaining time to live, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifespan {
    pub ttl: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnemyTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulletTag;

/// Shared bullet parameters of an emitter. Not a component.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletData {
    pub size: f32,
    /// Signed speed along the emitter's axis. Linear emitters take the sign
    /// from their `direction` instead.
    pub speed: f32,
    pub vertices: Vec<f32>,
    pub colours: Vec<String>,
    /// Colour of the next bullet; cycles through `colours`
    pub colour_idx: usize,
}

impl BulletData {
    /// Colour for the next bullet, advancing the cycle
    pub fn next_colour(&mut self) -> String {
        if self.colours.is_empty() {
            return String::from(crate::colours::WHITE);
        }
        let colour = self.colours[self.colour_idx % self.colours.len()].clone();
        self.colour_idx = (self.colour_idx + 1) % self.colours.len();
        colour
    }
}

/// Fires single bullets along the y axis
#[derive(Debug, Clone, PartialEq)]
pub struct LinearBulletEmitter {
    pub data: BulletData,
    /// Sign of the bullet's y velocity: negative fires up the screen,
    /// positive down. Only the magnitude of `data.speed` is used.
    pub direction: i8,
}

impl LinearBulletEmitter {
    /// Bullet y velocity
    pub fn velocity_y(&self) -> f32 {
        f32::from(self.direction.signum()) * self.data.speed.abs()
    }
}

/// One-shot request for the linear emitter to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireLinearBulletEmitter;

/// Fires `bullet_count` bullets evenly spread over a full turn
#[derive(Debug, Clone, PartialEq)]
pub struct RadialBulletEmitter {
    pub data: BulletData,
    pub bullet_count: u32,
    /// Angle of the first bullet, in radians
    pub arc_offset: f32,
}

/// One-shot request for the radial emitter to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireRadialBulletEmitter;

/// Where and when a spawner produces its next entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnStep {
    /// Seconds to wait after this spawn
    pub cooldown: f32,
    pub position: (f32, f32),
}

/// Drives a [`Spawner`]: yields spawn steps and builds the spawned entities
pub trait SpawnSource: fmt::Debug {
    /// Next step; `score` is the score currently shown on the HUD
    fn next_spawn(&mut self, score: i64) -> SpawnStep;

    /// Create an entity at `position`
    fn instantiate(
        &mut self,
        position: (f32, f32),
        score: i64,
        manager: &mut EcsManager,
        surface: &SurfaceRef,
    ) -> Result<EntityId>;
}

#[derive(Debug)]
pub struct Spawner {
    pub source: Box<dyn SpawnSource>,
}

impl Spawner {
    pub fn new(source: impl SpawnSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

/// Random firing interval of an enemy, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyEmitterCooldown {
    pub min: f32,
    pub max: f32,
}

impl_component! {
    Transform2D => 0,
    Collider2D => 1,
    Velocity2D => 2,
    ScreenElement => 3,
    StaleTag => 4,
    EdgeHarm => 5,
    UserInput => 6,
    Score => 7,
    Lives => 8,
    Lifespan => 9,
    PlayerTag => 10,
    EnemyTag => 11,
    BulletTag => 12,
    LinearBulletEmitter => 13,
    FireLinearBulletEmitter => 14,
    RadialBulletEmitter => 15,
    FireRadialBulletEmitter => 16,
    Spawner => 17,
    EnemyEmitterCooldown => 18,
}
