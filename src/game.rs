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

//! Session driver: builds a game on an [`EcsManager`], runs it to the end
//! and records the result.
//!
//! ```no_run
//! use bullet_purgatory::config::GameConfig;
//! use bullet_purgatory::game::{record_outcome, run_session, starting_state};
//! use bullet_purgatory::surface::{HeadlessSurface, SurfaceRef};
//!
//! let config = GameConfig::default();
//! let surface: SurfaceRef = HeadlessSurface::new().close_after(600).into_shared();
//! let outcome = run_session(&config, &surface, starting_state(&config)).unwrap();
//! record_outcome(&config, &outcome).unwrap();
//! ```

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::colours;
use crate::components::{
    BulletData, Collider2D, EdgeHarm, EnemyEmitterCooldown, EnemyTag, LinearBulletEmitter, Lives,
    PlayerTag, RadialBulletEmitter, Score, ScreenElement, SpawnSource, SpawnStep, Spawner,
    Transform2D, UserInput, Velocity2D,
};
use crate::config::GameConfig;
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::persistence::{GameState, HighScores};
use crate::surface::SurfaceRef;
use crate::systems::{
    seeded_rng, BulletEmitterSystem, Collider2DSystem, EdgeHarmSystem, EnemyEmitterSystem,
    LifeSystem, LifespanSystem, Physics2DSystem, Render2DSystem, SpawnerSystem, UserInputSystem,
};
use crate::time::{FrameClock, WallClock};

/// Enemy sprite size, used for spawn spacing and margins
const ENEMY_SIZE: f32 = 20.0;
const ENEMY_PADDING: f32 = ENEMY_SIZE / 2.0;
const COLUMN_INTERVAL: f32 = 0.25;
const ROW_INTERVAL: f32 = 0.05;

const BULLET_VERTICES: [f32; 8] = [-5.0, 0.0, 0.0, 5.0, 5.0, 0.0, 0.0, -5.0];
const PLAYER_VERTICES: [f32; 8] = [-5.0, 10.0, 0.0, -10.0, 5.0, 10.0, 0.0, 5.0];
const ENEMY_VERTICES: [f32; 22] = [
    -3.0, 0.0, -5.0, 0.0, -7.0, 7.0, -10.0, 0.0, // left wing
    -7.0, -3.0, 7.0, -3.0, // body
    10.0, 0.0, 7.0, 7.0, 5.0, 0.0, 3.0, 0.0, // right wing
    0.0, 15.0,
];

/// Formation of the next group of enemies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePattern {
    Loner,
    Column,
    RowLeftToRight,
    RowRightToLeft,
}

impl WavePattern {
    pub const ALL: [WavePattern; 4] = [
        WavePattern::Loner,
        WavePattern::Column,
        WavePattern::RowLeftToRight,
        WavePattern::RowRightToLeft,
    ];
}

/// Difficulty knobs derived from the HUD score
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Difficulty {
    pub min_enemies: u32,
    pub max_enemies: u32,
    /// Pause after a complete wave
    pub wave_cooldown: f32,
    pub shooter_chance: f64,
    pub min_fire_cooldown: f32,
    pub max_fire_cooldown: f32,
    pub heavy_chance: f64,
}

impl Difficulty {
    pub fn for_score(score: i64) -> Self {
        let mut difficulty = Self {
            min_enemies: 2,
            max_enemies: 3,
            wave_cooldown: 1.0,
            shooter_chance: 0.125,
            min_fire_cooldown: 2.0,
            max_fire_cooldown: 3.0,
            heavy_chance: 0.0,
        };
        if score > 100 {
            difficulty.min_enemies = 4;
            difficulty.max_enemies = 5;
            difficulty.shooter_chance = 0.25;
            difficulty.min_fire_cooldown = 1.0;
            difficulty.heavy_chance = 0.05;
        }
        if score > 150 {
            difficulty.min_enemies = 6;
            difficulty.max_enemies = 7;
            difficulty.shooter_chance = 0.5;
            difficulty.heavy_chance = 0.075;
        }
        if score > 200 {
            difficulty.wave_cooldown = 0.75;
            difficulty.max_fire_cooldown = 2.0;
            difficulty.heavy_chance = 0.1;
        }
        difficulty
    }
}

/// Integer-valued uniform sample in `[lo, hi]`, or `lo` if the range is empty
fn sample_px(rng: &mut ChaCha8Rng, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = (lo as i64, hi as i64);
    if hi <= lo {
        lo as f32
    } else {
        rng.gen_range(lo..=hi) as f32
    }
}

/// Enemy spawn source. Picks a random pattern, queues its spawn steps, and
/// builds each enemy with score-dependent odds of being armed or armoured.
#[derive(Debug)]
pub struct EnemyWaves {
    rng: ChaCha8Rng,
    queue: VecDeque<SpawnStep>,
    /// Entity harmed when an enemy gets past the bottom edge
    target: EntityId,
    width: f32,
    height: f32,
    enemy_speed: f32,
}

impl EnemyWaves {
    pub fn new(rng: ChaCha8Rng, target: EntityId, config: &GameConfig) -> Self {
        Self {
            rng,
            queue: VecDeque::new(),
            target,
            width: config.width,
            height: config.height,
            enemy_speed: config.enemy_speed,
        }
    }

    /// Steps still queued from the current pattern
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue the steps of `pattern`
    pub fn queue_pattern(&mut self, pattern: WavePattern, score: i64) {
        let difficulty = Difficulty::for_score(score);
        let count = self
            .rng
            .gen_range(difficulty.min_enemies..=difficulty.max_enemies);
        let spacing = ENEMY_SIZE + ENEMY_PADDING;
        let span = count as f32 * spacing + ENEMY_SIZE;
        let py = ENEMY_SIZE;

        debug!("Queueing {pattern:?} wave of {count}");
        match pattern {
            WavePattern::Loner => {
                let px = sample_px(&mut self.rng, ENEMY_SIZE, self.width - ENEMY_SIZE);
                self.push(difficulty.wave_cooldown, px, py);
            }
            WavePattern::Column => {
                let px = sample_px(&mut self.rng, ENEMY_SIZE, self.width - ENEMY_SIZE);
                for _ in 0..count {
                    self.push(COLUMN_INTERVAL, px, py);
                }
                self.push(difficulty.wave_cooldown, px, py);
            }
            WavePattern::RowLeftToRight => {
                let mut px = sample_px(&mut self.rng, ENEMY_SIZE, self.width - span);
                for _ in 0..count {
                    self.push(ROW_INTERVAL, px, py);
                    px += spacing;
                }
                self.push(difficulty.wave_cooldown, px, py);
            }
            WavePattern::RowRightToLeft => {
                let mut px = sample_px(&mut self.rng, span, self.width - ENEMY_SIZE);
                for _ in 0..count {
                    self.push(ROW_INTERVAL, px, py);
                    px -= spacing;
                }
                self.push(difficulty.wave_cooldown, px, py);
            }
        }
    }

    fn push(&mut self, cooldown: f32, px: f32, py: f32) {
        self.queue.push_back(SpawnStep {
            cooldown,
            position: (px, py),
        });
    }

    fn bullet_data(speed: f32, colour: &str) -> BulletData {
        BulletData {
            size: 10.0,
            speed,
            vertices: BULLET_VERTICES.to_vec(),
            colours: vec![colour.to_string()],
            colour_idx: 0,
        }
    }
}

impl SpawnSource for EnemyWaves {
    fn next_spawn(&mut self, score: i64) -> SpawnStep {
        if self.queue.is_empty() {
            let pattern = WavePattern::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(WavePattern::Loner);
            self.queue_pattern(pattern, score);
        }
        self.queue.pop_front().unwrap_or(SpawnStep {
            cooldown: Difficulty::for_score(score).wave_cooldown,
            position: (self.width / 2.0, ENEMY_SIZE),
        })
    }

    fn instantiate(
        &mut self,
        position: (f32, f32),
        score: i64,
        manager: &mut EcsManager,
        surface: &SurfaceRef,
    ) -> Result<EntityId> {
        let difficulty = Difficulty::for_score(score);
        let collider = Collider2D::new(16.0, 25.0);

        let enemy = manager.create_entity();
        manager.register_component(enemy, EnemyTag)?;
        manager.register_component(enemy, Transform2D::new(position.0, position.1, 0.0))?;
        manager.register_component(enemy, collider)?;
        manager.register_component(enemy, Velocity2D::new(0.0, self.enemy_speed))?;
        manager.register_component(
            enemy,
            EdgeHarm {
                target: self.target,
                py: self.height + 2.0 * collider.sy,
            },
        )?;

        // Some enemies shoot back
        if self.rng.gen_bool(difficulty.shooter_chance) {
            let data = Self::bullet_data(180.0, colours::RED);
            manager.register_component(
                enemy,
                EnemyEmitterCooldown {
                    min: difficulty.min_fire_cooldown,
                    max: difficulty.max_fire_cooldown,
                },
            )?;
            if self.rng.gen_bool(0.5) {
                manager.register_component(enemy, LinearBulletEmitter { data, direction: 1 })?;
            } else {
                manager.register_component(
                    enemy,
                    RadialBulletEmitter {
                        data,
                        bullet_count: 4,
                        arc_offset: FRAC_PI_4,
                    },
                )?;
            }
        }

        // Some take two hits
        let (colour, lives) = if self.rng.gen_bool(difficulty.heavy_chance) {
            (colours::MAGENTA, 2)
        } else {
            (colours::YELLOW, 1)
        };
        let handle = surface.borrow_mut().draw_poly(&ENEMY_VERTICES, colour);
        manager.register_component(
            enemy,
            ScreenElement {
                handle,
                vertices: ENEMY_VERTICES.to_vec(),
            },
        )?;
        manager.register_component(enemy, Lives { count: lives })?;

        Ok(enemy)
    }
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub name: String,
    pub score: i64,
}

/// Saved state if there is a valid one, otherwise the configured start
pub fn starting_state(config: &GameConfig) -> GameState {
    GameState::load(&config.state_path)
        .unwrap_or_else(|| GameState::new(config.starting_score, config.starting_lives))
}

/// Register every gameplay system, create the player and the enemy spawner,
/// and track the player on the HUD. Returns the player.
pub fn build_session(
    manager: &mut EcsManager,
    surface: &SurfaceRef,
    config: &GameConfig,
    start: GameState,
) -> Result<EntityId> {
    manager.register_system(Render2DSystem::new());
    manager.register_system(Collider2DSystem::new());
    manager.register_system(EdgeHarmSystem::new());
    manager.register_system(Physics2DSystem::new());
    manager.register_system(UserInputSystem::new(config));
    manager.register_system(LifeSystem::new());
    manager.register_system(LifespanSystem::new());
    manager.register_system(BulletEmitterSystem::new(config));
    manager.register_system(SpawnerSystem::new());
    manager.register_system(EnemyEmitterSystem::new(seeded_rng(config.seed, 1)));

    let player = manager.create_entity();
    manager.register_component(player, PlayerTag)?;
    surface.borrow_mut().set_tracked_entity(Some(player));

    let handle = surface
        .borrow_mut()
        .draw_poly(&PLAYER_VERTICES, colours::CYAN);
    manager.register_component(
        player,
        Transform2D::new(config.width / 2.0, config.height / 2.0, 0.0),
    )?;
    manager.register_component(player, Collider2D::new(10.0, 20.0))?;
    manager.register_component(player, Velocity2D::default())?;
    manager.register_component(
        player,
        UserInput {
            speed: config.player_speed,
        },
    )?;
    manager.register_component(
        player,
        ScreenElement {
            handle,
            vertices: PLAYER_VERTICES.to_vec(),
        },
    )?;
    manager.register_component(player, Score { count: start.score })?;
    manager.register_component(player, Lives { count: start.lives })?;

    let bullets = EnemyWaves::bullet_data(-270.0, colours::CYAN);
    manager.register_component(
        player,
        LinearBulletEmitter {
            data: bullets.clone(),
            direction: -1,
        },
    )?;
    manager.register_component(
        player,
        RadialBulletEmitter {
            data: bullets,
            bullet_count: 48,
            arc_offset: 0.0,
        },
    )?;

    let spawner = manager.create_entity();
    manager.register_component(
        spawner,
        Spawner::new(EnemyWaves::new(seeded_rng(config.seed, 2), player, config)),
    )?;

    info!("Session built: player {player}, spawner {spawner}");
    Ok(player)
}

/// Build, set up, run and tear down one session on wall-clock time
pub fn run_session(config: &GameConfig, surface: &SurfaceRef, start: GameState) -> Result<SessionOutcome> {
    run_session_with(config, surface, start, &mut WallClock::new())
}

/// [`run_session`] on an explicit clock
pub fn run_session_with(
    config: &GameConfig,
    surface: &SurfaceRef,
    start: GameState,
    clock: &mut dyn FrameClock,
) -> Result<SessionOutcome> {
    let mut manager = EcsManager::new();
    build_session(&mut manager, surface, config, start)?;

    manager.setup(surface)?;
    let processed = manager.process_with(clock);
    let cleaned = manager.cleanup(surface);
    processed?;
    cleaned?;

    let surface = surface.borrow();
    let outcome = SessionOutcome {
        name: surface.player_name(),
        score: surface.score(),
    };
    info!("Session over: {} scored {}", outcome.name, outcome.score);
    Ok(outcome)
}

/// Fold `outcome` into the high-score table on disk
pub fn record_outcome(config: &GameConfig, outcome: &SessionOutcome) -> Result<HighScores> {
    let mut scores = HighScores::load(&config.scores_path)?;
    scores.record(&outcome.name, outcome.score);
    scores.save(&config.scores_path)?;
    Ok(scores)
}
