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

//! Bullet Purgatory - archetype-indexed ECS and the shoot-'em-up built on it
//!
//! The core is a single-threaded entity-component-system:
//! - [`EcsManager`] owns entities, components, archetype buckets and systems
//! - systems declare named actions bound to an [`Archetype`] and receive that
//!   archetype's rows once per tick
//! - a tick visits buckets in creation order, then systems in registration
//!   order, then actions in declaration order
//!
//! The game lives in [`components`], [`systems`] and [`game`]; display and
//! input go through the [`surface::Surface`] trait.

pub mod archetype;
pub mod colours;
pub mod component;
pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod game;
pub mod input;
pub mod manager;
pub mod persistence;
pub mod prelude;
pub mod storage;
pub mod surface;
pub mod system;
pub mod systems;
pub mod time;

#[cfg(test)]
mod tests;

pub use archetype::*;
pub use component::*;
pub use entity::*;
pub use error::*;
pub use manager::*;
pub use surface::*;
pub use system::*;
pub use time::*;
