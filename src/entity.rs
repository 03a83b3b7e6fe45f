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

//! Entity identifiers and the live-entity registry.

use std::fmt;

use ahash::AHashSet;

/// Unique entity identifier.
///
/// Ids are handed out in strictly increasing order and are never reused,
/// even after the entity is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id. Only meaningful for ids previously issued by an allocator.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues entity ids and tracks which of them are live
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next: u64,
    live: AHashSet<EntityId>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id and mark it live
    pub fn create(&mut self) -> EntityId {
        let entity = EntityId(self.next);
        self.next += 1;
        self.live.insert(entity);
        entity
    }

    /// Stop tracking an entity. Returns false if it was not live.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.live.remove(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.live.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live entities in ascending id order
    pub fn sorted(&self) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self.live.iter().copied().collect();
        entities.sort_unstable();
        entities
    }
}
