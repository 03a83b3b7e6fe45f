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

//! Archetype keys and the denormalised archetype index
//!
//! An archetype is an ORDERED tuple of component type ids. `(A, B)` and
//! `(B, A)` are different keys with separate buckets, so systems that want to
//! share a bucket must declare their component lists in the same order.
//!
//! Each bucket maps an entity to a row holding the entity's component slots in
//! archetype order. An entity is in a bucket exactly when it holds a component
//! of every type in the key. The index is maintained by the manager on
//! component and system (de)registration; gameplay code only reads it.

use std::cell::{Ref, RefMut};
use std::fmt;

use ahash::AHashMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::component::{ComponentRef, ComponentType, ComponentTypeId};
use crate::entity::EntityId;
use crate::storage::ComponentStore;

/// Component signature
pub type ArchetypeSignature = SmallVec<[ComponentTypeId; 8]>;

/// Ordered component type tuple used as a bucket key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Archetype(ArchetypeSignature);

impl Archetype {
    pub fn new(types: &[ComponentTypeId]) -> Self {
        Self(types.iter().copied().collect())
    }

    /// Get signature
    pub fn types(&self) -> &[ComponentTypeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this archetype requires the given component type
    pub fn requires(&self, component_type: ComponentTypeId) -> bool {
        self.0.contains(&component_type)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, component_type) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component_type}")?;
        }
        write!(f, ")")
    }
}

/// Build an [`Archetype`] from component types, in the given order.
///
/// ```ignore
/// let moving = archetype![Transform2D, Velocity2D];
/// ```
#[macro_export]
macro_rules! archetype {
    ($($t:ty),* $(,)?) => {
        $crate::archetype::Archetype::new(&[
            $(<$t as $crate::component::ComponentType>::TYPE_ID),*
        ])
    };
}

/// One entity's component slots, in archetype order
#[derive(Debug, Clone)]
pub struct ArchetypeRow {
    entity: EntityId,
    components: SmallVec<[ComponentRef; 4]>,
}

impl ArchetypeRow {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn slot(&self, index: usize) -> Option<&ComponentRef> {
        self.components.get(index)
    }

    /// Borrow the component at `index` as `T`
    pub fn get<T: ComponentType>(&self, index: usize) -> Option<Ref<'_, T>> {
        self.components.get(index)?.get::<T>()
    }

    /// Mutably borrow the component at `index` as `T`
    pub fn get_mut<T: ComponentType>(&self, index: usize) -> Option<RefMut<'_, T>> {
        self.components.get(index)?.get_mut::<T>()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Fixed hasher: a seeded session replays rows in the same order
type Bucket = FxHashMap<EntityId, ArchetypeRow>;

/// Archetype buckets, kept in creation order
#[derive(Debug, Default)]
pub struct ArchetypeIndex {
    buckets: AHashMap<Archetype, Bucket>,
    order: Vec<Archetype>,
}

impl ArchetypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, archetype: &Archetype) -> bool {
        self.buckets.contains_key(archetype)
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Indexed archetypes in creation order
    pub fn archetypes(&self) -> &[Archetype] {
        &self.order
    }

    /// Create a bucket and back-fill it from the store.
    /// Returns false if the bucket already existed.
    pub fn create_bucket(&mut self, archetype: Archetype, store: &ComponentStore) -> bool {
        if self.buckets.contains_key(&archetype) {
            return false;
        }

        let mut bucket = Bucket::default();
        if let Some(&first) = archetype.types().first() {
            for entity in store.entities_with(first) {
                if let Some(row) = build_row(&archetype, entity, store) {
                    bucket.insert(entity, row);
                }
            }
        }

        debug!(
            "New archetype encountered: {archetype} ({} existing members)",
            bucket.len()
        );
        self.order.push(archetype.clone());
        self.buckets.insert(archetype, bucket);
        true
    }

    /// Drop a bucket and all cached membership
    pub fn drop_bucket(&mut self, archetype: &Archetype) -> bool {
        if self.buckets.remove(archetype).is_none() {
            return false;
        }
        self.order.retain(|a| a != archetype);
        debug!("Deregistered stale archetype: {archetype}");
        true
    }

    /// Add `entity` to every bucket it now qualifies for
    pub fn admit(&mut self, entity: EntityId, store: &ComponentStore) {
        for (archetype, bucket) in self.buckets.iter_mut() {
            if archetype.is_empty() || bucket.contains_key(&entity) {
                continue;
            }

            if let Some(row) = build_row(archetype, entity, store) {
                debug!("Adding entity {entity} to archetype bucket: {archetype}");
                bucket.insert(entity, row);
            }
        }
    }

    /// Remove `entity` from every bucket whose key requires `component_type`
    pub fn evict(&mut self, entity: EntityId, component_type: ComponentTypeId) {
        for (archetype, bucket) in self.buckets.iter_mut() {
            if archetype.requires(component_type) && bucket.remove(&entity).is_some() {
                debug!("Removing entity {entity} from archetype bucket: {archetype}");
            }
        }
    }

    /// Snapshot of a bucket's rows (cheap `Rc` clones)
    pub fn rows(&self, archetype: &Archetype) -> Option<Vec<ArchetypeRow>> {
        self.buckets
            .get(archetype)
            .map(|bucket| bucket.values().cloned().collect())
    }

    pub fn bucket_len(&self, archetype: &Archetype) -> Option<usize> {
        self.buckets.get(archetype).map(|bucket| bucket.len())
    }

    pub fn contains_entity(&self, archetype: &Archetype, entity: EntityId) -> bool {
        self.buckets
            .get(archetype)
            .is_some_and(|bucket| bucket.contains_key(&entity))
    }
}

fn build_row(archetype: &Archetype, entity: EntityId, store: &ComponentStore) -> Option<ArchetypeRow> {
    let components = archetype
        .types()
        .iter()
        .map(|&component_type| store.get(entity, component_type).cloned())
        .collect::<Option<SmallVec<[ComponentRef; 4]>>>()?;

    Some(ArchetypeRow { entity, components })
}

#[cfg(test)]
mod tests {
    #![allow(dead_code)]
    use super::*;
    use crate::component::ComponentSlot;
    use crate::impl_component;

    #[derive(Debug)]
    struct A(i32);

    #[derive(Debug)]
    struct B(i32);

    impl_component! {
        A => 300,
        B => 301,
    }

    fn insert(store: &mut ComponentStore, entity: EntityId, value: Box<dyn crate::component::Component>) {
        store.insert(ComponentSlot::new(entity, value));
    }

    #[test]
    fn test_archetype_is_ordered() {
        assert_ne!(archetype![A, B], archetype![B, A]);
        assert_eq!(archetype![A, B], archetype![A, B]);
        assert_eq!(archetype![A, B].to_string(), "(c300, c301)");
    }

    #[test]
    fn test_admit_requires_every_type() {
        let mut store = ComponentStore::new();
        let mut index = ArchetypeIndex::new();
        let both = archetype![A, B];
        index.create_bucket(both.clone(), &store);

        let entity = EntityId::from_raw(0);
        insert(&mut store, entity, Box::new(A(1)));
        index.admit(entity, &store);
        assert!(!index.contains_entity(&both, entity));

        insert(&mut store, entity, Box::new(B(2)));
        index.admit(entity, &store);
        assert!(index.contains_entity(&both, entity));

        let rows = index.rows(&both).unwrap();
        assert_eq!(rows[0].get::<A>(0).unwrap().0, 1);
        assert_eq!(rows[0].get::<B>(1).unwrap().0, 2);
    }

    #[test]
    fn test_create_bucket_backfills() {
        let mut store = ComponentStore::new();
        let entity = EntityId::from_raw(9);
        insert(&mut store, entity, Box::new(A(1)));
        insert(&mut store, entity, Box::new(B(1)));

        let mut index = ArchetypeIndex::new();
        assert!(index.create_bucket(archetype![B, A], &store));
        assert!(!index.create_bucket(archetype![B, A], &store));
        assert_eq!(index.bucket_len(&archetype![B, A]), Some(1));
    }

    #[test]
    fn test_evict_and_drop() {
        let mut store = ComponentStore::new();
        let mut index = ArchetypeIndex::new();
        let only_a = archetype![A];
        let only_b = archetype![B];
        index.create_bucket(only_a.clone(), &store);
        index.create_bucket(only_b.clone(), &store);

        let entity = EntityId::from_raw(1);
        insert(&mut store, entity, Box::new(A(1)));
        insert(&mut store, entity, Box::new(B(1)));
        index.admit(entity, &store);

        index.evict(entity, A::TYPE_ID);
        assert!(!index.contains_entity(&only_a, entity));
        assert!(index.contains_entity(&only_b, entity));

        assert!(index.drop_bucket(&only_a));
        assert!(!index.drop_bucket(&only_a));
        assert_eq!(index.archetypes(), &[only_b][..]);
    }

    #[test]
    fn test_empty_archetype_has_no_members() {
        let mut store = ComponentStore::new();
        let mut index = ArchetypeIndex::new();
        index.create_bucket(archetype![], &store);

        let entity = EntityId::from_raw(0);
        insert(&mut store, entity, Box::new(A(0)));
        index.admit(entity, &store);
        assert_eq!(index.bucket_len(&archetype![]), Some(0));
    }
}
