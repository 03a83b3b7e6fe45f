//! Component store: the single source of truth for component ownership.
//!
//! Maps `component type -> (entity -> slot)`. An entity appears at most once
//! under each component type. Maps use a fixed hasher so iteration order
//! depends only on the registration history.

use rustc_hash::FxHashMap;

use crate::component::{ComponentRef, ComponentTypeId};
use crate::entity::EntityId;

/// Per-component-type entity maps
#[derive(Debug, Default)]
pub struct ComponentStore {
    columns: FxHashMap<ComponentTypeId, FxHashMap<EntityId, ComponentRef>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: EntityId, component_type: ComponentTypeId) -> Option<&ComponentRef> {
        self.columns.get(&component_type)?.get(&entity)
    }

    pub fn contains(&self, entity: EntityId, component_type: ComponentTypeId) -> bool {
        self.get(entity, component_type).is_some()
    }

    /// Insert a slot under its own type and owner. Returns any slot it displaced.
    pub fn insert(&mut self, slot: ComponentRef) -> Option<ComponentRef> {
        let component_type = slot.component_type();
        let column = self.columns.entry(component_type).or_insert_with(|| {
            tracing::debug!("New component type: {component_type}");
            FxHashMap::default()
        });
        column.insert(slot.owner(), slot)
    }

    pub fn remove(&mut self, entity: EntityId, component_type: ComponentTypeId) -> Option<ComponentRef> {
        self.columns.get_mut(&component_type)?.remove(&entity)
    }

    /// Every component held by `entity`, ordered by component type id
    pub fn components_of(&self, entity: EntityId) -> Vec<ComponentRef> {
        let mut held: Vec<ComponentRef> = self
            .columns
            .values()
            .filter_map(|column| column.get(&entity).cloned())
            .collect();
        held.sort_by_key(|slot| slot.component_type());
        held
    }

    /// Entities holding a component of the given type
    pub fn entities_with(&self, component_type: ComponentTypeId) -> Vec<EntityId> {
        self.columns
            .get(&component_type)
            .map(|column| column.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of components registered under a type
    pub fn count(&self, component_type: ComponentTypeId) -> usize {
        self.columns.get(&component_type).map_or(0, |column| column.len())
    }
}
