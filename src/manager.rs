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

//! EcsManager: central entity, component, archetype and system registry
//!
//! All state is confined to one logical thread. Components and systems are
//! shared through `Rc<RefCell<..>>`, so the manager is neither `Send` nor
//! `Sync`.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::archetype::{Archetype, ArchetypeIndex, ArchetypeRow};
use crate::component::{Component, ComponentRef, ComponentSlot, ComponentType, ComponentTypeId};
use crate::entity::{EntityAllocator, EntityId};
use crate::error::{EcsError, Result};
use crate::storage::ComponentStore;
use crate::system::{System, SystemEntry, SystemId, SystemRef, SystemRegistry};
use crate::time::Time;

/// Outcome of [`EcsManager::register_component`]
#[derive(Debug)]
pub enum Registration {
    /// The entity had no component of this type; this is the new one
    Inserted(ComponentRef),
    /// The entity already had one. Its slot now holds the new value and the
    /// evicted value is handed back.
    Replaced {
        current: ComponentRef,
        previous: Box<dyn Component>,
    },
}

impl Registration {
    pub fn is_replacement(&self) -> bool {
        matches!(self, Registration::Replaced { .. })
    }

    /// Slot now holding the registered value
    pub fn component(&self) -> &ComponentRef {
        match self {
            Registration::Inserted(current) | Registration::Replaced { current, .. } => current,
        }
    }

    /// The evicted value, if this was a replacement
    pub fn into_previous(self) -> Option<Box<dyn Component>> {
        match self {
            Registration::Inserted(_) => None,
            Registration::Replaced { previous, .. } => Some(previous),
        }
    }
}

/// Central ECS manager
pub struct EcsManager {
    pub(crate) entities: EntityAllocator,
    pub(crate) components: ComponentStore,
    pub(crate) archetypes: ArchetypeIndex,
    pub(crate) systems: SystemRegistry,
    pub(crate) time: Time,
}

impl EcsManager {
    /// Create a new, empty manager.
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: ComponentStore::new(),
            archetypes: ArchetypeIndex::new(),
            systems: SystemRegistry::new(),
            time: Time::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Register a system and create any archetype buckets its actions need.
    /// Returns false (and does nothing) if a system with the same id is
    /// already registered.
    pub fn register_system<S: System>(&mut self, system: S) -> bool {
        let id = system.id();
        let name = system.name();
        debug!("Registering system {name} ({id})");

        if self.systems.contains(id) {
            return false;
        }

        let bindings = system.actions();
        for action in &bindings {
            self.archetypes
                .create_bucket(action.archetype.clone(), &self.components);
        }

        let system: SystemRef = Rc::new(RefCell::new(system));
        self.systems.insert(SystemEntry {
            id,
            name,
            system,
            bindings,
        });
        true
    }

    /// Deregister a system. Buckets no other registered action needs are
    /// dropped. Returns false if the system was not registered.
    pub fn deregister_system(&mut self, id: SystemId) -> bool {
        let Some(entry) = self.systems.remove(id) else {
            return false;
        };
        debug!("Deregistering system {} ({id})", entry.name);

        for action in &entry.bindings {
            if !self.systems.references(&action.archetype) {
                self.archetypes.drop_bucket(&action.archetype);
            }
        }
        true
    }

    pub fn is_registered(&self, id: SystemId) -> bool {
        self.systems.contains(id)
    }

    pub fn system(&self, id: SystemId) -> Option<SystemRef> {
        self.systems.get(id).map(|entry| Rc::clone(&entry.system))
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create and start tracking a new entity
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.create()
    }

    /// Destroy an entity, deregistering every component it holds first.
    /// Returns the components it held, ordered by component type id.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<Vec<ComponentRef>> {
        self.ensure_alive(entity, "destroy entity")?;

        let held = self.components.components_of(entity);
        for slot in &held {
            self.deregister_component(entity, slot.component_type())?;
        }

        self.entities.remove(entity);
        debug!("Destroyed entity {entity} ({} components)", held.len());
        Ok(held)
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in ascending id order
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities.sorted()
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Register `component` on `entity`.
    ///
    /// A fresh registration adds the entity to every bucket it now
    /// qualifies for. Registering a type the entity already holds swaps the
    /// value in place (bucket membership is unchanged) and returns the
    /// evicted value in [`Registration::Replaced`].
    ///
    /// Replacement needs the old value unborrowed. A system that still holds
    /// a `get`/`get_mut` borrow of the same slot (for example through its
    /// row) gets [`EcsError::ComponentBorrowed`], and returning that error
    /// from an action aborts the frame loop. Drop row borrows before
    /// re-registering a type the entity already holds.
    pub fn register_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<Registration> {
        self.register_boxed(entity, Box::new(component))
    }

    /// Type-erased form of [`register_component`](Self::register_component)
    pub fn register_boxed(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<Registration> {
        self.ensure_alive(entity, "register component")?;

        let component_type = component.component_type();
        debug!("Registering component type {component_type} for entity {entity}");

        if let Some(current) = self.components.get(entity, component_type).cloned() {
            warn!("Entity {entity} has existing component of type {component_type}!");
            let previous = current
                .replace(component)
                .ok_or(EcsError::ComponentBorrowed {
                    entity,
                    component: component_type,
                })?;
            return Ok(Registration::Replaced { current, previous });
        }

        let slot = ComponentSlot::new(entity, component);
        self.components.insert(Rc::clone(&slot));
        self.archetypes.admit(entity, &self.components);
        Ok(Registration::Inserted(slot))
    }

    /// Fetch the component of a type registered on `entity`, if any
    pub fn fetch_component(
        &self,
        entity: EntityId,
        component_type: ComponentTypeId,
    ) -> Result<Option<ComponentRef>> {
        self.ensure_alive(entity, "fetch component")?;
        Ok(self.components.get(entity, component_type).cloned())
    }

    pub fn fetch<T: ComponentType>(&self, entity: EntityId) -> Result<Option<ComponentRef>> {
        self.fetch_component(entity, T::TYPE_ID)
    }

    pub fn has<T: ComponentType>(&self, entity: EntityId) -> Result<bool> {
        self.ensure_alive(entity, "fetch component")?;
        Ok(self.components.contains(entity, T::TYPE_ID))
    }

    /// Remove a component from `entity` and every bucket requiring its type.
    /// Returns `None` with no side effects if the entity has no such component.
    pub fn deregister_component(
        &mut self,
        entity: EntityId,
        component_type: ComponentTypeId,
    ) -> Result<Option<ComponentRef>> {
        self.ensure_alive(entity, "deregister component")?;

        if !self.components.contains(entity, component_type) {
            return Ok(None);
        }

        debug!("Deregistering component type {component_type} for entity {entity}");
        self.archetypes.evict(entity, component_type);
        Ok(self.components.remove(entity, component_type))
    }

    pub fn deregister<T: ComponentType>(&mut self, entity: EntityId) -> Result<Option<ComponentRef>> {
        self.deregister_component(entity, T::TYPE_ID)
    }

    // ---------------------------------------------------------------------
    // Archetypes
    // ---------------------------------------------------------------------

    /// Rows currently in an archetype bucket, in no particular order.
    /// Returns `None` (with a warning) if no system ever declared it.
    pub fn fetch_archetype(&self, archetype: &Archetype) -> Option<Vec<ArchetypeRow>> {
        let rows = self.archetypes.rows(archetype);
        if rows.is_none() {
            warn!("Tried to fetch unknown archetype {archetype}!");
        }
        rows
    }

    pub fn archetype_index(&self) -> &ArchetypeIndex {
        &self.archetypes
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Freeze simulation time. The frame loop keeps running with `dt == 0`.
    pub fn pause(&mut self) {
        self.time.pause();
    }

    pub fn unpause(&mut self) {
        self.time.unpause();
    }

    pub fn is_paused(&self) -> bool {
        self.time.is_paused()
    }

    fn ensure_alive(&self, entity: EntityId, operation: &str) -> Result<()> {
        if self.entities.contains(entity) {
            Ok(())
        } else {
            error!("UNKNOWN ENTITY: {entity} ({operation})");
            Err(EcsError::UnknownEntity(entity))
        }
    }
}

impl Default for EcsManager {
    fn default() -> Self {
        Self::new()
    }
}
