//! System trait, action bindings and the system registry

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::archetype::{Archetype, ArchetypeRow};
use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;

/// Stable system identifier, assigned from a static table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub u32);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Whether the frame loop should keep going after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop,
}

impl Continuation {
    pub fn is_stop(self) -> bool {
        self == Continuation::Stop
    }
}

/// A named action and the archetype it is invoked with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: &'static str,
    pub archetype: Archetype,
}

impl Action {
    pub fn new(name: &'static str, archetype: Archetype) -> Self {
        Self { name, archetype }
    }
}

/// System trait
///
/// A system owns its own state and exposes named actions. Each action is
/// bound to one archetype and runs once per tick with the rows of that
/// archetype's bucket (possibly none).
pub trait System: 'static {
    /// Stable id; registering two systems with the same id is a no-op
    fn id(&self) -> SystemId;

    /// Get system name
    fn name(&self) -> &'static str;

    /// Action table, read once at registration
    fn actions(&self) -> Vec<Action>;

    /// One-time initialisation before the frame loop starts
    fn setup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        Ok(())
    }

    /// Run the named action
    fn run(
        &mut self,
        action: &str,
        dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation>;

    /// One-time cleanup after the frame loop halts
    fn cleanup(&mut self, _manager: &mut EcsManager, _surface: &SurfaceRef) -> Result<()> {
        Ok(())
    }
}

/// Shared system handle
pub type SystemRef = Rc<RefCell<dyn System>>;

/// A registered system and the bindings recorded for it
#[derive(Clone)]
pub struct SystemEntry {
    pub id: SystemId,
    pub name: &'static str,
    pub system: SystemRef,
    pub bindings: Vec<Action>,
}

/// Registered systems in registration order
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: SystemId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn insert(&mut self, entry: SystemEntry) {
        self.entries.push(entry);
    }

    pub fn remove(&mut self, id: SystemId) -> Option<SystemEntry> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position))
    }

    pub fn get(&self, id: SystemId) -> Option<&SystemEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Whether any registered action is bound to `archetype`
    pub fn references(&self, archetype: &Archetype) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.bindings.iter().any(|action| &action.archetype == archetype))
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<SystemId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Clone of every entry, for iteration while the manager is mutated
    pub fn snapshot(&self) -> Vec<SystemEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.id, entry.name)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentTypeId;

    struct Idle;

    impl System for Idle {
        fn id(&self) -> SystemId {
            SystemId(900)
        }

        fn name(&self) -> &'static str {
            "idle"
        }

        fn actions(&self) -> Vec<Action> {
            vec![Action::new("noop", Archetype::new(&[ComponentTypeId(1)]))]
        }

        fn run(
            &mut self,
            _action: &str,
            _dt: f32,
            _manager: &mut EcsManager,
            _rows: &[ArchetypeRow],
        ) -> Result<Continuation> {
            Ok(Continuation::Continue)
        }
    }

    fn entry_for(system: Idle) -> SystemEntry {
        SystemEntry {
            id: system.id(),
            name: system.name(),
            bindings: system.actions(),
            system: Rc::new(RefCell::new(system)),
        }
    }

    #[test]
    fn test_registry_references() {
        let mut registry = SystemRegistry::new();
        registry.insert(entry_for(Idle));

        assert!(registry.contains(SystemId(900)));
        assert!(registry.references(&Archetype::new(&[ComponentTypeId(1)])));
        assert!(!registry.references(&Archetype::new(&[ComponentTypeId(2)])));

        assert!(registry.remove(SystemId(900)).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(SystemId(900)).is_none());
    }

    #[test]
    fn test_continuation() {
        assert!(Continuation::Stop.is_stop());
        assert!(!Continuation::Continue.is_stop());
    }
}
