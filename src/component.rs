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

//! Component traits and shared component slots
//!
//! Components are data attached to entities. Every component type carries a
//! stable numeric id assigned in one static table through [`impl_component!`],
//! so ids never depend on declaration or import order.
//!
//! A registered component lives in a [`ComponentSlot`]. The store and every
//! archetype row that needs it hold clones of the same `Rc`, so a mutation made
//! by one system is visible to every other holder without a re-fetch.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::entity::EntityId;

/// Stable numeric component type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(pub u32);

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Capability interface every component implements
///
/// Use [`impl_component!`] rather than implementing this by hand.
pub trait Component: Any + fmt::Debug {
    /// Stable type id of the concrete component
    fn component_type(&self) -> ComponentTypeId;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Statically known component type
pub trait ComponentType: Component + Sized {
    const TYPE_ID: ComponentTypeId;
}

impl dyn Component {
    pub fn is<T: ComponentType>(&self) -> bool {
        self.component_type() == T::TYPE_ID
    }

    pub fn downcast_ref<T: ComponentType>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Implement [`Component`] and [`ComponentType`] for a list of types.
///
/// ```ignore
/// impl_component! {
///     Position => 0,
///     Velocity => 1,
/// }
/// ```
#[macro_export]
macro_rules! impl_component {
    ($($t:ty => $id:expr),* $(,)?) => {
        $(
            impl $crate::component::Component for $t {
                fn component_type(&self) -> $crate::component::ComponentTypeId {
                    <$t as $crate::component::ComponentType>::TYPE_ID
                }

                fn as_any(&self) -> &dyn std::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                    self
                }
            }

            impl $crate::component::ComponentType for $t {
                const TYPE_ID: $crate::component::ComponentTypeId =
                    $crate::component::ComponentTypeId($id);
            }
        )*
    };
}

/// Shared handle to a registered component
pub type ComponentRef = Rc<ComponentSlot>;

/// A registered component together with its owning entity
pub struct ComponentSlot {
    owner: EntityId,
    component_type: ComponentTypeId,
    value: RefCell<Box<dyn Component>>,
}

impl ComponentSlot {
    pub(crate) fn new(owner: EntityId, value: Box<dyn Component>) -> ComponentRef {
        Rc::new(Self {
            owner,
            component_type: value.component_type(),
            value: RefCell::new(value),
        })
    }

    /// Entity this component was registered on. Fixed for the slot's lifetime.
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn component_type(&self) -> ComponentTypeId {
        self.component_type
    }

    pub fn is<T: ComponentType>(&self) -> bool {
        self.component_type == T::TYPE_ID
    }

    /// Borrow the type-erased value
    ///
    /// # Panics
    /// Panics if the value is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn Component> {
        Ref::map(self.value.borrow(), |value| &**value)
    }

    /// Borrow the value as `T`. Returns `None` if the slot holds another type.
    ///
    /// # Panics
    /// Panics if the value is currently mutably borrowed.
    pub fn get<T: ComponentType>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.value.borrow(), |value| (**value).downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the value as `T`. Returns `None` if the slot holds another type.
    ///
    /// # Panics
    /// Panics if the value is currently borrowed.
    pub fn get_mut<T: ComponentType>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.value.borrow_mut(), |value| {
            (**value).downcast_mut::<T>()
        })
        .ok()
    }

    /// Swap in a new value, keeping the slot (and every row holding it) in place.
    /// Returns `None` without changing anything if the value is borrowed.
    pub(crate) fn replace(&self, value: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let mut current = self.value.try_borrow_mut().ok()?;
        Some(std::mem::replace(&mut *current, value))
    }
}

impl fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ComponentSlot");
        debug
            .field("owner", &self.owner)
            .field("component_type", &self.component_type);
        match self.value.try_borrow() {
            Ok(value) => debug.field("value", &*value),
            Err(_) => debug.field("value", &"<borrowed>"),
        };
        debug.finish()
    }
}
