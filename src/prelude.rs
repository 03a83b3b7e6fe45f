//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use bullet_purgatory::prelude::*;
//! ```

pub use crate::archetype::{Archetype, ArchetypeRow};
pub use crate::component::{Component, ComponentRef, ComponentType, ComponentTypeId};
pub use crate::components::*;
pub use crate::config::GameConfig;
pub use crate::entity::EntityId;
pub use crate::error::{EcsError, Result};
pub use crate::game::{build_session, record_outcome, run_session, starting_state, SessionOutcome};
pub use crate::manager::{EcsManager, Registration};
pub use crate::persistence::{GameState, HighScores};
pub use crate::surface::{HeadlessSurface, Surface, SurfaceEvent, SurfaceRef};
pub use crate::system::{Action, Continuation, System, SystemId};
pub use crate::time::{FixedClock, FrameClock, Time, WallClock};
pub use crate::{archetype, impl_component};
