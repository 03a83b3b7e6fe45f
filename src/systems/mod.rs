//! Gameplay systems
//!
//! Registration order matters: it fixes the order in which archetype
//! buckets are created and so the order systems run within a tick.
//! [`crate::game::build_session`] registers them in the order of
//! [`ALL_SYSTEMS`].

mod bullet_emitter;
mod collision;
mod edge_harm;
mod enemy_emitter;
mod life;
mod lifespan;
mod physics;
mod render;
mod spawner;
mod user_input;

pub use bullet_emitter::BulletEmitterSystem;
pub use collision::{overlaps, Collider2DSystem};
pub use edge_harm::EdgeHarmSystem;
pub use enemy_emitter::EnemyEmitterSystem;
pub use life::LifeSystem;
pub use lifespan::LifespanSystem;
pub use physics::Physics2DSystem;
pub use render::Render2DSystem;
pub use spawner::SpawnerSystem;
pub use user_input::{Cooldown, UserInputSystem};

use ahash::{AHashMap, AHashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::archetype::ArchetypeRow;
use crate::components::StaleTag;
use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::SystemId;

pub const RENDER_2D: SystemId = SystemId(0);
pub const COLLIDER_2D: SystemId = SystemId(1);
pub const EDGE_HARM: SystemId = SystemId(2);
pub const PHYSICS_2D: SystemId = SystemId(3);
pub const USER_INPUT: SystemId = SystemId(4);
pub const LIFE: SystemId = SystemId(5);
pub const LIFESPAN: SystemId = SystemId(6);
pub const BULLET_EMITTER: SystemId = SystemId(7);
pub const SPAWNER: SystemId = SystemId(8);
pub const ENEMY_EMITTER: SystemId = SystemId(9);

/// Every gameplay system id, in registration order
pub const ALL_SYSTEMS: [SystemId; 10] = [
    RENDER_2D,
    COLLIDER_2D,
    EDGE_HARM,
    PHYSICS_2D,
    USER_INPUT,
    LIFE,
    LIFESPAN,
    BULLET_EMITTER,
    SPAWNER,
    ENEMY_EMITTER,
];

/// Random stream `stream` for `seed`, or an entropy-seeded generator
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> ChaCha8Rng {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    rng.set_stream(stream);
    rng
}

/// Tag `entity` for removal, unless it already is
pub fn mark_stale(manager: &mut EcsManager, entity: EntityId) -> Result<()> {
    if !manager.has::<StaleTag>(entity)? {
        manager.register_component(entity, StaleTag)?;
    }
    Ok(())
}

/// Surface captured during `setup`
pub(crate) fn attached<'a>(
    surface: &'a Option<SurfaceRef>,
    system: &'static str,
) -> Result<&'a SurfaceRef> {
    surface.as_ref().ok_or(EcsError::SystemNotSetUp(system))
}

/// Drop cooldown entries of entities no longer in `rows`
pub(crate) fn retain_rows<V>(cooldowns: &mut AHashMap<EntityId, V>, rows: &[ArchetypeRow]) {
    let live: AHashSet<EntityId> = rows.iter().map(ArchetypeRow::entity).collect();
    cooldowns.retain(|entity, _| live.contains(entity));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_ids_unique() {
        let unique: AHashSet<_> = ALL_SYSTEMS.iter().collect();
        assert_eq!(unique.len(), ALL_SYSTEMS.len());
    }

    #[test]
    fn test_mark_stale_once() {
        let mut manager = EcsManager::new();
        let entity = manager.create_entity();
        mark_stale(&mut manager, entity).unwrap();
        mark_stale(&mut manager, entity).unwrap();
        assert!(manager.has::<StaleTag>(entity).unwrap());
    }
}
