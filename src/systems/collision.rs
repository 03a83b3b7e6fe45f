use crate::archetype;
use crate::archetype::ArchetypeRow;
use crate::components::{BulletTag, Collider2D, EnemyTag, Lives, PlayerTag, Transform2D};
use crate::entity::EntityId;
use crate::error::Result;
use crate::manager::EcsManager;
use crate::system::{Action, Continuation, System, SystemId};

use super::{mark_stale, COLLIDER_2D};

/// Whether two centred boxes overlap. Touching edges do not count.
pub fn overlaps(a: (&Transform2D, &Collider2D), b: (&Transform2D, &Collider2D)) -> bool {
    let (ta, ca) = a;
    let (tb, cb) = b;
    ta.px - ca.sx / 2.0 < tb.px + cb.sx / 2.0
        && ta.px + ca.sx / 2.0 > tb.px - cb.sx / 2.0
        && ta.py - ca.sy / 2.0 < tb.py + cb.sy / 2.0
        && ta.py + ca.sy / 2.0 > tb.py - cb.sy / 2.0
}

struct Body {
    entity: EntityId,
    transform: Transform2D,
    collider: Collider2D,
    bullet: bool,
}

/// Resolves bullet hits: a bullet that overlaps a non-bullet with lives costs
/// it a life and is consumed, unless both carry the same faction tag.
#[derive(Default)]
pub struct Collider2DSystem;

impl Collider2DSystem {
    pub fn new() -> Self {
        Self
    }

    /// Whether both entities carry the same faction tag
    fn same_side(manager: &EcsManager, a: EntityId, b: EntityId) -> Result<bool> {
        let players = manager.has::<PlayerTag>(a)? && manager.has::<PlayerTag>(b)?;
        let enemies = manager.has::<EnemyTag>(a)? && manager.has::<EnemyTag>(b)?;
        Ok(players || enemies)
    }
}

impl System for Collider2DSystem {
    fn id(&self) -> SystemId {
        COLLIDER_2D
    }

    fn name(&self) -> &'static str {
        "Collider2DSystem"
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("process", archetype![Transform2D, Collider2D])]
    }

    // TODO: spatial hashing once enemy counts make the pairwise scan show up in profiles
    fn run(
        &mut self,
        _action: &str,
        _dt: f32,
        manager: &mut EcsManager,
        rows: &[ArchetypeRow],
    ) -> Result<Continuation> {
        let mut bodies = Vec::with_capacity(rows.len());
        for row in rows {
            let (Some(transform), Some(collider)) =
                (row.get::<Transform2D>(0), row.get::<Collider2D>(1))
            else {
                continue;
            };
            bodies.push(Body {
                entity: row.entity(),
                transform: *transform,
                collider: *collider,
                bullet: manager.has::<BulletTag>(row.entity())?,
            });
        }

        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                // Only bullet against non-bullet
                if a.bullet == b.bullet {
                    continue;
                }
                if !overlaps((&a.transform, &a.collider), (&b.transform, &b.collider)) {
                    continue;
                }

                let (bullet, other) = if a.bullet { (a.entity, b.entity) } else { (b.entity, a.entity) };
                let Some(lives) = manager.fetch::<Lives>(other)? else {
                    continue;
                };
                if Self::same_side(manager, bullet, other)? {
                    continue;
                }

                if let Some(mut lives) = lives.get_mut::<Lives>() {
                    lives.count -= 1;
                }
                mark_stale(manager, bullet)?;
            }
        }

        Ok(Continuation::Continue)
    }
}
