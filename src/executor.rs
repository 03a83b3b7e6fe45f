//! Frame loop and lifecycle hooks
//!
//! A session is driven as `setup` once, `process` until an action returns
//! [`Continuation::Stop`], then `cleanup` once.
//!
//! Each tick visits every indexed archetype in bucket-creation order; for
//! each, every registered system in registration order; for each, every
//! action bound to that archetype in declaration order. The row snapshot an
//! action sees is taken immediately before it runs.

use tracing::{debug, warn};

use crate::error::Result;
use crate::manager::EcsManager;
use crate::surface::SurfaceRef;
use crate::system::Continuation;
use crate::time::{FrameClock, WallClock};

impl EcsManager {
    /// Run every registered system's `setup`, in registration order
    pub fn setup(&mut self, surface: &SurfaceRef) -> Result<()> {
        for entry in self.systems.snapshot() {
            debug!("Performing setup for system {}", entry.name);
            entry.system.borrow_mut().setup(self, surface)?;
        }
        Ok(())
    }

    /// Run the frame loop on wall-clock time until an action stops it
    pub fn process(&mut self) -> Result<()> {
        self.process_with(&mut WallClock::new())
    }

    /// Run the frame loop on the given clock until an action stops it.
    ///
    /// Returns immediately, with a warning, if no systems are registered.
    /// An error from an action aborts the loop and is returned.
    pub fn process_with(&mut self, clock: &mut dyn FrameClock) -> Result<()> {
        if self.systems.is_empty() {
            warn!("No systems have been registered!");
            return Ok(());
        }

        loop {
            let raw_dt = clock.elapsed();
            if self.run_tick(raw_dt)?.is_stop() {
                return Ok(());
            }
        }
    }

    /// Run exactly one tick of `raw_dt` seconds (before time scaling)
    pub fn run_tick(&mut self, raw_dt: f32) -> Result<Continuation> {
        let dt = self.time.advance(raw_dt);

        #[cfg(feature = "profiling")]
        let _span = tracing::info_span!(
            "ecs.tick",
            frame = self.time.frame_count(),
            archetypes = self.archetypes.len(),
            dt = dt
        )
        .entered();

        let archetypes = self.archetypes.archetypes().to_vec();
        let systems = self.systems.snapshot();

        for archetype in &archetypes {
            for entry in &systems {
                for action in entry.bindings.iter().filter(|a| &a.archetype == archetype) {
                    // Bindings may have been changed by an earlier action this tick
                    if !self.systems.contains(entry.id) {
                        break;
                    }
                    let Some(rows) = self.archetypes.rows(archetype) else {
                        break;
                    };

                    let continuation = entry.system.borrow_mut().run(action.name, dt, self, &rows)?;
                    if continuation.is_stop() {
                        debug!("System action {}::{} stopped ECS", entry.name, action.name);
                        return Ok(Continuation::Stop);
                    }
                }
            }
        }

        Ok(Continuation::Continue)
    }

    /// Run every system's `cleanup`, then deregister all systems and destroy
    /// all live entities. Teardown completes even if a cleanup hook fails;
    /// the first failure is returned afterwards.
    pub fn cleanup(&mut self, surface: &SurfaceRef) -> Result<()> {
        let mut first_error = None;
        for entry in self.systems.snapshot() {
            debug!("Performing cleanup for system {}", entry.name);
            if let Err(err) = entry.system.borrow_mut().cleanup(self, surface) {
                warn!("Cleanup of system {} failed: {err}", entry.name);
                first_error.get_or_insert(err);
            }
        }

        for id in self.systems.ids() {
            self.deregister_system(id);
        }

        for entity in self.entities.sorted() {
            self.destroy_entity(entity)?;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
