//! Pinning the calling thread to one logical core.
//!
//! A worker that is allowed to migrate between cores measures whichever cache hierarchy it
//! happens to land on, so pinning is a precondition of the measurement, not a hint: every
//! failure here is reported as [`ChaseError::AffinityBinding`] and there is no unpinned fallback.
use crate::error::{ChaseError, Result};
use log::debug;

/// Capability to bind the current thread to logical core `core`
pub trait CoreBinder: Sync {
    fn bind(&self, core: usize) -> Result<()>;
}

/// Binds through the host's affinity API via `core_affinity`
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreAffinity;

impl CoreBinder for CoreAffinity {
    fn bind(&self, core: usize) -> Result<()> {
        let cores = core_affinity::get_core_ids().ok_or_else(|| ChaseError::AffinityBinding {
            core,
            reason: "core ids unavailable on this platform".to_string(),
        })?;

        let core_id = cores
            .into_iter()
            .find(|c| c.id == core)
            .ok_or_else(|| ChaseError::AffinityBinding {
                core,
                reason: "core not available to this process".to_string(),
            })?;

        if !core_affinity::set_for_current(core_id) {
            return Err(ChaseError::AffinityBinding {
                core,
                reason: "affinity request refused".to_string(),
            });
        }

        debug!("Pinned thread to CPU core {}", core);
        Ok(())
    }
}
