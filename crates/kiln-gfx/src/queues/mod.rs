//! Queue-role planning.
//!
//! Devices expose queue families; the engine thinks in abstract roles
//! (graphics, present, transfer, compute). This module maps per-role queue
//! demand onto a concrete family table, degrading gracefully down to a
//! single shared hardware queue when the topology demands it.

mod alloc;
mod roles;

pub use alloc::{QueuePlan, allocate};
pub use roles::{QueueRole, RoleCounts, RoleSet};
