//! Kiln graphics crate.
//!
//! This crate owns GPU bring-up policy: adapter description and selection,
//! two-phase capability negotiation, and mapping queue demand onto a
//! device's queue families. It is backend-agnostic; a platform layer feeds
//! it [`adapter::AdapterInfo`] and [`adapter::InstanceCaps`] snapshots and
//! consumes the resulting [`context::DevicePlan`].

pub mod adapter;
pub mod context;
pub mod features;
pub mod queues;

pub use context::{DevicePlan, Gfx, SurfaceBinding, WindowResource};
