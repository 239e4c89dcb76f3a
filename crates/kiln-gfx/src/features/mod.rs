//! Capability negotiation.
//!
//! A feature is a named bundle of prerequisites (instance layers and
//! extensions, device layers and extensions, device feature bits) plus the
//! queue demand it implies. Negotiation runs in two phases: once against the
//! driver instance, which prunes the candidate set, and once per selected
//! device, which produces the final enabled set and the accumulated device
//! request. Nothing in here aborts; unavailable requirements are logged and
//! the consequences are deferred to the device-creation layer.

pub(crate) mod catalog;
mod registry;
mod request;
mod setup;

pub use catalog::{FeatureId, FeatureSpec, PlatformCaps, feature_spec};
pub use registry::FeatureRegistry;
pub use request::DeviceRequest;
pub use setup::{GfxSetup, enable_from_config};
