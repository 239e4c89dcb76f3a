//! Kiln core crate.
//!
//! Foundation pieces shared by the engine layers: lifetime-tracked resource
//! pooling, JSON engine configuration, and logging bootstrap.

pub mod config;
pub mod logging;
pub mod pool;

pub use config::Config;
pub use pool::{Handle, Pool, WeakHandle};
