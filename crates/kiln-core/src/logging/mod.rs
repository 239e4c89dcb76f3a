//! Logging bootstrap.
//!
//! Centralizes `env_logger` initialization behind the `log` facade so no
//! other module depends on a concrete logging backend.

mod init;

pub use init::{LoggingConfig, init_logging};
