//! Logging setup.
//!
//! The engine itself only talks to the `log` facade. Binaries that want to
//! see bind/unbind summaries and per-element sync decisions install
//! `env_logger` through [`init_logging`].

mod init;

pub use init::{LoggingConfig, init_logging};
