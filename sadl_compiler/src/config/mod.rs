//! Configuration module for the SADL compiler
//!
//! Fixed limits live in [`constants`]; user preferences live in [`runtime`]
//! and can be overridden through `SADL_*` environment variables or a TOML file.

pub mod constants;
pub mod runtime;

pub use runtime::{init_runtime_config, runtime_config, ConfigError, RuntimeConfig};
