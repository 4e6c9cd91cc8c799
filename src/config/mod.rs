//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/promptloom/config.toml)
//! 3. Project config (./promptloom.toml)
//! 4. Environment variables (PROMPTLOOM_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
