// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the JSON/TOML-backed data model (`model.rs`).
//! - Locate and load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Select the enabled test configurations (`select.rs`).

pub mod loader;
pub mod model;
pub mod select;
pub mod validate;

pub use loader::{config_path, discover_config, load_and_validate, load_from_path};
pub use model::{
    CoverageConfig, Installation, RawConfigFile, ResolvedConfiguration, RunnerOptions,
    TestConfiguration,
};
pub use select::select_enabled;
pub use validate::resolve;
