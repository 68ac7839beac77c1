//! # medai-config
//!
//! TOML configuration for MedAi Navigator.
//!
//! Both binaries call [`MedaiConfig::load`] with the optional `--config`
//! path. Without one, the copy of `config/medai.toml` compiled into the
//! crate is used.

pub mod loader;
pub mod settings;

pub use loader::{MODEL_NAME_ENV, MODEL_URL_ENV};
pub use settings::{MedaiConfig, ModelSettings, PlannerSettings};
