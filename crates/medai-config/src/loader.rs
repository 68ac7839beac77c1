//! Loading and validating `MedaiConfig`.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file (either
//! `--config <path>` or the embedded `config/medai.toml`), then the
//! `MEDAI_MODEL_URL` / `MEDAI_MODEL` environment variables.

use std::path::Path;

use tracing::{debug, info};
use url::Url;

use medai_contracts::error::{MedaiError, MedaiResult};

use crate::settings::MedaiConfig;

/// Overrides `model.base_url`.
pub const MODEL_URL_ENV: &str = "MEDAI_MODEL_URL";
/// Overrides `model.model`.
pub const MODEL_NAME_ENV: &str = "MEDAI_MODEL";

const EMBEDDED_CONFIG: &str = include_str!("../config/medai.toml");

impl MedaiConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `MedaiError::ConfigError` if the TOML is malformed, has
    /// unknown keys, or holds values that cannot work.
    pub fn from_toml_str(s: &str) -> MedaiResult<Self> {
        let config: MedaiConfig = toml::from_str(s).map_err(|e| MedaiError::ConfigError {
            reason: format!("failed to parse config TOML: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MedaiResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MedaiError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configuration compiled into the binary.
    pub fn embedded() -> MedaiResult<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    /// Load from `path` (or the embedded file) and apply process environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> MedaiResult<Self> {
        let config = match path {
            Some(p) => {
                info!(path = %p.display(), "loading configuration file");
                Self::from_file(p)?
            }
            None => Self::embedded()?,
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `MEDAI_*` overrides looked up through `lookup`, then re-validate.
    ///
    /// Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> MedaiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(MODEL_URL_ENV) {
            debug!(env = MODEL_URL_ENV, %url, "model base_url overridden");
            self.model.base_url = url;
        }
        if let Some(model) = get(MODEL_NAME_ENV) {
            debug!(env = MODEL_NAME_ENV, %model, "model name overridden");
            self.model.model = model;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> MedaiResult<()> {
        let base = Url::parse(&self.model.base_url).map_err(|e| MedaiError::ConfigError {
            reason: format!("model.base_url '{}' is not a URL: {e}", self.model.base_url),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(MedaiError::ConfigError {
                reason: format!("model.base_url must be http or https, got '{}'", base.scheme()),
            });
        }
        if self.model.model.trim().is_empty() {
            return Err(MedaiError::ConfigError {
                reason: "model.model must name a model".to_string(),
            });
        }
        if self.model.timeout_secs == 0 {
            return Err(MedaiError::ConfigError {
                reason: "model.timeout_secs must be at least 1".to_string(),
            });
        }
        if self.planner.default_medication_days == 0 {
            return Err(MedaiError::ConfigError {
                reason: "planner.default_medication_days must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
