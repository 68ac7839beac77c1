//! Configuration schema.
//!
//! Every field has a default, so a file only needs the keys it changes.
//!
//! ```toml
//! [model]
//! base_url = "http://localhost:11434"
//! model = "llama3.1"
//! timeout_secs = 120
//! api_key_env = "MEDAI_API_KEY"
//!
//! [planner]
//! default_medication_days = 7
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MedaiConfig {
    pub model: ModelSettings,
    pub planner: PlannerSettings,
}

/// Where and how to reach the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Name of the environment variable that holds a bearer token, if the
    /// endpoint needs one. The token itself never lives in the file.
    pub api_key_env: Option<String>,
    /// Sent as the `system` field of every request. Empty means none.
    pub system_prompt: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            timeout_secs: 120,
            api_key_env: None,
            system_prompt: String::new(),
        }
    }
}

impl ModelSettings {
    /// Read the bearer token from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        let var = self.api_key_env.as_deref()?;
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerSettings {
    /// Course length pre-filled in a fresh medication form.
    pub default_medication_days: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_medication_days: 7,
        }
    }
}
