use crate::error::{RuntimeError, RuntimeResult};
use attune_feedback::{FusionConfig, UpdaterConfig};
use attune_harmonizer::HarmonizerConfig;
use attune_selection::SelectionConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_IO_TIMEOUT_MS: u64 = 2_000;

fn default_io_timeout_ms() -> u64 {
    DEFAULT_IO_TIMEOUT_MS
}

/// Top-level runtime configuration.
///
/// Every section falls back to its defaults when omitted from a file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttuneConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub updater: UpdaterConfig,
    #[serde(default)]
    pub harmonizer: HarmonizerConfig,
    /// Bound on every collaborator and storage call.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
    /// Seed for the selection RNG; entropy-seeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for AttuneConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            fusion: FusionConfig::default(),
            updater: UpdaterConfig::default(),
            harmonizer: HarmonizerConfig::default(),
            io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            rng_seed: None,
        }
    }
}

impl AttuneConfig {
    /// Reproducible, exploratory settings for simulations.
    pub fn demo() -> Self {
        Self {
            selection: SelectionConfig::exploratory(),
            harmonizer: HarmonizerConfig::demo(),
            rng_seed: Some(42),
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            harmonizer: HarmonizerConfig::production(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        self.selection.validate()?;
        self.fusion.validate()?;
        self.updater.validate()?;
        self.harmonizer.validate()?;
        if self.io_timeout_ms == 0 {
            return Err(RuntimeError::Config("io_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> RuntimeResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> RuntimeResult<Self> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|e| RuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> RuntimeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> RuntimeResult<String> {
        serde_yaml::to_string(self).map_err(|e| RuntimeError::Config(e.to_string()))
    }
}
