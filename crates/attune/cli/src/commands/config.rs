//! `attune config`: print the effective configuration.

use crate::error::{CliError, CliResult};
use crate::output::{render, OutputFormat};
use attune_runtime::AttuneConfig;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

/// Named configuration presets
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Preset {
    #[default]
    Default,
    Demo,
    Production,
}

impl Preset {
    pub fn config(self) -> AttuneConfig {
        match self {
            Self::Default => AttuneConfig::default(),
            Self::Demo => AttuneConfig::demo(),
            Self::Production => AttuneConfig::production(),
        }
    }
}

/// Where the effective configuration comes from
#[derive(Debug, Clone, Args)]
pub struct ConfigSource {
    /// Preset used when no file is given
    #[arg(long, value_enum, default_value = "default")]
    pub preset: Preset,

    /// JSON or YAML configuration file; overrides the preset
    #[arg(long, env = "ATTUNE_CONFIG")]
    pub file: Option<PathBuf>,
}

impl ConfigSource {
    pub fn with_preset(preset: Preset) -> Self {
        Self { preset, file: None }
    }

    pub fn load(&self) -> CliResult<AttuneConfig> {
        match &self.file {
            Some(path) => load_file(path),
            None => Ok(self.preset.config()),
        }
    }
}

fn load_file(path: &Path) -> CliResult<AttuneConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => AttuneConfig::from_json_str(&raw)?,
        Some("yaml") | Some("yml") => AttuneConfig::from_yaml_str(&raw)?,
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "config file {} must end in .json, .yaml or .yml",
                path.display()
            )))
        }
    };
    Ok(config)
}

pub fn execute(source: ConfigSource, format: OutputFormat) -> CliResult<()> {
    let config = source.load()?;
    let rendered = match format {
        // Text falls back to YAML, the most readable of the two.
        OutputFormat::Text => render(&config, OutputFormat::Yaml)?,
        other => render(&config, other)?,
    };
    println!("{}", rendered);
    Ok(())
}
