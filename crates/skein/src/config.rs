//! Engine configuration, loaded from `skein.toml`.

use serde::{Deserialize, Serialize};
use skein_core::error::ConfigError;
use skein_graph::diverse::PathOptions;
use skein_graph::expansion::ExpansionConfig;
use skein_rag::context::{RetrievalConfig, RetrievalOptions};
use skein_rag::fusion::FusionConfig;
use std::path::{Path, PathBuf};

/// File name searched for by [`EngineConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "skein.toml";

/// Tunables for every engine, one TOML section each.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub expansion: ExpansionConfig,
    #[serde(default)]
    pub paths: PathOptions,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing sections and keys take
    /// their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse(msg) => ConfigError::Parse(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load `skein.toml` from the current or a parent directory, or the
    /// defaults if there is none.
    pub fn discover() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::discover_from(&cwd)
    }

    /// Like [`discover`](Self::discover), starting at `dir`.
    pub fn discover_from(dir: &Path) -> Result<Self, ConfigError> {
        match find_config_file(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write the config as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.expansion.validate()?;
        self.paths.validate()?;
        self.fusion.validate()?;
        ConfigError::require_positive("max_results", self.retrieval.max_results)?;
        ConfigError::require_positive("seed_limit", self.retrieval.seed_limit)
    }

    /// Retrieval options seeded from this config, without filters.
    pub fn retrieval_options(&self) -> RetrievalOptions {
        RetrievalOptions::from_config(&self.retrieval, &self.expansion, &self.fusion)
    }
}

/// Find `skein.toml` in `start` or its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}
