use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bubbles_core::{Bounds, MAX_BUBBLES, SourceLimits};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "bubbles.toml";
pub const DB_FILE: &str = "ideas.db";
pub const DATA_DIR_ENV: &str = "BUBBLES_DATA_DIR";

/// Contents of `bubbles.toml`. Every key is optional.
///
/// ```toml
/// [sources]
/// newest = 5
/// random_voted = 8
///
/// [display]
/// max_bubbles = 12
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourceLimits,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_bubbles: usize,
    pub width: f64,
    pub height: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let bounds = Bounds::default();
        Self {
            max_bubbles: MAX_BUBBLES,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

impl DisplayConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

impl Config {
    /// Read `bubbles.toml` from `base_dir`. A missing file yields defaults.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::parse(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let d = &self.display;
        if !d.bounds().is_valid() {
            return Err(StoreError::Config(format!(
                "display size must be positive, got {}x{}",
                d.width, d.height
            )));
        }
        if d.max_bubbles == 0 {
            return Err(StoreError::Config("display.max_bubbles must be at least 1".into()));
        }
        Ok(())
    }
}

/// `~/.idea-bubbles`
pub fn default_base_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".idea-bubbles")
}

/// Explicit override, then `BUBBLES_DATA_DIR`, then the home default.
pub fn resolve_base_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_base_dir(),
    }
}
