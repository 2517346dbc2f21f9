use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::themes::ColorMode;

pub const CONFIG_FILE_NAME: &str = ".pj.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Overrides every other cache directory source
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Directory name of the project environment inside the project root
    #[serde(default = "default_venv_name")]
    pub venv_name: String,
    /// Interpreter used to create the tool's own environment
    #[serde(default)]
    pub python: Option<PathBuf>,
    #[serde(default)]
    pub color: Option<ColorMode>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            venv_name: default_venv_name(),
            python: None,
            color: None,
        }
    }
}

impl Settings {
    pub fn new(working_dir: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&Self::get_config_path(working_dir))
    }

    pub fn from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Start with default values
            .set_default("venv_name", default_venv_name())?
            // Add config file if it exists
            .add_source(File::from(config_path.to_path_buf()).required(false))
            // PJ_CACHE_DIR, PJ_VENV_NAME, PJ_PYTHON, PJ_COLOR
            .add_source(Environment::with_prefix("PJ"))
            .build()?;

        s.try_deserialize()
    }

    fn get_config_path(working_dir: &Path) -> PathBuf {
        // First check the working directory
        let local_config = working_dir.join(CONFIG_FILE_NAME);

        if local_config.exists() {
            return local_config;
        }

        // Fall back to home directory
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }
}

fn default_venv_name() -> String {
    ".venv".to_string()
}
