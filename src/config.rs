//! Settings shared by every example program.
//!
//! Values come from, in increasing priority: built-in defaults, a JSON file
//! (`./glsamples.json`, else `<config dir>/glsamples/config.json`) and environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Overrides [`ExampleConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "GLSAMPLES_DATA_DIR";
/// Overrides [`ExampleConfig::log_level`].
pub const LOG_LEVEL_ENV: &str = "GLSAMPLES_LOG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "glsamples.json";

fn default_data_dir() -> PathBuf {
    match option_env!("GLSAMPLES_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("data"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Requested core profile version, `[major, minor]`.
    pub gl_version: [u8; 2],
    /// Multisample count, 0 disables multisampling.
    pub samples: u8,
    pub vsync: bool,
    /// Root holding `shaders/` and `textures/`.
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Default for ExampleConfig {
    fn default() -> Self {
        Self {
            title: "OpenGLRenderLib".to_string(),
            width: 1280,
            height: 720,
            gl_version: [3, 3],
            samples: 4,
            vsync: true,
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
        }
    }
}

impl ExampleConfig {
    /// Loads the config file if there is one and applies environment overrides.
    pub fn load() -> Result<Self, AppError> {
        let mut config = match Self::config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(LOG_LEVEL_ENV).ok(),
        );
        Ok(config)
    }

    fn config_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("glsamples").join("config.json"))
            .filter(|path| path.is_file())
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, data_dir: Option<String>, log_level: Option<String>) {
        if let Some(dir) = data_dir.filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = log_level.filter(|l| !l.is_empty()) {
            self.log_level = level;
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Config(format!(
                "window size {}x{} is empty",
                self.width, self.height
            )));
        }
        self.level_filter().map(|_| ())
    }

    /// Returns a copy with a different window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn level_filter(&self) -> Result<LevelFilter, AppError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| AppError::Config(format!("unknown log level `{}`", self.log_level)))
    }

    pub fn shaders_path(&self) -> PathBuf {
        self.data_dir.join("shaders")
    }

    pub fn textures_path(&self) -> PathBuf {
        self.data_dir.join("textures")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExampleConfig::default();
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.gl_version, [3, 3]);
        assert_eq!(config.samples, 4);
        assert!(config.vsync);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ExampleConfig::from_json(r#"{ "width": 800, "data_dir": "/srv/assets" }"#).unwrap();

        assert_eq!(config.width, 800);
        assert_eq!(config.height, 720);
        assert_eq!(config.title, "OpenGLRenderLib");
        assert_eq!(config.shaders_path(), Path::new("/srv/assets/shaders"));
        assert_eq!(config.textures_path(), Path::new("/srv/assets/textures"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ExampleConfig::from_json(r#"{ "height": 0 }"#),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ExampleConfig::from_json(r#"{ "log_level": "loud" }"#),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ExampleConfig::from_json("{ width: }"),
            Err(AppError::ConfigParse(_))
        ));
    }

    #[test]
    fn environment_overrides_win() {
        let mut config = ExampleConfig::default();
        config.apply_overrides(Some("/tmp/data".into()), Some("trace".into()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/data"));
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Trace);

        // Empty variables are ignored.
        config.apply_overrides(Some(String::new()), Some(String::new()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/data"));
    }

    #[test]
    fn reads_files() {
        let path = std::env::temp_dir().join(format!("glsamples-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "title": "Cubes", "vsync": false }"#).unwrap();

        let config = ExampleConfig::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.title, "Cubes");
        assert!(!config.vsync);
        assert!(matches!(
            ExampleConfig::from_file(&path),
            Err(AppError::ConfigFile { .. })
        ));
    }

    #[test]
    fn with_title_only_changes_the_title() {
        let config = ExampleConfig::default().with_title("Triangle");
        assert_eq!(config.title, "Triangle");
        assert_eq!(config.width, ExampleConfig::default().width);
    }
}
