use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::gradle::properties::GradlePluginStyle;
use crate::version::catalogs::http::DEFAULT_BASE_URL;
use crate::version::checker::default_minimum_versions;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default interval between update checks in milliseconds (24 hours)
pub const DEFAULT_UPDATE_CHECK_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Name of the config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "mediation-manager.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Integration configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationConfig {
    /// Root of the host project; relative paths below resolve against it
    pub project_root: PathBuf,
    /// Version of the installed SDK plugin, sent to the catalog
    pub plugin_version: String,
    pub manifest_path: PathBuf,
    pub catalog: CatalogConfig,
    pub gradle: GradleConfig,
    pub quality_service: QualityServiceConfig,
    pub auto_update: AutoUpdateConfig,
    /// Minimum supported adapter versions keyed by network name
    pub minimum_versions: IndexMap<String, String>,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            plugin_version: String::new(),
            manifest_path: PathBuf::from("Packages/manifest.json"),
            catalog: CatalogConfig::default(),
            gradle: GradleConfig::default(),
            quality_service: QualityServiceConfig::default(),
            auto_update: AutoUpdateConfig::default(),
            minimum_versions: default_minimum_versions(),
        }
    }
}

/// Catalog-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Android Gradle files and version overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GradleConfig {
    /// Application build file (the launcher/main template)
    pub build_file: PathBuf,
    pub root_build_file: PathBuf,
    pub settings_file: PathBuf,
    pub properties_file: PathBuf,
    pub wrapper_properties_file: PathBuf,
    /// Also place the repository and classpath in the application build file
    pub add_build_script_lines_to_build_file: bool,
    pub plugin_style: GradlePluginStyle,
    pub custom_gradle_version_url: Option<String>,
    pub custom_gradle_tools_version: Option<String>,
}

impl Default for GradleConfig {
    fn default() -> Self {
        Self {
            build_file: PathBuf::from("Assets/Plugins/Android/mainTemplate.gradle"),
            root_build_file: PathBuf::from("Assets/Plugins/Android/baseProjectTemplate.gradle"),
            settings_file: PathBuf::from("Assets/Plugins/Android/settingsTemplate.gradle"),
            properties_file: PathBuf::from("Assets/Plugins/Android/gradleTemplate.properties"),
            wrapper_properties_file: PathBuf::from("gradle/wrapper/gradle-wrapper.properties"),
            add_build_script_lines_to_build_file: false,
            plugin_style: GradlePluginStyle::default(),
            custom_gradle_version_url: None,
            custom_gradle_tools_version: None,
        }
    }
}

/// Ad-review plugin settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityServiceConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
}

impl Default for QualityServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
        }
    }
}

/// Update-check settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoUpdateConfig {
    pub enabled: bool,
    /// Interval between update checks in milliseconds
    pub check_interval: i64,
}

impl Default for AutoUpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: DEFAULT_UPDATE_CHECK_INTERVAL_MS,
        }
    }
}

impl IntegrationConfig {
    /// Load the config from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else `<project_root>/mediation-manager.json` if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>, project_root: &Path) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let candidate = project_root.join(CONFIG_FILE_NAME);
                if candidate.exists() {
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        if config.project_root == Path::new(".") {
            config.project_root = project_root.to_path_buf();
        }
        Ok(config)
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest_path)
    }

    /// Directory the catalog's `DependenciesFilePath` entries are relative to
    pub fn assets_dir(&self) -> PathBuf {
        self.project_root.join("Assets")
    }

    pub fn api_key(&self) -> Option<&str> {
        self.quality_service
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Returns the path to the data directory for mediation-manager.
/// Uses $XDG_DATA_HOME/mediation-manager if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/mediation-manager,
/// or ./mediation-manager if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the update-check state file.
pub fn update_state_path() -> PathBuf {
    data_dir().join("update-check.json")
}

/// Returns the directory holding the log files.
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("mediation-manager")
}
