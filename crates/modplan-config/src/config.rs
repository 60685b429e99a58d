use modplan_descriptor::{EngineVersion, TargetContext, TargetType};
use modplan_resolver::{PlanOptions, ResolutionMode, VisibilityPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "MODPLAN_CONFIG";

/// Pointer file next to the default config holding an alternate config path
pub const POINTER_FILE: &str = ".modplan_config_path";

pub const CONFIG_FILE_NAME: &str = "modplan.toml";

/// Every key `get`/`set` accept, in display order
pub const KEYS: [&str; 4] = [
    "default-target",
    "engine-version",
    "resolution-mode",
    "visibility-policy",
];

/// Engine version assumed when neither config nor flags name one
pub const DEFAULT_ENGINE_VERSION: EngineVersion = EngineVersion::new(5, 0);

/// Persisted user defaults; unset keys fall back to built-in defaults
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_target: Option<TargetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<EngineVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_mode: Option<ResolutionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_policy: Option<VisibilityPolicy>,
}

impl Config {
    /// Config file location
    ///
    /// `$MODPLAN_CONFIG` if set and non-empty, then the path stored in the
    /// pointer file beside the default location, then the default itself.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = default_path()?;
        Ok(follow_pointer(&default).unwrap_or(default))
    }

    /// Pointer file location and its current target, if any
    pub fn pointer() -> Result<(PathBuf, Option<PathBuf>), ConfigError> {
        let default = default_path()?;
        let pointer = default
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(POINTER_FILE);
        Ok((pointer, follow_pointer(&default)))
    }

    /// Redirect future loads to `new_path` by writing the pointer file
    pub fn set_pointer(new_path: &Path) -> Result<PathBuf, ConfigError> {
        let (pointer, _) = Self::pointer()?;
        let io_err = |source| ConfigError::Io {
            path: pointer.clone(),
            source,
        };
        if let Some(parent) = pointer.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&pointer, new_path.to_string_lossy().as_bytes()).map_err(io_err)?;
        Ok(pointer)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// A missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "default-target" => self.default_target.map(|v| v.to_string()),
            "engine-version" => self.engine_version.map(|v| v.to_string()),
            "resolution-mode" => self.resolution_mode.map(|v| v.to_string()),
            "visibility-policy" => self.visibility_policy.map(|v| v.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parse and store one value; nothing changes when the value is invalid
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            "default-target" => {
                self.default_target = Some(value.parse().map_err(|e| invalid(format!("{}", e)))?);
            }
            "engine-version" => {
                self.engine_version = Some(value.parse().map_err(|e| invalid(format!("{}", e)))?);
            }
            "resolution-mode" => self.resolution_mode = Some(value.parse().map_err(invalid)?),
            "visibility-policy" => self.visibility_policy = Some(value.parse().map_err(invalid)?),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Clear one key back to its built-in default
    pub fn unset(&mut self, key: &str) -> Result<(), ConfigError> {
        match key {
            "default-target" => self.default_target = None,
            "engine-version" => self.engine_version = None,
            "resolution-mode" => self.resolution_mode = None,
            "visibility-policy" => self.visibility_policy = None,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.default_target.is_none()
            && self.engine_version.is_none()
            && self.resolution_mode.is_none()
            && self.visibility_policy.is_none()
    }

    /// Set keys and their values, in display order
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| match self.get(key) {
                Ok(Some(value)) => Some((*key, value)),
                _ => None,
            })
            .collect()
    }

    /// Effective settings with built-in defaults filled in
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            target_type: self.default_target.unwrap_or(defaults.target_type),
            engine_version: self.engine_version.unwrap_or(defaults.engine_version),
            mode: self.resolution_mode.unwrap_or(defaults.mode),
            visibility: self.visibility_policy.unwrap_or(defaults.visibility),
        }
    }
}

/// Fully-populated settings for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub target_type: TargetType,
    pub engine_version: EngineVersion,
    pub mode: ResolutionMode,
    pub visibility: VisibilityPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            target_type: TargetType::Editor,
            engine_version: DEFAULT_ENGINE_VERSION,
            mode: ResolutionMode::default(),
            visibility: VisibilityPolicy::default(),
        }
    }
}

impl Settings {
    pub fn context(&self) -> TargetContext {
        TargetContext::new(self.target_type, self.engine_version)
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            mode: self.mode,
            visibility: self.visibility,
        }
    }
}

fn default_path() -> Result<PathBuf, ConfigError> {
    #[cfg(not(target_os = "windows"))]
    let dir = dirs::home_dir()
        .ok_or(ConfigError::NoHomeDir)?
        .join(".config")
        .join("modplan");

    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir()
        .ok_or(ConfigError::NoHomeDir)?
        .join("modplan");

    Ok(dir.join(CONFIG_FILE_NAME))
}

fn follow_pointer(default: &Path) -> Option<PathBuf> {
    let pointer = default.parent()?.join(POINTER_FILE);
    let contents = fs::read_to_string(pointer).ok()?;
    let trimmed = contents.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
