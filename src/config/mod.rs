//! 配置
//!
//! `EngineConfig` 由粒子配置与日志配置组成，可从 TOML / JSON 读写。
//!
//! ```text
//! 文件 (.toml / .json) ──► ConfigFormat::parse ──► EngineConfig
//!                                                     │
//!                    ENGINE_PARTICLES_* / ENGINE_LOG_LEVEL
//!                                                     ▼
//!                                                 validate()
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod particles;

pub use particles::{ParticleConfig, DEFAULT_MAX_INSTANCES_PER_GROUP};

use crate::impl_default;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed {format} config: {message}")]
    Parse {
        format: ConfigFormat,
        message: String,
    },

    #[error("Unsupported config file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFormat::Toml => write!(f, "TOML"),
            ConfigFormat::Json => write!(f, "JSON"),
        }
    }
}

impl ConfigFormat {
    /// 按扩展名判断格式
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(ext)),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, content: &str) -> ConfigResult<T> {
        let parsed = match self {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse {
            format: self,
            message,
        })
    }

    fn render<T: Serialize>(self, value: &T) -> ConfigResult<String> {
        let rendered = match self {
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| ConfigError::Parse {
            format: self,
            message,
        })
    }
}

/// 顶层配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub particles: ParticleConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_str_with(format: ConfigFormat, content: &str) -> ConfigResult<Self> {
        format.parse(content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_with(ConfigFormat::Toml, content)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Self::from_str_with(ConfigFormat::Json, content)
    }

    /// 读取配置文件，格式由扩展名决定
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        format.parse(&content)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 写入配置文件，格式由扩展名决定
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = ConfigFormat::from_path(path)?.render(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content = ConfigFormat::Json.render(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 应用环境变量覆盖，返回被覆盖的变量名
    ///
    /// 无法解析的值被忽略（记录 warn）。
    pub fn apply_env_overrides(&mut self) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(max) = env_parsed::<u32>("ENGINE_PARTICLES_MAX_INSTANCES") {
            self.particles.max_instances_per_group = max;
            applied.push("ENGINE_PARTICLES_MAX_INSTANCES");
        }
        if let Some(frames) = env_parsed::<u32>("ENGINE_PARTICLES_FRAMES_IN_FLIGHT") {
            self.particles.frames_in_flight = frames;
            applied.push("ENGINE_PARTICLES_FRAMES_IN_FLIGHT");
        }
        if let Some(model) = env::var("ENGINE_PARTICLES_DEFAULT_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
        {
            self.particles.default_model = model;
            applied.push("ENGINE_PARTICLES_DEFAULT_MODEL");
        }
        if let Some(level) = env::var("ENGINE_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
        {
            self.logging.level = level;
            applied.push("ENGINE_LOG_LEVEL");
        }

        applied
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.particles.validate()
    }

    /// 默认查找路径：工作目录下的 `particles.toml` / `particles.json`，
    /// 然后是 `$HOME/.config/particle_engine/config.toml`
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("particles.toml"),
            PathBuf::from("particles.json"),
        ];
        if let Some(home) = env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(".config/particle_engine/config.toml"));
        }
        paths
    }

    /// 加载第一个可用的配置文件并应用环境变量；都没有时使用默认值
    pub fn load_or_default() -> Self {
        let found = Self::search_paths()
            .into_iter()
            .filter(|p| p.is_file())
            .find_map(|p| match Self::from_file(&p) {
                Ok(config) => Some((p, config)),
                Err(e) => {
                    tracing::warn!(target: "config", path = %p.display(), error = %e, "Skipping unreadable config");
                    None
                }
            });

        let mut config = match found {
            Some((path, config)) => {
                tracing::info!(target: "config", path = %path.display(), "Loaded config");
                config
            }
            None => {
                tracing::info!(target: "config", "No config file found, using defaults");
                Self::default()
            }
        };

        let overrides = config.apply_env_overrides();
        if !overrides.is_empty() {
            tracing::debug!(target: "config", ?overrides, "Environment overrides applied");
        }
        config
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(target: "config", key, value = %raw, "Ignoring unparsable override");
            None
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// 为 false 时 `init_logging` 不安装 subscriber
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 不区分大小写，接受 `warning`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = EngineConfig::from_toml_str(
            r#"
            [particles]
            max_instances_per_group = 256
            "#,
        )
        .unwrap();
        assert_eq!(parsed.particles.max_instances_per_group, 256);
        assert_eq!(parsed.particles.frames_in_flight, 2);
        assert_eq!(parsed.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_save_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = EngineConfig::default();
        config.particles.frames_in_flight = 3;
        config.logging.level = LogLevel::Warn;

        for name in ["config.toml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            let loaded = EngineConfig::from_file(&path).unwrap();
            assert_eq!(loaded.particles.frames_in_flight, 3);
            assert_eq!(loaded.logging.level, LogLevel::Warn);
        }

        let toml_text = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(toml_text.contains("[particles]"));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::default().save("config.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"));
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Parse {
                format: ConfigFormat::Json,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Malformed JSON config"));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse(" WARNING "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
