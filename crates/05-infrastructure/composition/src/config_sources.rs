//! 配置源
//!
//! 启动设置来自可选的 TOML/JSON 文件，再由带前缀的环境变量覆盖，
//! 例如 `LORN__APPLICATION__PORT=8080`。

use crate::application::DEFAULT_PORT;
use crate::builder::LoggingConfig;
use crate::logger::Level;
use di_abstractions::ContainerConfig;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "LORN";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` 输出级别
    pub level: String,
    /// 是否使用 JSON 格式
    pub json: bool,
    /// 控制台日志组件的阈值
    pub console_level: Level,
    /// 控制台日志组件是否转发输出
    pub console_output: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            console_level: Level::Info,
            console_output: false,
        }
    }
}

impl LogSettings {
    /// 转换为日志初始化配置
    pub fn to_logging_config(&self) -> ConfigResult<LoggingConfig> {
        let level = self
            .level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.level.clone(),
            })?;

        let base = if self.json {
            LoggingConfig::production()
        } else {
            LoggingConfig::default()
        };
        Ok(LoggingConfig { level, ..base })
    }
}

/// 应用设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSection {
    pub port: u16,
}

impl Default for ApplicationSection {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// 命令行设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub prompt: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            prompt: "lorn> ".to_string(),
        }
    }
}

/// 基础设施启动设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfrastructureSettings {
    pub logging: LogSettings,
    pub container: ContainerConfig,
    pub application: ApplicationSection,
    pub shell: ShellSettings,
}

/// 设置加载器
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
        }
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加配置文件，格式按扩展名识别
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// 设置环境变量前缀，`None` 表示不读取环境变量
    pub fn with_env_prefix(mut self, prefix: Option<String>) -> Self {
        self.env_prefix = prefix;
        self
    }

    /// 加载设置
    pub fn load(&self) -> ConfigResult<InfrastructureSettings> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("加载配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        if let Some(prefix) = &self.env_prefix {
            debug!("添加环境变量配置源，前缀: {}", prefix);
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        let settings = builder
            .build()
            .and_then(|config| config.try_deserialize::<InfrastructureSettings>())
            .map_err(|e| ConfigError::LoadFailed {
                message: e.to_string(),
            })?;

        debug!(?settings, "配置加载完成");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::DuplicatePolicy;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_without_sources() {
        let settings = SettingsLoader::new().with_env_prefix(None).load().unwrap();
        assert_eq!(settings, InfrastructureSettings::default());
        assert_eq!(settings.application.port, 5000);
        assert_eq!(settings.container.duplicate_policy, DuplicatePolicy::Replace);
    }

    #[test]
    fn test_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[container]\nduplicate_policy = \"reject\"\n\n[application]\nport = 8081\n\n[logging]\nconsole_level = \"DEBUG\""
        )
        .unwrap();

        let settings = SettingsLoader::new()
            .with_file(file.path())
            .with_env_prefix(None)
            .load()
            .unwrap();
        assert_eq!(settings.container, ContainerConfig::strict());
        assert_eq!(settings.application.port, 8081);
        assert_eq!(settings.logging.console_level, Level::Debug);
        assert_eq!(settings.shell, ShellSettings::default());
    }

    #[test]
    fn test_json_file_and_environment_override() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "application": {{ "port": 7000 }}, "shell": {{ "prompt": "> " }} }}"#).unwrap();

        std::env::set_var("LORN_SETTINGS_TEST__APPLICATION__PORT", "9000");
        let settings = SettingsLoader::new()
            .with_file(file.path())
            .with_env_prefix(Some("LORN_SETTINGS_TEST".to_string()))
            .load()
            .unwrap();
        std::env::remove_var("LORN_SETTINGS_TEST__APPLICATION__PORT");

        assert_eq!(settings.application.port, 9000);
        assert_eq!(settings.shell.prompt, "> ");
    }

    #[test]
    fn test_missing_file() {
        let result = SettingsLoader::new().with_file("/definitely/not/here.toml").load();
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_logging_level_validation() {
        let settings = LogSettings {
            level: "debug".to_string(),
            json: true,
            ..LogSettings::default()
        };
        let config = settings.to_logging_config().unwrap();
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert!(config.json_format);

        let invalid = LogSettings {
            level: "chatty".to_string(),
            ..LogSettings::default()
        };
        assert!(matches!(
            invalid.to_logging_config(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
