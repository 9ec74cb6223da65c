//! 基础设施构建器

use crate::config_sources::{InfrastructureSettings, SettingsLoader};
use crate::diagnostics::DependencyCommands;
use crate::infrastructure::Infrastructure;
use crate::logger::ConsoleLogger;
use crate::resource::ResourceHandler;
use crate::shell::ShellHandler;
use di_abstractions::{ContainerConfig, ServiceConfiguration, ServiceRegistry};
use di_impl::DependencyManager;
use infrastructure_common::InfrastructureError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 基础设施构建器
///
/// 使用建造者模式加载设置、初始化日志并注册标准组件
pub struct InfrastructureBuilder {
    /// 配置文件
    config_file: Option<PathBuf>,
    /// 环境变量前缀
    env_prefix: Option<String>,
    /// 直接给定的设置，优先于配置源
    settings: Option<InfrastructureSettings>,
    /// 覆盖设置中的容器配置
    container_config: Option<ContainerConfig>,
    /// 是否注册标准组件
    standard_components: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: Option<LoggingConfig>,
}

impl InfrastructureBuilder {
    /// 创建新的基础设施构建器
    pub fn new() -> Self {
        Self {
            config_file: None,
            env_prefix: Some(crate::config_sources::DEFAULT_ENV_PREFIX.to_string()),
            settings: None,
            container_config: None,
            standard_components: true,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: None,
        }
    }

    /// 添加配置文件（TOML 或 JSON）
    pub fn add_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("添加配置文件: {}", path.display());
        self.config_file = Some(path.to_path_buf());
        Ok(self)
    }

    /// 设置环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 不读取环境变量
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// 直接使用给定设置，跳过配置源
    pub fn with_settings(mut self, settings: InfrastructureSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 覆盖容器配置
    pub fn with_container_config(mut self, config: ContainerConfig) -> Self {
        self.container_config = Some(config);
        self
    }

    /// 是否注册标准组件（日志、命令行、资源路由、依赖诊断）
    pub fn with_standard_components(mut self, enabled: bool) -> Self {
        self.standard_components = enabled;
        self
    }

    /// 配置日志，未给定时按设置中的日志节生成
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self.logging_enabled = true;
        self
    }

    /// 按设置中的日志节初始化日志
    pub fn enable_logging(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    /// 构建基础设施实例
    pub fn build(self) -> Result<Infrastructure, InfrastructureError> {
        let mut settings = match self.settings {
            Some(settings) => settings,
            None => {
                let mut loader = SettingsLoader::new().with_env_prefix(self.env_prefix.clone());
                if let Some(path) = &self.config_file {
                    loader = loader.with_file(path);
                }
                loader.load()?
            }
        };
        if let Some(container_config) = self.container_config {
            settings.container = container_config;
        }

        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            let logging_config = match self.logging_config {
                Some(config) => config,
                None => settings.logging.to_logging_config()?,
            };
            initialize_logging(&logging_config)?;
        }

        info!("开始构建基础设施");
        let mut container = DependencyManager::with_config(settings.container.clone());

        if self.standard_components {
            register_standard_components(&mut container, &settings)?;
        }

        info!(
            components = container.len(),
            duplicate_policy = ?settings.container.duplicate_policy,
            "基础设施构建完成"
        );
        Ok(Infrastructure::new(container, settings))
    }
}

impl Default for InfrastructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn register_standard_components(
    container: &mut DependencyManager,
    settings: &InfrastructureSettings,
) -> Result<(), InfrastructureError> {
    let logger = ConsoleLogger::new(settings.logging.console_level, settings.logging.console_output);
    container.register_instance(logger, ServiceConfiguration::default())?;
    container.register::<ShellHandler>(ServiceConfiguration::default())?;
    container.register::<ResourceHandler>(ServiceConfiguration::default())?;

    let commands = DependencyCommands::new(container.inspector());
    container.register_instance(commands, ServiceConfiguration::default())?;

    debug!(stats = ?container.stats(), "标准组件注册完成");
    Ok(())
}

/// 初始化日志系统
fn initialize_logging(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
