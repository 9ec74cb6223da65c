//! # 基础设施组合层
//!
//! 将依赖管理器与标准组件组合成一个可运行的进程内服务容器。
//!
//! ## 主要功能
//!
//! - **基础设施构建器**: 加载设置、初始化日志、注册标准组件
//! - **配置源**: 配置文件加环境变量的分层设置
//! - **标准组件**: 控制台日志、交互式命令行、资源路由、依赖诊断命令
//! - **应用组件**: 由 `ApplicationConfig` 组件配置的应用设置
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::InfrastructureBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let infrastructure = InfrastructureBuilder::new()
//!         .without_env()
//!         .build()?;
//!
//!     let shell = infrastructure.shell()?;
//!     for line in shell.execute("dm").texts() {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod builder;
pub mod config_sources;
pub mod diagnostics;
pub mod infrastructure;
pub mod logger;
pub mod resource;
pub mod shell;

// 重新导出主要类型
pub use application::{Application, ApplicationConfig, ApplicationSettings, DEFAULT_PORT};
pub use builder::{InfrastructureBuilder, LoggingConfig};
pub use config_sources::{InfrastructureSettings, SettingsLoader};
pub use diagnostics::DependencyCommands;
pub use infrastructure::{Infrastructure, InfrastructureMetrics};
pub use logger::{ComponentLog, ConsoleLogger, Level, Logger};
pub use resource::{
    Method, ResourceConfig, ResourceError, ResourceExt, ResourceFn, ResourceHandler,
    ResourceRequest, RouteBinding,
};
pub use shell::{
    ShellCommandConfig, ShellCommandExt, ShellCommandFn, ShellHandler, ShellRequest, ShellResponse,
};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
