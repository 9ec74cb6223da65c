//! 基础设施构建器集成测试

use super::super::builder::{InfrastructureBuilder, LoggingConfig};
use crate::application::ApplicationConfig;
use crate::config_sources::InfrastructureSettings;
use crate::logger::{ComponentLog, Level, Logger};
use crate::resource::{Method, ResourceExt, ResourceRequest};
use crate::shell::ShellCommandExt;
use crate::Application;
use di_abstractions::{Component, ComponentDefinition, ContainerConfig, ServiceRegistry};
use infrastructure_common::{DependencyError, HandlerResult, InfrastructureError};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Once};
use tempfile::NamedTempFile;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}

#[derive(Default)]
struct StatusResource {
    log: ComponentLog<StatusResource>,
}

impl Component for StatusResource {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .resource("status", Method::Get, "/api/status", |this: &Self, _request| {
                this.log.info("status requested");
                Ok(Some(json!({ "status": "ok" })))
            })
            .shell_command("status", "status", "显示服务状态", |_this: &Self, _request, response| {
                response.line("ok");
            })
    }
}

#[derive(Default)]
struct SiteConfig;

impl ApplicationConfig for SiteConfig {
    fn configure(&self, app: &Application) -> HandlerResult {
        app.serve("public");
        Ok(())
    }
}

impl Component for SiteConfig {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().implements(|this: Arc<Self>| this as Arc<dyn ApplicationConfig>)
    }
}

fn builder() -> InfrastructureBuilder {
    init_test_logger();
    InfrastructureBuilder::new().without_env()
}

/// 测试标准组件全部解析
#[test]
fn test_standard_components_resolve() {
    let infrastructure = builder().build().unwrap();

    let stats = infrastructure.container().stats();
    assert_eq!(stats.registered_components, 4);
    assert_eq!(stats.pending_components, 0);
    assert_eq!(stats.extension_points, 2);

    let shell = infrastructure.shell().unwrap();
    let names: Vec<String> = shell.commands().into_iter().map(|command| command.name).collect();
    assert_eq!(
        names,
        vec!["dm", "dm by type", "dm wtf", "log all", "log output off", "log output on"]
    );
    assert!(infrastructure.resources().unwrap().routes().is_empty());
}

/// 测试用户组件接入标准扩展点
#[test]
fn test_user_component_extends_shell_and_resources() {
    let mut infrastructure = builder().build().unwrap();
    infrastructure.register::<StatusResource>().unwrap();

    let shell = infrastructure.shell().unwrap();
    assert_eq!(shell.execute("status").texts(), vec!["ok"]);

    let result = infrastructure
        .resources()
        .unwrap()
        .dispatch(Method::Get, "/api/status", &ResourceRequest::new())
        .unwrap();
    assert_eq!(result, Some(json!({ "status": "ok" })));

    let logger = infrastructure.console_logger().unwrap();
    assert!(logger
        .lines()
        .iter()
        .any(|line| line.ends_with("StatusResource\t| status requested")));
}

/// 测试日志命令
#[test]
fn test_log_commands_toggle_output() {
    let infrastructure = builder().build().unwrap();
    let shell = infrastructure.shell().unwrap();
    let logger = infrastructure.console_logger().unwrap();
    assert!(!logger.is_enabled());

    shell.execute("log output on");
    assert!(logger.is_enabled());
    shell.execute("log output off");
    assert!(!logger.is_enabled());

    logger.log(Level::Error, "disk full");
    let response = shell.execute("log all");
    assert!(response.has_errors());
    assert!(response.texts().iter().any(|line| line.ends_with("disk full")));
}

/// 测试从配置文件加载设置
#[test]
fn test_build_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[application]\nport = 6100\n\n[container]\nduplicate_policy = \"reject\"\n\n[logging]\nconsole_output = true"
    )
    .unwrap();

    let mut infrastructure = builder().add_config_file(file.path()).unwrap().build().unwrap();
    assert_eq!(infrastructure.settings().application.port, 6100);
    assert!(infrastructure.console_logger().unwrap().is_enabled());

    infrastructure.register::<SiteConfig>().unwrap();
    infrastructure.register_application().unwrap();
    let settings = infrastructure.application().unwrap().settings();
    assert_eq!(settings.port, 6100);
    assert_eq!(settings.static_mounts[0].path, "/");

    let duplicate = infrastructure.register::<SiteConfig>();
    assert!(matches!(
        duplicate,
        Err(DependencyError::DuplicateTypeName { .. })
    ));
}

/// 测试配置文件不存在
#[test]
fn test_missing_config_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_path_buf();
    drop(temp_file);

    let result = builder().add_config_file(&path);
    assert!(matches!(
        result,
        Err(InfrastructureError::BootstrapFailed { .. })
    ));
}

/// 测试直接给定设置与容器配置覆盖
#[test]
fn test_explicit_settings() {
    let mut settings = InfrastructureSettings::default();
    settings.application.port = 7100;

    let infrastructure = builder()
        .with_settings(settings)
        .with_container_config(ContainerConfig::strict())
        .with_standard_components(false)
        .build()
        .unwrap();

    assert!(infrastructure.container().is_empty());
    assert_eq!(infrastructure.settings().container, ContainerConfig::strict());
    assert!(matches!(
        infrastructure.shell(),
        Err(InfrastructureError::DependencyError {
            source: DependencyError::ComponentNotFound { .. }
        })
    ));
}

/// 测试日志初始化失败不会影响已有订阅者
#[test]
fn test_repeated_logging_initialization() {
    init_test_logger();
    let result = InfrastructureBuilder::new()
        .without_env()
        .with_logging(LoggingConfig::development())
        .build();
    // 测试进程中已经安装了订阅者
    assert!(matches!(
        result,
        Err(InfrastructureError::BootstrapFailed { .. })
    ));
}

/// 测试统计信息
#[test]
fn test_metrics() {
    let infrastructure = builder().build().unwrap();
    let metrics = infrastructure.metrics();
    assert!(metrics.uptime_ms >= 0);
    assert_eq!(metrics.container.resolved_components, 4);
    let value = serde_json::to_value(&metrics).unwrap();
    assert_eq!(value["container"]["extenders"], json!(6));
}
