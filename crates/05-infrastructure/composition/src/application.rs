//! 应用启动组件
//!
//! [`Application`] 依赖日志接收器和一个 [`ApplicationConfig`] 组件，
//! 初始化时由后者登记静态目录、默认跳转和端口。网络监听由宿主程序负责。

use crate::logger::ComponentLog;
use di_abstractions::{Component, ComponentDefinition};
use infrastructure_common::{HandlerResult, Inject};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// 默认 HTTP 端口
pub const DEFAULT_PORT: u16 = 5000;

/// 应用配置组件
pub trait ApplicationConfig: Send + Sync {
    /// 配置应用
    fn configure(&self, app: &Application) -> HandlerResult;
}

/// 静态目录挂载
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMount {
    /// 挂载路径
    pub path: String,
    /// 本地目录
    pub location: String,
}

/// 未匹配请求的默认返回文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRedirect {
    pub dir: String,
    pub location: String,
}

/// 应用初始化后的设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub port: u16,
    pub static_mounts: Vec<StaticMount>,
    pub default_redirect: Option<DefaultRedirect>,
    pub initialized: bool,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_mounts: Vec::new(),
            default_redirect: None,
            initialized: false,
        }
    }
}

/// 应用组件
#[derive(Debug, Default)]
pub struct Application {
    log: ComponentLog<Application>,
    app_config: Inject<dyn ApplicationConfig>,
    settings: RwLock<ApplicationSettings>,
}

impl Application {
    /// 使用指定端口创建应用，`ApplicationConfig` 仍可覆盖
    pub fn with_port(port: u16) -> Self {
        let app = Self::default();
        app.set_port(port);
        app
    }

    /// 在 `path` 下挂载静态目录
    pub fn serve_static(&self, path: impl Into<String>, location: impl Into<String>) {
        self.settings.write().static_mounts.push(StaticMount {
            path: path.into(),
            location: location.into(),
        });
    }

    /// 在根路径挂载静态目录
    pub fn serve(&self, location: impl Into<String>) {
        self.serve_static("/", location);
    }

    pub fn set_port(&self, port: u16) {
        self.settings.write().port = port;
    }

    /// 未匹配的请求统一返回 `dir/location`
    pub fn redirect_by_default_to(&self, dir: impl Into<String>, location: impl Into<String>) {
        self.settings.write().default_redirect = Some(DefaultRedirect {
            dir: dir.into(),
            location: location.into(),
        });
    }

    pub fn port(&self) -> u16 {
        self.settings.read().port
    }

    /// 当前设置快照
    pub fn settings(&self) -> ApplicationSettings {
        self.settings.read().clone()
    }

    fn init(&self) -> HandlerResult {
        self.log.info("Initializing application");
        let config = self.app_config.get().ok_or("应用配置组件尚未注入")?;
        config.configure(self)?;

        let mut settings = self.settings.write();
        settings.initialized = true;
        self.log.info(format!(
            "应用配置完成: 端口 {}, 静态目录 {} 个",
            settings.port,
            settings.static_mounts.len()
        ));
        Ok(())
    }
}

impl Component for Application {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .depends_on("app_config", |this: &Self| &this.app_config)
            .init("init", Self::init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::ConsoleLogger;
    use di_abstractions::{ServiceConfiguration, ServiceRegistry};
    use di_impl::DependencyManager;
    use infrastructure_common::DependencyError;
    use std::sync::Arc;

    #[derive(Default)]
    struct SiteConfig;

    impl ApplicationConfig for SiteConfig {
        fn configure(&self, app: &Application) -> HandlerResult {
            app.serve_static("/assets", "public/assets");
            app.redirect_by_default_to("public", "index.html");
            app.set_port(8080);
            Ok(())
        }
    }

    impl Component for SiteConfig {
        fn definition() -> ComponentDefinition<Self> {
            ComponentDefinition::new().implements(|this: Arc<Self>| this as Arc<dyn ApplicationConfig>)
        }
    }

    #[derive(Default)]
    struct BrokenConfig;

    impl ApplicationConfig for BrokenConfig {
        fn configure(&self, _app: &Application) -> HandlerResult {
            Err("missing static directory".into())
        }
    }

    impl Component for BrokenConfig {
        fn definition() -> ComponentDefinition<Self> {
            ComponentDefinition::new().implements(|this: Arc<Self>| this as Arc<dyn ApplicationConfig>)
        }
    }

    #[test]
    fn test_application_waits_for_config() {
        let mut container = DependencyManager::new();
        container.register::<ConsoleLogger>(ServiceConfiguration::default()).unwrap();
        let sid = container.register::<Application>(ServiceConfiguration::default()).unwrap();
        assert_eq!(container.descriptor(sid).unwrap().unsatisfied_count, 1);

        container.register::<SiteConfig>(ServiceConfiguration::default()).unwrap();
        let app = container.get::<Application>("Application").unwrap();
        let settings = app.settings();
        assert!(settings.initialized);
        assert_eq!(settings.port, 8080);
        assert_eq!(
            settings.static_mounts,
            vec![StaticMount {
                path: "/assets".to_string(),
                location: "public/assets".to_string(),
            }]
        );
        assert_eq!(settings.default_redirect.unwrap().location, "index.html");

        let logger = container.get::<ConsoleLogger>("ConsoleLogger").unwrap();
        assert!(logger
            .lines()
            .iter()
            .any(|line| line.ends_with("Application\t| Initializing application")));
    }

    #[test]
    fn test_default_port() {
        assert_eq!(Application::default().port(), DEFAULT_PORT);
        assert_eq!(Application::with_port(7000).port(), 7000);
    }

    #[test]
    fn test_configure_failure_propagates() {
        let mut container = DependencyManager::new();
        container.register::<ConsoleLogger>(ServiceConfiguration::default()).unwrap();
        container.register::<BrokenConfig>(ServiceConfiguration::default()).unwrap();

        let result = container.register::<Application>(ServiceConfiguration::default());
        assert!(matches!(
            result,
            Err(DependencyError::InitializerFailed { ref component, .. }) if component == "Application"
        ));
    }
}
