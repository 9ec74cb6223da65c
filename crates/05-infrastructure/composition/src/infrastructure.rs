//! 基础设施主入口

use crate::application::Application;
use crate::builder::InfrastructureBuilder;
use crate::config_sources::InfrastructureSettings;
use crate::logger::ConsoleLogger;
use crate::resource::ResourceHandler;
use crate::shell::ShellHandler;
use chrono::{DateTime, Utc};
use di_abstractions::{Component, ContainerStats, ServiceConfiguration, ServiceRegistry};
use di_impl::DependencyManager;
use infrastructure_common::{DependencyResult, InfrastructureError};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 基础设施
///
/// 持有依赖管理器和启动设置，提供标准组件的类型化访问
#[derive(Debug)]
pub struct Infrastructure {
    /// 依赖管理器
    container: DependencyManager,
    /// 启动设置
    settings: InfrastructureSettings,
    /// 构建时间
    started_at: DateTime<Utc>,
}

impl Infrastructure {
    /// 创建基础设施构建器
    pub fn builder() -> InfrastructureBuilder {
        InfrastructureBuilder::new()
    }

    pub(crate) fn new(container: DependencyManager, settings: InfrastructureSettings) -> Self {
        Self {
            container,
            settings,
            started_at: Utc::now(),
        }
    }

    /// 注册组件
    pub fn register<T: Component + Default>(&mut self) -> DependencyResult<usize> {
        self.container.register::<T>(ServiceConfiguration::default())
    }

    /// 使用指定配置注册组件
    pub fn register_with<T: Component + Default>(
        &mut self,
        config: ServiceConfiguration,
    ) -> DependencyResult<usize> {
        self.container.register::<T>(config)
    }

    /// 注册已构造的组件
    pub fn register_instance<T: Component>(&mut self, instance: T) -> DependencyResult<usize> {
        self.container.register_instance(instance, ServiceConfiguration::default())
    }

    /// 注册应用组件，端口取自设置
    pub fn register_application(&mut self) -> DependencyResult<usize> {
        info!(port = self.settings.application.port, "注册应用组件");
        let app = Application::with_port(self.settings.application.port);
        self.container.register_instance(app, ServiceConfiguration::default())
    }

    /// 按类型名称获取已解析的组件
    pub fn get<T>(&self, type_name: &str) -> Result<Arc<T>, InfrastructureError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.container.get::<T>(type_name)?)
    }

    /// 命令行处理器
    pub fn shell(&self) -> Result<Arc<ShellHandler>, InfrastructureError> {
        self.get("ShellHandler")
    }

    /// 资源路由处理器
    pub fn resources(&self) -> Result<Arc<ResourceHandler>, InfrastructureError> {
        self.get("ResourceHandler")
    }

    /// 控制台日志接收器
    pub fn console_logger(&self) -> Result<Arc<ConsoleLogger>, InfrastructureError> {
        self.get("ConsoleLogger")
    }

    /// 应用组件
    pub fn application(&self) -> Result<Arc<Application>, InfrastructureError> {
        self.get("Application")
    }

    pub fn settings(&self) -> &InfrastructureSettings {
        &self.settings
    }

    pub fn container(&self) -> &DependencyManager {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut DependencyManager {
        &mut self.container
    }

    /// 统计信息
    pub fn metrics(&self) -> InfrastructureMetrics {
        InfrastructureMetrics {
            started_at: self.started_at,
            uptime_ms: (Utc::now() - self.started_at).num_milliseconds(),
            container: self.container.stats(),
        }
    }
}

/// 基础设施统计信息
#[derive(Debug, Clone, Serialize)]
pub struct InfrastructureMetrics {
    /// 构建时间
    pub started_at: DateTime<Utc>,
    /// 运行时间（毫秒）
    pub uptime_ms: i64,
    /// 容器统计
    pub container: ContainerStats,
}
