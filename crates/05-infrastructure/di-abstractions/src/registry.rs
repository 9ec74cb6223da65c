//! 服务注册表抽象接口

use crate::container::ContainerStats;
use crate::definition::Component;
use crate::descriptor::{ServiceDescriptor, ServiceSummary};
use infrastructure_common::DependencyResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 服务注册配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    /// 优先级，保留字段，解析算法不使用
    #[serde(default)]
    pub priority: Option<i32>,
    /// 额外实现的类型名称
    #[serde(default)]
    pub implements: Vec<String>,
    /// 自定义属性
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl ServiceConfiguration {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// 添加实现的类型名称
    pub fn with_implements(mut self, type_name: impl Into<String>) -> Self {
        self.implements.push(type_name.into());
        self
    }

    /// 添加属性
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// 服务注册表 trait
///
/// 注册即解析：每次注册都会尝试满足新组件的依赖，
/// 并级联解析正在等待它的组件。
pub trait ServiceRegistry {
    /// 构造并注册组件，返回服务ID
    fn register<T>(&mut self, config: ServiceConfiguration) -> DependencyResult<usize>
    where
        T: Component + Default;

    /// 注册已构造的组件实例，返回服务ID
    fn register_instance<T>(&mut self, instance: T, config: ServiceConfiguration) -> DependencyResult<usize>
    where
        T: Component;

    /// 按服务ID获取描述符
    fn descriptor(&self, sid: usize) -> Option<&ServiceDescriptor>;

    /// 按类型名称获取描述符
    fn descriptor_by_type(&self, type_name: &str) -> Option<&ServiceDescriptor>;

    /// 按类型名称获取已解析的组件
    fn get<T>(&self, type_name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static;

    /// 类型名称是否已注册
    fn is_registered(&self, type_name: &str) -> bool;

    /// 已索引的全部类型名称，按名称排序
    fn type_names(&self) -> Vec<String>;

    /// 全部服务摘要，按服务ID排序
    fn summaries(&self) -> Vec<ServiceSummary>;

    /// 仍有未满足依赖的服务
    fn pending(&self) -> Vec<ServiceSummary> {
        self.summaries()
            .into_iter()
            .filter(|summary| !summary.resolved)
            .collect()
    }

    /// 统计信息
    fn stats(&self) -> ContainerStats;
}
