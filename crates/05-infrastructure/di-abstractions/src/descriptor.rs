//! 服务、依赖与插槽描述符

use crate::definition::{ComponentBlueprint, ExtensionPointFn};
use crate::registry::ServiceConfiguration;
use infrastructure_common::{DependencyError, DependencyResult, Instance};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 服务描述符
///
/// 每个已注册的组件实例对应一个描述符，注册后只有
/// `unsatisfied_count` 和 `resolved` 会发生变化。
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// 服务ID，注册时分配，单调递增
    pub sid: usize,
    /// 组件自身类型名称
    pub type_name: String,
    /// 组件索引到的全部类型名称：自身名称在前，随后是实现的抽象类型
    pub type_names: Vec<String>,
    /// 组件实例
    pub instance: Instance,
    /// 按类型名称提供给依赖方的视图
    pub exports: HashMap<String, Instance>,
    /// 未满足的依赖数量
    pub unsatisfied_count: usize,
    /// 初始化方法名称
    pub init_method_name: Option<&'static str>,
    /// 是否已完成解析后的处理（初始化与插槽连接）
    pub resolved: bool,
    /// 注册配置
    pub config: ServiceConfiguration,
    /// 组件声明
    pub blueprint: Arc<ComponentBlueprint>,
}

impl ServiceDescriptor {
    /// 依赖是否全部满足
    pub fn is_resolved(&self) -> bool {
        self.unsatisfied_count == 0
    }

    /// 对外可见的类型名称：首个实现的抽象类型，否则为自身类型名称
    pub fn interface_name(&self) -> &str {
        self.type_names
            .get(1)
            .map(String::as_str)
            .unwrap_or(&self.type_name)
    }

    /// 某个类型名称下提供的视图，未单独声明的名称使用自身类型视图
    pub fn view_for(&self, type_name: &str) -> Option<&Instance> {
        self.exports
            .get(type_name)
            .or_else(|| self.exports.get(&self.type_name))
    }

    /// 以具体类型取回组件实例
    pub fn instance_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("sid", &self.sid)
            .field("type_names", &self.type_names)
            .field("unsatisfied_count", &self.unsatisfied_count)
            .field("init_method_name", &self.init_method_name)
            .field("resolved", &self.resolved)
            .field("instance", &"<instance>")
            .finish()
    }
}

/// 依赖边的身份：（所需类型名称、目标字段、依赖方服务ID）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub type_name: String,
    pub field_name: &'static str,
    pub depending_sid: usize,
}

/// 依赖描述符
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// 所需类型名称
    pub type_name: String,
    /// 目标字段名称
    pub field_name: &'static str,
    /// 依赖方服务ID
    pub depending_sid: usize,
    /// 是否已满足，只会由 false 变为 true
    pub satisfied: bool,
    /// 在组件声明依赖列表中的位置
    pub slot: usize,
}

impl DependencyDescriptor {
    /// 依赖边的身份
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            type_name: self.type_name.clone(),
            field_name: self.field_name,
            depending_sid: self.depending_sid,
        }
    }
}

impl PartialEq for DependencyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.field_name == other.field_name
            && self.depending_sid == other.depending_sid
    }
}

impl Eq for DependencyDescriptor {}

/// 扩展器描述符
///
/// 扩展点处理器通过它取得扩展器的配置、所属组件实例、方法名称和可调用对象。
#[derive(Clone)]
pub struct ExtenderDescriptor {
    /// 插槽名称
    pub name: String,
    /// 所属服务ID
    pub service_id: usize,
    /// 所属组件类型名称
    pub type_name: String,
    /// 方法名称
    pub method_name: &'static str,
    /// 扩展器配置
    pub config: serde_json::Value,
    /// 所属组件实例
    pub instance: Instance,
    /// 绑定后的可调用对象
    pub callable: Instance,
}

impl ExtenderDescriptor {
    /// 将扩展器配置绑定为具体类型
    pub fn config<C: DeserializeOwned>(&self) -> DependencyResult<C> {
        serde_json::from_value(self.config.clone()).map_err(|e| {
            DependencyError::ExtensionTypeMismatch {
                slot: self.name.clone(),
                expected: format!("{} ({})", std::any::type_name::<C>(), e),
            }
        })
    }

    /// 取回扩展器的可调用对象
    pub fn callable<C: Send + Sync + 'static>(&self) -> DependencyResult<&C> {
        self.callable
            .downcast_ref::<C>()
            .ok_or_else(|| DependencyError::ExtensionTypeMismatch {
                slot: self.name.clone(),
                expected: std::any::type_name::<C>().to_string(),
            })
    }

    /// 以具体类型取回扩展器所属组件
    pub fn instance_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instance.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ExtenderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtenderDescriptor")
            .field("name", &self.name)
            .field("service_id", &self.service_id)
            .field("type_name", &self.type_name)
            .field("method_name", &self.method_name)
            .field("config", &self.config)
            .finish()
    }
}

/// 扩展点描述符
#[derive(Clone)]
pub struct ExtensionPointDescriptor {
    /// 插槽名称
    pub name: String,
    /// 所属服务ID
    pub service_id: usize,
    /// 所属组件类型名称
    pub type_name: String,
    /// 方法名称
    pub method_name: &'static str,
    /// 所属组件实例
    pub instance: Instance,
    /// 处理器
    pub handler: ExtensionPointFn,
}

impl fmt::Debug for ExtensionPointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionPointDescriptor")
            .field("name", &self.name)
            .field("service_id", &self.service_id)
            .field("type_name", &self.type_name)
            .field("method_name", &self.method_name)
            .finish()
    }
}

/// 服务摘要，用于诊断输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub sid: usize,
    #[serde(rename = "type")]
    pub type_name: String,
    pub implements: Vec<String>,
    pub priority: Option<i32>,
    pub unsatisfied_count: usize,
    pub resolved: bool,
    /// 仍在等待的类型名称
    pub waiting_for: Vec<String>,
}
