//! # 依赖注入具体实现
//!
//! [`DependencyManager`] 是服务注册表、依赖索引、解析引擎和扩展总线的组合。
//! 组件可以按任意顺序注册：每次注册都会尝试立即解析新组件，
//! 解析成功后运行初始化方法、连接扩展插槽，并级联解析正在等待它的组件。

pub mod bus;
pub mod index;
mod resolution;

pub use bus::ExtensionBus;
pub use index::DependencyIndex;

use di_abstractions::{
    provided, Component, ComponentBlueprint, ContainerConfig, ContainerStats,
    DependencyDescriptor, DuplicatePolicy, RegistryInspector, ResolveContext, ServiceConfiguration,
    ServiceDescriptor, ServiceRegistry, ServiceSummary,
};
use infrastructure_common::{DependencyError, DependencyResult, Instance};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 依赖管理器
///
/// 单线程使用：所有修改都经过 `&mut self`，注册调用在返回前完成全部级联。
/// 需要多线程注册时应在外部用互斥锁包裹整个管理器。
pub struct DependencyManager {
    /// 容器配置
    config: ContainerConfig,
    /// 服务描述符，下标即服务ID
    services_by_id: Vec<ServiceDescriptor>,
    /// 类型名称 -> 服务ID
    services_by_type: HashMap<String, usize>,
    /// 依赖索引
    index: DependencyIndex,
    /// 扩展总线
    bus: ExtensionBus,
    /// 注册表检查器
    inspector: RegistryInspector,
}

impl DependencyManager {
    /// 创建新的依赖管理器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建依赖管理器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            services_by_id: Vec::new(),
            services_by_type: HashMap::new(),
            index: DependencyIndex::new(),
            bus: ExtensionBus::new(),
            inspector: RegistryInspector::new(),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册表检查器，克隆后与容器共享状态
    pub fn inspector(&self) -> RegistryInspector {
        self.inspector.clone()
    }

    /// 依赖索引
    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// 扩展总线
    pub fn bus(&self) -> &ExtensionBus {
        &self.bus
    }

    /// 已注册的服务数量
    pub fn len(&self) -> usize {
        self.services_by_id.len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.services_by_id.is_empty()
    }

    /// 注册类型擦除后的组件
    ///
    /// `own_view` 是按组件自身类型名称注入给依赖方的视图。
    pub fn register_blueprint(
        &mut self,
        instance: Instance,
        own_view: Instance,
        blueprint: ComponentBlueprint,
        config: ServiceConfiguration,
    ) -> DependencyResult<usize> {
        let mut type_names = vec![blueprint.type_name.clone()];
        let declared = blueprint
            .implements
            .iter()
            .map(|export| &export.type_name)
            .chain(config.implements.iter());
        for type_name in declared {
            if !type_names.contains(type_name) {
                type_names.push(type_name.clone());
            }
        }

        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            if let Some((type_name, &existing_sid)) = type_names
                .iter()
                .find_map(|name| self.services_by_type.get(name).map(|sid| (name, sid)))
            {
                return Err(DependencyError::DuplicateTypeName {
                    type_name: type_name.clone(),
                    existing_sid,
                });
            }
        }

        let mut exports = HashMap::new();
        for export in &blueprint.implements {
            exports.insert(export.type_name.clone(), (export.view)(&instance)?);
        }
        exports.insert(blueprint.type_name.clone(), own_view);

        let sid = self.services_by_id.len();
        for (slot, dependency) in blueprint.dependencies.iter().enumerate() {
            self.index.add(DependencyDescriptor {
                type_name: dependency.type_name.clone(),
                field_name: dependency.field_name,
                depending_sid: sid,
                satisfied: false,
                slot,
            });
        }

        for type_name in &type_names {
            if let Some(previous) = self.services_by_type.insert(type_name.clone(), sid) {
                debug!(type_name = %type_name, previous, sid, "类型名称改由新组件提供");
            }
            self.inspector.index_type(type_name, sid);
        }

        debug!(
            sid,
            type_name = %blueprint.type_name,
            dependencies = blueprint.dependencies.len(),
            "注册组件"
        );

        self.services_by_id.push(ServiceDescriptor {
            sid,
            type_name: blueprint.type_name.clone(),
            type_names,
            instance,
            exports,
            unsatisfied_count: blueprint.dependencies.len(),
            init_method_name: blueprint.initializer.as_ref().map(|init| init.method_name),
            resolved: false,
            config,
            blueprint: Arc::new(blueprint),
        });
        self.inspector.publish(self.summarize(sid));

        self.resolve(sid, &mut ResolveContext::new())?;
        Ok(sid)
    }

    /// 生成服务摘要
    fn summarize(&self, sid: usize) -> ServiceSummary {
        let descriptor = &self.services_by_id[sid];
        ServiceSummary {
            sid,
            type_name: descriptor.type_name.clone(),
            implements: descriptor.type_names[1..].to_vec(),
            priority: descriptor.config.priority,
            unsatisfied_count: descriptor.unsatisfied_count,
            resolved: descriptor.is_resolved(),
            waiting_for: self
                .index
                .unsatisfied(sid)
                .map(|dependency| dependency.type_name.clone())
                .collect(),
        }
    }
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DependencyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyManager")
            .field("config", &self.config)
            .field("services", &self.services_by_id.len())
            .field("types", &self.services_by_type.len())
            .field("waiting_edges", &self.index.waiting_count())
            .finish()
    }
}

impl ServiceRegistry for DependencyManager {
    fn register<T>(&mut self, config: ServiceConfiguration) -> DependencyResult<usize>
    where
        T: Component + Default,
    {
        self.register_instance(T::default(), config)
    }

    fn register_instance<T>(&mut self, instance: T, config: ServiceConfiguration) -> DependencyResult<usize>
    where
        T: Component,
    {
        let typed = Arc::new(instance);
        let own_view = provided(typed.clone());
        self.register_blueprint(typed, own_view, T::definition().into_blueprint(), config)
    }

    fn descriptor(&self, sid: usize) -> Option<&ServiceDescriptor> {
        self.services_by_id.get(sid)
    }

    fn descriptor_by_type(&self, type_name: &str) -> Option<&ServiceDescriptor> {
        self.services_by_type
            .get(type_name)
            .and_then(|&sid| self.services_by_id.get(sid))
    }

    fn get<T>(&self, type_name: &str) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let descriptor =
            self.descriptor_by_type(type_name)
                .ok_or_else(|| DependencyError::ComponentNotFound {
                    type_name: type_name.to_string(),
                })?;
        if !descriptor.is_resolved() {
            return Err(DependencyError::ComponentNotResolved {
                type_name: type_name.to_string(),
                unsatisfied_count: descriptor.unsatisfied_count,
            });
        }
        descriptor
            .view_for(type_name)
            .and_then(|view| view.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or_else(|| DependencyError::LookupTypeMismatch {
                type_name: type_name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    fn is_registered(&self, type_name: &str) -> bool {
        self.services_by_type.contains_key(type_name)
    }

    fn type_names(&self) -> Vec<String> {
        self.inspector.type_names()
    }

    fn summaries(&self) -> Vec<ServiceSummary> {
        self.inspector.summaries()
    }

    fn pending(&self) -> Vec<ServiceSummary> {
        self.inspector.pending()
    }

    fn stats(&self) -> ContainerStats {
        self.inspector.stats()
    }
}
