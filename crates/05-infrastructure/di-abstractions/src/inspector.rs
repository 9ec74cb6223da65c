//! 注册表检查器
//!
//! 容器在注册和解析时同步更新检查器，检查器可以克隆后交给其他组件，
//! 用于在启动完成后报告注册表状态。

use crate::container::ContainerStats;
use crate::descriptor::ServiceSummary;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct InspectorState {
    services: BTreeMap<usize, ServiceSummary>,
    types: BTreeMap<String, usize>,
    extension_points: usize,
    extenders: usize,
}

/// 注册表检查器
#[derive(Debug, Clone, Default)]
pub struct RegistryInspector {
    state: Arc<RwLock<InspectorState>>,
}

impl RegistryInspector {
    /// 创建新的检查器
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或更新服务摘要
    pub fn publish(&self, summary: ServiceSummary) {
        self.state.write().services.insert(summary.sid, summary);
    }

    /// 记录类型名称当前指向的服务
    pub fn index_type(&self, type_name: &str, sid: usize) {
        self.state.write().types.insert(type_name.to_string(), sid);
    }

    /// 记录新的扩展点
    pub fn record_extension_point(&self) {
        self.state.write().extension_points += 1;
    }

    /// 记录新的扩展器
    pub fn record_extender(&self) {
        self.state.write().extenders += 1;
    }

    /// 全部服务摘要，按服务ID排序
    pub fn summaries(&self) -> Vec<ServiceSummary> {
        self.state.read().services.values().cloned().collect()
    }

    /// 指定服务的摘要
    pub fn summary(&self, sid: usize) -> Option<ServiceSummary> {
        self.state.read().services.get(&sid).cloned()
    }

    /// 仍有未满足依赖的服务
    pub fn pending(&self) -> Vec<ServiceSummary> {
        self.state
            .read()
            .services
            .values()
            .filter(|summary| !summary.resolved)
            .cloned()
            .collect()
    }

    /// 已索引的类型名称，按名称排序
    pub fn type_names(&self) -> Vec<String> {
        self.state.read().types.keys().cloned().collect()
    }

    /// 类型名称当前指向的服务ID
    pub fn sid_for(&self, type_name: &str) -> Option<usize> {
        self.state.read().types.get(type_name).copied()
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        let state = self.state.read();
        let resolved = state.services.values().filter(|s| s.resolved).count();
        ContainerStats {
            registered_components: state.services.len(),
            resolved_components: resolved,
            pending_components: state.services.len() - resolved,
            extension_points: state.extension_points,
            extenders: state.extenders,
        }
    }
}
