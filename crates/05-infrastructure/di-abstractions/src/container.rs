//! 容器配置与统计

use serde::{Deserialize, Serialize};

/// 重复类型名称的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 后注册者覆盖先注册者，先注册者仍可按服务ID取得
    #[default]
    Replace,
    /// 拒绝注册
    Reject,
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// 重复类型名称的处理策略
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

impl ContainerConfig {
    /// 拒绝重复类型名称的配置
    pub fn strict() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 已解析组件数量
    pub resolved_components: usize,
    /// 等待依赖的组件数量
    pub pending_components: usize,
    /// 扩展点数量
    pub extension_points: usize,
    /// 扩展器数量
    pub extenders: usize,
}
