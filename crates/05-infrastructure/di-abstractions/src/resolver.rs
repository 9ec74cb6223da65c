//! 解析上下文
//!
//! 一次级联解析过程中共享的状态。

use crate::descriptor::EdgeKey;
use std::collections::HashSet;

/// 解析上下文
///
/// 记录本次级联中已经处理过的依赖边，同一条边不会被处理两次，
/// 图中存在回边时递归也能终止。
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    visited: HashSet<EdgeKey>,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记依赖边为已访问，首次访问返回 `true`
    pub fn visit(&mut self, edge: EdgeKey) -> bool {
        self.visited.insert(edge)
    }
}
