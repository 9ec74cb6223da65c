//! 依赖索引
//!
//! 入边按所需类型名称索引（谁在等待这个类型），
//! 出边按服务ID索引（这个服务还需要什么）。

use di_abstractions::{DependencyDescriptor, EdgeKey};
use std::collections::HashMap;

/// 依赖索引
#[derive(Debug, Default)]
pub struct DependencyIndex {
    /// 类型名称 -> 仍在等待该类型的依赖边
    inbound: HashMap<String, Vec<EdgeKey>>,
    /// 服务ID -> 该服务声明的全部依赖
    outbound: HashMap<usize, Vec<DependencyDescriptor>>,
}

impl DependencyIndex {
    /// 创建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加依赖边
    pub fn add(&mut self, dependency: DependencyDescriptor) {
        self.inbound
            .entry(dependency.type_name.clone())
            .or_default()
            .push(dependency.key());
        self.outbound
            .entry(dependency.depending_sid)
            .or_default()
            .push(dependency);
    }

    /// 服务声明的依赖
    pub fn outbound(&self, sid: usize) -> &[DependencyDescriptor] {
        self.outbound.get(&sid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 仍在等待指定类型的依赖边
    pub fn inbound(&self, type_name: &str) -> &[EdgeKey] {
        self.inbound.get(type_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 服务尚未满足的依赖
    pub fn unsatisfied(&self, sid: usize) -> impl Iterator<Item = &DependencyDescriptor> {
        self.outbound(sid).iter().filter(|dep| !dep.satisfied)
    }

    /// 将依赖边标记为已满足，并从入边索引中移除
    ///
    /// 已满足的边不会再次被标记，返回值表示本次调用是否改变了状态。
    pub fn satisfy(&mut self, sid: usize, position: usize) -> bool {
        let Some(dependency) = self
            .outbound
            .get_mut(&sid)
            .and_then(|deps| deps.get_mut(position))
        else {
            return false;
        };
        if dependency.satisfied {
            return false;
        }
        dependency.satisfied = true;

        let key = dependency.key();
        if let Some(waiting) = self.inbound.get_mut(&key.type_name) {
            waiting.retain(|edge| *edge != key);
            if waiting.is_empty() {
                self.inbound.remove(&key.type_name);
            }
        }
        true
    }

    /// 仍在等待的依赖边总数
    pub fn waiting_count(&self) -> usize {
        self.inbound.values().map(Vec::len).sum()
    }
}
