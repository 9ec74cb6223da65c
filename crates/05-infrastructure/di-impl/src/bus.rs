//! 扩展总线
//!
//! 扩展点与扩展器按插槽名称登记，多对多连接，与类型依赖图无关。

use di_abstractions::{ExtenderDescriptor, ExtensionPointDescriptor};
use std::collections::HashMap;

/// 扩展总线
#[derive(Debug, Default)]
pub struct ExtensionBus {
    extension_points: HashMap<String, Vec<ExtensionPointDescriptor>>,
    extenders: HashMap<String, Vec<ExtenderDescriptor>>,
}

impl ExtensionBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记扩展点
    pub fn add_extension_point(&mut self, point: ExtensionPointDescriptor) {
        self.extension_points
            .entry(point.name.clone())
            .or_default()
            .push(point);
    }

    /// 登记扩展器
    pub fn add_extender(&mut self, extender: ExtenderDescriptor) {
        self.extenders
            .entry(extender.name.clone())
            .or_default()
            .push(extender);
    }

    /// 指定名称下的扩展点，按登记顺序
    pub fn extension_points(&self, name: &str) -> &[ExtensionPointDescriptor] {
        self.extension_points
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 指定名称下的扩展器，按登记顺序
    pub fn extenders(&self, name: &str) -> &[ExtenderDescriptor] {
        self.extenders.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
