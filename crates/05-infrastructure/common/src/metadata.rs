//! 元数据定义
//!
//! 组件在容器中按类型名称索引，名称默认取自 Rust 类型的短名称。

use std::any::TypeId;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    ///
    /// 同样适用于 trait 对象，例如 `TypeInfo::of::<dyn Logger>()` 的名称为 `Logger`。
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            name: short_name(full).to_string(),
            id: TypeId::of::<T>(),
            module_path: full.to_string(),
        }
    }

    /// 获取简短的类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

/// 返回类型的短名称
pub fn type_name_of<T: ?Sized + 'static>() -> String {
    short_name(std::any::type_name::<T>()).to_string()
}

fn short_name(full: &str) -> &str {
    // 泛型参数之前的部分才是类型本身的路径
    let head = full.split('<').next().unwrap_or(full);
    let head = head.trim_start_matches("dyn ");
    let head = head.split(" + ").next().unwrap_or(head);
    head.rsplit("::").next().unwrap_or(head)
}
