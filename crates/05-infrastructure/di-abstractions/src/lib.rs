//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件声明、描述符和注册表接口。
//!
//! ## 核心接口
//!
//! - [`Component`] / [`ComponentDefinition`] - 组件声明
//! - [`ServiceRegistry`] - 服务注册表接口
//! - [`ServiceDescriptor`] / [`DependencyDescriptor`] - 注册表记录
//! - [`ExtenderDescriptor`] / [`ExtensionPointDescriptor`] - 扩展插槽记录
//! - [`RegistryInspector`] - 注册表检查器

pub mod container;
pub mod definition;
pub mod descriptor;
pub mod inspector;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use definition::*;
pub use descriptor::*;
pub use inspector::*;
pub use registry::*;
pub use resolver::*;
