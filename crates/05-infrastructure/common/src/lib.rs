//! # Infrastructure Common
//!
//! 服务容器各 crate 共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`Inject`] - 依赖注入槽，组件在其中接收已解析的依赖
//! - [`Instance`] - 类型擦除后的组件实例
//! - [`TypeInfo`] - 类型名称信息，用于按名称索引组件
//! - [`DependencyError`] / [`ConfigError`] / [`InfrastructureError`] - 错误类型

pub mod component;
pub mod errors;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use metadata::*;
