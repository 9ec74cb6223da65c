//! 错误类型定义

use crate::component::BoxError;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置加载失败: {message}")]
    LoadFailed { message: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置值无效: {key} = {value}")]
    InvalidValue { key: String, value: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("类型名称已被组件 #{existing_sid} 占用: {type_name}")]
    DuplicateTypeName { type_name: String, existing_sid: usize },

    #[error("组件未注册: {type_name}")]
    ComponentNotFound { type_name: String },

    #[error("组件尚未解析: {type_name}, 仍有 {unsatisfied_count} 个依赖未满足")]
    ComponentNotResolved {
        type_name: String,
        unsatisfied_count: usize,
    },

    #[error("依赖注入类型不匹配: {component}.{field} 需要 {expected}")]
    InjectionTypeMismatch {
        component: String,
        field: String,
        expected: String,
    },

    #[error("注入槽已被占用: {component}.{field}")]
    SlotAlreadyInjected { component: String, field: String },

    #[error("组件类型不匹配: {type_name} 不能作为 {expected} 取得")]
    LookupTypeMismatch { type_name: String, expected: String },

    #[error("扩展类型不匹配: 插槽 {slot} 需要 {expected}")]
    ExtensionTypeMismatch { slot: String, expected: String },

    #[error("组件初始化失败: {component}.{method}, 原因: {source}")]
    InitializerFailed {
        component: String,
        method: String,
        source: BoxError,
    },

    #[error("插槽处理失败: {slot} ({component}.{method}), 原因: {source}")]
    SlotHandlerFailed {
        slot: String,
        component: String,
        method: String,
        source: BoxError,
    },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
