//! 日志接收组件
//!
//! [`ConsoleLogger`] 以 `Logger` 名称注册，其它组件通过 [`ComponentLog`] 取得注入的日志接收器。

use crate::shell::{ShellCommandExt, ShellRequest, ShellResponse};
use chrono::{SecondsFormat, Utc};
use di_abstractions::{Component, ComponentDefinition};
use infrastructure_common::{type_name_of, Inject};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

/// 日志级别，按严重程度从高到低排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// 级别名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }

    /// 在阈值 `threshold` 下是否应当输出
    pub fn passes(&self, threshold: Level) -> bool {
        *self <= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Level::Error),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "DEBUG" | "TRACE" => Ok(Level::Debug),
            other => Err(format!("未知日志级别: {other}")),
        }
    }
}

/// 日志接收器
pub trait Logger: Send + Sync {
    /// 记录一条日志
    fn log(&self, level: Level, message: &str);

    /// 设置输出阈值
    fn set_level(&self, level: Level);
}

#[derive(Debug)]
struct ConsoleState {
    lines: Vec<String>,
    level: Level,
    enabled: bool,
}

/// 控制台日志接收器
///
/// 所有日志行都会缓存，开启输出后再按阈值转发给 `tracing`。
#[derive(Debug)]
pub struct ConsoleLogger {
    state: Mutex<ConsoleState>,
}

impl ConsoleLogger {
    /// 创建日志接收器
    pub fn new(level: Level, enabled: bool) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                lines: Vec::new(),
                level,
                enabled,
            }),
        }
    }

    /// 已缓存的全部日志行
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().lines.clone()
    }

    /// 当前阈值
    pub fn level(&self) -> Level {
        self.state.lock().level
    }

    /// 是否转发到 `tracing`
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// 开启或关闭输出
    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn show_log(&self, _request: &ShellRequest, response: &mut ShellResponse) {
        for line in self.lines() {
            match line.split('\t').next() {
                Some("ERROR") => response.error(line),
                Some("WARN") => response.warn(line),
                Some("INFO") => response.line(line),
                _ => response.highlight(line),
            };
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(Level::Info, false)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: Level, message: &str) {
        let line = format!(
            "{}\t| {}\t| {}",
            level,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        );

        let mut state = self.state.lock();
        if state.enabled && level.passes(state.level) {
            match level {
                Level::Error => tracing::error!("{}", message),
                Level::Warn => tracing::warn!("{}", message),
                Level::Info => tracing::info!("{}", message),
                Level::Debug => tracing::debug!("{}", message),
            }
        }
        state.lines.push(line);
    }

    fn set_level(&self, level: Level) {
        self.state.lock().level = level;
    }
}

impl Component for ConsoleLogger {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .implements(|this: Arc<Self>| this as Arc<dyn Logger>)
            .shell_command("show_log", "log all", "显示全部日志", Self::show_log)
            .shell_command("disable_logger", "log output off", "关闭控制台日志输出", |this: &Self, _, _| {
                this.set_enabled(false);
            })
            .shell_command("enable_logger", "log output on", "开启控制台日志输出", |this: &Self, _, _| {
                this.set_enabled(true);
            })
    }
}

/// 组件日志助手
///
/// 组件内嵌此字段并以 `depends_on("logger", |this: &Self| this.log.slot())` 声明依赖，
/// 之后即可用组件名称作前缀记录日志。
pub struct ComponentLog<T> {
    logger: Inject<dyn Logger>,
    _owner: PhantomData<fn() -> T>,
}

impl<T: 'static> ComponentLog<T> {
    /// 日志接收器的注入槽
    pub fn slot(&self) -> &Inject<dyn Logger> {
        &self.logger
    }

    /// 已注入的日志接收器
    pub fn logger(&self) -> Option<&Arc<dyn Logger>> {
        self.logger.get()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Level::Debug, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(Level::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::Error, message.as_ref());
    }

    fn log(&self, level: Level, message: &str) {
        let component = type_name_of::<T>();
        match self.logger.get() {
            Some(logger) => logger.log(level, &format!("{component}\t| {message}")),
            None => tracing::trace!(component = %component, level = %level, "日志接收器尚未注入: {}", message),
        }
    }
}

impl<T> Default for ComponentLog<T> {
    fn default() -> Self {
        Self {
            logger: Inject::empty(),
            _owner: PhantomData,
        }
    }
}

impl<T: 'static> fmt::Debug for ComponentLog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentLog")
            .field("component", &type_name_of::<T>())
            .field("logger", &self.logger)
            .finish()
    }
}
