//! 资源路由绑定
//!
//! [`ResourceHandler`] 持有 `"resource"` 扩展点，按 `(方法, 路径)` 登记处理函数。
//! 同一路由后登记者覆盖先登记者。

use crate::logger::ComponentLog;
use di_abstractions::{Component, ComponentDefinition, ExtenderDescriptor};
use infrastructure_common::{BoxError, HandlerResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// 资源扩展点名称
pub const RESOURCE_SLOT: &str = "resource";

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ResourceError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// 资源扩展器的声明配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub method: Method,
    pub url: String,
}

/// 资源请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequest {
    /// 查询或路径参数
    pub params: HashMap<String, String>,
    /// 请求体
    pub body: Option<Value>,
}

impl ResourceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// 资源处理函数
pub type ResourceFn = Arc<dyn Fn(&ResourceRequest) -> Result<Option<Value>, BoxError> + Send + Sync>;

/// 资源错误类型
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("不支持的请求方法: {method}")]
    UnsupportedMethod { method: String },

    #[error("路由不存在: {method} {url}")]
    RouteNotFound { method: Method, url: String },

    #[error("资源处理失败: {method} {url}, 原因: {source}")]
    HandlerFailed {
        method: Method,
        url: String,
        source: BoxError,
    },
}

/// 声明资源扩展器的便捷方法
pub trait ResourceExt<T> {
    fn resource<F>(self, method_name: &'static str, method: Method, url: &str, handler: F) -> Self
    where
        F: Fn(&T, &ResourceRequest) -> Result<Option<Value>, BoxError> + Send + Sync + 'static;
}

impl<T: Component> ResourceExt<T> for ComponentDefinition<T> {
    fn resource<F>(self, method_name: &'static str, method: Method, url: &str, handler: F) -> Self
    where
        F: Fn(&T, &ResourceRequest) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        self.extender(
            RESOURCE_SLOT,
            method_name,
            json!({ "method": method, "url": url }),
            move |this: Arc<T>| -> ResourceFn {
                let handler = handler.clone();
                Arc::new(move |request: &ResourceRequest| handler(&*this, request))
            },
        )
    }
}

/// 路由绑定信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBinding {
    pub method: Method,
    pub url: String,
    pub component: String,
    pub method_name: &'static str,
}

struct Route {
    binding: RouteBinding,
    handler: ResourceFn,
}

/// 资源路由处理器
#[derive(Default)]
pub struct ResourceHandler {
    log: ComponentLog<ResourceHandler>,
    routes: RwLock<BTreeMap<(Method, String), Route>>,
}

impl ResourceHandler {
    fn register_resource(&self, extender: &ExtenderDescriptor) -> HandlerResult {
        let config: ResourceConfig = extender.config()?;
        let handler = extender.callable::<ResourceFn>()?.clone();
        self.log.debug(format!(
            "resource added {} {} -> {}.{}",
            config.method, config.url, extender.type_name, extender.method_name
        ));

        let binding = RouteBinding {
            method: config.method,
            url: config.url.clone(),
            component: extender.type_name.clone(),
            method_name: extender.method_name,
        };
        self.routes
            .write()
            .insert((config.method, config.url), Route { binding, handler });
        Ok(())
    }

    /// 已绑定的路由
    pub fn routes(&self) -> Vec<RouteBinding> {
        self.routes
            .read()
            .values()
            .map(|route| route.binding.clone())
            .collect()
    }

    /// 调用路由绑定的处理函数
    pub fn dispatch(
        &self,
        method: Method,
        url: &str,
        request: &ResourceRequest,
    ) -> Result<Option<Value>, ResourceError> {
        let handler = self
            .routes
            .read()
            .get(&(method, url.to_string()))
            .map(|route| route.handler.clone())
            .ok_or_else(|| ResourceError::RouteNotFound {
                method,
                url: url.to_string(),
            })?;

        handler(request).map_err(|source| {
            self.log.error(format!("{method} {url} 处理失败: {source}"));
            ResourceError::HandlerFailed {
                method,
                url: url.to_string(),
                source,
            }
        })
    }
}

impl fmt::Debug for ResourceHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("routes", &self.routes().len())
            .finish()
    }
}

impl Component for ResourceHandler {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .init("init", |this: &Self| {
                this.log.debug("Service initialised");
                Ok(())
            })
            .extension_point(RESOURCE_SLOT, "register_resource", Self::register_resource)
    }
}
