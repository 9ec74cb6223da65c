//! 示例组件

use di_abstractions::{Component, ComponentDefinition, ExtenderDescriptor};
use infrastructure_common::{HandlerResult, Inject};
use infrastructure_composition::{
    Application, ApplicationConfig, ComponentLog, Method, ResourceExt, ResourceRequest,
    ShellCommandExt,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct HelperService {
    log: ComponentLog<HelperService>,
}

impl HelperService {
    pub fn say_something(&self) -> String {
        "well something".to_string()
    }
}

impl Component for HelperService {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .init("init", |this: &Self| {
                this.log.info("This is a message from the helper");
                Ok(())
            })
    }
}

#[derive(Debug, Default)]
pub struct ExampleTask {
    log: ComponentLog<ExampleTask>,
    helper_service: Inject<HelperService>,
}

impl ExampleTask {
    pub fn do_something(&self, something: &str) {
        self.log.info(format!("I was instructed to {something}"));
        self.log.warn("Consider this a warning");
    }
}

impl Component for ExampleTask {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .depends_on("helper_service", |this: &Self| &this.helper_service)
            .init("init", |this: &Self| {
                let helper = this.helper_service.get().ok_or("helper_service 尚未注入")?;
                this.log.debug(format!("Message from helper: {}", helper.say_something()));
                Ok(())
            })
    }
}

#[derive(Debug, Default)]
pub struct SomeOtherService {
    log: ComponentLog<SomeOtherService>,
    example_task: Inject<ExampleTask>,
}

impl Component for SomeOtherService {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .depends_on("example_task", |this: &Self| &this.example_task)
            .init("init", |this: &Self| {
                let task = this.example_task.get().ok_or("example_task 尚未注入")?;
                task.do_something("go swim");
                Ok(())
            })
    }
}

/// `"test"` 插槽上扩展器提供的可调用对象
pub type TestFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
pub struct PointTest {
    log: ComponentLog<PointTest>,
    invocations: AtomicUsize,
}

impl PointTest {
    fn add_extension(&self, extender: &ExtenderDescriptor) -> HandlerResult {
        let call = extender.callable::<TestFn>()?;
        call();
        let count = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.info(format!(
            "扩展器 {}.{} 已调用 (第 {count} 次)",
            extender.type_name, extender.method_name
        ));
        Ok(())
    }
}

impl Component for PointTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .extension_point("test", "add_extension", Self::add_extension)
            .shell_command("show_invocations", "test count", "显示 test 插槽的调用次数", |this: &Self, _, response| {
                response.line(this.invocations.load(Ordering::SeqCst).to_string());
            })
    }
}

#[derive(Debug, Default)]
pub struct FirstTest;

impl Component for FirstTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().extender("test", "do_something", json!({}), |_this: Arc<Self>| -> TestFn {
            Arc::new(|| tracing::debug!("FirstTest.do_something"))
        })
    }
}

#[derive(Debug, Default)]
pub struct AnotherTest;

impl Component for AnotherTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().extender("test", "do_something", json!({}), |_this: Arc<Self>| -> TestFn {
            Arc::new(|| tracing::debug!("AnotherTest.do_something"))
        })
    }
}

/// 示例资源
#[derive(Debug, Default)]
pub struct GreetingResource {
    log: ComponentLog<GreetingResource>,
}

impl GreetingResource {
    fn greet(&self, request: &ResourceRequest) -> Result<Option<serde_json::Value>, infrastructure_common::BoxError> {
        let name = request.param("name").unwrap_or("world");
        self.log.debug(format!("greeting {name}"));
        Ok(Some(json!({ "greeting": format!("hello {name}") })))
    }
}

impl Component for GreetingResource {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .resource("greet", Method::Get, "/api/greeting", Self::greet)
    }
}

/// 示例应用配置
#[derive(Debug, Default)]
pub struct SiteConfig;

impl ApplicationConfig for SiteConfig {
    fn configure(&self, app: &Application) -> HandlerResult {
        app.serve_static("/assets", "public/assets");
        app.redirect_by_default_to("public", "index.html");
        Ok(())
    }
}

impl Component for SiteConfig {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().implements(|this: Arc<Self>| this as Arc<dyn ApplicationConfig>)
    }
}
