//! 服务容器端到端集成测试
use di_abstractions::{Component, ComponentDefinition, ExtenderDescriptor, ServiceConfiguration, ServiceRegistry};
use di_impl::DependencyManager;
use infrastructure_common::{HandlerResult, Inject};
use infrastructure_composition::{
    ComponentLog, ConsoleLogger, InfrastructureBuilder, Level, Logger, ShellCommandExt,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试组件
#[derive(Default)]
struct HelperService {
    log: ComponentLog<HelperService>,
    init_calls: AtomicUsize,
}

impl HelperService {
    fn say_something(&self) -> String {
        "well something".to_string()
    }
}

impl Component for HelperService {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .init("init", |this: &Self| {
                this.init_calls.fetch_add(1, Ordering::SeqCst);
                this.log.info("This is a message from the helper");
                Ok(())
            })
    }
}

#[derive(Default)]
struct ExampleTask {
    log: ComponentLog<ExampleTask>,
    helper_service: Inject<HelperService>,
    init_calls: AtomicUsize,
}

impl Component for ExampleTask {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .depends_on("helper_service", |this: &Self| &this.helper_service)
            .init("init", |this: &Self| {
                this.init_calls.fetch_add(1, Ordering::SeqCst);
                let helper = this.helper_service.get().ok_or("helper_service missing")?;
                this.log.debug(format!("Message from helper: {}", helper.say_something()));
                Ok(())
            })
    }
}

type TestFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct PointTest {
    invocations: AtomicUsize,
}

impl Component for PointTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().extension_point(
            "test",
            "add_extension",
            |this: &Self, extender: &ExtenderDescriptor| -> HandlerResult {
                (extender.callable::<TestFn>()?)();
                this.invocations.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
    }
}

#[derive(Default)]
struct FirstTest {
    calls: Arc<AtomicUsize>,
}

impl Component for FirstTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().extender("test", "do_something", json!({}), |this: Arc<Self>| -> TestFn {
            let calls = this.calls.clone();
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        })
    }
}

#[derive(Default)]
struct AnotherTest {
    calls: Arc<AtomicUsize>,
}

impl Component for AnotherTest {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().extender("test", "do_something", json!({}), |this: Arc<Self>| -> TestFn {
            let calls = this.calls.clone();
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        })
    }
}

#[derive(Default)]
struct Counter {
    count: AtomicUsize,
}

impl Component for Counter {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new().shell_command("increment", "count up", "计数加一", |this: &Self, request, response| {
            let step = request
                .args
                .first()
                .and_then(|arg| arg.parse::<usize>().ok())
                .unwrap_or(1);
            let value = this.count.fetch_add(step, Ordering::SeqCst) + step;
            response.line(value.to_string());
        })
    }
}

#[test]
fn test_logger_helper_task_scenario() -> anyhow::Result<()> {
    let mut container = DependencyManager::new();

    container.register::<ConsoleLogger>(ServiceConfiguration::default())?;
    let task_sid = container.register::<ExampleTask>(ServiceConfiguration::default())?;
    assert_eq!(container.pending().len(), 1);
    assert_eq!(container.pending()[0].sid, task_sid);

    container.register::<HelperService>(ServiceConfiguration::default())?;
    assert!(container.pending().is_empty());

    let helper = container.get::<HelperService>("HelperService")?;
    let task = container.get::<ExampleTask>("ExampleTask")?;
    assert_eq!(helper.init_calls.load(Ordering::SeqCst), 1);
    assert_eq!(task.init_calls.load(Ordering::SeqCst), 1);

    let logger = container.get::<ConsoleLogger>("ConsoleLogger")?;
    let lines = logger.lines();
    let helper_line = lines
        .iter()
        .position(|line| line.ends_with("HelperService\t| This is a message from the helper"))
        .expect("helper should log during init");
    let task_line = lines
        .iter()
        .position(|line| line.ends_with("ExampleTask\t| Message from helper: well something"))
        .expect("task should log during init");
    assert!(helper_line < task_line);
    Ok(())
}

#[test]
fn test_logger_registered_last_resolves_everything() -> anyhow::Result<()> {
    let mut container = DependencyManager::new();
    container.register::<ExampleTask>(ServiceConfiguration::default())?;
    container.register::<HelperService>(ServiceConfiguration::default())?;
    assert_eq!(container.stats().pending_components, 2);

    container.register::<ConsoleLogger>(ServiceConfiguration::default())?;
    assert_eq!(container.stats().pending_components, 0);

    let logger = container.get::<dyn Logger>("Logger")?;
    logger.log(Level::Warn, "all wired");
    assert_eq!(container.get::<ExampleTask>("ExampleTask")?.init_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_extension_fan_out_scenario() -> anyhow::Result<()> {
    for point_first in [true, false] {
        let mut container = DependencyManager::new();
        if point_first {
            container.register::<PointTest>(ServiceConfiguration::default())?;
        }
        container.register::<FirstTest>(ServiceConfiguration::default())?;
        container.register::<AnotherTest>(ServiceConfiguration::default())?;
        if !point_first {
            container.register::<PointTest>(ServiceConfiguration::default())?;
        }

        let point = container.get::<PointTest>("PointTest")?;
        assert_eq!(point.invocations.load(Ordering::SeqCst), 2);
        let first = container.get::<FirstTest>("FirstTest")?;
        let another = container.get::<AnotherTest>("AnotherTest")?;
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(another.calls.load(Ordering::SeqCst), 1);
    }
    Ok(())
}

#[test]
fn test_shell_over_bootstrapped_infrastructure() -> anyhow::Result<()> {
    let mut infrastructure = InfrastructureBuilder::new().without_env().build()?;
    infrastructure.register::<Counter>()?;
    infrastructure.register::<ExampleTask>()?;

    let shell = infrastructure.shell()?;
    assert_eq!(shell.execute("count up").texts(), vec!["1"]);
    assert_eq!(shell.execute("count up 5").texts(), vec!["6"]);

    let wtf = shell.execute("dm wtf");
    assert_eq!(wtf.texts().len(), 1);
    assert!(wtf.texts()[0].starts_with("ExampleTask#"));
    assert!(wtf.texts()[0].ends_with("HelperService"));

    infrastructure.register::<HelperService>()?;
    assert_eq!(shell.execute("dm wtf").texts(), vec!["所有组件均已解析"]);

    let dm = shell.execute("dm");
    assert_eq!(dm.lines().len(), infrastructure.container().len());
    Ok(())
}
