//! 依赖诊断命令

use crate::shell::{ShellCommandExt, ShellRequest, ShellResponse};
use di_abstractions::{Component, ComponentDefinition, RegistryInspector};
use serde_json::json;

/// 依赖诊断命令组件
///
/// 通过 [`RegistryInspector`] 读取注册表状态，须以 `register_instance` 注册。
#[derive(Debug, Clone)]
pub struct DependencyCommands {
    inspector: RegistryInspector,
}

impl DependencyCommands {
    pub fn new(inspector: RegistryInspector) -> Self {
        Self { inspector }
    }

    fn show_dependencies(&self, _request: &ShellRequest, response: &mut ShellResponse) {
        for summary in self.inspector.summaries() {
            let entry = json!({
                "sid": summary.sid,
                "type": summary.type_name,
                "resolved": summary.resolved,
            });
            response.highlight(serde_json::to_string_pretty(&entry).unwrap_or_else(|_| entry.to_string()));
        }
    }

    fn services_by_type(&self, _request: &ShellRequest, response: &mut ShellResponse) {
        response.highlight(json!(self.inspector.type_names()).to_string());
    }

    fn explain_pending(&self, _request: &ShellRequest, response: &mut ShellResponse) {
        let pending = self.inspector.pending();
        if pending.is_empty() {
            response.line("所有组件均已解析");
            return;
        }
        for summary in pending {
            response.warn(format!(
                "{}#{} 等待 {} 个依赖: {}",
                summary.type_name,
                summary.sid,
                summary.unsatisfied_count,
                summary.waiting_for.join(", ")
            ));
        }
    }
}

impl Component for DependencyCommands {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .shell_command("show_dependencies", "dm", "显示全部组件的依赖概况", Self::show_dependencies)
            .shell_command("services_by_type", "dm by type", "显示已索引的类型名称", Self::services_by_type)
            .shell_command("explain_pending", "dm wtf", "显示未解析组件及其缺失的依赖", Self::explain_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellHandler;
    use crate::logger::ConsoleLogger;
    use di_abstractions::{ServiceConfiguration, ServiceRegistry};
    use di_impl::DependencyManager;
    use infrastructure_common::Inject;

    #[derive(Default)]
    struct Orphan {
        missing: Inject<ShellResponse>,
    }

    impl Component for Orphan {
        fn definition() -> ComponentDefinition<Self> {
            ComponentDefinition::new().depends_on_named("Missing", "missing", |this: &Self| &this.missing)
        }
    }

    fn container() -> (DependencyManager, std::sync::Arc<ShellHandler>) {
        let mut container = DependencyManager::new();
        container.register::<ConsoleLogger>(ServiceConfiguration::default()).unwrap();
        container.register::<ShellHandler>(ServiceConfiguration::default()).unwrap();
        let commands = DependencyCommands::new(container.inspector());
        container.register_instance(commands, ServiceConfiguration::default()).unwrap();
        let shell = container.get::<ShellHandler>("ShellHandler").unwrap();
        (container, shell)
    }

    #[test]
    fn test_dm_lists_every_descriptor() {
        let (_container, shell) = container();
        let response = shell.execute("dm");
        assert_eq!(response.lines().len(), 3);
        let first: serde_json::Value = serde_json::from_str(response.texts()[0]).unwrap();
        assert_eq!(first, json!({ "sid": 0, "type": "ConsoleLogger", "resolved": true }));
    }

    #[test]
    fn test_dm_by_type() {
        let (_container, shell) = container();
        let response = shell.execute("dm by type");
        let names: Vec<String> = serde_json::from_str(response.texts()[0]).unwrap();
        assert!(names.contains(&"Logger".to_string()));
        assert!(names.contains(&"DependencyCommands".to_string()));
    }

    #[test]
    fn test_dm_wtf_reports_missing_dependencies() {
        let (mut container, shell) = container();
        assert_eq!(shell.execute("dm wtf").texts(), vec!["所有组件均已解析"]);

        container.register::<Orphan>(ServiceConfiguration::default()).unwrap();
        let response = shell.execute("dm wtf");
        assert_eq!(response.texts(), vec!["Orphan#3 等待 1 个依赖: Missing"]);
    }
}
