//! 解析引擎
//!
//! 1. 尝试满足服务尚未满足的依赖，只注入已经完全解析的组件；
//! 2. 依赖全部满足后运行一次初始化方法；
//! 3. 连接扩展插槽，重放已登记的同名扩展器或扩展点；
//! 4. 沿对外可见的类型名称级联解析正在等待的组件。

use crate::DependencyManager;
use di_abstractions::{ExtenderDescriptor, ExtensionPointDescriptor, ResolveContext, SlotSpec};
use infrastructure_common::{DependencyError, DependencyResult};
use tracing::{debug, trace};

impl DependencyManager {
    /// 解析指定服务，并级联解析等待它的服务
    pub(crate) fn resolve(&mut self, sid: usize, ctx: &mut ResolveContext) -> DependencyResult<()> {
        if self.services_by_id[sid].unsatisfied_count > 0 {
            self.satisfy_dependencies(sid)?;
        }

        let descriptor = &self.services_by_id[sid];
        if !descriptor.is_resolved() || descriptor.resolved {
            return Ok(());
        }
        self.services_by_id[sid].resolved = true;
        self.inspector.publish(self.summarize(sid));
        debug!(sid, type_name = %self.services_by_id[sid].type_name, "组件已解析");

        self.run_initializer(sid)?;
        self.connect_slots(sid)?;
        self.cascade(sid, ctx)
    }

    /// 注入已经可用的依赖
    fn satisfy_dependencies(&mut self, sid: usize) -> DependencyResult<()> {
        let pending: Vec<(usize, String, usize)> = self
            .index
            .outbound(sid)
            .iter()
            .enumerate()
            .filter(|(_, dependency)| !dependency.satisfied)
            .map(|(position, dependency)| (position, dependency.type_name.clone(), dependency.slot))
            .collect();

        for (position, type_name, slot) in pending {
            let Some(&provider_sid) = self.services_by_type.get(&type_name) else {
                trace!(sid, type_name = %type_name, "依赖尚未注册");
                continue;
            };
            let provider = &self.services_by_id[provider_sid];
            if !provider.is_resolved() {
                trace!(sid, provider_sid, type_name = %type_name, "依赖尚未解析");
                continue;
            }
            let view = provider
                .view_for(&type_name)
                .cloned()
                .ok_or_else(|| DependencyError::ComponentNotFound {
                    type_name: type_name.clone(),
                })?;

            let target = &self.services_by_id[sid];
            let dependency = &target.blueprint.dependencies[slot];
            let (inject, field_name) = (dependency.inject.clone(), dependency.field_name);
            let instance = target.instance.clone();
            inject(&instance, &view)?;

            if self.index.satisfy(sid, position) {
                self.services_by_id[sid].unsatisfied_count -= 1;
            }
            debug!(
                sid,
                provider_sid,
                type_name = %type_name,
                field = field_name,
                "依赖已注入"
            );
        }

        self.inspector.publish(self.summarize(sid));
        Ok(())
    }

    fn run_initializer(&self, sid: usize) -> DependencyResult<()> {
        let descriptor = &self.services_by_id[sid];
        let Some(initializer) = descriptor.blueprint.initializer.as_ref() else {
            return Ok(());
        };
        trace!(sid, method = initializer.method_name, "运行初始化方法");
        (initializer.run)(&descriptor.instance).map_err(|source| DependencyError::InitializerFailed {
            component: descriptor.type_name.clone(),
            method: initializer.method_name.to_string(),
            source,
        })
    }

    /// 登记并连接组件声明的扩展插槽
    fn connect_slots(&mut self, sid: usize) -> DependencyResult<()> {
        let descriptor = &self.services_by_id[sid];
        let blueprint = descriptor.blueprint.clone();
        let instance = descriptor.instance.clone();
        let type_name = descriptor.type_name.clone();

        for slot in &blueprint.slots {
            match slot {
                SlotSpec::ExtensionPoint {
                    name,
                    method_name,
                    handler,
                } => {
                    let point = ExtensionPointDescriptor {
                        name: name.clone(),
                        service_id: sid,
                        type_name: type_name.clone(),
                        method_name: *method_name,
                        instance: instance.clone(),
                        handler: handler.clone(),
                    };
                    self.bus.add_extension_point(point.clone());
                    self.inspector.record_extension_point();
                    debug!(sid, slot = %name, method = *method_name, "登记扩展点");

                    let extenders = self.bus.extenders(name).to_vec();
                    for extender in &extenders {
                        invoke(&point, extender)?;
                    }
                }
                SlotSpec::Extender {
                    name,
                    method_name,
                    config,
                    bind,
                } => {
                    let extender = ExtenderDescriptor {
                        name: name.clone(),
                        service_id: sid,
                        type_name: type_name.clone(),
                        method_name: *method_name,
                        config: config.clone(),
                        instance: instance.clone(),
                        callable: bind(&instance)?,
                    };
                    self.bus.add_extender(extender.clone());
                    self.inspector.record_extender();
                    debug!(sid, slot = %name, method = *method_name, "登记扩展器");

                    let points = self.bus.extension_points(name).to_vec();
                    for point in &points {
                        invoke(point, &extender)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// 级联解析等待本组件对外类型名称的服务
    fn cascade(&mut self, sid: usize, ctx: &mut ResolveContext) -> DependencyResult<()> {
        let interface_name = self.services_by_id[sid].interface_name().to_string();
        let waiting = self.index.inbound(&interface_name).to_vec();

        for edge in waiting {
            if !ctx.visit(edge.clone()) {
                continue;
            }
            trace!(
                sid,
                depending_sid = edge.depending_sid,
                type_name = %interface_name,
                "级联解析"
            );
            self.resolve(edge.depending_sid, ctx)?;
        }
        Ok(())
    }
}

fn invoke(point: &ExtensionPointDescriptor, extender: &ExtenderDescriptor) -> DependencyResult<()> {
    trace!(
        slot = %point.name,
        point = point.method_name,
        extender = extender.method_name,
        extender_sid = extender.service_id,
        "调用扩展点"
    );
    (point.handler)(&point.instance, extender).map_err(|source| {
        DependencyError::SlotHandlerFailed {
            slot: point.name.clone(),
            component: point.type_name.clone(),
            method: point.method_name.to_string(),
            source,
        }
    })
}
