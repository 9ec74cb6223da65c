//! 组件声明
//!
//! 每个组件类型通过 [`Component::definition`] 返回一份静态声明：
//! 自身类型名称、实现的抽象类型、依赖槽、初始化方法以及扩展插槽。
//! 容器只与类型擦除后的 [`ComponentBlueprint`] 打交道。

use crate::descriptor::ExtenderDescriptor;
use infrastructure_common::{
    type_name_of, BoxError, DependencyError, DependencyResult, HandlerResult, Inject, Instance,
};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 组件 trait
///
/// 所有可注册到容器的组件都必须实现此 trait。
pub trait Component: Send + Sync + 'static {
    /// 组件声明
    fn definition() -> ComponentDefinition<Self>
    where
        Self: Sized,
    {
        ComponentDefinition::new()
    }
}

/// 将组件实例转换为某个类型名称下的提供视图
pub type ViewFn = Arc<dyn Fn(&Instance) -> DependencyResult<Instance> + Send + Sync>;

/// 把已解析的依赖写入组件字段，参数依次为目标组件实例和依赖视图
pub type InjectFn = Arc<dyn Fn(&Instance, &Instance) -> DependencyResult<()> + Send + Sync>;

/// 初始化方法
pub type InitFn = Arc<dyn Fn(&Instance) -> HandlerResult + Send + Sync>;

/// 扩展点处理器，参数依次为扩展点所属组件实例和扩展器描述符
pub type ExtensionPointFn = Arc<dyn Fn(&Instance, &ExtenderDescriptor) -> HandlerResult + Send + Sync>;

/// 将扩展器所属组件绑定为可调用对象
pub type BindFn = Arc<dyn Fn(&Instance) -> DependencyResult<Instance> + Send + Sync>;

/// 抽象类型声明
#[derive(Clone)]
pub struct ExportSpec {
    /// 抽象类型名称
    pub type_name: String,
    /// 视图构造函数
    pub view: ViewFn,
}

/// 依赖声明
#[derive(Clone)]
pub struct DependencySpec {
    /// 所需类型名称
    pub type_name: String,
    /// 目标字段名称
    pub field_name: &'static str,
    /// 注入函数
    pub inject: InjectFn,
}

/// 初始化方法声明
#[derive(Clone)]
pub struct InitializerSpec {
    pub method_name: &'static str,
    pub run: InitFn,
}

/// 插槽声明
#[derive(Clone)]
pub enum SlotSpec {
    /// 扩展点：接收任意数量同名扩展器的调用
    ExtensionPoint {
        name: String,
        method_name: &'static str,
        handler: ExtensionPointFn,
    },
    /// 扩展器：调用同名扩展点
    Extender {
        name: String,
        method_name: &'static str,
        config: serde_json::Value,
        bind: BindFn,
    },
}

impl SlotSpec {
    /// 插槽名称
    pub fn name(&self) -> &str {
        match self {
            SlotSpec::ExtensionPoint { name, .. } | SlotSpec::Extender { name, .. } => name,
        }
    }
}

/// 类型擦除后的组件声明
#[derive(Clone)]
pub struct ComponentBlueprint {
    /// 组件自身类型名称
    pub type_name: String,
    /// 实现的抽象类型，按声明顺序
    pub implements: Vec<ExportSpec>,
    /// 依赖列表，按声明顺序
    pub dependencies: Vec<DependencySpec>,
    /// 初始化方法
    pub initializer: Option<InitializerSpec>,
    /// 插槽列表，按声明顺序
    pub slots: Vec<SlotSpec>,
}

impl fmt::Debug for ComponentBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentBlueprint")
            .field("type_name", &self.type_name)
            .field(
                "implements",
                &self.implements.iter().map(|e| &e.type_name).collect::<Vec<_>>(),
            )
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|d| (d.field_name, &d.type_name))
                    .collect::<Vec<_>>(),
            )
            .field(
                "initializer",
                &self.initializer.as_ref().map(|i| i.method_name),
            )
            .field(
                "slots",
                &self.slots.iter().map(SlotSpec::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 组件声明构建器
///
/// ```rust,ignore
/// impl Component for ExampleTask {
///     fn definition() -> ComponentDefinition<Self> {
///         ComponentDefinition::new()
///             .depends_on("helper_service", |this: &Self| &this.helper_service)
///             .init("init", Self::init)
///     }
/// }
/// ```
pub struct ComponentDefinition<T: Component> {
    blueprint: ComponentBlueprint,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentDefinition<T> {
    /// 创建新的组件声明，类型名称取自 `T` 的短名称
    pub fn new() -> Self {
        Self {
            blueprint: ComponentBlueprint {
                type_name: type_name_of::<T>(),
                implements: Vec::new(),
                dependencies: Vec::new(),
                initializer: None,
                slots: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// 覆盖组件自身的类型名称
    pub fn named(mut self, type_name: impl Into<String>) -> Self {
        self.blueprint.type_name = type_name.into();
        self
    }

    /// 声明实现的抽象类型，名称取自 `I` 的短名称
    pub fn implements<I, F>(self, upcast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        self.implements_named(type_name_of::<I>(), upcast)
    }

    /// 以指定名称声明实现的抽象类型
    pub fn implements_named<I, F>(mut self, type_name: impl Into<String>, upcast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let component = self.blueprint.type_name.clone();
        let expected = type_name.clone();
        let view: ViewFn = Arc::new(move |instance: &Instance| {
            let typed = instance.clone().downcast::<T>().map_err(|_| {
                DependencyError::InjectionTypeMismatch {
                    component: component.clone(),
                    field: "<self>".to_string(),
                    expected: expected.clone(),
                }
            })?;
            Ok(provided(upcast(typed)))
        });
        self.blueprint.implements.push(ExportSpec { type_name, view });
        self
    }

    /// 声明依赖，所需类型名称取自 `D` 的短名称
    pub fn depends_on<D, F>(self, field_name: &'static str, slot: F) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> &Inject<D> + Send + Sync + 'static,
    {
        self.depends_on_named(type_name_of::<D>(), field_name, slot)
    }

    /// 以指定类型名称声明依赖
    pub fn depends_on_named<D, F>(
        mut self,
        type_name: impl Into<String>,
        field_name: &'static str,
        slot: F,
    ) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
        F: Fn(&T) -> &Inject<D> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        let component = self.blueprint.type_name.clone();
        let expected = type_name.clone();
        let inject: InjectFn = Arc::new(move |target: &Instance, dependency: &Instance| {
            let mismatch = || DependencyError::InjectionTypeMismatch {
                component: component.clone(),
                field: field_name.to_string(),
                expected: expected.clone(),
            };
            let target = target.downcast_ref::<T>().ok_or_else(mismatch)?;
            let dependency = dependency
                .downcast_ref::<Arc<D>>()
                .cloned()
                .ok_or_else(mismatch)?;
            if slot(target).inject(dependency) {
                Ok(())
            } else {
                Err(DependencyError::SlotAlreadyInjected {
                    component: component.clone(),
                    field: field_name.to_string(),
                })
            }
        });
        self.blueprint.dependencies.push(DependencySpec {
            type_name,
            field_name,
            inject,
        });
        self
    }

    /// 声明初始化方法，后声明的覆盖先声明的
    pub fn init<F>(mut self, method_name: &'static str, run: F) -> Self
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        let run: InitFn = Arc::new(move |instance: &Instance| {
            let target = instance.downcast_ref::<T>().ok_or_else(|| {
                Box::new(DependencyError::ComponentNotFound {
                    type_name: type_name_of::<T>(),
                }) as BoxError
            })?;
            run(target)
        });
        self.blueprint.initializer = Some(InitializerSpec { method_name, run });
        self
    }

    /// 声明扩展点
    pub fn extension_point<F>(
        mut self,
        name: impl Into<String>,
        method_name: &'static str,
        handler: F,
    ) -> Self
    where
        F: Fn(&T, &ExtenderDescriptor) -> HandlerResult + Send + Sync + 'static,
    {
        let handler: ExtensionPointFn =
            Arc::new(move |instance: &Instance, extender: &ExtenderDescriptor| {
                let target = instance.downcast_ref::<T>().ok_or_else(|| {
                    Box::new(DependencyError::ComponentNotFound {
                        type_name: type_name_of::<T>(),
                    }) as BoxError
                })?;
                handler(target, extender)
            });
        self.blueprint.slots.push(SlotSpec::ExtensionPoint {
            name: name.into(),
            method_name,
            handler,
        });
        self
    }

    /// 声明扩展器
    ///
    /// `bind` 在组件解析后调用一次，返回的可调用对象交给同名扩展点。
    pub fn extender<C, F>(
        mut self,
        name: impl Into<String>,
        method_name: &'static str,
        config: serde_json::Value,
        bind: F,
    ) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<T>) -> C + Send + Sync + 'static,
    {
        let component = self.blueprint.type_name.clone();
        let bind: BindFn = Arc::new(move |instance: &Instance| {
            let typed = instance.clone().downcast::<T>().map_err(|_| {
                DependencyError::InjectionTypeMismatch {
                    component: component.clone(),
                    field: method_name.to_string(),
                    expected: type_name_of::<T>(),
                }
            })?;
            Ok(Arc::new(bind(typed)) as Instance)
        });
        self.blueprint.slots.push(SlotSpec::Extender {
            name: name.into(),
            method_name,
            config,
            bind,
        });
        self
    }

    /// 组件自身类型名称
    pub fn type_name(&self) -> &str {
        &self.blueprint.type_name
    }

    /// 完成声明
    pub fn into_blueprint(self) -> ComponentBlueprint {
        self.blueprint
    }
}

impl<T: Component> Default for ComponentDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 将 `Arc<X>` 包装为依赖视图
///
/// 视图统一保存为 `Arc<Arc<X>>`，注入时按 `Arc<X>` 取回，`X` 可以是 trait 对象。
pub fn provided<X: ?Sized + Send + Sync + 'static>(value: Arc<X>) -> Instance {
    Arc::new(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Parrot;

    impl Speaker for Parrot {
        fn speak(&self) -> &'static str {
            "hello"
        }
    }

    impl Component for Parrot {
        fn definition() -> ComponentDefinition<Self> {
            ComponentDefinition::new().implements(|this: Arc<Self>| this as Arc<dyn Speaker>)
        }
    }

    #[derive(Default)]
    struct Listener {
        speaker: Inject<dyn Speaker>,
    }

    impl Component for Listener {
        fn definition() -> ComponentDefinition<Self> {
            ComponentDefinition::new()
                .depends_on("speaker", |this: &Self| &this.speaker)
                .init("init", |_this: &Self| Ok(()))
        }
    }

    #[test]
    fn test_blueprint_names() {
        let parrot = Parrot::definition().into_blueprint();
        assert_eq!(parrot.type_name, "Parrot");
        assert_eq!(parrot.implements[0].type_name, "Speaker");

        let listener = Listener::definition().into_blueprint();
        assert_eq!(listener.dependencies[0].type_name, "Speaker");
        assert_eq!(listener.dependencies[0].field_name, "speaker");
        assert_eq!(listener.initializer.map(|i| i.method_name), Some("init"));
    }

    #[test]
    fn test_view_is_injectable() {
        let parrot: Instance = Arc::new(Parrot);
        let blueprint = Parrot::definition().into_blueprint();
        let view = (blueprint.implements[0].view)(&parrot).unwrap();

        let listener: Instance = Arc::new(Listener::default());
        let inject = Listener::definition().into_blueprint().dependencies[0]
            .inject
            .clone();
        inject(&listener, &view).unwrap();

        let listener = listener.downcast_ref::<Listener>().unwrap();
        assert_eq!(listener.speaker.get().unwrap().speak(), "hello");
    }

    #[test]
    fn test_wrong_view_is_rejected() {
        let listener: Instance = Arc::new(Listener::default());
        let inject = Listener::definition().into_blueprint().dependencies[0]
            .inject
            .clone();
        let wrong = provided(Arc::new(42_u32));
        assert!(matches!(
            inject(&listener, &wrong),
            Err(DependencyError::InjectionTypeMismatch { .. })
        ));
    }
}
