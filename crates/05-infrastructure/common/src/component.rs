//! 组件实例与依赖注入槽
//!
//! 组件实例在容器内部以类型擦除的形式保存，依赖通过 [`Inject`] 槽写入。

use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 处理器返回的装箱错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 初始化方法与插槽处理器的返回类型
pub type HandlerResult = Result<(), BoxError>;

/// 依赖注入槽
///
/// 组件以默认（空）状态构造，容器在依赖解析完成后写入一次。
/// 写入之后槽的内容不再变化。
pub struct Inject<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    /// 创建空的注入槽
    pub const fn empty() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 写入依赖，槽已被占用时返回 `false`
    pub fn inject(&self, value: Arc<T>) -> bool {
        self.cell.set(value).is_ok()
    }

    /// 获取已注入的依赖
    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    /// 是否已注入
    pub fn is_injected(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_inject_only_once() {
        let slot: Inject<dyn Greeter> = Inject::default();
        assert!(!slot.is_injected());
        assert!(slot.get().is_none());

        assert!(slot.inject(Arc::new(English)));
        assert!(!slot.inject(Arc::new(English)));
        assert_eq!(slot.get().map(|g| g.greet()), Some("hello".to_string()));
    }
}
