//! 注入槽
//!
//! bean 以 `Arc` 共享后才进行注入，被注入的字段需要内部可变性。

use parking_lot::RwLock;
use std::fmt;

/// 可在共享引用下写入的注入槽
pub struct Slot<T> {
    value: RwLock<Option<T>>,
}

impl<T: Clone> Slot<T> {
    /// 创建空的注入槽
    pub fn empty() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// 写入值，覆盖已有值
    pub fn set(&self, value: T) {
        *self.value.write() = Some(value);
    }

    /// 读取值的副本
    pub fn get(&self) -> Option<T> {
        self.value.read().clone()
    }

    /// 是否已写入
    pub fn is_set(&self) -> bool {
        self.value.read().is_some()
    }

    /// 借用值执行闭包
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.value.read().as_ref())
    }
}

impl<T: Clone> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.value.read()).finish()
    }
}
