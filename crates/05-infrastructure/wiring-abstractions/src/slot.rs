//! 槽位
//!
//! 调用方持有槽位的一个句柄，注册表持有另一个，在组合时写入。

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// 共享槽位
///
/// 克隆得到的是同一个槽位的新句柄。
pub struct Slot<T> {
    inner: Arc<RwLock<Option<T>>>,
}

impl<T> Slot<T> {
    /// 创建空槽位
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// 是否已写入
    pub fn is_filled(&self) -> bool {
        self.inner.read().is_some()
    }

    /// 写入值，覆盖旧值
    pub fn set(&self, value: T) {
        *self.inner.write() = Some(value);
    }

    /// 取出值，槽位变为空
    pub fn take(&self) -> Option<T> {
        self.inner.write().take()
    }

    /// 以引用访问槽位中的值
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.inner.read().as_ref().map(f)
    }

    /// 两个句柄是否指向同一个槽位
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Slot<T> {
    /// 读取值的副本
    pub fn get(&self) -> Option<T> {
        self.inner.read().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("type", &std::any::type_name::<T>())
            .field("filled", &self.is_filled())
            .finish()
    }
}
