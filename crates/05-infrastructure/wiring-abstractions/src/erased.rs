//! 类型擦除的载荷
//!
//! 注册表以擦除后的形式保存值、槽位与函数，组合时再按 `TypeId` 校验。

use crate::combiner::CombinerTable;
use crate::signature::{Func, IntoCallable, Signature};
use crate::slot::Slot;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use wiring_common::{FallbackPolicy, SignatureDescriptor, TypeDescriptor};

/// 擦除后的提供值
pub trait ErasedValue: Send + Sync {
    /// 值的具体类型
    fn type_descriptor(&self) -> TypeDescriptor;

    /// 复制一份值用于写入槽位
    fn clone_value(&self) -> Box<dyn Any + Send>;

    /// 以 `Any` 访问
    fn as_any(&self) -> &dyn Any;
}

struct StoredValue<T>(T);

impl<T> ErasedValue for StoredValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn clone_value(&self) -> Box<dyn Any + Send> {
        Box::new(self.0.clone())
    }

    fn as_any(&self) -> &dyn Any {
        &self.0
    }
}

/// 擦除一个值
pub fn erase_value<T>(value: T) -> Arc<dyn ErasedValue>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(StoredValue(value))
}

/// 擦除后的可写入槽位
pub trait ErasedSlot: Send + Sync {
    /// 槽位接受的类型
    fn target_type(&self) -> TypeDescriptor;

    /// 写入值，类型不符时返回 `false` 且不写入
    fn fill(&self, value: Box<dyn Any + Send>) -> bool;
}

impl<T> ErasedSlot for Slot<T>
where
    T: Send + Sync + 'static,
{
    fn target_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<T>()
    }

    fn fill(&self, value: Box<dyn Any + Send>) -> bool {
        match value.downcast::<T>() {
            Ok(value) => {
                self.set(*value);
                true
            }
            Err(_) => false,
        }
    }
}

/// 擦除后的函数
#[derive(Clone)]
pub struct ErasedCallable {
    signature: SignatureDescriptor,
    func: Arc<dyn ErasedValue>,
}

impl ErasedCallable {
    /// 擦除一个具体签名的函数
    pub fn new<S: Signature + ?Sized>(func: Func<S>) -> Self {
        Self {
            signature: S::descriptor(),
            func: erase_value(func),
        }
    }

    /// 函数签名
    pub fn signature(&self) -> &SignatureDescriptor {
        &self.signature
    }

    /// 还原为具体签名，签名不符时返回 `None`
    pub fn downcast<S: Signature + ?Sized>(&self) -> Option<Func<S>> {
        self.func.as_any().downcast_ref::<Func<S>>().cloned()
    }
}

impl fmt::Debug for ErasedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedCallable")
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// 定义的目标：函数类型的槽位
pub trait DefineTarget: Send + Sync {
    /// 槽位引用的签名
    fn signature(&self) -> SignatureDescriptor;

    /// 组合后函数作为提供值时的类型
    fn provided_type(&self) -> TypeDescriptor;

    /// 把实现合并为一个函数，不写入槽位
    ///
    /// 有注册的合并器时使用合并器，否则按回退策略使用通用扇出；
    /// 两者都不可用或实现签名不符时返回 `None`。
    fn combine(
        &self,
        impls: &[ErasedCallable],
        combiners: &CombinerTable,
        fallback: FallbackPolicy,
    ) -> Option<Arc<dyn ErasedValue>>;
}

impl<S: Signature + ?Sized> DefineTarget for Slot<Func<S>> {
    fn signature(&self) -> SignatureDescriptor {
        S::descriptor()
    }

    fn provided_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Func<S>>()
    }

    fn combine(
        &self,
        impls: &[ErasedCallable],
        combiners: &CombinerTable,
        fallback: FallbackPolicy,
    ) -> Option<Arc<dyn ErasedValue>> {
        let funcs = impls
            .iter()
            .map(ErasedCallable::downcast::<S>)
            .collect::<Option<Vec<_>>>()?;

        let combined = match combiners.find::<S>() {
            Some(combiner) => combiner(funcs),
            None if fallback.allows(S::descriptor().returns_unit) => S::fan_out(funcs)?,
            None => return None,
        };
        Some(erase_value(combined))
    }
}

/// 动态注册入口的载荷
#[derive(Clone)]
pub enum Payload {
    /// 普通值
    Value(Arc<dyn ErasedValue>),
    /// 可写入的槽位
    Slot(Arc<dyn ErasedSlot>),
    /// 函数类型的槽位，既可作为需求目标，也可作为定义目标
    FuncSlot {
        /// 作为需求目标时写入的槽位
        slot: Arc<dyn ErasedSlot>,
        /// 作为定义目标时的合并入口
        target: Arc<dyn DefineTarget>,
    },
    /// 函数
    Callable(ErasedCallable),
}

impl Payload {
    /// 值载荷
    pub fn value<T>(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::Value(erase_value(value))
    }

    /// 槽位载荷
    pub fn slot<T>(slot: &Slot<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::Slot(Arc::new(slot.clone()))
    }

    /// 函数槽位载荷
    pub fn func_slot<S: Signature + ?Sized>(slot: &Slot<Func<S>>) -> Self {
        Self::FuncSlot {
            slot: Arc::new(slot.clone()),
            target: Arc::new(slot.clone()),
        }
    }

    /// 函数载荷
    pub fn callable<M, F: IntoCallable<M>>(f: F) -> Self {
        Self::Callable(ErasedCallable::new::<F::Signature>(f.into_func()))
    }

    /// 用于错误信息的简短描述
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => format!("值 {}", value.type_descriptor()),
            Self::Slot(slot) => format!("槽位 {}", slot.target_type()),
            Self::FuncSlot { target, .. } => format!("函数槽位 {}", target.signature()),
            Self::Callable(callable) => format!("函数 {}", callable.signature()),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").field(&self.describe()).finish()
    }
}
