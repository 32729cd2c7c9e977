//! 签名合并器表
//!
//! 以签名的函数对象类型为键，保存把多个同签名函数合并为一个函数的策略。

use crate::signature::{Func, Signature};
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use wiring_common::SignatureDescriptor;

/// 合并器：接收按注册顺序排列的实现，返回一个同签名的函数
pub type Combiner<S> = Arc<dyn Fn(Vec<Func<S>>) -> Func<S> + Send + Sync>;

#[derive(Clone)]
struct CombinerRegistration {
    signature: SignatureDescriptor,
    /// 实际类型为 `Combiner<S>`
    combiner: Arc<dyn Any + Send + Sync>,
}

/// 合并器表
///
/// 由注册表持有，组合前由启动代码扩展。同一签名后注册者生效。
#[derive(Clone)]
pub struct CombinerTable {
    combiners: HashMap<TypeId, CombinerRegistration>,
}

static BUILTIN_COMBINERS: Lazy<CombinerTable> = Lazy::new(|| {
    let mut table = CombinerTable::empty();
    table.register::<dyn Fn() + Send + Sync, _>(|impls| {
        let combined: Func<dyn Fn() + Send + Sync> = Arc::new(move || {
            for f in &impls {
                f();
            }
        });
        combined
    });

    macro_rules! register_unary {
        ($($ty:ty),*) => {
            $(
                table.register::<dyn Fn($ty) + Send + Sync, _>(|impls| {
                    let combined: Func<dyn Fn($ty) + Send + Sync> = Arc::new(move |value: $ty| {
                        for f in &impls {
                            f(value.clone());
                        }
                    });
                    combined
                });
            )*
        };
    }

    register_unary!(i32, i64, u32, u64, usize, bool, String);
    table
});

impl CombinerTable {
    /// 创建包含内置合并器的表
    ///
    /// 内置合并器覆盖 `fn()` 以及参数为 `i32`、`i64`、`u32`、`u64`、`usize`、
    /// `bool`、`String` 的单参数无返回值签名。
    pub fn new() -> Self {
        BUILTIN_COMBINERS.clone()
    }

    /// 创建空表
    pub fn empty() -> Self {
        Self {
            combiners: HashMap::new(),
        }
    }

    /// 注册签名 `S` 的合并器，返回是否替换了已有合并器
    pub fn register<S, F>(&mut self, combiner: F) -> bool
    where
        S: Signature + ?Sized,
        F: Fn(Vec<Func<S>>) -> Func<S> + Send + Sync + 'static,
    {
        let signature = S::descriptor();
        debug!("注册合并器: {}", signature);

        let combiner: Combiner<S> = Arc::new(combiner);
        let registration = CombinerRegistration {
            signature,
            combiner: Arc::new(combiner),
        };
        self.combiners
            .insert(TypeId::of::<S>(), registration)
            .is_some()
    }

    /// 并入另一张表中本表没有的合并器，同一签名保留本表的合并器
    ///
    /// 返回新增的合并器数量。
    pub fn extend_missing(&mut self, other: CombinerTable) -> usize {
        let mut added = 0;
        for (id, registration) in other.combiners {
            if let Entry::Vacant(slot) = self.combiners.entry(id) {
                debug!("并入合并器: {}", registration.signature);
                slot.insert(registration);
                added += 1;
            }
        }
        added
    }

    /// 查找签名 `S` 的合并器
    pub fn find<S: Signature + ?Sized>(&self) -> Option<Combiner<S>> {
        self.combiners
            .get(&TypeId::of::<S>())
            .and_then(|registration| registration.combiner.downcast_ref::<Combiner<S>>())
            .cloned()
    }

    /// 是否注册了签名 `S` 的合并器
    pub fn contains<S: Signature + ?Sized>(&self) -> bool {
        self.combiners.contains_key(&TypeId::of::<S>())
    }

    /// 已注册的签名
    pub fn signatures(&self) -> Vec<SignatureDescriptor> {
        self.combiners
            .values()
            .map(|registration| registration.signature.clone())
            .collect()
    }

    /// 已注册的合并器数量
    pub fn len(&self) -> usize {
        self.combiners.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.combiners.is_empty()
    }
}

impl Default for CombinerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CombinerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut signatures: Vec<String> = self
            .combiners
            .values()
            .map(|registration| registration.signature.to_string())
            .collect();
        signatures.sort();
        f.debug_struct("CombinerTable")
            .field("signatures", &signatures)
            .finish()
    }
}
