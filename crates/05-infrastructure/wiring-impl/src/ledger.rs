//! 条目账本与注册接口
//!
//! 注册调用只做本地校验，类型与签名的匹配推迟到组合阶段。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use wiring_abstractions::{
    erase_value, CombinerTable, DefineTarget, ErasedCallable, ErasedSlot, ErasedValue, Func,
    IntoCallable, Payload, Signature, Slot,
};
use wiring_common::{Origin, WiringConfig, WiringError, WiringResult};

/// 注册条目
pub(crate) struct Entry<P> {
    /// 条目名称
    pub(crate) name: String,
    /// 载荷
    pub(crate) payload: P,
    /// 注册位置
    pub(crate) origin: Origin,
}

/// 定义条目的载荷
pub(crate) struct DefinePayload {
    pub(crate) slot: Arc<dyn ErasedSlot>,
    pub(crate) target: Arc<dyn DefineTarget>,
    /// 组合后的函数是否同时作为提供值
    pub(crate) also_provide: bool,
}

pub(crate) type ProvideEntry = Entry<Arc<dyn ErasedValue>>;
pub(crate) type RequireEntry = Entry<Arc<dyn ErasedSlot>>;
pub(crate) type DefineEntry = Entry<DefinePayload>;
pub(crate) type ImplementationEntry = Entry<ErasedCallable>;

/// 装配账本
///
/// 保存待组合的提供、需求、定义与实现。注册与组合都需要 `&mut self`，
/// 一个账本在同一时刻只有一个写入者。
pub struct Ledger {
    pub(crate) provides: HashMap<String, ProvideEntry>,
    pub(crate) requires: HashMap<String, Vec<RequireEntry>>,
    pub(crate) defines: HashMap<String, DefineEntry>,
    pub(crate) implementations: HashMap<String, Vec<ImplementationEntry>>,
    pub(crate) combiners: CombinerTable,
    pub(crate) config: WiringConfig,
}

impl Ledger {
    /// 创建使用默认配置与内置合并器的账本
    pub fn new() -> Self {
        Self::with_config(WiringConfig::default())
    }

    /// 使用指定配置创建账本
    pub fn with_config(config: WiringConfig) -> Self {
        Self {
            provides: HashMap::new(),
            requires: HashMap::new(),
            defines: HashMap::new(),
            implementations: HashMap::new(),
            combiners: CombinerTable::new(),
            config,
        }
    }

    /// 替换合并器表
    pub fn with_combiners(mut self, combiners: CombinerTable) -> Self {
        self.combiners = combiners;
        self
    }

    /// 当前配置
    pub fn config(&self) -> &WiringConfig {
        &self.config
    }

    /// 合并器表
    pub fn combiners(&self) -> &CombinerTable {
        &self.combiners
    }

    /// 注册签名 `S` 的合并器，后注册者生效
    pub fn register_combiner<S, F>(&mut self, combiner: F) -> &mut Self
    where
        S: Signature + ?Sized,
        F: Fn(Vec<Func<S>>) -> Func<S> + Send + Sync + 'static,
    {
        self.combiners.register::<S, F>(combiner);
        self
    }

    #[track_caller]
    fn origin(&self) -> Origin {
        Origin::capture(self.config.trace_capture)
    }

    /// 提供一个值
    ///
    /// 同名提供已存在时返回 [`WiringError::DuplicateProvide`]。
    #[track_caller]
    pub fn provide<T>(&mut self, name: impl Into<String>, value: T) -> WiringResult<&mut Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.insert_provide(name.into(), erase_value(value))
    }

    /// 提供一个函数，值的类型为对应签名的 [`Func`]
    #[track_caller]
    pub fn provide_fn<M, F>(&mut self, name: impl Into<String>, f: F) -> WiringResult<&mut Self>
    where
        F: IntoCallable<M>,
    {
        self.insert_provide(name.into(), erase_value(f.into_func()))
    }

    #[track_caller]
    fn insert_provide(
        &mut self,
        name: String,
        value: Arc<dyn ErasedValue>,
    ) -> WiringResult<&mut Self> {
        let origin = self.origin();
        if let Some(existing) = self.provides.get(&name) {
            return Err(WiringError::DuplicateProvide {
                name,
                first: existing.origin.clone(),
                second: origin,
            });
        }

        debug!("注册提供: {} ({})", name, value.type_descriptor());
        self.provides.insert(
            name.clone(),
            Entry {
                name,
                payload: value,
                origin,
            },
        );
        Ok(self)
    }

    /// 需求一个值，组合时写入槽位
    #[track_caller]
    pub fn require<T>(&mut self, name: impl Into<String>, slot: &Slot<T>) -> WiringResult<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        self.require_payload(name, Payload::slot(slot))
    }

    /// 以动态载荷注册需求，载荷必须是槽位
    #[track_caller]
    pub fn require_payload(
        &mut self,
        name: impl Into<String>,
        payload: Payload,
    ) -> WiringResult<&mut Self> {
        let name = name.into();
        let origin = self.origin();
        let slot = match payload {
            Payload::Slot(slot) | Payload::FuncSlot { slot, .. } => slot,
            other => {
                return Err(WiringError::InvalidRequireTarget {
                    name,
                    actual: other.describe(),
                    origin,
                })
            }
        };

        debug!("注册需求: {} ({})", name, slot.target_type());
        self.requires.entry(name.clone()).or_default().push(Entry {
            name,
            payload: slot,
            origin,
        });
        Ok(self)
    }

    /// 定义一个函数，组合时由实现合并后写入槽位
    #[track_caller]
    pub fn define<S>(&mut self, name: impl Into<String>, slot: &Slot<Func<S>>) -> WiringResult<&mut Self>
    where
        S: Signature + ?Sized,
    {
        self.insert_define(name.into(), Payload::func_slot(slot), false)
    }

    /// 定义一个函数，并把组合后的函数作为同名提供值
    #[track_caller]
    pub fn define_provide<S>(
        &mut self,
        name: impl Into<String>,
        slot: &Slot<Func<S>>,
    ) -> WiringResult<&mut Self>
    where
        S: Signature + ?Sized,
    {
        self.insert_define(name.into(), Payload::func_slot(slot), true)
    }

    /// 以动态载荷注册定义，载荷必须是函数槽位
    #[track_caller]
    pub fn define_payload(
        &mut self,
        name: impl Into<String>,
        payload: Payload,
    ) -> WiringResult<&mut Self> {
        self.insert_define(name.into(), payload, false)
    }

    /// 以动态载荷注册定义并提供
    #[track_caller]
    pub fn define_provide_payload(
        &mut self,
        name: impl Into<String>,
        payload: Payload,
    ) -> WiringResult<&mut Self> {
        self.insert_define(name.into(), payload, true)
    }

    #[track_caller]
    fn insert_define(
        &mut self,
        name: String,
        payload: Payload,
        also_provide: bool,
    ) -> WiringResult<&mut Self> {
        let origin = self.origin();
        let (slot, target) = match payload {
            Payload::FuncSlot { slot, target } => (slot, target),
            other => {
                return Err(WiringError::InvalidDefineTarget {
                    name,
                    actual: other.describe(),
                    origin,
                })
            }
        };
        if let Some(existing) = self.defines.get(&name) {
            return Err(WiringError::DuplicateDefine {
                name,
                first: existing.origin.clone(),
                second: origin,
            });
        }

        debug!(
            "注册定义: {} ({}{})",
            name,
            target.signature(),
            if also_provide { ", 同时提供" } else { "" }
        );
        self.defines.insert(
            name.clone(),
            Entry {
                name,
                payload: DefinePayload {
                    slot,
                    target,
                    also_provide,
                },
                origin,
            },
        );
        Ok(self)
    }

    /// 为定义注册一个实现，同名实现按注册顺序调用
    #[track_caller]
    pub fn implement<M, F>(&mut self, name: impl Into<String>, f: F) -> WiringResult<&mut Self>
    where
        F: IntoCallable<M>,
    {
        self.implement_payload(name, Payload::callable(f))
    }

    /// [`Ledger::implement`] 的简写
    #[track_caller]
    pub fn impl_fn<M, F>(&mut self, name: impl Into<String>, f: F) -> WiringResult<&mut Self>
    where
        F: IntoCallable<M>,
    {
        self.implement_payload(name, Payload::callable(f))
    }

    /// 以动态载荷注册实现，载荷必须是函数
    #[track_caller]
    pub fn implement_payload(
        &mut self,
        name: impl Into<String>,
        payload: Payload,
    ) -> WiringResult<&mut Self> {
        let name = name.into();
        let origin = self.origin();
        let callable = match payload {
            Payload::Callable(callable) => callable,
            other => {
                return Err(WiringError::NotCallable {
                    name,
                    actual: other.describe(),
                    origin,
                })
            }
        };

        debug!("注册实现: {} ({})", name, callable.signature());
        self.implementations
            .entry(name.clone())
            .or_default()
            .push(Entry {
                name,
                payload: callable,
                origin,
            });
        Ok(self)
    }

    /// 尚未解析的条目名称
    pub fn pending(&self) -> PendingSummary {
        PendingSummary {
            provides: sorted_names(&self.provides),
            requires: sorted_names(&self.requires),
            defines: sorted_names(&self.defines),
            implementations: sorted_names(&self.implementations),
        }
    }

    /// 是否没有任何待解析条目
    pub fn is_empty(&self) -> bool {
        self.provides.is_empty()
            && self.requires.is_empty()
            && self.defines.is_empty()
            && self.implementations.is_empty()
    }
}

fn sorted_names<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut names: Vec<String> = map.keys().cloned().collect();
    names.sort();
    names
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("pending", &self.pending())
            .field("combiners", &self.combiners)
            .field("config", &self.config)
            .finish()
    }
}

/// 待解析条目的名称汇总，按名称排序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSummary {
    /// 待匹配的提供
    pub provides: Vec<String>,
    /// 待解析的需求
    pub requires: Vec<String>,
    /// 待解析的定义
    pub defines: Vec<String>,
    /// 尚无定义的实现
    pub implementations: Vec<String>,
}

impl PendingSummary {
    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.provides.is_empty()
            && self.requires.is_empty()
            && self.defines.is_empty()
            && self.implementations.is_empty()
    }
}
