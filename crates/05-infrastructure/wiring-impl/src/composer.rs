//! 组合器
//!
//! 一次组合分两个阶段：定义与实现的解析，然后提供与需求的匹配。
//! 所有校验先于任何写入完成，失败时账本与槽位保持不变。

use crate::ledger::{Entry, Ledger};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wiring_abstractions::{ErasedCallable, ErasedValue};
use wiring_common::{Origin, TypeDescriptor, WiringError, WiringResult};

/// 一次组合的结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositionReport {
    /// 解析的定义数
    pub defines_resolved: usize,
    /// 由定义转为提供的数量
    pub provides_promoted: usize,
    /// 与需求匹配并移除的提供数
    pub provides_matched: usize,
    /// 写入的需求槽位数
    pub slots_filled: usize,
    /// 仍待匹配的提供数
    pub pending_provides: usize,
    /// 仍待定义的实现数
    pub pending_implementations: usize,
}

/// 已合并但尚未写入的定义
struct ResolvedDefine {
    name: String,
    value: Arc<dyn ErasedValue>,
}

impl Ledger {
    /// 组合当前账本中的全部条目
    ///
    /// 成功时已解析的名称从账本移除；没有需求的提供与没有定义的实现
    /// 保留到下一次组合。任何需求找不到提供时返回
    /// [`WiringError::Unresolved`]。
    pub fn compose(&mut self) -> WiringResult<CompositionReport> {
        let resolved = self.resolve_defines()?;
        self.check_requires(&resolved)?;
        Ok(self.commit(resolved))
    }

    fn resolve_defines(&self) -> WiringResult<Vec<ResolvedDefine>> {
        let mut names: Vec<&String> = self.defines.keys().collect();
        names.sort();

        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let define = &self.defines[name];
            let impls = self
                .implementations
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if impls.is_empty() {
                return Err(WiringError::MissingImplementation {
                    name: name.clone(),
                    origin: define.origin.clone(),
                });
            }

            let signature = define.payload.target.signature();
            if let Some(mismatch) = impls
                .iter()
                .find(|entry| entry.payload.signature().id != signature.id)
            {
                return Err(WiringError::SignatureMismatch {
                    name: name.clone(),
                    defined: signature.to_string(),
                    implemented: mismatch.payload.signature().to_string(),
                    define_origin: define.origin.clone(),
                    impl_origin: mismatch.origin.clone(),
                });
            }

            let callables: Vec<ErasedCallable> =
                impls.iter().map(|entry| entry.payload.clone()).collect();
            let value = define
                .payload
                .target
                .combine(&callables, &self.combiners, self.config.fallback)
                .ok_or_else(|| WiringError::MissingCombiner {
                    name: name.clone(),
                    signature: signature.to_string(),
                    origin: define.origin.clone(),
                })?;

            debug!("合并定义: {} ({}, {} 个实现)", name, signature, impls.len());
            resolved.push(ResolvedDefine {
                name: name.clone(),
                value,
            });
        }
        Ok(resolved)
    }

    fn check_requires(&self, resolved: &[ResolvedDefine]) -> WiringResult<()> {
        let promoted: HashMap<&str, (TypeDescriptor, &Origin)> = resolved
            .iter()
            .filter_map(|define| {
                let entry = &self.defines[&define.name];
                entry.payload.also_provide.then(|| {
                    (
                        define.name.as_str(),
                        (entry.payload.target.provided_type(), &entry.origin),
                    )
                })
            })
            .collect();

        let mut names: Vec<&String> = self.requires.keys().collect();
        names.sort();

        let mut unresolved = Vec::new();
        let mut first_origin: Option<Origin> = None;
        for name in names {
            let requesters = &self.requires[name];
            let source = promoted.get(name.as_str()).copied().or_else(|| {
                self.provides
                    .get(name)
                    .map(|provide| (provide.payload.type_descriptor(), &provide.origin))
            });

            let Some((provided, provide_origin)) = source else {
                if let Some(first) = requesters.first() {
                    unresolved.push(name.clone());
                    first_origin.get_or_insert_with(|| first.origin.clone());
                }
                continue;
            };

            for requester in requesters {
                let required = requester.payload.target_type();
                if required != provided {
                    return Err(WiringError::TypeMismatch {
                        name: name.clone(),
                        provided: provided.to_string(),
                        required: required.to_string(),
                        provide_origin: provide_origin.clone(),
                        require_origin: requester.origin.clone(),
                    });
                }
            }
        }

        match first_origin {
            Some(first_origin) => Err(WiringError::Unresolved {
                names: unresolved,
                first_origin,
            }),
            None => Ok(()),
        }
    }

    fn commit(&mut self, resolved: Vec<ResolvedDefine>) -> CompositionReport {
        let mut report = CompositionReport::default();

        for ResolvedDefine { name, value } in resolved {
            self.implementations.remove(&name);
            let Some(define) = self.defines.remove(&name) else {
                continue;
            };

            if define.payload.slot.fill(value.clone_value()) {
                report.defines_resolved += 1;
            } else {
                warn!("定义槽位类型与合并结果不符, 未写入: {}", name);
            }

            if define.payload.also_provide {
                let previous = self.provides.insert(
                    name.clone(),
                    Entry {
                        name: name.clone(),
                        payload: value,
                        origin: define.origin,
                    },
                );
                if previous.is_some() {
                    warn!("定义并提供覆盖了已有的提供: {}", name);
                }
                report.provides_promoted += 1;
            }
        }

        let matched: Vec<String> = self
            .requires
            .keys()
            .filter(|name| self.provides.contains_key(*name))
            .cloned()
            .collect();
        for name in matched {
            let Some(provide) = self.provides.remove(&name) else {
                continue;
            };
            let requesters = self.requires.remove(&name).unwrap_or_default();
            for requester in &requesters {
                if requester.payload.fill(provide.payload.clone_value()) {
                    report.slots_filled += 1;
                } else {
                    warn!("需求槽位类型与提供值不符, 未写入: {}", requester.name);
                }
            }
            debug!("匹配提供: {} -> {} 个需求", provide.name, requesters.len());
            report.provides_matched += 1;
        }

        report.pending_provides = self.provides.len();
        report.pending_implementations = self.implementations.values().map(Vec::len).sum();
        info!(
            "组合完成: 解析 {} 个定义, 提升 {} 个提供, 匹配 {} 个提供, 写入 {} 个槽位",
            report.defines_resolved,
            report.provides_promoted,
            report.provides_matched,
            report.slots_filled
        );
        report
    }
}
