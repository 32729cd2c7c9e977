//! 账本合并

use crate::ledger::{Entry, Ledger};
use std::collections::HashMap;
use tracing::debug;
use wiring_common::{WiringError, WiringResult};

/// 两个账本中同名条目的第一个冲突名称（按名称排序）
fn first_collision<'a, P>(
    ours: &HashMap<String, Entry<P>>,
    theirs: &'a HashMap<String, Entry<P>>,
) -> Option<&'a String> {
    theirs.keys().filter(|name| ours.contains_key(*name)).min()
}

impl Ledger {
    /// 把另一个账本的条目并入本账本
    ///
    /// 提供或定义重名时返回与直接注册相同的错误，且本账本保持不变；
    /// 需求与实现列表按本账本在前、`other` 在后的顺序拼接。
    /// `other` 的合并器补入本账本缺少的签名，同一签名保留本账本的合并器；
    /// 本账本的配置不变。
    pub fn combine(&mut self, other: Ledger) -> WiringResult<&mut Self> {
        let Ledger {
            provides,
            requires,
            defines,
            implementations,
            combiners,
            ..
        } = other;

        if let Some(name) = first_collision(&self.provides, &provides) {
            return Err(WiringError::DuplicateProvide {
                name: name.clone(),
                first: self.provides[name].origin.clone(),
                second: provides[name].origin.clone(),
            });
        }
        if let Some(name) = first_collision(&self.defines, &defines) {
            return Err(WiringError::DuplicateDefine {
                name: name.clone(),
                first: self.defines[name].origin.clone(),
                second: defines[name].origin.clone(),
            });
        }

        debug!(
            "合并账本: {} 个提供, {} 个需求, {} 个定义, {} 个实现",
            provides.len(),
            requires.len(),
            defines.len(),
            implementations.len()
        );
        self.combiners.extend_missing(combiners);
        self.provides.extend(provides);
        self.defines.extend(defines);
        for (name, entries) in requires {
            self.requires.entry(name).or_default().extend(entries);
        }
        for (name, entries) in implementations {
            self.implementations.entry(name).or_default().extend(entries);
        }
        Ok(self)
    }
}
