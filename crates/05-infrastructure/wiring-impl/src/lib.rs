//! # 具名装配注册表实现
//!
//! 组件向 [`Ledger`] 注册具名的提供、需求、定义与实现，
//! 一次 [`Ledger::compose`] 把它们解析为类型一致的装配：
//! 需求槽位得到同名同类型的提供值，定义槽位得到扇出到全部实现的函数。
//!
//! ## 基本使用
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use wiring_impl::{Func, Ledger, Slot};
//!
//! let mut ledger = Ledger::new();
//!
//! let count: Slot<i32> = Slot::new();
//! ledger.provide("count", 42).unwrap();
//! ledger.require("count", &count).unwrap();
//!
//! let total = Arc::new(AtomicUsize::new(0));
//! let sum: Slot<Func<dyn Fn() + Send + Sync>> = Slot::new();
//! ledger.define("sum", &sum).unwrap();
//! for step in [1, 2] {
//!     let total = Arc::clone(&total);
//!     ledger
//!         .implement("sum", move || {
//!             total.fetch_add(step, Ordering::SeqCst);
//!         })
//!         .unwrap();
//! }
//!
//! ledger.compose().unwrap();
//! assert_eq!(count.get(), Some(42));
//! sum.get().unwrap()();
//! assert_eq!(total.load(Ordering::SeqCst), 3);
//! ```

pub mod composer;
pub mod ledger;
pub mod merger;

pub use composer::CompositionReport;
pub use ledger::{Ledger, PendingSummary};

// 重新导出常用类型
pub use wiring_abstractions::{
    Combiner, CombinerTable, Func, IntoCallable, Payload, Signature, Slot,
};
pub use wiring_common::{
    ErrorKind, FallbackPolicy, Origin, TraceCapture, WiringConfig, WiringError, WiringResult,
};
