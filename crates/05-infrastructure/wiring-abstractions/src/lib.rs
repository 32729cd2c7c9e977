//! # Wiring Abstractions
//!
//! 装配注册表的抽象层，定义槽位、函数签名与合并器表。
//!
//! ## 核心接口
//!
//! - [`Slot`] - 由注册表写入的共享槽位
//! - [`Signature`] - 可被合并的函数对象类型
//! - [`IntoCallable`] - 把闭包转换为具体签名的函数
//! - [`CombinerTable`] - 签名到合并器的注册表
//! - [`Payload`] - 动态注册入口使用的类型擦除载荷

pub mod combiner;
pub mod erased;
pub mod signature;
pub mod slot;

pub use combiner::*;
pub use erased::*;
pub use signature::*;
pub use slot::*;
