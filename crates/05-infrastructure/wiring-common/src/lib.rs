//! # Wiring Common
//!
//! 具名装配注册表的公共类型。
//!
//! ## 核心类型
//!
//! - [`WiringError`] - 注册与组合阶段的全部错误
//! - [`Origin`] - 注册位置追踪，仅用于诊断
//! - [`TypeDescriptor`] / [`SignatureDescriptor`] - 运行时类型与函数签名描述
//! - [`WiringConfig`] - 注册表配置

pub mod configuration;
pub mod errors;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use metadata::*;
