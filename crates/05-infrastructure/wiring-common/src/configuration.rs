//! 注册表配置

use crate::errors::ConfigResult;
use serde::{Deserialize, Serialize};

/// 注册位置追踪的捕获方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceCapture {
    /// 只记录调用位置
    Location,
    /// 调用位置，以及 `RUST_BACKTRACE` 启用时的调用栈
    #[default]
    Environment,
    /// 调用位置与完整调用栈
    Always,
}

/// 未注册合并器时的回退策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// 仅对无返回值的签名使用通用扇出
    #[default]
    VoidOnly,
    /// 禁用通用扇出，所有签名都必须注册合并器
    Disabled,
}

impl FallbackPolicy {
    /// 是否允许对给定签名使用通用扇出
    pub fn allows(self, returns_unit: bool) -> bool {
        match self {
            FallbackPolicy::VoidOnly => returns_unit,
            FallbackPolicy::Disabled => false,
        }
    }
}

/// 注册表配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
    /// 注册位置追踪方式
    pub trace_capture: TraceCapture,
    /// 合并器回退策略
    pub fallback: FallbackPolicy,
}

impl WiringConfig {
    /// 从 JSON 文本解析配置，缺失字段取默认值
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// 设置追踪方式
    pub fn with_trace_capture(mut self, trace_capture: TraceCapture) -> Self {
        self.trace_capture = trace_capture;
        self
    }

    /// 设置回退策略
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}
