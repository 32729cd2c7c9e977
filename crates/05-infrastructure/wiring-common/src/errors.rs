//! 错误类型定义

use crate::metadata::Origin;
use thiserror::Error;

/// 装配错误类型
///
/// 所有错误都是装配期可发现的编程错误，不可重试。
#[derive(Error, Debug, Clone)]
pub enum WiringError {
    /// 同名提供注册了两次
    #[error("重复提供: {name}\n首次提供于:\n{first}\n再次提供于:\n{second}")]
    DuplicateProvide {
        /// 条目名称
        name: String,
        /// 首次注册位置
        first: Origin,
        /// 再次注册位置
        second: Origin,
    },

    /// 同名定义注册了两次
    #[error("重复定义: {name}\n首次定义于:\n{first}\n再次定义于:\n{second}")]
    DuplicateDefine {
        /// 条目名称
        name: String,
        /// 首次注册位置
        first: Origin,
        /// 再次注册位置
        second: Origin,
    },

    /// 需求的目标不是槽位
    #[error("需求 {name} 的目标必须是可写入的槽位, 实际为 {actual}\n注册于:\n{origin}")]
    InvalidRequireTarget {
        /// 条目名称
        name: String,
        /// 实际载荷描述
        actual: String,
        /// 注册位置
        origin: Origin,
    },

    /// 定义的目标不是函数槽位
    #[error("定义 {name} 的目标必须是函数类型的槽位, 实际为 {actual}\n注册于:\n{origin}")]
    InvalidDefineTarget {
        /// 条目名称
        name: String,
        /// 实际载荷描述
        actual: String,
        /// 注册位置
        origin: Origin,
    },

    /// 实现不是函数
    #[error("{name} 的实现必须是函数, 实际为 {actual}\n注册于:\n{origin}")]
    NotCallable {
        /// 条目名称
        name: String,
        /// 实际载荷描述
        actual: String,
        /// 注册位置
        origin: Origin,
    },

    /// 定义没有任何实现
    #[error("没有 {name} 的实现, 定义于:\n{origin}")]
    MissingImplementation {
        /// 条目名称
        name: String,
        /// 定义位置
        origin: Origin,
    },

    /// 实现的签名与定义不同
    #[error("定义 {defined}, 实现 {implemented}: {name}\n定义于:\n{define_origin}\n实现于:\n{impl_origin}")]
    SignatureMismatch {
        /// 条目名称
        name: String,
        /// 定义的签名
        defined: String,
        /// 实现的签名
        implemented: String,
        /// 定义位置
        define_origin: Origin,
        /// 首个不符的实现位置
        impl_origin: Origin,
    },

    /// 提供值与需求槽位类型不同
    #[error("提供 {provided}, 需求 {required}: {name}\n提供于:\n{provide_origin}\n需求于:\n{require_origin}")]
    TypeMismatch {
        /// 条目名称
        name: String,
        /// 提供值类型
        provided: String,
        /// 需求槽位类型
        required: String,
        /// 提供位置
        provide_origin: Origin,
        /// 需求位置
        require_origin: Origin,
    },

    /// 签名既没有合并器也不能扇出
    #[error("签名 {signature} 没有注册合并器且不能使用通用扇出: {name}\n定义于:\n{origin}")]
    MissingCombiner {
        /// 条目名称
        name: String,
        /// 定义的签名
        signature: String,
        /// 定义位置
        origin: Origin,
    },

    /// 需求找不到提供
    #[error("未提供: {}\n首个需求注册于:\n{first_origin}", .names.join(", "))]
    Unresolved {
        /// 未解析的名称，按名称排序
        names: Vec<String>,
        /// 首个未解析需求的注册位置
        first_origin: Origin,
    },
}

/// 错误类别标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 重复提供
    DuplicateProvide,
    /// 重复定义
    DuplicateDefine,
    /// 需求目标无效
    InvalidRequireTarget,
    /// 定义目标无效
    InvalidDefineTarget,
    /// 实现不可调用
    NotCallable,
    /// 缺少实现
    MissingImplementation,
    /// 签名不符
    SignatureMismatch,
    /// 类型不符
    TypeMismatch,
    /// 缺少合并器
    MissingCombiner,
    /// 未解析的需求
    Unresolved,
}

impl WiringError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateProvide { .. } => ErrorKind::DuplicateProvide,
            Self::DuplicateDefine { .. } => ErrorKind::DuplicateDefine,
            Self::InvalidRequireTarget { .. } => ErrorKind::InvalidRequireTarget,
            Self::InvalidDefineTarget { .. } => ErrorKind::InvalidDefineTarget,
            Self::NotCallable { .. } => ErrorKind::NotCallable,
            Self::MissingImplementation { .. } => ErrorKind::MissingImplementation,
            Self::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::MissingCombiner { .. } => ErrorKind::MissingCombiner,
            Self::Unresolved { .. } => ErrorKind::Unresolved,
        }
    }

    /// 涉及的名称
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::DuplicateProvide { name, .. }
            | Self::DuplicateDefine { name, .. }
            | Self::InvalidRequireTarget { name, .. }
            | Self::InvalidDefineTarget { name, .. }
            | Self::NotCallable { name, .. }
            | Self::MissingImplementation { name, .. }
            | Self::SignatureMismatch { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::MissingCombiner { name, .. } => vec![name.as_str()],
            Self::Unresolved { names, .. } => names.iter().map(String::as_str).collect(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON 解析失败
    #[error("配置解析失败: {source}")]
    ParseError {
        /// 底层解析错误
        #[from]
        source: serde_json::Error,
    },
}

/// 结果类型别名
pub type WiringResult<T> = Result<T, WiringError>;
/// 配置结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
