//! 元数据定义
//!
//! 提供注册位置追踪以及类型、函数签名的运行时描述

use crate::configuration::TraceCapture;
use std::any::TypeId;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// 注册位置追踪
///
/// 在注册调用处捕获，只出现在错误信息中，从不参与控制流。
#[derive(Clone)]
pub struct Origin {
    /// 调用位置
    location: &'static Location<'static>,
    /// 调用栈文本（按配置捕获）
    backtrace: Option<Arc<str>>,
}

impl Origin {
    /// 在调用者位置捕获追踪信息
    #[track_caller]
    pub fn capture(mode: TraceCapture) -> Self {
        let backtrace = match mode {
            TraceCapture::Location => None,
            TraceCapture::Environment => render(Backtrace::capture()),
            TraceCapture::Always => render(Backtrace::force_capture()),
        };

        Self {
            location: Location::caller(),
            backtrace,
        }
    }

    /// 源文件路径
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    /// 行号
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// 列号
    pub fn column(&self) -> u32 {
        self.location.column()
    }

    /// 调用栈文本
    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }
}

fn render(backtrace: Backtrace) -> Option<Arc<str>> {
    match backtrace.status() {
        BacktraceStatus::Captured => Some(Arc::from(backtrace.to_string())),
        _ => None,
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}:{}:{}", self.file(), self.line(), self.column())?;
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{backtrace}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Origin")
            .field("location", &format_args!("{}:{}:{}", self.file(), self.line(), self.column()))
            .field("backtrace", &self.backtrace.is_some())
            .finish()
    }
}

/// 类型描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// 类型ID
    pub id: TypeId,
    /// 类型名称
    pub name: &'static str,
}

impl TypeDescriptor {
    /// 从类型获取类型描述
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 函数签名描述
///
/// 以函数对象类型的 `TypeId` 作为结构化签名的唯一标识，
/// 参数与返回类型名称仅用于展示。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureDescriptor {
    /// 函数对象类型ID
    pub id: TypeId,
    /// 参数类型名称
    pub params: Vec<&'static str>,
    /// 返回类型名称
    pub output: &'static str,
    /// 返回类型是否为 `()`
    pub returns_unit: bool,
}

impl SignatureDescriptor {
    /// 为函数对象类型 `S` 创建签名描述
    pub fn new<S: ?Sized + 'static, R: 'static>(params: Vec<&'static str>) -> Self {
        Self {
            id: TypeId::of::<S>(),
            params,
            output: std::any::type_name::<R>(),
            returns_unit: TypeId::of::<R>() == TypeId::of::<()>(),
        }
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({})", self.params.join(", "))?;
        if !self.returns_unit {
            write!(f, " -> {}", self.output)?;
        }
        Ok(())
    }
}
