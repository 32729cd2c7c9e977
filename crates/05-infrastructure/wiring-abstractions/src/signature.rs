//! 函数签名抽象
//!
//! 签名用函数对象类型 `dyn Fn(A, ..) -> R + Send + Sync` 表示，
//! 通用扇出按每个泛型实例各生成一份。

use std::any::{type_name, TypeId};
use std::sync::Arc;
use wiring_common::SignatureDescriptor;

/// 某个签名的具体函数
pub type Func<S> = Arc<S>;

/// 可被定义与实现的函数签名
///
/// 为 0 到 6 个参数的 `dyn Fn(..) -> R + Send + Sync` 实现。
/// 参数需要 `Clone + 'static`，以便同一组参数传给每个实现；
/// 自定义合并器同样受此约束。
///
/// 引用参数的签名（如 `dyn Fn(&str)`）不受支持，
/// 改用拥有所有权的参数，例如 `String` 或 `Arc<str>`。
pub trait Signature: Send + Sync + 'static {
    /// 结构化签名描述
    fn descriptor() -> SignatureDescriptor;

    /// 通用扇出：按顺序以相同参数调用每个实现
    ///
    /// 仅对返回 `()` 的签名可用，其余签名以及空列表返回 `None`。
    fn fan_out(impls: Vec<Func<Self>>) -> Option<Func<Self>>;
}

/// 可转换为具体签名函数的值
///
/// `Marker` 只用于区分不同参数个数的实现，调用处由编译器推断。
pub trait IntoCallable<Marker>: Send + Sync + 'static {
    /// 转换后的签名
    type Signature: Signature + ?Sized;

    /// 转换为函数
    fn into_func(self) -> Func<Self::Signature>;
}

macro_rules! impl_signature {
    ($($arg:ident: $ty:ident),*) => {
        impl<R: 'static, $($ty: Clone + 'static),*> Signature for dyn Fn($($ty),*) -> R + Send + Sync {
            fn descriptor() -> SignatureDescriptor {
                SignatureDescriptor::new::<Self, R>(vec![$(type_name::<$ty>()),*])
            }

            fn fan_out(mut impls: Vec<Func<Self>>) -> Option<Func<Self>> {
                if TypeId::of::<R>() != TypeId::of::<()>() {
                    return None;
                }
                let last = impls.pop()?;
                let combined: Func<Self> = Arc::new(move |$($arg: $ty),*| {
                    for f in &impls {
                        f($($arg.clone()),*);
                    }
                    last($($arg),*)
                });
                Some(combined)
            }
        }

        impl<F, R, $($ty),*> IntoCallable<fn($($ty),*) -> R> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: 'static,
            $($ty: Clone + 'static),*
        {
            type Signature = dyn Fn($($ty),*) -> R + Send + Sync;

            fn into_func(self) -> Func<Self::Signature> {
                Arc::new(self)
            }
        }
    };
}

impl_signature!();
impl_signature!(a1: A1);
impl_signature!(a1: A1, a2: A2);
impl_signature!(a1: A1, a2: A2, a3: A3);
impl_signature!(a1: A1, a2: A2, a3: A3, a4: A4);
impl_signature!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
impl_signature!(a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Hook = dyn Fn(String, u32) + Send + Sync;

    #[test]
    fn test_fan_out_preserves_order_and_arguments() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let impls: Vec<Func<Hook>> = (0..3)
            .map(|i| {
                let calls = Arc::clone(&calls);
                let f: Func<Hook> = Arc::new(move |s: String, n: u32| {
                    calls.lock().push(format!("{i}:{s}:{n}"));
                });
                f
            })
            .collect();

        let combined = <Hook as Signature>::fan_out(impls).unwrap();
        combined("x".to_string(), 9);
        assert_eq!(*calls.lock(), vec!["0:x:9", "1:x:9", "2:x:9"]);
    }

    #[test]
    fn test_fan_out_rejects_valued_and_empty() {
        type Valued = dyn Fn() -> i32 + Send + Sync;
        let one: Func<Valued> = Arc::new(|| 1);
        assert!(<Valued as Signature>::fan_out(vec![one]).is_none());
        assert!(<Hook as Signature>::fan_out(Vec::new()).is_none());
    }

    #[test]
    fn test_shared_str_argument_fans_out() {
        type Log = dyn Fn(Arc<str>) + Send + Sync;
        let lines = Arc::new(Mutex::new(Vec::new()));
        let impls: Vec<Func<Log>> = (0..2)
            .map(|i| {
                let lines = Arc::clone(&lines);
                let f: Func<Log> = Arc::new(move |line: Arc<str>| {
                    lines.lock().push(format!("{i}:{line}"));
                });
                f
            })
            .collect();

        let combined = <Log as Signature>::fan_out(impls).unwrap();
        combined(Arc::from("启动"));
        assert_eq!(*lines.lock(), vec!["0:启动", "1:启动"]);
        assert_eq!(<Log as Signature>::descriptor().arity(), 1);
    }

    #[test]
    fn test_into_callable_picks_signature() {
        let f = (|x: i32, y: i32| x + y).into_func();
        assert_eq!(f(2, 3), 5);

        let descriptor = <dyn Fn(i32, i32) -> i32 + Send + Sync as Signature>::descriptor();
        assert_eq!(descriptor.to_string(), "fn(i32, i32) -> i32");
        assert_eq!(descriptor.id, TypeId::of::<dyn Fn(i32, i32) -> i32 + Send + Sync>());

        let unit = <dyn Fn() + Send + Sync as Signature>::descriptor();
        assert_eq!(unit.to_string(), "fn()");
        assert_ne!(unit.id, descriptor.id);
    }
}
