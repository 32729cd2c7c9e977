//! 装配注册表的工作区集成测试
//!
//! 覆盖同一账本上的多次组合、跨账本合并以及合并器扩展。

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use wiring_abstractions::CombinerTable;
use wiring_common::ErrorKind;
use wiring_impl::{Func, Ledger, Payload, Slot, TraceCapture, WiringConfig};

type Hook = dyn Fn() + Send + Sync;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn ledger() -> Ledger {
    init_test_logger();
    Ledger::with_config(WiringConfig::default().with_trace_capture(TraceCapture::Location))
}

fn flag() -> (Arc<AtomicBool>, impl Fn() + Send + Sync + 'static) {
    let flag = Arc::new(AtomicBool::new(false));
    let setter = Arc::clone(&flag);
    (flag, move || setter.store(true, Ordering::SeqCst))
}

#[test]
fn test_repeated_passes_on_one_ledger() -> anyhow::Result<()> {
    let mut ledger = ledger();

    // 提供 / 需求整数
    let i: Slot<i32> = Slot::new();
    ledger.provide("foo", 42)?.require("foo", &i)?;
    ledger.compose()?;
    assert_eq!(i.get(), Some(42));

    // 提供 / 需求函数
    let (ok, set_ok) = flag();
    let f: Slot<Func<Hook>> = Slot::new();
    ledger.provide_fn("foo", set_ok)?.require("foo", &f)?;
    ledger.compose()?;
    f.get().unwrap()();
    assert!(ok.load(Ordering::SeqCst));

    // 定义 / 实现函数
    let n = Arc::new(AtomicUsize::new(0));
    f.take();
    ledger.define("foo", &f)?;
    for step in [1, 2] {
        let n = Arc::clone(&n);
        ledger.implement("foo", move || {
            n.fetch_add(step, Ordering::SeqCst);
        })?;
    }
    ledger.compose()?;
    f.get().unwrap()();
    assert_eq!(n.load(Ordering::SeqCst), 3);

    // 定义并提供函数
    n.store(0, Ordering::SeqCst);
    let f2: Slot<Func<Hook>> = Slot::new();
    ledger.define_provide("foo", &f)?;
    for step in [1, 3] {
        let n = Arc::clone(&n);
        ledger.impl_fn("foo", move || {
            n.fetch_add(step, Ordering::SeqCst);
        })?;
    }
    ledger.require("foo", &f2)?;
    ledger.compose()?;
    f2.get().unwrap()();
    assert_eq!(n.load(Ordering::SeqCst), 4);

    // 内置签名与通用扇出
    let f1: Slot<Func<dyn Fn(i32) + Send + Sync>> = Slot::new();
    ledger.define("foo", &f1)?.implement("foo", |_: i32| {})?;
    ledger.compose()?;
    f1.get().unwrap()(42);

    let f3: Slot<Func<dyn Fn(String) + Send + Sync>> = Slot::new();
    ledger.define("foo", &f3)?.implement("foo", |_: String| {})?;
    ledger.compose()?;
    f3.get().unwrap()("foo".to_string());

    let f4: Slot<Func<dyn Fn(i32, i32) + Send + Sync>> = Slot::new();
    ledger.define("foo", &f4)?.implement("foo", |_: i32, _: i32| {})?;
    ledger.compose()?;
    f4.get().unwrap()(42, 42);

    assert!(ledger.is_empty());
    Ok(())
}

#[test]
fn test_combine_in_both_directions() -> anyhow::Result<()> {
    // 需求在接收方，提供在被合并方
    let (ok, set_ok) = flag();
    let f: Slot<Func<Hook>> = Slot::new();
    let mut c1 = ledger();
    c1.require("foo", &f)?;
    let mut c2 = ledger();
    c2.provide_fn("foo", set_ok)?;
    c1.combine(c2)?.compose()?;
    f.get().unwrap()();
    assert!(ok.load(Ordering::SeqCst));

    // 提供在接收方，需求在被合并方
    let i: Slot<i32> = Slot::new();
    c1.provide("foo", 42)?;
    let mut c2 = ledger();
    c2.require("foo", &i)?;
    c1.combine(c2)?.compose()?;
    assert_eq!(i.get(), Some(42));

    // 实现在接收方，定义在被合并方
    let (ok, set_ok) = flag();
    let foo: Slot<Func<Hook>> = Slot::new();
    c1.impl_fn("foo", set_ok)?;
    let mut c2 = ledger();
    c2.define("foo", &foo)?;
    c1.combine(c2)?.compose()?;
    foo.get().unwrap()();
    assert!(ok.load(Ordering::SeqCst));

    // 定义在接收方，实现在被合并方
    let (ok, set_ok) = flag();
    foo.take();
    c1.define("foo", &foo)?;
    let mut c2 = ledger();
    c2.impl_fn("foo", set_ok)?;
    c1.combine(c2)?.compose()?;
    foo.get().unwrap()();
    assert!(ok.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn test_registration_errors() {
    let mut c = ledger();
    c.provide("foo", 42).unwrap();
    let err = c.provide("foo", 42).unwrap_err();
    assert!(err.to_string().starts_with("重复提供: foo"));

    let err = ledger().require_payload("foo", Payload::value(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequireTarget);

    let err = ledger().define_payload("foo", Payload::value(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDefineTarget);

    let foo: Slot<Func<Hook>> = Slot::new();
    let mut c = ledger();
    c.define("foo", &foo).unwrap();
    let err = c.define("foo", &foo).unwrap_err();
    assert!(err.to_string().starts_with("重复定义: foo"));

    let err = ledger().implement_payload("foo", Payload::value(42)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotCallable);

    let mut c = ledger();
    c.provide("foo", 42).unwrap();
    let mut c2 = ledger();
    c2.provide("foo", 42).unwrap();
    assert_eq!(c.combine(c2).unwrap_err().kind(), ErrorKind::DuplicateProvide);

    let (fn1, fn2): (Slot<Func<Hook>>, Slot<Func<Hook>>) = (Slot::new(), Slot::new());
    let mut c = ledger();
    c.define("foo", &fn1).unwrap();
    let mut c2 = ledger();
    c2.define("foo", &fn2).unwrap();
    assert_eq!(c.combine(c2).unwrap_err().kind(), ErrorKind::DuplicateDefine);
}

#[test]
fn test_composition_errors() {
    let foo: Slot<Func<Hook>> = Slot::new();
    let mut c = ledger();
    c.define("foo", &foo).unwrap();
    let err = c.compose().unwrap_err();
    assert!(err.to_string().starts_with("没有 foo 的实现"));

    let mut c = ledger();
    c.define("foo", &foo).unwrap();
    c.impl_fn("foo", |_: i32| {}).unwrap();
    let err = c.compose().unwrap_err();
    assert!(err.to_string().starts_with("定义 fn(), 实现 fn(i32)"));

    let b: Slot<bool> = Slot::new();
    let mut c = ledger();
    c.provide("foo", 42).unwrap();
    c.require("foo", &b).unwrap();
    let err = c.compose().unwrap_err();
    assert!(err.to_string().starts_with("提供 i32, 需求 bool"));

    let i: Slot<i32> = Slot::new();
    let mut c = ledger();
    c.require("foo", &i).unwrap();
    let err = c.compose().unwrap_err();
    assert!(err.to_string().starts_with("未提供: foo"));
}

#[test]
fn test_custom_table_with_valued_combiner() -> anyhow::Result<()> {
    type Validator = dyn Fn(String) -> Vec<String> + Send + Sync;

    let mut table = CombinerTable::empty();
    table.register::<Validator, _>(|impls| {
        let combined: Func<Validator> = Arc::new(move |input: String| {
            impls
                .iter()
                .flat_map(|validate| validate(input.clone()))
                .collect::<Vec<String>>()
        });
        combined
    });

    let mut ledger = ledger().with_combiners(table);
    let validate: Slot<Func<Validator>> = Slot::new();
    ledger.define("validate", &validate)?;
    ledger.implement("validate", |input: String| {
        if input.is_empty() {
            vec!["不能为空".to_string()]
        } else {
            Vec::new()
        }
    })?;
    ledger.implement("validate", |input: String| {
        if input.len() > 4 {
            vec![format!("过长: {}", input.len())]
        } else {
            Vec::new()
        }
    })?;
    ledger.compose()?;

    let validate = validate.get().unwrap();
    assert!(validate("ok".to_string()).is_empty());
    assert_eq!(validate("toolong".to_string()), vec!["过长: 7"]);

    // 自定义表不含内置合并器，无返回值签名仍走通用扇出
    assert!(!ledger.combiners().contains::<Hook>());
    let calls = Arc::new(Mutex::new(0));
    let hook: Slot<Func<Hook>> = Slot::new();
    let counter = Arc::clone(&calls);
    ledger.define("hook", &hook)?.implement("hook", move || *counter.lock() += 1)?;
    ledger.compose()?;
    hook.get().unwrap()();
    assert_eq!(*calls.lock(), 1);
    Ok(())
}

#[test]
fn test_config_from_json() -> anyhow::Result<()> {
    let config = WiringConfig::from_json_str(
        &serde_json::json!({ "trace_capture": "location", "fallback": "disabled" }).to_string(),
    )?;
    let mut ledger = Ledger::with_config(config);
    assert_eq!(ledger.config().trace_capture, TraceCapture::Location);

    let pair: Slot<Func<dyn Fn(u8, u8) + Send + Sync>> = Slot::new();
    ledger.define("pair", &pair)?.implement("pair", |_: u8, _: u8| {})?;
    let err = ledger.compose().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingCombiner);
    assert!(ledger.pending().defines.contains(&"pair".to_string()));
    Ok(())
}
