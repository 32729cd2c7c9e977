//! 具名装配注册表示例
//!
//! 演示多个组件各自在账本中登记，合并后一次组合完成装配

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wiring_impl::{Func, Ledger, Slot};

type Hook = dyn Fn() + Send + Sync;
type Greeter = dyn Fn(String) + Send + Sync;

/// 服务器组件：需求端口，定义启动钩子并把它提供给其他组件
struct Server {
    port: Slot<u64>,
    start: Slot<Func<Hook>>,
}

impl Server {
    fn register(ledger: &mut Ledger) -> anyhow::Result<Self> {
        let server = Self {
            port: Slot::new(),
            start: Slot::new(),
        };
        ledger
            .require("port", &server.port)?
            .define_provide("start", &server.start)?;
        Ok(server)
    }

    fn run(&self) -> anyhow::Result<()> {
        let port = self
            .port
            .get()
            .ok_or_else(|| anyhow::anyhow!("端口未装配"))?;
        let start = self
            .start
            .get()
            .ok_or_else(|| anyhow::anyhow!("启动钩子未装配"))?;
        info!("服务器监听端口: {}", port);
        start();
        Ok(())
    }
}

/// 配置组件：提供端口
fn config_component() -> anyhow::Result<Ledger> {
    let mut ledger = Ledger::new();
    ledger.provide("port", 8080u64)?;
    Ok(ledger)
}

/// 插件组件：各自为启动钩子贡献一个实现
fn plugin_component(started: Arc<AtomicUsize>) -> anyhow::Result<Ledger> {
    let mut ledger = Ledger::new();
    for plugin in ["metrics", "cache"] {
        let started = Arc::clone(&started);
        ledger.implement("start", move || {
            started.fetch_add(1, Ordering::SeqCst);
            info!("插件启动: {}", plugin);
        })?;
    }
    ledger.implement("greet", |name: String| println!("你好, {name}"))?;
    Ok(ledger)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== 组件登记 ===");
    let started = Arc::new(AtomicUsize::new(0));
    let mut ledger = Ledger::new();
    let server = Server::register(&mut ledger)?;
    ledger
        .combine(config_component()?)?
        .combine(plugin_component(Arc::clone(&started))?)?;
    println!("待解析条目: {:?}", ledger.pending());

    println!("\n=== 第一次组合 ===");
    let report = ledger.compose()?;
    println!("{report:?}");
    server.run()?;
    println!("已启动插件数: {}", started.load(Ordering::SeqCst));

    println!("\n=== 第二次组合 ===");
    // 第一次组合后仍保留的提供与实现可以在后续组合中使用
    let restart: Slot<Func<Hook>> = Slot::new();
    let greet: Slot<Func<Greeter>> = Slot::new();
    ledger.require("start", &restart)?.define("greet", &greet)?;
    let report = ledger.compose()?;
    println!("{report:?}");
    if let Some(restart) = restart.get() {
        restart();
    }
    if let Some(greet) = greet.get() {
        greet("Lorn".to_string());
    }
    println!("已启动插件数: {}", started.load(Ordering::SeqCst));

    Ok(())
}
