//! Tern - Rust 对话式旅行规划智能体
//!
//! 入口：初始化日志与配置，组装 LLM、工具与长期记忆，
//! 先做一次表单式会话引导，再进入逐行 REPL 回合循环。

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tern::config::{load_config, AppConfig};
use tern::core::{create_llm_from_config, Orchestrator, Session};
use tern::memory::{InMemoryStore, MemoryStore, NoopStore};
use tern::tools::{HotelBookingTool, ToolExecutor, ToolRegistry, WeatherTool};

fn prompt_line(stdin: &mut impl BufRead, label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush().context("stdout flush failed")?;
    let mut line = String::new();
    stdin.read_line(&mut line).context("stdin read failed")?;
    Ok(line.trim().to_string())
}

fn build_memory(cfg: &AppConfig) -> Arc<dyn MemoryStore> {
    if !cfg.memory.enabled {
        return Arc::new(NoopStore);
    }
    match &cfg.memory.snapshot_path {
        Some(path) => Arc::new(InMemoryStore::with_snapshot(
            cfg.memory.max_entries,
            path.clone(),
        )),
        None => Arc::new(InMemoryStore::new(cfg.memory.max_entries)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let llm = create_llm_from_config(&cfg);
    let mut registry = ToolRegistry::new();
    registry.register(WeatherTool::new(cfg.tools.weather_timeout_secs));
    registry.register(HotelBookingTool);
    let tools = Arc::new(ToolExecutor::new(registry, cfg.tools.tool_timeout_secs));
    let memory = build_memory(&cfg);

    let orchestrator = Orchestrator::new(llm, tools, memory, cfg.memory.top_k);
    let mut session = Session::new(cfg.app.user_id.clone());

    let name = cfg.app.name.as_deref().unwrap_or("Tern");
    println!("{name} - travel planning assistant. Leave a field empty to skip.");

    // 会话引导：表单式播种行程上下文
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let destination = prompt_line(&mut stdin, "Destination: ")?;
    let start_date = prompt_line(&mut stdin, "Start date (YYYY-MM-DD): ")?;
    let end_date = prompt_line(&mut stdin, "End date (YYYY-MM-DD): ")?;
    let travelers = prompt_line(&mut stdin, "Travelers: ")?
        .parse::<u32>()
        .unwrap_or(1);
    session.bootstrap(
        Some(destination),
        Some(start_date),
        Some(end_date),
        travelers,
    );

    println!("\nAsk anything about your trip ('quit' to exit).");
    loop {
        let input = prompt_line(&mut stdin, "> ")?;
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        let outcome = orchestrator.process_turn(&mut session, &input).await;
        println!("[{}]", outcome.intent);
        println!("{}\n", outcome.response);
        println!("{}\n", session.context_summary());
    }

    Ok(())
}
