//! Hive CLI
//!
//! 用法：`hive [request.json] [--json]`；省略文件时从 stdin 读取请求 JSON。
//! 默认输出 Markdown，`--json` 输出完整 RunResult。

use std::io::Read;

use anyhow::Context;
use hive::{
    agent::{create_dispatcher_with, create_reasoner_from_config, create_tool_registry},
    config::{load_config, AppConfig},
    core::Request,
    llm::Reasoner,
    observability,
    synthesis::render_markdown,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let mut json_output = false;
    let mut request_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json_output = true,
            _ => request_path = Some(arg),
        }
    }

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    let raw = match &request_path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    let request: Request = serde_json::from_str(&raw).context("Invalid request JSON")?;

    let reasoner = create_reasoner_from_config(&cfg);
    let dispatcher = create_dispatcher_with(&cfg, create_tool_registry(&cfg), reasoner.clone())
        .context("Failed to assemble pipelines")?;
    let result = dispatcher.handle(request).await;

    let (prompt_tokens, completion_tokens, total_tokens) = reasoner.token_usage();
    tracing::info!(
        reasoner = reasoner.name(),
        prompt_tokens,
        completion_tokens,
        total_tokens,
        "token usage"
    );

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        println!("{}", render_markdown(&result));
    }
    Ok(())
}
