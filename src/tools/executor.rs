//! 工具执行器
//!
//! 持有 ToolRegistry 与统一超时，call(tool_name, query) 在超时内调用 registry.call，
//! 超时转为 ToolFailure::Timeout；每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::ToolFailure;
use crate::tools::types::{ToolQuery, ToolResponse};
use crate::tools::ToolRegistry;

pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self::with_timeout(registry, Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(registry: ToolRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// 执行指定工具；超时返回 Timeout，其余失败原样透传；输出 JSON 审计日志
    pub async fn call(&self, tool_name: &str, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
        let start = Instant::now();
        let query_kind = query.kind();
        let result = timeout(self.timeout, self.registry.call(tool_name, query)).await;

        let outcome = match &result {
            Ok(Ok(_)) => "ok",
            Ok(Err(ToolFailure::Unavailable(_))) => "unavailable",
            Ok(Err(ToolFailure::InvalidResponse(_))) => "invalid_response",
            Ok(Err(ToolFailure::Timeout(_))) | Err(_) => "timeout",
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "query": query_kind,
            "ok": outcome == "ok",
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::info!(audit = %audit, "tool");

        match result {
            Ok(inner) => inner,
            Err(_) => Err(ToolFailure::Timeout(format!(
                "{tool_name} exceeded {} ms",
                self.timeout.as_millis()
            ))),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}
