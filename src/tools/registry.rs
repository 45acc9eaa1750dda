//! 工具注册表
//!
//! 所有外部数据源实现 ToolAdapter trait（name / description / call），由 ToolRegistry 按名注册与查找。
//! 注册表是静态能力表：流水线构建时校验所需工具均已注册，运行时不做动态发现。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::ToolFailure;
use crate::tools::types::{ToolQuery, ToolResponse};

/// 工具适配器：一次请求，返回类型化结果或类型化失败；内部不做重试
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// 工具名称（注册键）
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, query: ToolQuery) -> Result<ToolResponse, ToolFailure>;
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolAdapter>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl ToolAdapter + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn ToolAdapter>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "tool re-registered, previous adapter replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolAdapter>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub async fn call(&self, name: &str, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolFailure::Unavailable(format!("Unknown tool: {name}")))?;
        tool.call(query).await
    }

    /// 排序后的工具名
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        let mut list: Vec<(String, String)> = self
            .tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect();
        list.sort();
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::{NewsBrief, NewsQuery};

    struct StaticNews;

    #[async_trait]
    impl ToolAdapter for StaticNews {
        fn name(&self) -> &str {
            "news"
        }

        fn description(&self) -> &str {
            "Static headlines"
        }

        async fn call(&self, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
            match query {
                ToolQuery::News(q) => Ok(ToolResponse::News(NewsBrief {
                    location: q.location,
                    headlines: vec![],
                    source: "static".into(),
                })),
                other => Err(ToolFailure::InvalidResponse(format!("unsupported {}", other.kind()))),
            }
        }
    }

    fn news_query() -> ToolQuery {
        ToolQuery::News(NewsQuery {
            location: "Goa".into(),
            max_items: 4,
            language: "en-US".into(),
        })
    }

    #[tokio::test]
    async fn test_register_and_call() {
        let mut registry = ToolRegistry::new();
        registry.register(StaticNews);
        assert!(registry.contains("news"));
        assert_eq!(registry.tool_names(), vec!["news".to_string()]);
        assert_eq!(registry.tool_descriptions()[0].1, "Static headlines");

        let response = registry.call("news", news_query()).await.unwrap();
        assert!(matches!(response, ToolResponse::News(b) if b.location == "Goa"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_unavailable() {
        let registry = ToolRegistry::new();
        let err = registry.call("weather", news_query()).await.unwrap_err();
        assert!(matches!(err, ToolFailure::Unavailable(msg) if msg.contains("weather")));
    }
}
