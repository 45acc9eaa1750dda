//! 本地新闻安全专家
//!
//! 拉取目的地近期头条并按 NEWS_RULES 分级（Safe / Caution / Avoid）。
//! 无信号 → Safe + 说明；新闻源不可达 → Degraded Safe + 「无数据」说明。

use async_trait::async_trait;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, FailureKind, RiskClassification, SafetyVerdict,
    SharedContext, StageInfo,
};
use crate::specialists::risk::{actions_for, classify, NEWS_RULES};
use crate::specialists::{stage, tool, Specialist, Toolkit};
use crate::tools::{NewsQuery, ToolQuery, ToolResponse};

pub struct LocalNewsSafety {
    info: StageInfo,
    toolkit: Toolkit,
    max_items: usize,
    language: String,
}

impl LocalNewsSafety {
    pub fn new(toolkit: Toolkit, max_items: usize, language: impl Into<String>) -> Self {
        Self {
            info: StageInfo::new(stage::LOCAL_NEWS_SAFETY, ArtifactFamily::LocalNews),
            toolkit,
            max_items: max_items.max(1),
            language: language.into(),
        }
    }

    fn no_data(&self, caveat: String) -> Artifact {
        tracing::warn!(stage = %self.info.id, caveat = %caveat, "news safety degraded");
        let verdict = SafetyVerdict {
            classification: RiskClassification::Safe,
            findings: Vec::new(),
            reviewed: Vec::new(),
            actions: vec!["Check local news on arrival".to_string()],
            source: "none".to_string(),
        };
        self.info
            .degraded(ArtifactPayload::SafetyVerdict(verdict), vec![caveat])
    }
}

#[async_trait]
impl Specialist for LocalNewsSafety {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    fn required_tools(&self) -> Vec<&'static str> {
        vec![tool::NEWS]
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let Some(destination) = ctx.request().destination() else {
            return self.info.failed(FailureKind::MissingInput, "request has no destination");
        };
        let query = ToolQuery::News(NewsQuery {
            location: destination.to_string(),
            max_items: self.max_items,
            language: self.language.clone(),
        });

        let brief = match self.toolkit.call_tool(tool::NEWS, query).await {
            Ok(ToolResponse::News(brief)) => brief,
            Ok(_) => return self.no_data("No data: news tool returned a non-news payload".to_string()),
            Err(failure) => {
                return self.no_data(format!(
                    "No data: news source unreachable ({}): {}",
                    failure.kind(),
                    failure.detail()
                ))
            }
        };

        let (classification, findings) = classify(&brief.headlines, NEWS_RULES);
        tracing::info!(
            stage = %self.info.id,
            headlines = brief.headlines.len(),
            findings = findings.len(),
            classification = %classification,
            "news classified"
        );
        let caveats = if findings.is_empty() {
            vec![format!(
                "No safety signal in {} recent headlines; no data suggests elevated risk",
                brief.headlines.len()
            )]
        } else {
            Vec::new()
        };
        let verdict = SafetyVerdict {
            classification,
            actions: actions_for(classification),
            findings,
            reviewed: brief.headlines,
            source: brief.source,
        };
        self.info
            .completed_with(ArtifactPayload::SafetyVerdict(verdict), caveats)
    }
}
