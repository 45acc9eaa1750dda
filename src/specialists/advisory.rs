//! 官方提示专家
//!
//! 复用上下文中本地新闻阶段已审阅的头条，按 ADVISORY_RULES 分级，
//! 并根据请求约束（证件、健康）补充出行要求。新闻阶段无数据时降级。

use async_trait::async_trait;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, ArtifactStatus, FailureKind, Request,
    RiskClassification, SafetyVerdict, SharedContext, StageId, StageInfo,
};
use crate::specialists::risk::{actions_for, classify, ADVISORY_RULES};
use crate::specialists::{stage, Specialist};

pub struct SafetyWatch {
    info: StageInfo,
}

impl Default for SafetyWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyWatch {
    pub fn new() -> Self {
        Self {
            info: StageInfo::new(stage::SAFETY_WATCH, ArtifactFamily::Advisory),
        }
    }
}

/// 由请求约束推导的证件 / 健康提醒
fn requirement_actions(request: &Request) -> Vec<String> {
    let mut actions = Vec::new();
    for constraint in &request.constraints {
        let lower = constraint.to_lowercase();
        if ["visa", "passport", "permit", "id "].iter().any(|k| lower.contains(k)) {
            actions.push(format!("Verify entry documents in advance: {constraint}"));
        } else if ["health", "medical", "medication", "vaccin", "pregnan"]
            .iter()
            .any(|k| lower.contains(k))
        {
            actions.push(format!("Carry prescriptions and check health requirements: {constraint}"));
        }
    }
    actions
}

#[async_trait]
impl Specialist for SafetyWatch {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    fn depends_on(&self) -> Vec<StageId> {
        vec![StageId::from(stage::LOCAL_NEWS_SAFETY)]
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let request = ctx.request();
        let Some(destination) = request.destination() else {
            return self.info.failed(FailureKind::MissingInput, "request has no destination");
        };

        let news = ctx.get(stage::LOCAL_NEWS_SAFETY);
        let reviewed = news
            .as_ref()
            .filter(|a| a.status == ArtifactStatus::Completed)
            .and_then(|a| a.safety())
            .map(|v| v.reviewed.clone())
            .unwrap_or_default();

        let mut actions = vec![format!(
            "Check the official government travel advisory for {destination} before departure"
        )];
        actions.extend(requirement_actions(request));

        if reviewed.is_empty() {
            tracing::warn!(stage = %self.info.id, "no headlines in context, advisory limited to request hints");
            let verdict = SafetyVerdict {
                classification: RiskClassification::Safe,
                findings: Vec::new(),
                reviewed: Vec::new(),
                actions,
                source: "request constraints".to_string(),
            };
            return self.info.degraded(
                ArtifactPayload::SafetyVerdict(verdict),
                vec!["No data: local news feed unavailable, advisory check limited to request hints".to_string()],
            );
        }

        let (classification, findings) = classify(&reviewed, ADVISORY_RULES);
        if classification != RiskClassification::Safe {
            actions.extend(actions_for(classification));
        }
        tracing::info!(
            stage = %self.info.id,
            findings = findings.len(),
            classification = %classification,
            "advisories classified"
        );
        let caveats = if findings.is_empty() {
            vec!["No active advisory found in recent coverage".to_string()]
        } else {
            Vec::new()
        };
        let verdict = SafetyVerdict {
            classification,
            findings,
            reviewed,
            actions,
            source: "local news feed".to_string(),
        };
        self.info
            .completed_with(ArtifactPayload::SafetyVerdict(verdict), caveats)
    }
}
