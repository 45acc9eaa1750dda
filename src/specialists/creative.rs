//! 创意专家：主题 / 菜单 / 活动
//!
//! 推理后端返回 {"ideas": [{"title": .., "details": [..]}]}；
//! 调用失败或输出无法解析时回落到内置目录并标记 Degraded。

use async_trait::async_trait;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, CreativeSuggestion, Idea, SharedContext, StageInfo,
    ToolFailure,
};
use crate::llm::Prompt;
use crate::specialists::{catalog, stage, Specialist, Toolkit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeKind {
    Theme,
    Menu,
    Activity,
}

impl CreativeKind {
    pub fn stage_id(self) -> &'static str {
        match self {
            CreativeKind::Theme => stage::THEME_DESIGNER,
            CreativeKind::Menu => stage::MENU_MIXOLOGIST,
            CreativeKind::Activity => stage::ACTIVITY_ARCHITECT,
        }
    }

    pub fn family(self) -> ArtifactFamily {
        match self {
            CreativeKind::Theme => ArtifactFamily::Theme,
            CreativeKind::Menu => ArtifactFamily::Menu,
            CreativeKind::Activity => ArtifactFamily::Activity,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            CreativeKind::Theme => {
                "You are a rapid ideation designer for Indian celebrations. Produce 2-3 themed concepts for the brief. \
                 Details: Mood Palette, Headline Visuals, Decor Touches, Why it fits. Focus only on ambience."
            }
            CreativeKind::Menu => {
                "Design 2 complementary menu boards spotlighting Indian flavours. Details: Signature Dish, Side or Snack, \
                 Drink Pairing, Dietary Notes, Estimated cost per guest in INR. Focus on taste and prep ease."
            }
            CreativeKind::Activity => {
                "Curate 2-3 activity arcs for Indian guests, at least one quiet and one high-energy. Details: Runtime, \
                 Energy Level, Required Props, and a facilitation tip."
            }
        }
    }

    fn fallback(self) -> Vec<Idea> {
        match self {
            CreativeKind::Theme => catalog::themes(),
            CreativeKind::Menu => catalog::menus(),
            CreativeKind::Activity => catalog::activities(),
        }
    }
}

const OUTPUT_FORMAT: &str = "Return JSON only: {\"ideas\": [{\"title\": \"...\", \"details\": [\"...\"]}]}";

/// 从推理输出中截取首个 '{' 到最后一个 '}' 并解析
pub fn parse_ideas(text: &str) -> Result<Vec<Idea>, ToolFailure> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(ToolFailure::InvalidResponse("no JSON object in output".to_string())),
    };
    let suggestion: CreativeSuggestion =
        serde_json::from_str(json).map_err(|e| ToolFailure::InvalidResponse(e.to_string()))?;
    let ideas: Vec<Idea> = suggestion
        .ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .collect();
    if ideas.is_empty() {
        return Err(ToolFailure::InvalidResponse("no ideas in output".to_string()));
    }
    Ok(ideas)
}

pub struct CreativeSpecialist {
    kind: CreativeKind,
    info: StageInfo,
    toolkit: Toolkit,
}

impl CreativeSpecialist {
    pub fn new(kind: CreativeKind, toolkit: Toolkit) -> Self {
        Self {
            kind,
            info: StageInfo::new(kind.stage_id(), kind.family()),
            toolkit,
        }
    }

    pub fn kind(&self) -> CreativeKind {
        self.kind
    }
}

#[async_trait]
impl Specialist for CreativeSpecialist {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let prompt = Prompt::new(
            self.kind.stage_id(),
            format!("{}\n{}", self.kind.instruction(), OUTPUT_FORMAT),
            ctx.request().brief(),
        );
        let outcome = match self.toolkit.reason(&prompt).await {
            Ok(text) => parse_ideas(&text),
            Err(failure) => Err(failure),
        };
        match outcome {
            Ok(ideas) => {
                tracing::info!(stage = %self.info.id, ideas = ideas.len(), "ideas generated");
                self.info
                    .completed(ArtifactPayload::CreativeSuggestion(CreativeSuggestion { ideas }))
            }
            Err(failure) => {
                tracing::warn!(stage = %self.info.id, error = %failure, "falling back to catalog ideas");
                self.info.degraded(
                    ArtifactPayload::CreativeSuggestion(CreativeSuggestion {
                        ideas: self.kind.fallback(),
                    }),
                    vec![format!(
                        "Ideas taken from the built-in catalog ({}): {}",
                        failure.kind(),
                        failure.detail()
                    )],
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{ArtifactStatus, Request};
    use crate::specialists::testing::*;
    use crate::tools::ToolRegistry;

    fn ctx() -> SharedContext {
        SharedContext::new(Arc::new(
            Request::new("Diwali party").with_occasion("Diwali").with_guest_count(20),
        ))
    }

    #[test]
    fn test_parse_ideas_tolerates_prose() {
        let text = "Sure! Here you go:\n```json\n{\"ideas\": [{\"title\": \"Lantern Walk\"}, {\"title\": \" \"}]}\n```";
        let ideas = parse_ideas(text).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "Lantern Walk");
        assert!(ideas[0].details.is_empty());
        assert!(parse_ideas("no json here").is_err());
        assert!(parse_ideas("{\"ideas\": []}").is_err());
    }

    #[tokio::test]
    async fn test_reasoner_ideas_completed() {
        let artifact = CreativeSpecialist::new(CreativeKind::Theme, calm_toolkit())
            .run(&ctx())
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Completed);
        assert_eq!(artifact.family, ArtifactFamily::Theme);
        let ideas = &artifact.creative().unwrap().ideas;
        assert!(ideas[0].details.iter().any(|d| d.contains("Diwali with 20 guests")));
    }

    #[tokio::test]
    async fn test_unavailable_reasoner_uses_catalog() {
        let reasoner = ScriptedReasoner::failing(stage::MENU_MIXOLOGIST, ToolFailure::Unavailable("quota".into()));
        let toolkit = toolkit_with(ToolRegistry::new(), Arc::new(reasoner));
        let artifact = CreativeSpecialist::new(CreativeKind::Menu, toolkit).run(&ctx()).await;
        assert_eq!(artifact.status, ArtifactStatus::Degraded);
        assert_eq!(artifact.creative().unwrap().ideas, catalog::menus());
        assert!(artifact.caveats[0].contains("unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_output_uses_catalog() {
        let reasoner = ScriptedReasoner::replying(stage::ACTIVITY_ARCHITECT, "I cannot help with that.");
        let toolkit = toolkit_with(ToolRegistry::new(), Arc::new(reasoner));
        let artifact = CreativeSpecialist::new(CreativeKind::Activity, toolkit).run(&ctx()).await;
        assert_eq!(artifact.status, ArtifactStatus::Degraded);
        assert!(artifact.caveats[0].contains("invalid response"));
    }
}
