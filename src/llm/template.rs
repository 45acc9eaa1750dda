//! 模板推理（离线、确定性，默认后端）
//!
//! 按 prompt.role 返回固定模板：创意角色返回 {"ideas": [...]} JSON，
//! budget_planner 返回逐行省钱建议，trip_planner 返回行程备注；未知角色 → Unavailable。

use async_trait::async_trait;
use serde_json::json;

use crate::core::{Idea, ToolFailure};
use crate::llm::{Prompt, Reasoner};
use crate::specialists::{catalog, stage};

#[derive(Debug, Default)]
pub struct TemplateReasoner;

impl TemplateReasoner {
    pub fn new() -> Self {
        Self
    }
}

/// 在摘要中查找 "Key: value" 行
fn brief_field<'a>(brief: &'a str, key: &str) -> Option<&'a str> {
    brief.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

fn tailor(mut ideas: Vec<Idea>, brief: &str) -> Vec<Idea> {
    let occasion = brief_field(brief, "Occasion");
    let guests = brief_field(brief, "Guests");
    let note = match (occasion, guests) {
        (Some(o), Some(g)) => Some(format!("Tailored for {o} with {g} guests")),
        (Some(o), None) => Some(format!("Tailored for {o}")),
        (None, Some(g)) => Some(format!("Scaled for {g} guests")),
        (None, None) => None,
    };
    if let Some(note) = note {
        for idea in &mut ideas {
            idea.details.push(note.clone());
        }
    }
    ideas
}

fn trip_notes(brief: &str) -> String {
    let destination = brief_field(brief, "Destination").unwrap_or("the destination");
    let mut notes = vec![format!(
        "Reserve lodging close to central {destination} and confirm cancellation terms."
    )];
    match brief_field(brief, "Origin") {
        Some(origin) => notes.push(format!(
            "Compare rail and air options from {origin} to {destination}; book refundable fares."
        )),
        None => notes.push(format!("Plan the primary route to {destination} ahead of time.")),
    }
    notes.push("Budget a daily buffer for local transport and entry fees.".to_string());
    notes.push("Check ID, visa or permit requirements before departure.".to_string());
    notes.join("\n")
}

#[async_trait]
impl Reasoner for TemplateReasoner {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, ToolFailure> {
        let ideas = match prompt.role.as_str() {
            stage::THEME_DESIGNER => catalog::themes(),
            stage::MENU_MIXOLOGIST => catalog::menus(),
            stage::ACTIVITY_ARCHITECT => catalog::activities(),
            stage::BUDGET_PLANNER => {
                return Ok(catalog::savings_tips()
                    .into_iter()
                    .map(|tip| format!("- {tip}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            stage::TRIP_PLANNER => return Ok(trip_notes(&prompt.brief)),
            other => {
                return Err(ToolFailure::Unavailable(format!(
                    "no template for role '{other}'"
                )))
            }
        };
        Ok(json!({ "ideas": tailor(ideas, &prompt.brief) }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creative_roles_return_ideas_json() {
        let reasoner = TemplateReasoner::new();
        let prompt = Prompt::new(stage::THEME_DESIGNER, "design", "Occasion: Diwali\nGuests: 20");
        let out = reasoner.generate(&prompt).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let ideas = value["ideas"].as_array().unwrap();
        assert_eq!(ideas[0]["title"], "Marigold Mela");
        assert!(out.contains("Tailored for Diwali with 20 guests"));
    }

    #[tokio::test]
    async fn test_deterministic() {
        let reasoner = TemplateReasoner::new();
        let prompt = Prompt::new(stage::TRIP_PLANNER, "plan", "Destination: Goa\nOrigin: Pune");
        let a = reasoner.generate(&prompt).await.unwrap();
        let b = reasoner.generate(&prompt).await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("from Pune to Goa"));
    }

    #[tokio::test]
    async fn test_unknown_role_unavailable() {
        let err = TemplateReasoner::new()
            .generate(&Prompt::new("poet", "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolFailure::Unavailable(_)));
    }
}
