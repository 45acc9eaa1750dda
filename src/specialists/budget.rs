//! 预算专家
//!
//! 按 装饰 30% / 餐饮 50% / 其他 20% 拆分预算并计算人均；缺预算或人数时按假设值估算并降级，
//! 两者都缺时失败。省钱建议来自推理后端，失败时使用内置建议。

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, BudgetLine, BudgetPlan, FailureKind, SharedContext,
    StageInfo,
};
use crate::llm::Prompt;
use crate::specialists::{catalog, stage, Specialist, Toolkit};

const SPLIT: [(&str, f64); 3] = [("Decor", 0.30), ("Food & drink", 0.50), ("Extras", 0.20)];
const ASSUMED_PER_GUEST: f64 = 1000.0;
const ASSUMED_GUESTS: u32 = 10;
const TIGHT_PER_GUEST: f64 = 300.0;
const MAX_TIPS: usize = 5;

const INSTRUCTION: &str = "You are a frugal Indian event planner. Give 3-5 practical cost-saving tips \
for the celebration brief, one per line, no preamble.";

pub struct BudgetPlanner {
    info: StageInfo,
    toolkit: Toolkit,
}

impl BudgetPlanner {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            info: StageInfo::new(stage::BUDGET_PLANNER, ArtifactFamily::Budget),
            toolkit,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 拆分行；最后一行吸收舍入误差，保证合计等于总额
pub fn split_budget(total: f64) -> Vec<BudgetLine> {
    let mut lines: Vec<BudgetLine> = SPLIT
        .iter()
        .map(|(label, share)| BudgetLine {
            label: label.to_string(),
            amount: round2(total * share),
        })
        .collect();
    let allocated: f64 = lines.iter().map(|l| l.amount).sum();
    if let Some(last) = lines.last_mut() {
        last.amount = round2(last.amount + (total - allocated));
    }
    lines
}

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+").expect("static regex"))
}

/// 逐行解析建议，只去掉行首的项目符号与编号
fn parse_tips(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| list_marker().replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(MAX_TIPS)
        .collect()
}

#[async_trait]
impl Specialist for BudgetPlanner {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let request = ctx.request();
        let budget = request.budget.filter(|b| b.is_finite() && *b > 0.0);
        let guests = request.guest_count.filter(|g| *g > 0);
        let currency = request.currency().to_string();
        let mut caveats = Vec::new();

        let (total, guests) = match (budget, guests) {
            (Some(total), Some(guests)) => (total, guests),
            (Some(total), None) => {
                caveats.push(format!("Guest count not given; assuming {ASSUMED_GUESTS} guests"));
                (total, ASSUMED_GUESTS)
            }
            (None, Some(guests)) => {
                caveats.push(format!(
                    "Budget not given; estimated at {ASSUMED_PER_GUEST:.0} {currency} per guest"
                ));
                (ASSUMED_PER_GUEST * guests as f64, guests)
            }
            (None, None) => {
                return self
                    .info
                    .failed(FailureKind::MissingInput, "request has neither a budget nor a guest count")
            }
        };
        let per_guest = round2(total / guests as f64);

        let prompt = Prompt::new(stage::BUDGET_PLANNER, INSTRUCTION, request.brief());
        let mut tips = match self.toolkit.reason(&prompt).await {
            Ok(text) => parse_tips(&text),
            Err(failure) => {
                caveats.push(format!("Savings tips from the built-in list ({})", failure.kind()));
                Vec::new()
            }
        };
        if tips.is_empty() {
            tips = catalog::savings_tips();
        }
        if per_guest < TIGHT_PER_GUEST {
            tips.insert(
                0,
                format!("At {per_guest:.0} {currency} per guest, consider a potluck or a single chaat counter"),
            );
        }

        let plan = BudgetPlan {
            currency,
            total: round2(total),
            guests,
            per_guest,
            lines: split_budget(total),
            tips,
        };
        tracing::info!(stage = %self.info.id, total = plan.total, guests, per_guest, "budget split");
        let payload = ArtifactPayload::BudgetPlan(plan);
        if caveats.is_empty() {
            self.info.completed(payload)
        } else {
            self.info.degraded(payload, caveats)
        }
    }
}
