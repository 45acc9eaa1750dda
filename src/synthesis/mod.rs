//! 合成器：把全部阶段产物合并为一个 RunResult
//!
//! 每个声明阶段一个章节，按声明顺序；Completed → ok，Degraded → degraded，Failed / 缺失 → unavailable。
//! 整体状态取最差章节；整体风险取所有 SafetyVerdict 的最坏情况，无任何安全数据时为 Safe 并附说明。

pub mod render;

use serde::{Deserialize, Serialize};

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, ArtifactStatus, FailureKind, Idea, RequestMode,
    RiskClassification, SharedContext, StageId, StageInfo,
};
use crate::specialists::risk::contains_word;

pub use render::render_markdown;

const MAX_KITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Ok,
    Degraded,
    Unavailable,
}

impl std::fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionStatus::Ok => f.write_str("ok"),
            SectionStatus::Degraded => f.write_str("degraded"),
            SectionStatus::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub stage: StageId,
    pub family: ArtifactFamily,
    pub title: String,
    pub status: SectionStatus,
    pub caveats: Vec<String>,
    pub content: Option<ArtifactPayload>,
    /// unavailable 章节的显式说明
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallVerdict {
    pub classification: RiskClassification,
    pub caveat: Option<String>,
    /// 参与合并的安全阶段
    pub sources: Vec<StageId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: StageId,
    pub kind: FailureKind,
    pub detail: String,
}

/// 主题 + 菜单 + 活动的组合方案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceKit {
    pub title: String,
    pub theme: Option<String>,
    pub menu: Option<String>,
    pub activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    pub digest: Vec<String>,
    pub kits: Vec<ExperienceKit>,
    /// 饮食约束与菜单的冲突
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub mode: RequestMode,
    pub sections: Vec<Section>,
    pub overall_status: SectionStatus,
    pub verdict: OverallVerdict,
    pub failures: Vec<StageFailure>,
    pub highlights: Highlights,
}

impl RunResult {
    pub fn section(&self, family: ArtifactFamily) -> Option<&Section> {
        self.sections.iter().find(|s| s.family == family)
    }

    pub fn count(&self, status: SectionStatus) -> usize {
        self.sections.iter().filter(|s| s.status == status).count()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, ctx: &SharedContext, stages: &[StageInfo], mode: RequestMode) -> RunResult {
        let artifacts: Vec<(&StageInfo, Option<std::sync::Arc<Artifact>>)> =
            stages.iter().map(|info| (info, ctx.get(info.id.as_str()))).collect();

        let sections: Vec<Section> = artifacts
            .iter()
            .map(|(info, artifact)| section_for(info, artifact.as_deref()))
            .collect();
        let failures: Vec<StageFailure> = artifacts
            .iter()
            .filter_map(|(info, artifact)| failure_for(info, artifact.as_deref()))
            .collect();
        let overall_status = sections
            .iter()
            .map(|s| s.status)
            .max()
            .unwrap_or(SectionStatus::Unavailable);
        let verdict = combine_verdicts(&sections);
        let highlights = match mode {
            RequestMode::Planning => planning_highlights(&sections, &verdict),
            RequestMode::Creative => creative_highlights(&sections, &ctx.request().constraints),
        };

        tracing::info!(
            run_id = ctx.run_id(),
            mode = %mode,
            sections = sections.len(),
            overall = %overall_status,
            risk = %verdict.classification,
            failures = failures.len(),
            "synthesis complete"
        );

        RunResult {
            run_id: ctx.run_id().to_string(),
            mode,
            sections,
            overall_status,
            verdict,
            failures,
            highlights,
        }
    }
}

fn section_for(info: &StageInfo, artifact: Option<&Artifact>) -> Section {
    let mut section = Section {
        stage: info.id.clone(),
        family: info.family,
        title: info.family.title().to_string(),
        status: SectionStatus::Unavailable,
        caveats: Vec::new(),
        content: None,
        notice: None,
    };
    match artifact {
        Some(a) if a.status != ArtifactStatus::Failed => {
            section.status = if a.status == ArtifactStatus::Completed {
                SectionStatus::Ok
            } else {
                SectionStatus::Degraded
            };
            section.caveats = a.caveats.clone();
            section.content = a.payload.clone();
        }
        Some(a) => {
            let reason = a
                .failure
                .as_ref()
                .map(|f| format!("{}: {}", f.kind, f.detail))
                .unwrap_or_else(|| "unknown failure".to_string());
            section.notice = Some(format!("{} is unavailable ({reason})", info.family.title()));
        }
        None => {
            section.notice = Some(format!(
                "{} is unavailable (no result was produced)",
                info.family.title()
            ));
        }
    }
    section
}

fn failure_for(info: &StageInfo, artifact: Option<&Artifact>) -> Option<StageFailure> {
    match artifact {
        Some(a) if a.is_failed() => {
            let (kind, detail) = a
                .failure
                .as_ref()
                .map(|f| (f.kind, f.detail.clone()))
                .unwrap_or((FailureKind::Aborted, String::new()));
            Some(StageFailure {
                stage: info.id.clone(),
                kind,
                detail,
            })
        }
        Some(_) => None,
        None => Some(StageFailure {
            stage: info.id.clone(),
            kind: FailureKind::Aborted,
            detail: "no artifact recorded".to_string(),
        }),
    }
}

/// 最坏情况规则；无安全数据时 Safe + 说明
fn combine_verdicts(sections: &[Section]) -> OverallVerdict {
    let verdicts: Vec<(&Section, RiskClassification)> = sections
        .iter()
        .filter_map(|s| match &s.content {
            Some(ArtifactPayload::SafetyVerdict(v)) => Some((s, v.classification)),
            _ => None,
        })
        .collect();

    match RiskClassification::worst(verdicts.iter().map(|(_, c)| *c)) {
        None => OverallVerdict {
            classification: RiskClassification::Safe,
            caveat: Some("No safety data available; treat the destination as unverified".to_string()),
            sources: Vec::new(),
        },
        Some(classification) => {
            let all_degraded = verdicts.iter().all(|(s, _)| s.status != SectionStatus::Ok);
            OverallVerdict {
                classification,
                caveat: all_degraded
                    .then(|| "Safety sources were only partially reachable; verify before travel".to_string()),
                sources: verdicts.iter().map(|(s, _)| s.stage.clone()).collect(),
            }
        }
    }
}

fn planning_highlights(sections: &[Section], verdict: &OverallVerdict) -> Highlights {
    let mut digest = Vec::new();
    let payload = |family: ArtifactFamily| {
        sections
            .iter()
            .find(|s| s.family == family)
            .and_then(|s| s.content.as_ref())
    };

    match payload(ArtifactFamily::Weather) {
        Some(ArtifactPayload::WeatherOutlook(w)) if !w.daily.is_empty() => {
            if w.alerts.is_empty() {
                digest.push(format!("Weather in {}: no alerts over {} day(s)", w.location, w.daily.len()));
            } else {
                let mut dates: Vec<&str> = w.alerts.iter().map(|a| a.date.as_str()).collect();
                dates.dedup();
                digest.push(format!(
                    "Weather in {}: {} alert(s) on {}",
                    w.location,
                    w.alerts.len(),
                    dates.join(", ")
                ));
            }
        }
        _ => digest.push("Weather outlook unavailable; check a local forecast".to_string()),
    }

    digest.push(format!("Safety level: {}", verdict.classification));

    if let Some(ArtifactPayload::ItineraryPlan(plan)) = payload(ArtifactFamily::Itinerary) {
        digest.push(format!(
            "{:?} trip plan with {} contingency item(s)",
            plan.trip_length,
            plan.contingencies.len()
        ));
        let pack: Vec<&str> = plan.packing.iter().take(3).map(String::as_str).collect();
        if !pack.is_empty() {
            digest.push(format!("Pack: {}", pack.join(", ")));
        }
    }

    Highlights {
        digest,
        ..Highlights::default()
    }
}

fn ideas_of(sections: &[Section], family: ArtifactFamily) -> Vec<Idea> {
    sections
        .iter()
        .find(|s| s.family == family)
        .and_then(|s| match &s.content {
            Some(ArtifactPayload::CreativeSuggestion(c)) => Some(c.ideas.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// 饮食约束识别词 → 与之冲突的菜品关键词；按顺序取首个命中
struct DietRule {
    diet: &'static [&'static str],
    dishes: &'static [&'static str],
}

const DIET_RULES: &[DietRule] = &[
    DietRule {
        diet: &["vegan", "plant-based", "dairy-free"],
        dishes: &[
            "paneer", "dairy", "ghee", "dahi", "lassi", "thandai", "makhani", "butter", "egg", "chicken",
            "mutton", "fish",
        ],
    },
    DietRule {
        diet: &["jain"],
        dishes: &["onion", "garlic", "potato", "aloo"],
    },
    DietRule {
        diet: &["gluten", "coeliac", "celiac"],
        dishes: &["gluten", "wheat", "puri", "kachori", "naan", "roti"],
    },
    DietRule {
        diet: &["nut", "peanut", "tree nut"],
        dishes: &["cashew", "almond", "pistachio", "peanut", "nut"],
    },
    DietRule {
        diet: &["vegetarian", "veg", "no meat"],
        dishes: &["chicken", "mutton", "fish", "prawn", "egg"],
    },
];

fn diet_keywords(constraint: &str) -> &'static [&'static str] {
    let lower = constraint.to_lowercase();
    DIET_RULES
        .iter()
        .find(|rule| rule.diet.iter().any(|term| contains_word(&lower, term)))
        .map(|rule| rule.dishes)
        .unwrap_or(&[])
}

/// 菜单与饮食约束的冲突；写明 "-free" 的菜品视为已处理
pub fn dietary_conflicts(menus: &[Idea], constraints: &[String]) -> Vec<String> {
    let mut conflicts = Vec::new();
    for constraint in constraints {
        let keywords = diet_keywords(constraint);
        if keywords.is_empty() {
            continue;
        }
        for menu in menus {
            let text = format!("{} {}", menu.title, menu.details.join(" ")).to_lowercase();
            let hit = keywords
                .iter()
                .find(|kw| contains_word(&text, kw) && !text.contains(&format!("{kw}-free")));
            if let Some(keyword) = hit {
                conflicts.push(format!(
                    "{}: mentions {keyword}, conflicts with '{constraint}'; swap or label the dish",
                    menu.title
                ));
            }
        }
    }
    conflicts
}

/// 按下标循环取用，方案数多于想法数时复用
fn pick(ideas: &[Idea], i: usize) -> Option<String> {
    (!ideas.is_empty()).then(|| ideas[i % ideas.len()].title.clone())
}

fn creative_highlights(sections: &[Section], constraints: &[String]) -> Highlights {
    let themes = ideas_of(sections, ArtifactFamily::Theme);
    let menus = ideas_of(sections, ArtifactFamily::Menu);
    let activities = ideas_of(sections, ArtifactFamily::Activity);

    let count = themes.len().max(menus.len()).max(activities.len()).min(MAX_KITS);
    let kits = (0..count)
        .map(|i| {
            let theme = themes.get(i).map(|t| t.title.clone());
            ExperienceKit {
                title: theme.clone().unwrap_or_else(|| format!("Experience kit {}", i + 1)),
                theme,
                menu: pick(&menus, i),
                activity: pick(&activities, i),
            }
        })
        .collect();

    let mut digest = Vec::new();
    if let Some(Some(ArtifactPayload::BudgetPlan(b))) =
        sections.iter().find(|s| s.family == ArtifactFamily::Budget).map(|s| &s.content)
    {
        digest.push(format!(
            "Budget: {:.0} {} for {} guests ({:.0} per guest)",
            b.total, b.currency, b.guests, b.per_guest
        ));
    }

    Highlights {
        digest,
        kits,
        conflicts: dietary_conflicts(&menus, constraints),
    }
}
