//! Artifact：单个专家阶段的带状态产物
//!
//! 每次专家调用恰好产出一个 Artifact（Completed / Degraded / Failed）。
//! 构造统一经由 StageInfo，保证阶段标识与产物族一致。

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::core::error::FailureKind;

/// 阶段标识（SharedContext 的键）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for StageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 产物族：结果中每个族对应一个章节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFamily {
    Weather,
    LocalNews,
    Advisory,
    Itinerary,
    Theme,
    Menu,
    Activity,
    Budget,
}

impl ArtifactFamily {
    pub fn title(self) -> &'static str {
        match self {
            ArtifactFamily::Weather => "Weather Outlook",
            ArtifactFamily::LocalNews => "Local News Safety",
            ArtifactFamily::Advisory => "Official Advisories",
            ArtifactFamily::Itinerary => "Itinerary",
            ArtifactFamily::Theme => "Theme Concepts",
            ArtifactFamily::Menu => "Menu Boards",
            ArtifactFamily::Activity => "Activity Arcs",
            ArtifactFamily::Budget => "Budget Snapshot",
        }
    }
}

impl std::fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// 风险等级，按严重程度排序：Safe < Caution < Avoid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClassification {
    Safe,
    Caution,
    Avoid,
}

impl RiskClassification {
    /// 最坏情况规则：取出现过的最严重等级；无输入时返回 None
    pub fn worst<I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        items.into_iter().max()
    }
}

impl std::fmt::Display for RiskClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskClassification::Safe => f.write_str("Safe"),
            RiskClassification::Caution => f.write_str("Caution"),
            RiskClassification::Avoid => f.write_str("Avoid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Completed,
    Degraded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub detail: String,
}

// ---------------------------------------------------------------------------
// 载荷
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub windspeed_kmh: Option<f64>,
    pub weather_code: Option<i64>,
    pub observation_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: String,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub precip_probability: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub wind_speed_max_kmh: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAlertKind {
    Heat,
    Cold,
    Rain,
    Wind,
    Uv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub date: String,
    pub kind: WeatherAlertKind,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOutlook {
    pub location: String,
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DailyForecast>,
    pub alerts: Vec<WeatherAlert>,
    pub packing: Vec<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    pub published: String,
    pub snippet: String,
}

/// 命中规则的一条证据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub headline: Headline,
    pub signals: Vec<String>,
    pub severity: RiskClassification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub classification: RiskClassification,
    pub findings: Vec<Finding>,
    /// 参与评估的全部头条（供下游复用）
    pub reviewed: Vec<Headline>,
    pub actions: Vec<String>,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripLength {
    Weekend,
    Short,
    Long,
}

impl TripLength {
    pub fn from_days(days: u32) -> Self {
        match days {
            0..=3 => TripLength::Weekend,
            4..=7 => TripLength::Short,
            _ => TripLength::Long,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub trip_length: TripLength,
    pub before_departure: Vec<String>,
    pub during_trip: Vec<String>,
    pub after_return: Vec<String>,
    pub packing: Vec<String>,
    pub contingencies: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub title: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeSuggestion {
    pub ideas: Vec<Idea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub currency: String,
    pub total: f64,
    pub guests: u32,
    pub per_guest: f64,
    pub lines: Vec<BudgetLine>,
    pub tips: Vec<String>,
}

/// 载荷标签联合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactPayload {
    WeatherOutlook(WeatherOutlook),
    SafetyVerdict(SafetyVerdict),
    ItineraryPlan(ItineraryPlan),
    CreativeSuggestion(CreativeSuggestion),
    BudgetPlan(BudgetPlan),
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub stage: StageId,
    pub family: ArtifactFamily,
    pub status: ArtifactStatus,
    pub payload: Option<ArtifactPayload>,
    pub caveats: Vec<String>,
    pub failure: Option<FailureReason>,
}

impl Artifact {
    pub fn is_failed(&self) -> bool {
        self.status == ArtifactStatus::Failed
    }

    pub fn weather(&self) -> Option<&WeatherOutlook> {
        match &self.payload {
            Some(ArtifactPayload::WeatherOutlook(w)) => Some(w),
            _ => None,
        }
    }

    pub fn safety(&self) -> Option<&SafetyVerdict> {
        match &self.payload {
            Some(ArtifactPayload::SafetyVerdict(v)) => Some(v),
            _ => None,
        }
    }

    pub fn itinerary(&self) -> Option<&ItineraryPlan> {
        match &self.payload {
            Some(ArtifactPayload::ItineraryPlan(p)) => Some(p),
            _ => None,
        }
    }

    pub fn creative(&self) -> Option<&CreativeSuggestion> {
        match &self.payload {
            Some(ArtifactPayload::CreativeSuggestion(c)) => Some(c),
            _ => None,
        }
    }

    pub fn budget(&self) -> Option<&BudgetPlan> {
        match &self.payload {
            Some(ArtifactPayload::BudgetPlan(b)) => Some(b),
            _ => None,
        }
    }
}

/// 阶段描述：标识 + 产物族；专家通过它构造 Artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageInfo {
    pub id: StageId,
    pub family: ArtifactFamily,
}

impl StageInfo {
    pub fn new(id: impl Into<String>, family: ArtifactFamily) -> Self {
        Self {
            id: StageId::new(id),
            family,
        }
    }

    pub fn completed(&self, payload: ArtifactPayload) -> Artifact {
        self.completed_with(payload, Vec::new())
    }

    /// 完成但附带说明（例如「无风险信号」）
    pub fn completed_with(&self, payload: ArtifactPayload, caveats: Vec<String>) -> Artifact {
        Artifact {
            stage: self.id.clone(),
            family: self.family,
            status: ArtifactStatus::Completed,
            payload: Some(payload),
            caveats,
            failure: None,
        }
    }

    pub fn degraded(&self, payload: ArtifactPayload, caveats: Vec<String>) -> Artifact {
        Artifact {
            stage: self.id.clone(),
            family: self.family,
            status: ArtifactStatus::Degraded,
            payload: Some(payload),
            caveats,
            failure: None,
        }
    }

    pub fn failed(&self, kind: FailureKind, detail: impl Into<String>) -> Artifact {
        Artifact {
            stage: self.id.clone(),
            family: self.family,
            status: ArtifactStatus::Failed,
            payload: None,
            caveats: Vec::new(),
            failure: Some(FailureReason {
                kind,
                detail: detail.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_case_rule() {
        use RiskClassification::*;
        assert_eq!(RiskClassification::worst([Safe, Caution]), Some(Caution));
        assert_eq!(RiskClassification::worst([Safe, Caution, Avoid]), Some(Avoid));
        assert_eq!(RiskClassification::worst([Caution, Safe]), Some(Caution));
        assert_eq!(RiskClassification::worst([]), None);
    }

    #[test]
    fn test_stage_info_constructors() {
        let info = StageInfo::new("theme_designer", ArtifactFamily::Theme);
        let payload = ArtifactPayload::CreativeSuggestion(CreativeSuggestion { ideas: vec![] });

        let ok = info.completed(payload.clone());
        assert_eq!(ok.status, ArtifactStatus::Completed);
        assert_eq!(ok.stage.as_str(), "theme_designer");
        assert!(ok.creative().is_some());

        let degraded = info.degraded(payload, vec!["catalog picks".into()]);
        assert_eq!(degraded.status, ArtifactStatus::Degraded);
        assert_eq!(degraded.caveats.len(), 1);

        let failed = info.failed(FailureKind::Timeout, "run timeout");
        assert!(failed.is_failed());
        assert!(failed.payload.is_none());
        assert_eq!(failed.failure.unwrap().kind, FailureKind::Timeout);
    }

    #[test]
    fn test_trip_length_classes() {
        assert_eq!(TripLength::from_days(2), TripLength::Weekend);
        assert_eq!(TripLength::from_days(5), TripLength::Short);
        assert_eq!(TripLength::from_days(12), TripLength::Long);
    }
}
