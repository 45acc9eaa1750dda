//! 用户请求
//!
//! 自由文本目标 + 可选结构化提示；所有字段均可缺省，由分发器和各专家自行容忍。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 请求形态：依赖型规划 / 独立多方案创意
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    Planning,
    Creative,
}

impl std::fmt::Display for RequestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestMode::Planning => f.write_str("planning"),
            RequestMode::Creative => f.write_str("creative"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    pub goal: String,
    /// 显式指定形态时优先于字段推断
    pub mode: Option<RequestMode>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub trip_days: Option<u32>,
    pub party_size: Option<u32>,
    pub occasion: Option<String>,
    /// 庆典举办地（本地或异地）
    pub venue: Option<String>,
    pub guest_count: Option<u32>,
    pub budget: Option<f64>,
    pub currency: Option<String>,
    /// 硬性约束：饮食、噪音、宗教仪式等
    pub constraints: Vec<String>,
    /// 偏好：氛围、兴趣等
    pub preferences: Vec<String>,
}

impl Request {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_trip_days(mut self, days: u32) -> Self {
        self.trip_days = Some(days);
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasion = Some(occasion.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_guest_count(mut self, guests: u32) -> Self {
        self.guest_count = Some(guests);
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        self.preferences.push(preference.into());
        self
    }

    /// 非空白的目的地
    pub fn destination(&self) -> Option<&str> {
        non_blank(self.destination.as_deref())
    }

    pub fn origin(&self) -> Option<&str> {
        non_blank(self.origin.as_deref())
    }

    pub fn venue(&self) -> Option<&str> {
        non_blank(self.venue.as_deref())
    }

    pub fn occasion(&self) -> Option<&str> {
        non_blank(self.occasion.as_deref())
    }

    /// 货币缺省为 INR
    pub fn currency(&self) -> &str {
        non_blank(self.currency.as_deref()).unwrap_or("INR")
    }

    /// 供推理能力使用的简要描述
    pub fn brief(&self) -> String {
        let mut lines = Vec::new();
        if !self.goal.trim().is_empty() {
            lines.push(format!("Goal: {}", self.goal.trim()));
        }
        if let Some(d) = self.destination() {
            lines.push(format!("Destination: {d}"));
        }
        if let Some(o) = self.origin() {
            lines.push(format!("Origin: {o}"));
        }
        if let Some(date) = self.start_date {
            lines.push(format!("Start date: {date}"));
        }
        if let Some(days) = self.trip_days {
            lines.push(format!("Trip length: {days} days"));
        }
        if let Some(n) = self.party_size {
            lines.push(format!("Travellers: {n}"));
        }
        if let Some(o) = self.occasion() {
            lines.push(format!("Occasion: {o}"));
        }
        if let Some(v) = self.venue() {
            lines.push(format!("Venue: {v}"));
        }
        if let Some(g) = self.guest_count {
            lines.push(format!("Guests: {g}"));
        }
        if let Some(b) = self.budget {
            lines.push(format!("Budget: {b:.0} {}", self.currency()));
        }
        if !self.constraints.is_empty() {
            lines.push(format!("Constraints: {}", self.constraints.join(", ")));
        }
        if !self.preferences.is_empty() {
            lines.push(format!("Preferences: {}", self.preferences.join(", ")));
        }
        lines.join("\n")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize() {
        let req: Request = serde_json::from_str(r#"{"goal": "weekend away"}"#).unwrap();
        assert_eq!(req.goal, "weekend away");
        assert!(req.destination().is_none());
        assert!(req.constraints.is_empty());
        assert_eq!(req.currency(), "INR");
    }

    #[test]
    fn test_blank_destination_is_none() {
        let req = Request::new("trip").with_destination("   ");
        assert!(req.destination().is_none());
    }

    #[test]
    fn test_brief_lists_hints() {
        let req = Request::new("Plan a party")
            .with_guest_count(20)
            .with_budget(1500.0)
            .with_constraint("jain");
        let brief = req.brief();
        assert!(brief.contains("Guests: 20"));
        assert!(brief.contains("Budget: 1500 INR"));
        assert!(brief.contains("Constraints: jain"));
    }

    #[test]
    fn test_mode_deserialize() {
        let req: Request = serde_json::from_str(r#"{"mode": "creative", "start_date": "2026-11-02"}"#).unwrap();
        assert_eq!(req.mode, Some(RequestMode::Creative));
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2026, 11, 2));
    }
}
