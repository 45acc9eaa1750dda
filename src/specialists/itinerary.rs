//! 行程规划专家
//!
//! 汇总上游天气与安全产物，按行程长度（周末 / 短途 / 长途）生成出发前 / 行程中 / 返程后三段，
//! 为天气预警与非 Safe 评级给出应急预案，并附上推理后端的补充备注。

use async_trait::async_trait;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, ArtifactStatus, FailureKind, ItineraryPlan,
    RiskClassification, SafetyVerdict, SharedContext, StageId, StageInfo, TripLength,
    WeatherAlertKind, WeatherOutlook,
};
use crate::llm::Prompt;
use crate::specialists::weather::packing_for;
use crate::specialists::{stage, Specialist, Toolkit};

const DEFAULT_TRIP_DAYS: u32 = 3;

const INSTRUCTION: &str = "You are a trip planner. Using the traveller brief and the weather and safety findings, \
write short practical notes covering the route from the origin, lodging checks, must-see landmarks, \
baseline budget ranges and documentation requirements. Plain text, one note per line.";

pub struct TripPlanner {
    info: StageInfo,
    toolkit: Toolkit,
}

impl TripPlanner {
    pub fn new(toolkit: Toolkit) -> Self {
        Self {
            info: StageInfo::new(stage::TRIP_PLANNER, ArtifactFamily::Itinerary),
            toolkit,
        }
    }
}

fn alert_label(kind: WeatherAlertKind) -> &'static str {
    match kind {
        WeatherAlertKind::Heat => "heat",
        WeatherAlertKind::Cold => "cold",
        WeatherAlertKind::Rain => "rain",
        WeatherAlertKind::Wind => "wind",
        WeatherAlertKind::Uv => "high UV",
    }
}

fn alert_kinds(weather: Option<&WeatherOutlook>) -> Vec<WeatherAlertKind> {
    let mut kinds: Vec<WeatherAlertKind> = Vec::new();
    for alert in weather.map(|w| w.alerts.as_slice()).unwrap_or_default() {
        if !kinds.contains(&alert.kind) {
            kinds.push(alert.kind);
        }
    }
    kinds
}

fn day_plan(weather: &WeatherOutlook, trip_days: u32) -> Vec<String> {
    weather
        .daily
        .iter()
        .take(trip_days as usize)
        .enumerate()
        .map(|(idx, day)| {
            let kinds: Vec<WeatherAlertKind> = weather
                .alerts
                .iter()
                .filter(|a| a.date == day.date)
                .map(|a| a.kind)
                .collect();
            let advice = if kinds.contains(&WeatherAlertKind::Rain) {
                "keep indoor options ready, rain likely"
            } else if kinds.contains(&WeatherAlertKind::Heat) {
                "sightsee early and late, rest through midday"
            } else if kinds.contains(&WeatherAlertKind::Wind) {
                "skip boat trips and exposed viewpoints"
            } else if kinds.contains(&WeatherAlertKind::Cold) {
                "plan shorter outdoor stretches with warm breaks"
            } else {
                "good window for outdoor sightseeing"
            };
            format!("Day {} ({}): {}", idx + 1, day.date, advice)
        })
        .collect()
}

fn contingency_for(kind: WeatherAlertKind) -> &'static str {
    match kind {
        WeatherAlertKind::Heat => "Heat: move outdoor visits to early morning and keep shaded rest stops",
        WeatherAlertKind::Cold => "Cold: confirm heating at lodging and keep a warm indoor fallback",
        WeatherAlertKind::Rain => "Rain: swap outdoor activities for museums, markets or cafés",
        WeatherAlertKind::Wind => "Wind: expect ferry or cable-car suspensions, keep a land alternative",
        WeatherAlertKind::Uv => "High UV: schedule beach or trek time before 10:00 or after 16:00",
    }
}

/// 上游产物摘要，供推理后端参考
fn findings_brief(weather: Option<&WeatherOutlook>, safety: RiskClassification, kinds: &[WeatherAlertKind]) -> String {
    let mut lines = Vec::new();
    if let Some(w) = weather {
        lines.push(format!("Weather for {}: {} forecast days", w.location, w.daily.len()));
    }
    if !kinds.is_empty() {
        let labels: Vec<&str> = kinds.iter().map(|k| alert_label(*k)).collect();
        lines.push(format!("Weather alerts: {}", labels.join(", ")));
    }
    lines.push(format!("Safety level: {safety}"));
    lines.join("\n")
}

#[async_trait]
impl Specialist for TripPlanner {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    fn depends_on(&self) -> Vec<StageId> {
        vec![
            StageId::from(stage::WEATHER_INTEL),
            StageId::from(stage::LOCAL_NEWS_SAFETY),
            StageId::from(stage::SAFETY_WATCH),
        ]
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let request = ctx.request();
        let Some(destination) = request.destination() else {
            return self.info.failed(FailureKind::MissingInput, "request has no destination");
        };
        let mut caveats = Vec::new();

        for upstream in self.depends_on() {
            match ctx.get(upstream.as_str()) {
                Some(a) if a.status == ArtifactStatus::Completed => {}
                Some(a) if a.status == ArtifactStatus::Degraded => {
                    caveats.push(format!("{} was degraded; related guidance is generic", a.family))
                }
                _ => caveats.push(format!("{upstream} unavailable; plan built without it")),
            }
        }

        let trip_days = request.trip_days.filter(|d| *d > 0).unwrap_or_else(|| {
            caveats.push(format!("Trip length not given; assuming {DEFAULT_TRIP_DAYS} days"));
            DEFAULT_TRIP_DAYS
        });
        let trip_length = TripLength::from_days(trip_days);

        let weather_artifact = ctx.get(stage::WEATHER_INTEL);
        let weather = weather_artifact.as_ref().and_then(|a| a.weather());
        let news = ctx.get(stage::LOCAL_NEWS_SAFETY);
        let advisory = ctx.get(stage::SAFETY_WATCH);
        let verdicts: Vec<&SafetyVerdict> = [news.as_ref(), advisory.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|a| a.safety())
            .collect();
        let safety = RiskClassification::worst(verdicts.iter().map(|v| v.classification))
            .unwrap_or(RiskClassification::Safe);
        let kinds = alert_kinds(weather);

        // 出发前
        let mut before_departure = vec![match request.origin() {
            Some(origin) => format!("Book transport from {origin} to {destination}"),
            None => format!("Decide how you will reach {destination} and book early"),
        }];
        before_departure.push(format!(
            "Reserve lodging for {} night(s) with free cancellation",
            trip_days.saturating_sub(1).max(1)
        ));
        if let Some(date) = request.start_date {
            before_departure.push(format!("Departure on {date}: re-check the forecast 48 hours ahead"));
        }
        if !kinds.is_empty() {
            let labels: Vec<&str> = kinds.iter().map(|k| alert_label(*k)).collect();
            before_departure.push(format!("Weather alerts to plan around: {}", labels.join(", ")));
        }
        if safety > RiskClassification::Safe {
            before_departure.push(format!("Safety level is {safety}; review the advisory actions"));
        }
        if trip_length == TripLength::Long {
            before_departure.push("Arrange mail hold and home security".to_string());
        }

        // 行程中
        let mut during_trip = vec![match trip_length {
            TripLength::Weekend => "Focus on two or three highlights close to your base".to_string(),
            TripLength::Short => "Alternate busy sightseeing days with a slower day".to_string(),
            TripLength::Long => "Build in a rest and laundry day every four to five days".to_string(),
        }];
        if let Some(w) = weather {
            during_trip.extend(day_plan(w, trip_days));
        }
        if !request.preferences.is_empty() {
            during_trip.push(format!("Make time for: {}", request.preferences.join(", ")));
        }
        for verdict in &verdicts {
            for action in &verdict.actions {
                if !during_trip.contains(action) {
                    during_trip.push(action.clone());
                }
            }
        }

        // 返程后
        let mut after_return = vec![
            "Review spending against your budget".to_string(),
            "Back up photos and share reviews of places you liked".to_string(),
        ];
        if trip_length == TripLength::Long {
            after_return.push("Keep a buffer day before returning to work".to_string());
        }

        let mut packing = weather
            .map(|w| w.packing.clone())
            .unwrap_or_else(|| packing_for(&[]));
        packing.push("Copies of ID and booking confirmations".to_string());

        let mut contingencies: Vec<String> = kinds.iter().map(|k| contingency_for(*k).to_string()).collect();
        match safety {
            RiskClassification::Safe => {}
            RiskClassification::Caution => contingencies
                .push("Caution: keep bookings refundable and steer clear of protest areas".to_string()),
            RiskClassification::Avoid => contingencies
                .push("Avoid: consider postponing or choosing an alternative destination".to_string()),
        }

        let prompt = Prompt::new(
            stage::TRIP_PLANNER,
            INSTRUCTION,
            format!("{}\n{}", request.brief(), findings_brief(weather, safety, &kinds)),
        );
        let notes = match self.toolkit.reason(&prompt).await {
            Ok(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
            Err(failure) => {
                caveats.push(format!("Planner notes unavailable ({})", failure.kind()));
                None
            }
        };

        let plan = ItineraryPlan {
            trip_length,
            before_departure,
            during_trip,
            after_return,
            packing,
            contingencies,
            notes,
        };
        let degraded = caveats.iter().any(|c| !c.starts_with("Trip length"));
        tracing::info!(
            stage = %self.info.id,
            trip_length = ?plan.trip_length,
            safety = %safety,
            degraded,
            "itinerary drafted"
        );
        let payload = ArtifactPayload::ItineraryPlan(plan);
        if degraded {
            self.info.degraded(payload, caveats)
        } else {
            self.info.completed_with(payload, caveats)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{Request, ToolFailure, WeatherAlert};
    use crate::specialists::testing::*;
    use crate::specialists::{LocalNewsSafety, SafetyWatch, WeatherIntel};
    use crate::tools::ToolRegistry;

    async fn run_upstream(ctx: &SharedContext, toolkit: &Toolkit) {
        ctx.record(WeatherIntel::new(toolkit.clone(), 5).run(ctx).await).unwrap();
        ctx.record(LocalNewsSafety::new(toolkit.clone(), 4, "en-US").run(ctx).await)
            .unwrap();
        ctx.record(SafetyWatch::new().run(ctx).await).unwrap();
    }

    #[tokio::test]
    async fn test_full_plan_with_calm_inputs() {
        let toolkit = calm_toolkit();
        let request = Request::new("beach break")
            .with_destination("Goa")
            .with_origin("Pune")
            .with_trip_days(5)
            .with_preference("seafood");
        let ctx = SharedContext::new(Arc::new(request));
        run_upstream(&ctx, &toolkit).await;

        let artifact = TripPlanner::new(toolkit).run(&ctx).await;
        assert_eq!(artifact.status, ArtifactStatus::Completed);
        let plan = artifact.itinerary().unwrap();
        assert_eq!(plan.trip_length, TripLength::Short);
        assert!(plan.before_departure[0].contains("from Pune to Goa"));
        assert!(plan.during_trip.iter().any(|d| d.starts_with("Day 5")));
        assert!(plan.during_trip.iter().any(|d| d.contains("seafood")));
        assert!(plan.contingencies.is_empty());
        assert!(plan.notes.as_deref().unwrap().contains("Pune"));
    }

    #[tokio::test]
    async fn test_rain_alert_and_reasoner_failure_degrade() {
        let mut registry = ToolRegistry::new();
        registry.register(StubWeather {
            daily: vec![day(1, 30.0, 22.0, 80.0), day(2, 29.0, 21.0, 20.0)],
        });
        registry.register(StubNews {
            titles: vec!["Transport strike called for Monday"],
        });
        let reasoner = ScriptedReasoner::failing(stage::TRIP_PLANNER, ToolFailure::Unavailable("down".into()));
        let toolkit = toolkit_with(registry, Arc::new(reasoner));
        let ctx = SharedContext::new(Arc::new(
            Request::new("trip").with_destination("Kochi").with_trip_days(2),
        ));
        run_upstream(&ctx, &toolkit).await;

        let artifact = TripPlanner::new(toolkit).run(&ctx).await;
        assert_eq!(artifact.status, ArtifactStatus::Degraded);
        let plan = artifact.itinerary().unwrap();
        assert_eq!(plan.trip_length, TripLength::Weekend);
        assert!(plan.during_trip[1].contains("rain likely"));
        assert!(plan.contingencies.iter().any(|c| c.starts_with("Rain")));
        assert!(plan.contingencies.iter().any(|c| c.starts_with("Caution")));
        assert!(plan.notes.is_none());
    }

    #[tokio::test]
    async fn test_missing_upstream_is_degraded_not_failed() {
        let ctx = SharedContext::new(Arc::new(Request::new("trip").with_destination("Goa")));
        let artifact = TripPlanner::new(calm_toolkit()).run(&ctx).await;
        assert_eq!(artifact.status, ArtifactStatus::Degraded);
        assert_eq!(artifact.caveats.iter().filter(|c| c.contains("unavailable")).count(), 3);
        assert!(!artifact.itinerary().unwrap().packing.is_empty());
    }

    #[test]
    fn test_day_plan_uses_alert_dates() {
        let outlook = WeatherOutlook {
            location: "Jaipur".into(),
            current: None,
            daily: vec![day(1, 38.0, 25.0, 0.0), day(2, 30.0, 20.0, 0.0)],
            alerts: vec![WeatherAlert {
                date: "2026-11-01".into(),
                kind: WeatherAlertKind::Heat,
                detail: "High of 38°C".into(),
            }],
            packing: vec![],
            source: "stub".into(),
        };
        let days = day_plan(&outlook, 7);
        assert_eq!(days.len(), 2);
        assert!(days[0].contains("midday"));
        assert!(days[1].contains("outdoor sightseeing"));
    }
}
