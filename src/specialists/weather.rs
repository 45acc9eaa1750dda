//! 天气情报专家
//!
//! 拉取目的地预报，按阈值生成逐日预警（高温 / 低温 / 降水 / 大风 / 紫外线）与打包建议。
//! 工具不可用时以通用打包清单降级；请求缺少目的地时失败。

use async_trait::async_trait;

use crate::core::{
    Artifact, ArtifactFamily, ArtifactPayload, DailyForecast, FailureKind, SharedContext, StageInfo,
    WeatherAlert, WeatherAlertKind, WeatherOutlook,
};
use crate::specialists::{stage, tool, Specialist, Toolkit};
use crate::tools::{ToolQuery, ToolResponse, WeatherQuery};

pub const HEAT_C: f64 = 35.0;
pub const COLD_C: f64 = 0.0;
pub const RAIN_PROBABILITY: f64 = 60.0;
pub const WIND_KMH: f64 = 50.0;
pub const UV_INDEX: f64 = 8.0;

pub struct WeatherIntel {
    info: StageInfo,
    toolkit: Toolkit,
    forecast_days: u8,
}

impl WeatherIntel {
    pub fn new(toolkit: Toolkit, forecast_days: u8) -> Self {
        Self {
            info: StageInfo::new(stage::WEATHER_INTEL, ArtifactFamily::Weather),
            toolkit,
            forecast_days: forecast_days.clamp(1, 7),
        }
    }

    fn days_for(&self, trip_days: Option<u32>) -> u8 {
        match trip_days {
            Some(days) => days.clamp(1, self.forecast_days as u32) as u8,
            None => self.forecast_days,
        }
    }
}

/// 逐日阈值预警
pub fn alerts_for(daily: &[DailyForecast]) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();
    for day in daily {
        let mut push = |kind, detail: String| {
            alerts.push(WeatherAlert {
                date: day.date.clone(),
                kind,
                detail,
            })
        };
        if let Some(t) = day.max_temp_c.filter(|t| *t >= HEAT_C) {
            push(WeatherAlertKind::Heat, format!("High of {t:.0}°C"));
        }
        if let Some(t) = day.min_temp_c.filter(|t| *t <= COLD_C) {
            push(WeatherAlertKind::Cold, format!("Low of {t:.0}°C"));
        }
        if let Some(p) = day.precip_probability.filter(|p| *p >= RAIN_PROBABILITY) {
            push(WeatherAlertKind::Rain, format!("{p:.0}% chance of rain"));
        }
        if let Some(w) = day.wind_speed_max_kmh.filter(|w| *w >= WIND_KMH) {
            push(WeatherAlertKind::Wind, format!("Gusts up to {w:.0} km/h"));
        }
        if let Some(uv) = day.uv_index_max.filter(|uv| *uv >= UV_INDEX) {
            push(WeatherAlertKind::Uv, format!("UV index {uv:.0}"));
        }
    }
    alerts
}

/// 基础打包清单 + 预警对应物品（去重，顺序固定）
pub fn packing_for(alerts: &[WeatherAlert]) -> Vec<String> {
    let mut packing = vec![
        "Comfortable walking shoes".to_string(),
        "Reusable water bottle".to_string(),
        "Phone charger and power bank".to_string(),
    ];
    let extras = [
        (WeatherAlertKind::Heat, "Light breathable clothing and electrolyte sachets"),
        (WeatherAlertKind::Cold, "Insulated layers, gloves and a warm hat"),
        (WeatherAlertKind::Rain, "Compact umbrella and a waterproof jacket"),
        (WeatherAlertKind::Wind, "Windproof outer layer"),
        (WeatherAlertKind::Uv, "SPF 50 sunscreen, sunglasses and a sun hat"),
    ];
    for (kind, item) in extras {
        if alerts.iter().any(|a| a.kind == kind) {
            packing.push(item.to_string());
        }
    }
    packing
}

#[async_trait]
impl Specialist for WeatherIntel {
    fn info(&self) -> &StageInfo {
        &self.info
    }

    fn required_tools(&self) -> Vec<&'static str> {
        vec![tool::WEATHER]
    }

    async fn run(&self, ctx: &SharedContext) -> Artifact {
        let request = ctx.request();
        let Some(destination) = request.destination() else {
            return self.info.failed(FailureKind::MissingInput, "request has no destination");
        };
        let query = ToolQuery::Weather(WeatherQuery {
            location: destination.to_string(),
            days: self.days_for(request.trip_days),
        });

        match self.toolkit.call_tool(tool::WEATHER, query).await {
            Ok(ToolResponse::Weather(report)) => {
                let alerts = alerts_for(&report.daily);
                let no_days = report.daily.is_empty();
                let outlook = WeatherOutlook {
                    location: report.location,
                    current: report.current,
                    packing: packing_for(&alerts),
                    daily: report.daily,
                    alerts,
                    source: report.source,
                };
                tracing::info!(
                    stage = %self.info.id,
                    location = %outlook.location,
                    days = outlook.daily.len(),
                    alerts = outlook.alerts.len(),
                    "weather outlook ready"
                );
                let payload = ArtifactPayload::WeatherOutlook(outlook);
                if no_days {
                    self.info
                        .degraded(payload, vec!["Forecast returned no daily outlook".to_string()])
                } else {
                    self.info.completed(payload)
                }
            }
            Ok(_) => self.fallback(destination, "weather tool returned a non-weather payload".to_string()),
            Err(failure) => self.fallback(
                destination,
                format!("Weather data unavailable ({}): {}", failure.kind(), failure.detail()),
            ),
        }
    }
}

impl WeatherIntel {
    fn fallback(&self, destination: &str, caveat: String) -> Artifact {
        tracing::warn!(stage = %self.info.id, caveat = %caveat, "weather degraded to generic guidance");
        let outlook = WeatherOutlook {
            location: destination.to_string(),
            current: None,
            daily: Vec::new(),
            alerts: Vec::new(),
            packing: packing_for(&[]),
            source: "generic guidance".to_string(),
        };
        self.info.degraded(
            ArtifactPayload::WeatherOutlook(outlook),
            vec![caveat, "Check a local forecast before departure".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    use super::*;
    use crate::core::{ArtifactStatus, Request};
    use crate::llm::TemplateReasoner;
    use crate::specialists::testing::*;
    use crate::tools::ToolRegistry;

    fn ctx(request: Request) -> SharedContext {
        SharedContext::new(Arc::new(request))
    }

    #[test]
    fn test_alert_thresholds() {
        let mut stormy = day(2, 36.0, -1.0, 60.0);
        stormy.uv_index_max = Some(8.0);
        stormy.wind_speed_max_kmh = Some(55.0);
        let alerts = alerts_for(&[day(1, 30.0, 20.0, 59.0), stormy]);
        let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WeatherAlertKind::Heat,
                WeatherAlertKind::Cold,
                WeatherAlertKind::Rain,
                WeatherAlertKind::Wind,
                WeatherAlertKind::Uv
            ]
        );
        assert!(alerts.iter().all(|a| a.date == "2026-11-02"));

        let packing = packing_for(&alerts);
        assert_eq!(packing.len(), 8);
        assert!(packing.iter().any(|p| p.contains("umbrella")));
    }

    #[tokio::test]
    async fn test_completed_outlook_respects_trip_days() {
        let intel = WeatherIntel::new(calm_toolkit(), 5);
        let artifact = intel
            .run(&ctx(Request::new("trip").with_destination("Goa").with_trip_days(3)))
            .await;
        assert_eq!(artifact.status, ArtifactStatus::Completed);
        let outlook = artifact.weather().unwrap();
        assert_eq!(outlook.daily.len(), 3);
        assert!(outlook.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_tool_degrades() {
        let mut registry = ToolRegistry::new();
        registry.register(DownTool {
            name: tool::WEATHER,
            calls: Arc::new(AtomicU32::new(0)),
        });
        let intel = WeatherIntel::new(toolkit_with(registry, Arc::new(TemplateReasoner::new())), 5);
        let artifact = intel.run(&ctx(Request::new("trip").with_destination("Goa"))).await;
        assert_eq!(artifact.status, ArtifactStatus::Degraded);
        assert!(artifact.caveats[0].contains("unavailable"));
        assert!(!artifact.weather().unwrap().packing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_destination_fails() {
        let intel = WeatherIntel::new(calm_toolkit(), 5);
        let artifact = intel.run(&ctx(Request::new("somewhere warm"))).await;
        assert!(artifact.is_failed());
        assert_eq!(artifact.failure.unwrap().kind, FailureKind::MissingInput);
    }
}
