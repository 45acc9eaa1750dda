//! Open-Meteo 天气工具
//!
//! 先地理编码（取首个结果），再拉取当前天气与逐日预报。
//! 网络 / HTTP 错误 → Unavailable；响应无法解析 → InvalidResponse。

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::core::{CurrentConditions, DailyForecast, ToolFailure};
use crate::tools::types::{ToolQuery, ToolResponse, WeatherQuery, WeatherReport};
use crate::tools::ToolAdapter;

pub const DEFAULT_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset,uv_index_max,wind_speed_10m_max,precipitation_sum";

pub struct OpenMeteoTool {
    client: Client,
    geocode_url: String,
    forecast_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodeHit>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    name: Option<String>,
    admin1: Option<String>,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeather>,
    #[serde(default)]
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
    time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailySeries {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    uv_index_max: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
    sunrise: Vec<Option<String>>,
    sunset: Vec<Option<String>>,
}

/// 解析地理编码响应，返回 (纬度, 经度, 规范地名)
fn parse_geocode(body: &str, location: &str) -> Result<(f64, f64, String), ToolFailure> {
    let payload: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| ToolFailure::InvalidResponse(format!("geocode: {e}")))?;
    let hit = payload
        .results
        .and_then(|mut hits| if hits.is_empty() { None } else { Some(hits.swap_remove(0)) })
        .ok_or_else(|| ToolFailure::Unavailable(format!("Unable to geocode location '{location}'")))?;
    let resolved = [hit.name, hit.admin1, hit.country]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    Ok((hit.latitude, hit.longitude, resolved))
}

fn nth<T: Clone>(series: &[Option<T>], idx: usize) -> Option<T> {
    series.get(idx).cloned().flatten()
}

/// 解析预报响应，保留前 days 天
fn parse_forecast(
    body: &str,
    days: usize,
) -> Result<(Option<CurrentConditions>, Vec<DailyForecast>), ToolFailure> {
    let payload: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| ToolFailure::InvalidResponse(format!("forecast: {e}")))?;

    let current = payload.current_weather.map(|c| CurrentConditions {
        temperature_c: c.temperature,
        windspeed_kmh: c.windspeed,
        weather_code: c.weathercode,
        observation_time: c.time,
    });

    let daily = payload.daily.unwrap_or_default();
    let available = days.min(daily.time.len());
    let forecast = (0..available)
        .map(|idx| DailyForecast {
            date: daily.time[idx].clone(),
            max_temp_c: nth(&daily.temperature_2m_max, idx),
            min_temp_c: nth(&daily.temperature_2m_min, idx),
            precip_probability: nth(&daily.precipitation_probability_max, idx),
            precipitation_mm: nth(&daily.precipitation_sum, idx),
            uv_index_max: nth(&daily.uv_index_max, idx),
            wind_speed_max_kmh: nth(&daily.wind_speed_10m_max, idx),
            sunrise: nth(&daily.sunrise, idx),
            sunset: nth(&daily.sunset, idx),
        })
        .collect();

    Ok((current, forecast))
}

fn transport_error(stage: &str, err: reqwest::Error) -> ToolFailure {
    if err.is_timeout() {
        ToolFailure::Timeout(format!("{stage}: {err}"))
    } else {
        ToolFailure::Unavailable(format!("{stage}: {err}"))
    }
}

impl OpenMeteoTool {
    pub fn new(geocode_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("hive-trip-assistant/0.1")
            .build()
            .unwrap_or_default();
        Self {
            client,
            geocode_url: geocode_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    async fn get_text(&self, stage: &str, request: reqwest::RequestBuilder) -> Result<String, ToolFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(stage, e))?
            .error_for_status()
            .map_err(|e| transport_error(stage, e))?;
        response.text().await.map_err(|e| transport_error(stage, e))
    }

    async fn fetch(&self, query: WeatherQuery) -> Result<WeatherReport, ToolFailure> {
        let location = query.location.trim();
        if location.is_empty() {
            return Err(ToolFailure::Unavailable("location is required".to_string()));
        }
        let days = query.days.clamp(1, 7);

        let body = self
            .get_text(
                "geocode",
                self.client.get(&self.geocode_url).query(&[
                    ("name", location),
                    ("count", "1"),
                    ("language", "en"),
                    ("format", "json"),
                ]),
            )
            .await?;
        let (latitude, longitude, resolved) = parse_geocode(&body, location)?;

        let body = self
            .get_text(
                "forecast",
                self.client.get(&self.forecast_url).query(&[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                    ("timezone", "auto".to_string()),
                    ("current_weather", "true".to_string()),
                    ("forecast_days", days.to_string()),
                    ("daily", DAILY_FIELDS.to_string()),
                ]),
            )
            .await?;
        let (current, daily) = parse_forecast(&body, days as usize)?;

        Ok(WeatherReport {
            location: resolved,
            latitude,
            longitude,
            current,
            daily,
            source: "Open-Meteo (https://open-meteo.com)".to_string(),
        })
    }
}

impl Default for OpenMeteoTool {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCODE_URL, DEFAULT_FORECAST_URL)
    }
}

#[async_trait]
impl ToolAdapter for OpenMeteoTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Short-term weather outlook for a destination (Open-Meteo). Query: location + days (1-7)"
    }

    async fn call(&self, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
        match query {
            ToolQuery::Weather(q) => self.fetch(q).await.map(ToolResponse::Weather),
            other => Err(ToolFailure::InvalidResponse(format!(
                "weather tool cannot answer {} queries",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOCODE: &str = r#"{"results":[{"name":"Jaipur","admin1":"Rajasthan","country":"India","latitude":26.91,"longitude":75.79}]}"#;

    const FORECAST: &str = r#"{
        "current_weather": {"temperature": 31.2, "windspeed": 12.0, "weathercode": 1, "time": "2026-10-18T10:00"},
        "daily": {
            "time": ["2026-10-18", "2026-10-19", "2026-10-20"],
            "temperature_2m_max": [36.1, 33.0, null],
            "temperature_2m_min": [22.0, 21.5, 20.0],
            "precipitation_probability_max": [10, 70, 5],
            "precipitation_sum": [0.0, 12.5, 0.0],
            "uv_index_max": [9.1, 6.0, 7.0],
            "wind_speed_10m_max": [14.0, 22.0, 18.0],
            "sunrise": ["2026-10-18T06:21", "2026-10-19T06:22", "2026-10-20T06:22"],
            "sunset": ["2026-10-18T17:52", "2026-10-19T17:51", "2026-10-20T17:50"]
        }
    }"#;

    #[test]
    fn test_parse_geocode() {
        let (lat, lon, name) = parse_geocode(GEOCODE, "jaipur").unwrap();
        assert!((lat - 26.91).abs() < 1e-9);
        assert!((lon - 75.79).abs() < 1e-9);
        assert_eq!(name, "Jaipur, Rajasthan, India");
    }

    #[test]
    fn test_parse_geocode_no_hit() {
        let err = parse_geocode(r#"{"generationtime_ms": 0.3}"#, "Atlantis").unwrap_err();
        assert!(matches!(err, ToolFailure::Unavailable(msg) if msg.contains("Atlantis")));
    }

    #[test]
    fn test_parse_geocode_malformed() {
        let err = parse_geocode("<html>", "x").unwrap_err();
        assert!(matches!(err, ToolFailure::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_forecast_truncates_days() {
        let (current, daily) = parse_forecast(FORECAST, 2).unwrap();
        assert_eq!(current.unwrap().temperature_c, Some(31.2));
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].max_temp_c, Some(36.1));
        assert_eq!(daily[1].precip_probability, Some(70.0));
        assert_eq!(daily[1].sunset.as_deref(), Some("2026-10-19T17:51"));
    }

    #[test]
    fn test_parse_forecast_null_values() {
        let (_, daily) = parse_forecast(FORECAST, 7).unwrap();
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[2].max_temp_c, None);
    }

    #[tokio::test]
    async fn test_empty_location_rejected_without_request() {
        let tool = OpenMeteoTool::new("http://127.0.0.1:9/geo", "http://127.0.0.1:9/fc");
        let err = tool
            .call(ToolQuery::Weather(WeatherQuery {
                location: "  ".into(),
                days: 5,
            }))
            .await
            .unwrap_err();
        assert_eq!(err, ToolFailure::Unavailable("location is required".into()));
    }
}
