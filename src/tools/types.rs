//! 工具请求 / 响应类型

use crate::core::{CurrentConditions, DailyForecast, Headline};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub location: String,
    /// 覆盖天数，适配器内收敛到 1..=7
    pub days: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub location: String,
    pub max_items: usize,
    /// 语言 / 地区代码，如 en-US
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolQuery {
    Weather(WeatherQuery),
    News(NewsQuery),
}

impl ToolQuery {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolQuery::Weather(_) => "weather",
            ToolQuery::News(_) => "news",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// 地理编码后的规范地名
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DailyForecast>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsBrief {
    pub location: String,
    pub headlines: Vec<Headline>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolResponse {
    Weather(WeatherReport),
    News(NewsBrief),
}
