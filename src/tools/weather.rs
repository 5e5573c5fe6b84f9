//! 天气工具：OpenWeather 5 日预报
//!
//! GET /data/2.5/forecast（公制单位），将 3 小时粒度条目按日期聚合为
//! 「日期: 天气概述, 温度区间」的多行文本。API Key 取环境变量 OPEN_WEATHER_API_KEY；
//! 无 Key 或请求失败时返回可读错误文本（Ok 返回），由上层决定降级方式。

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

const DEFAULT_FORECAST_DAYS: usize = 5;

/// 天气工具参数
#[derive(Debug, Deserialize)]
pub struct WeatherArgs {
    /// 城市名，可带国家码，如 "Paris,FR"
    pub city: String,
    /// 预报天数（免费 API 最多 5 天）
    pub days: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: ForecastMain,
    weather: Vec<ForecastWeather>,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastWeather {
    description: String,
}

/// OpenWeather 预报工具：按城市查询多日预报
pub struct WeatherTool {
    client: Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_base_url("https://api.openweathermap.org/data/2.5/forecast", timeout_secs)
    }

    /// 自定义端点（测试用）
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    async fn fetch(&self, city: &str, days: usize) -> Result<String, String> {
        let api_key = std::env::var("OPEN_WEATHER_API_KEY")
            .map_err(|_| "OPEN_WEATHER_API_KEY not set".to_string())?;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", &api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;
        if !resp.status().is_success() {
            return Err(format!("OpenWeather API error: HTTP {}", resp.status()));
        }

        let data: ForecastResponse = resp
            .json()
            .await
            .map_err(|e| format!("Malformed forecast response: {e}"))?;

        Ok(summarize_forecast(&data, days))
    }
}

/// 按日期聚合：每日取温度区间与出现最多的天气描述
fn summarize_forecast(data: &ForecastResponse, days: usize) -> String {
    let mut daily: BTreeMap<String, Vec<(f64, String)>> = BTreeMap::new();
    for entry in &data.list {
        let Some(ts) = DateTime::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let date = ts.format("%Y-%m-%d").to_string();
        if daily.len() >= days && !daily.contains_key(&date) {
            continue;
        }
        let description = entry
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default();
        daily.entry(date).or_default().push((entry.main.temp, description));
    }

    let mut lines = Vec::new();
    for (date, entries) in daily {
        let min = entries.iter().map(|(t, _)| *t).fold(f64::INFINITY, f64::min);
        let max = entries.iter().map(|(t, _)| *t).fold(f64::NEG_INFINITY, f64::max);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, d) in &entries {
            *counts.entry(d.as_str()).or_default() += 1;
        }
        let summary = counts
            .iter()
            .max_by_key(|(_, c)| **c)
            .map(|(d, _)| *d)
            .unwrap_or("");
        lines.push(format!("{date}: {summary}, Temp: {min:.1}C to {max:.1}C"));
    }
    lines.join("\n")
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather_forecast"
    }

    fn description(&self) -> &str {
        "Multi-day weather forecast for a given city via the OpenWeather API."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "City name, e.g. 'Paris,FR'" },
                "days": { "type": "integer", "maximum": 5 }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: WeatherArgs =
            serde_json::from_value(args).map_err(|e| format!("Invalid weather args: {e}"))?;
        let days = args.days.unwrap_or(DEFAULT_FORECAST_DAYS).min(5);
        // 业务失败同样以可读文本返回，交由上层降级
        match self.fetch(&args.city, days).await {
            Ok(text) => Ok(text),
            Err(e) => Ok(format!("Weather forecast unavailable: {e}")),
        }
    }
}
