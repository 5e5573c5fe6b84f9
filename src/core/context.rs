//! 行程上下文：会话内逐回合累积的槽位集合
//!
//! 合并策略为「只填充」：新抽取的非空值覆盖旧值，空值从不清除已有值；
//! 唯一的例外是预订状态机对 booking_pending_confirmation 的显式迁移。

use serde::{Deserialize, Serialize};

use crate::core::Intent;

/// 交通方式偏好
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Car,
    Flight,
    Train,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Flight => "flight",
            TravelMode::Train => "train",
        }
    }
}

/// 会话级行程上下文（每会话一份，随回合可变）
///
/// travelers 默认 1；抽取可能产生 0（如 "0 people"），由预订状态机按缺槽处理，
/// 会话引导（bootstrap）处会钳到 ≥1。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripContext {
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// ISO-8601（YYYY-MM-DD）
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub travel_mode_preference: Option<TravelMode>,
    pub budget_total: Option<u64>,
    pub travelers: u32,
    pub hotel_name: Option<String>,
    pub booking_pending_confirmation: bool,
    pub last_query_intent: Intent,
}

impl Default for TripContext {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            start_date: None,
            end_date: None,
            check_in_date: None,
            check_out_date: None,
            travel_mode_preference: None,
            budget_total: None,
            travelers: 1,
            hotel_name: None,
            booking_pending_confirmation: false,
            last_query_intent: Intent::Overview,
        }
    }
}

/// 单次抽取的部分上下文：只含本回合新发现的槽位
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialContext {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub travel_mode_preference: Option<TravelMode>,
    pub budget_total: Option<u64>,
    pub travelers: Option<u32>,
    pub hotel_name: Option<String>,
}

impl TripContext {
    /// 只填充合并：仅覆盖抽取到的非空字段
    pub fn merge(&mut self, partial: PartialContext) {
        if let Some(v) = partial.origin {
            self.origin = Some(v);
        }
        if let Some(v) = partial.destination {
            self.destination = Some(v);
        }
        if let Some(v) = partial.start_date {
            self.start_date = Some(v);
        }
        if let Some(v) = partial.end_date {
            self.end_date = Some(v);
        }
        if let Some(v) = partial.check_in_date {
            self.check_in_date = Some(v);
        }
        if let Some(v) = partial.check_out_date {
            self.check_out_date = Some(v);
        }
        if let Some(v) = partial.travel_mode_preference {
            self.travel_mode_preference = Some(v);
        }
        if let Some(v) = partial.budget_total {
            self.budget_total = Some(v);
        }
        if let Some(v) = partial.travelers {
            self.travelers = v;
        }
        if let Some(v) = partial.hotel_name {
            self.hotel_name = Some(v);
        }
    }

    /// 已填充槽位的可读摘要（REPL 每回合展示）
    pub fn summary(&self) -> String {
        let mut lines = vec!["Trip context:".to_string()];
        let mut field = |name: &str, value: Option<&str>| {
            if let Some(v) = value {
                lines.push(format!("- {name}: {v}"));
            }
        };
        field("origin", self.origin.as_deref());
        field("destination", self.destination.as_deref());
        field("start_date", self.start_date.as_deref());
        field("end_date", self.end_date.as_deref());
        field("check_in_date", self.check_in_date.as_deref());
        field("check_out_date", self.check_out_date.as_deref());
        field(
            "travel_mode",
            self.travel_mode_preference.map(|m| m.as_str()),
        );
        let budget = self.budget_total.map(|b| b.to_string());
        field("budget_total", budget.as_deref());
        field("hotel_name", self.hotel_name.as_deref());
        lines.push(format!("- travelers: {}", self.travelers));
        if self.booking_pending_confirmation {
            lines.push("- booking: awaiting confirmation".to_string());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_fill_only() {
        let mut ctx = TripContext {
            destination: Some("Manali".to_string()),
            ..Default::default()
        };
        ctx.merge(PartialContext {
            origin: Some("Delhi".to_string()),
            destination: None,
            ..Default::default()
        });
        // 抽取未覆盖的字段保持不变，空值不会清除已有值
        assert_eq!(ctx.destination.as_deref(), Some("Manali"));
        assert_eq!(ctx.origin.as_deref(), Some("Delhi"));
        assert_eq!(ctx.travelers, 1);
    }

    #[test]
    fn test_merge_overwrites_with_new_value() {
        let mut ctx = TripContext {
            budget_total: Some(1000),
            ..Default::default()
        };
        ctx.merge(PartialContext {
            budget_total: Some(2500),
            travelers: Some(3),
            ..Default::default()
        });
        assert_eq!(ctx.budget_total, Some(2500));
        assert_eq!(ctx.travelers, 3);
    }

    #[test]
    fn test_summary_lists_only_set_fields() {
        let ctx = TripContext {
            destination: Some("Goa".to_string()),
            ..Default::default()
        };
        let s = ctx.summary();
        assert!(s.contains("destination: Goa"));
        assert!(!s.contains("origin"));
        assert!(s.contains("travelers: 1"));
    }
}
