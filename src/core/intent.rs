//! 意图分类：自由文本 + 当前上下文 -> 固定意图集合
//!
//! 分类器是一张按序求值的 (谓词, 意图) 规则表，首个命中者胜出；永远返回值
//! （默认 Overview），无失败路径。规则间互斥性完全由表序决定。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::TripContext;

/// 用户意图（封闭集合）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    HotelBooking,
    Weather,
    Transport,
    Hotels,
    Budget,
    Itinerary,
    /// 调度上与 Itinerary 等价
    FullPlanning,
    Overview,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::HotelBooking => "hotel_booking",
            Intent::Weather => "weather",
            Intent::Transport => "transport",
            Intent::Hotels => "hotels",
            Intent::Budget => "budget",
            Intent::Itinerary => "itinerary",
            Intent::FullPlanning => "full_planning",
            Intent::Overview => "overview",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn contains_any(s: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| s.contains(k))
}

fn wants_booking(s: &str) -> bool {
    contains_any(s, &["book", "reserve"])
}

fn confirms_booking(s: &str) -> bool {
    contains_any(s, &["yes", "confirm", "book it"])
}

/// 酒店关键词命中且其后不再出现 "book"（regex crate 无前瞻，按命中位置判断）；
/// "recommend hotel" 不受该限制
fn hotels_without_booking(s: &str) -> bool {
    const GUARDED: [&str; 4] = ["hotel", "accommodation", "stay", "where to stay"];
    for kw in GUARDED {
        let mut from = 0;
        while let Some(i) = s[from..].find(kw) {
            let end = from + i + kw.len();
            if !s[end..].contains("book") {
                return true;
            }
            from += i + 1;
        }
    }
    s.contains("recommend hotel")
}

type Predicate = fn(&str, &TripContext) -> bool;

/// 规则表：顺序即优先级
const RULES: &[(Predicate, Intent)] = &[
    // 预订语句且酒店已知（或确认挂起）
    (
        |s, ctx| wants_booking(s) && (ctx.hotel_name.is_some() || ctx.booking_pending_confirmation),
        Intent::HotelBooking,
    ),
    // 确认挂起时的肯定答复，与酒店名是否在句中无关
    (
        |s, ctx| ctx.booking_pending_confirmation && confirms_booking(s),
        Intent::HotelBooking,
    ),
    (
        |s, _| contains_any(s, &["weather", "climate", "temperature", "rain"]),
        Intent::Weather,
    ),
    (
        |s, _| contains_any(s, &["transport", "how to reach", "getting there"]),
        Intent::Transport,
    ),
    (|s, _| hotels_without_booking(s), Intent::Hotels),
    (
        |s, _| contains_any(s, &["budget", "cost", "price", "expense"]),
        Intent::Budget,
    ),
    (
        |s, _| contains_any(s, &["itinerary", "plan", "schedule", "day by day"]),
        Intent::Itinerary,
    ),
    (
        |s, _| contains_any(s, &["plan everything", "complete planning", "full trip"]),
        Intent::FullPlanning,
    ),
];

/// 分类意图：首个命中规则胜出，无命中时为 Overview
pub fn classify(raw_text: &str, context: &TripContext) -> Intent {
    let s = raw_text.to_lowercase();
    RULES
        .iter()
        .find(|(predicate, _)| predicate(&s, context))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Overview)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TripContext {
        TripContext::default()
    }

    #[test]
    fn test_keyword_intents() {
        assert_eq!(classify("what's the weather like", &ctx()), Intent::Weather);
        assert_eq!(classify("how to reach manali", &ctx()), Intent::Transport);
        assert_eq!(classify("where to stay in goa", &ctx()), Intent::Hotels);
        assert_eq!(classify("what will this cost", &ctx()), Intent::Budget);
        assert_eq!(classify("make me a day by day schedule", &ctx()), Intent::Itinerary);
        assert_eq!(classify("give me the full trip", &ctx()), Intent::FullPlanning);
        assert_eq!(classify("tell me about manali", &ctx()), Intent::Overview);
    }

    #[test]
    fn test_first_match_wins() {
        // weather 规则先于 budget
        assert_eq!(
            classify("will rain affect the cost", &ctx()),
            Intent::Weather
        );
        // "plan everything" 含 "plan"，被 itinerary 规则先截获（调度等价，无行为差异）
        assert_eq!(classify("plan everything", &ctx()), Intent::Itinerary);
    }

    #[test]
    fn test_booking_requires_known_hotel_or_pending() {
        // 无酒店名、无挂起：落到 hotels 推荐
        assert_eq!(classify("book a hotel in goa", &ctx()), Intent::Hotels);

        let with_hotel = TripContext {
            hotel_name: Some("Taj Palace".to_string()),
            ..Default::default()
        };
        assert_eq!(classify("book it", &with_hotel), Intent::HotelBooking);
    }

    #[test]
    fn test_pending_confirmation_routes_affirmative() {
        let pending = TripContext {
            booking_pending_confirmation: true,
            ..Default::default()
        };
        assert_eq!(classify("yes", &pending), Intent::HotelBooking);
        assert_eq!(classify("confirm", &pending), Intent::HotelBooking);
        // 非确认答复不走规则 2，落回关键词/默认
        assert_eq!(classify("actually tell me about goa", &pending), Intent::Overview);
    }

    #[test]
    fn test_hotel_keyword_followed_by_book_is_not_hotels() {
        // "hotel" 之后出现 "book"：推荐规则让位
        assert_eq!(
            classify("which hotel should i book", &ctx()),
            Intent::Overview
        );
    }
}
