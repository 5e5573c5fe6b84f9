//! 智能体角色：缓存键、展示名与角色提示词

use serde::{Deserialize, Serialize};

/// 智能体角色（同时充当 AgentOutputCache 的键）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    TravelResearch,
    WeatherAdvice,
    TransportAdvice,
    HotelRecommendation,
    BudgetOptimizer,
    Itinerary,
    HotelBooking,
}

impl AgentRole {
    /// 固定缓存键
    pub fn key(&self) -> &'static str {
        match self {
            AgentRole::TravelResearch => "travel_research",
            AgentRole::WeatherAdvice => "weather_advice",
            AgentRole::TransportAdvice => "transport_advice",
            AgentRole::HotelRecommendation => "hotel_recommendation",
            AgentRole::BudgetOptimizer => "budget_optimizer",
            AgentRole::Itinerary => "itinerary",
            AgentRole::HotelBooking => "hotel_booking",
        }
    }

    /// 降级文案里的能力描述
    pub fn describe(&self) -> &'static str {
        match self {
            AgentRole::TravelResearch => "travel research",
            AgentRole::WeatherAdvice => "weather advice",
            AgentRole::TransportAdvice => "transport advice",
            AgentRole::HotelRecommendation => "hotel recommendations",
            AgentRole::BudgetOptimizer => "budget optimization",
            AgentRole::Itinerary => "the itinerary",
            AgentRole::HotelBooking => "hotel booking",
        }
    }

    /// 角色系统提示词（LLM 侧的 persona）
    pub fn system_prompt(&self) -> &'static str {
        match self {
            AgentRole::TravelResearch => {
                "You are a senior travel analyst. Discover top attractions, hidden gems, local \
                 neighborhoods, seasonal highlights, food must-tries, and practical tips for any \
                 destination. Present results as one continuous natural-language paragraph \
                 without sections, bullet points, or lists."
            }
            AgentRole::WeatherAdvice => {
                "You are a weather advisor for travelers. Given a destination, dates, and an \
                 optional raw forecast, produce a quick summary, daily outlook, activity advice, \
                 and an explicit travel-safety assessment ('Safe'/'Unsafe'), as readable prose."
            }
            AgentRole::TransportAdvice => {
                "You are a transport planner. Recommend how to get from the origin to the \
                 destination, comparing the traveler's preferred mode against alternatives on \
                 time, cost, and comfort."
            }
            AgentRole::HotelRecommendation => {
                "You are a hotel concierge. Recommend accommodation options for the destination \
                 that fit the stated budget, covering location, price band, and who each option \
                 suits best."
            }
            AgentRole::BudgetOptimizer => {
                "You are a travel budget optimizer. Split the total budget across stay, food, \
                 transport, and activities, and point out where to save without hurting the \
                 experience."
            }
            AgentRole::Itinerary => {
                "You are an itinerary planner creating a day-by-day travel plan. Write the \
                 complete itinerary in a natural, narrative style, each day in paragraph form \
                 like a travel blog. Do not use JSON, bullet points, or lists."
            }
            AgentRole::HotelBooking => {
                "You are a hotel booking specialist. Confirm booking details and report the \
                 confirmation number."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(AgentRole::TravelResearch.key(), "travel_research");
        assert_eq!(AgentRole::HotelRecommendation.key(), "hotel_recommendation");
        assert_eq!(AgentRole::HotelBooking.key(), "hotel_booking");
    }
}
