//! 会话状态：行程上下文 + 智能体输出缓存 + 会话历史
//!
//! 全部会话私有，无跨会话共享的可变状态；会话存活期内不销毁。

use std::collections::HashMap;

use uuid::Uuid;

use crate::agents::AgentRole;
use crate::core::TripContext;
use crate::memory::ConversationMemory;

/// 智能体输出缓存：每键至多填充一次（备忘录，不是日志），当前范围内不失效
#[derive(Clone, Debug, Default)]
pub struct AgentOutputCache {
    outputs: HashMap<AgentRole, String>,
}

impl AgentOutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: AgentRole) -> Option<&str> {
        self.outputs.get(&role).map(|s| s.as_str())
    }

    pub fn contains(&self, role: AgentRole) -> bool {
        self.outputs.contains_key(&role)
    }

    /// 仅在键缺席时写入（至多一次语义）
    pub fn fill(&mut self, role: AgentRole, text: String) {
        self.outputs.entry(role).or_insert(text);
    }

    /// 已完成的智能体键列表（上下文摘要展示用）
    pub fn completed_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.outputs.keys().map(|r| r.key()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// 单个用户会话：回合间保持的全部可变状态
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub context: TripContext,
    pub cache: AgentOutputCache,
    pub history: ConversationMemory,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            context: TripContext::default(),
            cache: AgentOutputCache::new(),
            history: ConversationMemory::new(),
        }
    }

    /// 会话引导：首回合前用表单式输入播种上下文（travelers 钳到 ≥1）
    pub fn bootstrap(
        &mut self,
        destination: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
        travelers: u32,
    ) {
        self.context.destination = destination.filter(|d| !d.is_empty());
        self.context.start_date = start_date.filter(|d| !d.is_empty());
        self.context.end_date = end_date.filter(|d| !d.is_empty());
        self.context.travelers = travelers.max(1);
    }

    /// 行程上下文 + 已完成智能体的摘要（REPL 每回合附带展示）
    pub fn context_summary(&self) -> String {
        let mut summary = self.context.summary();
        let completed = self.cache.completed_keys();
        if !completed.is_empty() {
            summary.push_str("\nCompleted agents: ");
            summary.push_str(&completed.join(", "));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_fill_is_at_most_once() {
        let mut cache = AgentOutputCache::new();
        cache.fill(AgentRole::WeatherAdvice, "first".to_string());
        cache.fill(AgentRole::WeatherAdvice, "second".to_string());
        assert_eq!(cache.get(AgentRole::WeatherAdvice), Some("first"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_bootstrap_seeds_context() {
        let mut session = Session::new("u1");
        session.bootstrap(
            Some("Manali".to_string()),
            Some("2025-09-10".to_string()),
            Some("2025-09-15".to_string()),
            0,
        );
        assert_eq!(session.context.destination.as_deref(), Some("Manali"));
        assert_eq!(session.context.travelers, 1);
    }

    #[test]
    fn test_summary_lists_completed_agents() {
        let mut session = Session::new("u1");
        session.cache.fill(AgentRole::TravelResearch, "notes".to_string());
        assert!(session.context_summary().contains("Completed agents: travel_research"));
    }
}
