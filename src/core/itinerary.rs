//! 行程协调器：依赖驱动的扇出/扇入
//!
//! 行程生成依赖五个前置智能体的输出；每个键按会话备忘（缓存命中绝不重算，
//! 即便上游输入已变化）。五段齐备后拼结构化提示词调用行程智能体，
//! 失败时降级为道歉文案而不是向上抛错。full_planning 与 itinerary 同路。

use std::sync::Arc;

use crate::agents::{AgentInvoker, AgentRole};
use crate::core::Session;

/// 行程的五个依赖键（解析顺序固定）
pub const DEPENDENCIES: [AgentRole; 5] = [
    AgentRole::TravelResearch,
    AgentRole::WeatherAdvice,
    AgentRole::TransportAdvice,
    AgentRole::HotelRecommendation,
    AgentRole::BudgetOptimizer,
];

const DEGRADED_ITINERARY: &str =
    "Sorry, could not generate the full itinerary, but here's what I have.";

/// 依赖键对应的提示词段落标签与缺省文案
fn section(role: AgentRole) -> (&'static str, &'static str) {
    match role {
        AgentRole::TravelResearch => ("Travel Research", "No travel research available."),
        AgentRole::WeatherAdvice => ("Weather", "No weather advice available."),
        AgentRole::TransportAdvice => ("Transport", "No transport advice available."),
        AgentRole::HotelRecommendation => ("Hotels", "No hotel recommendations available."),
        AgentRole::BudgetOptimizer => ("Budget", "No budget optimization available."),
        _ => ("", ""),
    }
}

/// 行程协调器
pub struct ItineraryCoordinator {
    invoker: Arc<AgentInvoker>,
}

impl ItineraryCoordinator {
    pub fn new(invoker: Arc<AgentInvoker>) -> Self {
        Self { invoker }
    }

    /// 构建行程：逐键解析依赖（纯备忘），再调用行程智能体
    pub async fn build(&self, prompt: &str, session: &mut Session, past_context: &str) -> String {
        for role in DEPENDENCIES {
            if session.cache.contains(role) {
                continue;
            }
            let text = self
                .invoker
                .run_or_degrade(role, prompt, &session.context, past_context)
                .await;
            session.cache.fill(role, text);
        }

        let sections: Vec<(&str, String)> = DEPENDENCIES
            .iter()
            .map(|role| {
                let (label, default) = section(*role);
                let text = session
                    .cache
                    .get(*role)
                    .map(str::to_string)
                    .unwrap_or_else(|| default.to_string());
                (label, text)
            })
            .collect();

        let itinerary = match self.invoker.run_itinerary(prompt, &sections).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "itinerary generation failed, degrading");
                DEGRADED_ITINERARY.to_string()
            }
        };
        session.cache.fill(AgentRole::Itinerary, itinerary.clone());
        itinerary
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::llm::LlmClient;
    use crate::memory::Message;
    use crate::tools::{ToolExecutor, ToolRegistry};

    /// 计数 LLM 替身：每次 complete 计一次
    struct CountingLlm {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("output {n}"))
        }
    }

    fn coordinator_with_counter() -> (ItineraryCoordinator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let llm = Arc::new(CountingLlm { calls: calls.clone() });
        let executor = Arc::new(ToolExecutor::new(ToolRegistry::new(), 1));
        (
            ItineraryCoordinator::new(Arc::new(AgentInvoker::new(llm, executor))),
            calls,
        )
    }

    #[tokio::test]
    async fn test_cold_build_invokes_each_dependency_once() {
        let (coordinator, calls) = coordinator_with_counter();
        let mut session = Session::new("u1");

        coordinator.build("plan my trip", &mut session, "").await;

        // 五个依赖 + 行程生成本身
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        for role in DEPENDENCIES {
            assert!(session.cache.contains(role));
        }
        assert!(session.cache.contains(AgentRole::Itinerary));
    }

    #[tokio::test]
    async fn test_warm_build_is_pure_memoization() {
        let (coordinator, calls) = coordinator_with_counter();
        let mut session = Session::new("u1");

        coordinator.build("plan my trip", &mut session, "").await;
        let cold_calls = calls.load(Ordering::SeqCst);

        // 上下文变了也不重算依赖（纯备忘）
        session.context.destination = Some("Somewhere Else".to_string());
        coordinator.build("plan my trip again", &mut session, "").await;

        // 第二轮只有行程生成一次调用，依赖零调用
        assert_eq!(calls.load(Ordering::SeqCst), cold_calls + 1);
    }
}
