//! 端到端回合流程测试：抽取、分派、行程备忘与两阶段预订
//!
//! 用计数 LLM 替身与真实预订工具走完整条 Orchestrator 链路，不依赖外部 API。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use tern::core::{Intent, Orchestrator, Session};
use tern::llm::LlmClient;
use tern::memory::{InMemoryStore, Message, MemoryStore, NoopStore};
use tern::tools::{HotelBookingTool, ToolExecutor, ToolRegistry};

/// 计数 LLM 替身：回显系统提示词首词，便于断言角色
struct CountingLlm {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmClient for CountingLlm {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let head: String = system.chars().take(40).collect();
        Ok(format!("[advice from: {head}]"))
    }
}

fn orchestrator_with(memory: Arc<dyn MemoryStore>) -> (Orchestrator, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let llm = Arc::new(CountingLlm {
        calls: calls.clone(),
    });
    let mut registry = ToolRegistry::new();
    registry.register(HotelBookingTool);
    let tools = Arc::new(ToolExecutor::new(registry, 5));
    (Orchestrator::new(llm, tools, memory, 3), calls)
}

#[tokio::test]
async fn test_manali_conversation_accumulates_context() {
    let (orch, calls) = orchestrator_with(Arc::new(NoopStore));
    let mut session = Session::new("u1");

    let first = orch
        .process_turn(
            &mut session,
            "I want to travel to Manali from 10/09/2025 to 15/09/2025 for 2 people",
        )
        .await;
    assert_eq!(first.intent, Intent::Overview);
    assert_eq!(first.context.destination.as_deref(), Some("Manali"));
    assert_eq!(first.context.start_date.as_deref(), Some("2025-09-10"));
    assert_eq!(first.context.end_date.as_deref(), Some("2025-09-15"));
    assert_eq!(first.context.travelers, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // 后续回合不重复提供槽位，上下文仍然保留
    let second = orch.process_turn(&mut session, "how is the weather there").await;
    assert_eq!(second.intent, Intent::Weather);
    assert_eq!(second.context.destination.as_deref(), Some("Manali"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // "from X to Y" 句式补充出发地，走 transport 分派
    let third = orch
        .process_turn(&mut session, "what transport can i take from delhi to manali")
        .await;
    assert_eq!(third.intent, Intent::Transport);
    assert_eq!(third.context.origin.as_deref(), Some("Delhi"));
}

#[tokio::test]
async fn test_itinerary_reuses_cached_agent_outputs() {
    let (orch, calls) = orchestrator_with(Arc::new(NoopStore));
    let mut session = Session::new("u1");
    session.bootstrap(
        Some("Goa".to_string()),
        Some("2025-12-01".to_string()),
        Some("2025-12-05".to_string()),
        2,
    );

    // 先问天气：weather_advice 进缓存
    orch.process_turn(&mut session, "what's the weather like").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // 行程只补缺失的四个依赖 + 行程生成本身
    let outcome = orch.process_turn(&mut session, "plan my trip day by day").await;
    assert_eq!(outcome.intent, Intent::Itinerary);
    assert_eq!(calls.load(Ordering::SeqCst), 1 + 4 + 1);

    // 再要一次行程：全部命中缓存，只有行程生成新调用
    orch.process_turn(&mut session, "show me the itinerary again").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1 + 4 + 1 + 1);
}

#[tokio::test]
async fn test_taj_palace_booking_end_to_end() {
    let (orch, _) = orchestrator_with(Arc::new(NoopStore));
    let mut session = Session::new("u1");

    let details = orch
        .process_turn(
            &mut session,
            "book Taj Palace from 2025-09-10 to 2025-09-15 for 2 guests",
        )
        .await;
    assert_eq!(details.intent, Intent::HotelBooking);
    assert!(details.response.contains("Taj Palace"));
    assert!(details.response.contains("Do you want to confirm this booking?"));
    assert!(details.context.booking_pending_confirmation);

    let confirmed = orch.process_turn(&mut session, "confirm").await;
    assert_eq!(confirmed.intent, Intent::HotelBooking);
    assert!(confirmed
        .response
        .contains("Successfully booked Taj Palace for 2 guest(s) from 2025-09-10 to 2025-09-15"));
    assert!(confirmed.response.contains("Confirmation number: HB-"));
    assert!(!confirmed.context.booking_pending_confirmation);
}

#[tokio::test]
async fn test_booking_missing_slots_then_declined() {
    let (orch, _) = orchestrator_with(Arc::new(NoopStore));
    let mut session = Session::new("u1");

    // 只有酒店名：列缺失项，不进入确认态
    let asked = orch.process_turn(&mut session, "reserve the Grand Palace").await;
    assert_eq!(asked.intent, Intent::HotelBooking);
    assert!(asked.response.contains("check-in date (YYYY-MM-DD)"));
    assert!(!asked.context.booking_pending_confirmation);

    // 补齐后进入确认态，再拒绝
    orch.process_turn(
        &mut session,
        "book it from 2025-09-10 to 2025-09-15 for 2 guests",
    )
    .await;
    let declined = orch.process_turn(&mut session, "no thanks").await;
    assert!(declined.response.contains("not confirmed"));
    assert!(!declined.context.booking_pending_confirmation);
}

#[tokio::test]
async fn test_past_turns_are_searchable() {
    let store = Arc::new(InMemoryStore::new(100));
    let (orch, _) = orchestrator_with(store.clone());
    let mut session = Session::new("u1");

    orch.process_turn(&mut session, "tell me about the beaches in Goa").await;
    orch.process_turn(&mut session, "what about the nightlife in Goa").await;

    let hits = store.search("beaches in goa", 1);
    assert_eq!(hits.len(), 1);
    assert!(hits[0].starts_with("Q: tell me about the beaches in Goa"));
}
