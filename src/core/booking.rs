//! 预订状态机：两阶段确认/提交
//!
//! 状态只有 None 与 AwaitingConfirmation（由 booking_pending_confirmation 承载）。
//! 确认窗口恰好一个回合：挂起期间任何非确认答复都取消而不是重新询问。
//! 预订工具自己的失败文本原样作为回合响应透传，不升级为硬错误。

use std::sync::Arc;

use crate::agents::AgentRole;
use crate::core::{Session, TripContext};
use crate::tools::ToolExecutor;

/// 预订状态（上下文标志位的显式投影）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingState {
    None,
    AwaitingConfirmation,
}

impl BookingState {
    pub fn of(ctx: &TripContext) -> Self {
        if ctx.booking_pending_confirmation {
            BookingState::AwaitingConfirmation
        } else {
            BookingState::None
        }
    }
}

fn confirms(s: &str) -> bool {
    let s = s.to_lowercase();
    s.contains("yes") || s.contains("confirm") || s.contains("book it")
}

/// 必备槽位缺失清单；全齐时为空
fn missing_slots(ctx: &TripContext) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if ctx.hotel_name.is_none() {
        missing.push("hotel name");
    }
    if ctx.check_in_date.is_none() {
        missing.push("check-in date (YYYY-MM-DD)");
    }
    if ctx.check_out_date.is_none() {
        missing.push("check-out date (YYYY-MM-DD)");
    }
    if ctx.travelers < 1 {
        missing.push("number of guests");
    }
    missing
}

/// 预订流程：意图命中 hotel_booking 时由回合控制器调用
pub struct BookingFlow {
    tools: Arc<ToolExecutor>,
}

impl BookingFlow {
    pub fn new(tools: Arc<ToolExecutor>) -> Self {
        Self { tools }
    }

    /// 驱动状态机一步，返回本回合响应
    pub async fn handle(&self, input: &str, session: &mut Session) -> String {
        match BookingState::of(&session.context) {
            BookingState::AwaitingConfirmation => {
                // 窗口只有一回合，先落回 None 再分派
                session.context.booking_pending_confirmation = false;
                if confirms(input) {
                    self.commit(session).await
                } else {
                    "Hotel booking not confirmed. Please provide new details or explicitly \
                     confirm to book."
                        .to_string()
                }
            }
            BookingState::None => {
                let missing = missing_slots(&session.context);
                if !missing.is_empty() {
                    return format!(
                        "I need the following information to book a hotel: {}.",
                        missing.join(", ")
                    );
                }
                session.context.booking_pending_confirmation = true;
                let ctx = &session.context;
                format!(
                    "I have the following details for your hotel booking: {} from {} to {} \
                     for {} guest(s). Do you want to confirm this booking?",
                    ctx.hotel_name.as_deref().unwrap_or_default(),
                    ctx.check_in_date.as_deref().unwrap_or_default(),
                    ctx.check_out_date.as_deref().unwrap_or_default(),
                    ctx.travelers,
                )
            }
        }
    }

    /// 提交预订：调用预订工具，结果文本（含工具自身的错误文案）原样返回
    async fn commit(&self, session: &mut Session) -> String {
        let ctx = &session.context;
        let args = serde_json::json!({
            "hotel_name": ctx.hotel_name.as_deref().unwrap_or_default(),
            "check_in_date": ctx.check_in_date.as_deref().unwrap_or_default(),
            "check_out_date": ctx.check_out_date.as_deref().unwrap_or_default(),
            "num_guests": ctx.travelers,
        });
        match self.tools.execute("book_hotel", args).await {
            Ok(text) => {
                session.cache.fill(AgentRole::HotelBooking, text.clone());
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "booking capability failed");
                format!("Sorry, the booking could not be completed: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::tools::{Tool, ToolRegistry};

    /// 计数预订工具替身：记录调用次数与最近一次参数
    struct CountingBookingTool {
        calls: Arc<AtomicUsize>,
        last_args: Arc<std::sync::Mutex<Option<Value>>>,
    }

    #[async_trait]
    impl Tool for CountingBookingTool {
        fn name(&self) -> &str {
            "book_hotel"
        }

        fn description(&self) -> &str {
            "test double"
        }

        async fn execute(&self, args: Value) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = Some(args);
            Ok("booked".to_string())
        }
    }

    fn flow_with_counter() -> (BookingFlow, Arc<AtomicUsize>, Arc<std::sync::Mutex<Option<Value>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_args = Arc::new(std::sync::Mutex::new(None));
        let mut registry = ToolRegistry::new();
        registry.register(CountingBookingTool {
            calls: calls.clone(),
            last_args: last_args.clone(),
        });
        let flow = BookingFlow::new(Arc::new(ToolExecutor::new(registry, 5)));
        (flow, calls, last_args)
    }

    fn ready_session() -> Session {
        let mut session = Session::new("u1");
        session.context.hotel_name = Some("Taj Palace".to_string());
        session.context.check_in_date = Some("2025-09-10".to_string());
        session.context.check_out_date = Some("2025-09-15".to_string());
        session.context.travelers = 2;
        session
    }

    #[tokio::test]
    async fn test_all_slots_present_requests_confirmation() {
        let (flow, calls, _) = flow_with_counter();
        let mut session = ready_session();

        let reply = flow.handle("book Taj Palace", &mut session).await;
        assert_eq!(BookingState::of(&session.context), BookingState::AwaitingConfirmation);
        assert!(reply.contains("Taj Palace"));
        assert!(reply.contains("2025-09-10"));
        assert!(reply.contains("2025-09-15"));
        assert!(reply.contains("2 guest(s)"));
        // 确认前不触发预订能力
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_slots_listed_without_state_change() {
        let (flow, calls, _) = flow_with_counter();
        let mut session = Session::new("u1");
        session.context.hotel_name = Some("Taj Palace".to_string());

        let reply = flow.handle("book Taj Palace", &mut session).await;
        assert_eq!(BookingState::of(&session.context), BookingState::None);
        assert!(reply.contains("check-in date (YYYY-MM-DD)"));
        assert!(reply.contains("check-out date (YYYY-MM-DD)"));
        assert!(!reply.contains("hotel name"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirmation_invokes_booking_exactly_once() {
        let (flow, calls, last_args) = flow_with_counter();
        let mut session = ready_session();

        flow.handle("book Taj Palace", &mut session).await;
        let reply = flow.handle("yes", &mut session).await;

        assert_eq!(reply, "booked");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(BookingState::of(&session.context), BookingState::None);

        let args = last_args.lock().unwrap().clone().unwrap();
        assert_eq!(args["hotel_name"], "Taj Palace");
        assert_eq!(args["check_in_date"], "2025-09-10");
        assert_eq!(args["check_out_date"], "2025-09-15");
        assert_eq!(args["num_guests"], 2);
    }

    #[tokio::test]
    async fn test_non_confirming_reply_cancels() {
        let (flow, calls, _) = flow_with_counter();
        let mut session = ready_session();

        flow.handle("book Taj Palace", &mut session).await;
        let reply = flow.handle("no thanks", &mut session).await;

        assert!(reply.contains("not confirmed"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(BookingState::of(&session.context), BookingState::None);
    }
}
