//! 回合控制器
//!
//! 每回合的固定流水线：检索长期记忆 -> 槽位抽取合并 -> 意图分类 -> 按意图分派
//! （预订状态机 / 行程协调器 / 单智能体）-> 写回长期记忆与会话历史。
//! 确认挂起时本回合无条件交给预订状态机（非确认答复即取消，窗口只有一回合）。

use std::sync::Arc;

use uuid::Uuid;

use crate::agents::{AgentInvoker, AgentRole};
use crate::config::AppConfig;
use crate::core::{classify, extract, BookingFlow, Intent, ItineraryCoordinator, Session, TripContext};
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::memory::{MemoryMetadata, MemoryStore, Message};
use crate::tools::ToolExecutor;

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(create_deepseek_client(Some(&model)))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(OpenAiClient::new(
            base,
            &model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}

/// 单回合结果：最终意图、响应文本与回合结束时的上下文快照
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub intent: Intent,
    pub response: String,
    pub context: TripContext,
}

/// 回合控制器：持有调用器、行程协调器、预订流程与长期记忆
pub struct Orchestrator {
    invoker: Arc<AgentInvoker>,
    coordinator: ItineraryCoordinator,
    booking: BookingFlow,
    memory: Arc<dyn MemoryStore>,
    top_k: usize,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolExecutor>,
        memory: Arc<dyn MemoryStore>,
        top_k: usize,
    ) -> Self {
        let invoker = Arc::new(AgentInvoker::new(llm, tools.clone()));
        Self {
            invoker: invoker.clone(),
            coordinator: ItineraryCoordinator::new(invoker),
            booking: BookingFlow::new(tools),
            memory,
            top_k,
        }
    }

    /// 处理一个用户回合
    pub async fn process_turn(&self, session: &mut Session, input: &str) -> TurnOutcome {
        // 记忆检索在抽取之前，用原始输入做查询
        let past_context = if self.memory.enabled() {
            self.memory.search(input, self.top_k).join("\n")
        } else {
            String::new()
        };

        let partial = extract(input, &session.context);
        session.context.merge(partial);

        let mut intent = classify(input, &session.context);

        // 确认挂起时状态机消费整个回合：非确认答复即取消
        let response = if session.context.booking_pending_confirmation
            || intent == Intent::HotelBooking
        {
            intent = Intent::HotelBooking;
            self.booking.handle(input, session).await
        } else {
            match intent {
                Intent::Itinerary | Intent::FullPlanning => {
                    self.coordinator.build(input, session, &past_context).await
                }
                Intent::Weather => self.dispatch(AgentRole::WeatherAdvice, input, session, &past_context).await,
                Intent::Transport => self.dispatch(AgentRole::TransportAdvice, input, session, &past_context).await,
                Intent::Hotels => self.dispatch(AgentRole::HotelRecommendation, input, session, &past_context).await,
                Intent::Budget => self.dispatch(AgentRole::BudgetOptimizer, input, session, &past_context).await,
                // Overview 与兜底都走 research
                _ => self.dispatch(AgentRole::TravelResearch, input, session, &past_context).await,
            }
        };
        session.context.last_query_intent = intent;

        self.record_turn(session, input, &response, intent);
        session.history.push(Message::user(input));
        session.history.push(Message::assistant(response.clone()));

        TurnOutcome {
            intent,
            response,
            context: session.context.clone(),
        }
    }

    /// 单智能体分派：每回合新调用，但缓存只保留首个结果
    async fn dispatch(
        &self,
        role: AgentRole,
        prompt: &str,
        session: &mut Session,
        past_context: &str,
    ) -> String {
        let text = self
            .invoker
            .run_or_degrade(role, prompt, &session.context, past_context)
            .await;
        session.cache.fill(role, text.clone());
        text
    }

    /// 将本回合的问答写入长期记忆；失败只记日志，不影响回合
    fn record_turn(&self, session: &Session, input: &str, response: &str, intent: Intent) {
        if !self.memory.enabled() {
            return;
        }
        let doc_id = format!("{}_{}", session.user_id, Uuid::new_v4());
        let metadata = MemoryMetadata {
            user_id: session.user_id.clone(),
            intent: intent.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let text = format!("Q: {input}\nA: {response}");
        if let Err(e) = self.memory.record(&session.id, &doc_id, &text, metadata) {
            tracing::warn!(error = %e, "memory record failed, continuing");
        }
    }
}
