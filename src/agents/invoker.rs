//! 智能体调用器
//!
//! 对每个角色：投影固定的上下文切片、套任务模板、调用 LlmClient 并归一化为纯文本。
//! 天气角色会先尝试用天气工具取预报并注入提示词（取不到则降级为无预报提示）。
//! 能力失败在 run_or_degrade 边界转为道歉文本，回合照常完成。

use std::sync::Arc;

use crate::agents::AgentRole;
use crate::core::{AgentError, TripContext};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::tools::ToolExecutor;

/// 调用器：持有 LLM 客户端与工具执行器
pub struct AgentInvoker {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolExecutor>,
}

fn opt(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

/// research 投影：整个上下文中已填充的字段，按 "key: value" 逐行
fn format_full_context(ctx: &TripContext) -> String {
    let mut lines = Vec::new();
    let mut field = |name: &str, value: Option<String>| {
        if let Some(v) = value {
            lines.push(format!("{name}: {v}"));
        }
    };
    field("origin", ctx.origin.clone());
    field("destination", ctx.destination.clone());
    field("start_date", ctx.start_date.clone());
    field("end_date", ctx.end_date.clone());
    field("check_in_date", ctx.check_in_date.clone());
    field("check_out_date", ctx.check_out_date.clone());
    field(
        "travel_mode_preference",
        ctx.travel_mode_preference.map(|m| m.as_str().to_string()),
    );
    field("budget_total", ctx.budget_total.map(|b| b.to_string()));
    field("travelers", Some(ctx.travelers.to_string()));
    field("hotel_name", ctx.hotel_name.clone());
    lines.join("\n")
}

impl AgentInvoker {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolExecutor>) -> Self {
        Self { llm, tools }
    }

    /// 调用单个角色；失败转为道歉文本并记日志（§能力失败不致命）
    pub async fn run_or_degrade(
        &self,
        role: AgentRole,
        prompt: &str,
        ctx: &TripContext,
        past_context: &str,
    ) -> String {
        match self.run(role, prompt, ctx, past_context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(role = role.key(), error = %e, "agent capability failed");
                format!("Sorry, {} is unavailable right now.", role.describe())
            }
        }
    }

    /// 调用单个角色：投影 -> 模板 -> LLM
    pub async fn run(
        &self,
        role: AgentRole,
        prompt: &str,
        ctx: &TripContext,
        past_context: &str,
    ) -> Result<String, AgentError> {
        let mut task = self.task_for(role, prompt, ctx).await;
        if !past_context.is_empty() {
            task.push_str("\n\nRelevant past conversation:\n");
            task.push_str(past_context);
        }

        let messages = vec![Message::system(role.system_prompt()), Message::user(task)];
        self.llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)
    }

    /// 行程生成：五个依赖段落 + 用户请求，叙事体输出
    pub async fn run_itinerary(
        &self,
        prompt: &str,
        sections: &[(&str, String)],
    ) -> Result<String, AgentError> {
        let mut task = format!(
            "Create a day-by-day travel itinerary.\n\nUser request: {prompt}\n\nSupporting context:"
        );
        for (label, text) in sections {
            task.push_str(&format!("\n- {label}: {text}"));
        }
        task.push_str(
            "\n\nWrite flowing paragraphs with transitions, one per day. No JSON, bullets, or lists.",
        );

        let messages = vec![
            Message::system(AgentRole::Itinerary.system_prompt()),
            Message::user(task),
        ];
        self.llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)
    }

    /// 按角色拼任务描述（固定上下文投影）
    async fn task_for(&self, role: AgentRole, prompt: &str, ctx: &TripContext) -> String {
        match role {
            AgentRole::WeatherAdvice => {
                let mut task = format!(
                    "Provide a weather forecast and explicit safety assessment.\n\
                     User prompt: {prompt}\n\
                     Destination: {}\nStart date: {}\nEnd date: {}",
                    opt(&ctx.destination),
                    opt(&ctx.start_date),
                    opt(&ctx.end_date),
                );
                if let Some(forecast) = self.fetch_forecast(ctx).await {
                    task.push_str("\n\nRaw forecast data:\n");
                    task.push_str(&forecast);
                }
                task
            }
            AgentRole::TransportAdvice => format!(
                "Advise on transport for this trip.\n\
                 User prompt: {prompt}\n\
                 Origin: {}\nDestination: {}\nPreferred mode: {}",
                opt(&ctx.origin),
                opt(&ctx.destination),
                ctx.travel_mode_preference.map(|m| m.as_str()).unwrap_or(""),
            ),
            AgentRole::HotelRecommendation => format!(
                "Recommend hotels for this trip.\n\
                 User prompt: {prompt}\n\
                 Destination: {}\nTotal budget: {}",
                opt(&ctx.destination),
                ctx.budget_total.map(|b| b.to_string()).unwrap_or_default(),
            ),
            AgentRole::BudgetOptimizer => format!(
                "Optimize the travel budget.\n\
                 User prompt: {prompt}\n\
                 Total budget: {}",
                ctx.budget_total.map(|b| b.to_string()).unwrap_or_default(),
            ),
            // research（及未专门建模的角色）拿到整个上下文
            _ => format!(
                "Research attractions and local tips for the given trip.\n\
                 Main request: {prompt}\n\
                 Additional context:\n{}\n\
                 Output a single continuous natural-language paragraph.",
                format_full_context(ctx),
            ),
        }
    }

    /// 天气工具预报：目的地未知或工具失败时返回 None（提示词降级为无预报）
    async fn fetch_forecast(&self, ctx: &TripContext) -> Option<String> {
        let city = ctx.destination.as_deref()?;
        match self
            .tools
            .execute("weather_forecast", serde_json::json!({ "city": city }))
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "weather tool unavailable, prompting without forecast");
                None
            }
        }
    }
}
