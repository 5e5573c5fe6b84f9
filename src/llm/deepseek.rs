//! DeepSeek 预设：OpenAI 兼容端点的一层薄封装
//!
//! 旅行建议场景只用常规对话模型；Key 与模型的解析顺序放在独立函数里，
//! 便于在无 Key 环境下由上层退回 Mock。

use crate::llm::OpenAiClient;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// Key 解析：DEEPSEEK_API_KEY 优先，OPENAI_API_KEY 兜底（兼容端点可互用）
fn resolve_api_key() -> String {
    std::env::var("DEEPSEEK_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .unwrap_or_else(|_| "sk-placeholder".to_string())
}

/// 模型解析：参数 > DEEPSEEK_MODEL 环境变量 > deepseek-chat
fn resolve_model(model: Option<&str>) -> String {
    model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string())
}

/// 创建指向 DeepSeek 端点的客户端
pub fn create_deepseek_client(model: Option<&str>) -> OpenAiClient {
    let api_key = resolve_api_key();
    let model = resolve_model(model);
    OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, Some(api_key.as_str()))
}
