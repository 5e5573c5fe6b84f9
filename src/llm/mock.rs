//! Mock 后端：无 API Key 时的离线兜底，也是测试里的默认替身
//!
//! 回显最后一条用户消息，前缀标记 mock，保证整条回合链路可以在
//! 无网络环境跑通并肉眼区分于真实建议。

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("[mock advice] {last_user}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user_message() {
        let client = MockLlmClient;
        let reply = client
            .complete(&[
                Message::system("you are a travel agent"),
                Message::user("weather in Manali"),
                Message::assistant("noted"),
                Message::user("and hotels?"),
            ])
            .await
            .unwrap();
        assert_eq!(reply, "[mock advice] and hotels?");
    }
}
