//! LLM 客户端抽象
//!
//! 编排层只依赖这个 trait。契约是归一化：complete 拿一组会话消息，
//! 返回纯文本或一条错误描述；结果对象的解包、choice 选择、usage 记账
//! 都在具体后端内部完成，不外泄给编排层。回合制对话，不做流式。

use async_trait::async_trait;

use crate::memory::Message;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 单次完成：整组消息进，纯文本出
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 累计 token 统计 (prompt, completion, total)；不计数的后端用默认零值
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
