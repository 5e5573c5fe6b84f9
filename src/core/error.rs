//! Agent 错误类型
//!
//! 回合内的失败都在处理器边界降级为用户可见文本，AgentError 不会逃出 process_turn；
//! 这里只区分需要不同降级文案/日志的几类。

use thiserror::Error;

/// 能力调用过程中可能出现的错误（LLM、工具、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}
