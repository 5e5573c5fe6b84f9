//! Tern - Rust 对话式旅行规划智能体
//!
//! 模块划分：
//! - **agents**: 各旅行智能体的角色定义与调用器（上下文投影 + 任务模板 + LLM 调用）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排核心（槽位抽取、意图分类、预订状态机、行程协调、回合控制）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 会话历史与可检索的长期记忆（关键词重叠 + JSON 快照）
//! - **tools**: 工具箱（天气预报、酒店预订）与执行器

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod tools;
