//! 智能体层：角色定义与调用器
//!
//! 每个角色对应一个固定的上下文投影与任务模板，统一经 LlmClient 调用并归一化为纯文本。

pub mod invoker;
pub mod role;

pub use invoker::AgentInvoker;
pub use role::AgentRole;
