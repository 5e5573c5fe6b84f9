//! 记忆层：会话历史（回合内展示）与长期记忆（跨回合相似度检索 + JSON 快照）

pub mod conversation;
pub mod store;

pub use conversation::{ConversationMemory, Message, Role};
pub use store::{InMemoryStore, MemoryMetadata, MemoryStore, NoopStore};
