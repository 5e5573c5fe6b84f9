//! 长期记忆：每回合的问答记录，按相似度跨回合检索
//!
//! 支持 record(...) 与 search(query, k)；当前实现为 InMemoryStore（关键词重叠打分），
//! 可选 JSON 快照落盘，后续可接 Qdrant/LanceDB 等真实向量库。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// 每条记录携带的元数据
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub user_id: String,
    pub intent: String,
    /// ISO-8601 时间戳
    pub timestamp: String,
}

/// 长期记忆 trait：写入与相似度检索
///
/// record 失败由调用方记日志后忽略（持久化失败不影响回合）；search 永不失败，
/// 无结果时返回空 Vec。
pub trait MemoryStore: Send + Sync {
    /// 存入一条回合记录
    fn record(
        &self,
        session_id: &str,
        doc_id: &str,
        text: &str,
        metadata: MemoryMetadata,
    ) -> Result<(), String>;

    /// 按查询检索最相关的 k 条，返回文本片段（按相关度降序）
    fn search(&self, query: &str, k: usize) -> Vec<String>;

    /// 是否启用（Noop 实现返回 false）
    fn enabled(&self) -> bool {
        true
    }
}

/// 空实现：未启用长期记忆时使用
#[derive(Clone, Default)]
pub struct NoopStore;

impl MemoryStore for NoopStore {
    fn record(
        &self,
        _session_id: &str,
        _doc_id: &str,
        _text: &str,
        _metadata: MemoryMetadata,
    ) -> Result<(), String> {
        Ok(())
    }

    fn search(&self, _query: &str, _k: usize) -> Vec<String> {
        Vec::new()
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// 单条落盘/驻留记录
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredDoc {
    session_id: String,
    doc_id: String,
    text: String,
    metadata: MemoryMetadata,
}

/// 内存实现：按关键词重叠检索（无真实向量，适合 MVP）
///
/// 设置 snapshot_path 时，启动加载 JSON 快照、每次写入后刷盘。
pub struct InMemoryStore {
    docs: RwLock<Vec<StoredDoc>>,
    max_entries: usize,
    snapshot_path: Option<PathBuf>,
}

/// 将文本切分为小写词集合，用于简单相似度（词重叠数）
fn tokenize_lower(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 1)
        .collect()
}

impl InMemoryStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            max_entries,
            snapshot_path: None,
        }
    }

    /// 带 JSON 快照的实例：文件存在则加载，解析失败时从空库开始
    pub fn with_snapshot(max_entries: usize, path: PathBuf) -> Self {
        let docs = Self::load_snapshot(&path).unwrap_or_default();
        Self {
            docs: RwLock::new(docs),
            max_entries,
            snapshot_path: Some(path),
        }
    }

    fn load_snapshot(path: &PathBuf) -> Option<Vec<StoredDoc>> {
        if !path.exists() {
            return None;
        }
        let data = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// 将当前记录写入快照文件；父目录不存在时自动创建
    fn flush(&self, docs: &[StoredDoc]) -> Result<(), String> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let data = serde_json::to_string_pretty(docs).map_err(|e| e.to_string())?;
        std::fs::write(path, data).map_err(|e| e.to_string())
    }

    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl MemoryStore for InMemoryStore {
    fn record(
        &self,
        session_id: &str,
        doc_id: &str,
        text: &str,
        metadata: MemoryMetadata,
    ) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let mut docs = self.docs.write().map_err(|e| e.to_string())?;
        docs.push(StoredDoc {
            session_id: session_id.to_string(),
            doc_id: doc_id.to_string(),
            text: text.to_string(),
            metadata,
        });
        let n = docs.len();
        if n > self.max_entries {
            docs.drain(0..n - self.max_entries);
        }
        self.flush(&docs)
    }

    fn search(&self, query: &str, k: usize) -> Vec<String> {
        let query_tokens = tokenize_lower(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }
        let Ok(docs) = self.docs.read() else {
            return Vec::new();
        };
        let mut scored: Vec<(usize, String)> = docs
            .iter()
            .map(|doc| {
                let doc_tokens = tokenize_lower(&doc.text);
                let score = query_tokens.intersection(&doc_tokens).count();
                (score, doc.text.clone())
            })
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, t)| t).collect()
    }
}
