use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ログエントリ
/// 構造化ログの基本構造を定義
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub trace_id: Option<String>,
    pub component: String,
    pub execution_time: Option<Duration>,
    pub additional_context: BTreeMap<String, String>,
}

impl LogEntry {
    /// 新しいログエントリを作成
    pub fn new(level: LogLevel, message: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            trace_id: None,
            component: component.into(),
            execution_time: None,
            additional_context: BTreeMap::new(),
        }
    }

    /// トレースIDを設定
    pub fn with_trace_id(mut self, trace_id: &str) -> Self {
        self.trace_id = Some(trace_id.to_string());
        self
    }

    /// 実行時間を設定
    pub fn with_execution_time(mut self, execution_time: Duration) -> Self {
        self.execution_time = Some(execution_time);
        self
    }

    /// 追加コンテキストを設定
    pub fn with_context(mut self, key: &str, value: impl ToString) -> Self {
        self.additional_context.insert(key.to_string(), value.to_string());
        self
    }

    /// 追加コンテキストを `key=value, ...` 形式で連結
    pub fn context_string(&self) -> String {
        self.additional_context
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
