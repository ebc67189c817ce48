use crate::domain::logging::{LogEntry, LogLevel};
use crate::domain::port::Logger;
use std::time::Duration;

/// `tracing` を通してログを出力する実装
/// Lambda 上では CloudWatch Logs に流れる
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

// 桁あふれする実行時間は u64::MAX に丸める
fn execution_time_ms(execution_time: Duration) -> u64 {
    u64::try_from(execution_time.as_millis()).unwrap_or(u64::MAX)
}

impl Logger for TracingLogger {
    fn log(&self, entry: LogEntry) {
        let trace_id = entry.trace_id.as_deref().unwrap_or("-");
        let execution_time_ms = entry.execution_time.map(execution_time_ms);
        let context = entry.context_string();
        let component = entry.component.as_str();
        let message = entry.message.as_str();

        match entry.level {
            LogLevel::Debug => tracing::debug!(
                component,
                trace_id,
                execution_time_ms,
                context = %context,
                "{}",
                message
            ),
            LogLevel::Info => tracing::info!(
                component,
                trace_id,
                execution_time_ms,
                context = %context,
                "{}",
                message
            ),
            LogLevel::Warning => tracing::warn!(
                component,
                trace_id,
                execution_time_ms,
                context = %context,
                "{}",
                message
            ),
            LogLevel::Error => tracing::error!(
                component,
                trace_id,
                execution_time_ms,
                context = %context,
                "{}",
                message
            ),
        }
    }
}
