use crate::domain::error::ServiceError;
use std::fmt;

/// 一括操作の中の個別ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStep {
    /// 新しいカートへのコピー
    Copy,
    /// 古いカートからの削除
    Remove,
    /// カート全削除時の削除
    Delete,
}

impl fmt::Display for BatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchStep::Copy => "copy",
            BatchStep::Remove => "remove",
            BatchStep::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// 失敗した個別ステップ
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub sku: String,
    pub step: BatchStep,
    pub error: ServiceError,
}

/// 一括操作の結果
/// すべての個別操作が完了してから集計する
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn new(attempted: usize) -> Self {
        Self {
            attempted,
            failures: Vec::new(),
        }
    }

    /// 個別操作の結果を記録する
    pub fn record(&mut self, sku: &str, step: BatchStep, result: Result<(), ServiceError>) {
        if let Err(error) = result {
            self.failures.push(BatchFailure {
                sku: sku.to_string(),
                step,
                error,
            });
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
