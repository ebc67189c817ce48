use crate::application::batch::BatchFailure;
use crate::application::response::{HttpResponse, ResponseBuilder};
use crate::application::router::OperationKind;
use crate::domain::error::{DomainError, ServiceError};

/// アプリケーション層のエラー型
/// 操作の失敗をHTTPレスポンスへ対応付ける
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// (リソース, メソッド) の組に対応する操作がない
    #[error("Invalid Request Method")]
    InvalidRoute,
    /// 入力不備（キーの欠落、必須フィールドの欠落、不正なJSON）
    #[error("{0}")]
    Validation(String),
    /// 呼び出し元を特定できない、または権限がない
    #[error("Unauthorized")]
    Unauthorized,
    /// 対象が存在しない（ルックアップキーを保持）
    #[error("Not found: {0}")]
    NotFound(String),
    /// 依存サービスの呼び出し失敗
    #[error("Dependency failure: {0}")]
    Dependency(#[from] ServiceError),
    /// 一括操作の一部が失敗した
    #[error("{operation} failed for {} of {attempted} products", .failures.len())]
    PartialBatchFailure {
        operation: OperationKind,
        attempted: usize,
        failures: Vec<BatchFailure>,
    },
    /// レスポンスの直列化失敗
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DomainError> for OperationError {
    fn from(err: DomainError) -> Self {
        OperationError::Validation(err.to_string())
    }
}

impl OperationError {
    pub fn status_code(&self) -> u16 {
        match self {
            OperationError::InvalidRoute | OperationError::Validation(_) => 400,
            OperationError::Unauthorized => 401,
            OperationError::NotFound(_) => 404,
            OperationError::Dependency(_)
            | OperationError::PartialBatchFailure { .. }
            | OperationError::Serialization(_) => 500,
        }
    }

    /// エラーレスポンスに変換する
    /// 401と500の理由は伏せる
    pub fn to_response(&self, trace_id: &str) -> HttpResponse {
        match self {
            OperationError::InvalidRoute | OperationError::Validation(_) => {
                ResponseBuilder::bad_request(&self.to_string(), trace_id)
            }
            OperationError::Unauthorized => ResponseBuilder::unauthorized(trace_id),
            OperationError::NotFound(lookup_key) => ResponseBuilder::not_found(lookup_key, trace_id),
            OperationError::Dependency(_)
            | OperationError::PartialBatchFailure { .. }
            | OperationError::Serialization(_) => ResponseBuilder::internal_error(trace_id),
        }
    }
}
