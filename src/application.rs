// アプリケーション層（ルーティング、操作の実行、レスポンス生成）

pub mod batch;
pub mod dependency;
pub mod error;
pub mod response;
pub mod router;
pub mod service;

pub use error::OperationError;
