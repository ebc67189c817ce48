// ドメイン層（モデル、エラー、イベント、メトリクス、ポート）

pub mod error;
pub mod event;
pub mod logging;
pub mod metric;
pub mod model;
pub mod port;
