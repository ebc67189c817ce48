// 出力ポート
// ドメイン層とアプリケーション層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::error::ServiceError;
use crate::domain::event::BusinessEvent;
use crate::domain::logging::{LogEntry, LogLevel};
use crate::domain::metric::InfrastructureMetric;
use crate::domain::model::{CartItem, CartKey};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// 構造化ログエントリを出力
    fn log(&self, entry: LogEntry);

    /// デバッグレベルのログを出力
    fn debug(&self, component: &str, message: &str, trace_id: Option<&str>) {
        self.log(build_entry(LogLevel::Debug, component, message, trace_id, None));
    }

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        trace_id: Option<&str>,
        context: Option<BTreeMap<String, String>>,
    ) {
        self.log(build_entry(LogLevel::Warning, component, message, trace_id, context));
    }

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        trace_id: Option<&str>,
        context: Option<BTreeMap<String, String>>,
    ) {
        self.log(build_entry(LogLevel::Error, component, message, trace_id, context));
    }
}

fn build_entry(
    level: LogLevel,
    component: &str,
    message: &str,
    trace_id: Option<&str>,
    context: Option<BTreeMap<String, String>>,
) -> LogEntry {
    let mut entry = LogEntry::new(level, message, component);

    if let Some(trace_id) = trace_id {
        entry = entry.with_trace_id(trace_id);
    }

    if let Some(context) = context {
        entry.additional_context.extend(context);
    }

    entry
}

/// カートテーブルトレイト（ストレージポート）
/// (cartId, sku) の複合キーで商品を保存するキーバリューテーブルを抽象化する
#[async_trait]
pub trait CartTable: Send + Sync {
    /// キーで商品を1件取得する
    ///
    /// # Returns
    /// * `Ok(Some(CartItem))` - 商品が見つかった
    /// * `Ok(None)` - 商品が見つからなかった
    /// * `Err(ServiceError)` - 取得失敗
    async fn get_item(&self, key: &CartKey) -> Result<Option<CartItem>, ServiceError>;

    /// パーティションキー（cartId）に属する商品をすべて取得する
    /// sku の昇順で返す
    async fn query_by_partition(&self, cart_id: &str) -> Result<Vec<CartItem>, ServiceError>;

    /// 商品を作成または上書きする
    /// キーのフィールドが商品のフィールドより優先される
    async fn put_item(&self, key: &CartKey, item: &CartItem) -> Result<(), ServiceError>;

    /// キーで商品を削除する
    /// 存在しないキーの削除も成功として扱う
    async fn delete_item(&self, key: &CartKey) -> Result<(), ServiceError>;
}

/// メッセージバストレイト（メッセージングポート）
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// ビジネスイベントを発行し、メッセージIDを返す
    async fn publish(&self, event: &BusinessEvent) -> Result<String, ServiceError>;
}

/// メトリクスバストレイト（メトリクスポート）
#[async_trait]
pub trait MetricBus: Send + Sync {
    /// メトリクスを1件発行する
    async fn publish(&self, metric: &InfrastructureMetric) -> Result<(), ServiceError>;
}

/// 入力パーサートレイト
/// 受信したリクエストから操作に必要な値を取り出す
pub trait InputParser: Send + Sync {
    /// HTTPメソッド
    fn http_method(&self) -> &str;

    /// リソーステンプレート（例: `/cart/{productSku}`）
    fn resource(&self) -> &str;

    /// 認証ヘッダーの値（生の値）
    fn identity_token(&self) -> Option<&str>;

    /// パスパラメータ
    fn path_param(&self, name: &str) -> Option<&str>;

    /// クエリパラメータ
    fn query_param(&self, name: &str) -> Option<&str>;

    /// ボディをJSONとしてデコードする
    ///
    /// # Returns
    /// * `Ok(None)` - ボディがない
    /// * `Ok(Some(Value))` - デコード成功
    /// * `Err(serde_json::Error)` - JSONとして不正
    fn payload(&self) -> Result<Option<serde_json::Value>, serde_json::Error>;
}

/// 依存リゾルバートレイト
/// リクエスト単位でポートの実装を提供する
///
/// 必須の設定がない場合はポートを返さず、`DependencyNotConfigured` の
/// `ServiceError` を返す。メトリクスポートは常に提供できる。
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// 受信イベントの型
    type Event: Send;

    /// 受信イベントの入力パーサーを作成
    fn input_parser(&self, event: Self::Event) -> Box<dyn InputParser>;

    /// ストレージポートを取得
    async fn cart_table(&self) -> Result<Arc<dyn CartTable>, ServiceError>;

    /// メッセージングポートを取得
    async fn message_bus(&self) -> Result<Arc<dyn MessageBus>, ServiceError>;

    /// メトリクスポートを取得
    fn metric_bus(&self) -> Arc<dyn MetricBus>;
}
