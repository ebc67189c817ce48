// インメモリのポート実装
// 開発・テスト用。失敗の注入ができる

use crate::adapter::driver::in_memory_request::InMemoryRequest;
use crate::application::dependency::report_not_configured;
use crate::domain::error::{ResourceDescriptor, ServiceError, ServiceErrorCode};
use crate::domain::event::BusinessEvent;
use crate::domain::logging::{LogEntry, LogLevel};
use crate::domain::metric::InfrastructureMetric;
use crate::domain::model::{CartItem, CartKey};
use crate::domain::port::{
    CartTable, DependencyResolver, InputParser, Logger, MessageBus, MetricBus,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

const IN_MEMORY_TABLE: &str = "in-memory-table";
const IN_MEMORY_TOPIC: &str = "in-memory-topic";
const IN_MEMORY_METRICS: &str = "in-memory-metrics";

/// インメモリのカートテーブル
/// (cartId, sku) の順で並ぶため、パーティション内は sku の昇順になる
#[derive(Default)]
pub struct InMemoryCartTable {
    items: RwLock<BTreeMap<(String, String), CartItem>>,
    failing_skus: RwLock<HashSet<String>>,
}

impl InMemoryCartTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 商品を直接登録する
    pub async fn seed(&self, item: CartItem) {
        let mut items = self.items.write().await;
        items.insert((item.cart_id.clone(), item.sku.clone()), item);
    }

    /// 指定した sku への書き込み（put/delete）を失敗させる
    pub async fn fail_writes_for(&self, sku: &str) {
        self.failing_skus.write().await.insert(sku.to_string());
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    async fn check_write(&self, key: &CartKey) -> Result<(), ServiceError> {
        if self.failing_skus.read().await.contains(&key.sku) {
            return Err(ServiceError::new(
                ServiceErrorCode::NetworkError,
                Some(ResourceDescriptor::table(IN_MEMORY_TABLE)),
            )
            .with_payload(serde_json::json!({ "injected": key.describe() })));
        }
        Ok(())
    }
}

#[async_trait]
impl CartTable for InMemoryCartTable {
    async fn get_item(&self, key: &CartKey) -> Result<Option<CartItem>, ServiceError> {
        let items = self.items.read().await;
        Ok(items.get(&(key.cart_id.clone(), key.sku.clone())).cloned())
    }

    async fn query_by_partition(&self, cart_id: &str) -> Result<Vec<CartItem>, ServiceError> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn put_item(&self, key: &CartKey, item: &CartItem) -> Result<(), ServiceError> {
        self.check_write(key).await?;

        let mut items = self.items.write().await;
        items.insert((key.cart_id.clone(), key.sku.clone()), item.keyed_by(key));
        Ok(())
    }

    async fn delete_item(&self, key: &CartKey) -> Result<(), ServiceError> {
        self.check_write(key).await?;

        let mut items = self.items.write().await;
        items.remove(&(key.cart_id.clone(), key.sku.clone()));
        Ok(())
    }
}

/// すべての呼び出しが失敗するカートテーブル
pub struct FailingCartTable {
    code: ServiceErrorCode,
}

impl FailingCartTable {
    pub fn new(code: ServiceErrorCode) -> Self {
        Self { code }
    }

    fn error(&self) -> ServiceError {
        ServiceError::new(self.code, Some(ResourceDescriptor::table(IN_MEMORY_TABLE)))
    }
}

#[async_trait]
impl CartTable for FailingCartTable {
    async fn get_item(&self, _key: &CartKey) -> Result<Option<CartItem>, ServiceError> {
        Err(self.error())
    }

    async fn query_by_partition(&self, _cart_id: &str) -> Result<Vec<CartItem>, ServiceError> {
        Err(self.error())
    }

    async fn put_item(&self, _key: &CartKey, _item: &CartItem) -> Result<(), ServiceError> {
        Err(self.error())
    }

    async fn delete_item(&self, _key: &CartKey) -> Result<(), ServiceError> {
        Err(self.error())
    }
}

/// 発行されたイベントを記録するメッセージバス
#[derive(Default)]
pub struct InMemoryMessageBus {
    published: RwLock<Vec<BusinessEvent>>,
    failing: bool,
}

impl InMemoryMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に発行に失敗するメッセージバス
    pub fn failing() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            failing: true,
        }
    }

    pub async fn published(&self) -> Vec<BusinessEvent> {
        self.published.read().await.clone()
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn publish(&self, event: &BusinessEvent) -> Result<String, ServiceError> {
        if self.failing {
            return Err(ServiceError::new(
                ServiceErrorCode::NetworkError,
                Some(ResourceDescriptor::topic(IN_MEMORY_TOPIC)),
            ));
        }

        self.published.write().await.push(event.clone());
        Ok(Uuid::new_v4().to_string())
    }
}

/// 発行されたメトリクスを記録するメトリクスバス
#[derive(Default)]
pub struct InMemoryMetricBus {
    published: RwLock<Vec<InfrastructureMetric>>,
    failing: bool,
}

impl InMemoryMetricBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            failing: true,
        }
    }

    pub async fn published(&self) -> Vec<InfrastructureMetric> {
        self.published.read().await.clone()
    }

    /// 指定した名前のメトリクスだけを返す
    pub async fn named(&self, name: &str) -> Vec<InfrastructureMetric> {
        self.published
            .read()
            .await
            .iter()
            .filter(|metric| metric.name == name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MetricBus for InMemoryMetricBus {
    async fn publish(&self, metric: &InfrastructureMetric) -> Result<(), ServiceError> {
        if self.failing {
            return Err(ServiceError::new(
                ServiceErrorCode::NetworkError,
                Some(ResourceDescriptor::metric(IN_MEMORY_METRICS)),
            ));
        }

        self.published.write().await.push(metric.clone());
        Ok(())
    }
}

/// ログエントリを記録するロガー
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 指定したレベルのエントリ
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.message.contains(message))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }
}

/// インメモリの依存リゾルバー
///
/// ポートを `None` にすると、その依存リソースは未設定として扱う。
pub struct InMemoryDependencyResolver {
    table: Option<Arc<dyn CartTable>>,
    message_bus: Option<Arc<dyn MessageBus>>,
    metric_bus: Arc<dyn MetricBus>,
    logger: Arc<dyn Logger>,
}

impl InMemoryDependencyResolver {
    pub fn new(table: Arc<dyn CartTable>, message_bus: Arc<dyn MessageBus>) -> Self {
        Self {
            table: Some(table),
            message_bus: Some(message_bus),
            metric_bus: Arc::new(InMemoryMetricBus::new()),
            logger: Arc::new(RecordingLogger::new()),
        }
    }

    /// ストレージもメッセージングも設定されていないリゾルバー
    pub fn unconfigured() -> Self {
        Self {
            table: None,
            message_bus: None,
            metric_bus: Arc::new(InMemoryMetricBus::new()),
            logger: Arc::new(RecordingLogger::new()),
        }
    }

    pub fn without_table(mut self) -> Self {
        self.table = None;
        self
    }

    pub fn without_message_bus(mut self) -> Self {
        self.message_bus = None;
        self
    }

    pub fn with_metric_bus(mut self, metric_bus: Arc<dyn MetricBus>) -> Self {
        self.metric_bus = metric_bus;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

#[async_trait]
impl DependencyResolver for InMemoryDependencyResolver {
    type Event = InMemoryRequest;

    fn input_parser(&self, event: InMemoryRequest) -> Box<dyn InputParser> {
        Box::new(event)
    }

    async fn cart_table(&self) -> Result<Arc<dyn CartTable>, ServiceError> {
        match &self.table {
            Some(table) => Ok(Arc::clone(table)),
            None => Err(report_not_configured(
                ResourceDescriptor::table(IN_MEMORY_TABLE),
                self.metric_bus.as_ref(),
                self.logger.as_ref(),
            )
            .await),
        }
    }

    async fn message_bus(&self) -> Result<Arc<dyn MessageBus>, ServiceError> {
        match &self.message_bus {
            Some(bus) => Ok(Arc::clone(bus)),
            None => Err(report_not_configured(
                ResourceDescriptor::topic(IN_MEMORY_TOPIC),
                self.metric_bus.as_ref(),
                self.logger.as_ref(),
            )
            .await),
        }
    }

    fn metric_bus(&self) -> Arc<dyn MetricBus> {
        Arc::clone(&self.metric_bus)
    }
}
