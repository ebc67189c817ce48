use crate::application::batch::{BatchOutcome, BatchStep};
use crate::application::response::{HttpResponse, ResponseBuilder};
use crate::application::router::{route, OperationKind};
use crate::application::OperationError;
use crate::domain::event::{BusinessEvent, CartAction};
use crate::domain::logging::{LogEntry, LogLevel};
use crate::domain::metric::{BackendMetric, InfrastructureMetric, MetricBuilder};
use crate::domain::model::{is_valid_session_id, CartItem, CartItemCandidate, CartKey};
use crate::domain::error::{ResourceType, ServiceErrorCode};
use crate::domain::port::{DependencyResolver, InputParser, Logger, MetricBus};
use futures::future::{join, join_all};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

const COMPONENT: &str = "CartOperationExecutor";
const SESSION_ID_PARAM: &str = "sessionId";
const PRODUCT_SKU_PARAM: &str = "productSku";

/// カート操作の実行者
///
/// 1リクエストにつき1つ作成する。ストレージの結果でレスポンスを決め、
/// イベントとメトリクスの発行はベストエフォートの副作用として
/// `side_effects` に積む。
pub struct CartOperationExecutor {
    parser: Box<dyn InputParser>,
    trace_id: String,
    logger: Arc<dyn Logger>,
    side_effects: JoinSet<()>,
}

impl CartOperationExecutor {
    /// 新しい実行者を作成
    ///
    /// # Arguments
    /// * `parser` - リクエストの入力パーサー
    /// * `trace_id` - リクエストのトレースID
    /// * `logger` - ロガー
    pub fn new(parser: Box<dyn InputParser>, trace_id: &str, logger: Arc<dyn Logger>) -> Self {
        Self {
            parser,
            trace_id: trace_id.to_string(),
            logger,
            side_effects: JoinSet::new(),
        }
    }

    /// リクエストに対応する操作
    pub fn operation(&self) -> Option<OperationKind> {
        route(self.parser.resource(), self.parser.http_method())
    }

    /// カートIDを解決する
    ///
    /// 空でない認証トークンがあればそれをカートIDとし、なければ
    /// 妥当な `sessionId` クエリパラメータを使う。どちらもなければ `None`。
    pub fn resolve_cart_id(&self) -> Option<String> {
        if let Some(token) = self.parser.identity_token().filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }

        self.session_id()
    }

    /// 操作を実行してレスポンスを返す
    ///
    /// 失敗はすべてエラーレスポンスに変換する。
    pub async fn execute<R: DependencyResolver>(&mut self, resolver: &R) -> HttpResponse {
        let started = Instant::now();
        let operation = self.operation();

        let result = match operation {
            Some(kind) => self.run(kind, resolver).await,
            None => Err(OperationError::InvalidRoute),
        };

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                self.report_failure(operation, &error, resolver);
                error.to_response(&self.trace_id)
            }
        };

        let operation_name = operation.map_or("None", |kind| kind.as_str());
        self.logger.log(
            LogEntry::new(LogLevel::Info, "Request completed", COMPONENT)
                .with_trace_id(&self.trace_id)
                .with_execution_time(started.elapsed())
                .with_context("operation", operation_name)
                .with_context("resource", self.parser.resource())
                .with_context("method", self.parser.http_method())
                .with_context("statusCode", response.status_code),
        );

        response
    }

    /// ベストエフォートの副作用がすべて終わるまで待つ
    /// タスクの失敗はログに残すだけで呼び出し元へは返さない
    pub async fn settle(&mut self) {
        while let Some(result) = self.side_effects.join_next().await {
            if let Err(join_error) = result {
                self.logger.error(
                    COMPONENT,
                    &format!("Side effect task failed: {}", join_error),
                    Some(self.trace_id.as_str()),
                    None,
                );
            }
        }
    }

    async fn run<R: DependencyResolver>(
        &mut self,
        kind: OperationKind,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        self.logger.debug(
            COMPONENT,
            &format!("Executing {}", kind),
            Some(self.trace_id.as_str()),
        );

        match kind {
            OperationKind::GetAllProducts => self.get_all_products(resolver).await,
            OperationKind::RemoveAllProducts => self.remove_all_products(resolver).await,
            OperationKind::GetProduct => self.get_product(resolver).await,
            OperationKind::AddProduct => self.store_product(kind, resolver).await,
            OperationKind::UpdateProduct => self.store_product(kind, resolver).await,
            OperationKind::RemoveProduct => self.remove_product(resolver).await,
            OperationKind::ConvertCart => self.convert_cart(resolver).await,
        }
    }

    async fn get_all_products<R: DependencyResolver>(
        &mut self,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let cart_id = self.require_cart_id()?;
        let table = resolver.cart_table().await?;

        let items = table.query_by_partition(&cart_id).await?;
        if items.is_empty() {
            return Err(OperationError::NotFound(CartKey::describe_partition(&cart_id)));
        }

        Ok(ResponseBuilder::ok(serde_json::to_value(&items)?))
    }

    async fn remove_all_products<R: DependencyResolver>(
        &mut self,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let cart_id = self.require_cart_id()?;
        let table = resolver.cart_table().await?;

        let items = table.query_by_partition(&cart_id).await?;
        let keys: Vec<CartKey> = items
            .iter()
            .map(|item| CartKey::new(&cart_id, &item.sku))
            .collect();

        let results = join_all(keys.iter().map(|key| table.delete_item(key))).await;

        let mut outcome = BatchOutcome::new(keys.len());
        for (key, result) in keys.iter().zip(results) {
            outcome.record(&key.sku, BatchStep::Delete, result);
        }
        self.ensure_batch_success(OperationKind::RemoveAllProducts, outcome)?;

        let event = BusinessEvent::all_products_removed(&cart_id, &self.trace_id);
        self.publish_event(OperationKind::RemoveAllProducts, event, resolver)
            .await;

        Ok(ResponseBuilder::ok_empty())
    }

    async fn get_product<R: DependencyResolver>(
        &mut self,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let cart_id = self.require_cart_id()?;
        let sku = self.require_sku()?;
        let table = resolver.cart_table().await?;

        let key = CartKey::new(cart_id, sku);
        match table.get_item(&key).await? {
            Some(item) => Ok(ResponseBuilder::ok(serde_json::to_value(&item)?)),
            None => Err(OperationError::NotFound(key.describe())),
        }
    }

    /// 商品の追加と更新（どちらも upsert）
    /// 追加は sku をボディから、更新はパスから取る
    async fn store_product<R: DependencyResolver>(
        &mut self,
        kind: OperationKind,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let cart_id = self.require_cart_id()?;
        let path_sku = match kind {
            OperationKind::UpdateProduct => Some(self.require_sku()?),
            _ => None,
        };

        let payload = self
            .parser
            .payload()
            .map_err(|e| OperationError::Validation(format!("Invalid JSON body: {}", e)))?;

        let mut candidate = CartItemCandidate::from_payload(payload)?.with_cart_id(&cart_id);
        if let Some(sku) = &path_sku {
            candidate = candidate.with_sku(sku);
        }
        let item = candidate.into_item()?;

        let table = resolver.cart_table().await?;
        table.put_item(&item.key(), &item).await?;

        let body = serde_json::to_value(&item)?;
        let (action, response) = match kind {
            OperationKind::AddProduct => {
                let location = format!("{}/{}", self.parser.resource(), item.sku);
                (CartAction::AddProduct, ResponseBuilder::created(&location, body))
            }
            _ => (CartAction::UpdateProduct, ResponseBuilder::ok(body)),
        };

        let event = BusinessEvent::product_stored(action, &cart_id, &item, &self.trace_id);
        self.publish_event(kind, event, resolver).await;

        Ok(response)
    }

    async fn remove_product<R: DependencyResolver>(
        &mut self,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let cart_id = self.require_cart_id()?;
        let sku = self.require_sku()?;
        let table = resolver.cart_table().await?;

        table.delete_item(&CartKey::new(cart_id, &sku)).await?;

        let event = BusinessEvent::product_removed(&sku, &self.trace_id);
        self.publish_event(OperationKind::RemoveProduct, event, resolver)
            .await;

        Ok(ResponseBuilder::ok_empty())
    }

    /// セッションのカートを認証済みユーザーのカートへ移す
    ///
    /// コピーと削除を全商品について並行に発行し、すべて完了してから
    /// 結果を判定する。一部失敗してもロールバックはしない。
    async fn convert_cart<R: DependencyResolver>(
        &mut self,
        resolver: &R,
    ) -> Result<HttpResponse, OperationError> {
        let user_id = self.parser.identity_token().map(str::to_string);
        let new_cart_id = self.resolve_cart_id();

        if user_id != new_cart_id {
            return Err(OperationError::Unauthorized);
        }
        let new_cart_id = new_cart_id.ok_or(OperationError::Unauthorized)?;
        let old_cart_id = self.session_id().ok_or_else(|| {
            OperationError::Validation(format!("Missing {} query parameter", SESSION_ID_PARAM))
        })?;
        if old_cart_id == new_cart_id {
            return Err(OperationError::Validation(
                "Cart is already owned by the caller".to_string(),
            ));
        }

        let table = resolver.cart_table().await?;
        let items = table.query_by_partition(&old_cart_id).await?;
        if items.is_empty() {
            return Err(OperationError::NotFound(CartKey::describe_partition(&old_cart_id)));
        }

        let copies: Vec<(CartKey, CartItem)> = items
            .iter()
            .map(|item| {
                let copy = item.moved_to(&new_cart_id);
                (copy.key(), copy)
            })
            .collect();
        let old_keys: Vec<CartKey> = items.iter().map(CartItem::key).collect();

        let (copy_results, remove_results) = join(
            join_all(copies.iter().map(|(key, item)| table.put_item(key, item))),
            join_all(old_keys.iter().map(|key| table.delete_item(key))),
        )
        .await;

        let mut outcome = BatchOutcome::new(items.len());
        for ((key, _), result) in copies.iter().zip(copy_results) {
            outcome.record(&key.sku, BatchStep::Copy, result);
        }
        for (key, result) in old_keys.iter().zip(remove_results) {
            outcome.record(&key.sku, BatchStep::Remove, result);
        }
        self.ensure_batch_success(OperationKind::ConvertCart, outcome)?;

        let event = BusinessEvent::cart_converted(&old_cart_id, &new_cart_id, &self.trace_id);
        self.publish_event(OperationKind::ConvertCart, event, resolver)
            .await;

        Ok(ResponseBuilder::ok_empty())
    }

    fn session_id(&self) -> Option<String> {
        self.parser
            .query_param(SESSION_ID_PARAM)
            .filter(|id| is_valid_session_id(id))
            .map(str::to_string)
    }

    fn require_cart_id(&self) -> Result<String, OperationError> {
        self.resolve_cart_id().ok_or(OperationError::Unauthorized)
    }

    fn require_sku(&self) -> Result<String, OperationError> {
        self.parser
            .path_param(PRODUCT_SKU_PARAM)
            .filter(|sku| !sku.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                OperationError::Validation(format!("Missing {} path parameter", PRODUCT_SKU_PARAM))
            })
    }

    fn ensure_batch_success(
        &self,
        operation: OperationKind,
        outcome: BatchOutcome,
    ) -> Result<(), OperationError> {
        if outcome.is_success() {
            return Ok(());
        }

        Err(OperationError::PartialBatchFailure {
            operation,
            attempted: outcome.attempted,
            failures: outcome.failures,
        })
    }

    /// ビジネスイベントをベストエフォートで発行する
    ///
    /// メッセージングポートを取得できない場合はログのみ残す。
    /// 未設定の報告はリゾルバーが済ませている。
    async fn publish_event<R: DependencyResolver>(
        &mut self,
        operation: OperationKind,
        event: BusinessEvent,
        resolver: &R,
    ) {
        let bus = match resolver.message_bus().await {
            Ok(bus) => bus,
            Err(error) => {
                let mut context = BTreeMap::new();
                context.insert("action".to_string(), event.action.to_string());
                context.insert("code".to_string(), error.code.to_string());
                self.logger.error(
                    COMPONENT,
                    "Message bus unavailable, event dropped",
                    Some(self.trace_id.as_str()),
                    Some(context),
                );
                return;
            }
        };

        let metric_bus = resolver.metric_bus();
        let logger = Arc::clone(&self.logger);
        let trace_id = self.trace_id.clone();

        self.side_effects.spawn(async move {
            match bus.publish(&event).await {
                Ok(message_id) => {
                    logger.debug(
                        COMPONENT,
                        &format!("Published {} event as {}", event.action, message_id),
                        Some(trace_id.as_str()),
                    );
                }
                Err(error) => {
                    let mut context = BTreeMap::new();
                    context.insert("action".to_string(), event.action.to_string());
                    context.insert("code".to_string(), error.code.to_string());
                    context.insert("resource".to_string(), error.resource_name().to_string());
                    if let Some(payload) = &error.payload {
                        context.insert("payload".to_string(), payload.to_string());
                    }
                    logger.error(
                        COMPONENT,
                        "Failed to publish business event",
                        Some(trace_id.as_str()),
                        Some(context),
                    );

                    let metric = MetricBuilder::count(BackendMetric::NotificationFailure)
                        .with_resource(error.resource_name())
                        .with_resource_type(ResourceType::Topic.as_str())
                        .with_dimension("Operation", operation.as_str())
                        .with_dimension("ErrorCode", error.code.as_str())
                        .build();
                    publish_metric(metric_bus.as_ref(), logger.as_ref(), &metric, &trace_id).await;
                }
            }
        });
    }

    /// 失敗をログに残し、必要に応じてメトリクスを発行する
    fn report_failure<R: DependencyResolver>(
        &mut self,
        operation: Option<OperationKind>,
        error: &OperationError,
        resolver: &R,
    ) {
        let operation_name = operation.map_or("None", |kind| kind.as_str());

        match error {
            OperationError::Dependency(service_error) => {
                let mut context = BTreeMap::new();
                context.insert("operation".to_string(), operation_name.to_string());
                context.insert("code".to_string(), service_error.code.to_string());
                context.insert("httpStatusCode".to_string(), service_error.http_status_code.to_string());
                if let Some(resource) = &service_error.resource {
                    context.insert("resource".to_string(), resource.to_string());
                }
                if let Some(payload) = &service_error.payload {
                    context.insert("payload".to_string(), payload.to_string());
                }
                if service_error.code == ServiceErrorCode::Undefined {
                    context.insert("unidentified".to_string(), "true".to_string());
                }
                self.logger.error(
                    COMPONENT,
                    "Dependency call failed",
                    Some(self.trace_id.as_str()),
                    Some(context),
                );

                if service_error.code != ServiceErrorCode::DependencyNotConfigured {
                    let metric = MetricBuilder::count(BackendMetric::DependencyFailure)
                        .with_resource(service_error.resource_name())
                        .with_resource_type(service_error.resource_type())
                        .with_dimension("Operation", operation_name)
                        .with_dimension("ErrorCode", service_error.code.as_str())
                        .build();
                    self.spawn_metric(resolver.metric_bus(), metric);
                }
            }
            OperationError::PartialBatchFailure {
                operation: batch_operation,
                attempted,
                failures,
            } => {
                let failed_skus: Vec<String> = failures
                    .iter()
                    .map(|f| format!("{}:{}", f.sku, f.step))
                    .collect();
                let resource_name = failures
                    .first()
                    .map_or("unknown", |f| f.error.resource_name())
                    .to_string();

                let mut context = BTreeMap::new();
                context.insert("operation".to_string(), batch_operation.to_string());
                context.insert("attempted".to_string(), attempted.to_string());
                context.insert("failed".to_string(), failures.len().to_string());
                context.insert("failedSkus".to_string(), failed_skus.join(","));
                if let Some(first) = failures.first() {
                    context.insert("code".to_string(), first.error.code.to_string());
                }
                self.logger.error(
                    COMPONENT,
                    "Batch operation partially failed",
                    Some(self.trace_id.as_str()),
                    Some(context),
                );

                let metric = MetricBuilder::new(
                    BackendMetric::PartialBatchFailure.as_str(),
                    failures.len() as f64,
                )
                .with_resource(&resource_name)
                .with_resource_type(ResourceType::Table.as_str())
                .with_dimension("Operation", batch_operation.as_str())
                .build();
                self.spawn_metric(resolver.metric_bus(), metric);
            }
            OperationError::Serialization(serde_error) => {
                self.logger.error(
                    COMPONENT,
                    &format!("Failed to serialize response: {}", serde_error),
                    Some(self.trace_id.as_str()),
                    None,
                );
            }
            OperationError::InvalidRoute
            | OperationError::Validation(_)
            | OperationError::Unauthorized
            | OperationError::NotFound(_) => {
                let mut context = BTreeMap::new();
                context.insert("operation".to_string(), operation_name.to_string());
                context.insert("statusCode".to_string(), error.status_code().to_string());
                self.logger.warn(
                    COMPONENT,
                    &error.to_string(),
                    Some(self.trace_id.as_str()),
                    Some(context),
                );
            }
        }
    }

    fn spawn_metric(&mut self, metric_bus: Arc<dyn MetricBus>, metric: InfrastructureMetric) {
        let logger = Arc::clone(&self.logger);
        let trace_id = self.trace_id.clone();

        self.side_effects.spawn(async move {
            publish_metric(metric_bus.as_ref(), logger.as_ref(), &metric, &trace_id).await;
        });
    }
}

async fn publish_metric(
    metric_bus: &dyn MetricBus,
    logger: &dyn Logger,
    metric: &InfrastructureMetric,
    trace_id: &str,
) {
    if let Err(error) = metric_bus.publish(metric).await {
        let mut context = BTreeMap::new();
        context.insert("metric".to_string(), metric.name.clone());
        context.insert("code".to_string(), error.code.to_string());
        logger.warn(
            COMPONENT,
            "Failed to publish metric",
            Some(trace_id),
            Some(context),
        );
    }
}

/// 1リクエストを処理する入口
///
/// レスポンスを決めたあと、返す前に副作用の完了を待つ。
pub async fn handle_request<R: DependencyResolver>(
    resolver: &R,
    event: R::Event,
    trace_id: &str,
    logger: Arc<dyn Logger>,
) -> HttpResponse {
    let mut executor = CartOperationExecutor::new(resolver.input_parser(event), trace_id, logger);

    let response = executor.execute(resolver).await;
    executor.settle().await;

    response
}
