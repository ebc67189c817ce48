use crate::domain::error::{ResourceDescriptor, ServiceError, ServiceErrorCode};
use crate::domain::metric::{BackendMetric, MetricBuilder};
use crate::domain::port::{Logger, MetricBus};
use std::collections::BTreeMap;

const COMPONENT: &str = "DependencyResolver";

/// 必須の設定がない依存リソースを報告する
///
/// ログを出力し、`DependencyNotConfigured` メトリクスの発行を試みたうえで
/// 呼び出し元へ返すエラーを作成する。メトリクス発行の失敗は無視する。
pub async fn report_not_configured(
    resource: ResourceDescriptor,
    metric_bus: &dyn MetricBus,
    logger: &dyn Logger,
) -> ServiceError {
    let error = ServiceError::new(ServiceErrorCode::DependencyNotConfigured, Some(resource));

    let mut context = BTreeMap::new();
    context.insert("code".to_string(), error.code.to_string());
    context.insert("resource".to_string(), error.resource_name().to_string());
    context.insert("resourceType".to_string(), error.resource_type().to_string());
    logger.error(COMPONENT, "Dependency is not configured", None, Some(context));

    let metric = MetricBuilder::count(BackendMetric::DependencyNotConfigured)
        .with_resource(error.resource_name())
        .with_resource_type(error.resource_type())
        .build();

    if let Err(metric_error) = metric_bus.publish(&metric).await {
        logger.debug(
            COMPONENT,
            &format!("Ignoring metric publish failure: {}", metric_error),
            None,
        );
    }

    error
}
