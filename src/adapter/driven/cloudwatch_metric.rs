use crate::adapter::driven::aws_error::parse_sdk_error;
use crate::domain::error::{ResourceDescriptor, ServiceError};
use crate::domain::metric::InfrastructureMetric;
use crate::domain::port::MetricBus;
use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_cloudwatch::Client;

const STORAGE_RESOLUTION_SECONDS: i32 = 60;

/// CloudWatch へのメトリクス発行
pub struct CloudWatchMetricBus {
    client: Client,
    namespace: String,
}

impl CloudWatchMetricBus {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn resource(&self) -> ResourceDescriptor {
        ResourceDescriptor::metric(&self.namespace)
    }
}

/// カウンター値のデータポイントに変換する
/// ディメンションは追加された順序のまま渡す
fn metric_datum(metric: &InfrastructureMetric) -> MetricDatum {
    let dimensions = metric.dimensions.iter().map(|dimension| {
        Dimension::builder()
            .name(&dimension.name)
            .value(&dimension.value)
            .build()
    });

    MetricDatum::builder()
        .metric_name(&metric.name)
        .value(metric.value)
        .unit(StandardUnit::Count)
        .storage_resolution(STORAGE_RESOLUTION_SECONDS)
        .timestamp(DateTime::from_millis(metric.timestamp.timestamp_millis()))
        .set_dimensions(Some(dimensions.collect()))
        .build()
}

#[async_trait]
impl MetricBus for CloudWatchMetricBus {
    async fn publish(&self, metric: &InfrastructureMetric) -> Result<(), ServiceError> {
        self.client
            .put_metric_data()
            .namespace(&self.namespace)
            .metric_data(metric_datum(metric))
            .send()
            .await
            .map_err(|e| parse_sdk_error(&e, self.resource()))?;

        Ok(())
    }
}
