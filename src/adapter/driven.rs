// 駆動される側アダプター（ストレージ、メッセージング、メトリクス、ログ）

pub mod aws_error;
pub mod aws_resolver;
pub mod cloudwatch_metric;
pub mod dynamodb_table;
pub mod in_memory;
pub mod sns_topic;
pub mod tracing_logger;

pub use aws_resolver::{AwsClients, AwsDependencyResolver};
pub use cloudwatch_metric::CloudWatchMetricBus;
pub use dynamodb_table::DynamoDbCartTable;
pub use in_memory::{
    FailingCartTable, InMemoryCartTable, InMemoryDependencyResolver, InMemoryMessageBus,
    InMemoryMetricBus, RecordingLogger,
};
pub use sns_topic::SnsTopic;
pub use tracing_logger::TracingLogger;
