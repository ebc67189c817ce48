use crate::adapter::config::{ServiceConfig, TABLE_NAME_VAR, TOPIC_ARN_VAR};
use crate::adapter::driven::cloudwatch_metric::CloudWatchMetricBus;
use crate::adapter::driven::dynamodb_table::DynamoDbCartTable;
use crate::adapter::driven::sns_topic::SnsTopic;
use crate::adapter::driver::api_gateway::ApiGatewayEventParser;
use crate::application::dependency::report_not_configured;
use crate::domain::error::{ResourceDescriptor, ServiceError};
use crate::domain::port::{
    CartTable, DependencyResolver, InputParser, Logger, MessageBus, MetricBus,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_lambda_events::apigw::ApiGatewayProxyRequest;
use std::sync::Arc;

/// AWS SDK クライアント一式
/// コールドスタート時に一度だけ作成し、リクエスト間で共有する
#[derive(Clone)]
pub struct AwsClients {
    pub dynamodb: aws_sdk_dynamodb::Client,
    pub sns: aws_sdk_sns::Client,
    pub cloudwatch: aws_sdk_cloudwatch::Client,
}

impl AwsClients {
    pub fn new(sdk_config: &SdkConfig, config: &ServiceConfig) -> Self {
        let dynamodb = match &config.dynamo_endpoint_url {
            Some(url) => {
                let dynamodb_config = aws_sdk_dynamodb::config::Builder::from(sdk_config)
                    .endpoint_url(url)
                    .build();
                aws_sdk_dynamodb::Client::from_conf(dynamodb_config)
            }
            None => aws_sdk_dynamodb::Client::new(sdk_config),
        };

        Self {
            dynamodb,
            sns: aws_sdk_sns::Client::new(sdk_config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(sdk_config),
        }
    }
}

/// AWS 上の依存リゾルバー
///
/// リクエストごとに作成する。テーブル名やトピックが設定されていなければ
/// ポートを返さずに未設定として報告する。
pub struct AwsDependencyResolver {
    clients: AwsClients,
    config: ServiceConfig,
    logger: Arc<dyn Logger>,
}

impl AwsDependencyResolver {
    pub fn new(clients: AwsClients, config: ServiceConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            clients,
            config,
            logger,
        }
    }
}

#[async_trait]
impl DependencyResolver for AwsDependencyResolver {
    type Event = ApiGatewayProxyRequest;

    fn input_parser(&self, event: ApiGatewayProxyRequest) -> Box<dyn InputParser> {
        Box::new(ApiGatewayEventParser::new(event))
    }

    async fn cart_table(&self) -> Result<Arc<dyn CartTable>, ServiceError> {
        match &self.config.table_name {
            Some(table_name) => Ok(Arc::new(DynamoDbCartTable::new(
                self.clients.dynamodb.clone(),
                table_name,
            ))),
            None => Err(report_not_configured(
                ResourceDescriptor::table(TABLE_NAME_VAR),
                self.metric_bus().as_ref(),
                self.logger.as_ref(),
            )
            .await),
        }
    }

    async fn message_bus(&self) -> Result<Arc<dyn MessageBus>, ServiceError> {
        match &self.config.topic_arn {
            Some(topic_arn) => Ok(Arc::new(SnsTopic::new(self.clients.sns.clone(), topic_arn))),
            None => Err(report_not_configured(
                ResourceDescriptor::topic(TOPIC_ARN_VAR),
                self.metric_bus().as_ref(),
                self.logger.as_ref(),
            )
            .await),
        }
    }

    fn metric_bus(&self) -> Arc<dyn MetricBus> {
        Arc::new(CloudWatchMetricBus::new(
            self.clients.cloudwatch.clone(),
            &self.config.metric_namespace,
        ))
    }
}
