use crate::adapter::driven::aws_error::parse_sdk_error;
use crate::domain::error::{ResourceDescriptor, ServiceError, ServiceErrorCode};
use crate::domain::event::BusinessEvent;
use crate::domain::port::MessageBus;
use async_trait::async_trait;
use aws_sdk_sns::Client;

/// SNS トピックへのメッセージ発行
pub struct SnsTopic {
    client: Client,
    topic_arn: String,
}

impl SnsTopic {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }

    fn resource(&self) -> ResourceDescriptor {
        ResourceDescriptor::topic(&self.topic_arn)
    }

    /// 発行するメッセージ本文（JSON）を作成する
    fn message(&self, event: &BusinessEvent) -> Result<String, ServiceError> {
        event.to_message().map_err(|e| {
            ServiceError::new(ServiceErrorCode::InvalidObjectBody, Some(self.resource()))
                .with_status(400)
                .with_payload(serde_json::json!({ "reason": e.to_string() }))
        })
    }
}

#[async_trait]
impl MessageBus for SnsTopic {
    async fn publish(&self, event: &BusinessEvent) -> Result<String, ServiceError> {
        let message = self.message(event)?;

        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| parse_sdk_error(&e, self.resource()))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
