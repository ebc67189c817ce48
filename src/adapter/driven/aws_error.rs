use crate::domain::error::{ResourceDescriptor, ServiceError, ServiceErrorCode};
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use std::fmt;

/// AWS SDK のエラーを `ServiceError` に変換する
///
/// DynamoDB、SNS、CloudWatch のいずれの操作エラーにも使える。
/// 通信失敗とタイムアウトは `NetworkError`、入力検証の失敗は
/// `InvalidObjectBody`（400）、それ以外は `Undefined` とする。
pub fn parse_sdk_error<E, R>(error: &SdkError<E, R>, resource: ResourceDescriptor) -> ServiceError
where
    E: ProvideErrorMetadata + fmt::Debug,
    R: fmt::Debug,
{
    let code = match error {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ServiceErrorCode::NetworkError,
        _ => match error.code() {
            Some("ValidationException") | Some("MissingRequiredParameter") => {
                ServiceErrorCode::InvalidObjectBody
            }
            _ => ServiceErrorCode::Undefined,
        },
    };

    let status = match code {
        ServiceErrorCode::InvalidObjectBody => 400,
        _ => 500,
    };

    ServiceError::new(code, Some(resource))
        .with_status(status)
        .with_payload(serde_json::json!({
            "code": error.code(),
            "message": error.message(),
            "detail": format!("{:?}", error),
        }))
}
