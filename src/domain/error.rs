use serde::Serialize;
use std::fmt;

/// ドメイン層のエラー型
/// カート商品の組み立て時の入力不備を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 必須フィールドの欠落（例: price がない）
    MissingField(String),
    /// 型や形式が不正な値
    InvalidValue(String),
    /// ペイロードがJSONオブジェクトでない
    InvalidPayload(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::MissingField(field) => write!(f, "Missing required field: {}", field),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// 依存リソースの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Table,
    Topic,
    Metric,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Table => "table",
            ResourceType::Topic => "topic",
            ResourceType::Metric => "metric",
        }
    }
}

/// 失敗した依存リソースの記述子
/// ログとメトリクスのディメンションに使う
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
}

impl ResourceDescriptor {
    pub fn new(resource_type: ResourceType, name: impl Into<String>) -> Self {
        Self {
            resource_type,
            name: name.into(),
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(ResourceType::Table, name)
    }

    pub fn topic(name: impl Into<String>) -> Self {
        Self::new(ResourceType::Topic, name)
    }

    pub fn metric(name: impl Into<String>) -> Self {
        Self::new(ResourceType::Metric, name)
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// サービスエラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorCode {
    NetworkError,
    InvalidObjectBody,
    DependencyNotConfigured,
    InvalidStoredItem,
    Undefined,
}

impl ServiceErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceErrorCode::NetworkError => "NetworkError",
            ServiceErrorCode::InvalidObjectBody => "InvalidObjectBody",
            ServiceErrorCode::DependencyNotConfigured => "DependencyNotConfigured",
            ServiceErrorCode::InvalidStoredItem => "InvalidStoredItem",
            ServiceErrorCode::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 依存サービス（ストレージ、メッセージング、メトリクス）の呼び出し失敗
///
/// ポートの実装はバックエンド固有のエラーをこの型に変換して返す。
/// HTTPレスポンスには出さず、ログとメトリクスにのみ詳細を残す。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code} (status {http_status_code})")]
pub struct ServiceError {
    pub code: ServiceErrorCode,
    pub http_status_code: u16,
    pub resource: Option<ResourceDescriptor>,
    pub payload: Option<serde_json::Value>,
}

impl ServiceError {
    /// 500 を既定値として新しいエラーを作成
    pub fn new(code: ServiceErrorCode, resource: Option<ResourceDescriptor>) -> Self {
        Self {
            code,
            http_status_code: 500,
            resource,
            payload: None,
        }
    }

    pub fn with_status(mut self, http_status_code: u16) -> Self {
        self.http_status_code = http_status_code;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn resource_name(&self) -> &str {
        self.resource.as_ref().map(|r| r.name.as_str()).unwrap_or("unknown")
    }

    pub fn resource_type(&self) -> &str {
        self.resource
            .as_ref()
            .map(|r| r.resource_type.as_str())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_descriptor_display_matches_json() {
        let descriptor = ResourceDescriptor::table("ShoppingCart");
        let json = serde_json::to_string(&descriptor).unwrap();

        assert_eq!(json, r#"{"type":"table","name":"ShoppingCart"}"#);
        assert_eq!(descriptor.to_string(), json);
    }

    #[test]
    fn test_service_error_defaults_to_internal_error() {
        let error = ServiceError::new(
            ServiceErrorCode::DependencyNotConfigured,
            Some(ResourceDescriptor::topic("cart-events")),
        );

        assert_eq!(error.http_status_code, 500);
        assert_eq!(error.resource_name(), "cart-events");
        assert_eq!(error.resource_type(), "topic");
        assert!(error.payload.is_none());
        assert_eq!(error.to_string(), "DependencyNotConfigured (status 500)");
    }
}
