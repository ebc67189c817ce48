use crate::domain::port::InputParser;
use std::collections::BTreeMap;

/// インメモリのリクエスト
/// テストやローカル実行で API Gateway イベントの代わりに使う
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRequest {
    method: String,
    resource: String,
    identity_token: Option<String>,
    path_params: BTreeMap<String, String>,
    query_params: BTreeMap<String, String>,
    body: Option<String>,
}

impl InMemoryRequest {
    pub fn new(method: &str, resource: &str) -> Self {
        Self {
            method: method.to_string(),
            resource: resource.to_string(),
            ..Default::default()
        }
    }

    pub fn with_identity_token(mut self, token: &str) -> Self {
        self.identity_token = Some(token.to_string());
        self
    }

    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query_param(mut self, name: &str, value: &str) -> Self {
        self.query_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json_body(self, body: &serde_json::Value) -> Self {
        self.with_body(body.to_string())
    }
}

impl InputParser for InMemoryRequest {
    fn http_method(&self) -> &str {
        &self.method
    }

    fn resource(&self) -> &str {
        &self.resource
    }

    fn identity_token(&self) -> Option<&str> {
        self.identity_token.as_deref()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    fn payload(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => serde_json::from_str(body).map(Some),
            _ => Ok(None),
        }
    }
}
