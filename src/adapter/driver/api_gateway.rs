use crate::adapter::config::ServiceConfig;
use crate::adapter::driven::{AwsClients, AwsDependencyResolver, TracingLogger};
use crate::application::response::HttpResponse;
use crate::application::service::handle_request;
use crate::domain::port::{InputParser, Logger};
use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use lambda_runtime::{Error, LambdaEvent};
use std::sync::Arc;

const AUTHORIZATION_HEADER: &str = "Authorization";

/// API Gateway プロキシイベントの入力パーサー
pub struct ApiGatewayEventParser {
    request: ApiGatewayProxyRequest,
}

impl ApiGatewayEventParser {
    pub fn new(request: ApiGatewayProxyRequest) -> Self {
        Self { request }
    }
}

impl InputParser for ApiGatewayEventParser {
    fn http_method(&self) -> &str {
        self.request.http_method.as_str()
    }

    fn resource(&self) -> &str {
        self.request.resource.as_deref().unwrap_or_default()
    }

    fn identity_token(&self) -> Option<&str> {
        self.request
            .headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.request.path_parameters.get(name).map(String::as_str)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.request.query_string_parameters.first(name)
    }

    fn payload(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        match self.request.body.as_deref() {
            Some(body) if !body.trim().is_empty() => serde_json::from_str(body).map(Some),
            _ => Ok(None),
        }
    }
}

/// Lambda 関数ハンドラー
///
/// リクエストIDをトレースIDとして使い、副作用の完了を待ってから返す。
pub async fn function_handler(
    clients: &AwsClients,
    config: &ServiceConfig,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let (request, context) = event.into_parts();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let resolver = AwsDependencyResolver::new(clients.clone(), config.clone(), Arc::clone(&logger));

    let response = handle_request(&resolver, request, &context.request_id, logger).await;

    Ok(into_api_gateway_response(response))
}

/// 正規化されたレスポンスを API Gateway の形式に変換する
/// ヘッダーとして不正な名前や値は捨てる
pub fn into_api_gateway_response(response: HttpResponse) -> ApiGatewayProxyResponse {
    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    ApiGatewayProxyResponse {
        status_code: i64::from(response.status_code),
        headers,
        body: response.body.map(Body::Text),
        ..Default::default()
    }
}
