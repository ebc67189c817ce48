use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// HTTPステータスコード
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// 内部詳細を隠したエラー理由
pub const REDACTED: &str = "REDACTED";

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// 正規化されたレスポンス（ステータスコード、ヘッダー、ボディ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// ボディをJSONとしてデコードする
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail<'a> {
    status_code: u16,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

/// レスポンスビルダー
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// 200 OK
    pub fn ok(result: Value) -> HttpResponse {
        Self::respond(status::OK, Some(result), None)
    }

    /// 200 OK（ボディなし）
    pub fn ok_empty() -> HttpResponse {
        Self::respond(status::OK, None, None)
    }

    /// 201 Created（Location ヘッダー付き）
    pub fn created(location: &str, result: Value) -> HttpResponse {
        Self::respond(status::CREATED, Some(result), Some(("Location", location)))
    }

    /// 400 Bad Request
    pub fn bad_request(reason: &str, trace_id: &str) -> HttpResponse {
        Self::error(status::BAD_REQUEST, reason, trace_id)
    }

    /// 401 Unauthorized（理由は常に伏せる）
    pub fn unauthorized(trace_id: &str) -> HttpResponse {
        Self::error(status::UNAUTHORIZED, REDACTED, trace_id)
    }

    /// 404 Not Found
    pub fn not_found(reason: &str, trace_id: &str) -> HttpResponse {
        Self::error(status::NOT_FOUND, reason, trace_id)
    }

    /// 500 Internal Server Error（理由は常に伏せる）
    pub fn internal_error(trace_id: &str) -> HttpResponse {
        Self::error(status::INTERNAL_SERVER_ERROR, REDACTED, trace_id)
    }

    fn error(status_code: u16, reason: &str, trace_id: &str) -> HttpResponse {
        let message = if trace_id.is_empty() {
            reason.to_string()
        } else {
            format!("{}:TraceId -> {}", reason, trace_id)
        };
        let body = ErrorBody {
            error: ErrorDetail {
                status_code,
                message: &message,
            },
        };

        Self::respond(status_code, serde_json::to_value(body).ok(), None)
    }

    fn respond(status_code: u16, result: Option<Value>, extra_header: Option<(&str, &str)>) -> HttpResponse {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        if let Some((name, value)) = extra_header {
            headers.insert(name.to_string(), value.to_string());
        }

        HttpResponse {
            status_code,
            headers,
            body: result.filter(|v| !v.is_null()).map(|v| v.to_string()),
        }
    }
}
