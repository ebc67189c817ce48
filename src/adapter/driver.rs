// 駆動する側アダプター（Lambda ハンドラー、入力パーサー）

pub mod api_gateway;
pub mod in_memory_request;

pub use api_gateway::{function_handler, ApiGatewayEventParser};
pub use in_memory_request::InMemoryRequest;
