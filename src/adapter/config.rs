use std::env;

pub const TABLE_NAME_VAR: &str = "DYNAMO_TABLE_NAME";
pub const TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";
pub const METRIC_NAMESPACE_VAR: &str = "METRIC_NAMESPACE";
pub const ENDPOINT_URL_VAR: &str = "DYNAMO_ENDPOINT_URL";

const DEFAULT_METRIC_NAMESPACE: &str = "ShoppingCart";

/// サービス設定を管理する構造体
///
/// テーブル名とトピックは起動時には必須としない。欠けている場合は
/// リクエストごとに依存リソース未設定として扱う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub table_name: Option<String>,
    pub topic_arn: Option<String>,
    pub metric_namespace: String,
    pub dynamo_endpoint_url: Option<String>,
}

/// 設定エラー
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServiceConfig {
    /// 環境変数から設定を読み取る
    /// 空文字列は未設定として扱う
    pub fn from_env() -> Result<Self, ConfigError> {
        let table_name = non_empty_var(TABLE_NAME_VAR);
        let topic_arn = non_empty_var(TOPIC_ARN_VAR);

        let metric_namespace = non_empty_var(METRIC_NAMESPACE_VAR)
            .unwrap_or_else(|| DEFAULT_METRIC_NAMESPACE.to_string());

        let dynamo_endpoint_url = match non_empty_var(ENDPOINT_URL_VAR) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url),
            Some(url) => {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid {}: {} (expected http:// or https://)",
                    ENDPOINT_URL_VAR, url
                )))
            }
            None => None,
        };

        Ok(Self {
            table_name,
            topic_arn,
            metric_namespace,
            dynamo_endpoint_url,
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            table_name: None,
            topic_arn: None,
            metric_namespace: DEFAULT_METRIC_NAMESPACE.to_string(),
            dynamo_endpoint_url: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // テスト間の環境変数の競合を防ぐためのロック
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_vars() {
        env::remove_var(TABLE_NAME_VAR);
        env::remove_var(TOPIC_ARN_VAR);
        env::remove_var(METRIC_NAMESPACE_VAR);
        env::remove_var(ENDPOINT_URL_VAR);
    }

    #[test]
    fn test_from_env_with_all_variables() {
        let _lock = ENV_LOCK.lock().unwrap();

        env::set_var(TABLE_NAME_VAR, "ShoppingCart");
        env::set_var(TOPIC_ARN_VAR, "arn:aws:sns:us-east-1:123456789012:cart-events");
        env::set_var(METRIC_NAMESPACE_VAR, "CartBackend");
        env::set_var(ENDPOINT_URL_VAR, "http://localhost:8000");

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config.table_name.as_deref(), Some("ShoppingCart"));
        assert_eq!(
            config.topic_arn.as_deref(),
            Some("arn:aws:sns:us-east-1:123456789012:cart-events")
        );
        assert_eq!(config.metric_namespace, "CartBackend");
        assert_eq!(config.dynamo_endpoint_url.as_deref(), Some("http://localhost:8000"));

        clear_vars();
    }

    #[test]
    fn test_from_env_with_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();

        clear_vars();

        let config = ServiceConfig::from_env().unwrap();

        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.metric_namespace, "ShoppingCart");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let _lock = ENV_LOCK.lock().unwrap();

        env::set_var(TABLE_NAME_VAR, "");
        env::set_var(TOPIC_ARN_VAR, "  ");

        let config = ServiceConfig::from_env().unwrap();

        assert!(config.table_name.is_none());
        assert!(config.topic_arn.is_none());

        clear_vars();
    }

    #[test]
    fn test_invalid_endpoint_url() {
        let _lock = ENV_LOCK.lock().unwrap();

        env::set_var(ENDPOINT_URL_VAR, "localhost:8000");

        let result = ServiceConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        clear_vars();
    }
}
