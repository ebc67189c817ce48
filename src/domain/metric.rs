use chrono::{DateTime, Utc};
use serde::Serialize;

/// バックエンドが発行するメトリクス名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMetric {
    /// 必須の設定がなく依存リソースを構築できなかった
    DependencyNotConfigured,
    /// ストレージなどの依存呼び出しが失敗した
    DependencyFailure,
    /// 変更成功後のイベント発行が失敗した
    NotificationFailure,
    /// 複数商品の一括操作が一部失敗した
    PartialBatchFailure,
}

impl BackendMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendMetric::DependencyNotConfigured => "DependencyNotConfigured",
            BackendMetric::DependencyFailure => "DependencyFailure",
            BackendMetric::NotificationFailure => "NotificationFailure",
            BackendMetric::PartialBatchFailure => "PartialBatchFailure",
        }
    }
}

/// メトリクスのディメンション
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDimension {
    pub name: String,
    pub value: String,
}

/// インフラメトリクス（書き込み専用のカウンター）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfrastructureMetric {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub value: f64,
    pub dimensions: Vec<MetricDimension>,
}

impl InfrastructureMetric {
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// メトリクスビルダー
/// ディメンションは追加した順序で保持する
#[derive(Debug, Clone)]
pub struct MetricBuilder {
    timestamp: DateTime<Utc>,
    name: String,
    value: f64,
    dimensions: Vec<MetricDimension>,
}

impl MetricBuilder {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            name: name.into(),
            value,
            dimensions: Vec::new(),
        }
    }

    /// 既知のメトリクス名から値1のカウンターを作成
    pub fn count(metric: BackendMetric) -> Self {
        Self::new(metric.as_str(), 1.0)
    }

    pub fn with_resource(self, resource_name: &str) -> Self {
        self.with_dimension("Resource", resource_name)
    }

    pub fn with_resource_type(self, resource_type: &str) -> Self {
        self.with_dimension("ResourceType", resource_type)
    }

    pub fn with_dimension(mut self, name: &str, value: &str) -> Self {
        self.dimensions.push(MetricDimension {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn build(self) -> InfrastructureMetric {
        InfrastructureMetric {
            timestamp: self.timestamp,
            name: self.name,
            value: self.value,
            dimensions: self.dimensions,
        }
    }
}
