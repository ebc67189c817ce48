use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// カート商品として必須のフィールド
pub const REQUIRED_FIELDS: [&str; 4] = ["sku", "name", "price", "quantity"];

/// カート商品の複合キー（パーティションキー = cartId、ソートキー = sku）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub cart_id: String,
    pub sku: String,
}

impl CartKey {
    pub fn new(cart_id: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            cart_id: cart_id.into(),
            sku: sku.into(),
        }
    }

    /// 404レスポンスやログに載せるルックアップキー表現
    pub fn describe(&self) -> String {
        serde_json::json!({ "cartId": self.cart_id, "sku": self.sku }).to_string()
    }

    /// パーティション単位のルックアップキー表現
    pub fn describe_partition(cart_id: &str) -> String {
        serde_json::json!({ "cartId": cart_id }).to_string()
    }
}

/// カート内の商品1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_id: String,
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl CartItem {
    pub fn key(&self) -> CartKey {
        CartKey::new(&self.cart_id, &self.sku)
    }

    /// 別のカートへ移すためのコピーを作成
    /// sku と商品属性はそのまま引き継ぐ
    pub fn moved_to(&self, cart_id: &str) -> Self {
        Self {
            cart_id: cart_id.to_string(),
            ..self.clone()
        }
    }

    /// キーのフィールドを上書きしたコピーを作成
    pub fn keyed_by(&self, key: &CartKey) -> Self {
        Self {
            cart_id: key.cart_id.clone(),
            sku: key.sku.clone(),
            ..self.clone()
        }
    }
}

/// 必須フィールドがすべて存在するか検証する
///
/// `null` は欠落として扱う。
pub fn is_valid_event_body(body: &Map<String, Value>) -> bool {
    REQUIRED_FIELDS
        .iter()
        .all(|field| body.get(*field).is_some_and(|value| !value.is_null()))
}

/// リクエストボディとキーをマージした商品候補
///
/// キーは後から適用され、ボディ中の同名フィールドより優先される。
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemCandidate {
    fields: Map<String, Value>,
}

impl CartItemCandidate {
    /// デコード済みのペイロードから候補を作成
    /// ボディがない場合は空のオブジェクトとして扱う
    pub fn from_payload(payload: Option<Value>) -> Result<Self, DomainError> {
        match payload {
            None | Some(Value::Null) => Ok(Self { fields: Map::new() }),
            Some(Value::Object(fields)) => Ok(Self { fields }),
            Some(other) => Err(DomainError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn with_cart_id(mut self, cart_id: &str) -> Self {
        self.fields
            .insert("cartId".to_string(), Value::String(cart_id.to_string()));
        self
    }

    pub fn with_sku(mut self, sku: &str) -> Self {
        self.fields
            .insert("sku".to_string(), Value::String(sku.to_string()));
        self
    }

    pub fn is_valid(&self) -> bool {
        is_valid_event_body(&self.fields)
    }

    /// 候補を検証してカート商品に変換する
    pub fn into_item(self) -> Result<CartItem, DomainError> {
        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|field| self.fields.get(**field).map_or(true, Value::is_null))
        {
            return Err(DomainError::MissingField(missing.to_string()));
        }
        if !self.fields.contains_key("cartId") {
            return Err(DomainError::MissingField("cartId".to_string()));
        }

        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| DomainError::InvalidValue(e.to_string()))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("テスト用の値はオブジェクトである必要があります"),
        }
    }

    #[test]
    fn test_valid_event_body() {
        let body = object(json!({
            "sku": "6789", "name": "Product Example", "price": 10.55, "quantity": 15
        }));

        assert!(is_valid_event_body(&body));
    }

    #[test]
    fn test_event_body_missing_each_field_is_invalid() {
        for missing in REQUIRED_FIELDS {
            let mut body = object(json!({
                "sku": "6789", "name": "Product Example", "price": 10.55, "quantity": 15
            }));
            body.remove(missing);

            assert!(!is_valid_event_body(&body), "{} が欠落しても有効と判定された", missing);
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let body = object(json!({
            "sku": "6789", "name": null, "price": 10.55, "quantity": 15
        }));

        assert!(!is_valid_event_body(&body));
    }

    #[test]
    fn test_candidate_keys_override_body_fields() {
        let candidate = CartItemCandidate::from_payload(Some(json!({
            "cartId": "someone-else", "sku": "body-sku", "name": "Mug", "price": 4.5, "quantity": 2
        })))
        .unwrap()
        .with_cart_id("cart-1")
        .with_sku("path-sku");

        let item = candidate.into_item().unwrap();

        assert_eq!(item.cart_id, "cart-1");
        assert_eq!(item.sku, "path-sku");
        assert_eq!(item.name, "Mug");
    }

    #[test]
    fn test_candidate_tolerates_missing_body_sku_when_key_supplies_it() {
        let candidate = CartItemCandidate::from_payload(Some(json!({
            "name": "Mug", "price": 4.5, "quantity": 2
        })))
        .unwrap()
        .with_cart_id("cart-1")
        .with_sku("path-sku");

        assert!(candidate.is_valid());
        assert_eq!(candidate.into_item().unwrap().sku, "path-sku");
    }

    #[test]
    fn test_candidate_reports_missing_price() {
        let candidate = CartItemCandidate::from_payload(Some(json!({
            "sku": "6789", "name": "Mug", "quantity": 2
        })))
        .unwrap()
        .with_cart_id("cart-1");

        assert!(!candidate.is_valid());
        assert_eq!(
            candidate.into_item(),
            Err(DomainError::MissingField("price".to_string()))
        );
    }

    #[test]
    fn test_candidate_rejects_non_object_payload() {
        let result = CartItemCandidate::from_payload(Some(json!([1, 2, 3])));

        assert!(matches!(result, Err(DomainError::InvalidPayload(_))));
    }

    #[test]
    fn test_candidate_rejects_wrongly_typed_quantity() {
        let candidate = CartItemCandidate::from_payload(Some(json!({
            "sku": "6789", "name": "Mug", "price": 4.5, "quantity": "many"
        })))
        .unwrap()
        .with_cart_id("cart-1");

        assert!(matches!(candidate.into_item(), Err(DomainError::InvalidValue(_))));
    }

    #[test]
    fn test_moved_to_keeps_attributes() {
        let item = CartItem {
            cart_id: "session-1".to_string(),
            sku: "6789".to_string(),
            name: "Product Example".to_string(),
            price: 10.55,
            quantity: 15,
        };

        let moved = item.moved_to("user-1");

        assert_eq!(moved.cart_id, "user-1");
        assert_eq!(moved.key(), CartKey::new("user-1", "6789"));
        assert_eq!(moved.price, item.price);
        assert_eq!(moved.quantity, item.quantity);
    }

    #[test]
    fn test_describe_partition_contains_cart_id() {
        assert_eq!(CartKey::describe_partition("abc"), r#"{"cartId":"abc"}"#);
    }
}
