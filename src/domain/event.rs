use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::domain::model::CartItem;

/// ビジネスイベントのアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CartAction {
    RemoveAllProducts,
    AddProduct,
    UpdateProduct,
    RemoveProduct,
    ConvertCart,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::RemoveAllProducts => "RemoveAllProducts",
            CartAction::AddProduct => "AddProduct",
            CartAction::UpdateProduct => "UpdateProduct",
            CartAction::RemoveProduct => "RemoveProduct",
            CartAction::ConvertCart => "ConvertCart",
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 変更操作の成功後にメッセージングポートへ発行するイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessEvent {
    /// アクション
    pub action: CartAction,
    /// 任意のペイロード
    pub payload: Value,
    /// 発行元リクエストのトレースID
    pub trace_id: String,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BusinessEvent {
    pub fn new(action: CartAction, payload: Value, trace_id: &str) -> Self {
        Self {
            action,
            payload,
            trace_id: trace_id.to_string(),
            occurred_at: Utc::now(),
        }
    }

    /// カート全削除イベント
    pub fn all_products_removed(cart_id: &str, trace_id: &str) -> Self {
        Self::new(
            CartAction::RemoveAllProducts,
            serde_json::json!({ "cartId": cart_id }),
            trace_id,
        )
    }

    /// 商品の追加・更新イベント
    pub fn product_stored(action: CartAction, cart_id: &str, item: &CartItem, trace_id: &str) -> Self {
        Self::new(
            action,
            serde_json::json!({ "cartId": cart_id, "item": item }),
            trace_id,
        )
    }

    /// 商品削除イベント
    pub fn product_removed(sku: &str, trace_id: &str) -> Self {
        Self::new(
            CartAction::RemoveProduct,
            serde_json::json!({ "sku": sku }),
            trace_id,
        )
    }

    /// カート変換イベント
    pub fn cart_converted(old_cart_id: &str, new_cart_id: &str, trace_id: &str) -> Self {
        Self::new(
            CartAction::ConvertCart,
            serde_json::json!({ "oldCartId": old_cart_id, "newCartId": new_cart_id }),
            trace_id,
        )
    }

    /// メッセージ本文としてのJSON文字列
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
