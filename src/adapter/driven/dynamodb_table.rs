use crate::adapter::driven::aws_error::parse_sdk_error;
use crate::domain::error::{ResourceDescriptor, ServiceError, ServiceErrorCode};
use crate::domain::model::{CartItem, CartKey};
use crate::domain::port::CartTable;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

type Attributes = HashMap<String, AttributeValue>;

/// DynamoDB のカートテーブル実装
/// パーティションキー `cartId`、ソートキー `sku`
pub struct DynamoDbCartTable {
    client: Client,
    table_name: String,
}

impl DynamoDbCartTable {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn resource(&self) -> ResourceDescriptor {
        ResourceDescriptor::table(&self.table_name)
    }

    fn decode(&self, attributes: &Attributes) -> Result<CartItem, ServiceError> {
        item_from_attributes(attributes).map_err(|reason| {
            ServiceError::new(ServiceErrorCode::InvalidStoredItem, Some(self.resource()))
                .with_payload(serde_json::json!({ "reason": reason }))
        })
    }
}

#[async_trait]
impl CartTable for DynamoDbCartTable {
    async fn get_item(&self, key: &CartKey) -> Result<Option<CartItem>, ServiceError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes(key)))
            .send()
            .await
            .map_err(|e| parse_sdk_error(&e, self.resource()))?;

        output
            .item
            .map(|attributes| self.decode(&attributes))
            .transpose()
    }

    async fn query_by_partition(&self, cart_id: &str) -> Result<Vec<CartItem>, ServiceError> {
        let mut items = Vec::new();
        let mut start_key: Option<Attributes> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#cartId = :cartId")
                .expression_attribute_names("#cartId", "cartId")
                .expression_attribute_values(":cartId", AttributeValue::S(cart_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| parse_sdk_error(&e, self.resource()))?;

            for attributes in output.items.unwrap_or_default() {
                items.push(self.decode(&attributes)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn put_item(&self, key: &CartKey, item: &CartItem) -> Result<(), ServiceError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_attributes(key, item)))
            .send()
            .await
            .map_err(|e| parse_sdk_error(&e, self.resource()))?;

        Ok(())
    }

    async fn delete_item(&self, key: &CartKey) -> Result<(), ServiceError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_attributes(key)))
            .send()
            .await
            .map_err(|e| parse_sdk_error(&e, self.resource()))?;

        Ok(())
    }
}

pub fn key_attributes(key: &CartKey) -> Attributes {
    let mut attributes = HashMap::new();
    attributes.insert("cartId".to_string(), AttributeValue::S(key.cart_id.clone()));
    attributes.insert("sku".to_string(), AttributeValue::S(key.sku.clone()));
    attributes
}

/// キーのフィールドを優先して商品の属性を組み立てる
pub fn item_attributes(key: &CartKey, item: &CartItem) -> Attributes {
    let mut attributes = key_attributes(key);
    attributes.insert("name".to_string(), AttributeValue::S(item.name.clone()));
    attributes.insert("price".to_string(), AttributeValue::N(item.price.to_string()));
    attributes.insert("quantity".to_string(), AttributeValue::N(item.quantity.to_string()));
    attributes
}

pub fn item_from_attributes(attributes: &Attributes) -> Result<CartItem, String> {
    Ok(CartItem {
        cart_id: string_attribute(attributes, "cartId")?,
        sku: string_attribute(attributes, "sku")?,
        name: string_attribute(attributes, "name")?,
        price: number_attribute(attributes, "price")?
            .parse::<f64>()
            .map_err(|e| format!("price: {}", e))?,
        quantity: number_attribute(attributes, "quantity")?
            .parse::<i64>()
            .map_err(|e| format!("quantity: {}", e))?,
    })
}

fn string_attribute(attributes: &Attributes, name: &str) -> Result<String, String> {
    attributes
        .get(name)
        .ok_or_else(|| format!("missing attribute {}", name))?
        .as_s()
        .map(|value| value.to_string())
        .map_err(|_| format!("attribute {} is not a string", name))
}

fn number_attribute<'a>(attributes: &'a Attributes, name: &str) -> Result<&'a str, String> {
    attributes
        .get(name)
        .ok_or_else(|| format!("missing attribute {}", name))?
        .as_n()
        .map(String::as_str)
        .map_err(|_| format!("attribute {} is not a number", name))
}
