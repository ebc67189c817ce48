use proptest::prelude::*;
use serde_json::{json, Map, Value};
use shopping_cart_service::adapter::driven::InMemoryCartTable;
use shopping_cart_service::application::router::{route, OperationKind};
use shopping_cart_service::domain::model::{
    is_valid_event_body, is_valid_session_id, CartItem, CartItemCandidate, CartKey,
    REQUIRED_FIELDS,
};
use shopping_cart_service::domain::port::CartTable;

const ROUTES: [(&str, &str, OperationKind); 7] = [
    ("/cart", "GET", OperationKind::GetAllProducts),
    ("/cart", "POST", OperationKind::AddProduct),
    ("/cart", "DELETE", OperationKind::RemoveAllProducts),
    ("/cart/{productSku}", "GET", OperationKind::GetProduct),
    ("/cart/{productSku}", "PUT", OperationKind::UpdateProduct),
    ("/cart/{productSku}", "DELETE", OperationKind::RemoveProduct),
    ("/conversion", "POST", OperationKind::ConvertCart),
];

// 大文字小文字をランダムに入れ替える
fn scramble_case(value: &str, mask: &[bool]) -> String {
    value
        .chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| {
            if *upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn full_body(sku: &str, name: &str, price: f64, quantity: i64) -> Map<String, Value> {
    match json!({ "sku": sku, "name": name, "price": price, "quantity": quantity }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ルーティングのプロパティベーステスト
proptest! {
    /// ルーティングはリソースとメソッドの大文字小文字に依存しない
    #[test]
    fn test_route_ignores_case(
        index in 0usize..ROUTES.len(),
        mask in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let (resource, method, expected) = ROUTES[index];

        let routed = route(&scramble_case(resource, &mask), &scramble_case(method, &mask));

        prop_assert_eq!(routed, Some(expected));
    }

    /// 未知のリソースは操作にならない
    #[test]
    fn test_unknown_resource_has_no_operation(
        resource in "/[a-z]{1,12}",
        method in prop::sample::select(vec!["GET", "POST", "PUT", "DELETE"]),
    ) {
        prop_assume!(resource != "/cart" && resource != "/conversion");

        prop_assert_eq!(route(&resource, method), None);
    }
}

// 入力検証のプロパティベーステスト
proptest! {
    /// 必須フィールドがそろったボディは有効
    #[test]
    fn test_complete_body_is_valid(
        sku in "[A-Za-z0-9]{1,10}",
        name in ".{0,20}",
        price in 0.0f64..10_000.0,
        quantity in 0i64..1_000,
    ) {
        prop_assert!(is_valid_event_body(&full_body(&sku, &name, price, quantity)));
    }

    /// 必須フィールドが1つでも欠けると無効
    #[test]
    fn test_body_missing_any_field_is_invalid(
        missing in 0usize..REQUIRED_FIELDS.len(),
        price in 0.0f64..10_000.0,
        quantity in 0i64..1_000,
    ) {
        let mut body = full_body("6789", "Product Example", price, quantity);
        body.remove(REQUIRED_FIELDS[missing]);

        prop_assert!(!is_valid_event_body(&body));
    }

    /// パスやIDから来たキーはボディの値より優先される
    #[test]
    fn test_candidate_keys_win(
        cart_id in "[a-z0-9-]{1,16}",
        body_cart_id in "[a-z0-9-]{1,16}",
        sku in "[A-Z0-9]{1,8}",
    ) {
        let mut body = full_body("body-sku", "Mug", 1.5, 2);
        body.insert("cartId".to_string(), Value::String(body_cart_id));

        let item = CartItemCandidate::from_payload(Some(Value::Object(body)))
            .unwrap()
            .with_cart_id(&cart_id)
            .with_sku(&sku)
            .into_item()
            .unwrap();

        prop_assert_eq!(item.key(), CartKey::new(cart_id, sku));
    }

    /// 空でないセッションIDはすべて受け入れる
    #[test]
    fn test_non_empty_session_id_is_valid(session_id in ".{1,40}") {
        prop_assert!(is_valid_session_id(&session_id));
    }
}

// インメモリテーブルのプロパティベーステスト
proptest! {
    /// 保存した商品はキーでそのまま取得できる
    #[test]
    fn test_put_then_get_round_trip(
        cart_id in "[a-z0-9]{1,12}",
        sku in "[A-Z0-9]{1,8}",
        price in 0.0f64..10_000.0,
        quantity in 0i64..1_000,
    ) {
        let table = InMemoryCartTable::new();
        let item = CartItem {
            cart_id: cart_id.clone(),
            sku: sku.clone(),
            name: "Product Example".to_string(),
            price,
            quantity,
        };

        let fetched = runtime().block_on(async {
            table.put_item(&item.key(), &item).await.unwrap();
            table.get_item(&CartKey::new(cart_id, sku)).await.unwrap()
        });

        prop_assert_eq!(fetched, Some(item));
    }

    /// パーティション単位の件数は追加と削除に追従する
    #[test]
    fn test_partition_count_follows_writes(
        skus in proptest::collection::btree_set("[A-Z0-9]{1,6}", 1..10),
    ) {
        let table = InMemoryCartTable::new();
        let skus: Vec<String> = skus.into_iter().collect();

        let (before, after) = runtime().block_on(async {
            for sku in &skus {
                let item = CartItem {
                    cart_id: "cart-1".to_string(),
                    sku: sku.clone(),
                    name: "Product Example".to_string(),
                    price: 1.0,
                    quantity: 1,
                };
                table.put_item(&item.key(), &item).await.unwrap();
            }
            let before = table.query_by_partition("cart-1").await.unwrap().len();

            table.delete_item(&CartKey::new("cart-1", &skus[0])).await.unwrap();
            let after = table.query_by_partition("cart-1").await.unwrap().len();

            (before, after)
        });

        prop_assert_eq!(before, skus.len());
        prop_assert_eq!(after, skus.len() - 1);
    }
}
