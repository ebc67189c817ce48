use std::fmt;

/// 実行可能な操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetAllProducts,
    RemoveAllProducts,
    GetProduct,
    AddProduct,
    UpdateProduct,
    RemoveProduct,
    ConvertCart,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::GetAllProducts => "GetAllProducts",
            OperationKind::RemoveAllProducts => "RemoveAllProducts",
            OperationKind::GetProduct => "GetProduct",
            OperationKind::AddProduct => "AddProduct",
            OperationKind::UpdateProduct => "UpdateProduct",
            OperationKind::RemoveProduct => "RemoveProduct",
            OperationKind::ConvertCart => "ConvertCart",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CART_RESOURCE: &str = "/cart";
const PRODUCT_RESOURCE: &str = "/cart/{productsku}";
const CONVERSION_RESOURCE: &str = "/conversion";

/// (リソース, メソッド) の組から操作を選択する
///
/// どちらも大文字小文字を区別せずに比較する。該当しない組は `None`。
pub fn route(resource: &str, method: &str) -> Option<OperationKind> {
    let resource = resource.to_ascii_lowercase();
    let method = method.to_ascii_uppercase();

    match (resource.as_str(), method.as_str()) {
        (CART_RESOURCE, "GET") => Some(OperationKind::GetAllProducts),
        (CART_RESOURCE, "POST") => Some(OperationKind::AddProduct),
        (CART_RESOURCE, "DELETE") => Some(OperationKind::RemoveAllProducts),
        (PRODUCT_RESOURCE, "GET") => Some(OperationKind::GetProduct),
        (PRODUCT_RESOURCE, "PUT") => Some(OperationKind::UpdateProduct),
        (PRODUCT_RESOURCE, "DELETE") => Some(OperationKind::RemoveProduct),
        (CONVERSION_RESOURCE, "POST") => Some(OperationKind::ConvertCart),
        _ => None,
    }
}
