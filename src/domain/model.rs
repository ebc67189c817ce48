// ドメインモデル（カート商品とキー）

mod cart_item;
mod session;

pub use cart_item::{is_valid_event_body, CartItem, CartItemCandidate, CartKey, REQUIRED_FIELDS};
pub use session::is_valid_session_id;
