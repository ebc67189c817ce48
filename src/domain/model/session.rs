/// セッションIDの形式を検証する
///
/// 現状は空でない文字列をすべて受け入れる。
pub fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_session_id_is_valid() {
        assert!(is_valid_session_id("4b1f-anonymous"));
    }

    #[test]
    fn test_empty_session_id_is_invalid() {
        assert!(!is_valid_session_id(""));
    }
}
