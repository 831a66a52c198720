use serde::{Deserialize, Serialize};

/// Token metadata as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub description: String,
    pub external_url: String,
    pub image: String,
}

/// Returns `true` if `value` is a base-10 integer literal of any width:
/// an optional `+`/`-` sign followed by at least one ASCII digit.
pub fn is_base10_integer(value: &str) -> bool {
    let digits = value
        .strip_prefix('+')
        .or_else(|| value.strip_prefix('-'))
        .unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_signed_integers() {
        for id in ["0", "42", "-7", "+7", "007", "-0"] {
            assert!(is_base10_integer(id), "{id} should be accepted");
        }
    }

    #[test]
    fn test_accepts_values_beyond_u64() {
        assert!(is_base10_integer("999999999999999999999999999"));
        assert!(is_base10_integer(
            "-115792089237316195423570985008687907853269984665640564039457584007913129639935"
        ));
    }

    #[test]
    fn test_rejects_non_integers() {
        for id in [
            "", "+", "-", "abc", "12a", "1.5", " 42", "42 ", "1_000", "0x1f", "--1", "+-1", "１２",
            "images",
        ] {
            assert!(!is_base10_integer(id), "{id:?} should be rejected");
        }
    }

    #[test]
    fn test_token_json_shape() {
        let token = Token {
            id: "42".into(),
            name: "Genesis".into(),
            description: "first".into(),
            external_url: "https://example.com/42".into(),
            image: "https://host/images/a.png".into(),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["id"], "42");
        assert_eq!(json["external_url"], "https://example.com/42");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
