use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Deserialize a `u64` written either as a JSON number or as a decimal string.
///
/// Contracts often encode large integers as strings to survive JavaScript clients.
pub fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Wrapper {
        #[serde(deserialize_with = "u64_from_number_or_string")]
        value: u64,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let number: Wrapper = serde_json::from_value(json!({ "value": 17 })).unwrap();
        assert_eq!(number.value, 17);

        let string: Wrapper =
            serde_json::from_value(json!({ "value": "1700000000000000000" })).unwrap();
        assert_eq!(string.value, 1_700_000_000_000_000_000);
    }

    #[test]
    fn rejects_other_values() {
        assert!(serde_json::from_value::<Wrapper>(json!({ "value": "soon" })).is_err());
        assert!(serde_json::from_value::<Wrapper>(json!({ "value": -1 })).is_err());
        assert!(serde_json::from_value::<Wrapper>(json!({ "value": null })).is_err());
    }
}
