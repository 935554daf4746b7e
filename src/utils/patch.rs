use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some`, so that with `#[serde(default)]` an
/// `Option<Option<T>>` distinguishes a missing field (`None`) from `null` (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        category_id: Option<Option<i32>>,
    }

    #[test]
    fn distinguishes_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"category_id": 3}"#).unwrap();

        assert_eq!(missing.category_id, None);
        assert_eq!(null.category_id, Some(None));
        assert_eq!(value.category_id, Some(Some(3)));
    }
}
