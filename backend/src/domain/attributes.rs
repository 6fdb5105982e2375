//! Open attribute mapping carried alongside the fixed entity schema.
//!
//! Documents may hold fields the core does not model (`age`, `city`,
//! `occupation`, or anything an external flow adds). They are kept as
//! primitive values and written back unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A primitive attribute value.
///
/// Numbers keep their JSON representation, so `30` and `30.0` survive a round
/// trip distinctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Extra attributes keyed by their document field name.
pub type ExtraAttributes = BTreeMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), AttributeValue::Null)]
    #[case(json!(true), AttributeValue::Bool(true))]
    #[case(json!(27), AttributeValue::from(27_u64))]
    #[case(json!("Pune"), AttributeValue::from("Pune"))]
    fn decodes_primitive_values(#[case] raw: serde_json::Value, #[case] expected: AttributeValue) {
        let decoded: AttributeValue = serde_json::from_value(raw).expect("primitive decodes");
        assert_eq!(decoded, expected);
    }

    #[rstest]
    fn preserves_numeric_representation() {
        let decoded: AttributeValue = serde_json::from_value(json!(30.5)).expect("decodes");
        assert_eq!(serde_json::to_value(&decoded).expect("encodes"), json!(30.5));
    }

    #[rstest]
    #[case(json!({ "nested": 1 }))]
    #[case(json!([1, 2]))]
    fn rejects_structured_values(#[case] raw: serde_json::Value) {
        let result: Result<AttributeValue, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }
}
