//! Field deserializers for engine payloads that mix native JSON values with
//! their string spellings (`"expires_in": "200"`, `"bootable": "true"`).
//!
//! Each helper accepts both shapes and hands back a single typed value, so the
//! rest of the crate never looks at the wire representation again.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(Number),
    Text(String),
}

impl NumberOrString {
    fn into_literal(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

/// `200` or `"200"` as u64, absent or null as None
pub fn opt_u64_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a non-negative integer, got {}", n))),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid integer string '{}': {}", s, e))),
    }
}

/// `1234` or `"1234"` as the literal text, absent or null as None
pub fn opt_literal_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.map(NumberOrString::into_literal))
}

/// `true` or `"true"` (any case), absent or null as None
pub fn opt_bool_from_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(D::Error::custom(format!("invalid boolean string '{}'", s))),
        },
    }
}
