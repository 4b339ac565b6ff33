// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON body formatting

use serde_json::Value;
use tracing::debug;

use super::error::FetchError;

/// Formatted JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedJson {
    /// Pretty-printed JSON, or the raw text when it did not parse
    pub text: String,
    /// Top-level object keys in document order (empty for non-objects)
    pub keys: Vec<String>,
    pub parsed: bool,
}

/// Decode a JSON body as UTF-8 and pretty-print it
///
/// Malformed JSON is returned verbatim rather than failing the request;
/// only a UTF-8 decode failure is an error.
pub fn format_json(body: &[u8]) -> Result<FormattedJson, FetchError> {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let text = std::str::from_utf8(body)
        .map_err(|e| FetchError::decode(format!("invalid UTF-8 in JSON body: {}", e)))?;

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => {
            debug!(line = e.line(), column = e.column(), "json.parse_failed, returning raw text");
            return Ok(FormattedJson {
                text: text.to_string(),
                keys: Vec::new(),
                parsed: false,
            });
        }
    };

    let keys = top_level_keys(text);
    let pretty = serde_json::to_string_pretty(&value)
        .map_err(|e| FetchError::internal(format!("json re-serialization failed: {}", e)))?;

    Ok(FormattedJson {
        text: pretty,
        keys,
        parsed: true,
    })
}

/// Top-level keys of a JSON object in the order they appear in `text`
fn top_level_keys(text: &str) -> Vec<String> {
    // serde_json's Map sorts keys, so re-read the object as ordered pairs
    struct OrderedKeys(Vec<String>);

    impl<'de> serde::Deserialize<'de> for OrderedKeys {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct KeysVisitor;

            impl<'de> serde::de::Visitor<'de> for KeysVisitor {
                type Value = OrderedKeys;

                fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    f.write_str("a JSON object")
                }

                fn visit_map<A: serde::de::MapAccess<'de>>(
                    self,
                    mut map: A,
                ) -> Result<OrderedKeys, A::Error> {
                    let mut keys = Vec::new();
                    while let Some(key) = map.next_key::<String>()? {
                        map.next_value::<serde::de::IgnoredAny>()?;
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                    Ok(OrderedKeys(keys))
                }
            }

            deserializer.deserialize_map(KeysVisitor)
        }
    }

    serde_json::from_str::<OrderedKeys>(text)
        .map(|keys| keys.0)
        .unwrap_or_default()
}
