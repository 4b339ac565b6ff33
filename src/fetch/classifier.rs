// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content-type classification
//!
//! Pure functions over the raw `Content-Type` header. Unknown or malformed
//! input always resolves to [`ContentKind::Other`].

/// Which extractor applies to a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Html,
    Json,
    PlainText,
    Other,
}

/// Lower-cased media type without parameters
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Classify a `Content-Type` header value
pub fn classify(content_type: &str) -> ContentKind {
    let media = media_type(content_type);
    match media.as_str() {
        "text/html" | "application/xhtml+xml" => ContentKind::Html,
        "application/json" => ContentKind::Json,
        m if m.ends_with("+json") => ContentKind::Json,
        m if m.starts_with("text/") && m.len() > "text/".len() => ContentKind::PlainText,
        _ => ContentKind::Other,
    }
}

/// The `charset` parameter of a `Content-Type` header, if declared
pub fn charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_ascii_lowercase())
        }
    })
}
