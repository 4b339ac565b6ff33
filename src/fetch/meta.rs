// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Metadata allow-list
//!
//! `<meta>` tags are only forwarded when their `name`/`property` pair is in
//! [`META_ALLOW_LIST`]. Everything else is dropped.

/// Attribute of a `<meta>` tag that carries the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAttr {
    Name,
    Property,
}

impl MetaAttr {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaAttr::Name => "name",
            MetaAttr::Property => "property",
        }
    }
}

/// Recognized `(attribute, key)` pairs
pub const META_ALLOW_LIST: &[(MetaAttr, &str)] = &[
    (MetaAttr::Name, "description"),
    (MetaAttr::Name, "keywords"),
    (MetaAttr::Name, "author"),
    (MetaAttr::Name, "robots"),
    (MetaAttr::Name, "generator"),
    (MetaAttr::Name, "twitter:card"),
    (MetaAttr::Name, "twitter:site"),
    (MetaAttr::Name, "twitter:creator"),
    (MetaAttr::Name, "twitter:title"),
    (MetaAttr::Name, "twitter:description"),
    (MetaAttr::Name, "twitter:image"),
    (MetaAttr::Property, "og:title"),
    (MetaAttr::Property, "og:description"),
    (MetaAttr::Property, "og:image"),
    (MetaAttr::Property, "og:type"),
    (MetaAttr::Property, "og:url"),
    (MetaAttr::Property, "og:site_name"),
    (MetaAttr::Property, "og:locale"),
    (MetaAttr::Property, "article:author"),
    (MetaAttr::Property, "article:published_time"),
    (MetaAttr::Property, "article:modified_time"),
    // Some sites put twitter cards on `property`
    (MetaAttr::Property, "twitter:card"),
    (MetaAttr::Property, "twitter:title"),
    (MetaAttr::Property, "twitter:description"),
    (MetaAttr::Property, "twitter:image"),
];

/// Key recorded for `<link rel="canonical">`
pub const CANONICAL_KEY: &str = "canonical";

/// Keys added by the pipeline rather than read from markup
pub const REDIRECT_LOCATION_KEY: &str = "redirect_location";
pub const FINAL_URL_KEY: &str = "final_url";
pub const JSON_KEYS_KEY: &str = "json_keys";

/// Canonical key for a meta tag attribute value, if allowed
pub fn lookup(attr: MetaAttr, value: &str) -> Option<&'static str> {
    let value = value.trim();
    META_ALLOW_LIST
        .iter()
        .find(|(a, key)| *a == attr && key.eq_ignore_ascii_case(value))
        .map(|(_, key)| *key)
}
