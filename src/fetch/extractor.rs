// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML content extraction
//!
//! Decodes the body, parses it into a [`DomTree`] and runs three
//! visitors over it: title, allow-listed metadata and readable text.
//!
//! Readable text is every visible text node in document order. Runs of
//! whitespace collapse to one space and block-level elements start a new
//! line, so `<p>`s and headings come out one per line.

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use super::dom::{walk, DomTree, NodeId, NodeVisitor, Visit};
use super::error::FetchError;
use super::meta::{self, MetaAttr, CANONICAL_KEY};
use super::types::{count_words, ExtractedContent, Metadata};

/// Elements whose subtree never contributes readable text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Elements that start and end a line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "tfoot", "thead", "tr", "ul",
];

/// Elements separated from their neighbours by a space
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Decode a response body to text
///
/// Uses the declared charset when it is a known encoding label, otherwise
/// UTF-8. A byte order mark overrides the label. Bytes that are not valid in
/// the chosen encoding fail with `DecodeFailed` instead of being replaced.
pub fn decode_body(body: &[u8], declared_charset: Option<&str>) -> Result<String, FetchError> {
    let declared = match declared_charset.map(str::trim).filter(|c| !c.is_empty()) {
        Some(label) => Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            warn!(charset = label, "unknown charset, trying UTF-8");
            UTF_8
        }),
        None => UTF_8,
    };

    let (encoding, body) = match Encoding::for_bom(body) {
        Some((encoding, bom_len)) => (encoding, &body[bom_len..]),
        None => (declared, body),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            FetchError::decode(format!("invalid {} in response body", encoding.name()))
        })
}

/// Extracts title, metadata and readable text from HTML bodies
#[derive(Debug, Clone, Copy)]
pub struct HtmlExtractor {
    extract_text: bool,
}

impl HtmlExtractor {
    pub fn new(extract_text: bool) -> Self {
        Self { extract_text }
    }

    /// Decode and extract an HTML body
    pub fn extract(
        &self,
        body: &[u8],
        declared_charset: Option<&str>,
    ) -> Result<ExtractedContent, FetchError> {
        let html = decode_body(body, declared_charset)?;
        Ok(self.extract_str(&html))
    }

    /// Extract from already-decoded HTML
    pub fn extract_str(&self, html: &str) -> ExtractedContent {
        let tree = DomTree::parse_document(html);

        let mut title = TitleVisitor::default();
        walk(&tree, &mut title);

        let mut metadata = MetaVisitor::default();
        walk(&tree, &mut metadata);

        let text = if self.extract_text {
            let mut collector = TextVisitor::default();
            walk(&tree, &mut collector);
            collector.finish()
        } else {
            String::new()
        };

        let word_count = count_words(&text);
        debug!(
            has_title = title.title.is_some(),
            metadata_keys = metadata.metadata.len(),
            word_count,
            "html.extracted"
        );

        ExtractedContent {
            title: title.title,
            text,
            word_count,
            metadata: metadata.metadata,
        }
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

/// First `<title>` element, trimmed
#[derive(Default)]
struct TitleVisitor {
    title: Option<String>,
    seen: bool,
}

impl NodeVisitor for TitleVisitor {
    fn enter_element(&mut self, tree: &DomTree, id: NodeId, name: &str) -> Visit {
        if self.seen {
            return Visit::Skip;
        }
        if name == "title" {
            self.seen = true;
            let text = tree.text_content(id);
            let text = text.trim();
            if !text.is_empty() {
                self.title = Some(text.to_string());
            }
            return Visit::Skip;
        }
        Visit::Descend
    }
}

/// Allow-listed `<meta>` values plus the canonical link; first occurrence wins
#[derive(Default)]
struct MetaVisitor {
    metadata: Metadata,
}

impl MetaVisitor {
    fn insert_first(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.metadata
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
}

impl NodeVisitor for MetaVisitor {
    fn enter_element(&mut self, tree: &DomTree, id: NodeId, name: &str) -> Visit {
        let Some(node) = tree.get(id) else {
            return Visit::Skip;
        };
        match name {
            "meta" => {
                let Some(content) = node.attr("content") else {
                    return Visit::Skip;
                };
                for attr in [MetaAttr::Name, MetaAttr::Property] {
                    if let Some(key) = node.attr(attr.as_str()).and_then(|v| meta::lookup(attr, v))
                    {
                        self.insert_first(key, content);
                    }
                }
                Visit::Skip
            }
            "link" => {
                let is_canonical = node
                    .attr("rel")
                    .map(|rel| {
                        rel.split_ascii_whitespace()
                            .any(|r| r.eq_ignore_ascii_case("canonical"))
                    })
                    .unwrap_or(false);
                if is_canonical {
                    if let Some(href) = node.attr("href") {
                        self.insert_first(CANONICAL_KEY, href);
                    }
                }
                Visit::Skip
            }
            "script" | "style" | "template" => Visit::Skip,
            _ => Visit::Descend,
        }
    }
}

/// Visible text, one line per block
#[derive(Default)]
struct TextVisitor {
    lines: Vec<String>,
    current: String,
}

impl TextVisitor {
    fn flush(&mut self) {
        let line = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.lines.join("\n")
    }
}

impl NodeVisitor for TextVisitor {
    fn enter_element(&mut self, _tree: &DomTree, _id: NodeId, name: &str) -> Visit {
        if SKIPPED_ELEMENTS.contains(&name) {
            return Visit::Skip;
        }
        if BLOCK_ELEMENTS.contains(&name) {
            self.flush();
        } else if CELL_ELEMENTS.contains(&name) {
            self.current.push(' ');
        }
        Visit::Descend
    }

    fn leave_element(&mut self, name: &str) {
        if BLOCK_ELEMENTS.contains(&name) {
            self.flush();
        }
    }

    fn text(&mut self, text: &str) {
        self.current.push_str(text);
    }
}
