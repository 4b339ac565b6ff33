// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tagged HTML node tree and visitor
//!
//! `scraper` parses the markup; the result is converted once into a flat
//! [`DomTree`] arena of [`DomNode`]s so extraction passes are simple visitors
//! over three variants. Conversion, walking and text collection all use an
//! explicit stack, and the arena drops as a single `Vec`, so nesting depth
//! is bounded only by the body cap.

use scraper::{ElementRef, Html, Node};

/// Index of a node in its [`DomTree`]
pub type NodeId = usize;

/// A node of the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element {
        /// Lower-cased tag name
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
    Comment(String),
}

impl DomNode {
    pub fn element_name(&self) -> Option<&str> {
        match self {
            DomNode::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Value of attribute `name` (ASCII case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            DomNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn children(&self) -> &[NodeId] {
        match self {
            DomNode::Element { children, .. } => children,
            _ => &[],
        }
    }
}

/// Parsed document; node 0 is the root `<html>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    pub const ROOT: NodeId = 0;

    /// Parse a full HTML document
    pub fn parse_document(html: &str) -> DomTree {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut tree = DomTree {
            nodes: vec![element_node(root)],
        };
        let mut pending: Vec<(ElementRef<'_>, NodeId)> = vec![(root, Self::ROOT)];

        while let Some((element, id)) = pending.pop() {
            for child in element.children() {
                let node = match child.value() {
                    Node::Text(text) => DomNode::Text(String::from(&**text)),
                    Node::Comment(comment) => DomNode::Comment(String::from(&**comment)),
                    Node::Element(_) => match ElementRef::wrap(child) {
                        Some(child_element) => {
                            let child_id = tree.push(id, element_node(child_element));
                            pending.push((child_element, child_id));
                            continue;
                        }
                        None => continue,
                    },
                    _ => continue,
                };
                tree.push(id, node);
            }
        }

        tree
    }

    fn push(&mut self, parent: NodeId, node: DomNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        if let Some(DomNode::Element { children, .. }) = self.nodes.get_mut(parent) {
            children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &DomNode {
        &self.nodes[Self::ROOT]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenated text of all text nodes below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match self.get(id) {
                Some(DomNode::Text(text)) => out.push_str(text),
                Some(node @ DomNode::Element { .. }) => {
                    stack.extend(node.children().iter().rev());
                }
                _ => {}
            }
        }
        out
    }
}

fn element_node(element: ElementRef<'_>) -> DomNode {
    let value = element.value();
    DomNode::Element {
        name: value.name().to_ascii_lowercase(),
        attrs: value
            .attrs()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect(),
        children: Vec::new(),
    }
}

/// Whether a visitor wants to descend into an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Descend,
    Skip,
}

/// Callbacks for a depth-first walk in document order
pub trait NodeVisitor {
    fn enter_element(&mut self, _tree: &DomTree, _id: NodeId, _name: &str) -> Visit {
        Visit::Descend
    }

    fn leave_element(&mut self, _name: &str) {}

    fn text(&mut self, _text: &str) {}

    fn comment(&mut self, _text: &str) {}
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Walk the tree from the root depth-first, calling `visitor` for each node
pub fn walk<V: NodeVisitor + ?Sized>(tree: &DomTree, visitor: &mut V) {
    let mut steps = vec![Step::Enter(DomTree::ROOT)];

    while let Some(step) = steps.pop() {
        match step {
            Step::Enter(id) => match tree.get(id) {
                Some(node @ DomNode::Element { name, .. }) => {
                    if visitor.enter_element(tree, id, name) == Visit::Skip {
                        continue;
                    }
                    steps.push(Step::Leave(id));
                    steps.extend(node.children().iter().rev().map(|&child| Step::Enter(child)));
                }
                Some(DomNode::Text(text)) => visitor.text(text),
                Some(DomNode::Comment(text)) => visitor.comment(text),
                None => {}
            },
            Step::Leave(id) => {
                if let Some(name) = tree.get(id).and_then(DomNode::element_name) {
                    visitor.leave_element(name);
                }
            }
        }
    }
}
