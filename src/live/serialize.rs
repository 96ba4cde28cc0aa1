// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serialization of a [`LiveDocument`] back to markup.
//!
//! [`to_html`] produces compact markup; [`outline`] produces one indented line per
//! opening/closing tag or character-data node and remembers which node each line
//! belongs to. The outline is what the document pane shows and what the in-memory
//! viewport scrolls over.

use std::fmt::Write as _;

use super::html::{is_raw_text_element, is_void_element};
use super::document::LiveDocument;
use super::LiveTreeAdapter;
use crate::model::{LiveNodeId, LiveNodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub node: LiveNodeId,
    pub depth: usize,
    pub text: String,
    /// `true` for the closing-tag line of an element.
    pub closing: bool,
}

/// Pending work of a document walk. Walks keep their own stack so that deeply
/// nested documents never exhaust the thread stack.
#[derive(Debug, Clone, Copy)]
enum Step {
    Open {
        node: LiveNodeId,
        depth: usize,
        raw: bool,
    },
    Close {
        node: LiveNodeId,
        depth: usize,
    },
}

fn push_children(
    doc: &LiveDocument,
    node: LiveNodeId,
    depth: usize,
    raw: bool,
    stack: &mut Vec<Step>,
) {
    stack.extend(
        doc.children(node)
            .into_iter()
            .rev()
            .map(|node| Step::Open { node, depth, raw }),
    );
}

pub fn to_html(doc: &LiveDocument) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Open {
        node: doc.root(),
        depth: 0,
        raw: false,
    }];

    while let Some(step) = stack.pop() {
        let (node, depth, raw) = match step {
            Step::Open { node, depth, raw } => (node, depth, raw),
            Step::Close { node, .. } => {
                let _ = write!(out, "</{}>", doc.tag_name(node).unwrap_or_default());
                continue;
            }
        };
        let Some(kind) = doc.node_kind(node) else {
            continue;
        };
        match kind {
            LiveNodeKind::Element => {
                let tag = doc.tag_name(node).unwrap_or_default();
                out.push_str(&start_tag(doc, node));
                if is_void_element(tag) {
                    continue;
                }
                stack.push(Step::Close { node, depth });
                push_children(doc, node, depth + 1, is_raw_text_element(tag), &mut stack);
            }
            LiveNodeKind::Document | LiveNodeKind::DocumentFragment => {
                push_children(doc, node, depth, false, &mut stack);
            }
            _ => out.push_str(&leaf_markup(doc, node, kind, raw)),
        }
    }
    out
}

pub fn outline(doc: &LiveDocument) -> Vec<OutlineLine> {
    let mut lines = Vec::new();
    let mut stack = vec![Step::Open {
        node: doc.root(),
        depth: 0,
        raw: false,
    }];

    while let Some(step) = stack.pop() {
        let (node, depth, raw) = match step {
            Step::Open { node, depth, raw } => (node, depth, raw),
            Step::Close { node, depth } => {
                let tag = doc.tag_name(node).unwrap_or_default();
                lines.push(line(node, depth, format!("</{tag}>"), true));
                continue;
            }
        };
        let Some(kind) = doc.node_kind(node) else {
            continue;
        };
        match kind {
            LiveNodeKind::Element => {
                let tag = doc.tag_name(node).unwrap_or_default();
                if is_void_element(tag) {
                    lines.push(line(node, depth, start_tag(doc, node), false));
                    continue;
                }
                if doc.children(node).is_empty() {
                    lines.push(line(node, depth, format!("{}</{tag}>", start_tag(doc, node)), false));
                    continue;
                }
                lines.push(line(node, depth, start_tag(doc, node), false));
                stack.push(Step::Close { node, depth });
                push_children(doc, node, depth + 1, is_raw_text_element(tag), &mut stack);
            }
            LiveNodeKind::Document | LiveNodeKind::DocumentFragment => {
                push_children(doc, node, depth, false, &mut stack);
            }
            _ => {
                let markup = leaf_markup(doc, node, kind, raw);
                let collapsed = markup.split_whitespace().collect::<Vec<_>>().join(" ");
                if !collapsed.is_empty() {
                    lines.push(line(node, depth, collapsed, false));
                }
            }
        }
    }
    lines
}

fn line(node: LiveNodeId, depth: usize, text: String, closing: bool) -> OutlineLine {
    OutlineLine {
        node,
        depth,
        text,
        closing,
    }
}

fn start_tag(doc: &LiveDocument, node: LiveNodeId) -> String {
    let tag = doc.tag_name(node).unwrap_or_default();
    let mut out = format!("<{tag}");
    for attr in doc.attributes(node) {
        let name = doc.attribute_name(attr).unwrap_or_default();
        let value = doc.attribute_value(attr).unwrap_or_default();
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
        }
    }
    out.push('>');
    out
}

fn leaf_markup(doc: &LiveDocument, node: LiveNodeId, kind: LiveNodeKind, raw: bool) -> String {
    let data = doc.data(node).unwrap_or_default();
    match kind {
        LiveNodeKind::Text if raw => data.to_owned(),
        LiveNodeKind::Text => escape_text(data),
        LiveNodeKind::Comment => format!("<!--{data}-->"),
        LiveNodeKind::CDataSection => format!("<![CDATA[{data}]]>"),
        LiveNodeKind::DocumentType => {
            format!("<!DOCTYPE {}>", doc.node_name(node).unwrap_or("html"))
        }
        LiveNodeKind::ProcessingInstruction => {
            let target = doc.node_name(node).unwrap_or_default();
            if data.is_empty() {
                format!("<?{target}?>")
            } else {
                format!("<?{target} {data}?>")
            }
        }
        _ => String::new(),
    }
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
