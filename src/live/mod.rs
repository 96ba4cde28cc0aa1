// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The live document boundary.
//!
//! The inspector core never owns the document it inspects. It reads and mutates it
//! through [`LiveTreeAdapter`]; [`LiveDocument`] is the in-memory binding used by the
//! terminal front end and by tests.

pub mod document;
pub mod html;
pub mod serialize;

pub use document::{LiveDocument, Viewport};
pub use html::{parse_document, HtmlError, HtmlOptions};
pub use serialize::{outline, to_html, OutlineLine};

use crate::model::{HandleOverflow, LiveAttrId, LiveNodeId, LiveNodeKind};

/// Capability interface over the inspected document.
pub trait LiveTreeAdapter {
    /// The node the inspector treats as the document root.
    fn document_root(&self) -> LiveNodeId;

    fn node_kind(&self, node: LiveNodeId) -> Option<LiveNodeKind>;

    /// Tag name of an element as stored by the host (not case-normalized).
    fn tag_name(&self, node: LiveNodeId) -> Option<&str>;

    /// Structural children in document order, of every node kind.
    fn children(&self, node: LiveNodeId) -> Vec<LiveNodeId>;

    /// Attributes of an element in native enumeration order.
    fn attributes(&self, element: LiveNodeId) -> Vec<LiveAttrId>;

    fn attribute_name(&self, attr: LiveAttrId) -> Option<&str>;

    fn attribute_value(&self, attr: LiveAttrId) -> Option<&str>;

    fn attribute_owner(&self, attr: LiveAttrId) -> Option<LiveNodeId>;

    fn text_content(&self, node: LiveNodeId) -> Option<String>;

    /// Sets (or creates) an attribute and returns the attribute object now holding
    /// `name`. Updating an existing attribute keeps its identity.
    fn set_attribute(
        &mut self,
        element: LiveNodeId,
        name: &str,
        value: &str,
    ) -> Result<LiveAttrId, LiveTreeError>;

    /// Removes an attribute and returns the identity it had.
    fn remove_attribute(
        &mut self,
        element: LiveNodeId,
        name: &str,
    ) -> Result<LiveAttrId, LiveTreeError>;

    fn set_text_content(&mut self, node: LiveNodeId, text: &str) -> Result<(), LiveTreeError>;

    /// Adds or clears the selected marking on an element.
    fn set_selected(&mut self, node: LiveNodeId, selected: bool) -> Result<(), LiveTreeError>;

    fn is_selected(&self, node: LiveNodeId) -> bool;

    /// Every node currently carrying the selected marking, in document order.
    fn selected_nodes(&self) -> Vec<LiveNodeId>;

    fn is_in_viewport(&self, node: LiveNodeId) -> bool;

    fn scroll_into_view(&mut self, node: LiveNodeId);

    fn find_attribute(&self, element: LiveNodeId, name: &str) -> Option<LiveAttrId> {
        self.attributes(element)
            .into_iter()
            .find(|attr| self.attribute_name(*attr) == Some(name))
    }

    fn get_attribute(&self, element: LiveNodeId, name: &str) -> Option<&str> {
        self.find_attribute(element, name)
            .and_then(|attr| self.attribute_value(attr))
    }

    fn has_attribute(&self, element: LiveNodeId, name: &str) -> bool {
        self.find_attribute(element, name).is_some()
    }

    /// Depth-first search for the first element whose `id` attribute equals `id`.
    fn find_element_by_id(&self, id: &str) -> Option<LiveNodeId> {
        let mut stack = vec![self.document_root()];
        while let Some(node) = stack.pop() {
            if self.node_kind(node) == Some(LiveNodeKind::Element)
                && self.get_attribute(node, "id") == Some(id)
            {
                return Some(node);
            }
            let mut children = self.children(node);
            children.reverse();
            stack.extend(children);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiveTreeError {
    #[error("live node {0} does not exist")]
    UnknownNode(LiveNodeId),
    #[error("live node {0} is not an element")]
    NotAnElement(LiveNodeId),
    #[error("live node {0} does not hold character data")]
    NotCharacterData(LiveNodeId),
    #[error("live node {0} cannot have children")]
    NotAContainer(LiveNodeId),
    #[error("element {element} has no attribute '{name}'")]
    NoSuchAttribute { element: LiveNodeId, name: String },
    #[error("'{0}' is not a valid attribute name")]
    InvalidAttributeName(String),
    #[error("'{0}' is not a valid tag name")]
    InvalidTagName(String),
    #[error(transparent)]
    Overflow(#[from] HandleOverflow),
}

/// Attribute names follow the HTML attribute-name production: anything but
/// whitespace, quotes, `>`, `/`, `=`, and control characters.
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|ch| {
            !ch.is_whitespace()
                && !ch.is_control()
                && !matches!(ch, '"' | '\'' | '>' | '/' | '=')
        })
}

pub fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.'))
}
