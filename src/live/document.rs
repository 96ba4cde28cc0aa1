// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use super::serialize::outline;
use super::{is_valid_attribute_name, is_valid_tag_name, LiveTreeAdapter, LiveTreeError};
use crate::model::{LiveAttrId, LiveNodeId, LiveNodeKind};

/// An in-memory document: a node arena plus an attribute arena.
///
/// Nodes are never removed. Attributes are removed by tombstoning their slot, so
/// an [`LiveAttrId`] always names the same attribute object for its whole life.
#[derive(Debug, Clone)]
pub struct LiveDocument {
    nodes: Vec<LiveNode>,
    attrs: Vec<Option<LiveAttr>>,
    root: LiveNodeId,
    selected: BTreeSet<LiveNodeId>,
    viewport: Viewport,
}

#[derive(Debug, Clone)]
struct LiveNode {
    kind: LiveNodeKind,
    /// Tag name, doctype name, or processing-instruction target.
    name: SmolStr,
    /// Character data for text, comment, CDATA and processing instructions.
    data: String,
    parent: Option<LiveNodeId>,
    children: Vec<LiveNodeId>,
    attributes: Vec<LiveAttrId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveAttr {
    owner: LiveNodeId,
    name: SmolStr,
    value: String,
}

/// A window of outline lines, see [`crate::live::outline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: usize,
    pub height: usize,
}

impl Default for LiveDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveDocument {
    pub const DEFAULT_VIEWPORT_HEIGHT: usize = 40;

    /// Creates a document holding only its `#document` node.
    pub fn new() -> Self {
        let root = LiveNodeId::new(0);
        Self {
            nodes: vec![LiveNode {
                kind: LiveNodeKind::Document,
                name: SmolStr::new_inline("#document"),
                data: String::new(),
                parent: None,
                children: Vec::new(),
                attributes: Vec::new(),
            }],
            attrs: Vec::new(),
            root,
            selected: BTreeSet::new(),
            viewport: Viewport {
                top: 0,
                height: Self::DEFAULT_VIEWPORT_HEIGHT,
            },
        }
    }

    pub fn root(&self) -> LiveNodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, node: LiveNodeId) -> Option<LiveNodeId> {
        self.node(node).ok().and_then(|record| record.parent)
    }

    /// Doctype name, processing-instruction target, or tag name.
    pub fn node_name(&self, node: LiveNodeId) -> Option<&str> {
        self.node(node).ok().map(|record| record.name.as_str())
    }

    /// Raw character data of text-like nodes and processing instructions.
    pub fn data(&self, node: LiveNodeId) -> Option<&str> {
        let record = self.node(node).ok()?;
        match record.kind {
            LiveNodeKind::Text
            | LiveNodeKind::Comment
            | LiveNodeKind::CDataSection
            | LiveNodeKind::ProcessingInstruction => Some(record.data.as_str()),
            _ => None,
        }
    }

    pub fn append_element(
        &mut self,
        parent: LiveNodeId,
        tag: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        if !is_valid_tag_name(tag) {
            return Err(LiveTreeError::InvalidTagName(tag.to_owned()));
        }
        self.append_node(parent, LiveNodeKind::Element, tag, String::new())
    }

    pub fn append_text(
        &mut self,
        parent: LiveNodeId,
        text: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        self.append_node(parent, LiveNodeKind::Text, "#text", text.to_owned())
    }

    pub fn append_comment(
        &mut self,
        parent: LiveNodeId,
        text: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        self.append_node(parent, LiveNodeKind::Comment, "#comment", text.to_owned())
    }

    pub fn append_cdata(
        &mut self,
        parent: LiveNodeId,
        text: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        self.append_node(
            parent,
            LiveNodeKind::CDataSection,
            "#cdata-section",
            text.to_owned(),
        )
    }

    pub fn append_doctype(
        &mut self,
        parent: LiveNodeId,
        name: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        self.append_node(parent, LiveNodeKind::DocumentType, name, String::new())
    }

    pub fn append_processing_instruction(
        &mut self,
        parent: LiveNodeId,
        target: &str,
        data: &str,
    ) -> Result<LiveNodeId, LiveTreeError> {
        self.append_node(
            parent,
            LiveNodeKind::ProcessingInstruction,
            target,
            data.to_owned(),
        )
    }

    /// Element with the given tag, looked up depth-first from the root.
    pub fn find_first_element(&self, tag: &str) -> Option<LiveNodeId> {
        self.descendants(self.root).into_iter().find(|node| {
            self.nodes[node.index()].kind == LiveNodeKind::Element
                && self.nodes[node.index()].name.eq_ignore_ascii_case(tag)
        })
    }

    /// Every node below `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: LiveNodeId) -> Vec<LiveNodeId> {
        let mut out = Vec::new();
        let Ok(record) = self.node(node) else {
            return out;
        };
        let mut stack: Vec<LiveNodeId> = record.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.index()].children.iter().rev().copied());
        }
        out
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.height = height.max(1);
        self.clamp_viewport();
    }

    pub fn scroll_to_line(&mut self, top: usize) {
        self.viewport.top = top;
        self.clamp_viewport();
    }

    /// Outline line on which `node` starts.
    pub fn line_of(&self, node: LiveNodeId) -> Option<usize> {
        outline(self).iter().position(|line| line.node == node && !line.closing)
    }

    fn clamp_viewport(&mut self) {
        let total = outline(self).len();
        let max_top = total.saturating_sub(self.viewport.height);
        self.viewport.top = self.viewport.top.min(max_top);
    }

    fn append_node(
        &mut self,
        parent: LiveNodeId,
        kind: LiveNodeKind,
        name: &str,
        data: String,
    ) -> Result<LiveNodeId, LiveTreeError> {
        let parent_kind = self.node(parent)?.kind;
        if !matches!(
            parent_kind,
            LiveNodeKind::Document | LiveNodeKind::Element | LiveNodeKind::DocumentFragment
        ) {
            return Err(LiveTreeError::NotAContainer(parent));
        }

        let id = LiveNodeId::for_slot(self.nodes.len())?;
        self.nodes.push(LiveNode {
            kind,
            name: SmolStr::new(name),
            data,
            parent: Some(parent),
            children: Vec::new(),
            attributes: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    fn node(&self, node: LiveNodeId) -> Result<&LiveNode, LiveTreeError> {
        self.nodes
            .get(node.index())
            .ok_or(LiveTreeError::UnknownNode(node))
    }

    fn element_mut(&mut self, node: LiveNodeId) -> Result<&mut LiveNode, LiveTreeError> {
        let record = self
            .nodes
            .get_mut(node.index())
            .ok_or(LiveTreeError::UnknownNode(node))?;
        if record.kind != LiveNodeKind::Element {
            return Err(LiveTreeError::NotAnElement(node));
        }
        Ok(record)
    }

    fn attr(&self, attr: LiveAttrId) -> Option<&LiveAttr> {
        self.attrs.get(attr.index()).and_then(Option::as_ref)
    }

    fn collect_text(&self, node: LiveNodeId, out: &mut String) {
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            let Some(record) = self.nodes.get(node.index()) else {
                continue;
            };
            match record.kind {
                LiveNodeKind::Text | LiveNodeKind::CDataSection => out.push_str(&record.data),
                LiveNodeKind::Element | LiveNodeKind::Document | LiveNodeKind::DocumentFragment => {
                    stack.extend(record.children.iter().rev().copied());
                }
                _ => {}
            }
        }
    }
}

impl LiveTreeAdapter for LiveDocument {
    fn document_root(&self) -> LiveNodeId {
        self.root
    }

    fn node_kind(&self, node: LiveNodeId) -> Option<LiveNodeKind> {
        self.node(node).ok().map(|record| record.kind)
    }

    fn tag_name(&self, node: LiveNodeId) -> Option<&str> {
        let record = self.node(node).ok()?;
        (record.kind == LiveNodeKind::Element).then_some(record.name.as_str())
    }

    fn children(&self, node: LiveNodeId) -> Vec<LiveNodeId> {
        self.node(node)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    fn attributes(&self, element: LiveNodeId) -> Vec<LiveAttrId> {
        self.node(element)
            .map(|record| record.attributes.clone())
            .unwrap_or_default()
    }

    fn attribute_name(&self, attr: LiveAttrId) -> Option<&str> {
        self.attr(attr).map(|record| record.name.as_str())
    }

    fn attribute_value(&self, attr: LiveAttrId) -> Option<&str> {
        self.attr(attr).map(|record| record.value.as_str())
    }

    fn attribute_owner(&self, attr: LiveAttrId) -> Option<LiveNodeId> {
        self.attr(attr).map(|record| record.owner)
    }

    fn text_content(&self, node: LiveNodeId) -> Option<String> {
        let record = self.node(node).ok()?;
        match record.kind {
            LiveNodeKind::Text
            | LiveNodeKind::Comment
            | LiveNodeKind::CDataSection
            | LiveNodeKind::ProcessingInstruction => Some(record.data.clone()),
            LiveNodeKind::Element | LiveNodeKind::DocumentFragment => {
                let mut out = String::new();
                self.collect_text(node, &mut out);
                Some(out)
            }
            _ => None,
        }
    }

    fn set_attribute(
        &mut self,
        element: LiveNodeId,
        name: &str,
        value: &str,
    ) -> Result<LiveAttrId, LiveTreeError> {
        if !is_valid_attribute_name(name) {
            return Err(LiveTreeError::InvalidAttributeName(name.to_owned()));
        }
        let name = name.to_ascii_lowercase();

        let existing = self
            .element_mut(element)?
            .attributes
            .clone()
            .into_iter()
            .find(|attr| {
                self.attrs
                    .get(attr.index())
                    .and_then(Option::as_ref)
                    .is_some_and(|record| record.name == name)
            });

        if let Some(attr) = existing {
            if let Some(Some(record)) = self.attrs.get_mut(attr.index()) {
                record.value = value.to_owned();
            }
            return Ok(attr);
        }

        let attr = LiveAttrId::for_slot(self.attrs.len())?;
        self.attrs.push(Some(LiveAttr {
            owner: element,
            name: SmolStr::new(&name),
            value: value.to_owned(),
        }));
        self.element_mut(element)?.attributes.push(attr);
        Ok(attr)
    }

    fn remove_attribute(
        &mut self,
        element: LiveNodeId,
        name: &str,
    ) -> Result<LiveAttrId, LiveTreeError> {
        let name = name.to_ascii_lowercase();
        let attributes = self.element_mut(element)?.attributes.clone();
        let Some(position) = attributes.iter().position(|attr| {
            self.attr(*attr)
                .is_some_and(|record| record.name == name)
        }) else {
            return Err(LiveTreeError::NoSuchAttribute { element, name });
        };

        let attr = attributes[position];
        self.element_mut(element)?.attributes.remove(position);
        if let Some(slot) = self.attrs.get_mut(attr.index()) {
            *slot = None;
        }
        Ok(attr)
    }

    fn set_text_content(&mut self, node: LiveNodeId, text: &str) -> Result<(), LiveTreeError> {
        let record = self
            .nodes
            .get_mut(node.index())
            .ok_or(LiveTreeError::UnknownNode(node))?;
        match record.kind {
            LiveNodeKind::Text | LiveNodeKind::Comment | LiveNodeKind::CDataSection => {
                record.data = text.to_owned();
                Ok(())
            }
            _ => Err(LiveTreeError::NotCharacterData(node)),
        }
    }

    fn set_selected(&mut self, node: LiveNodeId, selected: bool) -> Result<(), LiveTreeError> {
        match self.node(node)?.kind {
            LiveNodeKind::Element | LiveNodeKind::Document => {}
            _ => return Err(LiveTreeError::NotAnElement(node)),
        }
        if selected {
            self.selected.insert(node);
        } else {
            self.selected.remove(&node);
        }
        Ok(())
    }

    fn is_selected(&self, node: LiveNodeId) -> bool {
        self.selected.contains(&node)
    }

    fn selected_nodes(&self) -> Vec<LiveNodeId> {
        let mut out = Vec::with_capacity(self.selected.len());
        if self.selected.contains(&self.root) {
            out.push(self.root);
        }
        out.extend(
            self.descendants(self.root)
                .into_iter()
                .filter(|node| self.selected.contains(node)),
        );
        out
    }

    fn is_in_viewport(&self, node: LiveNodeId) -> bool {
        let Some(line) = self.line_of(node) else {
            return false;
        };
        line >= self.viewport.top && line < self.viewport.top + self.viewport.height
    }

    fn scroll_into_view(&mut self, node: LiveNodeId) {
        if let Some(line) = self.line_of(node) {
            self.scroll_to_line(line);
        }
    }
}
