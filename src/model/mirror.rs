// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use super::ids::{HandleOverflow, ListId, LiveAttrId, LiveNodeId, NodeHandle, RowId};
use super::kind::MirrorKind;

/// What a mirror node stands for in the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiveRef {
    Node(LiveNodeId),
    /// A specific attribute object of the parent mirror's element.
    Attr(LiveAttrId),
}

impl LiveRef {
    pub fn node(self) -> Option<LiveNodeId> {
        match self {
            Self::Node(node) => Some(node),
            Self::Attr(_) => None,
        }
    }

    pub fn attr(self) -> Option<LiveAttrId> {
        match self {
            Self::Node(_) => None,
            Self::Attr(attr) => Some(attr),
        }
    }
}

impl fmt::Display for LiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => write!(f, "{node}"),
            Self::Attr(attr) => write!(f, "{attr}"),
        }
    }
}

pub type ChildHandles = SmallVec<[NodeHandle; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorNode {
    kind: MirrorKind,
    live: LiveRef,
    row: RowId,
    list: Option<ListId>,
    parent: Option<NodeHandle>,
    children: ChildHandles,
}

impl MirrorNode {
    pub fn kind(&self) -> MirrorKind {
        self.kind
    }

    pub fn live(&self) -> LiveRef {
        self.live
    }

    /// The live node for structural kinds; `None` for attributes.
    pub fn live_node(&self) -> Option<LiveNodeId> {
        self.live.node()
    }

    pub fn live_attr(&self) -> Option<LiveAttrId> {
        self.live.attr()
    }

    pub fn row(&self) -> RowId {
        self.row
    }

    pub fn list(&self) -> Option<ListId> {
        self.list
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

/// Arena of mirror nodes plus the reverse indexes back from live objects and
/// screen rows.
#[derive(Debug, Clone, Default)]
pub struct MirrorTree {
    nodes: Vec<Option<MirrorNode>>,
    root: Option<NodeHandle>,
    by_live: HashMap<LiveRef, NodeHandle>,
    by_row: HashMap<RowId, NodeHandle>,
}

/// Where a new node goes among its parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPosition {
    Append,
    At(usize),
}

impl MirrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&MirrorNode> {
        self.nodes.get(handle.index()).and_then(Option::as_ref)
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn find_by_live(&self, live: LiveRef) -> Option<NodeHandle> {
        self.by_live.get(&live).copied()
    }

    pub fn find_by_row(&self, row: RowId) -> Option<NodeHandle> {
        self.by_row.get(&row).copied()
    }

    /// Inserts the forest root. Replaces nothing: a second root is rejected.
    pub fn insert_root(
        &mut self,
        kind: MirrorKind,
        live: LiveRef,
        row: RowId,
    ) -> Result<NodeHandle, MirrorError> {
        if let Some(root) = self.root {
            return Err(MirrorError::RootExists(root));
        }
        let handle = self.push(MirrorNode {
            kind,
            live,
            row,
            list: None,
            parent: None,
            children: ChildHandles::new(),
        })?;
        self.root = Some(handle);
        Ok(handle)
    }

    pub fn insert_child(
        &mut self,
        parent: NodeHandle,
        position: ChildPosition,
        kind: MirrorKind,
        live: LiveRef,
        row: RowId,
    ) -> Result<NodeHandle, MirrorError> {
        let parent_kind = self.node(parent)?.kind;
        if !parent_kind.can_have_children() {
            return Err(MirrorError::NotAContainer(parent));
        }
        if self.by_live.contains_key(&live) {
            return Err(MirrorError::LiveAlreadyMirrored(live));
        }
        if self.by_row.contains_key(&row) {
            return Err(MirrorError::RowAlreadyMirrored(row));
        }

        let handle = self.push(MirrorNode {
            kind,
            live,
            row,
            list: None,
            parent: Some(parent),
            children: ChildHandles::new(),
        })?;
        let siblings = &mut self.node_mut(parent)?.children;
        match position {
            ChildPosition::Append => siblings.push(handle),
            ChildPosition::At(index) => siblings.insert(index.min(siblings.len()), handle),
        }
        Ok(handle)
    }

    /// Removes a leaf node and returns its record.
    pub fn remove_leaf(&mut self, handle: NodeHandle) -> Result<MirrorNode, MirrorError> {
        let node = self.node(handle)?;
        if !node.children.is_empty() {
            return Err(MirrorError::HasChildren(handle));
        }
        let Some(parent) = node.parent else {
            return Err(MirrorError::IsRoot(handle));
        };

        self.node_mut(parent)?.children.retain(|child| *child != handle);
        let removed = self.nodes[handle.index()]
            .take()
            .ok_or(MirrorError::UnknownNode(handle))?;
        self.by_live.remove(&removed.live);
        self.by_row.remove(&removed.row);
        Ok(removed)
    }

    /// Points a node at a different live object, keeping the index consistent.
    pub fn set_live(&mut self, handle: NodeHandle, live: LiveRef) -> Result<(), MirrorError> {
        if let Some(existing) = self.by_live.get(&live) {
            if *existing == handle {
                return Ok(());
            }
            return Err(MirrorError::LiveAlreadyMirrored(live));
        }
        let node = self.node_mut(handle)?;
        let old = std::mem::replace(&mut node.live, live);
        self.by_live.remove(&old);
        self.by_live.insert(live, handle);
        Ok(())
    }

    pub fn set_list(&mut self, handle: NodeHandle, list: Option<ListId>) -> Result<(), MirrorError> {
        self.node_mut(handle)?.list = list;
        Ok(())
    }

    /// Index of `handle` within its parent's children.
    pub fn position_in_parent(&self, handle: NodeHandle) -> Option<usize> {
        let parent = self.get(handle)?.parent?;
        self.get(parent)?
            .children
            .iter()
            .position(|child| *child == handle)
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut current = self.get(handle).and_then(MirrorNode::parent);
        while let Some(next) = current {
            out.push(next);
            current = self.get(next).and_then(MirrorNode::parent);
        }
        out
    }

    /// Every node in pre-order (a node, then its children in order).
    pub fn pre_order(&self) -> Vec<NodeHandle> {
        let mut out = Vec::with_capacity(self.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            out.push(handle);
            if let Some(node) = self.get(handle) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Verifies the structural invariants: parent/child links agree, each node
    /// appears once under its parent, attributes are leaves without lists, a list
    /// exists iff there are children, and both reverse indexes are bijective.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut live_seen = HashMap::new();
        let mut row_seen = HashMap::new();

        for (index, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else {
                continue;
            };
            let handle = NodeHandle::new(index as u32);

            match node.parent {
                None if self.root != Some(handle) => {
                    return Err(InvariantViolation::Orphan(handle));
                }
                None => {}
                Some(parent) => {
                    let occurrences = self
                        .get(parent)
                        .map(|parent| parent.children.iter().filter(|c| **c == handle).count())
                        .unwrap_or(0);
                    if occurrences != 1 {
                        return Err(InvariantViolation::ChildLink { handle, occurrences });
                    }
                }
            }

            for child in &node.children {
                if self.get(*child).and_then(MirrorNode::parent) != Some(handle) {
                    return Err(InvariantViolation::ParentLink {
                        parent: handle,
                        child: *child,
                    });
                }
            }

            if node.kind == MirrorKind::Attribute
                && (!node.children.is_empty() || node.list.is_some())
            {
                return Err(InvariantViolation::AttributeWithChildren(handle));
            }
            if node.list.is_some() != !node.children.is_empty() {
                return Err(InvariantViolation::ListMismatch(handle));
            }
            if matches!(node.kind, MirrorKind::Attribute) != matches!(node.live, LiveRef::Attr(_)) {
                return Err(InvariantViolation::KindMismatch(handle));
            }

            if live_seen.insert(node.live, handle).is_some()
                || self.by_live.get(&node.live) != Some(&handle)
            {
                return Err(InvariantViolation::LiveIndex(handle));
            }
            if row_seen.insert(node.row, handle).is_some()
                || self.by_row.get(&node.row) != Some(&handle)
            {
                return Err(InvariantViolation::RowIndex(handle));
            }
        }

        if live_seen.len() != self.by_live.len() || row_seen.len() != self.by_row.len() {
            return Err(InvariantViolation::StaleIndexEntry);
        }
        Ok(())
    }

    fn push(&mut self, node: MirrorNode) -> Result<NodeHandle, MirrorError> {
        let handle = NodeHandle::for_slot(self.nodes.len())?;
        self.by_live.insert(node.live, handle);
        self.by_row.insert(node.row, handle);
        self.nodes.push(Some(node));
        Ok(handle)
    }

    fn node(&self, handle: NodeHandle) -> Result<&MirrorNode, MirrorError> {
        self.get(handle).ok_or(MirrorError::UnknownNode(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut MirrorNode, MirrorError> {
        self.nodes
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or(MirrorError::UnknownNode(handle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("mirror node {0} does not exist")]
    UnknownNode(NodeHandle),
    #[error("mirror tree already has root {0}")]
    RootExists(NodeHandle),
    #[error("mirror node {0} cannot have children")]
    NotAContainer(NodeHandle),
    #[error("mirror node {0} still has children")]
    HasChildren(NodeHandle),
    #[error("mirror node {0} is the root")]
    IsRoot(NodeHandle),
    #[error("live object {0} is already mirrored")]
    LiveAlreadyMirrored(LiveRef),
    #[error("screen row {0} already belongs to a mirror node")]
    RowAlreadyMirrored(RowId),
    #[error(transparent)]
    Overflow(#[from] HandleOverflow),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{0} has no parent but is not the root")]
    Orphan(NodeHandle),
    #[error("{handle} appears {occurrences} times under its parent")]
    ChildLink { handle: NodeHandle, occurrences: usize },
    #[error("{child} is listed under {parent} but points elsewhere")]
    ParentLink { parent: NodeHandle, child: NodeHandle },
    #[error("attribute {0} has children or a list")]
    AttributeWithChildren(NodeHandle),
    #[error("{0} has a list without children or children without a list")]
    ListMismatch(NodeHandle),
    #[error("{0} kind does not match its live reference")]
    KindMismatch(NodeHandle),
    #[error("live index disagrees at {0}")]
    LiveIndex(NodeHandle),
    #[error("row index disagrees at {0}")]
    RowIndex(NodeHandle),
    #[error("an index entry points at a removed node")]
    StaleIndexEntry,
}

#[cfg(test)]
mod tests {
    use super::{ChildPosition, InvariantViolation, LiveRef, MirrorError, MirrorTree};
    use crate::model::{ListId, LiveAttrId, LiveNodeId, MirrorKind, RowId};

    fn tree_with_element() -> (MirrorTree, crate::model::NodeHandle) {
        let mut tree = MirrorTree::new();
        let root = tree
            .insert_root(
                MirrorKind::Element,
                LiveRef::Node(LiveNodeId::new(1)),
                RowId::new(0),
            )
            .expect("root");
        (tree, root)
    }

    #[test]
    fn children_keep_requested_positions() {
        let (mut tree, root) = tree_with_element();
        let p = tree
            .insert_child(
                root,
                ChildPosition::Append,
                MirrorKind::Element,
                LiveRef::Node(LiveNodeId::new(2)),
                RowId::new(1),
            )
            .expect("p");
        let id = tree
            .insert_child(
                root,
                ChildPosition::At(0),
                MirrorKind::Attribute,
                LiveRef::Attr(LiveAttrId::new(0)),
                RowId::new(2),
            )
            .expect("id");
        tree.set_list(root, Some(ListId::new(0))).expect("list");

        let children = tree.get(root).expect("root").children().to_vec();
        assert_eq!(children, vec![id, p]);
        assert_eq!(tree.position_in_parent(p), Some(1));
        assert_eq!(tree.ancestors(p), vec![root]);
        assert_eq!(tree.find_by_row(RowId::new(2)), Some(id));
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn attributes_cannot_host_children() {
        let (mut tree, root) = tree_with_element();
        let attr = tree
            .insert_child(
                root,
                ChildPosition::Append,
                MirrorKind::Attribute,
                LiveRef::Attr(LiveAttrId::new(0)),
                RowId::new(1),
            )
            .expect("attr");
        let err = tree
            .insert_child(
                attr,
                ChildPosition::Append,
                MirrorKind::Text,
                LiveRef::Node(LiveNodeId::new(9)),
                RowId::new(2),
            )
            .unwrap_err();
        assert_eq!(err, MirrorError::NotAContainer(attr));
    }

    #[test]
    fn live_and_row_indexes_reject_duplicates() {
        let (mut tree, root) = tree_with_element();
        let err = tree
            .insert_child(
                root,
                ChildPosition::Append,
                MirrorKind::Text,
                LiveRef::Node(LiveNodeId::new(1)),
                RowId::new(5),
            )
            .unwrap_err();
        assert_eq!(
            err,
            MirrorError::LiveAlreadyMirrored(LiveRef::Node(LiveNodeId::new(1)))
        );
    }

    #[test]
    fn remove_leaf_clears_indexes() {
        let (mut tree, root) = tree_with_element();
        let attr = tree
            .insert_child(
                root,
                ChildPosition::Append,
                MirrorKind::Attribute,
                LiveRef::Attr(LiveAttrId::new(0)),
                RowId::new(1),
            )
            .expect("attr");
        tree.set_list(root, Some(ListId::new(0))).expect("list");

        assert_eq!(tree.remove_leaf(root), Err(MirrorError::HasChildren(root)));
        tree.remove_leaf(attr).expect("remove");
        tree.set_list(root, None).expect("list");

        assert!(!tree.contains(attr));
        assert_eq!(tree.find_by_live(LiveRef::Attr(LiveAttrId::new(0))), None);
        assert_eq!(tree.len(), 1);
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn set_live_moves_the_index_entry() {
        let (mut tree, root) = tree_with_element();
        let attr = tree
            .insert_child(
                root,
                ChildPosition::Append,
                MirrorKind::Attribute,
                LiveRef::Attr(LiveAttrId::new(0)),
                RowId::new(1),
            )
            .expect("attr");
        tree.set_list(root, Some(ListId::new(0))).expect("list");

        tree.set_live(attr, LiveRef::Attr(LiveAttrId::new(7)))
            .expect("repoint");
        assert_eq!(tree.find_by_live(LiveRef::Attr(LiveAttrId::new(0))), None);
        assert_eq!(
            tree.find_by_live(LiveRef::Attr(LiveAttrId::new(7))),
            Some(attr)
        );
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn check_invariants_reports_missing_list() {
        let (mut tree, root) = tree_with_element();
        tree.insert_child(
            root,
            ChildPosition::Append,
            MirrorKind::Text,
            LiveRef::Node(LiveNodeId::new(3)),
            RowId::new(1),
        )
        .expect("text");
        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::ListMismatch(root))
        );
    }
}
