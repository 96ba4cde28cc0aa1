// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::builder::{BuildError, BuildOptions, TreeBuilder};
use super::selection::SelectError;
use super::RowLabels;
use crate::live::LiveTreeAdapter;
use crate::model::{LiveNodeId, LiveRef, MirrorKind, MirrorNode, MirrorTree, NodeHandle, RowId};
use crate::screen::ScreenAdapter;

/// Interaction state that survives between input events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectorSession {
    /// The node last selected through [`Inspector::select`].
    pub selected: Option<NodeHandle>,
    /// The node the context menu was opened on; `Some` while the menu is open.
    pub pending_context_target: Option<NodeHandle>,
}

/// Where a row received a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowHit {
    /// The collapse marker of a row with a nested list.
    Marker,
    /// The row label.
    Label,
}

/// Owns both adapters, the mirror tree and the session.
#[derive(Debug, Clone)]
pub struct Inspector<L, S> {
    pub(crate) live: L,
    pub(crate) screen: S,
    pub(crate) tree: MirrorTree,
    pub(crate) session: InspectorSession,
    pub(crate) labels: RowLabels,
}

impl<L: LiveTreeAdapter, S: ScreenAdapter> Inspector<L, S> {
    /// Builds the mirror of `root` into `screen`.
    pub fn build(
        live: L,
        mut screen: S,
        root: LiveNodeId,
        options: &BuildOptions,
    ) -> Result<Self, BuildError> {
        let tree = TreeBuilder::new(options).build(&live, &mut screen, root)?;
        Ok(Self {
            live,
            screen,
            tree,
            session: InspectorSession::default(),
            labels: options.labels.clone(),
        })
    }

    /// Builds the mirror of the whole document.
    pub fn build_document(live: L, screen: S, options: &BuildOptions) -> Result<Self, BuildError> {
        let root = live.document_root();
        Self::build(live, screen, root, options)
    }

    pub fn live(&self) -> &L {
        &self.live
    }

    /// Mutable access for scrolling and resizing. Structural changes made here are
    /// not mirrored.
    pub fn live_mut(&mut self) -> &mut L {
        &mut self.live
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    /// Mutable access for scrolling and resizing; see [`Inspector::live_mut`].
    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn tree(&self) -> &MirrorTree {
        &self.tree
    }

    pub fn session(&self) -> &InspectorSession {
        &self.session
    }

    pub fn labels(&self) -> &RowLabels {
        &self.labels
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&MirrorNode> {
        self.tree.get(handle)
    }

    pub fn node_for_row(&self, row: RowId) -> Option<NodeHandle> {
        self.tree.find_by_row(row)
    }

    pub fn node_for_live(&self, node: LiveNodeId) -> Option<NodeHandle> {
        self.tree.find_by_live(LiveRef::Node(node))
    }

    /// The displayed label of a node's row.
    pub fn row_label(&self, handle: NodeHandle) -> Option<String> {
        let row = self.tree.get(handle)?.row();
        self.screen.label(row).map(ToString::to_string)
    }

    /// Handles a click received on the live document side.
    pub fn select_live(&mut self, node: LiveNodeId) -> Result<(), SelectError> {
        self.session.pending_context_target = None;
        let handle = self
            .node_for_live(node)
            .ok_or(SelectError::NotMirrored(node))?;
        self.select(handle)
    }

    /// Handles a click received by a row. Only the row that was hit reacts: a label
    /// click selects elements and the document, a marker click toggles.
    pub fn click_row(&mut self, row: RowId, hit: RowHit) -> Result<(), SelectError> {
        self.session.pending_context_target = None;
        let Some(handle) = self.node_for_row(row) else {
            tracing::warn!(row = %row, "click on a row without a mirror node");
            return Ok(());
        };
        let Some((kind, collapsible)) = self
            .tree
            .get(handle)
            .map(|node| (node.kind(), node.list().is_some()))
        else {
            return Ok(());
        };
        match (hit, kind) {
            (RowHit::Marker, _) if collapsible => self.toggle(handle),
            (RowHit::Marker, _) => Ok(()),
            (RowHit::Label, MirrorKind::Element | MirrorKind::Document) => self.select(handle),
            (RowHit::Label, MirrorKind::Text | MirrorKind::Attribute) => Ok(()),
        }
    }
}
