// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The inspector core: building the mirror forest, selection, editing and the
//! context menu.
//!
//! Every operation keeps three sides in step: the live document (through
//! [`LiveTreeAdapter`]), the mirror tree, and the screen rows (through
//! [`ScreenAdapter`]). The helpers in this module are the only places that attach or
//! detach a mirror node together with its row.

pub mod builder;
pub mod edit;
pub mod menu;
pub mod selection;
pub mod session;

pub use builder::{BuildError, BuildOptions, TreeBuilder};
pub use edit::{EditError, EditOutcome};
pub use menu::{
    Answer, ContextMenu, Interaction, MenuAction, MenuError, MenuPosition, MenuSlot, Point,
    Prompter,
};
pub use selection::SelectError;
pub use session::{Inspector, InspectorSession, RowHit};

use crate::live::LiveTreeAdapter;
use crate::model::{
    ChildPosition, LiveRef, MirrorError, MirrorKind, MirrorTree, NodeHandle,
};
use crate::screen::{RowFlag, RowLabel, ScreenAdapter, ScreenError};

/// Failure while keeping the mirror tree and the screen in step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
}

/// Fixed row labels for nodes whose label does not come from the live tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabels {
    pub text: String,
    pub document: String,
}

impl Default for RowLabels {
    fn default() -> Self {
        Self {
            text: "#text".to_owned(),
            document: "#document".to_owned(),
        }
    }
}

impl RowLabels {
    /// The label a mirror of `live` gets: lower-cased tag, the fixed text or
    /// document label, or `name[=value]` for attributes.
    pub fn for_live<L: LiveTreeAdapter + ?Sized>(
        &self,
        live: &L,
        kind: MirrorKind,
        target: LiveRef,
    ) -> RowLabel {
        match (kind, target) {
            (MirrorKind::Element, LiveRef::Node(node)) => RowLabel::name(
                live.tag_name(node)
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_default(),
            ),
            (MirrorKind::Text, _) => RowLabel::name(self.text.clone()),
            (MirrorKind::Document, _) => RowLabel::name(self.document.clone()),
            (MirrorKind::Attribute, LiveRef::Attr(attr)) => RowLabel::attribute(
                live.attribute_name(attr).unwrap_or_default(),
                live.attribute_value(attr).unwrap_or_default(),
            ),
            (MirrorKind::Element, LiveRef::Attr(_))
            | (MirrorKind::Attribute, LiveRef::Node(_)) => RowLabel::default(),
        }
    }
}

/// Creates the mirror node and its row under `parent` at `position`, creating the
/// parent's list on its first child.
pub(crate) fn attach_child<S: ScreenAdapter + ?Sized>(
    tree: &mut MirrorTree,
    screen: &mut S,
    parent: NodeHandle,
    position: ChildPosition,
    kind: MirrorKind,
    target: LiveRef,
    label: RowLabel,
) -> Result<NodeHandle, SyncError> {
    let parent_node = tree.get(parent).ok_or(MirrorError::UnknownNode(parent))?;
    if !parent_node.kind().can_have_children() {
        return Err(MirrorError::NotAContainer(parent).into());
    }
    let parent_row = parent_node.row();

    let list = match parent_node.list() {
        Some(list) => list,
        None => {
            let list = screen.create_list(parent_row)?;
            tree.set_list(parent, Some(list))?;
            screen.set_flag(parent_row, RowFlag::CollapsibleOpen, true)?;
            screen.set_flag(parent_row, RowFlag::CollapsibleClosed, false)?;
            list
        }
    };

    let row = screen.create_row(label)?;
    if kind == MirrorKind::Attribute {
        screen.set_flag(row, RowFlag::Attribute, true)?;
    }
    match position {
        ChildPosition::Append => screen.append_row(list, row)?,
        ChildPosition::At(index) => screen.insert_row(list, index, row)?,
    }
    let handle = tree.insert_child(parent, position, kind, target, row)?;
    Ok(handle)
}

/// Removes a leaf mirror node and its row. Drops the parent's list and its
/// collapsible flags when the list becomes empty.
pub(crate) fn detach_child<S: ScreenAdapter + ?Sized>(
    tree: &mut MirrorTree,
    screen: &mut S,
    handle: NodeHandle,
) -> Result<(), SyncError> {
    let node = tree.get(handle).ok_or(MirrorError::UnknownNode(handle))?;
    let parent = node.parent().ok_or(MirrorError::IsRoot(handle))?;
    let row = node.row();
    let parent_node = tree.get(parent).ok_or(MirrorError::UnknownNode(parent))?;
    let parent_row = parent_node.row();
    let list = parent_node.list().ok_or(MirrorError::UnknownNode(parent))?;

    screen.remove_row(list, row)?;
    tree.remove_leaf(handle)?;

    let emptied = tree.get(parent).is_some_and(|node| node.children().is_empty());
    if emptied {
        screen.drop_list(list)?;
        tree.set_list(parent, None)?;
        screen.set_flag(parent_row, RowFlag::CollapsibleOpen, false)?;
        screen.set_flag(parent_row, RowFlag::CollapsibleClosed, false)?;
    }
    refresh_last_child(tree, screen, parent)
}

/// Puts the `LastChild` flag on the last child row of `parent` and nowhere else.
pub(crate) fn refresh_last_child<S: ScreenAdapter + ?Sized>(
    tree: &MirrorTree,
    screen: &mut S,
    parent: NodeHandle,
) -> Result<(), SyncError> {
    let Some(node) = tree.get(parent) else {
        return Ok(());
    };
    let children = node.children();
    for (index, child) in children.iter().enumerate() {
        if let Some(child) = tree.get(*child) {
            screen.set_flag(child.row(), RowFlag::LastChild, index + 1 == children.len())?;
        }
    }
    Ok(())
}
