// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Edits that keep the live document, the mirror tree and the screen rows in step.
//!
//! Every operation takes the user's answer as an `Option<&str>`: `None` or an empty
//! string cancels the edit without touching anything. Preconditions are checked
//! before the first mutation, and the live side is always mutated first, so a
//! failure leaves all three sides as they were.

use super::session::Inspector;
use super::{attach_child, detach_child, refresh_last_child, SyncError};
use crate::live::{LiveTreeAdapter, LiveTreeError};
use crate::model::{
    ChildPosition, LiveAttrId, LiveNodeId, LiveRef, MirrorError, MirrorKind, NodeHandle, RowId,
};
use crate::screen::{RowLabel, ScreenAdapter};

/// What an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The user declined or answered with an empty value.
    Cancelled,
    /// Existing nodes were updated in place.
    Updated,
    /// A new attribute mirror node was created.
    Created(NodeHandle),
    /// The attribute mirror node was destroyed.
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("mirror node {0} does not exist")]
    UnknownNode(NodeHandle),
    #[error("expected a {expected} node, {node} is a {found} node")]
    WrongKind {
        node: NodeHandle,
        expected: MirrorKind,
        found: MirrorKind,
    },
    #[error(
        "Attribute '{name}' already exists. You can edit its value by right clicking the attribute and editing the value!"
    )]
    DuplicateAttribute { name: String },
    #[error("attribute node {0} is not attached to a live element")]
    Detached(NodeHandle),
    #[error(transparent)]
    Live(#[from] LiveTreeError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<MirrorError> for EditError {
    fn from(err: MirrorError) -> Self {
        Self::Sync(err.into())
    }
}

/// The attribute a mirror node points at, plus where it lives.
#[derive(Debug, Clone, Copy)]
struct AttributeTarget {
    attr: LiveAttrId,
    parent: NodeHandle,
    element: LiveNodeId,
    row: RowId,
}

fn answer(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

impl<L: LiveTreeAdapter, S: ScreenAdapter> Inspector<L, S> {
    /// Sets the element's `id`. A new `id` row goes first among the children.
    pub fn set_id(
        &mut self,
        handle: NodeHandle,
        value: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let element = self.element_of(handle)?;
        let Some(value) = answer(value) else {
            return Ok(EditOutcome::Cancelled);
        };
        self.upsert_attribute(handle, element, "id", value, ChildPosition::At(0))
    }

    /// Sets the element's `class`. A new `class` row goes right after the `id` row
    /// when there is one, first otherwise.
    pub fn set_class(
        &mut self,
        handle: NodeHandle,
        value: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let element = self.element_of(handle)?;
        let Some(value) = answer(value) else {
            return Ok(EditOutcome::Cancelled);
        };
        let position = match self.attribute_child(handle, "id") {
            Some((index, _)) => index + 1,
            None => 0,
        };
        self.upsert_attribute(handle, element, "class", value, ChildPosition::At(position))
    }

    /// Adds a new attribute after the last attribute row. A missing value means an
    /// empty value; a missing name cancels.
    pub fn add_attribute(
        &mut self,
        handle: NodeHandle,
        name: Option<&str>,
        value: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let element = self.element_of(handle)?;
        let Some(name) = answer(name) else {
            return Ok(EditOutcome::Cancelled);
        };
        let name = name.to_ascii_lowercase();
        if self.live.has_attribute(element, &name) {
            tracing::debug!(node = %handle, name = %name, "attribute already exists");
            return Err(EditError::DuplicateAttribute { name });
        }
        let position = self.attribute_row_count(handle);
        self.upsert_attribute(
            handle,
            element,
            &name,
            value.unwrap_or_default(),
            ChildPosition::At(position),
        )
    }

    /// Renames an attribute, keeping its value and its row position.
    pub fn set_attribute_name(
        &mut self,
        handle: NodeHandle,
        name: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let target = self.attribute_of(handle)?;
        let Some(name) = answer(name) else {
            return Ok(EditOutcome::Cancelled);
        };
        let new_name = name.to_ascii_lowercase();
        let old_name = self.live_attribute_name(handle, target.attr)?;
        if new_name == old_name {
            return Ok(EditOutcome::Updated);
        }
        if self.live.has_attribute(target.element, &new_name) {
            return Err(EditError::DuplicateAttribute { name: new_name });
        }
        let value = self
            .live
            .attribute_value(target.attr)
            .unwrap_or_default()
            .to_owned();

        let renamed = self.live.set_attribute(target.element, &new_name, &value)?;
        if let Err(err) = self.live.remove_attribute(target.element, &old_name) {
            if let Err(rollback) = self.live.remove_attribute(target.element, &new_name) {
                tracing::error!(error = %rollback, "rename rollback failed");
            }
            return Err(err.into());
        }

        self.tree.set_live(handle, LiveRef::Attr(renamed))?;
        self.relabel_attribute(target.row, renamed)?;
        tracing::info!(node = %handle, from = %old_name, to = %new_name, "attribute renamed");
        Ok(EditOutcome::Updated)
    }

    pub fn set_attribute_value(
        &mut self,
        handle: NodeHandle,
        value: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let target = self.attribute_of(handle)?;
        let Some(value) = answer(value) else {
            return Ok(EditOutcome::Cancelled);
        };
        let name = self.live_attribute_name(handle, target.attr)?;

        let attr = self.live.set_attribute(target.element, &name, value)?;
        if attr != target.attr {
            self.tree.set_live(handle, LiveRef::Attr(attr))?;
        }
        self.relabel_attribute(target.row, attr)?;
        tracing::info!(node = %handle, name = %name, "attribute value set");
        Ok(EditOutcome::Updated)
    }

    /// Removes the attribute from the live element and destroys its mirror node.
    pub fn delete_attribute(&mut self, handle: NodeHandle) -> Result<EditOutcome, EditError> {
        let target = self.attribute_of(handle)?;
        let name = self.live_attribute_name(handle, target.attr)?;

        self.live.remove_attribute(target.element, &name)?;
        detach_child(&mut self.tree, &mut self.screen, handle)?;
        if self.session.pending_context_target == Some(handle) {
            self.session.pending_context_target = None;
        }
        tracing::info!(node = %handle, parent = %target.parent, name = %name, "attribute deleted");
        Ok(EditOutcome::Deleted)
    }

    /// Replaces the live text. The row keeps its fixed text label.
    pub fn edit_text(
        &mut self,
        handle: NodeHandle,
        text: Option<&str>,
    ) -> Result<EditOutcome, EditError> {
        let live = self.live_node_of(handle, MirrorKind::Text)?;
        let Some(text) = answer(text) else {
            return Ok(EditOutcome::Cancelled);
        };
        self.live.set_text_content(live, text)?;
        tracing::info!(node = %handle, "text edited");
        Ok(EditOutcome::Updated)
    }

    /// Sets `name` on the live element, then updates the matching attribute row or
    /// creates one at `position`.
    fn upsert_attribute(
        &mut self,
        handle: NodeHandle,
        element: LiveNodeId,
        name: &str,
        value: &str,
        position: ChildPosition,
    ) -> Result<EditOutcome, EditError> {
        let existed = self.live.has_attribute(element, name);
        let attr = self.live.set_attribute(element, name, value)?;

        if let Some((_, child)) = self.attribute_child(handle, name) {
            self.tree.set_live(child, LiveRef::Attr(attr))?;
            let row = self.tree.get(child).ok_or(EditError::UnknownNode(child))?.row();
            self.relabel_attribute(row, attr)?;
            tracing::info!(node = %handle, name = %name, "attribute updated");
            return Ok(EditOutcome::Updated);
        }

        let label = RowLabel::attribute(name, value);
        let created = attach_child(
            &mut self.tree,
            &mut self.screen,
            handle,
            position,
            MirrorKind::Attribute,
            LiveRef::Attr(attr),
            label,
        )
        .and_then(|child| refresh_last_child(&self.tree, &mut self.screen, handle).map(|()| child));
        match created {
            Ok(child) => {
                tracing::info!(node = %handle, child = %child, name = %name, "attribute added");
                Ok(EditOutcome::Created(child))
            }
            Err(err) => {
                if !existed {
                    if let Err(rollback) = self.live.remove_attribute(element, name) {
                        tracing::error!(error = %rollback, "attribute rollback failed");
                    }
                }
                Err(err.into())
            }
        }
    }

    fn relabel_attribute(
        &mut self,
        row: RowId,
        attr: LiveAttrId,
    ) -> Result<(), EditError> {
        let label = RowLabel::attribute(
            self.live.attribute_name(attr).unwrap_or_default(),
            self.live.attribute_value(attr).unwrap_or_default(),
        );
        self.screen
            .set_label(row, label)
            .map_err(SyncError::from)?;
        Ok(())
    }

    /// Index and handle of the attribute child of `handle` named `name`.
    fn attribute_child(&self, handle: NodeHandle, name: &str) -> Option<(usize, NodeHandle)> {
        let node = self.tree.get(handle)?;
        node.children()
            .iter()
            .enumerate()
            .find(|(_, child)| {
                self.tree
                    .get(**child)
                    .and_then(|child| child.live_attr())
                    .and_then(|attr| self.live.attribute_name(attr))
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            })
            .map(|(index, child)| (index, *child))
    }

    fn attribute_row_count(&self, handle: NodeHandle) -> usize {
        self.tree.get(handle).map_or(0, |node| {
            node.children()
                .iter()
                .filter(|child| {
                    self.tree
                        .get(**child)
                        .is_some_and(|child| child.kind() == MirrorKind::Attribute)
                })
                .count()
        })
    }

    fn element_of(&self, handle: NodeHandle) -> Result<LiveNodeId, EditError> {
        self.live_node_of(handle, MirrorKind::Element)
    }

    fn live_node_of(&self, handle: NodeHandle, expected: MirrorKind) -> Result<LiveNodeId, EditError> {
        let node = self.tree.get(handle).ok_or(EditError::UnknownNode(handle))?;
        if node.kind() != expected {
            return Err(EditError::WrongKind {
                node: handle,
                expected,
                found: node.kind(),
            });
        }
        node.live_node().ok_or(EditError::Detached(handle))
    }

    fn attribute_of(&self, handle: NodeHandle) -> Result<AttributeTarget, EditError> {
        let node = self.tree.get(handle).ok_or(EditError::UnknownNode(handle))?;
        if node.kind() != MirrorKind::Attribute {
            return Err(EditError::WrongKind {
                node: handle,
                expected: MirrorKind::Attribute,
                found: node.kind(),
            });
        }
        let attr = node.live_attr().ok_or(EditError::Detached(handle))?;
        let parent = node.parent().ok_or(EditError::Detached(handle))?;
        let element = self
            .tree
            .get(parent)
            .and_then(|parent| parent.live_node())
            .ok_or(EditError::Detached(handle))?;
        Ok(AttributeTarget {
            attr,
            parent,
            element,
            row: node.row(),
        })
    }

    fn live_attribute_name(&self, handle: NodeHandle, attr: LiveAttrId) -> Result<String, EditError> {
        self.live
            .attribute_name(attr)
            .map(str::to_owned)
            .ok_or_else(|| {
                tracing::warn!(node = %handle, attr = %attr, "attribute mirror points at a removed attribute");
                EditError::Detached(handle)
            })
    }
}
