// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The native node-type enumeration of a live document.
///
/// Discriminants follow the DOM `nodeType` numbering so adapters backed by a
/// real host can convert with [`LiveNodeKind::from_node_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveNodeKind {
    Element,
    Attribute,
    Text,
    CDataSection,
    EntityReference,
    Entity,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    Notation,
}

impl LiveNodeKind {
    pub const fn node_type(self) -> u16 {
        match self {
            Self::Element => 1,
            Self::Attribute => 2,
            Self::Text => 3,
            Self::CDataSection => 4,
            Self::EntityReference => 5,
            Self::Entity => 6,
            Self::ProcessingInstruction => 7,
            Self::Comment => 8,
            Self::Document => 9,
            Self::DocumentType => 10,
            Self::DocumentFragment => 11,
            Self::Notation => 12,
        }
    }

    pub const fn from_node_type(node_type: u16) -> Option<Self> {
        Some(match node_type {
            1 => Self::Element,
            2 => Self::Attribute,
            3 => Self::Text,
            4 => Self::CDataSection,
            5 => Self::EntityReference,
            6 => Self::Entity,
            7 => Self::ProcessingInstruction,
            8 => Self::Comment,
            9 => Self::Document,
            10 => Self::DocumentType,
            11 => Self::DocumentFragment,
            12 => Self::Notation,
            _ => return None,
        })
    }
}

/// The kinds of node that have a mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorKind {
    Document,
    Element,
    Text,
    Attribute,
}

impl MirrorKind {
    /// Maps a structural live node kind to its mirror kind.
    ///
    /// Attributes are not structural children; they are mirrored from the owning
    /// element's attribute list, so `Attribute` maps to `None` here like every
    /// other unmirrored kind.
    pub const fn from_structural(kind: LiveNodeKind) -> Option<Self> {
        match kind {
            LiveNodeKind::Element => Some(Self::Element),
            LiveNodeKind::Document => Some(Self::Document),
            LiveNodeKind::Text => Some(Self::Text),
            LiveNodeKind::Attribute
            | LiveNodeKind::CDataSection
            | LiveNodeKind::EntityReference
            | LiveNodeKind::Entity
            | LiveNodeKind::ProcessingInstruction
            | LiveNodeKind::Comment
            | LiveNodeKind::DocumentType
            | LiveNodeKind::DocumentFragment
            | LiveNodeKind::Notation => None,
        }
    }

    /// Whether nodes of this kind may host a nested child list.
    pub const fn can_have_children(self) -> bool {
        match self {
            Self::Document | Self::Element => true,
            Self::Text | Self::Attribute => false,
        }
    }

    /// Whether nodes of this kind can carry the selected marking.
    pub const fn is_selectable(self) -> bool {
        match self {
            Self::Document | Self::Element => true,
            Self::Text | Self::Attribute => false,
        }
    }
}

impl fmt::Display for MirrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Element => "element",
            Self::Text => "text",
            Self::Attribute => "attribute",
        })
    }
}
