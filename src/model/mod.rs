// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! The mirror tree is an arena of [`MirrorNode`] records addressed by typed handles.
//! Live nodes, live attributes, screen rows and screen lists are addressed by the same
//! handle type with different tags, so they cannot be mixed up.

pub mod ids;
pub mod kind;
pub mod mirror;

pub use ids::{
    Handle, HandleOverflow, HandleTag, ListId, LiveAttrId, LiveNodeId, NodeHandle, RowId,
};
pub use kind::{LiveNodeKind, MirrorKind};
pub use mirror::{
    ChildHandles, ChildPosition, InvariantViolation, LiveRef, MirrorError, MirrorNode,
    MirrorTree,
};
