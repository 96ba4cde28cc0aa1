// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;

/// A typed index into one of the arenas (mirror nodes, live nodes, live attributes,
/// screen rows, screen lists).
///
/// Handles are never reused by the arenas that hand them out, so a handle that
/// outlives its slot simply stops resolving instead of aliasing a newer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: HandleTag> Handle<T> {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Builds the handle for the next slot of an arena currently holding `len` slots.
    pub(crate) fn for_slot(len: usize) -> Result<Self, HandleOverflow> {
        u32::try_from(len)
            .map(Self::new)
            .map_err(|_| HandleOverflow { arena: T::PREFIX })
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T: HandleTag> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", T::PREFIX, self.index)
    }
}

/// Marker trait naming the arena a handle belongs to.
pub trait HandleTag {
    const PREFIX: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{arena} arena is full")]
pub struct HandleOverflow {
    pub arena: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MirrorNodeTag {}
impl HandleTag for MirrorNodeTag {
    const PREFIX: &'static str = "m";
}
pub type NodeHandle = Handle<MirrorNodeTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiveNodeTag {}
impl HandleTag for LiveNodeTag {
    const PREFIX: &'static str = "n";
}
pub type LiveNodeId = Handle<LiveNodeTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiveAttrTag {}
impl HandleTag for LiveAttrTag {
    const PREFIX: &'static str = "a";
}
pub type LiveAttrId = Handle<LiveAttrTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowTag {}
impl HandleTag for RowTag {
    const PREFIX: &'static str = "row";
}
pub type RowId = Handle<RowTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListTag {}
impl HandleTag for ListTag {
    const PREFIX: &'static str = "list";
}
pub type ListId = Handle<ListTag>;

#[cfg(test)]
mod tests {
    use super::{LiveNodeId, NodeHandle, RowId};

    #[test]
    fn handles_display_with_arena_prefix() {
        assert_eq!(NodeHandle::new(3).to_string(), "m#3");
        assert_eq!(LiveNodeId::new(0).to_string(), "n#0");
        assert_eq!(RowId::new(12).to_string(), "row#12");
    }

    #[test]
    fn handles_order_by_index() {
        assert!(NodeHandle::new(1) < NodeHandle::new(2));
        assert_eq!(NodeHandle::new(7).index(), 7);
    }

    #[test]
    fn for_slot_uses_arena_length() {
        let handle = RowId::for_slot(5).expect("handle");
        assert_eq!(handle.index(), 5);
    }
}
