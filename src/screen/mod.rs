// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The presentation boundary.
//!
//! Rows and lists are opaque handles. A row may own one nested list; a list holds
//! rows in display order and can be hidden as a whole. [`ScreenTree`] is the
//! in-memory binding drawn by the terminal front end.

pub mod tree;

use std::fmt;

pub use tree::{ScreenTree, VisibleRow};

use crate::model::{HandleOverflow, ListId, RowId};

/// Marker flags a row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowFlag {
    CollapsibleOpen,
    CollapsibleClosed,
    LastChild,
    Attribute,
    Selected,
}

impl RowFlag {
    pub const ALL: [RowFlag; 5] = [
        RowFlag::CollapsibleOpen,
        RowFlag::CollapsibleClosed,
        RowFlag::LastChild,
        RowFlag::Attribute,
        RowFlag::Selected,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::CollapsibleOpen => 1 << 0,
            Self::CollapsibleClosed => 1 << 1,
            Self::LastChild => 1 << 2,
            Self::Attribute => 1 << 3,
            Self::Selected => 1 << 4,
        }
    }
}

/// A compact set of [`RowFlag`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RowFlags(u8);

impl RowFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, flag: RowFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn set(&mut self, flag: RowFlag, on: bool) {
        if on {
            self.0 |= flag.bit();
        } else {
            self.0 &= !flag.bit();
        }
    }

    pub fn iter(self) -> impl Iterator<Item = RowFlag> {
        RowFlag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }
}

/// The text of a row: a name segment plus an optional value segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowLabel {
    pub name: String,
    pub value: Option<String>,
}

impl RowLabel {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// `name=value`, or just `name` when the value is blank.
    pub fn attribute(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            value: (!value.trim().is_empty()).then(|| value.to_owned()),
        }
    }
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// Capability interface over the presentation layer.
pub trait ScreenAdapter {
    /// The list that hosts the forest root's row.
    fn top_level_list(&self) -> ListId;

    /// Creates a detached row.
    fn create_row(&mut self, label: RowLabel) -> Result<RowId, ScreenError>;

    /// Creates a list and nests it under `owner`.
    fn create_list(&mut self, owner: RowId) -> Result<ListId, ScreenError>;

    /// Detaches and discards the nested list of `owner`. The list must be empty.
    fn drop_list(&mut self, list: ListId) -> Result<(), ScreenError>;

    fn append_row(&mut self, list: ListId, row: RowId) -> Result<(), ScreenError>;

    /// Inserts `row` at `index`, clamped to the list length.
    fn insert_row(&mut self, list: ListId, index: usize, row: RowId) -> Result<(), ScreenError>;

    /// Detaches `row` from `list` and discards it.
    fn remove_row(&mut self, list: ListId, row: RowId) -> Result<(), ScreenError>;

    fn rows(&self, list: ListId) -> Vec<RowId>;

    fn label(&self, row: RowId) -> Option<&RowLabel>;

    fn set_label(&mut self, row: RowId, label: RowLabel) -> Result<(), ScreenError>;

    fn set_flag(&mut self, row: RowId, flag: RowFlag, on: bool) -> Result<(), ScreenError>;

    fn has_flag(&self, row: RowId, flag: RowFlag) -> bool;

    fn set_list_hidden(&mut self, list: ListId, hidden: bool) -> Result<(), ScreenError>;

    fn is_list_hidden(&self, list: ListId) -> bool;

    /// Whether the row is currently inside the scrolled viewport.
    fn is_row_visible(&self, row: RowId) -> bool;

    fn scroll_row_into_view(&mut self, row: RowId);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    #[error("screen row {0} does not exist")]
    UnknownRow(RowId),
    #[error("screen list {0} does not exist")]
    UnknownList(ListId),
    #[error("screen row {0} is already attached to a list")]
    RowAttached(RowId),
    #[error("screen row {row} is not in list {list}")]
    RowNotInList { row: RowId, list: ListId },
    #[error("screen row {0} already owns a list")]
    ListExists(RowId),
    #[error("screen list {0} is not empty")]
    ListNotEmpty(ListId),
    #[error("screen row {0} still owns a list")]
    RowHasList(RowId),
    #[error(transparent)]
    Overflow(#[from] HandleOverflow),
}

#[cfg(test)]
mod tests {
    use super::{RowFlag, RowFlags, RowLabel};

    #[test]
    fn labels_render_name_and_optional_value() {
        assert_eq!(RowLabel::name("div").to_string(), "div");
        assert_eq!(RowLabel::attribute("id", "a").to_string(), "id=a");
        assert_eq!(RowLabel::attribute("hidden", "").to_string(), "hidden");
        assert_eq!(RowLabel::attribute("title", "  ").to_string(), "title");
    }

    #[test]
    fn flags_set_and_clear_independently() {
        let mut flags = RowFlags::empty();
        flags.set(RowFlag::LastChild, true);
        flags.set(RowFlag::Selected, true);
        flags.set(RowFlag::LastChild, false);
        assert!(flags.contains(RowFlag::Selected));
        assert!(!flags.contains(RowFlag::LastChild));
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![RowFlag::Selected]);
    }
}
