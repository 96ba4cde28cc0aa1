// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use super::{RowFlag, RowFlags, RowLabel, ScreenAdapter, ScreenError};
use crate::live::Viewport;
use crate::model::{ListId, RowId};

/// In-memory rows and lists.
///
/// Rows and lists live in tombstoned arenas; the viewport is a window over the
/// flattened sequence of rows not hidden by a collapsed ancestor list.
#[derive(Debug, Clone)]
pub struct ScreenTree {
    rows: Vec<Option<Row>>,
    lists: Vec<Option<List>>,
    top: ListId,
    viewport: Viewport,
}

#[derive(Debug, Clone)]
struct Row {
    label: RowLabel,
    flags: RowFlags,
    nested: Option<ListId>,
    attached_to: Option<ListId>,
}

#[derive(Debug, Clone, Default)]
struct List {
    rows: Vec<RowId>,
    hidden: bool,
    owner: Option<RowId>,
}

/// One entry of [`ScreenTree::visible_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    pub row: RowId,
    pub depth: usize,
}

impl Default for ScreenTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenTree {
    pub const DEFAULT_VIEWPORT_HEIGHT: usize = 40;

    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            lists: vec![Some(List::default())],
            top: ListId::new(0),
            viewport: Viewport {
                top: 0,
                height: Self::DEFAULT_VIEWPORT_HEIGHT,
            },
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.iter().flatten().count()
    }

    pub fn flags(&self, row: RowId) -> RowFlags {
        self.row(row).map(|record| record.flags).unwrap_or_default()
    }

    /// The list nested under `row`, if any.
    pub fn nested_list(&self, row: RowId) -> Option<ListId> {
        self.row(row).ok().and_then(|record| record.nested)
    }

    /// Rows in display order, skipping everything under a hidden list.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut out = Vec::new();
        self.collect_visible(self.top, 0, &mut out);
        out
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport.height = height.max(1);
        self.clamp_viewport();
    }

    pub fn scroll_to(&mut self, top: usize) {
        self.viewport.top = top;
        self.clamp_viewport();
    }

    /// Plain-text rendering of the visible rows, one per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for entry in self.visible_rows() {
            let flags = self.flags(entry.row);
            let marker = if flags.contains(RowFlag::CollapsibleOpen) {
                "▾ "
            } else if flags.contains(RowFlag::CollapsibleClosed) {
                "▸ "
            } else if flags.contains(RowFlag::Attribute) {
                "@ "
            } else {
                "  "
            };
            let label = self
                .label(entry.row)
                .map(ToString::to_string)
                .unwrap_or_default();
            let _ = write!(out, "{}{marker}{label}", "  ".repeat(entry.depth));
            if flags.contains(RowFlag::Selected) {
                out.push_str("  *");
            }
            out.push('\n');
        }
        out
    }

    fn collect_visible(&self, list: ListId, depth: usize, out: &mut Vec<VisibleRow>) {
        // (list, depth, next row index)
        let mut stack = vec![(list, depth, 0usize)];
        while let Some((list, depth, next)) = stack.pop() {
            let Some(row) = self
                .list(list)
                .ok()
                .and_then(|record| record.rows.get(next).copied())
            else {
                continue;
            };
            stack.push((list, depth, next + 1));
            out.push(VisibleRow { row, depth });
            let nested = self.row(row).ok().and_then(|record| record.nested);
            if let Some(nested) = nested.filter(|nested| !self.is_list_hidden(*nested)) {
                stack.push((nested, depth + 1, 0));
            }
        }
    }

    fn visible_index(&self, row: RowId) -> Option<usize> {
        self.visible_rows().iter().position(|entry| entry.row == row)
    }

    fn clamp_viewport(&mut self) {
        let total = self.visible_rows().len();
        let max_top = total.saturating_sub(self.viewport.height);
        self.viewport.top = self.viewport.top.min(max_top);
    }

    fn row(&self, row: RowId) -> Result<&Row, ScreenError> {
        self.rows
            .get(row.index())
            .and_then(Option::as_ref)
            .ok_or(ScreenError::UnknownRow(row))
    }

    fn row_mut(&mut self, row: RowId) -> Result<&mut Row, ScreenError> {
        self.rows
            .get_mut(row.index())
            .and_then(Option::as_mut)
            .ok_or(ScreenError::UnknownRow(row))
    }

    fn list(&self, list: ListId) -> Result<&List, ScreenError> {
        self.lists
            .get(list.index())
            .and_then(Option::as_ref)
            .ok_or(ScreenError::UnknownList(list))
    }

    fn list_mut(&mut self, list: ListId) -> Result<&mut List, ScreenError> {
        self.lists
            .get_mut(list.index())
            .and_then(Option::as_mut)
            .ok_or(ScreenError::UnknownList(list))
    }

    fn check_detached(&self, row: RowId) -> Result<(), ScreenError> {
        match self.row(row)?.attached_to {
            Some(_) => Err(ScreenError::RowAttached(row)),
            None => Ok(()),
        }
    }
}

impl ScreenAdapter for ScreenTree {
    fn top_level_list(&self) -> ListId {
        self.top
    }

    fn create_row(&mut self, label: RowLabel) -> Result<RowId, ScreenError> {
        let row = RowId::for_slot(self.rows.len())?;
        self.rows.push(Some(Row {
            label,
            flags: RowFlags::empty(),
            nested: None,
            attached_to: None,
        }));
        Ok(row)
    }

    fn create_list(&mut self, owner: RowId) -> Result<ListId, ScreenError> {
        if self.row(owner)?.nested.is_some() {
            return Err(ScreenError::ListExists(owner));
        }
        let list = ListId::for_slot(self.lists.len())?;
        self.lists.push(Some(List {
            rows: Vec::new(),
            hidden: false,
            owner: Some(owner),
        }));
        self.row_mut(owner)?.nested = Some(list);
        Ok(list)
    }

    fn drop_list(&mut self, list: ListId) -> Result<(), ScreenError> {
        let record = self.list(list)?;
        if !record.rows.is_empty() {
            return Err(ScreenError::ListNotEmpty(list));
        }
        if let Some(owner) = record.owner {
            self.row_mut(owner)?.nested = None;
        }
        self.lists[list.index()] = None;
        self.clamp_viewport();
        Ok(())
    }

    fn append_row(&mut self, list: ListId, row: RowId) -> Result<(), ScreenError> {
        self.check_detached(row)?;
        self.list_mut(list)?.rows.push(row);
        self.row_mut(row)?.attached_to = Some(list);
        Ok(())
    }

    fn insert_row(&mut self, list: ListId, index: usize, row: RowId) -> Result<(), ScreenError> {
        self.check_detached(row)?;
        let rows = &mut self.list_mut(list)?.rows;
        rows.insert(index.min(rows.len()), row);
        self.row_mut(row)?.attached_to = Some(list);
        Ok(())
    }

    fn remove_row(&mut self, list: ListId, row: RowId) -> Result<(), ScreenError> {
        let record = self.row(row)?;
        if record.nested.is_some() {
            return Err(ScreenError::RowHasList(row));
        }
        if record.attached_to != Some(list) {
            return Err(ScreenError::RowNotInList { row, list });
        }
        self.list_mut(list)?.rows.retain(|candidate| *candidate != row);
        self.rows[row.index()] = None;
        self.clamp_viewport();
        Ok(())
    }

    fn rows(&self, list: ListId) -> Vec<RowId> {
        self.list(list)
            .map(|record| record.rows.clone())
            .unwrap_or_default()
    }

    fn label(&self, row: RowId) -> Option<&RowLabel> {
        self.row(row).ok().map(|record| &record.label)
    }

    fn set_label(&mut self, row: RowId, label: RowLabel) -> Result<(), ScreenError> {
        self.row_mut(row)?.label = label;
        Ok(())
    }

    fn set_flag(&mut self, row: RowId, flag: RowFlag, on: bool) -> Result<(), ScreenError> {
        self.row_mut(row)?.flags.set(flag, on);
        Ok(())
    }

    fn has_flag(&self, row: RowId, flag: RowFlag) -> bool {
        self.flags(row).contains(flag)
    }

    fn set_list_hidden(&mut self, list: ListId, hidden: bool) -> Result<(), ScreenError> {
        self.list_mut(list)?.hidden = hidden;
        self.clamp_viewport();
        Ok(())
    }

    fn is_list_hidden(&self, list: ListId) -> bool {
        self.list(list).is_ok_and(|record| record.hidden)
    }

    fn is_row_visible(&self, row: RowId) -> bool {
        self.visible_index(row).is_some_and(|index| {
            index >= self.viewport.top && index < self.viewport.top + self.viewport.height
        })
    }

    fn scroll_row_into_view(&mut self, row: RowId) {
        let Some(index) = self.visible_index(row) else {
            return;
        };
        if index < self.viewport.top {
            self.viewport.top = index;
        } else if index >= self.viewport.top + self.viewport.height {
            self.viewport.top = index + 1 - self.viewport.height;
        }
    }
}
