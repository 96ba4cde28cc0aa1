// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! domscope: a DOM inspector that mirrors a live document as an editable,
//! collapsible tree of rows.
//!
//! [`inspector::Inspector`] keeps the live document, the mirror tree and the screen
//! rows in step; [`tui`] is the terminal front end.

pub mod config;
pub mod inspector;
pub mod live;
pub mod model;
pub mod query;
pub mod screen;
pub mod tui;
