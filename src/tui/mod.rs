// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Two panes side by side: the live document (left) and the inspector panel
//! rendering the screen rows (right). Context-menu prompts run as modal overlays
//! driven by [`Inspector::interaction_plan`] and [`Inspector::apply_action`].

use std::{
    collections::VecDeque,
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::inspector::{
    Answer, ContextMenu, EditError, EditOutcome, Inspector, Interaction, MenuAction, MenuError,
    MenuSlot, Point, RowHit,
};
use crate::live::{outline, LiveDocument, LiveTreeAdapter};
use crate::model::{LiveNodeId, LiveNodeKind, MirrorKind, NodeHandle, RowId};
use crate::query::{search_nodes, SearchKind};
use crate::screen::{RowFlag, ScreenAdapter, ScreenTree, VisibleRow};

mod theme;

pub use theme::{ThemeError, TuiTheme, PALETTE_ENV_VAR};

/// The inspector as driven by the terminal front end.
pub type TuiInspector = Inspector<LiveDocument, ScreenTree>;

const TOAST_TTL: Duration = Duration::from_millis(2500);
const ALERT_TTL: Duration = Duration::from_secs(6);
const WHEEL_STEP: usize = 3;
const HELP_LINE: &str =
    "q quit  ↑↓ move  ⏎ select  ␣ toggle  m menu  / search  ? fuzzy  n/N next  tab pane";

/// Markup loaded by `--demo`.
pub const DEMO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <title>domscope demo</title>
    <style>.card { padding: 1em; }</style>
  </head>
  <body class="demo">
    <header id="top">
      <h1>Hello, inspector</h1>
      <nav><a href="/docs" class="nav-link">Docs</a><a href="/about">About</a></nav>
    </header>
    <main>
      <section class="card" data-kind="intro">
        <p>Right click a row to edit its attributes.</p>
        <!-- comments are not mirrored -->
        <input type="checkbox" checked>
      </section>
      <ul id="list"><li>one</li><li>two</li><li>three</li></ul>
    </main>
    <div id="domscope-panel">excluded from the mirror</div>
  </body>
</html>
"#;

/// Runs the interactive terminal UI until the user quits.
pub fn run(inspector: TuiInspector, theme: TuiTheme) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(inspector, theme);

    while !app.should_quit {
        app.expire_toast(Instant::now());
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    tracing::debug!(mirrored = app.inspector.tree().len(), "inspector closed");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Document,
    Mirror,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
    is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    Inactive,
    Editing,
    Results,
}

#[derive(Debug, Clone)]
struct Search {
    mode: SearchMode,
    kind: SearchKind,
    query: String,
    results: Vec<NodeHandle>,
    index: usize,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            mode: SearchMode::Inactive,
            kind: SearchKind::Regular,
            query: String::new(),
            results: Vec::new(),
            index: 0,
        }
    }
}

/// A context-menu action waiting on the user's answers.
#[derive(Debug, Clone)]
struct Dialog {
    target: NodeHandle,
    action: MenuAction,
    title: &'static str,
    steps: VecDeque<Interaction>,
    answers: Vec<Answer>,
    input: String,
}

impl Dialog {
    fn new(
        target: NodeHandle,
        action: MenuAction,
        title: &'static str,
        plan: Vec<Interaction>,
    ) -> Self {
        let mut dialog = Self {
            target,
            action,
            title,
            steps: plan.into(),
            answers: Vec::new(),
            input: String::new(),
        };
        dialog.reset_input();
        dialog
    }

    fn current(&self) -> Option<&Interaction> {
        self.steps.front()
    }

    fn reset_input(&mut self) {
        self.input = match self.steps.front() {
            Some(Interaction::Prompt { default, .. }) => default.clone(),
            _ => String::new(),
        };
    }

    /// Records `answer` for the current step; `true` once every step is answered.
    fn answer(&mut self, answer: Answer) -> bool {
        self.answers.push(answer);
        self.steps.pop_front();
        self.reset_input();
        self.steps.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Overlay {
    None,
    Menu { menu: ContextMenu, cursor: usize },
    Dialog(Dialog),
}

/// Inner areas of the last drawn frame, used for mouse hit testing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    document: Rect,
    mirror: Rect,
    menu: Option<Rect>,
}

struct App {
    inspector: TuiInspector,
    theme: TuiTheme,
    focus: Focus,
    /// Keyboard cursor in the inspector pane.
    cursor: Option<RowId>,
    /// Last known index of the cursor among the visible rows.
    cursor_index: usize,
    /// Keyboard cursor over the document outline.
    doc_cursor: usize,
    overlay: Overlay,
    search: Search,
    toast: Option<Toast>,
    areas: PaneAreas,
    should_quit: bool,
}

impl App {
    fn new(inspector: TuiInspector, theme: TuiTheme) -> Self {
        let mut app = Self {
            inspector,
            theme,
            focus: Focus::Mirror,
            cursor: None,
            cursor_index: 0,
            doc_cursor: 0,
            overlay: Overlay::None,
            search: Search::default(),
            toast: None,
            areas: PaneAreas::default(),
            should_quit: false,
        };
        app.sync_cursor();
        app
    }

    /// Records the pane areas and sizes both viewports to them.
    fn resize(&mut self, document: Rect, mirror: Rect) {
        self.areas.document = document;
        self.areas.mirror = mirror;
        self.inspector
            .live_mut()
            .set_viewport_height(usize::from(document.height).max(1));
        self.inspector
            .screen_mut()
            .set_viewport_height(usize::from(mirror.height).max(1));
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + TOAST_TTL,
            is_error: false,
        });
    }

    fn set_error(&mut self, message: impl Into<String>, ttl: Duration) {
        self.toast = Some(Toast {
            message: message.into(),
            expires_at: Instant::now() + ttl,
            is_error: true,
        });
    }

    fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|toast| toast.expires_at <= now) {
            self.toast = None;
        }
    }

    fn visible_rows(&self) -> Vec<VisibleRow> {
        self.inspector.screen().visible_rows()
    }

    /// Keeps the cursor on a visible row, falling back to the nearest index.
    fn sync_cursor(&mut self) {
        let rows = self.visible_rows();
        if rows.is_empty() {
            self.cursor = None;
            self.cursor_index = 0;
            return;
        }
        if let Some(index) = self
            .cursor
            .and_then(|cursor| rows.iter().position(|entry| entry.row == cursor))
        {
            self.cursor_index = index;
            return;
        }
        let index = self.cursor_index.min(rows.len() - 1);
        self.cursor = Some(rows[index].row);
        self.cursor_index = index;
    }

    fn move_cursor_to(&mut self, row: RowId) {
        self.cursor = Some(row);
        self.sync_cursor();
        self.inspector.screen_mut().scroll_row_into_view(row);
    }

    fn follow_selection(&mut self) {
        let row = self
            .inspector
            .selected_node()
            .and_then(|handle| self.inspector.node(handle))
            .map(|node| node.row());
        if let Some(row) = row {
            self.move_cursor_to(row);
        }
    }

    fn cursor_node(&self) -> Option<NodeHandle> {
        self.cursor
            .and_then(|row| self.inspector.node_for_row(row))
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        self.handle_key_code(key.code);
    }

    fn handle_key_code(&mut self, code: KeyCode) {
        match self.overlay {
            Overlay::Dialog(_) => return self.handle_dialog_key(code),
            Overlay::Menu { .. } => return self.handle_menu_key(code),
            Overlay::None => {}
        }
        if self.search.mode == SearchMode::Editing {
            return self.handle_search_key(code);
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Document => Focus::Mirror,
                    Focus::Mirror => Focus::Document,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp => self.move_by(-self.page()),
            KeyCode::PageDown => self.move_by(self.page()),
            KeyCode::Home | KeyCode::Char('g') => self.move_by(isize::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => self.move_by(isize::MAX / 2),
            KeyCode::Enter => self.activate(),
            KeyCode::Char(' ') => self.click_cursor(RowHit::Marker),
            KeyCode::Left | KeyCode::Char('h') => self.collapse_or_parent(),
            KeyCode::Right | KeyCode::Char('l') => self.expand(),
            KeyCode::Char('m') => self.open_menu_at_cursor(),
            KeyCode::Char('/') => self.start_search(SearchKind::Regular),
            KeyCode::Char('?') => self.start_search(SearchKind::Fuzzy),
            KeyCode::Char('n') => self.step_result(1),
            KeyCode::Char('N') => self.step_result(-1),
            KeyCode::Esc => {
                self.search = Search::default();
                self.toast = None;
            }
            _ => {}
        }
    }

    fn page(&self) -> isize {
        let height = match self.focus {
            Focus::Document => self.areas.document.height,
            Focus::Mirror => self.areas.mirror.height,
        };
        isize::try_from(height).unwrap_or(1).max(1)
    }

    fn move_by(&mut self, delta: isize) {
        match self.focus {
            Focus::Mirror => {
                let rows = self.visible_rows();
                if rows.is_empty() {
                    return;
                }
                let index = self.cursor_index.saturating_add_signed(delta).min(rows.len() - 1);
                self.move_cursor_to(rows[index].row);
            }
            Focus::Document => {
                let lines = outline(self.inspector.live()).len();
                if lines == 0 {
                    return;
                }
                self.doc_cursor = self.doc_cursor.saturating_add_signed(delta).min(lines - 1);
                let viewport = self.inspector.live().viewport();
                if self.doc_cursor < viewport.top {
                    self.inspector.live_mut().scroll_to_line(self.doc_cursor);
                } else if self.doc_cursor >= viewport.top + viewport.height {
                    self.inspector
                        .live_mut()
                        .scroll_to_line(self.doc_cursor + 1 - viewport.height);
                }
            }
        }
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Mirror => self.click_cursor(RowHit::Label),
            Focus::Document => self.select_document_line(self.doc_cursor),
        }
    }

    fn click_cursor(&mut self, hit: RowHit) {
        if let Some(row) = self.cursor {
            self.click_row(row, hit);
        }
    }

    fn click_row(&mut self, row: RowId, hit: RowHit) {
        let result = self.inspector.click_row(row, hit);
        self.cursor = Some(row);
        self.sync_cursor();
        if let Err(err) = result {
            self.set_error(err.to_string(), TOAST_TTL);
        }
    }

    fn collapse_or_parent(&mut self) {
        let Some(handle) = self.cursor_node() else {
            return;
        };
        let open = self
            .inspector
            .node(handle)
            .is_some_and(|node| node.list().is_some())
            && !self.inspector.is_closed(handle);
        if open {
            if let Err(err) = self.inspector.toggle(handle) {
                self.set_error(err.to_string(), TOAST_TTL);
            }
            self.sync_cursor();
            return;
        }
        let parent_row = self
            .inspector
            .node(handle)
            .and_then(|node| node.parent())
            .and_then(|parent| self.inspector.node(parent))
            .map(|parent| parent.row());
        if let Some(row) = parent_row {
            self.move_cursor_to(row);
        }
    }

    fn expand(&mut self) {
        let Some(handle) = self.cursor_node() else {
            return;
        };
        if self.inspector.is_closed(handle) {
            if let Err(err) = self.inspector.toggle(handle) {
                self.set_error(err.to_string(), TOAST_TTL);
            }
            self.sync_cursor();
        }
    }

    /// Selects the element owning the outline line at `line`.
    fn select_document_line(&mut self, line: usize) {
        let node = outline(self.inspector.live())
            .get(line)
            .map(|line| line.node)
            .and_then(|node| nearest_element(self.inspector.live(), node));
        let Some(node) = node else {
            return;
        };
        self.doc_cursor = line;
        match self.inspector.select_live(node) {
            Ok(()) => self.follow_selection(),
            Err(err) => self.set_error(err.to_string(), TOAST_TTL),
        }
    }

    fn open_menu_at_cursor(&mut self) {
        let Some(row) = self.cursor else {
            return;
        };
        let Some(handle) = self.inspector.node_for_row(row) else {
            return;
        };
        let rows = self.visible_rows();
        let top = self.inspector.screen().viewport().top;
        let Some((index, entry)) = rows
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.row == row)
        else {
            return;
        };
        let label_width = self
            .inspector
            .row_label(handle)
            .map_or(0, |label| label.chars().count());
        let area = self.areas.mirror;
        let pointer = Point {
            x: i32::from(area.x) + to_i32(entry.depth * 2 + 2 + label_width),
            y: i32::from(area.y) + to_i32(index) - to_i32(top),
        };
        self.open_menu(handle, pointer);
    }

    fn open_menu(&mut self, handle: NodeHandle, pointer: Point) {
        let scroll = Point {
            x: 0,
            y: to_i32(self.inspector.screen().viewport().top),
        };
        let panel_left = i32::from(self.areas.mirror.x);
        match self
            .inspector
            .open_context_menu(handle, pointer, scroll, panel_left)
        {
            Ok(menu) if menu.slots.is_empty() => {
                self.inspector.close_context_menu();
                self.set_toast("No actions for this node");
            }
            Ok(menu) => self.overlay = Overlay::Menu { menu, cursor: 0 },
            Err(err) => self.set_error(err.to_string(), TOAST_TTL),
        }
    }

    fn close_menu(&mut self) {
        if matches!(self.overlay, Overlay::Menu { .. }) {
            self.overlay = Overlay::None;
            self.areas.menu = None;
            self.inspector.close_context_menu();
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let Overlay::Menu { menu, cursor } = &mut self.overlay else {
            return;
        };
        let count = menu.slots.len();
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_menu(),
            KeyCode::Up | KeyCode::Char('k') => *cursor = cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *cursor = (*cursor + 1).min(count.saturating_sub(1)),
            KeyCode::Enter => {
                let index = *cursor;
                self.pick_slot(index);
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = usize::from(digit as u8 - b'1');
                self.pick_slot(index);
            }
            _ => {}
        }
    }

    fn pick_slot(&mut self, index: usize) {
        let slot = match &self.overlay {
            Overlay::Menu { menu, .. } => menu.slots.get(index).cloned(),
            _ => None,
        };
        let Some(MenuSlot { action, label }) = slot else {
            return;
        };
        self.overlay = Overlay::None;
        self.areas.menu = None;

        let target = match self.inspector.take_menu_target() {
            Ok(target) => target,
            Err(err) => return self.set_error(err.to_string(), TOAST_TTL),
        };
        match self.inspector.interaction_plan(target, action) {
            Ok(plan) if plan.is_empty() => self.finish_action(target, action, &[]),
            Ok(plan) => self.overlay = Overlay::Dialog(Dialog::new(target, action, label, plan)),
            Err(err) => self.set_error(err.to_string(), TOAST_TTL),
        }
    }

    fn handle_dialog_key(&mut self, code: KeyCode) {
        let Overlay::Dialog(dialog) = &mut self.overlay else {
            return;
        };
        let done = match (dialog.current(), code) {
            (Some(Interaction::Prompt { .. }), KeyCode::Char(ch)) => {
                dialog.input.push(ch);
                false
            }
            (Some(Interaction::Prompt { .. }), KeyCode::Backspace) => {
                dialog.input.pop();
                false
            }
            (Some(Interaction::Prompt { .. }), KeyCode::Enter) => {
                let text = std::mem::take(&mut dialog.input);
                dialog.answer(Answer::Text(Some(text)))
            }
            // A dismissed prompt ends the dialogue; later prompts count as dismissed.
            (Some(Interaction::Prompt { .. }), KeyCode::Esc) => {
                dialog.answer(Answer::Text(None));
                true
            }
            (Some(Interaction::Confirm { .. }), KeyCode::Char('y' | 'Y') | KeyCode::Enter) => {
                dialog.answer(Answer::Confirmed(true))
            }
            (Some(Interaction::Confirm { .. }), KeyCode::Char('n' | 'N') | KeyCode::Esc) => {
                dialog.answer(Answer::Confirmed(false))
            }
            (None, _) => true,
            _ => false,
        };
        if !done {
            return;
        }
        if let Overlay::Dialog(dialog) = std::mem::replace(&mut self.overlay, Overlay::None) {
            self.finish_action(dialog.target, dialog.action, &dialog.answers);
        }
    }

    fn finish_action(&mut self, target: NodeHandle, action: MenuAction, answers: &[Answer]) {
        match self.inspector.apply_action(target, action, answers) {
            Ok(outcome) => self.set_toast(outcome_message(outcome)),
            Err(MenuError::Edit(err @ EditError::DuplicateAttribute { .. })) => {
                self.set_error(err.to_string(), ALERT_TTL);
            }
            Err(err) => self.set_error(err.to_string(), TOAST_TTL),
        }
        self.sync_cursor();
    }

    fn start_search(&mut self, kind: SearchKind) {
        self.search = Search {
            mode: SearchMode::Editing,
            kind,
            ..Search::default()
        };
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.search = Search::default(),
            KeyCode::Backspace => {
                self.search.query.pop();
            }
            KeyCode::Tab => {
                self.search.kind = match self.search.kind {
                    SearchKind::Regular => SearchKind::Fuzzy,
                    SearchKind::Fuzzy => SearchKind::Regex,
                    SearchKind::Regex => SearchKind::Regular,
                };
            }
            KeyCode::Enter => self.run_search(),
            KeyCode::Char(ch) => self.search.query.push(ch),
            _ => {}
        }
    }

    fn run_search(&mut self) {
        match search_nodes(&self.inspector, &self.search.query, self.search.kind) {
            Ok(results) if results.is_empty() => {
                self.search.mode = SearchMode::Inactive;
                self.set_toast(format!("No matches for '{}'", self.search.query));
            }
            Ok(results) => {
                self.search.results = results;
                self.search.index = 0;
                self.search.mode = SearchMode::Results;
                self.reveal(self.search.results[0]);
            }
            Err(err) => {
                self.search.mode = SearchMode::Inactive;
                self.set_error(err.to_string(), TOAST_TTL);
            }
        }
    }

    fn step_result(&mut self, delta: isize) {
        if self.search.mode != SearchMode::Results || self.search.results.is_empty() {
            return;
        }
        let count = self.search.results.len() as isize;
        let next = (self.search.index as isize + delta).rem_euclid(count);
        self.search.index = next as usize;
        self.reveal(self.search.results[self.search.index]);
    }

    /// Selects `handle`, or its owner when it is not selectable, and puts the
    /// cursor on its row.
    fn reveal(&mut self, handle: NodeHandle) {
        let Some(node) = self.inspector.node(handle) else {
            return;
        };
        let (row, selectable, parent) = (node.row(), node.kind().is_selectable(), node.parent());
        let owner = if selectable { Some(handle) } else { parent };
        if let Some(owner) = owner {
            if let Err(err) = self.inspector.select(owner) {
                self.set_error(err.to_string(), TOAST_TTL);
            }
            if owner != handle && self.inspector.is_closed(owner) {
                if let Err(err) = self.inspector.toggle(owner) {
                    self.set_error(err.to_string(), TOAST_TTL);
                }
            }
        }
        self.move_cursor_to(row);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if matches!(self.overlay, Overlay::Dialog(_)) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.left_click(x, y),
            MouseEventKind::Down(MouseButton::Right) => self.right_click(x, y),
            MouseEventKind::ScrollDown => self.scroll_at(x, y, WHEEL_STEP as isize),
            MouseEventKind::ScrollUp => self.scroll_at(x, y, -(WHEEL_STEP as isize)),
            _ => {}
        }
    }

    fn left_click(&mut self, x: u16, y: u16) {
        if let Some(menu) = self.areas.menu {
            if contains(menu, x, y) {
                if y > menu.y && y < menu.y + menu.height - 1 {
                    self.pick_slot(usize::from(y - menu.y - 1));
                }
                return;
            }
        }
        self.close_menu();

        if let Some((row, hit)) = self.row_at(x, y) {
            self.focus = Focus::Mirror;
            self.click_row(row, hit);
        } else if contains(self.areas.document, x, y) {
            self.focus = Focus::Document;
            let top = self.inspector.live().viewport().top;
            self.select_document_line(top + usize::from(y - self.areas.document.y));
        }
    }

    fn right_click(&mut self, x: u16, y: u16) {
        self.close_menu();
        let Some((row, _)) = self.row_at(x, y) else {
            return;
        };
        let Some(handle) = self.inspector.node_for_row(row) else {
            return;
        };
        self.focus = Focus::Mirror;
        self.cursor = Some(row);
        self.sync_cursor();
        self.open_menu(
            handle,
            Point {
                x: i32::from(x),
                y: i32::from(y),
            },
        );
    }

    fn scroll_at(&mut self, x: u16, y: u16, delta: isize) {
        if contains(self.areas.mirror, x, y) {
            let top = self.inspector.screen().viewport().top;
            self.inspector
                .screen_mut()
                .scroll_to(top.saturating_add_signed(delta));
        } else if contains(self.areas.document, x, y) {
            let top = self.inspector.live().viewport().top;
            self.inspector
                .live_mut()
                .scroll_to_line(top.saturating_add_signed(delta));
        }
    }

    /// The row under the pointer, and whether the pointer is on its marker.
    fn row_at(&self, x: u16, y: u16) -> Option<(RowId, RowHit)> {
        let area = self.areas.mirror;
        if !contains(area, x, y) {
            return None;
        }
        let index = self.inspector.screen().viewport().top + usize::from(y - area.y);
        let entry = *self.visible_rows().get(index)?;
        let marker_start = usize::from(area.x) + entry.depth * 2;
        let column = usize::from(x);
        let hit = if (marker_start..marker_start + 2).contains(&column) {
            RowHit::Marker
        } else {
            RowHit::Label
        };
        Some((entry.row, hit))
    }
}

fn outcome_message(outcome: EditOutcome) -> &'static str {
    match outcome {
        EditOutcome::Cancelled => "Cancelled",
        EditOutcome::Updated => "Updated",
        EditOutcome::Created(_) => "Attribute added",
        EditOutcome::Deleted => "Attribute deleted",
    }
}

fn nearest_element(live: &LiveDocument, node: LiveNodeId) -> Option<LiveNodeId> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if live.node_kind(candidate) == Some(LiveNodeKind::Element) {
            return Some(candidate);
        }
        current = live.parent(candidate);
    }
    None
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Tree guides for each visible row: `├ `/`└ ` at the row's own depth and `│ `
/// for every open ancestor level below the root.
fn row_guides(screen: &ScreenTree, rows: &[VisibleRow]) -> Vec<String> {
    let mut last_at_depth: Vec<bool> = Vec::new();
    rows.iter()
        .map(|entry| {
            let is_last = screen.flags(entry.row).contains(RowFlag::LastChild);
            last_at_depth.truncate(entry.depth);
            let mut guide = String::new();
            for last in last_at_depth.iter().skip(1) {
                guide.push_str(if *last { "  " } else { "│ " });
            }
            if entry.depth > 0 {
                guide.push_str(if is_last { "└ " } else { "├ " });
            }
            last_at_depth.push(is_last);
            guide
        })
        .collect()
}

fn mirror_lines(app: &App) -> Vec<Line<'static>> {
    let screen = app.inspector.screen();
    let rows = screen.visible_rows();
    let guides = row_guides(screen, &rows);
    let viewport = screen.viewport();
    let theme = &app.theme;

    rows.iter()
        .zip(guides)
        .enumerate()
        .skip(viewport.top)
        .take(viewport.height)
        .map(|(index, (entry, guide))| {
            let flags = screen.flags(entry.row);
            let handle = app.inspector.node_for_row(entry.row);
            let kind = handle
                .and_then(|handle| app.inspector.node(handle))
                .map(|node| node.kind());
            let marker = if flags.contains(RowFlag::CollapsibleOpen) {
                "▾ "
            } else if flags.contains(RowFlag::CollapsibleClosed) {
                "▸ "
            } else {
                "  "
            };
            let label = screen
                .label(entry.row)
                .map(ToString::to_string)
                .unwrap_or_default();
            let is_hit = app.search.mode == SearchMode::Results
                && handle.is_some_and(|handle| app.search.results.contains(&handle));
            let label_style = if flags.contains(RowFlag::Selected) {
                theme.selected_style()
            } else if is_hit {
                theme.search_hit_style()
            } else {
                match kind {
                    Some(MirrorKind::Element) => theme.tag_style(),
                    Some(MirrorKind::Attribute) => theme.attribute_style(),
                    _ => theme.base_style(),
                }
            };

            let line = Line::from(vec![
                Span::styled(guide, theme.guide_style()),
                Span::styled(marker, theme.marker_style()),
                Span::styled(label, label_style),
            ]);
            if app.focus == Focus::Mirror && index == app.cursor_index {
                line.style(theme.cursor_style())
            } else {
                line
            }
        })
        .collect()
}

fn document_lines(app: &App) -> Vec<Line<'static>> {
    let live = app.inspector.live();
    let viewport = live.viewport();
    let theme = &app.theme;

    outline(live)
        .into_iter()
        .enumerate()
        .skip(viewport.top)
        .take(viewport.height)
        .map(|(index, line)| {
            let style = if live.is_selected(line.node) {
                theme.selected_style()
            } else if live.node_kind(line.node) == Some(LiveNodeKind::Element) {
                theme.tag_style()
            } else {
                theme.base_style()
            };
            let text = format!("{}{}", "  ".repeat(line.depth), line.text);
            let line = Line::from(Span::styled(text, style));
            if app.focus == Focus::Document && index == app.doc_cursor {
                line.style(theme.cursor_style())
            } else {
                line
            }
        })
        .collect()
}

fn status_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    if let Some(toast) = &app.toast {
        let style = if toast.is_error {
            theme.error_style()
        } else {
            theme.base_style()
        };
        return Line::from(Span::styled(toast.message.clone(), style));
    }
    match app.search.mode {
        SearchMode::Editing => {
            let prefix = match app.search.kind {
                SearchKind::Regular => "/",
                SearchKind::Fuzzy => "?",
                SearchKind::Regex => "regex/",
            };
            Line::from(vec![
                Span::styled(prefix, theme.marker_style()),
                Span::styled(app.search.query.clone(), theme.base_style()),
                Span::styled("  (tab: mode, esc: cancel)", theme.hint_style()),
            ])
        }
        SearchMode::Results => Line::from(Span::styled(
            format!(
                "match {}/{} for '{}'  (n/N)",
                app.search.index + 1,
                app.search.results.len(),
                app.search.query
            ),
            theme.hint_style(),
        )),
        SearchMode::Inactive => Line::from(Span::styled(HELP_LINE, theme.hint_style())),
    }
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = layout[0];
    let status_area = layout[1];

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_area);

    let document_block = Block::default()
        .borders(Borders::ALL)
        .title(" document ")
        .border_style(app.theme.border_style(app.focus == Focus::Document));
    let mirror_block = Block::default()
        .borders(Borders::ALL)
        .title(" inspector ")
        .border_style(app.theme.border_style(app.focus == Focus::Mirror));
    app.resize(document_block.inner(panes[0]), mirror_block.inner(panes[1]));
    app.sync_cursor();

    frame.render_widget(
        Paragraph::new(document_lines(app))
            .style(app.theme.base_style())
            .block(document_block),
        panes[0],
    );
    frame.render_widget(
        Paragraph::new(mirror_lines(app))
            .style(app.theme.base_style())
            .block(mirror_block),
        panes[1],
    );
    frame.render_widget(Paragraph::new(status_line(app)), status_area);
    if app.search.mode == SearchMode::Editing && app.toast.is_none() {
        let prefix = match app.search.kind {
            SearchKind::Regex => 6,
            SearchKind::Regular | SearchKind::Fuzzy => 1,
        };
        let width = prefix + app.search.query.chars().count();
        let x = status_area.x + u16::try_from(width).unwrap_or(u16::MAX).min(status_area.width);
        frame.set_cursor_position((x, status_area.y));
    }

    match &app.overlay {
        Overlay::None => app.areas.menu = None,
        Overlay::Menu { menu, cursor } => {
            let rect = menu_rect(menu, app.areas.mirror, app.inspector.screen().viewport().top, area);
            draw_menu(frame, &app.theme, menu, *cursor, rect);
            app.areas.menu = Some(rect);
        }
        Overlay::Dialog(dialog) => draw_dialog(frame, &app.theme, dialog, area),
    }
}

/// Places the menu just below and right of its recorded origin, kept on screen.
fn menu_rect(menu: &ContextMenu, mirror: Rect, scroll_top: usize, screen: Rect) -> Rect {
    let width = menu
        .slots
        .iter()
        .map(|slot| slot.label.chars().count() + 4)
        .max()
        .unwrap_or(0)
        + 2;
    let width = u16::try_from(width).unwrap_or(u16::MAX).min(screen.width);
    let height = u16::try_from(menu.slots.len() + 2)
        .unwrap_or(u16::MAX)
        .min(screen.height);

    let x = i32::from(mirror.x) + menu.position.x + 1;
    let y = menu.position.y - to_i32(scroll_top) + 1;
    let max_x = i32::from(screen.x + screen.width - width);
    let max_y = i32::from(screen.y + screen.height - height);
    let clamp = |value: i32, low: i32, high: i32| u16::try_from(value.clamp(low, high.max(low))).unwrap_or(0);
    Rect::new(
        clamp(x, i32::from(screen.x), max_x),
        clamp(y, i32::from(screen.y), max_y),
        width,
        height,
    )
}

fn draw_menu(frame: &mut Frame<'_>, theme: &TuiTheme, menu: &ContextMenu, cursor: usize, rect: Rect) {
    let items: Vec<ListItem> = menu
        .slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let style = if index == cursor {
                theme.cursor_style()
            } else {
                theme.base_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", index + 1), theme.marker_style()),
                Span::styled(slot.label, style),
            ]))
        })
        .collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(true)),
        ),
        rect,
    );
}

fn draw_dialog(frame: &mut Frame<'_>, theme: &TuiTheme, dialog: &Dialog, screen: Rect) {
    let Some(step) = dialog.current() else {
        return;
    };
    let width = screen.width.saturating_sub(4).min(64);
    let rect = Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + screen.height.saturating_sub(5) / 2,
        width,
        5.min(screen.height),
    );
    let (message, reply) = match step {
        Interaction::Prompt { message, .. } => (*message, format!("> {}", dialog.input)),
        Interaction::Confirm { message } => (*message, "[y]es / [n]o".to_owned()),
    };
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(message, theme.base_style())),
            Line::from(Span::styled(reply, theme.marker_style())),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", dialog.title))
                .border_style(theme.border_style(true)),
        ),
        rect,
    );
    if matches!(step, Interaction::Prompt { .. }) {
        let typed = u16::try_from(dialog.input.chars().count() + 2).unwrap_or(u16::MAX);
        let x = (rect.x + 1).saturating_add(typed).min(rect.x + rect.width.saturating_sub(2));
        frame.set_cursor_position((x, rect.y + 2));
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}
