// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection marking and the collapsible Open/Closed state of rows.

use super::session::Inspector;
use crate::live::{LiveTreeAdapter, LiveTreeError};
use crate::model::{LiveNodeId, LiveRef, MirrorKind, NodeHandle};
use crate::screen::{RowFlag, ScreenAdapter, ScreenError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("mirror node {0} does not exist")]
    UnknownNode(NodeHandle),
    #[error("{kind} nodes cannot be selected")]
    NotSelectable { node: NodeHandle, kind: MirrorKind },
    #[error("mirror node {0} has no child list to collapse")]
    NotCollapsible(NodeHandle),
    #[error("{0} nodes carry the selected marking, expected at most one")]
    MultipleSelected(usize),
    #[error("live node {0} has no mirror")]
    NotMirrored(LiveNodeId),
    #[error(transparent)]
    Live(#[from] LiveTreeError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
}

impl<L: LiveTreeAdapter, S: ScreenAdapter> Inspector<L, S> {
    /// Selects `handle`: opens closed ancestors, moves the selected marking from the
    /// previous selection and scrolls both sides so the node is visible.
    pub fn select(&mut self, handle: NodeHandle) -> Result<(), SelectError> {
        let node = self.tree.get(handle).ok_or(SelectError::UnknownNode(handle))?;
        let kind = node.kind();
        let row = node.row();
        let live = match (kind.is_selectable(), node.live()) {
            (true, LiveRef::Node(live)) => live,
            _ => return Err(SelectError::NotSelectable { node: handle, kind }),
        };

        for ancestor in self.tree.ancestors(handle) {
            if self.is_closed(ancestor) {
                self.toggle(ancestor)?;
            }
        }

        let marked = self.live.selected_nodes();
        if marked.len() > 1 {
            tracing::error!(count = marked.len(), "several nodes carry the selected marking");
            return Err(SelectError::MultipleSelected(marked.len()));
        }
        if let Some(previous) = marked.first().copied() {
            self.live.set_selected(previous, false)?;
            if let Some(previous) = self.tree.find_by_live(LiveRef::Node(previous)) {
                if let Some(previous) = self.tree.get(previous) {
                    self.screen.set_flag(previous.row(), RowFlag::Selected, false)?;
                }
            }
        }

        self.live.set_selected(live, true)?;
        self.screen.set_flag(row, RowFlag::Selected, true)?;
        self.session.selected = Some(handle);

        if !self.live.is_in_viewport(live) {
            self.live.scroll_into_view(live);
        }
        if !self.screen.is_row_visible(row) {
            self.screen.scroll_row_into_view(row);
        }
        tracing::debug!(node = %handle, live = %live, "selected");
        Ok(())
    }

    /// Flips a collapsible node between Open and Closed.
    pub fn toggle(&mut self, handle: NodeHandle) -> Result<(), SelectError> {
        let node = self.tree.get(handle).ok_or(SelectError::UnknownNode(handle))?;
        let row = node.row();
        let list = node.list().ok_or(SelectError::NotCollapsible(handle))?;

        let closing = !self.is_closed(handle);
        self.screen.set_list_hidden(list, closing)?;
        self.screen.set_flag(row, RowFlag::CollapsibleOpen, !closing)?;
        self.screen.set_flag(row, RowFlag::CollapsibleClosed, closing)?;
        Ok(())
    }

    /// Whether `handle` is collapsible and currently Closed.
    pub fn is_closed(&self, handle: NodeHandle) -> bool {
        self.tree
            .get(handle)
            .filter(|node| node.list().is_some())
            .is_some_and(|node| self.screen.has_flag(node.row(), RowFlag::CollapsibleClosed))
    }

    /// The node currently carrying the selected marking, if exactly one does.
    pub fn selected_node(&self) -> Option<NodeHandle> {
        match self.live.selected_nodes().as_slice() {
            [only] => self.tree.find_by_live(LiveRef::Node(*only)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::inspector::{BuildOptions, Inspector, SelectError};
    use crate::live::{parse_document, HtmlOptions, LiveDocument, LiveTreeAdapter};
    use crate::model::{LiveRef, MirrorKind, NodeHandle};
    use crate::screen::{RowFlag, ScreenAdapter, ScreenTree};

    fn inspector(src: &str) -> Inspector<LiveDocument, ScreenTree> {
        let doc = parse_document(src, &HtmlOptions::default()).expect("parse");
        Inspector::build_document(doc, ScreenTree::new(), &BuildOptions::default())
            .expect("build")
    }

    fn element(inspector: &Inspector<LiveDocument, ScreenTree>, tag: &str) -> NodeHandle {
        let live = inspector.live().find_first_element(tag).expect("element");
        inspector.node_for_live(live).expect("mirror")
    }

    fn row_selected(inspector: &Inspector<LiveDocument, ScreenTree>, handle: NodeHandle) -> bool {
        let row = inspector.node(handle).expect("node").row();
        inspector.screen().has_flag(row, RowFlag::Selected)
    }

    #[test]
    fn selecting_moves_the_marking() {
        let mut inspector = inspector("<div><p>a</p><span>b</span></div>");
        let p = element(&inspector, "p");
        let span = element(&inspector, "span");

        inspector.select(p).expect("select p");
        inspector.select(span).expect("select span");

        let span_live = inspector.live().find_first_element("span").expect("span");
        assert_eq!(inspector.live().selected_nodes(), vec![span_live]);
        assert!(!row_selected(&inspector, p));
        assert!(row_selected(&inspector, span));
        assert_eq!(inspector.selected_node(), Some(span));
    }

    #[test]
    fn selecting_twice_is_idempotent() {
        let mut inspector = inspector("<div><p>a</p></div>");
        let p = element(&inspector, "p");
        inspector.select(p).expect("first");
        inspector.select(p).expect("second");
        assert_eq!(inspector.live().selected_nodes().len(), 1);
        assert!(row_selected(&inspector, p));
    }

    #[test]
    fn text_and_attribute_nodes_are_not_selectable() {
        let mut inspector = inspector(r#"<p id="x">hi</p>"#);
        let p = element(&inspector, "p");
        let children = inspector.node(p).expect("p").children().to_vec();
        assert_eq!(
            inspector.select(children[0]),
            Err(SelectError::NotSelectable {
                node: children[0],
                kind: MirrorKind::Attribute
            })
        );
        assert_eq!(
            inspector.select(children[1]),
            Err(SelectError::NotSelectable {
                node: children[1],
                kind: MirrorKind::Text
            })
        );
    }

    #[test]
    fn several_marked_nodes_are_reported_without_changes() {
        let mut inspector = inspector("<div><p>a</p><span>b</span><em>c</em></div>");
        let p_live = inspector.live().find_first_element("p").expect("p");
        let span_live = inspector.live().find_first_element("span").expect("span");
        inspector.live_mut().set_selected(p_live, true).expect("mark");
        inspector.live_mut().set_selected(span_live, true).expect("mark");

        let em = element(&inspector, "em");
        assert_eq!(inspector.select(em), Err(SelectError::MultipleSelected(2)));
        assert_eq!(inspector.live().selected_nodes(), vec![p_live, span_live]);
        assert!(!row_selected(&inspector, em));
    }

    #[test]
    fn toggling_twice_restores_state() {
        let mut inspector = inspector("<ul><li>a</li><li>b</li></ul>");
        let ul = element(&inspector, "ul");
        let node = inspector.node(ul).expect("ul");
        let (row, list) = (node.row(), node.list().expect("list"));

        inspector.toggle(ul).expect("close");
        assert!(inspector.is_closed(ul));
        assert!(inspector.screen().is_list_hidden(list));
        assert!(!inspector.screen().has_flag(row, RowFlag::CollapsibleOpen));

        inspector.toggle(ul).expect("open");
        assert!(!inspector.is_closed(ul));
        assert!(!inspector.screen().is_list_hidden(list));
        assert!(inspector.screen().has_flag(row, RowFlag::CollapsibleOpen));
        assert!(!inspector.screen().has_flag(row, RowFlag::CollapsibleClosed));
    }

    #[test]
    fn toggling_a_leaf_is_rejected() {
        let mut inspector = inspector("<div><br></div>");
        let br = element(&inspector, "br");
        assert_eq!(inspector.toggle(br), Err(SelectError::NotCollapsible(br)));
    }

    #[test]
    fn select_opens_closed_ancestors() {
        let mut inspector = inspector("<main><section><p>deep</p></section></main>");
        let main = element(&inspector, "main");
        let section = element(&inspector, "section");
        let p = element(&inspector, "p");
        inspector.toggle(section).expect("close section");
        inspector.toggle(main).expect("close main");

        inspector.select(p).expect("select");
        assert!(!inspector.is_closed(main));
        assert!(!inspector.is_closed(section));
        let row = inspector.node(p).expect("p").row();
        assert!(inspector.screen().is_row_visible(row));
    }

    #[test]
    fn select_scrolls_both_sides_into_view() {
        let items: String = (0..30).map(|index| format!("<li>{index}</li>")).collect();
        let doc = parse_document(&format!("<ul>{items}</ul>"), &HtmlOptions::default())
            .expect("parse");
        let mut doc = doc;
        doc.set_viewport_height(5);
        let mut screen = ScreenTree::new();
        screen.set_viewport_height(5);
        let mut inspector =
            Inspector::build_document(doc, screen, &BuildOptions::default()).expect("build");

        let last_li = *inspector
            .live()
            .children(inspector.live().find_first_element("ul").expect("ul"))
            .last()
            .expect("li");
        let handle = inspector
            .tree()
            .find_by_live(LiveRef::Node(last_li))
            .expect("mirror");
        inspector.select(handle).expect("select");

        assert!(inspector.live().is_in_viewport(last_li));
        let row = inspector.node(handle).expect("node").row();
        assert!(inspector.screen().is_row_visible(row));
    }
}
