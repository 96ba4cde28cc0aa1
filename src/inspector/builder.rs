// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use super::{attach_child, refresh_last_child, RowLabels, SyncError};
use crate::live::LiveTreeAdapter;
use crate::model::{
    ChildPosition, LiveNodeId, LiveNodeKind, LiveRef, MirrorKind, MirrorTree, NodeHandle,
};
use crate::screen::{RowFlag, ScreenAdapter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub labels: RowLabels,
    /// Live subtrees that are never mirrored, matched by identity.
    pub excluded: HashSet<LiveNodeId>,
}

/// Depth-first construction of the mirror forest and its rows.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    options: &'a BuildOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("build root {0} does not exist in the live tree")]
    UnknownRoot(LiveNodeId),
    #[error("build root {root} is a {kind:?} node, expected an element or the document")]
    UnsupportedRoot { root: LiveNodeId, kind: LiveNodeKind },
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl<'a> TreeBuilder<'a> {
    pub fn new(options: &'a BuildOptions) -> Self {
        Self { options }
    }

    /// Mirrors the subtree under `root`, appending the root row to the screen's
    /// top-level list.
    pub fn build<L, S>(
        &self,
        live: &L,
        screen: &mut S,
        root: LiveNodeId,
    ) -> Result<MirrorTree, BuildError>
    where
        L: LiveTreeAdapter + ?Sized,
        S: ScreenAdapter + ?Sized,
    {
        let live_kind = live.node_kind(root).ok_or(BuildError::UnknownRoot(root))?;
        let kind = match MirrorKind::from_structural(live_kind) {
            Some(kind @ (MirrorKind::Element | MirrorKind::Document)) => kind,
            Some(MirrorKind::Text | MirrorKind::Attribute) | None => {
                return Err(BuildError::UnsupportedRoot {
                    root,
                    kind: live_kind,
                })
            }
        };

        let mut tree = MirrorTree::new();
        let target = LiveRef::Node(root);
        let label = self.options.labels.for_live(live, kind, target);
        let row = screen.create_row(label).map_err(SyncError::from)?;
        let top = screen.top_level_list();
        screen.append_row(top, row).map_err(SyncError::from)?;
        screen
            .set_flag(row, RowFlag::LastChild, true)
            .map_err(SyncError::from)?;
        let handle = tree
            .insert_root(kind, target, row)
            .map_err(SyncError::from)?;

        self.build_children(live, screen, &mut tree, handle, root)?;

        tracing::debug!(
            root = %root,
            mirrored = tree.len(),
            "built mirror tree"
        );
        Ok(tree)
    }

    /// Mirrors everything below `parent_live`. Walks with an explicit stack of
    /// open parents so nesting depth is bounded by memory, not the thread stack.
    fn build_children<L, S>(
        &self,
        live: &L,
        screen: &mut S,
        tree: &mut MirrorTree,
        parent: NodeHandle,
        parent_live: LiveNodeId,
    ) -> Result<(), SyncError>
    where
        L: LiveTreeAdapter + ?Sized,
        S: ScreenAdapter + ?Sized,
    {
        self.attach_attributes(live, screen, tree, parent, parent_live)?;
        let mut stack = vec![OpenParent {
            handle: parent,
            children: live.children(parent_live),
            next: 0,
        }];

        while let Some(open) = stack.last_mut() {
            let parent = open.handle;
            let Some(&child) = open.children.get(open.next) else {
                stack.pop();
                refresh_last_child(tree, screen, parent)?;
                continue;
            };
            open.next += 1;

            if self.options.excluded.contains(&child) {
                continue;
            }
            let Some(kind) = live.node_kind(child).and_then(MirrorKind::from_structural) else {
                continue;
            };
            let target = LiveRef::Node(child);
            let label = self.options.labels.for_live(live, kind, target);
            let handle = attach_child(
                tree,
                screen,
                parent,
                ChildPosition::Append,
                kind,
                target,
                label,
            )?;
            if kind.can_have_children() {
                self.attach_attributes(live, screen, tree, handle, child)?;
                stack.push(OpenParent {
                    handle,
                    children: live.children(child),
                    next: 0,
                });
            }
        }
        Ok(())
    }

    fn attach_attributes<L, S>(
        &self,
        live: &L,
        screen: &mut S,
        tree: &mut MirrorTree,
        parent: NodeHandle,
        parent_live: LiveNodeId,
    ) -> Result<(), SyncError>
    where
        L: LiveTreeAdapter + ?Sized,
        S: ScreenAdapter + ?Sized,
    {
        if live.node_kind(parent_live) != Some(LiveNodeKind::Element) {
            return Ok(());
        }
        for attr in live.attributes(parent_live) {
            let target = LiveRef::Attr(attr);
            let label = self
                .options
                .labels
                .for_live(live, MirrorKind::Attribute, target);
            attach_child(
                tree,
                screen,
                parent,
                ChildPosition::Append,
                MirrorKind::Attribute,
                target,
                label,
            )?;
        }
        Ok(())
    }
}

/// A mirrored parent whose live children are still being visited.
struct OpenParent {
    handle: NodeHandle,
    children: Vec<LiveNodeId>,
    next: usize,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{BuildError, BuildOptions, TreeBuilder};
    use crate::live::{parse_document, HtmlOptions, LiveDocument, LiveTreeAdapter};
    use crate::model::{LiveNodeKind, LiveRef, MirrorKind};
    use crate::screen::{RowFlag, ScreenAdapter, ScreenTree};

    fn parse(src: &str) -> LiveDocument {
        parse_document(src, &HtmlOptions::default()).expect("parse")
    }

    fn row_labels(screen: &ScreenTree) -> Vec<String> {
        screen
            .visible_rows()
            .into_iter()
            .map(|entry| {
                format!(
                    "{}{}",
                    "  ".repeat(entry.depth),
                    screen.label(entry.row).expect("label")
                )
            })
            .collect()
    }

    #[test]
    fn attributes_precede_structural_children() {
        let doc = parse(r#"<div id="a" class="box"><p>hi</p><!--skip--><span></span></div>"#);
        let mut screen = ScreenTree::new();
        let options = BuildOptions::default();
        let tree = TreeBuilder::new(&options)
            .build(&doc, &mut screen, doc.root())
            .expect("build");

        assert_eq!(
            row_labels(&screen),
            vec![
                "#document",
                "  div",
                "    id=a",
                "    class=box",
                "    p",
                "      #text",
                "    span",
            ]
        );
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn last_child_and_collapsible_flags() {
        let doc = parse(r#"<div id="a"><p>hi</p></div>"#);
        let mut screen = ScreenTree::new();
        let options = BuildOptions::default();
        let tree = TreeBuilder::new(&options)
            .build(&doc, &mut screen, doc.root())
            .expect("build");

        let div = doc.find_first_element("div").expect("div");
        let div_handle = tree.find_by_live(LiveRef::Node(div)).expect("mirror");
        let div_node = tree.get(div_handle).expect("node");
        assert!(screen.has_flag(div_node.row(), RowFlag::CollapsibleOpen));

        let children = div_node.children();
        let id = tree.get(children[0]).expect("id");
        let p = tree.get(children[1]).expect("p");
        assert_eq!(id.kind(), MirrorKind::Attribute);
        assert!(screen.has_flag(id.row(), RowFlag::Attribute));
        assert!(!screen.has_flag(id.row(), RowFlag::LastChild));
        assert!(screen.has_flag(p.row(), RowFlag::LastChild));
        assert!(!screen.has_flag(p.row(), RowFlag::CollapsibleClosed));
    }

    #[test]
    fn excluded_subtrees_are_skipped() {
        let doc = parse(r#"<main><p>a</p><aside id="panel"><b>x</b></aside></main>"#);
        let panel = doc.find_element_by_id("panel").expect("panel");
        let options = BuildOptions {
            excluded: HashSet::from([panel]),
            ..BuildOptions::default()
        };
        let mut screen = ScreenTree::new();
        let tree = TreeBuilder::new(&options)
            .build(&doc, &mut screen, doc.root())
            .expect("build");
        assert!(tree.find_by_live(LiveRef::Node(panel)).is_none());
        assert_eq!(
            row_labels(&screen),
            vec!["#document", "  main", "    p", "      #text"]
        );
    }

    #[test]
    fn rejects_text_roots() {
        let doc = parse("<p>hi</p>");
        let p = doc.find_first_element("p").expect("p");
        let text = doc.children(p)[0];
        let mut screen = ScreenTree::new();
        let options = BuildOptions::default();
        let err = TreeBuilder::new(&options)
            .build(&doc, &mut screen, text)
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::UnsupportedRoot {
                root: text,
                kind: LiveNodeKind::Text
            }
        );
        assert!(screen.rows(screen.top_level_list()).is_empty());
    }

    #[test]
    fn element_roots_are_supported() {
        let doc = parse("<section><h1>Title</h1></section>");
        let section = doc.find_first_element("section").expect("section");
        let mut screen = ScreenTree::new();
        let options = BuildOptions::default();
        let tree = TreeBuilder::new(&options)
            .build(&doc, &mut screen, section)
            .expect("build");
        let root = tree.root().expect("root");
        assert_eq!(tree.get(root).expect("root").kind(), MirrorKind::Element);
        assert_eq!(row_labels(&screen), vec!["section", "  h1", "    #text"]);
    }
}
