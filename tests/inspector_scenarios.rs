// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end scenarios over the public API: HTML in, mirror tree and rows out.

use domscope::inspector::{BuildOptions, EditOutcome, Inspector, MenuAction, Point, Prompter};
use domscope::live::{
    outline, parse_document, to_html, HtmlOptions, LiveDocument, LiveTreeAdapter,
};
use domscope::model::{LiveNodeId, LiveNodeKind, MirrorKind, NodeHandle};
use domscope::screen::{RowLabel, ScreenAdapter, ScreenTree};
use rstest::rstest;

type TestInspector = Inspector<LiveDocument, ScreenTree>;

fn parse(html: &str) -> LiveDocument {
    parse_document(html, &HtmlOptions::default()).expect("parse")
}

fn inspect(html: &str) -> TestInspector {
    Inspector::build_document(parse(html), ScreenTree::new(), &BuildOptions::default())
        .expect("build")
}

fn element(inspector: &TestInspector, tag: &str) -> LiveNodeId {
    inspector
        .live()
        .find_first_element(tag)
        .expect("element")
}

fn mirror_of(inspector: &TestInspector, tag: &str) -> NodeHandle {
    inspector
        .node_for_live(element(inspector, tag))
        .expect("mirrored")
}

fn child_labels(inspector: &TestInspector, handle: NodeHandle) -> Vec<String> {
    inspector
        .node(handle)
        .expect("node")
        .children()
        .iter()
        .map(|child| inspector.row_label(*child).expect("label"))
        .collect()
}

fn visible_labels(inspector: &TestInspector) -> Vec<String> {
    let screen = inspector.screen();
    screen
        .visible_rows()
        .into_iter()
        .map(|entry| screen.label(entry.row).expect("label").to_string())
        .collect()
}

/// Labels in the order the builder must produce them: attributes in native order
/// before structural children, skipping kinds that are never mirrored.
fn expected_labels(live: &LiveDocument, node: LiveNodeId, out: &mut Vec<String>) {
    match live.node_kind(node) {
        Some(LiveNodeKind::Document) => out.push("#document".to_owned()),
        Some(LiveNodeKind::Text) => {
            out.push("#text".to_owned());
            return;
        }
        Some(LiveNodeKind::Element) => {
            out.push(live.tag_name(node).expect("tag").to_ascii_lowercase());
            for attr in live.attributes(node) {
                let name = live.attribute_name(attr).expect("name");
                let value = live.attribute_value(attr).expect("value");
                out.push(RowLabel::attribute(name, value).to_string());
            }
        }
        _ => return,
    }
    for child in live.children(node) {
        expected_labels(live, child, out);
    }
}

#[test]
fn div_with_id_and_paragraph() {
    let doc = parse(r#"<div id="a"><p>hi</p></div>"#);
    let div = doc.find_first_element("div").expect("div");
    let inspector =
        Inspector::build(doc, ScreenTree::new(), div, &BuildOptions::default()).expect("build");

    let root = inspector.tree().root().expect("root");
    let root_node = inspector.node(root).expect("root node");
    assert_eq!(root_node.kind(), MirrorKind::Element);
    assert_eq!(child_labels(&inspector, root), vec!["id=a", "p"]);

    let kinds: Vec<_> = root_node
        .children()
        .iter()
        .map(|child| inspector.node(*child).expect("child").kind())
        .collect();
    assert_eq!(kinds, vec![MirrorKind::Attribute, MirrorKind::Element]);

    let p = mirror_of(&inspector, "p");
    let p_children = inspector.node(p).expect("p").children().to_vec();
    assert_eq!(p_children.len(), 1);
    assert_eq!(
        inspector.node(p_children[0]).expect("text").kind(),
        MirrorKind::Text
    );
}

#[rstest]
#[case::flat(r#"<ul class="x"><li>a</li><li data-n="2">b</li></ul>"#)]
#[case::mixed(r#"<div><!-- skip --><p id="p" hidden>t<b>u</b></p>tail<?pi x?></div>"#)]
#[case::deep("<a><b><c><d><e title=deep>x</e></d></c></b></a>")]
#[case::document(r#"<!DOCTYPE html><html lang="en"><head><title>t</title></head><body><main id="m"></main></body></html>"#)]
fn build_order_puts_attributes_before_children(#[case] html: &str) {
    let inspector = inspect(html);
    let mut expected = Vec::new();
    expected_labels(inspector.live(), inspector.live().document_root(), &mut expected);

    assert_eq!(visible_labels(&inspector), expected);
    inspector.tree().check_invariants().expect("invariants");
    assert_eq!(inspector.tree().len(), expected.len());
}

#[test]
fn selecting_twice_leaves_one_selection() {
    let mut inspector = inspect("<div><p>one</p><p>two</p></div>");
    let div = mirror_of(&inspector, "div");
    let p = mirror_of(&inspector, "p");

    inspector.select(div).expect("select div");
    inspector.select(p).expect("select p");
    inspector.select(p).expect("select p again");

    assert_eq!(inspector.live().selected_nodes(), vec![element(&inspector, "p")]);
    assert_eq!(inspector.selected_node(), Some(p));
}

#[test]
fn toggling_twice_restores_visibility() {
    let mut inspector = inspect(r#"<nav id="n"><a>x</a></nav>"#);
    let before = visible_labels(&inspector);
    let nav = mirror_of(&inspector, "nav");

    inspector.toggle(nav).expect("close");
    assert_eq!(visible_labels(&inspector), vec!["#document", "nav"]);
    inspector.toggle(nav).expect("open");
    assert_eq!(visible_labels(&inspector), before);
}

#[test]
fn add_then_delete_restores_the_element() {
    let mut inspector = inspect(r#"<p id="a" class="c">hi</p>"#);
    let p = mirror_of(&inspector, "p");
    let live_p = element(&inspector, "p");
    let attrs_before: Vec<_> = inspector.live().attributes(live_p);
    let children_before = child_labels(&inspector, p);

    let outcome = inspector
        .add_attribute(p, Some("data-x"), Some("1"))
        .expect("add");
    let EditOutcome::Created(added) = outcome else {
        panic!("expected a new attribute node, got {outcome:?}");
    };
    assert_eq!(
        child_labels(&inspector, p),
        vec!["id=a", "class=c", "data-x=1", "#text"]
    );

    inspector.delete_attribute(added).expect("delete");
    assert_eq!(inspector.live().attributes(live_p), attrs_before);
    assert_eq!(child_labels(&inspector, p), children_before);
    assert!(inspector.node(added).is_none());
    inspector.tree().check_invariants().expect("invariants");
}

#[rstest]
#[case::with_id(r#"<div><p id="a">t</p></div>"#, vec!["id=a", "class=highlight", "#text"])]
#[case::without_id(r#"<div><p title="t">t</p></div>"#, vec!["class=highlight", "title=t", "#text"])]
fn set_class_inserts_one_row(#[case] html: &str, #[case] expected: Vec<&str>) {
    let mut inspector = inspect(html);
    let p = mirror_of(&inspector, "p");
    let before = inspector.tree().len();

    inspector.set_class(p, Some("highlight")).expect("set class");

    assert_eq!(inspector.tree().len(), before + 1);
    assert_eq!(child_labels(&inspector, p), expected);
}

#[test]
fn renaming_id_to_data_id() {
    let mut inspector = inspect(r#"<section id="intro">x</section>"#);
    let section = mirror_of(&inspector, "section");
    let id_attr = inspector.node(section).expect("section").children()[0];

    inspector
        .set_attribute_name(id_attr, Some("data-id"))
        .expect("rename");

    let live_section = element(&inspector, "section");
    assert_eq!(inspector.row_label(id_attr).as_deref(), Some("data-id=intro"));
    assert_eq!(inspector.live().get_attribute(live_section, "id"), None);
    assert_eq!(
        inspector.live().get_attribute(live_section, "data-id"),
        Some("intro")
    );
    inspector.tree().check_invariants().expect("invariants");
}

#[test]
fn edit_sequences_keep_the_bijection() {
    let mut inspector = inspect(
        r#"<main><h1>t</h1><ul><li>a</li><li class="x">b</li></ul><p id="q" hidden>z</p></main>"#,
    );
    let elements: Vec<NodeHandle> = inspector
        .tree()
        .pre_order()
        .into_iter()
        .filter(|handle| {
            inspector
                .node(*handle)
                .is_some_and(|node| node.kind() == MirrorKind::Element)
        })
        .collect();

    for (index, handle) in elements.into_iter().enumerate() {
        let name = format!("data-step{index}");
        inspector.set_id(handle, Some(&format!("e{index}"))).expect("id");
        inspector.set_class(handle, Some("k")).expect("class");
        let EditOutcome::Created(attr) = inspector
            .add_attribute(handle, Some(&name), None)
            .expect("add")
        else {
            panic!("attribute should be new");
        };
        inspector.tree().check_invariants().expect("after add");

        inspector
            .set_attribute_value(attr, Some("v"))
            .expect("value");
        inspector
            .set_attribute_name(attr, Some(&format!("{name}-renamed")))
            .expect("rename");
        inspector.tree().check_invariants().expect("after rename");

        inspector.delete_attribute(attr).expect("delete");
        inspector.tree().check_invariants().expect("after delete");
    }

    let mut expected = Vec::new();
    expected_labels(inspector.live(), inspector.live().document_root(), &mut expected);
    let mut actual = visible_labels(&inspector);
    // Attribute rows keep their position; compare as multisets per element.
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected);
}

#[test]
fn deeply_nested_markup_builds_and_renders() {
    const DEPTH: usize = 5_000;
    let mut html = "<div>".repeat(DEPTH);
    html.push_str("leaf");
    let inspector = inspect(&html);

    // #document, every div, one text node
    assert_eq!(inspector.tree().len(), DEPTH + 2);
    inspector.tree().check_invariants().expect("invariants");

    let rows = inspector.screen().visible_rows();
    assert_eq!(rows.len(), DEPTH + 2);
    assert_eq!(rows.last().map(|entry| entry.depth), Some(DEPTH + 1));

    let lines = outline(inspector.live());
    assert_eq!(lines.len(), 2 * DEPTH + 1);
    assert_eq!(lines[DEPTH].text, "leaf");
    assert_eq!(lines[DEPTH].depth, DEPTH);
    assert!(lines[DEPTH + 1].closing);

    let markup = to_html(inspector.live());
    assert!(markup.ends_with(&format!("leaf{}", "</div>".repeat(DEPTH))));
    let outer = element(&inspector, "div");
    assert_eq!(inspector.live().text_content(outer).as_deref(), Some("leaf"));
}

struct Scripted {
    replies: Vec<Option<String>>,
    alerts: Vec<String>,
}

impl Prompter for Scripted {
    fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
        if self.replies.is_empty() {
            None
        } else {
            self.replies.remove(0)
        }
    }

    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_owned());
    }
}

#[test]
fn context_menu_round_trip() {
    let mut inspector = inspect(r#"<form id="f"><input name="q"></form>"#);
    let input = mirror_of(&inspector, "input");
    let mut prompter = Scripted {
        replies: vec![Some("NAME".to_owned()), Some("x".to_owned())],
        alerts: Vec::new(),
    };

    let menu = inspector
        .open_context_menu(input, Point { x: 30, y: 4 }, Point { x: 0, y: 10 }, 20)
        .expect("menu");
    assert_eq!((menu.position.x, menu.position.y), (10, 14));
    let err = inspector
        .dispatch(MenuAction::AddAttribute, &mut prompter)
        .unwrap_err();
    assert_eq!(prompter.alerts.len(), 1, "{err}");
    assert!(prompter.alerts[0].contains("'name' already exists"));

    inspector
        .open_context_menu(input, Point::default(), Point::default(), 0)
        .expect("menu");
    prompter.replies = vec![Some("search".to_owned())];
    let outcome = inspector
        .dispatch(MenuAction::SetClass, &mut prompter)
        .expect("set class");
    assert!(matches!(outcome, EditOutcome::Created(_)));
    assert_eq!(child_labels(&inspector, input), vec!["class=search", "name=q"]);

    assert!(inspector
        .dispatch(MenuAction::SetClass, &mut prompter)
        .is_err());
}
