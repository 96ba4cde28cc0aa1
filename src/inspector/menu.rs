// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The context menu: which actions a node offers, where the menu opens, what the
//! user is asked, and how the answers reach the edit operations.
//!
//! Front ends that can block on user input drive [`Inspector::dispatch`] with a
//! [`Prompter`]. Event-loop front ends take the target with
//! [`Inspector::take_menu_target`], walk [`Inspector::interaction_plan`] through
//! their own modal widgets and finish with [`Inspector::apply_action`].

use smallvec::SmallVec;

use super::edit::{EditError, EditOutcome};
use super::session::Inspector;
use crate::live::LiveTreeAdapter;
use crate::model::{LiveRef, MirrorKind, NodeHandle};
use crate::screen::ScreenAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    EditText,
    SetId,
    SetClass,
    AddAttribute,
    EditAttributeName,
    EditAttributeValue,
    DeleteAttribute,
}

impl MenuAction {
    /// The actions a node of `kind` offers, in slot order.
    pub const fn for_kind(kind: MirrorKind) -> &'static [MenuAction] {
        match kind {
            MirrorKind::Text => &[MenuAction::EditText],
            MirrorKind::Element => &[
                MenuAction::SetId,
                MenuAction::SetClass,
                MenuAction::AddAttribute,
            ],
            MirrorKind::Attribute => &[
                MenuAction::EditAttributeName,
                MenuAction::EditAttributeValue,
                MenuAction::DeleteAttribute,
            ],
            MirrorKind::Document => &[],
        }
    }
}

/// One visible menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSlot {
    pub action: MenuAction,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Menu origin relative to the panel's own scroll offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuPosition {
    pub x: i32,
    pub y: i32,
}

impl MenuPosition {
    pub fn new(pointer: Point, scroll: Point, panel_left: i32) -> Self {
        Self {
            x: pointer.x + scroll.x - panel_left,
            y: pointer.y + scroll.y,
        }
    }
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub target: NodeHandle,
    pub position: MenuPosition,
    pub slots: SmallVec<[MenuSlot; 3]>,
}

/// One step of an action's dialogue with the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Prompt {
        message: &'static str,
        default: String,
    },
    Confirm {
        message: &'static str,
    },
}

/// The user's reply to one [`Interaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// `None` when the prompt was dismissed.
    Text(Option<String>),
    Confirmed(bool),
}

impl Answer {
    fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => text.as_deref(),
            Self::Confirmed(_) => None,
        }
    }

    fn confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(true))
    }
}

/// Blocking user dialogue.
pub trait Prompter {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("no context menu target")]
    NoTarget,
    #[error("mirror node {0} does not exist")]
    UnknownNode(NodeHandle),
    #[error("{action:?} is not available on {kind} nodes")]
    NotAvailable { action: MenuAction, kind: MirrorKind },
    #[error(transparent)]
    Edit(#[from] EditError),
}

pub const PROMPT_EDIT_TEXT: &str = "Edit Text";
pub const PROMPT_SET_ID: &str = "Set new ID:";
pub const PROMPT_SET_CLASS: &str = "Set new class(es):";
pub const PROMPT_ATTRIBUTE_NAME: &str = "Set attribute name:";
pub const PROMPT_ATTRIBUTE_VALUE: &str = "Set attribute value:";
pub const PROMPT_RENAME_ATTRIBUTE: &str = "Enter new attribute name:";
pub const PROMPT_NEW_ATTRIBUTE_VALUE: &str = "Set new attribute value:";
pub const CONFIRM_DELETE_ATTRIBUTE: &str = "This will delete the attribute. Are you sure?";

impl<L: LiveTreeAdapter, S: ScreenAdapter> Inspector<L, S> {
    /// Visible slots for `handle`, with labels reflecting the current live state.
    pub fn menu_slots(&self, handle: NodeHandle) -> Result<SmallVec<[MenuSlot; 3]>, MenuError> {
        let node = self.tree.get(handle).ok_or(MenuError::UnknownNode(handle))?;
        let element = node.live_node();
        let has = |name: &str| {
            element
                .and_then(|element| self.live.get_attribute(element, name))
                .is_some_and(|value| !value.is_empty())
        };

        Ok(MenuAction::for_kind(node.kind())
            .iter()
            .map(|action| MenuSlot {
                action: *action,
                label: match action {
                    MenuAction::EditText => "Edit text",
                    MenuAction::SetId if has("id") => "Edit ID",
                    MenuAction::SetId => "Add ID",
                    MenuAction::SetClass if has("class") => "Edit Class",
                    MenuAction::SetClass => "Add Class",
                    MenuAction::AddAttribute => "Add attribute",
                    MenuAction::EditAttributeName => "Edit attribute name",
                    MenuAction::EditAttributeValue => "Edit attribute value",
                    MenuAction::DeleteAttribute => "Delete attribute",
                },
            })
            .collect())
    }

    /// Opens the menu on `handle` and records it as the pending target. Opening a
    /// menu while another is open replaces it.
    pub fn open_context_menu(
        &mut self,
        handle: NodeHandle,
        pointer: Point,
        scroll: Point,
        panel_left: i32,
    ) -> Result<ContextMenu, MenuError> {
        self.session.pending_context_target = None;
        let slots = self.menu_slots(handle)?;
        self.session.pending_context_target = Some(handle);
        Ok(ContextMenu {
            target: handle,
            position: MenuPosition::new(pointer, scroll, panel_left),
            slots,
        })
    }

    pub fn close_context_menu(&mut self) {
        self.session.pending_context_target = None;
    }

    /// Closes the menu and returns the node it was opened on.
    pub fn take_menu_target(&mut self) -> Result<NodeHandle, MenuError> {
        self.session.pending_context_target.take().ok_or_else(|| {
            tracing::warn!("menu action without a context menu target");
            MenuError::NoTarget
        })
    }

    /// The prompts or confirmation `action` needs, with defaults from the live
    /// document.
    pub fn interaction_plan(
        &self,
        target: NodeHandle,
        action: MenuAction,
    ) -> Result<Vec<Interaction>, MenuError> {
        let node = self.tree.get(target).ok_or(MenuError::UnknownNode(target))?;
        if !MenuAction::for_kind(node.kind()).contains(&action) {
            return Err(MenuError::NotAvailable {
                action,
                kind: node.kind(),
            });
        }

        let element_attr = |name: &str| {
            node.live_node()
                .and_then(|element| self.live.get_attribute(element, name))
                .unwrap_or_default()
                .to_owned()
        };
        let prompt = |message, default| Interaction::Prompt { message, default };

        Ok(match (action, node.live()) {
            (MenuAction::EditText, live) => vec![prompt(
                PROMPT_EDIT_TEXT,
                live.node()
                    .and_then(|text| self.live.text_content(text))
                    .unwrap_or_default(),
            )],
            (MenuAction::SetId, _) => vec![prompt(PROMPT_SET_ID, element_attr("id"))],
            (MenuAction::SetClass, _) => vec![prompt(PROMPT_SET_CLASS, element_attr("class"))],
            (MenuAction::AddAttribute, _) => vec![
                prompt(PROMPT_ATTRIBUTE_NAME, String::new()),
                prompt(PROMPT_ATTRIBUTE_VALUE, String::new()),
            ],
            (MenuAction::EditAttributeName, LiveRef::Attr(attr)) => vec![prompt(
                PROMPT_RENAME_ATTRIBUTE,
                self.live.attribute_name(attr).unwrap_or_default().to_owned(),
            )],
            (MenuAction::EditAttributeValue, LiveRef::Attr(attr)) => vec![prompt(
                PROMPT_NEW_ATTRIBUTE_VALUE,
                self.live.attribute_value(attr).unwrap_or_default().to_owned(),
            )],
            (MenuAction::DeleteAttribute, _) => vec![Interaction::Confirm {
                message: CONFIRM_DELETE_ATTRIBUTE,
            }],
            (MenuAction::EditAttributeName | MenuAction::EditAttributeValue, LiveRef::Node(_)) => {
                return Err(MenuError::NotAvailable {
                    action,
                    kind: node.kind(),
                })
            }
        })
    }

    /// Runs `action` on `target` with the user's answers, one per planned
    /// interaction. Missing answers count as dismissed prompts.
    pub fn apply_action(
        &mut self,
        target: NodeHandle,
        action: MenuAction,
        answers: &[Answer],
    ) -> Result<EditOutcome, MenuError> {
        let kind = self
            .tree
            .get(target)
            .ok_or(MenuError::UnknownNode(target))?
            .kind();
        if !MenuAction::for_kind(kind).contains(&action) {
            return Err(MenuError::NotAvailable { action, kind });
        }
        let text = |index: usize| answers.get(index).and_then(Answer::text);

        let outcome = match action {
            MenuAction::EditText => self.edit_text(target, text(0))?,
            MenuAction::SetId => self.set_id(target, text(0))?,
            MenuAction::SetClass => self.set_class(target, text(0))?,
            MenuAction::AddAttribute => self.add_attribute(target, text(0), text(1))?,
            MenuAction::EditAttributeName => self.set_attribute_name(target, text(0))?,
            MenuAction::EditAttributeValue => self.set_attribute_value(target, text(0))?,
            MenuAction::DeleteAttribute => {
                if answers.first().is_some_and(Answer::confirmed) {
                    self.delete_attribute(target)?
                } else {
                    EditOutcome::Cancelled
                }
            }
        };
        Ok(outcome)
    }

    /// Closes the menu, asks the user through `prompter` and applies `action` to
    /// the pending target. Conflicts are shown through [`Prompter::alert`].
    pub fn dispatch<P: Prompter + ?Sized>(
        &mut self,
        action: MenuAction,
        prompter: &mut P,
    ) -> Result<EditOutcome, MenuError> {
        let target = self.take_menu_target()?;
        let answers: Vec<Answer> = self
            .interaction_plan(target, action)?
            .into_iter()
            .map(|interaction| match interaction {
                Interaction::Prompt { message, default } => {
                    Answer::Text(prompter.prompt(message, &default))
                }
                Interaction::Confirm { message } => Answer::Confirmed(prompter.confirm(message)),
            })
            .collect();

        let result = self.apply_action(target, action, &answers);
        if let Err(MenuError::Edit(err @ EditError::DuplicateAttribute { .. })) = &result {
            prompter.alert(&err.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rstest::{fixture, rstest};

    use super::{
        Answer, Interaction, MenuAction, MenuError, MenuPosition, Point, Prompter,
        CONFIRM_DELETE_ATTRIBUTE, PROMPT_SET_CLASS,
    };
    use crate::inspector::{BuildOptions, EditError, EditOutcome, Inspector};
    use crate::live::{parse_document, HtmlOptions, LiveDocument, LiveTreeAdapter};
    use crate::model::NodeHandle;
    use crate::screen::ScreenTree;

    type TestInspector = Inspector<LiveDocument, ScreenTree>;

    #[derive(Default)]
    struct ScriptedPrompter {
        replies: VecDeque<Option<String>>,
        confirm: bool,
        asked: Vec<(String, String)>,
        alerts: Vec<String>,
    }

    impl ScriptedPrompter {
        fn replying(replies: &[Option<&str>]) -> Self {
            Self {
                replies: replies.iter().map(|reply| reply.map(str::to_owned)).collect(),
                ..Self::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
            self.asked.push((message.to_owned(), default.to_owned()));
            self.replies.pop_front().flatten()
        }

        fn confirm(&mut self, message: &str) -> bool {
            self.asked.push((message.to_owned(), String::new()));
            self.confirm
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_owned());
        }
    }

    #[fixture]
    fn page() -> TestInspector {
        let doc = parse_document(
            r#"<div id="main" class="box"><p>hello</p><span title="t"></span></div>"#,
            &HtmlOptions::default(),
        )
        .unwrap();
        Inspector::build_document(doc, ScreenTree::new(), &BuildOptions::default()).unwrap()
    }

    fn element(inspector: &TestInspector, tag: &str) -> NodeHandle {
        let live = inspector.live().find_first_element(tag).unwrap();
        inspector.node_for_live(live).unwrap()
    }

    fn first_child(inspector: &TestInspector, handle: NodeHandle) -> NodeHandle {
        inspector.node(handle).unwrap().children()[0]
    }

    fn labels(inspector: &TestInspector, handle: NodeHandle) -> Vec<&'static str> {
        inspector
            .menu_slots(handle)
            .unwrap()
            .into_iter()
            .map(|slot| slot.label)
            .collect()
    }

    #[rstest]
    #[case::blank_id(r#"<p id=" ">t</p>"#, ["Edit ID", "Add Class"])]
    #[case::empty_id(r#"<p id="">t</p>"#, ["Add ID", "Add Class"])]
    #[case::blank_class(r#"<p class="  ">t</p>"#, ["Add ID", "Edit Class"])]
    fn whitespace_values_count_as_present(#[case] html: &str, #[case] expected: [&str; 2]) {
        let doc = parse_document(html, &HtmlOptions::default()).unwrap();
        let page =
            Inspector::build_document(doc, ScreenTree::new(), &BuildOptions::default()).unwrap();
        let p = element(&page, "p");

        assert_eq!(labels(&page, p)[..2], expected);
    }

    #[rstest]
    fn slots_follow_the_node_kind(page: TestInspector) {
        let div = element(&page, "div");
        let span = element(&page, "span");
        let p = element(&page, "p");
        let document = page.tree().root().unwrap();

        assert_eq!(labels(&page, div), vec!["Edit ID", "Edit Class", "Add attribute"]);
        assert_eq!(labels(&page, span), vec!["Add ID", "Add Class", "Add attribute"]);
        assert_eq!(labels(&page, first_child(&page, p)), vec!["Edit text"]);
        assert_eq!(
            labels(&page, first_child(&page, span)),
            vec!["Edit attribute name", "Edit attribute value", "Delete attribute"]
        );
        assert!(labels(&page, document).is_empty());
    }

    #[rstest]
    #[case(Point { x: 10, y: 5 }, Point { x: 0, y: 0 }, 0, MenuPosition { x: 10, y: 5 })]
    #[case(Point { x: 10, y: 5 }, Point { x: 3, y: 20 }, 0, MenuPosition { x: 13, y: 25 })]
    #[case(Point { x: 50, y: 5 }, Point { x: 0, y: 2 }, 40, MenuPosition { x: 10, y: 7 })]
    fn menu_position_is_relative_to_the_panel(
        #[case] pointer: Point,
        #[case] scroll: Point,
        #[case] panel_left: i32,
        #[case] expected: MenuPosition,
    ) {
        assert_eq!(MenuPosition::new(pointer, scroll, panel_left), expected);
    }

    #[rstest]
    fn opening_records_the_pending_target(mut page: TestInspector) {
        let div = element(&page, "div");
        let menu = page
            .open_context_menu(div, Point { x: 4, y: 2 }, Point::default(), 0)
            .unwrap();
        assert_eq!(menu.target, div);
        assert_eq!(page.session().pending_context_target, Some(div));

        page.close_context_menu();
        assert_eq!(page.session().pending_context_target, None);
    }

    #[rstest]
    fn plan_carries_current_values_as_defaults(page: TestInspector) {
        let div = element(&page, "div");
        assert_eq!(
            page.interaction_plan(div, MenuAction::SetClass).unwrap(),
            vec![Interaction::Prompt {
                message: PROMPT_SET_CLASS,
                default: "box".to_owned()
            }]
        );
        let span = element(&page, "span");
        let title = first_child(&page, span);
        assert_eq!(
            page.interaction_plan(title, MenuAction::DeleteAttribute)
                .unwrap(),
            vec![Interaction::Confirm {
                message: CONFIRM_DELETE_ATTRIBUTE
            }]
        );
        assert_eq!(
            page.interaction_plan(title, MenuAction::SetId),
            Err(MenuError::NotAvailable {
                action: MenuAction::SetId,
                kind: crate::model::MirrorKind::Attribute
            })
        );
    }

    #[rstest]
    fn dispatch_without_target_returns_early(mut page: TestInspector) {
        let mut prompter = ScriptedPrompter::default();
        assert_eq!(
            page.dispatch(MenuAction::SetId, &mut prompter),
            Err(MenuError::NoTarget)
        );
        assert!(prompter.asked.is_empty());
    }

    #[rstest]
    fn dispatch_edits_text_with_the_current_text_as_default(mut page: TestInspector) {
        let p = element(&page, "p");
        let text = first_child(&page, p);
        page.open_context_menu(text, Point::default(), Point::default(), 0)
            .unwrap();

        let mut prompter = ScriptedPrompter::replying(&[Some("bye")]);
        let outcome = page.dispatch(MenuAction::EditText, &mut prompter).unwrap();

        assert_eq!(outcome, EditOutcome::Updated);
        assert_eq!(
            prompter.asked,
            vec![("Edit Text".to_owned(), "hello".to_owned())]
        );
        assert_eq!(page.session().pending_context_target, None);
        let p_live = page.live().find_first_element("p").unwrap();
        assert_eq!(page.live().text_content(p_live).as_deref(), Some("bye"));
    }

    #[rstest]
    fn add_attribute_asks_name_then_value(mut page: TestInspector) {
        let span = element(&page, "span");
        page.open_context_menu(span, Point::default(), Point::default(), 0)
            .unwrap();
        let mut prompter = ScriptedPrompter::replying(&[Some("data-x"), None]);

        let outcome = page
            .dispatch(MenuAction::AddAttribute, &mut prompter)
            .unwrap();
        assert!(matches!(outcome, EditOutcome::Created(_)));
        assert_eq!(
            prompter
                .asked
                .iter()
                .map(|(message, _)| message.as_str())
                .collect::<Vec<_>>(),
            vec!["Set attribute name:", "Set attribute value:"]
        );
        let span_live = page.live().find_first_element("span").unwrap();
        assert_eq!(page.live().get_attribute(span_live, "data-x"), Some(""));
    }

    #[rstest]
    fn duplicate_add_raises_an_alert(mut page: TestInspector) {
        let div = element(&page, "div");
        page.open_context_menu(div, Point::default(), Point::default(), 0)
            .unwrap();
        let mut prompter = ScriptedPrompter::replying(&[Some("class"), Some("x")]);

        let result = page.dispatch(MenuAction::AddAttribute, &mut prompter);
        assert_eq!(
            result,
            Err(MenuError::Edit(EditError::DuplicateAttribute {
                name: "class".to_owned()
            }))
        );
        assert_eq!(prompter.alerts.len(), 1);
        assert!(prompter.alerts[0].contains("'class' already exists"));
    }

    #[rstest]
    #[case::declined(false, EditOutcome::Cancelled)]
    #[case::confirmed(true, EditOutcome::Deleted)]
    fn delete_needs_confirmation(
        mut page: TestInspector,
        #[case] confirm: bool,
        #[case] expected: EditOutcome,
    ) {
        let span = element(&page, "span");
        let title = first_child(&page, span);
        page.open_context_menu(title, Point::default(), Point::default(), 0)
            .unwrap();
        let mut prompter = ScriptedPrompter {
            confirm,
            ..ScriptedPrompter::default()
        };

        let outcome = page
            .dispatch(MenuAction::DeleteAttribute, &mut prompter)
            .unwrap();
        assert_eq!(outcome, expected);
        let span_live = page.live().find_first_element("span").unwrap();
        assert_eq!(page.live().has_attribute(span_live, "title"), !confirm);
    }

    #[rstest]
    fn apply_action_treats_missing_answers_as_dismissed(mut page: TestInspector) {
        let div = element(&page, "div");
        assert_eq!(
            page.apply_action(div, MenuAction::SetId, &[]).unwrap(),
            EditOutcome::Cancelled
        );
        assert_eq!(
            page.apply_action(div, MenuAction::SetId, &[Answer::Text(Some("x".into()))])
                .unwrap(),
            EditOutcome::Updated
        );
    }
}
