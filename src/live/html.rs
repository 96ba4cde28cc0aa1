// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! A forgiving HTML loader producing a [`LiveDocument`].
//!
//! This is not an HTML5 tree builder. It handles what hand-written pages contain:
//! doctype, comments, CDATA, processing instructions, quoted/unquoted/bare
//! attributes, void elements, raw-text `script`/`style`, and a handful of implied
//! end tags. Stray end tags are ignored and unclosed elements are closed at the
//! end of input.

use smol_str::SmolStr;

use super::document::LiveDocument;
use super::{is_valid_attribute_name, is_valid_tag_name, LiveTreeAdapter, LiveTreeError};
use crate::model::LiveNodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Keep text nodes that consist only of whitespace.
    pub keep_whitespace_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to build document: {0}")]
    Live(#[from] LiveTreeError),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that implicitly close an open sibling of the same name.
const SELF_NESTING_CLOSERS: &[&str] = &["li", "p", "option", "tr", "td", "th", "dt", "dd"];

pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

pub(crate) fn is_raw_text_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

pub fn parse_document(input: &str, options: &HtmlOptions) -> Result<LiveDocument, HtmlError> {
    let mut doc = LiveDocument::new();
    let bytes = input.as_bytes();
    let mut open: Vec<(LiveNodeId, SmolStr)> = Vec::new();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let parent = open.last().map(|(node, _)| *node).unwrap_or(doc.root());

        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            push_text(&mut doc, parent, &input[idx..next], options)?;
            idx = next;
            continue;
        }

        if starts_with(bytes, idx, b"<!--") {
            let body_start = idx + 4;
            let (end, after) = match find_seq(bytes, body_start, b"-->") {
                Some(end) => (end, end + 3),
                None => (bytes.len(), bytes.len()),
            };
            doc.append_comment(parent, &input[body_start..end])?;
            idx = after;
            continue;
        }

        if starts_with(bytes, idx, b"<![CDATA[") {
            let body_start = idx + 9;
            let (end, after) = match find_seq(bytes, body_start, b"]]>") {
                Some(end) => (end, end + 3),
                None => (bytes.len(), bytes.len()),
            };
            doc.append_cdata(parent, &input[body_start..end])?;
            idx = after;
            continue;
        }

        if starts_with(bytes, idx, b"<!") {
            let end = find_byte(bytes, idx, b'>').unwrap_or(bytes.len());
            let body = input[idx + 2..end].trim();
            if body.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype")) {
                let name = body
                    .get(7..)
                    .and_then(|rest| rest.split_whitespace().next())
                    .unwrap_or("html");
                doc.append_doctype(parent, &name.to_ascii_lowercase())?;
            }
            idx = (end + 1).min(bytes.len());
            continue;
        }

        if starts_with(bytes, idx, b"<?") {
            let (end, after) = match find_seq(bytes, idx + 2, b"?>") {
                Some(end) => (end, end + 2),
                None => {
                    let end = find_byte(bytes, idx, b'>').unwrap_or(bytes.len());
                    (end, (end + 1).min(bytes.len()))
                }
            };
            let body = input[idx + 2..end].trim();
            let (target, data) = match body.split_once(char::is_whitespace) {
                Some((target, data)) => (target, data.trim()),
                None => (body, ""),
            };
            if !target.is_empty() {
                doc.append_processing_instruction(parent, target, data)?;
            }
            idx = after;
            continue;
        }

        if starts_with(bytes, idx, b"</") {
            let name_start = idx + 2;
            let name_end = scan_name(bytes, name_start);
            let end = find_byte(bytes, name_end, b'>').unwrap_or(bytes.len());
            let name = input[name_start..name_end].to_ascii_lowercase();
            if let Some(pos) = open.iter().rposition(|(_, tag)| *tag == name) {
                open.truncate(pos);
            }
            idx = (end + 1).min(bytes.len());
            continue;
        }

        let Some((tag, next_idx)) = parse_start_tag(input, idx) else {
            push_text(&mut doc, parent, "<", options)?;
            idx += 1;
            continue;
        };

        if SELF_NESTING_CLOSERS.contains(&tag.name.as_str())
            && open.last().is_some_and(|(_, top)| *top == tag.name)
        {
            open.pop();
        }
        let parent = open.last().map(|(node, _)| *node).unwrap_or(doc.root());

        let element = doc.append_element(parent, &tag.name)?;
        for (name, value) in &tag.attributes {
            if !doc.has_attribute(element, name) {
                doc.set_attribute(element, name, value)?;
            }
        }

        idx = next_idx;
        if is_raw_text_element(&tag.name) && !tag.self_closing {
            let (raw, after) = read_raw_text_until_end_tag(input, idx, &tag.name);
            if !raw.is_empty() {
                doc.append_text(element, raw)?;
            }
            idx = after;
        } else if !tag.self_closing && !is_void_element(&tag.name) {
            open.push((element, SmolStr::new(&tag.name)));
        }
    }

    Ok(doc)
}

fn push_text(
    doc: &mut LiveDocument,
    parent: LiveNodeId,
    raw: &str,
    options: &HtmlOptions,
) -> Result<(), LiveTreeError> {
    if raw.is_empty() || (!options.keep_whitespace_text && raw.trim().is_empty()) {
        return Ok(());
    }
    doc.append_text(parent, &decode_entities(raw))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

fn parse_start_tag(input: &str, start: usize) -> Option<(StartTag, usize)> {
    let bytes = input.as_bytes();
    let name_start = start + 1;
    let name_end = scan_name(bytes, name_start);
    let name = input[name_start..name_end].to_ascii_lowercase();
    if !is_valid_tag_name(&name) {
        return None;
    }

    let mut attributes = Vec::new();
    let mut idx = name_end;
    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => {
                return Some((
                    StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    bytes.len(),
                ))
            }
            Some(b'>') => {
                return Some((
                    StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    },
                    idx + 1,
                ))
            }
            Some(b'/') if bytes.get(idx + 1).copied() == Some(b'>') => {
                return Some((
                    StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    },
                    idx + 2,
                ))
            }
            Some(_) => {}
        }

        let attr_start = idx;
        while idx < bytes.len()
            && !bytes[idx].is_ascii_whitespace()
            && !matches!(bytes[idx], b'=' | b'>' | b'/')
        {
            idx += 1;
        }
        if idx == attr_start {
            idx += 1;
            continue;
        }
        let attr_name = input[attr_start..idx].to_ascii_lowercase();

        idx = skip_spaces(bytes, idx);
        let mut value = String::new();
        if bytes.get(idx).copied() == Some(b'=') {
            idx = skip_spaces(bytes, idx + 1);
            match bytes.get(idx).copied() {
                Some(quote @ (b'"' | b'\'')) => {
                    let value_start = idx + 1;
                    let value_end = find_byte(bytes, value_start, quote).unwrap_or(bytes.len());
                    value = decode_entities(&input[value_start..value_end]);
                    idx = (value_end + 1).min(bytes.len());
                }
                Some(_) => {
                    let value_start = idx;
                    while idx < bytes.len()
                        && !bytes[idx].is_ascii_whitespace()
                        && bytes[idx] != b'>'
                    {
                        idx += 1;
                    }
                    value = decode_entities(&input[value_start..idx]);
                }
                None => {}
            }
        }

        if is_valid_attribute_name(&attr_name) {
            attributes.push((attr_name, value));
        }
    }
}

fn read_raw_text_until_end_tag<'a>(input: &'a str, start: usize, tag: &str) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx + 1).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx + 2, tag_bytes)
            && !bytes
                .get(idx + 2 + tag_bytes.len())
                .is_some_and(|byte| byte.is_ascii_alphanumeric())
        {
            let end = find_byte(bytes, idx, b'>').unwrap_or(bytes.len());
            return (&input[start..idx], (end + 1).min(bytes.len()));
        }
        idx += 1;
    }

    (&input[start..], bytes.len())
}

/// Decodes the common named entities and numeric character references; anything
/// unrecognized is kept verbatim.
pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate.find(';').and_then(|semi| {
            let entity = &candidate[1..semi];
            decode_entity(entity).map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let hex = numeric
                .strip_prefix('x')
                .or_else(|| numeric.strip_prefix('X'));
            let code = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn scan_name(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len()
        && (bytes[idx].is_ascii_alphanumeric() || matches!(bytes[idx], b'-' | b'_' | b':' | b'.'))
    {
        idx += 1;
    }
    idx
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

fn find_byte(bytes: &[u8], start: usize, needle: u8) -> Option<usize> {
    bytes
        .get(start..)?
        .iter()
        .position(|byte| *byte == needle)
        .map(|offset| start + offset)
}

fn find_seq(bytes: &[u8], start: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(start..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| start + offset)
}

fn starts_with(bytes: &[u8], idx: usize, prefix: &[u8]) -> bool {
    bytes.get(idx..).is_some_and(|rest| rest.starts_with(prefix))
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, prefix: &[u8]) -> bool {
    bytes
        .get(idx..idx + prefix.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(prefix))
}
