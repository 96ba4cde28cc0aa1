// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ranked search over mirror nodes.
//!
//! Each node is matched by its row label; text nodes are matched by their live
//! text instead, since their label is a fixed placeholder.

use regex::RegexBuilder;

use crate::inspector::Inspector;
use crate::live::LiveTreeAdapter;
use crate::model::{MirrorKind, NodeHandle};
use crate::screen::ScreenAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    /// Case-insensitive substring match.
    #[default]
    Regular,
    /// Case-insensitive subsequence match ranked by edit similarity.
    Fuzzy,
    /// Case-insensitive regular expression.
    Regex,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Nodes matching `query`, best match first; equal scores keep document order.
pub fn search_nodes<L, S>(
    inspector: &Inspector<L, S>,
    query: &str,
    kind: SearchKind,
) -> Result<Vec<NodeHandle>, SearchError>
where
    L: LiveTreeAdapter,
    S: ScreenAdapter,
{
    let needle = query.trim();
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let regex = match kind {
        SearchKind::Regex => Some(RegexBuilder::new(needle).case_insensitive(true).build()?),
        SearchKind::Regular | SearchKind::Fuzzy => None,
    };
    let needle = needle.to_lowercase();

    let mut matches = Vec::new();
    for (order, handle) in inspector.tree().pre_order().into_iter().enumerate() {
        let Some(haystack) = haystack(inspector, handle) else {
            continue;
        };
        let score = match (&regex, kind) {
            (Some(regex), _) => regex_score(regex, &haystack),
            (None, SearchKind::Fuzzy) => fuzzy_score(&needle, &haystack),
            (None, SearchKind::Regular | SearchKind::Regex) => regular_score(&needle, &haystack),
        };
        if let Some(score) = score {
            matches.push((score, order, handle));
        }
    }

    matches.sort_by(|(score_a, order_a, _), (score_b, order_b, _)| {
        score_b.cmp(score_a).then_with(|| order_a.cmp(order_b))
    });
    Ok(matches.into_iter().map(|(_, _, handle)| handle).collect())
}

fn haystack<L, S>(inspector: &Inspector<L, S>, handle: NodeHandle) -> Option<String>
where
    L: LiveTreeAdapter,
    S: ScreenAdapter,
{
    let node = inspector.node(handle)?;
    let text = match node.kind() {
        MirrorKind::Text => {
            let content = inspector.live().text_content(node.live_node()?)?;
            content.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        MirrorKind::Element | MirrorKind::Document | MirrorKind::Attribute => {
            inspector.row_label(handle)?
        }
    };
    Some(text.to_lowercase())
}

fn regex_score(regex: &regex::Regex, haystack: &str) -> Option<i64> {
    let found = regex.find(haystack)?;
    let mut score = 100_000i64.saturating_sub(found.start() as i64 * 1000);
    if found.start() == 0 && found.end() == haystack.len() {
        score += 100_000;
    }
    Some(score)
}

fn regular_score(needle: &str, haystack: &str) -> Option<i64> {
    let first = haystack.find(needle)?;
    let starts = first == 0;
    let start_boundary = starts
        || haystack[..first]
            .chars()
            .last()
            .is_some_and(is_boundary_char);
    let occurrences = haystack.match_indices(needle).count() as i64;

    let mut score = 200_000i64.saturating_sub((first as i64) * 1000);
    score += occurrences * 200;
    score -= haystack.chars().count() as i64;
    if starts {
        score += 50_000;
    }
    if start_boundary {
        score += 20_000;
    }
    if haystack == needle {
        score += 100_000;
    }
    Some(score)
}

fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let subseq = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());

    let mut score = (ratio * 1000.0).round() as i64;
    score -= subseq.span as i64;
    score -= (subseq.first as i64) / 4;
    score += (subseq.consecutive as i64) * 40;
    if subseq.start_boundary {
        score += 150;
    }
    score += if haystack.contains(needle) { 2000 } else { 500 };
    Some(score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubsequenceStats {
    first: usize,
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

fn subsequence_stats(needle: &str, haystack: &str) -> Option<SubsequenceStats> {
    let mut wanted = needle.chars().peekable();
    let mut first: Option<usize> = None;
    let mut last = 0usize;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0usize;
    let mut start_boundary = false;
    let mut prev_char: Option<char> = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = wanted.peek() else {
            break;
        };
        if ch == want {
            wanted.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_char.map_or(true, is_boundary_char);
            }
            if prev_match.is_some_and(|prev| idx == prev + 1) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_char = Some(ch);
    }

    if wanted.peek().is_some() {
        return None;
    }
    let first = first?;
    Some(SubsequenceStats {
        first,
        span: last.saturating_sub(first).saturating_add(1),
        consecutive,
        start_boundary,
    })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, '-' | '_' | ' ' | '=' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::{regular_score, search_nodes, subsequence_stats, SearchKind};
    use crate::inspector::{BuildOptions, Inspector};
    use crate::live::{parse_document, HtmlOptions, LiveDocument};
    use crate::screen::ScreenTree;

    fn inspector() -> Inspector<LiveDocument, ScreenTree> {
        let doc = parse_document(
            r#"<nav id="menu"><a href="/home">Home page</a><a class="nav-link">About</a></nav>"#,
            &HtmlOptions::default(),
        )
        .expect("parse");
        Inspector::build_document(doc, ScreenTree::new(), &BuildOptions::default())
            .expect("build")
    }

    fn labels(
        inspector: &Inspector<LiveDocument, ScreenTree>,
        kind: SearchKind,
        query: &str,
    ) -> Vec<String> {
        search_nodes(inspector, query, kind)
            .expect("search")
            .into_iter()
            .map(|handle| inspector.row_label(handle).expect("label"))
            .collect()
    }

    #[test]
    fn regular_search_prefers_exact_and_early_matches() {
        let inspector = inspector();
        assert_eq!(
            labels(&inspector, SearchKind::Regular, "nav"),
            vec!["nav", "class=nav-link"]
        );
        assert_eq!(
            labels(&inspector, SearchKind::Regular, "A"),
            vec!["a", "a", "#text", "nav", "class=nav-link", "#text"]
        );
    }

    #[test]
    fn text_nodes_match_their_live_text() {
        let inspector = inspector();
        assert_eq!(
            labels(&inspector, SearchKind::Regular, "home page"),
            vec!["#text"]
        );
    }

    #[test]
    fn fuzzy_search_matches_subsequences() {
        let inspector = inspector();
        let hits = labels(&inspector, SearchKind::Fuzzy, "nvlk");
        assert_eq!(hits, vec!["class=nav-link"]);
    }

    #[test]
    fn regex_search_reports_invalid_patterns() {
        let inspector = inspector();
        assert_eq!(
            labels(&inspector, SearchKind::Regex, "^id="),
            vec!["id=menu"]
        );
        assert!(search_nodes(&inspector, "(", SearchKind::Regex).is_err());
    }

    #[test]
    fn blank_queries_match_nothing() {
        let inspector = inspector();
        assert!(labels(&inspector, SearchKind::Regular, "   ").is_empty());
    }

    #[test]
    fn scoring_helpers() {
        assert!(regular_score("id", "id") > regular_score("id", "data-id"));
        assert_eq!(regular_score("x", "abc"), None);
        let stats = subsequence_stats("dv", "div").expect("stats");
        assert_eq!((stats.first, stats.span, stats.consecutive), (0, 3, 0));
    }
}
