// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use domscope::inspector::{BuildOptions, Inspector};
use domscope::live::{parse_document, HtmlOptions, LiveDocument, LiveTreeAdapter};
use domscope::query::{search_nodes, SearchKind};
use domscope::screen::ScreenTree;

#[derive(Debug, Clone, Copy)]
enum Case {
    Small,
    Medium,
    LargeDeep,
}

impl Case {
    fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeDeep => "large_deep",
        }
    }

    /// (sections, items per section, nesting depth of each item)
    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Small => (4, 8, 1),
            Self::Medium => (20, 25, 2),
            Self::LargeDeep => (40, 40, 5),
        }
    }
}

// Deterministic markup: no RNG so results stay comparable across runs.
fn page(case: Case) -> String {
    let (sections, items, depth) = case.shape();
    let mut out = String::from("<!DOCTYPE html><html><body>");
    for section in 0..sections {
        let _ = write!(out, r#"<section id="s{section}" class="card">"#);
        for item in 0..items {
            for level in 0..depth {
                let _ = write!(out, r#"<div data-level="{level}">"#);
            }
            let _ = write!(out, r#"<p title="item {item}">text {section}.{item}</p>"#);
            for _ in 0..depth {
                out.push_str("</div>");
            }
        }
        out.push_str("</section>");
    }
    out.push_str("</body></html>");
    out
}

fn document(case: Case) -> LiveDocument {
    parse_document(&page(case), &HtmlOptions::default()).expect("parse bench page")
}

// Benchmark identity (keep stable): group `inspector.build`, `inspector.search`,
// case ids `small`, `medium`, `large_deep`.
fn benches_build(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("inspector.build");
        for case in [Case::Small, Case::Medium, Case::LargeDeep] {
            let doc = document(case);
            let nodes = doc.descendants(doc.document_root()).len() as u64;
            group.throughput(Throughput::Elements(nodes));
            group.bench_function(case.id(), move |b| {
                b.iter(|| {
                    let inspector = Inspector::build_document(
                        black_box(doc.clone()),
                        ScreenTree::new(),
                        &BuildOptions::default(),
                    )
                    .expect("build");
                    black_box(inspector.tree().len())
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("inspector.search");
        for case in [Case::Small, Case::Medium, Case::LargeDeep] {
            let inspector =
                Inspector::build_document(document(case), ScreenTree::new(), &BuildOptions::default())
                    .expect("build");
            group.bench_function(case.id(), |b| {
                b.iter(|| {
                    let regular = search_nodes(&inspector, black_box("item 1"), SearchKind::Regular)
                        .expect("search");
                    let fuzzy = search_nodes(&inspector, black_box("dtlvl"), SearchKind::Fuzzy)
                        .expect("search");
                    black_box(regular.len() + fuzzy.len())
                })
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benches_build);
criterion_main!(benches);
