use super::*;
use crate::markup::Element;

#[test]
fn test_worked_example() {
    let blocks = blocks_with(
        "<h1>Title</h1><p>Hello <strong>world</strong></p><ul><li>A</li><li>B</li></ul>",
        &ComposeOptions::default(),
    );
    insta::assert_snapshot!(render(&blocks), @r###"
    h1 | "Title"
    p= | "Hello " | *"world"*
    - "A"
    - "B"
    h2 | "FONTES VISITADAS (LINKS ORIGINAIS)"
    "###);
}

#[test]
fn test_worked_example_structurally() {
    let blocks = content_blocks(
        "<h1>Title</h1><p>Hello <strong>world</strong></p><ul><li>A</li><li>B</li></ul>",
    );
    assert_eq!(
        blocks,
        vec![
            DocumentBlock::Heading {
                level: 1,
                runs: vec![TextRun::plain("Title")],
            },
            DocumentBlock::Paragraph {
                runs: vec![TextRun::plain("Hello "), TextRun::bold("world")],
                justified: true,
            },
            DocumentBlock::Bullet { text: "A".into() },
            DocumentBlock::Bullet { text: "B".into() },
        ]
    );
}

#[test]
fn test_unknown_inline_degrades_to_plain_text() {
    let blocks = content_blocks("<p><span>x</span></p>");
    assert_eq!(
        blocks,
        vec![DocumentBlock::Paragraph {
            runs: vec![TextRun::plain("x")],
            justified: true,
        }]
    );
}

#[test]
fn test_inline_flags_are_exclusive() {
    let blocks = content_blocks(
        "<p>a<b>b</b><em>c</em><i>d</i><u>e</u><strong><em>f</em></strong><em><u>g</u></em></p>",
    );
    insta::assert_snapshot!(render(&blocks), @r###"p= | "a" | *"b"* | _"c"_ | _"d"_ | ~"e"~ | *"f"* | _"g"_"###);

    let DocumentBlock::Paragraph { runs, .. } = &blocks[0] else {
        panic!("expected a paragraph, got {blocks:?}");
    };
    for run in runs {
        let flags = [run.bold, run.italic, run.underline];
        assert!(flags.iter().filter(|f| **f).count() <= 1, "{run:?}");
    }
}

#[test]
fn test_headings_keep_levels_and_formatting() {
    let blocks = content_blocks("<h2>Part <em>one</em></h2><h3>Sub</h3><h4>dropped</h4>");
    insta::assert_snapshot!(render(&blocks), @r###"
    h2 | "Part " | _"one"_
    h3 | "Sub"
    "###);
}

#[test]
fn test_lists_flatten_nested_items() {
    let blocks = content_blocks(
        "<ol><li>One <strong>bold</strong></li><li>Two<ul><li>Two.a</li></ul></li></ol>",
    );
    insta::assert_snapshot!(render(&blocks), @r###"
    - "One bold"
    - "TwoTwo.a"
    - "Two.a"
    "###);
}

#[test]
fn test_list_items_found_at_any_depth() {
    let blocks = content_blocks("<ul><div><li>deep</li></div>text<li>top</li></ul>");
    assert_eq!(
        blocks,
        vec![
            DocumentBlock::Bullet {
                text: "deep".into()
            },
            DocumentBlock::Bullet { text: "top".into() },
        ]
    );
}

#[test]
fn test_unknown_blocks_dropped_by_default() {
    let blocks = content_blocks(
        "stray text<div><p>inside div</p></div><table><tr><td>cell</td></tr></table><p>kept</p>",
    );
    insta::assert_snapshot!(render(&blocks), @r###"p= | "kept""###);
}

#[test]
fn test_keep_text_policy() {
    let options = ComposeOptions {
        unknown_tags: UnknownTagPolicy::KeepText,
        ..Default::default()
    };
    let blocks = blocks_with("text<blockquote>quoted <b>words</b></blockquote><hr>", &options);
    insta::assert_snapshot!(render(&blocks), @r###"
    p= | "quoted words"
    h2 | "FONTES VISITADAS (LINKS ORIGINAIS)"
    "###);
}

#[test]
fn test_sources_section() {
    let meta = metadata(vec![
        GroundingSource::new("Wikipedia", "https://pt.wikipedia.org/wiki/Clima"),
        GroundingSource::new("IPCC", "https://www.ipcc.ch"),
    ]);
    let options = ComposeOptions {
        labels: ExportLabels::english(),
        ..Default::default()
    };
    let blocks = compose(&parse_fragment(""), &meta, &options);
    insta::assert_snapshot!(render(&blocks), @r###"
    h2 | "SOURCES CONSULTED (ORIGINAL LINKS)"
    p | *"Wikipedia: "* | "https://pt.wikipedia.org/wiki/Clima"
    p | *"IPCC: "* | "https://www.ipcc.ch"
    "###);
}

#[test]
fn test_empty_content_yields_only_sources_heading() {
    let blocks = blocks_with("   \n  ", &ComposeOptions::default());
    assert_eq!(blocks.len(), 1);
    assert!(matches!(blocks[0], DocumentBlock::Heading { level: 2, .. }));
}

#[test]
fn test_block_count_matches_recognized_children() {
    let markup = "<p>a</p><span>b</span><h1>c</h1><ul></ul><h3>d</h3><section>e</section>";
    let root = parse_fragment(markup);
    let recognized = root
        .children()
        .iter()
        .filter(|child| {
            matches!(
                child,
                MarkupNode::Element(Element {
                    tag: Tag::Paragraph | Tag::Heading(_),
                    ..
                })
            )
        })
        .count();
    // The empty list contributes no bullets.
    assert_eq!(content_blocks(markup).len(), recognized);
}

#[test]
fn test_runs_reconstruct_element_text() {
    let markup = "<p>The <b>quick</b> <i>brown</i> fox <a href='#'>jumps</a> over</p>";
    let root = parse_fragment(markup);
    let blocks = content_blocks(markup);
    assert_eq!(blocks[0].text(), root.children()[0].text_content());
    assert_eq!(blocks[0].text(), "The quick brown fox jumps over");
}

#[test]
fn test_compose_is_deterministic() {
    let markup = "<h1>T</h1><p>x <u>y</u></p><ol><li>1</li></ol>";
    let meta = metadata(vec![GroundingSource::new("S", "https://s.example")]);
    let options = ComposeOptions::default();
    let root = parse_fragment(markup);
    assert_eq!(
        compose(&root, &meta, &options),
        compose(&root, &meta, &options)
    );
}

#[test]
fn test_compose_from_built_tree() {
    let root = MarkupNode::element(
        Tag::Other("#fragment".into()),
        vec![
            MarkupNode::element(
                Tag::Heading(3),
                vec![MarkupNode::element(
                    Tag::Underline,
                    vec![MarkupNode::text("u"), MarkupNode::text("v")],
                )],
            ),
            MarkupNode::text("ignored"),
        ],
    );
    let blocks = compose(&root, &metadata(vec![]), &ComposeOptions::default());
    assert_eq!(
        blocks[0],
        DocumentBlock::Heading {
            level: 3,
            runs: vec![TextRun {
                text: "uv".into(),
                underline: true,
                ..Default::default()
            }],
        }
    );
    assert_eq!(blocks.len(), 2);
}

#[test]
fn test_subtitle_line() {
    let meta = metadata(vec![]);
    assert_eq!(
        meta.subtitle(&ExportLabels::portuguese()),
        "Tipo: Trabalho de Pesquisa | Nível: Ensino Superior"
    );
}

#[test]
fn test_deeply_nested_inline_markup() {
    let markup = format!("<p>{}x</p>", "<span>".repeat(100_000));
    let blocks = content_blocks(&markup);
    insta::assert_snapshot!(render(&blocks), @r###"p= | "x""###);
}

#[test]
fn test_deeply_nested_lists() {
    let markup = format!("{}x", "<ul><li>".repeat(100_000));
    let blocks = content_blocks(&markup);
    assert!(!blocks.is_empty());
    assert!(
        blocks
            .iter()
            .all(|block| matches!(block, DocumentBlock::Bullet { text } if text == "x"))
    );
}
