use chrono::{TimeZone, Utc};
use content_portal::{
    catalog::{CatalogError, DocumentCatalog},
    content::{Block, Document, RenderMode, Span, escape, render},
};
use std::{env, fs};

fn sample() -> Document {
    Document {
        slug: "release-notes".to_string(),
        title: "Release <notes>".to_string(),
        blocks: vec![
            Block::Heading {
                level: 2,
                children: vec![Span::plain("What's new")],
            },
            Block::Paragraph {
                children: vec![
                    Span::plain("Read the "),
                    Span {
                        text: "guide".to_string(),
                        bold: true,
                        href: Some("/docs/guide".to_string()),
                        ..Span::default()
                    },
                ],
            },
            Block::List {
                ordered: true,
                items: vec![vec![Span::plain("one")], vec![Span::plain("<two>")]],
            },
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "let x = 1 < 2;".to_string(),
            },
        ],
        updated_at: Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap(),
    }
}

// --- Rendering Variants ---

#[test]
fn test_static_mode_has_no_client_capability() {
    let rendered = render(&sample(), RenderMode::Static);

    assert!(!rendered.client_side);
    assert!(!rendered.editable);
    assert!(rendered.html.starts_with(r#"<article class="document">"#));
    assert!(!rendered.html.contains("data-editor"));
    assert!(!rendered.html.contains("contenteditable"));
}

#[test]
fn test_read_only_client_mode_disables_editing() {
    let rendered = render(&sample(), RenderMode::ReadOnlyClient);

    assert!(rendered.client_side);
    assert!(!rendered.editable);
    assert!(rendered.html.contains(r#"data-readonly="true""#));
    assert!(rendered.html.contains(r#"contenteditable="false""#));
}

#[test]
fn test_editable_mode_embeds_document_for_the_editor() {
    let rendered = render(&sample(), RenderMode::Editable);

    assert!(rendered.client_side);
    assert!(rendered.editable);
    assert!(rendered.html.contains(r#"contenteditable="true""#));
    assert!(rendered.html.contains(r#"data-editor="release-notes""#));
    assert!(rendered.html.contains("&quot;slug&quot;:&quot;release-notes&quot;"));
}

#[test]
fn test_blocks_and_marks_render_escaped() {
    let html = render(&sample(), RenderMode::Static).html;

    assert!(html.contains("<h2>What&#39;s new</h2>"));
    assert!(html.contains(r#"<a href="/docs/guide"><strong>guide</strong></a>"#));
    assert!(html.contains("<ol><li>one</li><li>&lt;two&gt;</li></ol>"));
    assert!(html.contains(r#"<code class="language-rust">let x = 1 &lt; 2;</code>"#));
}

fn linked(href: &str) -> Document {
    let mut document = sample();
    document.blocks = vec![
        Block::Paragraph {
            children: vec![Span {
                text: "click".to_string(),
                href: Some(href.to_string()),
                ..Span::default()
            }],
        },
        Block::Image {
            url: href.to_string(),
            alt: "picture".to_string(),
        },
    ];
    document
}

#[test]
fn test_script_urls_are_neutralized() {
    for href in [
        "javascript:alert(document.cookie)",
        "JavaScript:alert(1)",
        " java\tscript:alert(1)",
        "data:text/html,<script>alert(1)</script>",
    ] {
        let html = render(&linked(href), RenderMode::Static).html;
        assert!(!html.to_lowercase().contains("script:"), "{href}: {html}");
        assert!(!html.contains("data:text"), "{href}: {html}");

        // Client modes also carry the serialized document, but only as an escaped
        // attribute value; the live markup is neutralized all the same.
        for mode in [RenderMode::Static, RenderMode::ReadOnlyClient] {
            let html = render(&linked(href), mode).html;
            assert!(html.contains(r##"<a href="#">click</a>"##), "{href}: {html}");
            assert!(html.contains(r##"<img src="#" alt="picture">"##), "{href}: {html}");
        }
    }
}

#[test]
fn test_safe_urls_are_kept() {
    for href in [
        "https://example.com/a?b=c",
        "http://example.com",
        "mailto:team@example.com",
        "/docs/guide",
        "guide#intro",
        "?page=2",
        "/search?q=a:b",
    ] {
        let html = render(&linked(href), RenderMode::Static).html;
        assert!(
            html.contains(&format!(r#"<a href="{}">"#, escape(href))),
            "{href}: {html}"
        );
    }
}

#[test]
fn test_escape() {
    assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
}

#[test]
fn test_document_wire_format() {
    let json = r#"{
        "slug": "intro",
        "title": "Intro",
        "updated_at": "2026-01-05T09:30:00Z",
        "blocks": [
            { "type": "heading", "level": 1, "children": [{ "text": "Hello" }] },
            { "type": "code-block", "code": "fn main() {}" },
            { "type": "image", "url": "/a.png", "alt": "A" }
        ]
    }"#;

    let document: Document = serde_json::from_str(json).unwrap();

    assert_eq!(document.blocks.len(), 3);
    assert_eq!(
        document.blocks[1],
        Block::CodeBlock {
            language: None,
            code: "fn main() {}".to_string()
        }
    );
}

// --- Catalog ---

#[test]
fn test_catalog_lookup_and_order() {
    let mut second = sample();
    second.slug = "about".to_string();
    let catalog = DocumentCatalog::new([sample(), second]);

    assert_eq!(catalog.len(), 2);
    assert!(catalog.get("release-notes").is_some());
    assert!(catalog.get("missing").is_none());
    let slugs: Vec<&str> = catalog.list().map(|doc| doc.slug.as_str()).collect();
    assert_eq!(slugs, vec!["about", "release-notes"]);
}

#[test]
fn test_catalog_seed_file() {
    let path = env::temp_dir().join(format!("portal-seed-{}.json", std::process::id()));
    fs::write(&path, serde_json::to_string(&vec![sample()]).unwrap()).unwrap();

    let catalog = DocumentCatalog::from_seed_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(catalog.get("release-notes"), Some(&sample()));
}

#[test]
fn test_catalog_seed_errors() {
    let missing = DocumentCatalog::from_seed_file("/nonexistent/seed.json").unwrap_err();
    assert!(matches!(missing, CatalogError::Io { .. }));

    let path = env::temp_dir().join(format!("portal-bad-seed-{}.json", std::process::id()));
    fs::write(&path, "{ not json").unwrap();
    let malformed = DocumentCatalog::from_seed_file(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(malformed, CatalogError::Parse { .. }));
}

#[test]
fn test_welcome_catalog() {
    let catalog = DocumentCatalog::with_welcome();
    assert!(!catalog.is_empty());
    assert!(catalog.get("welcome").is_some());
}
