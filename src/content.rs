use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Document Value ---

/// Document
///
/// A rich-text document as produced by the editor component. The guard never looks
/// inside; only the renderers below do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub slug: String,
    pub title: String,
    pub blocks: Vec<Block>,
    pub updated_at: DateTime<Utc>,
}

/// Block
///
/// Top-level editor nodes. Serialized with a `type` tag, e.g. `{"type":"heading","level":2,...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Heading { level: u8, children: Vec<Span> },
    Paragraph { children: Vec<Span> },
    Quote { children: Vec<Span> },
    CodeBlock {
        #[serde(default)]
        language: Option<String>,
        code: String,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<Vec<Span>>,
    },
    Image { url: String, alt: String },
}

/// Span
///
/// A run of text sharing the same marks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Span {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

// --- Rendering Variants ---

/// RenderMode
///
/// Which rendering strategy a page wants for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Client-side editor with edit affordances.
    Editable,
    /// Server-rendered HTML only. No client code, no mutation capability.
    Static,
    /// Client-side editor with edit affordances disabled.
    ReadOnlyClient,
}

impl RenderMode {
    pub fn runs_client_side(&self) -> bool {
        !matches!(self, RenderMode::Static)
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, RenderMode::Editable)
    }
}

/// RenderedContent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub mode: RenderMode,
    pub html: String,
    pub client_side: bool,
    pub editable: bool,
}

/// render
///
/// Select the rendering strategy for `mode`. Not authorization-aware: callers must only
/// reach this through an appropriately guarded layout.
///
/// Client modes wrap the markup in an editor mount point carrying the serialized document
/// for hydration; static mode emits the markup alone.
pub fn render(document: &Document, mode: RenderMode) -> RenderedContent {
    let body = render_blocks(&document.blocks);

    let html = match mode {
        RenderMode::Static => format!(r#"<article class="document">{body}</article>"#),
        RenderMode::Editable | RenderMode::ReadOnlyClient => {
            // Plain data; serialization cannot fail.
            let payload = serde_json::to_string(document).unwrap_or_default();
            format!(
                r#"<div class="editor" data-editor="{}" data-readonly="{}" contenteditable="{}" data-document="{}">{body}</div>"#,
                escape(&document.slug),
                !mode.is_editable(),
                mode.is_editable(),
                escape(&payload),
            )
        }
    };

    RenderedContent {
        mode,
        html,
        client_side: mode.runs_client_side(),
        editable: mode.is_editable(),
    }
}

fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, children } => {
                let level = (*level).clamp(1, 6);
                html.push_str(&format!("<h{level}>{}</h{level}>", render_spans(children)));
            }
            Block::Paragraph { children } => {
                html.push_str(&format!("<p>{}</p>", render_spans(children)));
            }
            Block::Quote { children } => {
                html.push_str(&format!("<blockquote>{}</blockquote>", render_spans(children)));
            }
            Block::CodeBlock { language, code } => match language {
                Some(language) => html.push_str(&format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape(language),
                    escape(code)
                )),
                None => html.push_str(&format!("<pre><code>{}</code></pre>", escape(code))),
            },
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                html.push_str(&format!("<{tag}>"));
                for item in items {
                    html.push_str(&format!("<li>{}</li>", render_spans(item)));
                }
                html.push_str(&format!("</{tag}>"));
            }
            Block::Image { url, alt } => {
                html.push_str(&format!(
                    r#"<img src="{}" alt="{}">"#,
                    escape(safe_url(url)),
                    escape(alt)
                ));
            }
        }
    }
    html
}

fn render_spans(spans: &[Span]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &Span) -> String {
    let mut html = escape(&span.text);
    if span.code {
        html = format!("<code>{html}</code>");
    }
    if span.italic {
        html = format!("<em>{html}</em>");
    }
    if span.bold {
        html = format!("<strong>{html}</strong>");
    }
    if let Some(href) = &span.href {
        html = format!(r#"<a href="{}">{html}</a>"#, escape(safe_url(href)));
    }
    html
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Neutralize link and image targets. Relative references and `http`, `https`, `mailto`
/// pass through; any other scheme (`javascript:`, `data:`, ...) becomes `#`.
fn safe_url(raw: &str) -> &str {
    // Browsers drop tabs, newlines and other control characters while parsing a scheme.
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let head = cleaned.split(['/', '?', '#']).next().unwrap_or_default();
    match head.split_once(':') {
        None => raw,
        Some((scheme, _)) if SAFE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => raw,
        Some((scheme, _)) => {
            tracing::warn!(scheme, "unsafe url scheme dropped from document");
            "#"
        }
    }
}

/// HTML-escape text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
