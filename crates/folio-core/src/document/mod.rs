//! Rich-text document model.
//!
//! A document is a tree of typed block nodes whose leaves are text runs
//! carrying inline marks. The canonical form is the JSON tree produced by the
//! editor (`{"type":"doc","content":[...]}`); HTML is accepted as a legacy
//! input and produced for read-only display.

mod html;
mod render;

use serde::{Deserialize, Serialize};

pub use html::HtmlParseError;
pub use render::render;

/// Reading speed used by [`estimate_reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// Root of a rich-text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDocument", into = "RawDocument")]
pub struct EditorDocument {
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Heading {
        attrs: HeadingAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    BulletList {
        #[serde(default)]
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(default)]
        attrs: OrderedListAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    CodeBlock {
        #[serde(default)]
        attrs: CodeBlockAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Image {
        attrs: ImageAttrs,
    },
    HorizontalRule,
    HardBreak,
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
}

/// Inline formatting applied to a text run.
///
/// The derived ordering is the canonical order marks are stored and rendered in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link {
        attrs: LinkAttrs,
    },
    TextStyle {
        #[serde(default)]
        attrs: ColorAttrs,
    },
    Highlight {
        #[serde(default)]
        attrs: ColorAttrs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedListAttrs {
    #[serde(default = "first_item")]
    pub start: u32,
}

impl Default for OrderedListAttrs {
    fn default() -> Self {
        Self { start: 1 }
    }
}

fn first_item() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColorAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Wire shape of the document root.
#[derive(Serialize, Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<Node>,
}

impl TryFrom<RawDocument> for EditorDocument {
    type Error = String;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        if raw.kind != "doc" {
            return Err(format!("expected a `doc` root, found `{}`", raw.kind));
        }
        Ok(Self {
            content: raw.content,
        })
    }
}

impl From<EditorDocument> for RawDocument {
    fn from(doc: EditorDocument) -> Self {
        Self {
            kind: "doc".to_string(),
            content: doc.content,
        }
    }
}

/// Input accepted by [`to_canonical`].
#[derive(Debug, Clone, Copy)]
pub enum DocumentSource<'a> {
    /// An already-parsed tree.
    Tree(&'a EditorDocument),
    /// Stored content: a JSON tree or legacy HTML.
    Serialized(&'a str),
}

/// Converts any accepted input into the canonical document tree.
///
/// Never fails: content that is neither a document tree nor parseable HTML is
/// kept verbatim as a single text node. Idempotent.
pub fn to_canonical(source: DocumentSource<'_>) -> EditorDocument {
    match source {
        DocumentSource::Tree(doc) => doc.clone().normalized(),
        DocumentSource::Serialized(raw) => parse_serialized(raw).normalized(),
    }
}

/// Estimated minutes to read, at [`WORDS_PER_MINUTE`], never less than one.
pub fn estimate_reading_time(source: DocumentSource<'_>) -> u32 {
    let words = match source {
        DocumentSource::Tree(doc) => doc.word_count(),
        DocumentSource::Serialized(_) => to_canonical(source).word_count(),
    };
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn parse_serialized(raw: &str) -> EditorDocument {
    if raw.trim_start().starts_with('{') {
        return match serde_json::from_str::<EditorDocument>(raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, "content is not a document tree, keeping it as text");
                EditorDocument::from_text(raw)
            }
        };
    }

    match html::parse(raw) {
        Ok(content) => EditorDocument { content },
        Err(e) => {
            tracing::debug!(error = %e, "legacy HTML could not be parsed, keeping it as text");
            EditorDocument::from_text(raw)
        }
    }
}

impl EditorDocument {
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// A document holding a single empty paragraph.
    pub fn empty() -> Self {
        Self {
            content: vec![Node::Paragraph {
                content: Vec::new(),
            }],
        }
    }

    /// Wraps raw text, unmodified, in a single paragraph.
    pub fn from_text(text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(text)]
        };
        Self {
            content: vec![Node::Paragraph { content }],
        }
    }

    /// Canonical form of this document.
    pub fn normalized(self) -> Self {
        Self {
            content: normalize_blocks(self.content),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// True when the document has no visible text, image or rule.
    pub fn is_empty(&self) -> bool {
        !self.content.iter().any(has_substance)
    }

    /// Text content, one line per block.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.content {
            collect_text(node, &mut out);
        }
        out.trim_end().to_string()
    }

    pub fn word_count(&self) -> usize {
        self.plain_text().split_whitespace().count()
    }

    /// Leading text of the document, cut at a word boundary near `max_chars`.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self.plain_text().split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() <= max_chars {
            return text;
        }

        let cut: String = text.chars().take(max_chars).collect();
        let head = match cut.rfind(' ') {
            Some(idx) if idx > 0 => &cut[..idx],
            _ => cut.as_str(),
        };
        let head = head.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
        format!("{head}…")
    }
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::Paragraph { content }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Node::Text { .. } | Node::HardBreak)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { content }
            | Node::Heading { content, .. }
            | Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content }
            | Node::Blockquote { content }
            | Node::CodeBlock { content, .. } => content,
            Node::Image { .. } | Node::HorizontalRule | Node::HardBreak | Node::Text { .. } => &[],
        }
    }

    fn into_children(self) -> Vec<Node> {
        match self {
            Node::Paragraph { content }
            | Node::Heading { content, .. }
            | Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content }
            | Node::Blockquote { content }
            | Node::CodeBlock { content, .. } => content,
            Node::Image { .. } | Node::HorizontalRule | Node::HardBreak | Node::Text { .. } => {
                Vec::new()
            }
        }
    }
}

fn has_substance(node: &Node) -> bool {
    match node {
        Node::Text { text, .. } => !text.trim().is_empty(),
        Node::Image { .. } | Node::HorizontalRule => true,
        Node::HardBreak => false,
        other => other.children().iter().any(has_substance),
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::HardBreak => out.push('\n'),
        Node::Image { .. } | Node::HorizontalRule => {}
        container => {
            for child in container.children() {
                collect_text(child, out);
            }
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

// Canonicalization. Every pass below is idempotent: its output contains none of
// the shapes it rewrites.

fn normalize_blocks(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::with_capacity(nodes.len());
    let mut inline = Vec::new();

    for node in nodes {
        if node.is_inline() {
            inline.push(node);
            continue;
        }
        flush_paragraph(&mut inline, &mut blocks);

        match node {
            Node::Paragraph { content } => hoist_atoms(content, Node::paragraph, &mut blocks),
            Node::Heading { attrs, content } => {
                let attrs = HeadingAttrs {
                    level: attrs.level.clamp(1, 6),
                };
                hoist_atoms(
                    content,
                    |content| Node::Heading {
                        attrs,
                        content,
                    },
                    &mut blocks,
                );
            }
            Node::BulletList { content } => {
                let items = normalize_items(content);
                if !items.is_empty() {
                    blocks.push(Node::BulletList { content: items });
                }
            }
            Node::OrderedList { attrs, content } => {
                let items = normalize_items(content);
                if !items.is_empty() {
                    blocks.push(Node::OrderedList {
                        attrs,
                        content: items,
                    });
                }
            }
            // A list item outside a list contributes its blocks directly.
            Node::ListItem { content } => blocks.extend(normalize_blocks(content)),
            Node::Blockquote { content } => blocks.push(Node::Blockquote {
                content: normalize_blocks(content),
            }),
            Node::CodeBlock { attrs, content } => {
                let mut code = String::new();
                code_text(&content, &mut code);
                let language = attrs
                    .language
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty());
                let content = if code.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::text(code)]
                };
                blocks.push(Node::CodeBlock {
                    attrs: CodeBlockAttrs { language },
                    content,
                });
            }
            Node::Image { attrs } => blocks.extend(normalize_image(attrs)),
            Node::HorizontalRule => blocks.push(Node::HorizontalRule),
            Node::HardBreak | Node::Text { .. } => {}
        }
    }
    flush_paragraph(&mut inline, &mut blocks);

    if blocks.is_empty() {
        blocks.push(Node::Paragraph {
            content: Vec::new(),
        });
    }
    blocks
}

fn normalize_image(attrs: ImageAttrs) -> Option<Node> {
    let src = attrs.src.trim().to_string();
    (!src.is_empty()).then(|| Node::Image {
        attrs: ImageAttrs {
            src,
            alt: attrs.alt.filter(|a| !a.is_empty()),
            title: attrs.title.filter(|t| !t.is_empty()),
        },
    })
}

/// Images and rules inside a text block are lifted out beside it, splitting
/// the block around them.
fn hoist_atoms(content: Vec<Node>, wrap: impl Fn(Vec<Node>) -> Node, blocks: &mut Vec<Node>) {
    let is_atom = |node: &Node| matches!(node, Node::Image { .. } | Node::HorizontalRule);
    if !content.iter().any(is_atom) {
        blocks.push(wrap(normalize_inline(content)));
        return;
    }

    let mut run = Vec::new();
    for node in content {
        if !is_atom(&node) {
            run.push(node);
            continue;
        }
        let inline = normalize_inline(std::mem::take(&mut run));
        if !inline.is_empty() {
            blocks.push(wrap(inline));
        }
        match node {
            Node::Image { attrs } => blocks.extend(normalize_image(attrs)),
            other => blocks.push(other),
        }
    }
    let inline = normalize_inline(run);
    if !inline.is_empty() {
        blocks.push(wrap(inline));
    }
}

fn flush_paragraph(inline: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    if inline.is_empty() {
        return;
    }
    let content = normalize_inline(std::mem::take(inline));
    if !content.is_empty() {
        blocks.push(Node::Paragraph { content });
    }
}

fn normalize_items(nodes: Vec<Node>) -> Vec<Node> {
    let mut items = Vec::with_capacity(nodes.len());
    let mut loose = Vec::new();

    for node in nodes {
        match node {
            Node::ListItem { content } => {
                if !loose.is_empty() {
                    items.push(Node::ListItem {
                        content: normalize_blocks(std::mem::take(&mut loose)),
                    });
                }
                items.push(Node::ListItem {
                    content: normalize_blocks(content),
                });
            }
            other => loose.push(other),
        }
    }
    if !loose.is_empty() {
        items.push(Node::ListItem {
            content: normalize_blocks(loose),
        });
    }
    items
}

fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        push_inline(&mut out, node);
    }
    out
}

fn push_inline(out: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text { text, marks } => {
            if text.is_empty() {
                return;
            }
            let marks = canonical_marks(marks);
            if let Some(Node::Text {
                text: previous,
                marks: previous_marks,
            }) = out.last_mut()
            {
                if *previous_marks == marks {
                    previous.push_str(&text);
                    return;
                }
            }
            out.push(Node::Text { text, marks });
        }
        Node::HardBreak => out.push(Node::HardBreak),
        // Blocks nested in inline content keep only their text.
        other => {
            for child in other.into_children() {
                push_inline(out, child);
            }
        }
    }
}

fn canonical_marks(mut marks: Vec<Mark>) -> Vec<Mark> {
    marks.retain(|mark| match mark {
        Mark::Link { attrs } => !attrs.href.trim().is_empty(),
        Mark::TextStyle { attrs } => attrs.color.is_some(),
        _ => true,
    });
    marks.sort();
    marks.dedup();
    marks
}

fn code_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            Node::HardBreak => out.push('\n'),
            other => code_text(other.children(), out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r##"{
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Intro"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "text", "text": "bold", "marks": [{"type": "bold"}]},
                    {"type": "text", "text": " and "},
                    {"type": "text", "text": "red", "marks": [{"type": "textStyle", "attrs": {"color": "#ff0000"}}, {"type": "italic"}]}
                ]},
                {"type": "bulletList", "content": [
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "one"}]}]},
                    {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "two"}]}]}
                ]},
                {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}"}]},
                {"type": "image", "attrs": {"src": "/cover.png", "alt": "Cover"}},
                {"type": "horizontalRule"}
            ]
        }"##
    }

    #[test]
    fn test_json_round_trip_keeps_structure() {
        let doc = to_canonical(DocumentSource::Serialized(sample_json()));
        let json = doc.to_json().unwrap();
        let reparsed: EditorDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(doc.content.len(), 6);
    }

    #[test]
    fn test_to_canonical_is_idempotent() {
        let inputs = [
            sample_json(),
            "<p>Hello <b>world</b></p><ul><li>a</li><li>b</li></ul>",
            "plain text without markup",
            "<p>unclosed <b>bold</p>",
            r#"{"type":"doc","content":[]}"#,
            r#"{"type":"doc","content":[{"type":"text","text":"loose"},{"type":"text","text":" inline"}]}"#,
            "",
        ];
        for input in inputs {
            let once = to_canonical(DocumentSource::Serialized(input));
            let twice = to_canonical(DocumentSource::Tree(&once));
            assert_eq!(once, twice, "tree idempotence for {input:?}");

            let json = once.to_json().unwrap();
            let via_json = to_canonical(DocumentSource::Serialized(&json));
            assert_eq!(once, via_json, "json idempotence for {input:?}");
        }
    }

    #[test]
    fn test_adjacent_text_with_same_marks_merges() {
        let doc = EditorDocument::new(vec![Node::paragraph(vec![
            Node::marked("a", vec![Mark::Bold, Mark::Italic]),
            Node::marked("b", vec![Mark::Italic, Mark::Bold, Mark::Bold]),
            Node::text(""),
            Node::text("c"),
        ])])
        .normalized();

        assert_eq!(
            doc.content,
            vec![Node::paragraph(vec![
                Node::marked("ab", vec![Mark::Bold, Mark::Italic]),
                Node::text("c"),
            ])]
        );
    }

    #[test]
    fn test_inline_at_block_level_is_wrapped() {
        let doc = EditorDocument::new(vec![Node::text("loose"), Node::HorizontalRule]).normalized();
        assert_eq!(
            doc.content,
            vec![
                Node::paragraph(vec![Node::text("loose")]),
                Node::HorizontalRule
            ]
        );
    }

    #[test]
    fn test_heading_level_clamped() {
        let doc = EditorDocument::new(vec![Node::Heading {
            attrs: HeadingAttrs { level: 9 },
            content: vec![Node::text("deep")],
        }])
        .normalized();
        assert!(matches!(
            doc.content[0],
            Node::Heading {
                attrs: HeadingAttrs { level: 6 },
                ..
            }
        ));
    }

    #[test]
    fn test_unparseable_input_becomes_opaque_text() {
        let raw = "<div>never <em>closed</div>";
        let doc = to_canonical(DocumentSource::Serialized(raw));
        assert_eq!(doc, EditorDocument::from_text(raw));

        let broken_json = r#"{"type":"doc","content":[{"type":"mystery"}]}"#;
        let doc = to_canonical(DocumentSource::Serialized(broken_json));
        assert_eq!(doc.plain_text(), broken_json);
    }

    #[test]
    fn test_deeply_nested_html_becomes_opaque_text() {
        let raw = format!("{}x{}", "<b>".repeat(20_000), "</b>".repeat(20_000));
        let doc = to_canonical(DocumentSource::Serialized(&raw));
        assert_eq!(doc, EditorDocument::from_text(&raw));

        let shallow = format!("{}x{}", "<b>".repeat(100), "</b>".repeat(100));
        let doc = to_canonical(DocumentSource::Serialized(&shallow));
        assert_eq!(
            doc.content,
            vec![Node::paragraph(vec![Node::marked("x", vec![Mark::Bold])])]
        );
    }

    #[test]
    fn test_images_and_rules_in_paragraphs_are_hoisted() {
        let json = r#"{"type":"doc","content":[
            {"type":"paragraph","content":[
                {"type":"text","text":"before"},
                {"type":"image","attrs":{"src":"/inline.png"}},
                {"type":"text","text":"after"},
                {"type":"horizontalRule"}
            ]},
            {"type":"heading","attrs":{"level":2},"content":[
                {"type":"image","attrs":{"src":"  "}},
                {"type":"text","text":"Title"}
            ]}
        ]}"#;
        let doc = to_canonical(DocumentSource::Serialized(json));

        assert_eq!(
            doc.content,
            vec![
                Node::paragraph(vec![Node::text("before")]),
                Node::Image {
                    attrs: ImageAttrs {
                        src: "/inline.png".to_string(),
                        alt: None,
                        title: None,
                    }
                },
                Node::paragraph(vec![Node::text("after")]),
                Node::HorizontalRule,
                Node::Heading {
                    attrs: HeadingAttrs { level: 2 },
                    content: vec![Node::text("Title")],
                },
            ]
        );
        assert_eq!(to_canonical(DocumentSource::Tree(&doc)), doc);
    }

    #[test]
    fn test_is_empty() {
        assert!(EditorDocument::empty().is_empty());
        assert!(to_canonical(DocumentSource::Serialized("<p>   </p><p><br></p>")).is_empty());
        assert!(!to_canonical(DocumentSource::Serialized("<p>x</p>")).is_empty());
        assert!(!to_canonical(DocumentSource::Serialized(r#"<img src="/a.png">"#)).is_empty());
    }

    #[test]
    fn test_reading_time_minimum_is_one() {
        assert_eq!(estimate_reading_time(DocumentSource::Tree(&EditorDocument::empty())), 1);
        assert_eq!(estimate_reading_time(DocumentSource::Serialized("")), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let words_201 = vec!["word"; 201].join(" ");
        let html = format!("<p>{words_201}</p>");
        assert_eq!(estimate_reading_time(DocumentSource::Serialized(&html)), 2);

        let words_200 = vec!["word"; 200].join(" ");
        let doc = EditorDocument::from_text(&words_200);
        assert_eq!(estimate_reading_time(DocumentSource::Tree(&doc)), 1);
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let doc = EditorDocument::from_text("The quick brown fox jumps over the lazy dog");
        assert_eq!(doc.excerpt(100), "The quick brown fox jumps over the lazy dog");
        assert_eq!(doc.excerpt(18), "The quick brown…");
    }

    #[test]
    fn test_plain_text_separates_blocks() {
        let doc = to_canonical(DocumentSource::Serialized("<h1>Title</h1><p>Body</p>"));
        assert_eq!(doc.plain_text(), "Title\nBody");
    }
}
