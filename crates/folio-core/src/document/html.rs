//! Legacy HTML input.
//!
//! A small, strict reader for the markup older posts were stored as. Anything
//! it cannot make sense of is reported as an error so the caller can keep the
//! raw text instead of guessing.

use thiserror::Error;

use super::{CodeBlockAttrs, ColorAttrs, HeadingAttrs, ImageAttrs, LinkAttrs, Mark, Node, OrderedListAttrs};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtmlParseError {
    #[error("unterminated markup starting at byte {0}")]
    Unterminated(usize),

    #[error("closing tag </{0}> does not match any open element")]
    UnexpectedClose(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest element nesting accepted, in line with serde_json's recursion limit
/// on the document tree form.
const MAX_DEPTH: usize = 128;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose end tag may be omitted.
const OPTIONAL_CLOSE: &[&str] = &["p", "li"];

/// Elements whose content is dropped entirely.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(super) fn parse(input: &str) -> Result<Vec<Node>, HtmlParseError> {
    let tokens = tokenize(input)?;
    let tree = build_tree(tokens)?;

    let mut mixed = Vec::new();
    convert(&tree, &[], &mut mixed);
    Ok(group_inline(mixed, Node::paragraph))
}

#[derive(Debug, PartialEq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

fn tokenize(src: &str) -> Result<Vec<Token>, HtmlParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < src.len() {
        let rest = &src[pos..];

        if let Some(body) = rest.strip_prefix("<!--") {
            let end = body.find("-->").ok_or(HtmlParseError::Unterminated(pos))?;
            pos += 4 + end + 3;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').ok_or(HtmlParseError::Unterminated(pos))?;
            pos += end + 1;
        } else if let Some(body) = rest.strip_prefix("</") {
            let end = body.find('>').ok_or(HtmlParseError::Unterminated(pos))?;
            tokens.push(Token::Close(body[..end].trim().to_ascii_lowercase()));
            pos += 2 + end + 1;
        } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (token, consumed) = open_tag(rest).ok_or(HtmlParseError::Unterminated(pos))?;
            pos += consumed;

            if let Token::Open {
                name,
                self_closing: false,
                ..
            } = &token
            {
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    pos += skip_raw_text(&src[pos..], name).ok_or(HtmlParseError::Unterminated(pos))?;
                    continue;
                }
            }
            tokens.push(token);
        } else {
            let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            let end = rest[first..]
                .find('<')
                .map(|idx| idx + first)
                .unwrap_or(rest.len());
            tokens.push(Token::Text(decode_entities(&rest[..end])));
            pos += end;
        }
    }

    Ok(tokens)
}

/// Length of the raw content plus its closing tag.
fn skip_raw_text(src: &str, name: &str) -> Option<usize> {
    let closing = format!("</{name}");
    let start = src.to_ascii_lowercase().find(&closing)?;
    let end = src[start..].find('>')?;
    Some(start + end + 1)
}

fn open_tag(src: &str) -> Option<(Token, usize)> {
    let bytes = src.as_bytes();
    let mut i = 1;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    let name = src[1..i].to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match *bytes.get(i)? {
            b'>' => {
                let token = Token::Open {
                    name,
                    attrs,
                    self_closing: false,
                };
                return Some((token, i + 1));
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                let token = Token::Open {
                    name,
                    attrs,
                    self_closing: true,
                };
                return Some((token, i + 2));
            }
            b'/' => i += 1,
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'=' | b'>' | b'/')
                {
                    i += 1;
                }
                let key = src[start..i].to_ascii_lowercase();
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }

                let mut value = String::new();
                if bytes.get(i) == Some(&b'=') {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    match *bytes.get(i)? {
                        quote @ (b'"' | b'\'') => {
                            let len = src[i + 1..].find(quote as char)?;
                            value = decode_entities(&src[i + 1..i + 1 + len]);
                            i += len + 2;
                        }
                        _ => {
                            let start = i;
                            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                                i += 1;
                            }
                            value = decode_entities(&src[start..i]);
                        }
                    }
                }

                if !key.is_empty() {
                    attrs.push((key, value));
                }
            }
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[derive(Debug)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Html>,
}

#[derive(Debug)]
enum Html {
    Element(Element),
    Text(String),
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn style(&self, property: &str) -> Option<String> {
        self.attr("style")?.split(';').find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let value = value.trim();
            (key.trim().eq_ignore_ascii_case(property) && !value.is_empty()).then(|| value.to_string())
        })
    }
}

fn current<'a>(root: &'a mut Vec<Html>, open: &'a mut [Element]) -> &'a mut Vec<Html> {
    match open.last_mut() {
        Some(element) => &mut element.children,
        None => root,
    }
}

fn close_top(root: &mut Vec<Html>, open: &mut Vec<Element>) {
    if let Some(element) = open.pop() {
        current(root, open).push(Html::Element(element));
    }
}

fn build_tree(tokens: Vec<Token>) -> Result<Vec<Html>, HtmlParseError> {
    let mut root = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => {
                let siblings = current(&mut root, &mut open);
                match siblings.last_mut() {
                    Some(Html::Text(previous)) => previous.push_str(&text),
                    _ => siblings.push(Html::Text(text)),
                }
            }
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                let element = Element {
                    name,
                    attrs,
                    children: Vec::new(),
                };
                if self_closing || VOID_ELEMENTS.contains(&element.name.as_str()) {
                    current(&mut root, &mut open).push(Html::Element(element));
                    continue;
                }
                let reopens = open.last().is_some_and(|top| top.name == element.name);
                if reopens && OPTIONAL_CLOSE.contains(&element.name.as_str()) {
                    close_top(&mut root, &mut open);
                }
                if open.len() >= MAX_DEPTH {
                    return Err(HtmlParseError::TooDeep(MAX_DEPTH));
                }
                open.push(element);
            }
            Token::Close(name) => {
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }
                let position = open
                    .iter()
                    .rposition(|el| el.name == name)
                    .ok_or_else(|| HtmlParseError::UnexpectedClose(name.clone()))?;
                if let Some(blocking) = open[position + 1..]
                    .iter()
                    .find(|el| !OPTIONAL_CLOSE.contains(&el.name.as_str()))
                {
                    return Err(HtmlParseError::Unclosed(blocking.name.clone()));
                }
                while open.len() > position {
                    close_top(&mut root, &mut open);
                }
            }
        }
    }

    while let Some(top) = open.last() {
        if !OPTIONAL_CLOSE.contains(&top.name.as_str()) {
            return Err(HtmlParseError::Unclosed(top.name.clone()));
        }
        close_top(&mut root, &mut open);
    }

    Ok(root)
}

// Conversion emits a mix of inline and block nodes; block containers then
// group consecutive inline runs into paragraphs (or headings).

fn convert(nodes: &[Html], marks: &[Mark], out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Html::Text(text) => {
                let text = collapse_whitespace(text);
                if !text.is_empty() {
                    out.push(Node::marked(text, marks.to_vec()));
                }
            }
            Html::Element(element) => convert_element(element, marks, out),
        }
    }
}

fn convert_element(el: &Element, marks: &[Mark], out: &mut Vec<Node>) {
    let name = el.name.as_str();
    match name {
        "p" => {
            let groups = group_inline(mixed_children(el, marks), Node::paragraph);
            if groups.is_empty() {
                out.push(Node::paragraph(Vec::new()));
            } else {
                out.extend(groups);
            }
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse().unwrap_or(1);
            let heading = |content: Vec<Node>| Node::Heading {
                attrs: HeadingAttrs { level },
                content,
            };
            let groups = group_inline(mixed_children(el, marks), &heading);
            if groups.is_empty() {
                out.push(heading(Vec::new()));
            } else {
                out.extend(groups);
            }
        }
        "ul" => out.push(Node::BulletList {
            content: blocks(el, marks),
        }),
        "ol" => out.push(Node::OrderedList {
            attrs: OrderedListAttrs {
                start: el.attr("start").and_then(|s| s.trim().parse().ok()).unwrap_or(1),
            },
            content: blocks(el, marks),
        }),
        "li" => out.push(Node::ListItem {
            content: blocks(el, marks),
        }),
        "blockquote" => out.push(Node::Blockquote {
            content: blocks(el, marks),
        }),
        "pre" => {
            let mut code = String::new();
            raw_text(&el.children, &mut code);
            out.push(Node::CodeBlock {
                attrs: CodeBlockAttrs {
                    language: code_language(el),
                },
                content: vec![Node::text(code)],
            });
        }
        "img" => {
            if let Some(src) = el.attr("src") {
                out.push(Node::Image {
                    attrs: ImageAttrs {
                        src: src.to_string(),
                        alt: el.attr("alt").map(str::to_string),
                        title: el.attr("title").map(str::to_string),
                    },
                });
            }
        }
        "hr" => out.push(Node::HorizontalRule),
        "br" => out.push(Node::HardBreak),
        "strong" | "b" => convert(&el.children, &with_mark(marks, Mark::Bold), out),
        "em" | "i" => convert(&el.children, &with_mark(marks, Mark::Italic), out),
        "u" => convert(&el.children, &with_mark(marks, Mark::Underline), out),
        "s" | "strike" | "del" => convert(&el.children, &with_mark(marks, Mark::Strike), out),
        "code" => convert(&el.children, &with_mark(marks, Mark::Code), out),
        "a" => match el.attr("href") {
            Some(href) => {
                let link = Mark::Link {
                    attrs: LinkAttrs {
                        href: href.to_string(),
                        target: el.attr("target").map(str::to_string),
                    },
                };
                convert(&el.children, &with_mark(marks, link), out);
            }
            None => convert(&el.children, marks, out),
        },
        "span" => match el.style("color") {
            Some(color) => {
                let style = Mark::TextStyle {
                    attrs: ColorAttrs { color: Some(color) },
                };
                convert(&el.children, &with_mark(marks, style), out);
            }
            None => convert(&el.children, marks, out),
        },
        "mark" => {
            let color = el
                .style("background-color")
                .or_else(|| el.attr("data-color").map(str::to_string));
            let highlight = Mark::Highlight {
                attrs: ColorAttrs { color },
            };
            convert(&el.children, &with_mark(marks, highlight), out);
        }
        _ => convert(&el.children, marks, out),
    }
}

fn mixed_children(el: &Element, marks: &[Mark]) -> Vec<Node> {
    let mut mixed = Vec::new();
    convert(&el.children, marks, &mut mixed);
    mixed
}

fn blocks(el: &Element, marks: &[Mark]) -> Vec<Node> {
    group_inline(mixed_children(el, marks), Node::paragraph)
}

fn with_mark(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    let mut next = marks.to_vec();
    next.push(mark);
    next
}

fn group_inline(mixed: Vec<Node>, wrap: impl Fn(Vec<Node>) -> Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut run = Vec::new();

    for node in mixed {
        if node.is_inline() {
            run.push(node);
        } else {
            flush_run(&mut run, &mut out, &wrap);
            out.push(node);
        }
    }
    flush_run(&mut run, &mut out, &wrap);
    out
}

fn flush_run(run: &mut Vec<Node>, out: &mut Vec<Node>, wrap: &impl Fn(Vec<Node>) -> Node) {
    let mut content = std::mem::take(run);
    trim_run(&mut content);
    if !content.is_empty() {
        out.push(wrap(content));
    }
}

/// Strips whitespace and line breaks from both ends of an inline run.
fn trim_run(run: &mut Vec<Node>) {
    while let Some(first) = run.first_mut() {
        match first {
            Node::HardBreak => {
                run.remove(0);
            }
            Node::Text { text, .. } => {
                let trimmed = text.trim_start();
                if trimmed.is_empty() {
                    run.remove(0);
                } else {
                    *text = trimmed.to_string();
                    break;
                }
            }
            _ => break,
        }
    }
    while let Some(last) = run.last_mut() {
        match last {
            Node::HardBreak => {
                run.pop();
            }
            Node::Text { text, .. } => {
                let trimmed = text.trim_end();
                if trimmed.is_empty() {
                    run.pop();
                } else {
                    *text = trimmed.to_string();
                    break;
                }
            }
            _ => break,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn raw_text(nodes: &[Html], out: &mut String) {
    for node in nodes {
        match node {
            Html::Text(text) => out.push_str(text),
            Html::Element(el) if el.name == "br" => out.push('\n'),
            Html::Element(el) => raw_text(&el.children, out),
        }
    }
}

fn code_language(pre: &Element) -> Option<String> {
    let class_language = |el: &Element| {
        el.attr("class")?
            .split_whitespace()
            .find_map(|class| class.strip_prefix("language-"))
            .map(str::to_string)
    };

    class_language(pre).or_else(|| {
        pre.children.iter().find_map(|child| match child {
            Html::Element(el) if el.name == "code" => class_language(el),
            _ => None,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_and_marks() {
        let nodes = parse("<p>Hello <strong>big <em>world</em></strong></p>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![
                Node::text("Hello "),
                Node::marked("big ", vec![Mark::Bold]),
                Node::marked("world", vec![Mark::Bold, Mark::Italic]),
            ])]
        );
    }

    #[test]
    fn test_optional_end_tags() {
        let nodes = parse("<ul><li>one<li>two</ul><p>a<p>b").unwrap();
        assert_eq!(nodes.len(), 3);
        match &nodes[0] {
            Node::BulletList { content } => assert_eq!(content.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_entities_decode() {
        let nodes = parse("<p>a &amp; b &lt;c&gt; &#39;d&#x27; &unknown; &</p>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![Node::text("a & b <c> 'd' &unknown; &")])]
        );
    }

    #[test]
    fn test_script_and_comments_dropped() {
        let nodes = parse("<p>keep</p><script>alert('x')</script><!-- note --><style>p{}</style>").unwrap();
        assert_eq!(nodes, vec![Node::paragraph(vec![Node::text("keep")])]);
    }

    #[test]
    fn test_inline_image_splits_paragraph() {
        let nodes = parse(r#"<p>before<img src="/a.png" alt="A">after</p>"#).unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[1], Node::Image { .. }));
    }

    #[test]
    fn test_code_block_keeps_whitespace() {
        let nodes = parse("<pre><code class=\"language-rust\">fn main() {\n    x &lt; y\n}</code></pre>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::CodeBlock {
                attrs: CodeBlockAttrs {
                    language: Some("rust".to_string())
                },
                content: vec![Node::text("fn main() {\n    x < y\n}")],
            }]
        );
    }

    #[test]
    fn test_colors_from_style() {
        let nodes = parse(r#"<p><span style="font-weight: bold; color: #c00">red</span></p>"#).unwrap();
        assert_eq!(
            nodes,
            vec![Node::paragraph(vec![Node::marked(
                "red",
                vec![Mark::TextStyle {
                    attrs: ColorAttrs {
                        color: Some("#c00".to_string())
                    }
                }]
            )])]
        );
    }

    #[test]
    fn test_malformed_markup_is_rejected() {
        assert_eq!(
            parse("<b><i>x</b></i>"),
            Err(HtmlParseError::Unclosed("i".to_string()))
        );
        assert_eq!(
            parse("text</div>"),
            Err(HtmlParseError::UnexpectedClose("div".to_string()))
        );
        assert_eq!(parse("<p class=\"x"), Err(HtmlParseError::Unterminated(0)));
    }

    #[test]
    fn test_nesting_depth_is_capped() {
        let nested = |depth: usize| format!("{}x{}", "<b>".repeat(depth), "</b>".repeat(depth));

        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        assert_eq!(
            parse(&nested(MAX_DEPTH + 1)),
            Err(HtmlParseError::TooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let nodes = parse("1 < 2 and ünïcode").unwrap();
        assert_eq!(nodes, vec![Node::paragraph(vec![Node::text("1 < 2 and ünïcode")])]);
    }
}
