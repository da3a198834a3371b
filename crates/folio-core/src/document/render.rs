//! HTML output for read-only display.

use super::{EditorDocument, Mark, Node};

/// Renders a document as HTML. Text and attribute values are escaped; links
/// with an unsafe scheme and colors that are not plain values are dropped.
pub fn render(doc: &EditorDocument) -> String {
    let mut out = String::new();
    for node in &doc.content {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Paragraph { content } => wrap("p", content, out),
        Node::Heading { attrs, content } => {
            let tag = format!("h{}", attrs.level.clamp(1, 6));
            wrap(&tag, content, out);
        }
        Node::BulletList { content } => wrap("ul", content, out),
        Node::OrderedList { attrs, content } => {
            if attrs.start == 1 {
                out.push_str("<ol>");
            } else {
                out.push_str(&format!("<ol start=\"{}\">", attrs.start));
            }
            render_children(content, out);
            out.push_str("</ol>");
        }
        Node::ListItem { content } => wrap("li", content, out),
        Node::Blockquote { content } => wrap("blockquote", content, out),
        Node::CodeBlock { attrs, content } => {
            out.push_str("<pre><code");
            if let Some(language) = &attrs.language {
                out.push_str(" class=\"language-");
                escape_into(language, out);
                out.push('"');
            }
            out.push('>');
            render_children(content, out);
            out.push_str("</code></pre>");
        }
        Node::Image { attrs } => {
            out.push_str("<img src=\"");
            escape_into(&attrs.src, out);
            out.push('"');
            if let Some(alt) = &attrs.alt {
                out.push_str(" alt=\"");
                escape_into(alt, out);
                out.push('"');
            }
            if let Some(title) = &attrs.title {
                out.push_str(" title=\"");
                escape_into(title, out);
                out.push('"');
            }
            out.push('>');
        }
        Node::HorizontalRule => out.push_str("<hr>"),
        Node::HardBreak => out.push_str("<br>"),
        Node::Text { text, marks } => {
            let opened: Vec<&'static str> = marks.iter().filter_map(|m| open_mark(m, out)).collect();
            escape_into(text, out);
            for tag in opened.iter().rev() {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn wrap(tag: &str, content: &[Node], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_children(content, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_children(content: &[Node], out: &mut String) {
    for child in content {
        render_node(child, out);
    }
}

/// Writes the opening tag for `mark` and returns the element to close, if any.
fn open_mark(mark: &Mark, out: &mut String) -> Option<&'static str> {
    let tag = match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Strike => "s",
        Mark::Code => "code",
        Mark::Link { attrs } => {
            if !is_safe_href(&attrs.href) {
                return None;
            }
            out.push_str("<a href=\"");
            escape_into(attrs.href.trim(), out);
            out.push('"');
            if let Some(target) = &attrs.target {
                out.push_str(" target=\"");
                escape_into(target, out);
                out.push('"');
            }
            out.push_str(" rel=\"noopener noreferrer\">");
            return Some("a");
        }
        Mark::TextStyle { attrs } => {
            let color = attrs.color.as_deref().filter(|c| is_safe_color(c))?;
            out.push_str("<span style=\"color: ");
            escape_into(color, out);
            out.push_str("\">");
            return Some("span");
        }
        Mark::Highlight { attrs } => {
            match attrs.color.as_deref().filter(|c| is_safe_color(c)) {
                Some(color) => {
                    out.push_str("<mark data-color=\"");
                    escape_into(color, out);
                    out.push_str("\" style=\"background-color: ");
                    escape_into(color, out);
                    out.push_str("\">");
                }
                None => out.push_str("<mark>"),
            }
            return Some("mark");
        }
    };
    out.push('<');
    out.push_str(tag);
    out.push('>');
    Some(tag)
}

fn is_safe_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }
    match href.split_once(':') {
        // A colon after a path or query separator is not a scheme.
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            let scheme = scheme.to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

fn is_safe_color(color: &str) -> bool {
    !color.is_empty()
        && color
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-'))
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        CodeBlockAttrs, DocumentSource, HeadingAttrs, ImageAttrs, LinkAttrs, to_canonical,
    };

    fn link(href: &str) -> Mark {
        Mark::Link {
            attrs: LinkAttrs {
                href: href.to_string(),
                target: None,
            },
        }
    }

    #[test]
    fn test_marks_nest_in_canonical_order() {
        let doc = EditorDocument::new(vec![Node::paragraph(vec![
            Node::text("Hello "),
            Node::marked("world", vec![Mark::Bold, Mark::Italic]),
        ])]);
        assert_eq!(render(&doc), "<p>Hello <strong><em>world</em></strong></p>");
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = EditorDocument::from_text("<script>alert(\"x\")</script> & more");
        assert_eq!(
            render(&doc),
            "<p>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn test_unsafe_links_are_dropped() {
        let doc = EditorDocument::new(vec![Node::paragraph(vec![
            Node::marked("bad", vec![link("javascript:alert(1)")]),
            Node::text(" "),
            Node::marked("good", vec![link("https://example.com/?q=a&b")]),
            Node::text(" "),
            Node::marked("local", vec![link("/posts/a:b")]),
        ])]);
        assert_eq!(
            render(&doc),
            "<p>bad <a href=\"https://example.com/?q=a&amp;b\" rel=\"noopener noreferrer\">good</a> \
             <a href=\"/posts/a:b\" rel=\"noopener noreferrer\">local</a></p>"
        );
    }

    #[test]
    fn test_rendered_html_parses_back_to_same_document() {
        let doc = EditorDocument::new(vec![
            Node::Heading {
                attrs: HeadingAttrs { level: 2 },
                content: vec![Node::text("Intro")],
            },
            Node::paragraph(vec![
                Node::text("Hello "),
                Node::marked("world", vec![Mark::Bold]),
                Node::text(" see "),
                Node::marked("docs", vec![link("https://docs.rs")]),
            ]),
            Node::BulletList {
                content: vec![
                    Node::ListItem {
                        content: vec![Node::paragraph(vec![Node::text("one")])],
                    },
                    Node::ListItem {
                        content: vec![Node::paragraph(vec![Node::text("two")])],
                    },
                ],
            },
            Node::CodeBlock {
                attrs: CodeBlockAttrs {
                    language: Some("rust".to_string()),
                },
                content: vec![Node::text("let x = 1 < 2;\nprintln!(\"{x}\");")],
            },
            Node::Image {
                attrs: ImageAttrs {
                    src: "/cover.png".to_string(),
                    alt: Some("Cover".to_string()),
                    title: None,
                },
            },
            Node::HorizontalRule,
        ])
        .normalized();

        let html = render(&doc);
        let reparsed = to_canonical(DocumentSource::Serialized(&html));
        assert_eq!(reparsed, doc);
    }
}
