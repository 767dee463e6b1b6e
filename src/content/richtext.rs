//! Rich-text rendering
//!
//! Converts the CMS's structured rich-text nodes into HTML. Text content is
//! escaped; inline spans become `<strong>`/`<em>`/`<a>` markup. Malformed
//! input (out-of-range spans, missing text, unknown kinds) renders
//! best-effort and never panics.

use crate::cms::{BlockKind, RichTextNode, Span, SpanKind};

/// Render a sequence of rich-text nodes to HTML
pub fn as_html(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    // kind of the list element currently open, if any
    let mut open_list: Option<&'static str> = None;

    for node in nodes {
        let wanted_list = match node.kind {
            BlockKind::ListItem => Some("ul"),
            BlockKind::OListItem => Some("ol"),
            _ => None,
        };

        if open_list != wanted_list {
            if let Some(tag) = open_list.take() {
                out.push_str(&format!("</{tag}>\n"));
            }
            if let Some(tag) = wanted_list {
                out.push_str(&format!("<{tag}>\n"));
                open_list = Some(tag);
            }
        }

        render_block(node, &mut out);
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{tag}>\n"));
    }

    out
}

fn render_block(node: &RichTextNode, out: &mut String) {
    let text = node.text.as_deref().unwrap_or("");
    let inner = spans_to_html(text, &node.spans);

    let block = match node.kind {
        BlockKind::Paragraph => format!("<p>{inner}</p>\n"),
        BlockKind::Heading1 => format!("<h1>{inner}</h1>\n"),
        BlockKind::Heading2 => format!("<h2>{inner}</h2>\n"),
        BlockKind::Heading3 => format!("<h3>{inner}</h3>\n"),
        BlockKind::Heading4 => format!("<h4>{inner}</h4>\n"),
        BlockKind::Heading5 => format!("<h5>{inner}</h5>\n"),
        BlockKind::Heading6 => format!("<h6>{inner}</h6>\n"),
        BlockKind::ListItem | BlockKind::OListItem => format!("<li>{inner}</li>\n"),
        BlockKind::Preformatted => format!("<pre>{inner}</pre>\n"),
        BlockKind::Image => match node.url.as_deref() {
            Some(url) => format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape_html(url),
                escape_html(node.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        // unknown block kinds degrade to a paragraph when they carry text
        BlockKind::Other => {
            if text.is_empty() {
                String::new()
            } else {
                format!("<p>{inner}</p>\n")
            }
        }
    };

    out.push_str(&block);
}

/// Apply inline spans over a block's text by character offsets
fn spans_to_html(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    // clamp offsets and drop degenerate or unrenderable spans
    let mut tagged: Vec<(usize, usize, String, &'static str)> = spans
        .iter()
        .filter_map(|span| {
            let start = span.start.min(len);
            let end = span.end.min(len);
            if start >= end {
                return None;
            }
            let (open, close) = match span.kind {
                SpanKind::Strong => ("<strong>".to_string(), "</strong>"),
                SpanKind::Em => ("<em>".to_string(), "</em>"),
                SpanKind::Hyperlink => {
                    let url = span
                        .data
                        .as_ref()
                        .and_then(|d| d.url.as_deref())
                        .unwrap_or("#");
                    (format!("<a href=\"{}\">", escape_html(url)), "</a>")
                }
                SpanKind::Other => return None,
            };
            Some((start, end, open, close))
        })
        .collect();

    // outermost spans first so nesting closes in the right order
    tagged.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut out = String::new();
    for i in 0..=len {
        for (_, end, _, close) in tagged.iter().rev() {
            if *end == i {
                out.push_str(close);
            }
        }
        for (start, _, open, _) in tagged.iter() {
            if *start == i {
                out.push_str(open);
            }
        }
        if i < len {
            push_escaped(chars[i], &mut out);
        }
    }
    out
}

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(c, &mut out);
    }
    out
}

fn push_escaped(c: char, out: &mut String) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::SpanData;

    fn node(kind: BlockKind, text: &str) -> RichTextNode {
        RichTextNode {
            kind,
            text: Some(text.to_string()),
            spans: Vec::new(),
            url: None,
            alt: None,
        }
    }

    fn span(start: usize, end: usize, kind: SpanKind) -> Span {
        Span {
            start,
            end,
            kind,
            data: None,
        }
    }

    #[test]
    fn test_paragraph_with_strong_span() {
        let mut n = node(BlockKind::Paragraph, "Hello world");
        n.spans.push(span(0, 5, SpanKind::Strong));
        assert_eq!(as_html(&[n]), "<p><strong>Hello</strong> world</p>\n");
    }

    #[test]
    fn test_hyperlink_span() {
        let mut n = node(BlockKind::Paragraph, "see docs");
        n.spans.push(Span {
            start: 4,
            end: 8,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                url: Some("https://example.com".to_string()),
            }),
        });
        assert_eq!(
            as_html(&[n]),
            "<p>see <a href=\"https://example.com\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_nested_spans_close_in_order() {
        let mut n = node(BlockKind::Paragraph, "abc");
        n.spans.push(span(0, 3, SpanKind::Strong));
        n.spans.push(span(1, 2, SpanKind::Em));
        assert_eq!(
            as_html(&[n]),
            "<p><strong>a<em>b</em>c</strong></p>\n"
        );
    }

    #[test]
    fn test_list_grouping() {
        let nodes = vec![
            node(BlockKind::ListItem, "one"),
            node(BlockKind::ListItem, "two"),
            node(BlockKind::OListItem, "first"),
            node(BlockKind::Paragraph, "tail"),
        ];
        assert_eq!(
            as_html(&nodes),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<ol>\n<li>first</li>\n</ol>\n<p>tail</p>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let n = node(BlockKind::Paragraph, "a < b & c");
        assert_eq!(as_html(&[n]), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_image_node() {
        let n = RichTextNode {
            kind: BlockKind::Image,
            text: None,
            spans: Vec::new(),
            url: Some("https://example.com/pic.png".to_string()),
            alt: Some("a picture".to_string()),
        };
        assert_eq!(
            as_html(&[n]),
            "<img src=\"https://example.com/pic.png\" alt=\"a picture\">\n"
        );
    }

    #[test]
    fn test_malformed_spans_do_not_panic() {
        let mut n = node(BlockKind::Paragraph, "short");
        n.spans.push(span(2, 99, SpanKind::Strong)); // clamped to text end
        n.spans.push(span(4, 1, SpanKind::Em)); // inverted, dropped
        assert_eq!(as_html(&[n]), "<p>sh<strong>ort</strong></p>\n");
    }

    #[test]
    fn test_unknown_kind_with_text_degrades_to_paragraph() {
        let n = node(BlockKind::Other, "kept");
        assert_eq!(as_html(&[n]), "<p>kept</p>\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(as_html(&[]), "");
    }

    #[test]
    fn test_multibyte_offsets_are_char_based() {
        let mut n = node(BlockKind::Paragraph, "café au lait");
        n.spans.push(span(0, 4, SpanKind::Strong));
        assert_eq!(as_html(&[n]), "<p><strong>café</strong> au lait</p>\n");
    }
}
