//! Markdown-lite renderer.
//!
//! Turns assistant text written in a small markdown dialect into an HTML
//! fragment that is safe to insert into a host page. The dialect covers
//! headings (`#` to `###`), bulleted and numbered lists, paragraphs with line
//! breaks, bold, italic, code spans and links. Anything else comes out as
//! escaped literal text.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. links are extracted into a side table ([`links`]),
//! 2. lines are classified and grouped into blocks ([`blocks`]),
//! 3. inline rules run inside each block ([`inline`]),
//! 4. the node tree is serialized; text is escaped here and link placeholders
//!    are swapped for their anchors.
//!
//! Every character of the input reaches the output either through an escaped
//! text node or an escaped link attribute, so the only tags in the result are
//! `p`, `h1`-`h3`, `ul`, `ol`, `li`, `strong`, `em`, `code`, `a` and `br`.

mod blocks;
mod inline;
pub(crate) mod links;

use blocks::Block;
use inline::Inline;
use links::LinkTable;

/// Render assistant text to safe markup. Never fails.
///
/// Empty or whitespace-only input renders to an empty string; anything else
/// starts with a block element.
pub fn render(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    if normalized.trim().is_empty() {
        return String::new();
    }

    let (text, links) = links::extract_links(&normalized);
    let mut html = String::with_capacity(text.len() + text.len() / 4);

    for block in blocks::group(&text) {
        match block {
            Block::Heading(level, content) => {
                html.push_str(&format!("<h{level}>"));
                write_inline(&mut html, &inline::parse(content), &links);
                html.push_str(&format!("</h{level}>"));
            }
            Block::List(kind, items) => {
                html.push_str(&format!("<{}>", kind.tag()));
                for item in items {
                    html.push_str("<li>");
                    write_inline(&mut html, &inline::parse(item), &links);
                    html.push_str("</li>");
                }
                html.push_str(&format!("</{}>", kind.tag()));
            }
            Block::Paragraph(lines) => {
                html.push_str("<p>");
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        html.push_str("<br>");
                    }
                    write_inline(&mut html, &inline::parse(line), &links);
                }
                html.push_str("</p>");
            }
        }
    }

    html
}

/// Markup for a trusted static string: escaped, in a single paragraph.
pub fn literal_paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

/// Escape text content for HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_inline(html: &mut String, nodes: &[Inline], links: &LinkTable) {
    for node in nodes {
        match node {
            Inline::Text(text) => html.push_str(&escape_html(text)),
            Inline::Link(ordinal) => {
                if let Some(link) = links.get(*ordinal) {
                    html.push_str(&link.to_html());
                }
            }
            Inline::Strong(children) => wrap(html, "strong", children, links),
            Inline::Emphasis(children) => wrap(html, "em", children, links),
            Inline::Code(children) => wrap(html, "code", children, links),
        }
    }
}

fn wrap(html: &mut String, tag: &str, children: &[Inline], links: &LinkTable) {
    html.push('<');
    html.push_str(tag);
    html.push('>');
    write_inline(html, children, links);
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ANCHOR_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer""#;

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("  \n\n \t"), "");
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(render("hello"), "<p>hello</p>");
        assert_eq!(render("line one\nline two"), "<p>line one<br>line two</p>");
        assert_eq!(render("p1\n\n\np2"), "<p>p1</p><p>p2</p>");
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(render("a\r\nb\r\n\r\nc"), "<p>a<br>b</p><p>c</p>");
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("# T\n\nBody"), "<h1>T</h1><p>Body</p>");
        assert_eq!(
            render("## **Bold** title\n### Small"),
            "<h2><strong>Bold</strong> title</h2><h3>Small</h3>"
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            render("- a\n- b\n1. c"),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>"
        );
        assert_eq!(
            render("1. one\n\n2. two"),
            "<ol><li>one</li><li>two</li></ol>"
        );
        assert_eq!(render("* *it*"), "<ul><li><em>it</em></li></ul>");
    }

    #[test]
    fn test_nested_bold_and_italic() {
        assert_eq!(
            render("*a **b** c*"),
            "<p><em>a <strong>b</strong> c</em></p>"
        );
        assert_eq!(
            render("**a *b* c**"),
            "<p><strong>a <em>b</em> c</strong></p>"
        );
    }

    #[test]
    fn test_spaced_asterisks_stay_literal() {
        assert_eq!(render("2 * 3 * 4"), "<p>2 * 3 * 4</p>");
        assert_eq!(render("* * *"), "<ul><li>* *</li></ul>");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            render("[a](http://x)"),
            format!(r#"<p><a href="http://x" {ANCHOR_ATTRS}>a</a></p>"#)
        );
        assert_eq!(
            render("see https://example.com."),
            format!(
                r#"<p>see <a href="https://example.com" {ANCHOR_ATTRS}>https://example.com</a>.</p>"#
            )
        );
    }

    #[test]
    fn test_link_attributes_are_escaped() {
        assert_eq!(
            render(r#"[q](http://x?a=1&b="2")"#),
            format!(r#"<p><a href="http://x?a=1&amp;b=&quot;2&quot;" {ANCHOR_ATTRS}>q</a></p>"#)
        );
        assert_eq!(
            render("[<b>hi</b>](http://x)"),
            format!(r#"<p><a href="http://x" {ANCHOR_ATTRS}>&lt;b&gt;hi&lt;/b&gt;</a></p>"#)
        );
    }

    #[test]
    fn test_url_is_not_reinterpreted_as_emphasis() {
        assert_eq!(
            render("http://x.com/a_b_c*d*"),
            format!(r#"<p><a href="http://x.com/a_b_c*d" {ANCHOR_ATTRS}>http://x.com/a_b_c*d</a>*</p>"#)
        );
    }

    #[test]
    fn test_script_is_escaped() {
        assert_eq!(
            render("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
        assert_eq!(render("a & b"), "<p>a &amp; b</p>");
    }

    #[test]
    fn test_code_span() {
        assert_eq!(render("`*not em*`"), "<p><code>*not em*</code></p>");
        assert_eq!(render("`<br>`"), "<p><code>&lt;br&gt;</code></p>");
    }

    #[test]
    fn test_overlap_is_well_nested() {
        assert_eq!(render("**a*b**c*"), "<p><strong>a*b</strong>c*</p>");
    }

    #[test]
    fn test_literal_paragraph() {
        assert_eq!(literal_paragraph("I'm <offline>"), "<p>I'm &lt;offline&gt;</p>");
    }
}
