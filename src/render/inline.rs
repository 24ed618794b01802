//! Inline rules: code spans, bold, italic, and link placeholders.
//!
//! Each rule only scans the gaps the previous one left, so a construct that
//! was already consumed is never matched again. Code spans go first, then
//! italic spans that wrap complete bold pairs, then bold (`**` or `__`,
//! leftmost wins), then italic. Italic content must start and end with a
//! non-space character. Markers that do not pair up stay in the text as
//! literal characters.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid code span regex"));

static STRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|__([^_]+)__").expect("valid strong regex")
});

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").expect("valid emphasis regex"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("valid placeholder regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inline {
    Text(String),
    /// Ordinal into the link table.
    Link(usize),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(Vec<Inline>),
}

pub(crate) fn parse(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    scan(
        &CODE_SPAN,
        text,
        &mut out,
        |caps, out| {
            let mut code = Vec::new();
            push_text(&caps[1], &mut code);
            out.push(Inline::Code(code));
        },
        parse_strong,
    );
    out
}

fn parse_strong(text: &str, out: &mut Vec<Inline>) {
    let Some(span) = find_wrapping_emphasis(text) else {
        parse_flat_strong(text, out);
        return;
    };
    if span.open > 0 {
        parse_flat_strong(&text[..span.open], out);
    }
    let mut children = Vec::new();
    parse_strong(&text[span.open + 1..span.close], &mut children);
    out.push(Inline::Emphasis(children));
    if span.close + 1 < text.len() {
        parse_strong(&text[span.close + 1..], out);
    }
}

/// Byte offsets of the single `*` markers around an italic span.
#[derive(Debug, PartialEq, Eq)]
struct EmphasisSpan {
    open: usize,
    close: usize,
}

/// Find the leftmost `*...*` whose content holds at least one complete
/// `**...**` pair and no other `*`. Plain italic is left to [`EMPHASIS`].
fn find_wrapping_emphasis(text: &str) -> Option<EmphasisSpan> {
    let bytes = text.as_bytes();
    let star = |i: usize| bytes.get(i) == Some(&b'*');
    let space = |i: usize| bytes.get(i).is_some_and(|b| b.is_ascii_whitespace());
    let next_star = |from: usize| bytes[from.min(bytes.len())..].iter().position(|&b| b == b'*').map(|p| p + from);

    let mut search = 0;
    'openers: while let Some(open) = next_star(search) {
        search = open + 1;
        let lone = !star(open + 1) && (open == 0 || !star(open - 1));
        if !lone || open + 1 >= bytes.len() || space(open + 1) {
            continue;
        }

        let mut cursor = open + 1;
        let mut has_bold = false;
        while let Some(at) = next_star(cursor) {
            if star(at + 1) {
                // Opening `**`: its closing pair must follow with content between.
                match next_star(at + 2) {
                    Some(end) if end > at + 2 && star(end + 1) => {
                        has_bold = true;
                        cursor = end + 2;
                    }
                    _ => continue 'openers,
                }
            } else {
                if has_bold && !space(at - 1) {
                    return Some(EmphasisSpan { open, close: at });
                }
                // Plain italic or no match; let the flat rules have it.
                search = at + 1;
                continue 'openers;
            }
        }
        return None;
    }
    None
}

fn parse_flat_strong(text: &str, out: &mut Vec<Inline>) {
    scan(
        &STRONG,
        text,
        out,
        |caps, out| {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let mut children = Vec::new();
            parse_emphasis(inner, &mut children);
            out.push(Inline::Strong(children));
        },
        parse_emphasis,
    );
}

fn parse_emphasis(text: &str, out: &mut Vec<Inline>) {
    scan(
        &EMPHASIS,
        text,
        out,
        |caps, out| {
            let mut children = Vec::new();
            push_text(&caps[1], &mut children);
            out.push(Inline::Emphasis(children));
        },
        push_text,
    );
}

/// Plain run: split out link placeholders, keep the rest as text.
fn push_text(text: &str, out: &mut Vec<Inline>) {
    scan(
        &PLACEHOLDER,
        text,
        out,
        |caps, out| match caps[1].parse::<usize>() {
            Ok(ordinal) => out.push(Inline::Link(ordinal)),
            Err(_) => out.push(Inline::Text(caps[0].to_string())),
        },
        |gap, out| out.push(Inline::Text(gap.to_string())),
    );
}

/// Walk the matches of `re` in `text`, handing matches and the gaps between
/// them to separate callbacks in source order.
fn scan(
    re: &Regex,
    text: &str,
    out: &mut Vec<Inline>,
    on_match: impl Fn(&Captures<'_>, &mut Vec<Inline>),
    on_gap: impl Fn(&str, &mut Vec<Inline>),
) {
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            on_gap(&text[last..whole.start()], out);
        }
        on_match(&caps, out);
        last = whole.end();
    }
    if last < text.len() {
        on_gap(&text[last..], out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::links::{CLOSE, OPEN};

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello"), vec![text("hello")]);
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            parse("a **b** c *d*"),
            vec![
                text("a "),
                Inline::Strong(vec![text("b")]),
                text(" c "),
                Inline::Emphasis(vec![text("d")]),
            ]
        );
        assert_eq!(parse("__b__"), vec![Inline::Strong(vec![text("b")])]);
    }

    #[test]
    fn test_italic_inside_bold() {
        assert_eq!(
            parse("**x *y* z**"),
            vec![Inline::Strong(vec![
                text("x "),
                Inline::Emphasis(vec![text("y")]),
                text(" z"),
            ])]
        );
    }

    #[test]
    fn test_bold_inside_italic() {
        assert_eq!(
            parse("*a **b** c*"),
            vec![Inline::Emphasis(vec![
                text("a "),
                Inline::Strong(vec![text("b")]),
                text(" c"),
            ])]
        );
        assert_eq!(
            parse("x *a **b***"),
            vec![
                text("x "),
                Inline::Emphasis(vec![text("a "), Inline::Strong(vec![text("b")])]),
            ]
        );
    }

    #[test]
    fn test_bold_pairs_are_not_read_as_italic() {
        assert_eq!(
            parse("**a** b **c**"),
            vec![
                Inline::Strong(vec![text("a")]),
                text(" b "),
                Inline::Strong(vec![text("c")]),
            ]
        );
        assert_eq!(
            parse("*x* and *y **z** w*"),
            vec![
                Inline::Emphasis(vec![text("x")]),
                text(" and "),
                Inline::Emphasis(vec![
                    text("y "),
                    Inline::Strong(vec![text("z")]),
                    text(" w"),
                ]),
            ]
        );
    }

    #[test]
    fn test_find_wrapping_emphasis() {
        assert_eq!(
            find_wrapping_emphasis("*a **b** c*"),
            Some(EmphasisSpan { open: 0, close: 10 })
        );
        assert_eq!(find_wrapping_emphasis("*plain*"), None);
        assert_eq!(find_wrapping_emphasis("**a*b**c*"), None);
        assert_eq!(find_wrapping_emphasis("* a **b** *"), None);
    }

    #[test]
    fn test_italic_needs_non_space_edges() {
        assert_eq!(parse("2 * 3 * 4"), vec![text("2 * 3 * 4")]);
        assert_eq!(parse("* *"), vec![text("* *")]);
        assert_eq!(parse("*a b*"), vec![Inline::Emphasis(vec![text("a b")])]);
    }

    #[test]
    fn test_code_span_is_not_rescanned() {
        assert_eq!(
            parse("`*not em*` and *em*"),
            vec![
                Inline::Code(vec![text("*not em*")]),
                text(" and "),
                Inline::Emphasis(vec![text("em")]),
            ]
        );
    }

    #[test]
    fn test_overlapping_markers_fall_back_to_literal() {
        assert_eq!(
            parse("**a*b**c*"),
            vec![Inline::Strong(vec![text("a*b")]), text("c*")]
        );
    }

    #[test]
    fn test_unpaired_markers_stay_literal() {
        assert_eq!(parse("2 * 3"), vec![text("2 * 3")]);
        assert_eq!(parse("`open"), vec![text("`open")]);
        assert_eq!(parse("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_placeholders_become_links() {
        let input = format!("see {OPEN}0{CLOSE} and **{OPEN}1{CLOSE}**");
        assert_eq!(
            parse(&input),
            vec![
                text("see "),
                Inline::Link(0),
                text(" and "),
                Inline::Strong(vec![Inline::Link(1)]),
            ]
        );
    }
}
