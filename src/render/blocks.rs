//! Line classification and block grouping.

/// Which marker opened a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    /// `* ` or `- `
    Bulleted,
    /// `1. `, `2. `, ...
    Numbered,
}

impl ListKind {
    pub(crate) fn tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// A single source line after the line-anchored rules ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    Heading(u8, &'a str),
    Item(ListKind, &'a str),
    Text(&'a str),
}

/// Block-level node; inline content is still unparsed source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    Heading(u8, &'a str),
    List(ListKind, Vec<&'a str>),
    Paragraph(Vec<&'a str>),
}

pub(crate) fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(content) = non_empty_rest(line, prefix) {
            return LineKind::Heading(level, content);
        }
    }

    for prefix in ["* ", "- "] {
        if let Some(content) = non_empty_rest(line, prefix) {
            return LineKind::Item(ListKind::Bulleted, content);
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(content) = non_empty_rest(&line[digits..], ". ") {
            return LineKind::Item(ListKind::Numbered, content);
        }
    }

    LineKind::Text(line)
}

fn non_empty_rest<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}

/// Group lines into blocks.
///
/// Runs of list items with the same marker kind share one list; blank lines
/// between items do not end it. Text lines accumulate into a paragraph until
/// a blank line or any other block ends it.
pub(crate) fn group(text: &str) -> Vec<Block<'_>> {
    let mut blocks: Vec<Block<'_>> = Vec::new();
    let mut paragraph_open = false;

    for line in text.lines() {
        match classify(line) {
            LineKind::Blank => paragraph_open = false,
            LineKind::Heading(level, content) => {
                paragraph_open = false;
                blocks.push(Block::Heading(level, content));
            }
            LineKind::Item(kind, content) => {
                paragraph_open = false;
                match blocks.last_mut() {
                    Some(Block::List(open_kind, items)) if *open_kind == kind => items.push(content),
                    _ => blocks.push(Block::List(kind, vec![content])),
                }
            }
            LineKind::Text(content) => match blocks.last_mut() {
                Some(Block::Paragraph(lines)) if paragraph_open => lines.push(content),
                _ => {
                    paragraph_open = true;
                    blocks.push(Block::Paragraph(vec![content]));
                }
            },
        }
    }

    blocks
}
