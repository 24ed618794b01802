//! Link extraction.
//!
//! Links are pulled out of the raw text before any other rule sees it and
//! stored in a side table. The text keeps an opaque placeholder built from two
//! private-use code points around the table ordinal, so later passes can
//! neither match inside a URL nor forge a link of their own.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{escape_attr, escape_html};

/// Opening sentinel of a link placeholder.
pub(crate) const OPEN: char = '\u{E000}';
/// Closing sentinel of a link placeholder.
pub(crate) const CLOSE: char = '\u{E001}';

static EXPLICIT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\n]+)\)").expect("valid link regex"));

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s<>\[\]\x{E000}\x{E001}]+").expect("valid url regex")
});

/// A link captured from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub href: String,
    pub text: String,
}

impl Link {
    /// Anchor markup opened in a new browsing context, without opener or
    /// referrer.
    pub(crate) fn to_html(&self) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            escape_attr(&self.href),
            escape_html(&self.text)
        )
    }
}

/// Side table of extracted links, keyed by ordinal.
#[derive(Debug, Default)]
pub(crate) struct LinkTable {
    links: Vec<Link>,
}

impl LinkTable {
    fn insert(&mut self, link: Link) -> String {
        let ordinal = self.links.len();
        self.links.push(link);
        format!("{OPEN}{ordinal}{CLOSE}")
    }

    pub(crate) fn get(&self, ordinal: usize) -> Option<&Link> {
        self.links.get(ordinal)
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Replace every link in `text` with a placeholder and return the rewritten
/// text together with the table the placeholders point into.
pub(crate) fn extract_links(text: &str) -> (String, LinkTable) {
    let mut table = LinkTable::default();

    // Sentinels already in the input would read as placeholders.
    let cleaned: String = text
        .chars()
        .map(|c| if c == OPEN || c == CLOSE { '\u{FFFD}' } else { c })
        .collect();

    let explicit = EXPLICIT_LINK.replace_all(&cleaned, |caps: &Captures<'_>| {
        let target = caps[2].trim();
        if is_allowed_target(target) {
            table.insert(Link {
                href: target.to_string(),
                text: caps[1].to_string(),
            })
        } else {
            tracing::debug!(href = target, "Leaving link with disallowed scheme as text");
            caps[0].to_string()
        }
    });

    let bare = BARE_URL.replace_all(&explicit, |caps: &Captures<'_>| {
        let (url, rest) = split_trailing_punctuation(&caps[0]);
        if url.ends_with("://") {
            return caps[0].to_string();
        }
        let placeholder = table.insert(Link {
            href: url.to_string(),
            text: url.to_string(),
        });
        format!("{placeholder}{rest}")
    });

    (bare.into_owned(), table)
}

/// Only web, mail and phone schemes are linked; scheme-less targets are
/// treated as relative.
fn is_allowed_target(target: &str) -> bool {
    if target.is_empty() {
        return false;
    }
    let Some(colon) = target.find(':') else {
        return true;
    };
    let head = &target[..colon];
    // A colon after a path, query or fragment delimiter is not a scheme.
    if head.contains(['/', '?', '#']) {
        return true;
    }
    matches!(
        head.to_ascii_lowercase().as_str(),
        "http" | "https" | "mailto" | "tel"
    )
}

/// Split sentence punctuation and markup characters off the end of a bare
/// URL. A closing parenthesis stays when it balances one inside the URL.
fn split_trailing_punctuation(url: &str) -> (&str, &str) {
    let mut end = url.len();
    while let Some(last) = url[..end].chars().next_back() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '*' | '`' => true,
            ')' => {
                let head = &url[..end];
                head.matches(')').count() > head.matches('(').count()
            }
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    url.split_at(end)
}
