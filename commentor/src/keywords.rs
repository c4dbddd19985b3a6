//! Keyword-to-link rewriting over generated comments.
//!
//! Keywords are matched whole-word and case-insensitively, longest keyword
//! first so a shorter keyword that is a substring of a longer one never
//! shadows it. Text already rewritten for one keyword is masked from later
//! keywords' matchers, so rendered markup is never rewritten a second time.

use regex::Regex;
use std::cmp::Reverse;
use std::str::FromStr;
use tracing::warn;

use common::KeywordEntry;

/// Output syntax for [`apply_keyword_links`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFormat {
    Html,
    Markdown,
    Bbcode,
}

impl FromStr for LinkFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(LinkFormat::Html),
            "markdown" => Ok(LinkFormat::Markdown),
            "bbcode" => Ok(LinkFormat::Bbcode),
            other => Err(format!(
                "unknown format '{other}' (expected html, markdown or bbcode)"
            )),
        }
    }
}

/// Rewrite whole-word occurrences of each enabled keyword into a link in
/// the requested syntax. Keyword and URL values are inserted as-is, without
/// markup escaping.
pub fn apply_keyword_links(
    comment: &str,
    entries: &[KeywordEntry],
    format: LinkFormat,
) -> String {
    rewrite(comment, entries, |matched, entry| match format {
        LinkFormat::Html => format!("<a href=\"{}\">{}</a>", entry.url, matched),
        LinkFormat::Markdown => format!("[{}]({})", matched, entry.url),
        LinkFormat::Bbcode => format!("[url={}]{}[/url]", entry.url, matched),
    })
}

/// Wrap enabled keywords in a styled span for the in-panel preview.
/// Display-only HTML fragment, not meant to be copied out.
pub fn highlight(comment: &str, entries: &[KeywordEntry]) -> String {
    rewrite(comment, entries, |matched, _entry| {
        format!(
            "<span class=\"bg-yellow-200 text-yellow-900 rounded px-0.5\">{}</span>",
            matched
        )
    })
}

// A piece of the working string. Rendered pieces are opaque to later
// keywords' matchers.
enum Segment {
    Raw(String),
    Rendered(String),
}

fn rewrite<F>(comment: &str, entries: &[KeywordEntry], render: F) -> String
where
    F: Fn(&str, &KeywordEntry) -> String,
{
    let mut enabled: Vec<&KeywordEntry> = entries
        .iter()
        .filter(|e| e.enabled && !e.keyword.trim().is_empty())
        .collect();
    // Stable sort: duplicates and equal-length keywords keep insertion order
    enabled.sort_by_key(|e| Reverse(e.keyword.len()));

    let mut segments = vec![Segment::Raw(comment.to_string())];
    for entry in enabled {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(&entry.keyword));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(keyword = %entry.keyword, error = %e, "skipping unmatchable keyword");
                continue;
            }
        };

        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Rendered(s) => next.push(Segment::Rendered(s)),
                Segment::Raw(s) => split_matches(&re, s, entry, &render, &mut next),
            }
        }
        segments = next;
    }

    segments
        .into_iter()
        .map(|s| match s {
            Segment::Raw(s) | Segment::Rendered(s) => s,
        })
        .collect()
}

fn split_matches<F>(
    re: &Regex,
    text: String,
    entry: &KeywordEntry,
    render: &F,
    out: &mut Vec<Segment>,
) where
    F: Fn(&str, &KeywordEntry) -> String,
{
    let mut last = 0;
    for m in re.find_iter(&text) {
        if m.start() > last {
            out.push(Segment::Raw(text[last..m.start()].to_string()));
        }
        out.push(Segment::Rendered(render(m.as_str(), entry)));
        last = m.end();
    }
    if last == 0 {
        out.push(Segment::Raw(text));
    } else if last < text.len() {
        out.push(Segment::Raw(text[last..].to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keyword: &str, url: &str) -> KeywordEntry {
        KeywordEntry::new(keyword, url)
    }

    #[test]
    fn renders_all_three_formats() {
        let entries = vec![entry("rust", "https://rust-lang.org")];

        assert_eq!(
            apply_keyword_links("I like rust a lot", &entries, LinkFormat::Html),
            "I like <a href=\"https://rust-lang.org\">rust</a> a lot"
        );
        assert_eq!(
            apply_keyword_links("I like rust a lot", &entries, LinkFormat::Markdown),
            "I like [rust](https://rust-lang.org) a lot"
        );
        assert_eq!(
            apply_keyword_links("I like rust a lot", &entries, LinkFormat::Bbcode),
            "I like [url=https://rust-lang.org]rust[/url] a lot"
        );
    }

    #[test]
    fn longer_keyword_wins_at_overlap() {
        let entries = vec![
            entry("AI", "https://a"),
            entry("Generative AI", "https://b"),
        ];
        let out = apply_keyword_links("I love Generative AI tools", &entries, LinkFormat::Html);

        assert!(out.contains("<a href=\"https://b\">Generative AI</a> tools"));
        // The shorter keyword must not re-wrap text inside the longer one's link
        assert!(!out.contains("https://a"));
    }

    #[test]
    fn shorter_keyword_still_matches_elsewhere() {
        let entries = vec![
            entry("AI", "https://a"),
            entry("Generative AI", "https://b"),
        ];
        let out = apply_keyword_links(
            "Generative AI is one branch of AI",
            &entries,
            LinkFormat::Html,
        );
        assert_eq!(
            out,
            "<a href=\"https://b\">Generative AI</a> is one branch of <a href=\"https://a\">AI</a>"
        );
    }

    #[test]
    fn match_is_case_insensitive_and_preserves_case() {
        let entries = vec![entry("rust", "https://r")];
        let out = apply_keyword_links("Rust is great, so is RUST", &entries, LinkFormat::Html);
        assert_eq!(
            out,
            "<a href=\"https://r\">Rust</a> is great, so is <a href=\"https://r\">RUST</a>"
        );
    }

    #[test]
    fn matches_whole_words_only() {
        let entries = vec![entry("cat", "https://c")];
        let out = apply_keyword_links("concatenate the catalog, cat", &entries, LinkFormat::Html);
        assert_eq!(
            out,
            "concatenate the catalog, <a href=\"https://c\">cat</a>"
        );
    }

    #[test]
    fn disabled_entries_are_excluded() {
        let entries = vec![KeywordEntry {
            keyword: "foo".into(),
            url: "url".into(),
            enabled: false,
        }];
        assert_eq!(
            apply_keyword_links("foo bar", &entries, LinkFormat::Html),
            "foo bar"
        );
        assert_eq!(highlight("foo bar", &entries), "foo bar");
    }

    #[test]
    fn blank_keywords_are_skipped() {
        let entries = vec![entry("  ", "https://x"), entry("bar", "https://b")];
        assert_eq!(
            apply_keyword_links("foo bar", &entries, LinkFormat::Html),
            "foo <a href=\"https://b\">bar</a>"
        );
    }

    #[test]
    fn duplicate_keywords_apply_in_sequence() {
        // First duplicate consumes the match; the second finds nothing left
        let entries = vec![entry("foo", "https://first"), entry("foo", "https://second")];
        assert_eq!(
            apply_keyword_links("foo", &entries, LinkFormat::Html),
            "<a href=\"https://first\">foo</a>"
        );
    }

    #[test]
    fn highlight_wraps_in_span() {
        let entries = vec![entry("rust", "https://r")];
        let out = highlight("rust rocks", &entries);
        assert!(out.starts_with("<span class=\"bg-yellow-200"));
        assert!(out.contains(">rust</span> rocks"));
        // No link in the preview rendering
        assert!(!out.contains("href"));
    }

    #[test]
    fn format_parses_from_str() {
        assert_eq!("HTML".parse::<LinkFormat>().unwrap(), LinkFormat::Html);
        assert_eq!(
            "markdown".parse::<LinkFormat>().unwrap(),
            LinkFormat::Markdown
        );
        assert_eq!("bbcode".parse::<LinkFormat>().unwrap(), LinkFormat::Bbcode);
        assert!("rtf".parse::<LinkFormat>().is_err());
    }
}
