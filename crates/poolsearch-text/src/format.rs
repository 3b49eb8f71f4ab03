//! HTML rendering of a match set.
//!
//! Each hit becomes a `file://` link titled by the file's base name,
//! followed by the stored chunk text with every query term wrapped in a
//! bold span. An empty match set renders a distinct "Not found" document
//! instead of an empty list.

use std::path::Path;

use crate::query::MatchSet;

const HIGHLIGHT_OPEN: &str = "<span style=\" font-weight:600;\">";
const HIGHLIGHT_CLOSE: &str = "</span>";

const DOC_HEAD: &str = concat!(
    "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.0//EN\" \"http://www.w3.org/TR/REC-html40/strict.dtd\">\n",
    "<html><head><title>Result</title><style type=\"text/css\">\n",
    "p, li { white-space: pre-wrap; }\n",
    "</style></head><body style=\" font-family:'Sans Serif'; font-size:9pt; font-weight:400; font-style:normal;\">\n",
);

const PARA_STYLE: &str = " margin-top:0px; margin-bottom:0px; margin-left:0px; margin-right:0px;";

pub fn format(matches: &MatchSet, query_string: &str) -> String {
    let mut html = String::from(DOC_HEAD);
    if matches.is_empty() {
        html.push_str(&format!(
            "<p align=\"center\" style=\"{PARA_STYLE}\">Not found</p></body></html>"
        ));
        return html;
    }
    for hit in &matches.hits {
        let display_name = Path::new(&hit.doc_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| hit.doc_path.clone());
        let uri = format!("file://{}", hit.doc_path);
        let body = highlight_terms(&escape_markup(&hit.content), query_string);

        html.push_str(&format!(
            "<p style=\"{PARA_STYLE}\"><a href=\"{uri}\">\
             <span style=\" font-size:12pt; text-decoration: underline; color:#0000ff;\">\
             {}</span></a></p>\n",
            escape_markup(&display_name)
        ));
        html.push_str(&format!("<p style=\"{PARA_STYLE}\">{body}</p>\n"));
        html.push_str(&format!("<p style=\"{PARA_STYLE}\"><br /></p>\n"));
    }
    html.push_str("</body></html>");
    html
}

/// Escape the characters reserved by the markup before inserting chunk
/// text into it.
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap every case-insensitive occurrence of every whitespace-delimited
/// query term in highlight markers.
fn highlight_terms(text: &str, query_string: &str) -> String {
    let mut out = text.to_string();
    for term in query_string.split_whitespace() {
        out = wrap_occurrences(&out, &escape_markup(term));
    }
    out
}

/// One left-to-right pass: after inserting markers around a match, the
/// scan resumes right behind them so overlapping matches cannot loop.
fn wrap_occurrences(text: &str, term: &str) -> String {
    if term.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some((start, end)) = find_ci(text, term, pos) {
        out.push_str(&text[pos..start]);
        out.push_str(HIGHLIGHT_OPEN);
        out.push_str(&text[start..end]);
        out.push_str(HIGHLIGHT_CLOSE);
        pos = end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Case-insensitive search by char, returning the byte range of the first
/// occurrence at or after `from`.
fn find_ci(text: &str, term: &str, from: usize) -> Option<(usize, usize)> {
    let term_chars: Vec<char> = term.chars().collect();
    for (offset, _) in text[from..].char_indices() {
        let start = from + offset;
        let mut haystack = text[start..].chars();
        let mut matched = 0usize;
        let mut end = start;
        for tc in &term_chars {
            match haystack.next() {
                Some(hc) if hc.to_lowercase().eq(tc.to_lowercase()) => {
                    matched += 1;
                    end += hc.len_utf8();
                }
                _ => break,
            }
        }
        if matched == term_chars.len() {
            return Some((start, end));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchSet, SearchHit};

    fn one_hit(content: &str) -> MatchSet {
        MatchSet {
            hits: vec![SearchHit {
                score: 1.0,
                doc_path: "/home/someone/notes/todo.txt".to_string(),
                content: content.to_string(),
            }],
        }
    }

    #[test]
    fn empty_match_set_renders_not_found() {
        let html = format(&MatchSet::default(), "anything");
        assert!(html.contains("Not found"));
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn highlights_exactly_the_sought_term() {
        let html = format(&one_hit("the cat sat"), "cat");
        let marked = format!("{HIGHLIGHT_OPEN}cat{HIGHLIGHT_CLOSE}");
        assert!(html.contains(&format!("the {marked} sat")));
    }

    #[test]
    fn highlighting_is_case_insensitive() {
        let html = format(&one_hit("the cat sat"), "CAT");
        assert!(html.contains(&format!("{HIGHLIGHT_OPEN}cat{HIGHLIGHT_CLOSE}")));
    }

    #[test]
    fn repeated_occurrences_are_each_wrapped() {
        let wrapped = wrap_occurrences("abcabc", "abc");
        assert_eq!(
            wrapped,
            format!("{HIGHLIGHT_OPEN}abc{HIGHLIGHT_CLOSE}{HIGHLIGHT_OPEN}abc{HIGHLIGHT_CLOSE}")
        );
    }

    #[test]
    fn markup_characters_in_chunks_are_escaped() {
        let html = format(&one_hit("a < b && c > d"), "nomatch");
        assert!(html.contains("a &lt; b &amp;&amp; c &gt; d"));
    }

    #[test]
    fn terms_with_markup_characters_still_match() {
        let html = format(&one_hit("AT&T network"), "at&t");
        assert!(html.contains(&format!("{HIGHLIGHT_OPEN}AT&amp;T{HIGHLIGHT_CLOSE}")));
    }

    #[test]
    fn link_uses_file_uri_and_base_name() {
        let html = format(&one_hit("anything"), "x");
        assert!(html.contains("href=\"file:///home/someone/notes/todo.txt\""));
        assert!(html.contains("todo.txt"));
    }

    #[test]
    fn overlapping_matches_resume_after_the_marker() {
        // "aa" in "aaa": first match [0,2), scan resumes at 2, no second
        // full match fits.
        let wrapped = wrap_occurrences("aaa", "aa");
        assert_eq!(wrapped, format!("{HIGHLIGHT_OPEN}aa{HIGHLIGHT_CLOSE}a"));
    }
}
