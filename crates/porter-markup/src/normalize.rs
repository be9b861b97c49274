//! Post-conversion text cleanup.
//!
//! [`normalize`] works line by line on raw text. It does not know about code
//! fences: a `#` line inside a fenced block is treated like any other line.

use std::sync::LazyLock;

use regex::Regex;

/// `` `wrap ...` `` and `` `/wrap` `` lines left over from the source layout.
static WRAP_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*`/?wrap(?:[ \t][^`]*)?`[ \t]*\r?$").expect("invalid wrap marker regex")
});

/// Lines made of heading markers only: `#`, `###`.
static BARE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*#+[ \t]*\r?$").expect("invalid bare marker regex"));

/// ATX heading with text.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[ \t]+\S").expect("invalid heading regex"));

/// ATX heading whose text is empty once closing markers are dropped: `## ##`.
static EMPTY_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,6}[ \t]+#*[ \t]*\r?$").expect("invalid empty heading regex")
});

/// Clean converted markdown.
///
/// In order:
/// 1. Drop wrap marker lines.
/// 2. Drop lines made only of `#` markers.
/// 3. Collapse runs of two or more blank lines to one empty line.
/// 4. Insert a blank line after a heading directly followed by text.
/// 5. Drop headings without text.
///
/// The result is stable: `normalize(&normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```
/// use porter_markup::normalize;
///
/// assert_eq!(normalize("## Title\nText\n\n\n\nMore\n"), "## Title\n\nText\n\nMore\n");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let (content, trailing_newline) = match text.strip_suffix('\n') {
        Some(content) => (content, true),
        None => (text, false),
    };

    let lines: Vec<&str> = content
        .split('\n')
        .filter(|line| !WRAP_MARKER.is_match(line))
        .filter(|line| !BARE_MARKER.is_match(line))
        .collect();
    let lines = collapse_blank_runs(&lines);
    let lines = space_headings(&lines);
    let lines = drop_empty_headings(&lines);

    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_heading(line: &str) -> bool {
    HEADING.is_match(line) && !EMPTY_HEADING.is_match(line)
}

fn collapse_blank_runs<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if is_blank(lines[i]) {
            let run = lines[i..].iter().take_while(|l| is_blank(l)).count();
            out.push(if run > 1 { "" } else { lines[i] });
            i += run;
        } else {
            out.push(lines[i]);
            i += 1;
        }
    }
    out
}

fn space_headings<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        out.push(*line);
        let next_is_text = lines.get(i + 1).is_some_and(|next| !is_blank(next));
        if is_heading(line) && next_is_text {
            out.push("");
        }
    }
    out
}

/// Drop empty headings without leaving two blank lines behind.
fn drop_empty_headings<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if !EMPTY_HEADING.is_match(line) {
            out.push(line);
            continue;
        }
        let prev_blank = out.last().is_some_and(|prev| is_blank(prev));
        let next_blank = lines.get(i).is_some_and(|next| is_blank(next));
        if prev_blank && next_blank {
            i += 1;
        }
    }
    out
}
