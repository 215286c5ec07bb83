//! Best-effort docblock text scraping.
//!
//! These helpers pull human-readable text out of raw `/** ... */` comment
//! blocks by line-prefix stripping. They are **text heuristics, not a
//! parser**: no grammar, no inline-tag handling, no type resolution. Use them
//! for display and convention checks, never for semantic analysis.
//!
//! A tag line is any content line whose first token starts with `@`. Tag
//! names are passed without the `@` sigil.
//!
//! # Example
//!
//! ```
//! use scry::docblock;
//!
//! let doc = "/**\n * Sends the invoice.\n *\n * Queued on the billing connection.\n *\n * @param  string  $id\n * @deprecated\n */";
//!
//! assert_eq!(docblock::summary(doc).as_deref(), Some("Sends the invoice."));
//! assert_eq!(docblock::tag_values(doc, "param"), vec!["string  $id"]);
//! assert!(docblock::has_tag(doc, "deprecated"));
//! ```

/// Content lines of the docblock, with comment framing stripped.
///
/// Removes the `/**` opener, the `*/` closer, and one leading `*` per line,
/// then trims. Text that never had comment framing passes through unchanged.
fn content_lines(doc: &str) -> Vec<&str> {
    doc.lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("/**").unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line);
            let line = line.strip_prefix('*').unwrap_or(line);
            line.trim()
        })
        .collect()
}

/// `true` if the line's first token is an `@tag`.
fn is_tag_line(line: &str) -> bool {
    line.starts_with('@')
}

/// `true` if the line carries exactly this tag (not a longer tag sharing the
/// prefix, so `@return` is not a `ret` line).
fn line_has_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix('@')?.strip_prefix(tag)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// First non-empty content line before any tag, or `None`.
#[must_use]
pub fn summary(doc: &str) -> Option<String> {
    content_lines(doc)
        .into_iter()
        .take_while(|line| !is_tag_line(line))
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Content lines after the summary and before the first tag, joined with a
/// single space. `None` when the docblock has no text beyond its summary.
#[must_use]
pub fn description(doc: &str) -> Option<String> {
    let lines = content_lines(doc);
    let body: Vec<&str> = lines
        .into_iter()
        .take_while(|line| !is_tag_line(line))
        .filter(|line| !line.is_empty())
        .skip(1)
        .collect();
    if body.is_empty() {
        None
    } else {
        Some(body.join(" "))
    }
}

/// The trimmed text following each `@tag` occurrence, in document order.
/// Bare tags (no trailing text) contribute nothing here; use [`has_tag`] to
/// detect presence.
#[must_use]
pub fn tag_values(doc: &str, tag: &str) -> Vec<String> {
    content_lines(doc)
        .into_iter()
        .filter_map(|line| line_has_tag(line, tag))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// `true` if any content line carries the tag, with or without a value.
#[must_use]
pub fn has_tag(doc: &str, tag: &str) -> bool {
    content_lines(doc)
        .into_iter()
        .any(|line| line_has_tag(line, tag).is_some())
}
