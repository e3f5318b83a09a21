//!
//! Parsed model of one documentation comment: the raw text plus the ordered
//! tag occurrences found in it, each with its exact source span and value.
//! The model is read-only; the replacement engine does all mutation on its
//! own working buffer and only uses the spans recorded here to locate text.

use std::ops::Range;

/// One `@tag` line inside a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    /// Tag name without the leading `@`.
    pub name: String,
    /// First whitespace-separated token after the tag name, or empty.
    pub value: String,
    /// Byte span of the tag's source text inside the comment, from the `*`
    /// line decorator (or the `@` when undecorated) to the end of the line,
    /// trailing whitespace excluded.
    pub span: Range<usize>,
}

/// The parsed content of one documentation comment.
#[derive(Debug, Clone)]
pub struct DocComment {
    text: String,
    tags: Vec<TagOccurrence>,
}

impl DocComment {
    /// Scan raw comment text (everything before the closing `*/`) and record
    /// one occurrence per tag line, in source order.
    pub fn parse(text: &str) -> Self {
        let mut tags = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let content = line.strip_suffix('\n').unwrap_or(line);
            let content = content.strip_suffix('\r').unwrap_or(content);
            if let Some(occurrence) = parse_tag_line(content, offset) {
                tags.push(occurrence);
            }
            offset += line.len();
        }
        DocComment {
            text: text.to_string(),
            tags,
        }
    }

    /// Full comment text the model was built from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All tag occurrences in source order.
    pub fn tags(&self) -> &[TagOccurrence] {
        &self.tags
    }

    /// First occurrence of the named tag, if any.
    pub fn find(&self, name: &str) -> Option<&TagOccurrence> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Source text covered by an occurrence's span.
    pub fn span_text(&self, occurrence: &TagOccurrence) -> &str {
        &self.text[occurrence.span.clone()]
    }
}

/// Recognize a tag line and compute its occurrence, `line_start` being the
/// byte offset of the line inside the whole comment.
fn parse_tag_line(line: &str, line_start: usize) -> Option<TagOccurrence> {
    let mut rest = line.trim_start();
    let mut span_start = line_start + (line.len() - rest.len());

    // A tag may sit on the opening line: `/** @deprecated ... `.
    if let Some(stripped) = rest.strip_prefix("/**") {
        let trimmed = stripped.trim_start();
        span_start += rest.len() - trimmed.len();
        rest = trimmed;
    }

    // Decorated body line: `* @since 1.0.0`. The span keeps the decorator so
    // generated content (`* @...`) substitutes cleanly.
    let tag_text = if rest.starts_with('*') && !rest.starts_with("*/") {
        let after = rest[1..].trim_start();
        if !after.starts_with('@') {
            return None;
        }
        rest
    } else if rest.starts_with('@') {
        rest
    } else {
        return None;
    };

    let at = tag_text.find('@').unwrap_or(0);
    let mut parts = tag_text[at + 1..].split_whitespace();
    let name = parts.next().filter(|n| !n.is_empty())?.to_string();
    let value = parts.next().unwrap_or("").to_string();

    let span_end = span_start + tag_text.trim_end().len();
    Some(TagOccurrence {
        name,
        value,
        span: span_start..span_end,
    })
}
