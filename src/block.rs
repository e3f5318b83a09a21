//!
//! Splits one documentation-comment-plus-declaration unit of text into its
//! comment and declaration parts, decides whether a candidate `*/` is a real
//! comment boundary or text embedded in a string/text-block literal, and
//! classifies the declaration that follows.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;

use crate::comment::DocComment;
use crate::types::ElementType;

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Type header: class, interface, annotation type, enum or record.
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|protected|private|abstract|static|final|sealed|non-sealed|strictfp)\s+)*(class|interface|@interface|enum|record)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .unwrap()
});

/// Method header: optional modifiers and type parameters, a return type, a
/// name, an opening parenthesis.
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|protected|private|abstract|static|final|synchronized|native|default|strictfp)\s+)*(?:<[^>]*>\s*)?[\w$][\w$<>\[\],\.\s\?]*?\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(",
    )
    .unwrap()
});

/// Constructor header: the name carries the type's capitalization.
static CONSTRUCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:public|protected|private)\s+)?([A-Z][A-Za-z0-9_$]*)\s*\(").unwrap()
});

/// Field header: modifiers, a type, a name, then an initializer or terminator.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(?:public|protected|private|static|final|transient|volatile)\s+)*[\w$][\w$<>\[\],\.\s\?]*?\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?:=|;)",
    )
    .unwrap()
});

/// One documentation comment (zero or one) plus the declaration it documents.
///
/// Constructed once per raw block; `parse()` is invoked exactly once and
/// populates the remaining fields. The replacement engine works on a copy of
/// the comment text, never on the block itself.
#[derive(Debug)]
pub struct Block {
    id: u64,
    original_text: String,
    comment_text: Option<String>,
    declaration_text: String,
    classification: ElementType,
    declaration_name: Option<String>,
    annotations: Vec<String>,
    comment: Option<DocComment>,
}

impl Block {
    pub fn new(raw: &str) -> Self {
        Block {
            id: NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed),
            original_text: raw.to_string(),
            comment_text: None,
            declaration_text: String::new(),
            classification: ElementType::None,
            declaration_name: None,
            annotations: Vec::new(),
            comment: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Text preceding the accepted `*/`, including the `/**` opener.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment_text.as_deref()
    }

    /// Text following the accepted `*/`.
    pub fn declaration_text(&self) -> &str {
        &self.declaration_text
    }

    pub fn classification(&self) -> ElementType {
        self.classification
    }

    pub fn declaration_name(&self) -> Option<&str> {
        self.declaration_name.as_deref()
    }

    /// Annotation lines preceding the declaration header, one string per
    /// annotation with embedded line breaks kept for spanning annotations.
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn comment(&self) -> Option<&DocComment> {
        self.comment.as_ref()
    }

    /// Split and classify the block. Returns `true` iff the block contains a
    /// usable declaration (with or without a comment).
    pub fn parse(&mut self) -> bool {
        let text = self.original_text.clone();
        if text.trim().is_empty() {
            return false;
        }

        let opens_with_comment = text.trim_start().starts_with("/*");

        let Some(idx) = find_close_candidate(&text) else {
            // No candidate split anywhere in the block.
            return false;
        };

        if embedded_in_literal(&text[idx + 2..]) {
            // The candidate sits inside a literal, so the block has no
            // comment. An opened comment is then unterminated and nothing
            // usable remains; otherwise classification runs on the full text.
            if opens_with_comment {
                return false;
            }
            self.declaration_text = text.to_string();
            self.classify();
            return true;
        }

        let comment = &text[..idx];
        let declaration = &text[idx + 2..];
        // A bare close marker with nothing on either side is not a usable
        // block.
        if comment.trim().is_empty() && declaration.trim().is_empty() {
            return false;
        }
        self.comment_text = Some(comment.to_string());
        self.declaration_text = declaration.to_string();
        self.classify();
        self.comment = Some(DocComment::parse(comment));
        true
    }

    fn classify(&mut self) {
        let declaration = self.declaration_text.clone();
        let lines: Vec<&str> = declaration.lines().collect();
        let mut i = 0;
        while i < lines.len() {
            let trimmed = lines[i].trim();
            if trimmed.is_empty() || trimmed.starts_with("//") {
                i += 1;
                continue;
            }
            if trimmed.starts_with('@') {
                let mut folded = String::from(trimmed);
                let mut depth = bracket_delta(trimmed);
                while depth > 0 && i + 1 < lines.len() {
                    i += 1;
                    folded.push('\n');
                    folded.push_str(lines[i].trim_end());
                    depth += bracket_delta(lines[i]);
                }
                self.annotations.push(folded);
                i += 1;
                continue;
            }
            if let Some((classification, name)) = match_declaration(lines[i]) {
                self.classification = classification;
                self.declaration_name = Some(name);
            } else {
                self.classification = ElementType::None;
                self.declaration_name = None;
            }
            return;
        }
        // No header line at all.
        self.classification = if self.annotations.is_empty() {
            ElementType::None
        } else {
            ElementType::AnnotationUsage
        };
    }
}

/// First `*/` followed by whitespace.
fn find_close_candidate(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut from = 0;
    loop {
        let pos = text[from..].find("*/")? + from;
        let after = pos + 2;
        if after < text.len() && bytes[after].is_ascii_whitespace() {
            return Some(pos);
        }
        from = pos + 2;
    }
}

/// Disambiguation over the lead fragment (text after the candidate split up
/// to the first statement terminator): a candidate inside an ordinary string
/// or a text block is not a comment boundary.
fn embedded_in_literal(declaration: &str) -> bool {
    let fragment = match declaration.find(';') {
        Some(i) => &declaration[..i],
        None => declaration,
    };
    // Unterminated text block: the closing triple quote shows up after the
    // candidate.
    if fragment.contains("\"\"\"") {
        return true;
    }
    // Unterminated ordinary string: an odd number of unescaped quotes before
    // the statement terminator.
    if count_unescaped_quotes(fragment) % 2 == 1 {
        return true;
    }
    // Text block closed right at the statement end.
    if fragment.trim_end().ends_with("\"\"") {
        return true;
    }
    false
}

fn count_unescaped_quotes(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
            count += 1;
        }
    }
    count
}

fn bracket_delta(line: &str) -> i32 {
    let mut depth = 0;
    for c in line.chars() {
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

fn match_declaration(line: &str) -> Option<(ElementType, String)> {
    if let Some(caps) = TYPE_RE.captures(line) {
        let classification = match &caps[1] {
            "class" | "record" => ElementType::Class,
            "interface" | "@interface" => ElementType::Interface,
            "enum" => ElementType::Enum,
            _ => unreachable!(),
        };
        return Some((classification, caps[2].to_string()));
    }
    if let Some(caps) = METHOD_RE.captures(line) {
        return Some((ElementType::Method, caps[1].to_string()));
    }
    if let Some(caps) = CONSTRUCTOR_RE.captures(line) {
        return Some((ElementType::Method, caps[1].to_string()));
    }
    if let Some(caps) = FIELD_RE.captures(line) {
        return Some((ElementType::Field, caps[1].to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: &str) -> Block {
        let mut block = Block::new(raw);
        assert!(block.parse(), "expected parse() to succeed for {raw:?}");
        block
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Block::new("x");
        let b = Block::new("x");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_block_fails() {
        assert!(!Block::new("").parse());
        assert!(!Block::new("   \n\t\n").parse());
    }

    #[test]
    fn test_unterminated_comment_fails() {
        assert!(!Block::new("/** doc with no close\n * more doc\n").parse());
    }

    #[test]
    fn test_bare_close_marker_fails() {
        assert!(!Block::new("*/ \n").parse());
    }

    #[test]
    fn test_comment_only_without_trailing_whitespace_fails() {
        // `*/` at end of input has no following whitespace, so there is no
        // candidate split at all.
        assert!(!Block::new("/** doc */").parse());
    }

    #[test]
    fn test_comment_followed_by_blank_lines_is_none() {
        let block = parsed("/**\n * dangling doc\n */\n\n");
        assert_eq!(block.classification(), ElementType::None);
        assert!(block.declaration_name().is_none());
        assert!(block.comment_text().is_some());
    }

    #[test]
    fn test_class_block() {
        let block = parsed("/**\n * Widget.\n */\npublic class Widget {\n");
        assert_eq!(block.classification(), ElementType::Class);
        assert_eq!(block.declaration_name(), Some("Widget"));
        assert_eq!(block.comment_text(), Some("/**\n * Widget.\n "));
        assert_eq!(block.declaration_text(), "\npublic class Widget {\n");
    }

    #[test]
    fn test_interface_enum_record_headers() {
        let block = parsed("/** doc */\ninterface Loader {\n");
        assert_eq!(block.classification(), ElementType::Interface);
        assert_eq!(block.declaration_name(), Some("Loader"));

        let block = parsed("/** doc */\npublic enum Color {\n");
        assert_eq!(block.classification(), ElementType::Enum);
        assert_eq!(block.declaration_name(), Some("Color"));

        let block = parsed("/** doc */\npublic record Point(int x, int y) {\n");
        assert_eq!(block.classification(), ElementType::Class);
        assert_eq!(block.declaration_name(), Some("Point"));
    }

    #[test]
    fn test_method_block() {
        let block = parsed("/** doc */\npublic static String render(int width) {\n");
        assert_eq!(block.classification(), ElementType::Method);
        assert_eq!(block.declaration_name(), Some("render"));
    }

    #[test]
    fn test_generic_method_block() {
        let block = parsed("/** doc */\npublic <T> List<T> copyOf(Collection<T> source) {\n");
        assert_eq!(block.classification(), ElementType::Method);
        assert_eq!(block.declaration_name(), Some("copyOf"));
    }

    #[test]
    fn test_constructor_is_a_method() {
        let block = parsed("/** doc */\npublic Widget(String name) {\n");
        assert_eq!(block.classification(), ElementType::Method);
        assert_eq!(block.declaration_name(), Some("Widget"));
    }

    #[test]
    fn test_field_block() {
        let block = parsed("/** doc */\nprivate static final int MAX_RETRIES = 3;\n");
        assert_eq!(block.classification(), ElementType::Field);
        assert_eq!(block.declaration_name(), Some("MAX_RETRIES"));
    }

    #[test]
    fn test_field_without_initializer() {
        let block = parsed("/** doc */\nprivate long timeoutMillis;\n");
        assert_eq!(block.classification(), ElementType::Field);
        assert_eq!(block.declaration_name(), Some("timeoutMillis"));
    }

    #[test]
    fn test_annotations_collected_before_header() {
        let block = parsed("/** doc */\n@Override\n@Deprecated\npublic String render() {\n");
        assert_eq!(block.annotations(), ["@Override", "@Deprecated"]);
        assert_eq!(block.classification(), ElementType::Method);
        assert_eq!(block.declaration_name(), Some("render"));
    }

    #[test]
    fn test_annotation_only_block() {
        let block = parsed("/** doc */\n@SuppressWarnings(\"unchecked\")\n");
        assert_eq!(block.classification(), ElementType::AnnotationUsage);
        assert!(block.declaration_name().is_none());
        assert_eq!(block.annotations().len(), 1);
    }

    #[test]
    fn test_multiline_annotation_folds_with_line_breaks() {
        let raw = "/** doc */\n@NamedQueries({\n    @NamedQuery(name = \"a\"),\n    @NamedQuery(name = \"b\")\n})\npublic class Widget {\n";
        let block = parsed(raw);
        assert_eq!(block.annotations().len(), 1);
        let folded = &block.annotations()[0];
        assert!(folded.starts_with("@NamedQueries({"));
        assert!(folded.ends_with("})"));
        assert_eq!(folded.matches('\n').count(), 3);
        assert_eq!(block.classification(), ElementType::Class);
        assert_eq!(block.declaration_name(), Some("Widget"));
    }

    #[test]
    fn test_header_without_name_is_none() {
        let block = parsed("/** doc */\nsomething unrecognizable here\n");
        assert_eq!(block.classification(), ElementType::None);
        assert!(block.declaration_name().is_none());
    }

    #[test]
    fn test_line_comments_in_declaration_are_skipped() {
        let block = parsed("/** doc */\n// helper\npublic class Widget {\n");
        assert_eq!(block.classification(), ElementType::Class);
    }

    #[test]
    fn test_marker_inside_string_literal_rejected() {
        // The only close candidate sits inside a string literal, so the
        // opened comment never terminates.
        assert!(!Block::new("/** doc */ \"; public class X {").parse());
    }

    #[test]
    fn test_marker_inside_text_block_rejected() {
        let raw = "/** doc */ more text\n\"\"\";\npublic class X {";
        assert!(!Block::new(raw).parse());
    }

    #[test]
    fn test_text_block_closed_at_statement_end_rejected() {
        let raw = "/** doc */ tail\"\";\npublic class X {";
        assert!(!Block::new(raw).parse());
    }

    #[test]
    fn test_balanced_string_in_declaration_is_accepted() {
        let block = parsed("/** doc */\nprivate String greeting = \"hello\";\n");
        assert_eq!(block.classification(), ElementType::Field);
        assert_eq!(block.declaration_name(), Some("greeting"));
    }

    #[test]
    fn test_declaration_without_close_marker_fails() {
        assert!(!Block::new("public class Widget {\n").parse());
    }

    #[test]
    fn test_rejected_candidate_without_comment_classifies_full_text() {
        let raw = "private String s = \"oops */ trailing\";\n";
        let mut block = Block::new(raw);
        assert!(block.parse());
        assert!(block.comment_text().is_none());
        assert_eq!(block.classification(), ElementType::Field);
        assert_eq!(block.declaration_name(), Some("s"));
    }

    #[test]
    fn test_comment_model_built_when_comment_accepted() {
        let block = parsed("/**\n * @since 1.0.0\n */\npublic class Widget {\n");
        let comment = block.comment().unwrap();
        assert!(comment.find("since").is_some());
    }
}
