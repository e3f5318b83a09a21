//!
//! Tag replacement engine: runs the validated rule collection against one
//! parsed block, mutating a working copy of the comment text. One engine
//! instance per block; the rule collection is shared read-only.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;

use crate::block::Block;
use crate::comment::TagOccurrence;
use crate::rule::{TagRule, TagRuleSet};
use crate::types::{InsertPosition, Overwrite, TagKind};
use crate::utils::version;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("tag rule collection is empty")]
    EmptyRules,
}

/// Working state for one block. The buffer starts as a copy of the block's
/// comment text; the block itself is never mutated.
pub struct ReplacementEngine<'a> {
    rules: &'a TagRuleSet,
    block: &'a Block,
    buffer: String,
    /// Byte offset where the next BEGINNING insertion goes: the first
    /// existing tag line, or right after the comment's opening line.
    head_offset: usize,
    /// Current byte offset of each existing occurrence's source text,
    /// keyed by tag name. Seeded from the recorded spans (the buffer starts
    /// as an exact copy of the comment text) and kept in step by `splice`,
    /// so mutations land on the occurrence itself and never on a prose line
    /// that happens to contain the same text.
    anchors: HashMap<String, usize>,
    /// Leading whitespace for generated tag lines, taken from the first
    /// decorated comment line.
    indent: String,
    replacements: usize,
}

impl<'a> ReplacementEngine<'a> {
    /// Prime the working buffer from the block's comment text. The only hard
    /// failure of this component is an empty rule collection.
    pub fn new(rules: &'a TagRuleSet, block: &'a Block) -> Result<Self, EngineError> {
        if rules.is_empty() {
            return Err(EngineError::EmptyRules);
        }
        let buffer = block.comment_text().unwrap_or("").to_string();
        let indent = detect_indent(&buffer);
        let head_offset = initial_head_offset(&buffer, block);
        let mut anchors = HashMap::new();
        if let Some(comment) = block.comment() {
            for occurrence in comment.tags() {
                anchors
                    .entry(occurrence.name.clone())
                    .or_insert(occurrence.span.start);
            }
        }
        Ok(ReplacementEngine {
            rules,
            block,
            buffer,
            head_offset,
            anchors,
            indent,
            replacements: 0,
        })
    }

    /// Drive the full per-tag loop until the rules are exhausted.
    pub fn replace(&mut self) {
        let rules: Vec<TagRule> = self.rules.rules().to_vec();
        for rule in &rules {
            let before = self.buffer.clone();
            self.apply_rule(rule);
            // Count a rule only when it actually changed the text, so a
            // rerun over already-clean output reports nothing new.
            if self.buffer != before {
                self.replacements += 1;
            }
        }
    }

    /// Final buffer text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Number of tags added, overwritten, repositioned or removed.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    fn apply_rule(&mut self, rule: &TagRule) {
        let occurrence = self
            .block
            .comment()
            .and_then(|c| c.find(rule.tag.name()).map(|o| (o.clone(), c.span_text(o).to_string())));

        match occurrence {
            Some((occurrence, source_text)) => self.rewrite_existing(rule, &occurrence, source_text),
            None => self.add_missing(rule),
        }
    }

    /// Existing occurrence: overwrite, reposition, then strip if misplaced.
    fn rewrite_existing(&mut self, rule: &TagRule, occurrence: &TagOccurrence, source_text: String) {
        // The text currently standing in for this tag in the buffer.
        let mut current = source_text;

        if should_overwrite(rule, occurrence) {
            let generated = tag_content(rule);
            if self.replace_at_anchor(&occurrence.name, &current, &generated) {
                current = generated;
            }
        }

        self.reposition_if_needed(rule, &occurrence.name, &current);

        // Misplaced removal overrides whatever this iteration already did.
        if rule.location.remove_if_misplaced
            && !rule.location.is_properly_placed(self.block.classification())
        {
            self.remove_anchored_line(&occurrence.name, &current);
        }
    }

    /// No occurrence: add the generated tag iff the rule is properly placed
    /// for the block's classification.
    fn add_missing(&mut self, rule: &TagRule) {
        if !rule.location.is_properly_placed(self.block.classification()) {
            return;
        }
        let generated = tag_content(rule);
        match rule.insert_position {
            InsertPosition::Beginning => self.insert_head(&generated),
            InsertPosition::End | InsertPosition::None | InsertPosition::Preserve => {
                self.append_tail(&generated)
            }
        };
    }

    /// Move the tag's current text to its canonical position. A no-op for
    /// NONE/PRESERVE rules or when the anchored text no longer matches.
    fn reposition_if_needed(&mut self, rule: &TagRule, name: &str, current: &str) -> bool {
        if !matches!(rule.insert_position, InsertPosition::Beginning | InsertPosition::End) {
            return false;
        }
        if !self.remove_anchored_line(name, current) {
            return false;
        }
        let line_start = match rule.insert_position {
            InsertPosition::Beginning => self.insert_head(current),
            InsertPosition::End => self.append_tail(current),
            _ => unreachable!(),
        };
        self.anchors
            .insert(name.to_string(), line_start + self.indent.len());
        true
    }

    /// The occurrence's current offset, provided the buffer still carries
    /// `expected` there. A stale anchor is a soft per-step miss.
    fn anchor_of(&self, name: &str, expected: &str) -> Option<usize> {
        let pos = *self.anchors.get(name)?;
        if self.buffer.get(pos..pos + expected.len()) == Some(expected) {
            Some(pos)
        } else {
            None
        }
    }

    /// Substitute `new` for the occurrence's text at its anchor.
    fn replace_at_anchor(&mut self, name: &str, old: &str, new: &str) -> bool {
        let Some(pos) = self.anchor_of(name, old) else {
            return false;
        };
        self.splice(pos, old.len(), new);
        true
    }

    /// Remove the whole line holding the occurrence, including its newline.
    fn remove_anchored_line(&mut self, name: &str, text: &str) -> bool {
        let Some(pos) = self.anchor_of(name, text) else {
            return false;
        };
        let line_start = self.buffer[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = self.buffer[pos..]
            .find('\n')
            .map(|i| pos + i + 1)
            .unwrap_or(self.buffer.len());
        self.splice(line_start, line_end - line_start, "");
        true
    }

    /// Insert a tag line at the remembered head offset. Returns the byte
    /// offset where the inserted line begins.
    fn insert_head(&mut self, content: &str) -> usize {
        let mut offset = self.head_offset.min(self.buffer.len());
        if !self.buffer.is_char_boundary(offset) {
            offset = self.buffer.len();
        }
        if offset == self.buffer.len() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
            offset = self.buffer.len();
        }
        let line = format!("{}{}\n", self.indent, content);
        self.splice(offset, 0, &line);
        // The next BEGINNING insertion lands below this one, preserving rule
        // order.
        self.head_offset = offset + line.len();
        offset
    }

    /// Append a tag line as the last line of the buffer, keeping the closing
    /// indent (the whitespace run before `*/`) in place. Returns the byte
    /// offset where the inserted line begins.
    fn append_tail(&mut self, content: &str) -> usize {
        let line = format!("{}{}\n", self.indent, content);
        let tail_start = self.buffer.rfind('\n').map(|i| i + 1).unwrap_or(0);
        if self.buffer[tail_start..].trim().is_empty() && tail_start > 0 {
            self.splice(tail_start, 0, &line);
            tail_start
        } else {
            if !self.buffer.ends_with('\n') {
                self.buffer.push('\n');
            }
            let pos = self.buffer.len();
            self.buffer.push_str(&line);
            pos
        }
    }

    /// Replace `len` bytes at `pos` with `replacement`, keeping the head
    /// offset and every anchor pointing at the same logical spot.
    fn splice(&mut self, pos: usize, len: usize, replacement: &str) {
        self.buffer.replace_range(pos..pos + len, replacement);
        self.head_offset = shift(self.head_offset, pos, len, replacement.len());
        for anchor in self.anchors.values_mut() {
            *anchor = shift(*anchor, pos, len, replacement.len());
        }
    }
}

/// New value of a tracked offset after `len` bytes at `pos` were replaced by
/// `new_len` bytes. Offsets past the edit slide with it; offsets inside the
/// removed range collapse to its start.
fn shift(offset: usize, pos: usize, len: usize, new_len: usize) -> usize {
    if pos + len <= offset {
        offset - len + new_len
    } else if pos < offset {
        pos
    } else {
        offset
    }
}

/// Generated source text for a rule's tag. Pure in (tag, value, description).
pub fn tag_content(rule: &TagRule) -> String {
    let mut content = format!("* @{}", rule.tag.name());
    if !rule.value.is_empty() {
        content.push(' ');
        content.push_str(&rule.value);
    }
    if !rule.description.is_empty() {
        content.push(' ');
        content.push_str(&rule.description);
    }
    content
}

fn should_overwrite(rule: &TagRule, occurrence: &TagOccurrence) -> bool {
    match rule.overwrite {
        Overwrite::Always => true,
        Overwrite::Never | Overwrite::None => false,
        Overwrite::IfLower => {
            if rule.tag != TagKind::Version {
                return true;
            }
            // Observed behavior: the configured value must compare LOWER
            // than the existing one. Preserved verbatim.
            version::compare(&rule.value, &occurrence.value) == Ordering::Less
        }
    }
}

fn detect_indent(buffer: &str) -> String {
    for line in buffer.lines().skip(1) {
        let trimmed = line.trim_start();
        if trimmed.starts_with('*') {
            return line[..line.len() - trimmed.len()].to_string();
        }
    }
    " ".to_string()
}

fn initial_head_offset(buffer: &str, block: &Block) -> usize {
    if let Some(first) = block.comment().and_then(|c| c.tags().first()) {
        let start = first.span.start.min(buffer.len());
        if let Some(newline) = buffer[..start].rfind('\n') {
            return newline + 1;
        }
    }
    after_opening_line(buffer)
}

fn after_opening_line(buffer: &str) -> usize {
    buffer.find('\n').map(|i| i + 1).unwrap_or(buffer.len())
}
