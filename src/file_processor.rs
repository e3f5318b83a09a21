//! File splitting, per-block processing and directory walking.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::block::Block;
use crate::config::GlobalConfig;
use crate::engine::ReplacementEngine;
use crate::rule::TagRuleSet;

/// Result of processing one file's content.
#[derive(Debug)]
pub struct FileOutcome {
    pub output: String,
    pub replacements: usize,
    pub changed: bool,
}

/// Run the rule set over every documentation block in `content` and
/// reassemble the file. Blocks that fail to parse, or have no comment, pass
/// through untouched.
pub fn process_content(content: &str, rules: &TagRuleSet) -> FileOutcome {
    let (head, blocks) = split_blocks(content);
    let mut output = String::with_capacity(content.len());
    output.push_str(head);
    let mut replacements = 0;

    for raw in blocks {
        let mut block = Block::new(raw);
        if !block.parse() || block.comment_text().is_none() {
            log::debug!("block {} passes through unchanged", block.id());
            output.push_str(raw);
            continue;
        }
        match ReplacementEngine::new(rules, &block) {
            Ok(mut engine) => {
                engine.replace();
                replacements += engine.replacements();
                output.push_str(engine.text());
                output.push_str("*/");
                output.push_str(block.declaration_text());
            }
            Err(e) => {
                log::warn!("skipping block {}: {e}", block.id());
                output.push_str(raw);
            }
        }
    }

    let changed = output != content;
    FileOutcome {
        output,
        replacements,
        changed,
    }
}

/// Cut a source file at each `/**` opener. The head (text before the first
/// opener) plus the blocks concatenate back to the original input.
fn split_blocks(content: &str) -> (&str, Vec<&str>) {
    let mut starts = Vec::new();
    let mut from = 0;
    while let Some(pos) = content[from..].find("/**") {
        let idx = from + pos;
        starts.push(idx);
        from = idx + 3;
    }
    if starts.is_empty() {
        return (content, Vec::new());
    }

    let head = &content[..starts[0]];
    let mut blocks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(content.len());
        blocks.push(&content[start..end]);
    }
    (head, blocks)
}

/// Collect the Java source files under the given paths, honoring gitignore
/// and the configured include/exclude globs.
pub fn collect_files(paths: &[String], global: &GlobalConfig) -> Result<Vec<PathBuf>, ignore::Error> {
    let roots: Vec<&str> = if paths.is_empty() {
        vec!["."]
    } else {
        paths.iter().map(String::as_str).collect()
    };

    let mut files = Vec::new();
    for root in roots {
        let root_path = Path::new(root);
        if root_path.is_file() {
            files.push(root_path.to_path_buf());
            continue;
        }

        let mut builder = WalkBuilder::new(root_path);
        builder
            .git_ignore(global.respect_gitignore)
            .git_global(global.respect_gitignore)
            .git_exclude(global.respect_gitignore);

        if !global.include.is_empty() || !global.exclude.is_empty() {
            let mut overrides = OverrideBuilder::new(root_path);
            for pattern in &global.include {
                overrides.add(pattern)?;
            }
            for pattern in &global.exclude {
                overrides.add(&format!("!{pattern}"))?;
            }
            builder.overrides(overrides.build()?);
        }

        for entry in builder.build().flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) == Some("java") {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
