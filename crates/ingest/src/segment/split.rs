//! Block splitting: blank-line paragraphs, oversized-block repair, bullets.

use std::sync::LazyLock;

use regex::Regex;

use super::types::SplitRules;

static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[-*•]|\d+[.)])\s+").unwrap());

/// Split normalized text into candidate blocks, in document order.
/// No returned block is empty after trimming.
pub fn split_blocks(text: &str, rules: &SplitRules) -> Vec<String> {
    let mut blocks: Vec<String> = BLANK_LINE_RE
        .split(text)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if blocks.len() == 1 && blocks[0].chars().count() > rules.repair_threshold {
        let repaired = split_by_entry_starts(&blocks[0], rules);
        if repaired.len() > 1 {
            tracing::debug!(blocks = repaired.len(), "re-split oversized single block");
            blocks = repaired;
        }
    }

    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let parts = split_bullets(&block);
        if parts.len() > 1 {
            out.extend(parts);
        } else {
            out.push(block);
        }
    }
    out
}

/// Line scan that opens a new block whenever a line looks like the start of
/// a new entry (definition, attributed quote, section header).
fn split_by_entry_starts(block: &str, rules: &SplitRules) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for line in block.lines() {
        let trimmed = line.trim();
        if rules.starts_entry(trimmed) && !current.trim().is_empty() {
            out.push(current.trim().to_string());
            current = trimmed.to_string();
        } else if current.is_empty() {
            current = trimmed.to_string();
        } else {
            current.push('\n');
            current.push_str(trimmed);
        }
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

/// Cut a block before every bullet or numbered-list line.
fn split_bullets(block: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for line in block.lines() {
        if BULLET_RE.is_match(line) && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
