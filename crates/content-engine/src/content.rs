//! Structural helpers for article bodies.
//!
//! Article content is markdown with a fixed contract: one `# ` title line,
//! `## ` section headings, blank-line paragraph breaks and a
//! "Frequently Asked Questions" block near the end.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").unwrap());
static RE_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##[ \t]+").unwrap());
static RE_FAQ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)frequently asked questions").unwrap());
static RE_PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());

pub const UNTITLED: &str = "Untitled";

/// Words per minute used for read-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

const EXCERPT_CHARS: usize = 200;

/// Text of the first `# ` heading line, or `Untitled`.
pub fn title_from_heading(content: &str) -> String {
    RE_TITLE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Number of second-level (`## `) headings.
pub fn h2_count(content: &str) -> usize {
    RE_H2.find_iter(content).count()
}

pub fn has_faq(content: &str) -> bool {
    RE_FAQ.is_match(content)
}

/// Non-empty blocks separated by blank lines.
pub fn paragraphs(content: &str) -> Vec<&str> {
    RE_PARAGRAPH_BREAK
        .split(content)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// First 200 characters of the second paragraph (the first paragraph is
/// normally the title line), falling back to the first paragraph.
pub fn excerpt(content: &str) -> String {
    let paras = paragraphs(content);
    let source = match paras.get(1).or_else(|| paras.first()) {
        Some(p) => *p,
        None => return String::new(),
    };
    let cut: String = source.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut)
}

/// `ceil(words / 200)` minutes.
pub fn read_time(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

/// The first `n` whitespace-separated words, re-joined with single spaces.
pub fn first_words(content: &str, n: usize) -> String {
    content.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Deterministic check of the content structure contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    pub has_title_heading: bool,
    pub h2_count: usize,
    pub has_faq: bool,
    pub word_count: usize,
    pub paragraph_count: usize,
    /// Longest run of words between two headings.
    pub longest_section_words: usize,
}

impl StructureReport {
    pub fn analyze(content: &str) -> Self {
        let mut longest = 0usize;
        let mut current = 0usize;
        for line in content.lines() {
            if line.trim_start().starts_with('#') {
                longest = longest.max(current);
                current = 0;
            } else {
                current += word_count(line);
            }
        }
        longest = longest.max(current);

        Self {
            has_title_heading: RE_TITLE.is_match(content),
            h2_count: h2_count(content),
            has_faq: has_faq(content),
            word_count: word_count(content),
            paragraph_count: paragraphs(content).len(),
            longest_section_words: longest,
        }
    }

    /// Title heading, at least one section heading and an FAQ block.
    pub fn is_intact(&self) -> bool {
        self.has_title_heading && self.h2_count > 0 && self.has_faq
    }
}
