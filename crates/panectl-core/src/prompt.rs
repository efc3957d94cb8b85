//! Shell prompt recognition for the last line of a pane.
//!
//! Two tiers:
//!
//! 1. A fixed, ordered list of prompt shapes (trailing `$`/`#`/`>`,
//!    `user@host:path$`, bare `host:path#`).
//! 2. A permissive fallback: any line shorter than 100 chars that contains
//!    one of `$ # > :` and none of a few output-looking keywords.
//!
//! Tier 2 has known false positives (`key: value` output, a script printing
//! `root@target:/# `). Prompts vary arbitrarily in the wild, so it is kept.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Lines at or above this length are never accepted by the heuristic tier.
pub const HEURISTIC_MAX_CHARS: usize = 100;

const HEURISTIC_PROMPT_CHARS: &[char] = &['$', '#', '>', ':'];

const OUTPUT_KEYWORDS: &[&str] = &[
    "error", "warning", "failed", "success", "completed", "finished",
];

static PROMPT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("dollar_or_hash", r"^.*[$#]\s*$"),
        ("angle", r"^.*>\s*$"),
        ("user_host_path", r"^.*@.*:.*[$#]\s*$"),
        ("user_host_path_angle", r"^.*@.*:.*>\s*$"),
        ("host_path", r"^\S+:\S*[$#]\s*$"),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| match Regex::new(pattern) {
        Ok(re) => Some((name, re)),
        Err(e) => {
            tracing::error!(name, %e, "invalid built-in prompt pattern");
            None
        }
    })
    .collect()
});

/// How a line was recognized as a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMatch {
    /// Matched the named built-in shape.
    Pattern(&'static str),
    /// Accepted by the permissive short-line rule.
    Heuristic,
}

/// Classify a single (already trimmed or untrimmed) line.
pub fn match_prompt(line: &str) -> Option<PromptMatch> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    for (name, re) in PROMPT_PATTERNS.iter() {
        if re.is_match(line) {
            return Some(PromptMatch::Pattern(name));
        }
    }

    if line.chars().count() < HEURISTIC_MAX_CHARS && line.contains(HEURISTIC_PROMPT_CHARS) {
        let lower = line.to_lowercase();
        if !OUTPUT_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return Some(PromptMatch::Heuristic);
        }
    }

    None
}

/// Whether the last non-blank line of `text` looks like a shell prompt.
pub fn has_prompt_at_end(text: &str) -> bool {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| match_prompt(l).is_some())
}
