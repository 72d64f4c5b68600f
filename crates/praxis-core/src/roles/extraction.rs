//! Heuristic extraction over free-text agent output
//!
//! Everything here is best-effort and non-authoritative: regex and keyword
//! scans that either find something or quietly find nothing. None of these
//! functions can fail, so post-execution hooks built on them cannot either.

use regex::Regex;
use std::sync::LazyLock;

/// File paths with a recognizable code/config extension
static FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b
        ([A-Za-z0-9_][A-Za-z0-9_./-]*
        \.(?:rs|py|ts|tsx|js|jsx|go|java|kt|rb|c|h|cpp|hpp|cs|swift|
            toml|ya?ml|json|sql|sh|proto|md|html|css))
        \b",
    )
    .expect("FILE_REGEX is a compile-time constant")
});

/// `quality: 8/10`, `Quality score = 7.5`, and friends
static QUALITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)quality(?:\s+score)?\s*[:=]?\s*(\d+(?:\.\d+)?)(?:\s*/\s*10)?")
        .expect("QUALITY_REGEX is a compile-time constant")
});

/// Technology names worth surfacing from agent output
const TECHNOLOGY_KEYWORDS: &[&str] = &[
    "rust", "cargo", "tokio", "axum", "sqlx", "python", "django", "flask", "fastapi",
    "javascript", "typescript", "react", "vue", "svelte", "node", "express", "go", "java",
    "spring", "kotlin", "docker", "kubernetes", "postgres", "postgresql", "mysql", "sqlite",
    "redis", "graphql", "grpc", "kafka", "rabbitmq", "terraform", "webpack", "vite",
];

/// Phrases indicating the test run failed
const FAIL_PHRASES: &[&str] = &[
    "tests failed",
    "test failures",
    "tests are failing",
    "failing tests",
    "did not pass",
    "does not pass",
];

/// Phrases indicating the test run passed
const PASS_PHRASES: &[&str] = &[
    "all tests passed",
    "all tests pass",
    "tests passed",
    "tests pass",
    "passed successfully",
    "no test failures",
];

/// Phrases withholding approval (checked before the positive set, since
/// "not approved" contains "approved")
const REJECT_PHRASES: &[&str] = &[
    "not approved",
    "cannot approve",
    "rejected",
    "needs revision",
    "changes requested",
    "do not merge",
];

/// Phrases granting approval
const APPROVE_PHRASES: &[&str] = &["approved", "lgtm", "looks good", "ready to merge"];

/// File paths mentioned in the text, deduplicated, in order of appearance
#[must_use]
pub fn files_mentioned(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for capture in FILE_REGEX.captures_iter(text) {
        let path = capture[1].to_string();
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}

/// Known technologies mentioned in the text, deduplicated, lowercase
#[must_use]
pub fn technologies(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TECHNOLOGY_KEYWORDS
        .iter()
        .filter(|keyword| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == **keyword)
        })
        .map(|keyword| (*keyword).to_string())
        .collect()
}

/// Pass/fail assessment scanned from a test report.
///
/// Failure phrases win over pass phrases: "all tests passed except" style
/// output usually also names the failures.
#[must_use]
pub fn pass_fail_assessment(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if FAIL_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(false);
    }
    if PASS_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(true);
    }
    None
}

/// Quality score scanned from the text, clamped to 0.0 - 10.0
#[must_use]
pub fn quality_score(text: &str) -> Option<f32> {
    QUALITY_REGEX
        .captures(text)
        .and_then(|c| c[1].parse::<f32>().ok())
        .map(|score| score.clamp(0.0, 10.0))
}

/// Approval flag scanned from the text
#[must_use]
pub fn approval_flag(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if REJECT_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(false);
    }
    if APPROVE_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(true);
    }
    None
}

/// The testing-strategy section of a plan, if one can be located.
///
/// Scans for a heading line mentioning testing and captures until the next
/// heading or the end of the text.
#[must_use]
pub fn testing_strategy_excerpt(plan: &str) -> Option<String> {
    let mut lines = plan.lines().peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim();
        let is_heading = trimmed.starts_with('#')
            || (trimmed.ends_with(':') && trimmed.len() < 80);
        if is_heading && trimmed.to_lowercase().contains("testing") {
            let mut section = vec![trimmed.to_string()];
            for body_line in lines.by_ref() {
                if body_line.trim_start().starts_with('#') {
                    break;
                }
                section.push(body_line.to_string());
            }
            let excerpt = section.join("\n").trim().to_string();
            if !excerpt.is_empty() {
                return Some(excerpt);
            }
            return None;
        }
    }
    None
}
