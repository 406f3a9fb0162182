//! Character-pattern extractor: pulls readable runs out of a decoded buffer when no
//! usable PDF text syntax is present.

use once_cell::sync::Lazy;
use regex::Regex;

use super::decoder::ENCODING_ORDER;
use super::normalize::collapse_whitespace;
use super::{scan_encodings, StrategyOutput};

/// Keywords whose surrounding context is worth keeping even inside noise.
pub const CONTEXT_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "work",
    "university",
    "college",
    "company",
    "project",
    "manager",
    "developer",
    "engineer",
];

const RUN_MIN_CHARS: usize = 6;
const CONTEXT_MIN_CHARS: usize = 11;

static READABLE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9\s@.()\-]{5,100}").expect("valid regex"));

static ALPHA_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{3,}").expect("valid regex"));

pub(crate) static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static KEYWORD_CONTEXT: Lazy<Vec<Regex>> = Lazy::new(|| {
    CONTEXT_KEYWORDS
        .iter()
        .map(|kw| {
            Regex::new(&format!(
                r"(?i)[A-Za-z0-9_\s.,;:()\-]{{0,30}}{kw}[A-Za-z0-9_\s.,;:()\-]{{0,30}}"
            ))
            .expect("valid regex")
        })
        .collect()
});

/// Runs the character-pattern scan over each candidate encoding.
pub fn extract(bytes: &[u8]) -> StrategyOutput {
    scan_encodings(bytes, &ENCODING_ORDER, scan)
}

/// Readable runs, then email addresses, then keyword context windows.
pub fn scan(text: &str, out: &mut StrategyOutput) {
    for run in READABLE_RUN.find_iter(text) {
        let cleaned = collapse_whitespace(run.as_str());
        if cleaned.chars().count() >= RUN_MIN_CHARS && ALPHA_RUN.is_match(&cleaned) {
            out.push(&cleaned);
        }
    }

    for email in EMAIL.find_iter(text) {
        out.push(email.as_str());
    }

    for pattern in KEYWORD_CONTEXT.iter() {
        for window in pattern.find_iter(text) {
            let cleaned = collapse_whitespace(window.as_str());
            if cleaned.chars().count() >= CONTEXT_MIN_CHARS {
                out.push(&cleaned);
            }
        }
    }
}
