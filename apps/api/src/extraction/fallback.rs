//! Fallback string extractor: last resort, treats the buffer as near-plaintext and
//! keeps anything word-shaped plus phone/email context.

use once_cell::sync::Lazy;
use regex::Regex;

use super::decoder::TextEncoding;
use super::normalize::is_all_caps;
use super::{scan_encodings, StrategyOutput};

const FALLBACK_ENCODINGS: [TextEncoding; 1] = [TextEncoding::Latin1];

/// All-uppercase tokens at least this long are treated as encoding garbage.
const ALL_CAPS_NOISE_CHARS: usize = 5;
/// Tokens spanning more words than this are over-broad matches, not phrases.
const MAX_TOKEN_WORDS: usize = 20;

static WORDISH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]{3,}[A-Za-z0-9\s@.()\-]*[A-Za-z0-9]").expect("valid regex")
});

static PHONE_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[A-Za-z\s]{0,20}\+?\(?[0-9]{3}\)?[\s.\-]?[0-9]{3}[\s.\-]?[0-9]{4}[A-Za-z\s]{0,20}",
    )
    .expect("valid regex")
});

static EMAIL_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[A-Za-z\s]{0,30}[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}[A-Za-z\s]{0,30}",
    )
    .expect("valid regex")
});

pub fn extract(bytes: &[u8]) -> StrategyOutput {
    scan_encodings(bytes, &FALLBACK_ENCODINGS, scan)
}

pub fn scan(text: &str, out: &mut StrategyOutput) {
    let printable = strip_controls(text);

    for m in WORDISH.find_iter(&printable) {
        let token = m.as_str();
        if is_all_caps(token) && token.chars().count() >= ALL_CAPS_NOISE_CHARS {
            continue;
        }
        if token.split_whitespace().count() > MAX_TOKEN_WORDS {
            continue;
        }
        out.push(token);
    }

    if let Some(m) = PHONE_CONTEXT.find(&printable) {
        out.push(m.as_str());
    }
    if let Some(m) = EMAIL_CONTEXT.find(&printable) {
        out.push(m.as_str());
    }
}

/// Replaces C0 and C1 control characters (and DEL) with spaces.
fn strip_controls(text: &str) -> String {
    text.chars()
        .map(|c| match u32::from(c) {
            0x00..=0x1F | 0x7F..=0x9F => ' ',
            _ => c,
        })
        .collect()
}
