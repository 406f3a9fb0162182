//! Heuristic resume text extraction.
//!
//! PDFs are not parsed into an object model. Three independent scans run over the raw
//! bytes in a fixed order (structural → character-pattern → fallback), each stopping as
//! soon as it has recovered more than [`EARLY_STOP_CHARS`] characters. Whatever comes out
//! is normalized and must clear a minimum-length gate. DOCX and plain text skip the
//! scans and go straight to the normalizer.

pub mod char_pattern;
pub mod decoder;
pub mod document;
pub mod docx;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod structural;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use decoder::TextEncoding;
pub use document::{extract_document, DocumentKind, RawDocument, ValidatedText};
pub use error::ExtractionError;
pub use normalize::{NormalizeMode, CLIENT_INDICATORS, SERVER_INDICATORS};

/// The single decision point of the pipeline: more than this many characters means
/// "enough", both for moving to the next encoding and to the next strategy.
pub const EARLY_STOP_CHARS: usize = 100;

/// Normalized text shorter than this is rejected.
pub const MIN_TEXT_CHARS: usize = 50;

/// Indicator counts below this are logged as a quality warning.
const LOW_INDICATOR_WARNING: usize = 2;

/// Which code path produced the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Structural,
    CharPattern,
    Fallback,
    Docx,
    PlainText,
}

/// Accumulated output of one extraction strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyOutput {
    pub text: String,
    /// Encoding of the attempt that produced `text`.
    pub encoding: Option<TextEncoding>,
    pub crossed_threshold: bool,
}

impl StrategyOutput {
    pub(crate) fn for_encoding(encoding: TextEncoding) -> Self {
        Self {
            text: String::new(),
            encoding: Some(encoding),
            crossed_threshold: false,
        }
    }

    /// Appends a token, space-separated.
    pub(crate) fn push(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(token);
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.char_len() > EARLY_STOP_CHARS
    }
}

/// Runs one per-encoding scan over each candidate encoding in order.
///
/// Each attempt starts from an empty accumulator. The first attempt that crosses the
/// threshold wins outright; otherwise the longest attempt is kept (earliest on ties).
pub(crate) fn scan_encodings<F>(bytes: &[u8], encodings: &[TextEncoding], mut scan: F) -> StrategyOutput
where
    F: FnMut(&str, &mut StrategyOutput),
{
    let mut best = StrategyOutput::default();

    for candidate in decoder::candidates(bytes, encodings) {
        let mut attempt = StrategyOutput::for_encoding(candidate.encoding);
        scan(&candidate.text, &mut attempt);

        if attempt.exceeds_threshold() {
            attempt.crossed_threshold = true;
            return attempt;
        }
        if attempt.char_len() > best.char_len() {
            best = attempt;
        }
    }

    best
}

/// Runs the three PDF strategies in order, stopping at the first that crosses the threshold.
///
/// When none does, the longest output wins, preferring the earlier strategy on ties.
pub fn recover_pdf_text(bytes: &[u8]) -> (Strategy, StrategyOutput) {
    let mut best: Option<(Strategy, StrategyOutput)> = None;

    let strategies: [(Strategy, fn(&[u8]) -> StrategyOutput); 3] = [
        (Strategy::Structural, structural::extract),
        (Strategy::CharPattern, char_pattern::extract),
        (Strategy::Fallback, fallback::extract),
    ];

    for (strategy, run) in strategies {
        let output = run(bytes);
        debug!(
            ?strategy,
            chars = output.char_len(),
            encoding = ?output.encoding,
            "Extraction strategy finished"
        );

        if output.crossed_threshold {
            return (strategy, output);
        }
        let longer = best
            .as_ref()
            .map_or(true, |(_, b)| output.char_len() > b.char_len());
        if longer {
            best = Some((strategy, output));
        }
    }

    best.unwrap_or((Strategy::Fallback, StrategyOutput::default()))
}

/// Knobs that differ between the call paths that feed the normalizer.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionOptions {
    pub mode: NormalizeMode,
    pub indicators: &'static [&'static str],
    pub min_text_chars: usize,
}

impl ExtractionOptions {
    /// Upload-widget path: lenient tokens, base vocabulary.
    pub fn client() -> Self {
        Self {
            mode: NormalizeMode::Lenient,
            indicators: CLIENT_INDICATORS,
            min_text_chars: MIN_TEXT_CHARS,
        }
    }

    /// HTTP handler path: vocabulary also counts `resume` and `cv`.
    pub fn server() -> Self {
        Self {
            mode: NormalizeMode::Lenient,
            indicators: SERVER_INDICATORS,
            min_text_chars: MIN_TEXT_CHARS,
        }
    }

    pub fn with_mode(mut self, mode: NormalizeMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self::server()
    }
}

/// Normalizes raw text and applies the acceptance gate.
pub(crate) fn validate(
    raw: &str,
    kind: DocumentKind,
    strategy: Strategy,
    encoding: Option<TextEncoding>,
    options: &ExtractionOptions,
) -> Result<ValidatedText, ExtractionError> {
    let text = normalize::normalize(raw, options.mode);
    let char_count = text.chars().count();
    let indicator_count = normalize::keyword_indicator_count(&text, options.indicators);

    if indicator_count < LOW_INDICATOR_WARNING {
        warn!(
            indicator_count,
            chars = char_count,
            "Extracted text has few resume indicators; extraction quality may be poor"
        );
    }

    let has_letter = text.chars().any(|c| c.is_ascii_alphabetic());
    if char_count < options.min_text_chars || !has_letter {
        info!(
            chars = char_count,
            ?strategy,
            "Rejecting extraction: insufficient readable text"
        );
        return Err(ExtractionError::InsufficientExtractedText {
            chars: char_count,
            min: options.min_text_chars,
        });
    }

    Ok(ValidatedText {
        text,
        char_count,
        indicator_count,
        strategy,
        encoding,
        kind,
    })
}
