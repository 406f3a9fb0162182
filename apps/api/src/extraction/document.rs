//! Document routing: picks the PDF, DOCX or plain-text branch and runs it through
//! the normalizer and acceptance gate.

use serde::Serialize;
use tracing::{info, warn};

use super::decoder::{decode, TextEncoding};
use super::error::ExtractionError;
use super::{docx, recover_pdf_text, validate, ExtractionOptions, Strategy};

/// Buffers shorter than this cannot hold a usable resume.
pub const MIN_DOCUMENT_BYTES: usize = 50;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// An uploaded file, borrowed for the duration of one extraction.
#[derive(Debug, Clone, Copy)]
pub struct RawDocument<'a> {
    pub bytes: &'a [u8],
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" | "text" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            "text/plain" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    /// Kind implied by the declared name and MIME type.
    ///
    /// `Ok(None)` means nothing useful was declared and the content must be sniffed.
    pub fn from_declared(
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Option<Self>, ExtractionError> {
        let ext = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty());
        let mime = content_type
            .map(str::trim)
            .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("application/octet-stream"));

        if let Some(kind) = ext.and_then(Self::from_extension) {
            return Ok(Some(kind));
        }
        if let Some(kind) = mime.and_then(Self::from_mime) {
            return Ok(Some(kind));
        }
        match (ext, mime) {
            (None, None) => Ok(None),
            (Some(ext), _) => Err(ExtractionError::UnsupportedFileType(format!(".{ext}"))),
            (None, Some(mime)) => Err(ExtractionError::UnsupportedFileType(mime.to_string())),
        }
    }

    /// Guesses the kind from leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            Some(DocumentKind::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentKind::Docx)
        } else if std::str::from_utf8(bytes).is_ok() {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }
}

/// Final cleaned text plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedText {
    pub text: String,
    pub char_count: usize,
    /// Resume-vocabulary terms found in `text`. Diagnostic only.
    pub indicator_count: usize,
    pub strategy: Strategy,
    pub encoding: Option<TextEncoding>,
    pub kind: DocumentKind,
}

/// Extracts validated resume text from an uploaded document.
pub fn extract_document(
    doc: &RawDocument<'_>,
    options: &ExtractionOptions,
) -> Result<ValidatedText, ExtractionError> {
    let declared = DocumentKind::from_declared(doc.file_name, doc.content_type)?;

    if doc.bytes.len() < MIN_DOCUMENT_BYTES {
        return Err(ExtractionError::EmptyOrTruncatedBuffer {
            len: doc.bytes.len(),
            min: MIN_DOCUMENT_BYTES,
        });
    }

    let kind = match declared {
        Some(kind) => kind,
        None => DocumentKind::sniff(doc.bytes).ok_or_else(|| {
            ExtractionError::UnsupportedFileType("unrecognised content".to_string())
        })?,
    };

    info!(?kind, bytes = doc.bytes.len(), "Extracting document text");

    match kind {
        DocumentKind::Pdf => {
            let (strategy, output) = recover_pdf_text(doc.bytes);
            info!(
                ?strategy,
                encoding = ?output.encoding,
                chars = output.char_len(),
                crossed = output.crossed_threshold,
                "PDF text recovered"
            );
            validate(&output.text, kind, strategy, output.encoding, options)
        }
        DocumentKind::Docx => {
            let text = docx::document_text(doc.bytes).unwrap_or_else(|e| {
                warn!("DOCX could not be read, treating as empty: {e}");
                String::new()
            });
            validate(&text, kind, Strategy::Docx, None, options)
        }
        DocumentKind::PlainText => {
            let (text, encoding) = match std::str::from_utf8(doc.bytes) {
                Ok(s) => (s.to_string(), TextEncoding::Utf8),
                Err(_) => (
                    decode(doc.bytes, TextEncoding::Windows1252),
                    TextEncoding::Windows1252,
                ),
            };
            validate(&text, kind, Strategy::PlainText, Some(encoding), options)
        }
    }
}
