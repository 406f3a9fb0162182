use thiserror::Error;

/// Failures surfaced by the document extraction pipeline.
///
/// Decoding problems never appear here: invalid byte sequences are replaced at
/// decode time, and a strategy that finds nothing just hands over to the next one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File is empty or truncated ({len} bytes, need at least {min})")]
    EmptyOrTruncatedBuffer { len: usize, min: usize },

    #[error("Insufficient readable text extracted ({chars} characters, need at least {min})")]
    InsufficientExtractedText { chars: usize, min: usize },
}

impl ExtractionError {
    /// Caller-facing remediation hint.
    pub fn hint(&self) -> &'static str {
        match self {
            ExtractionError::NoFileProvided => "Attach a resume file in the 'file' field.",
            ExtractionError::UnsupportedFileType(_) => {
                "Upload a PDF, DOCX or plain text (.txt) file."
            }
            ExtractionError::EmptyOrTruncatedBuffer { .. } => {
                "The upload looks empty or cut short. Re-export the document and try again."
            }
            ExtractionError::InsufficientExtractedText { .. } => {
                "The document may be scanned or image-only, or use an unsupported encoding. \
                 Try a text-based PDF, a DOCX, or paste the resume as plain text."
            }
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::NoFileProvided => "NO_FILE_PROVIDED",
            ExtractionError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            ExtractionError::EmptyOrTruncatedBuffer { .. } => "EMPTY_OR_TRUNCATED_BUFFER",
            ExtractionError::InsufficientExtractedText { .. } => "INSUFFICIENT_EXTRACTED_TEXT",
        }
    }
}
