//! Text normalizer and resume-quality diagnostics.
//!
//! `normalize` is total and idempotent: every filter works on single tokens, and the
//! output only contains tokens that already survived every filter.

/// Resume vocabulary counted by the upload-widget path.
pub const CLIENT_INDICATORS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "work",
    "job",
    "university",
    "college",
    "school",
    "degree",
    "bachelor",
    "master",
    "company",
    "project",
    "manager",
    "developer",
    "engineer",
    "analyst",
    "email",
    "phone",
    "@",
    "linkedin",
    "github",
];

/// Resume vocabulary counted by the HTTP handler path.
pub const SERVER_INDICATORS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "work",
    "job",
    "university",
    "college",
    "school",
    "degree",
    "bachelor",
    "master",
    "company",
    "project",
    "manager",
    "developer",
    "engineer",
    "analyst",
    "email",
    "phone",
    "@",
    "linkedin",
    "github",
    "resume",
    "cv",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalizeMode {
    #[default]
    Lenient,
    /// Also drops all-uppercase tokens of 3+ characters as likely encoding noise.
    Strict,
}

/// Per-token filter applied by the normalizer; the two modes differ only in the
/// all-caps rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenFilter {
    /// Tokens shorter than this are dropped.
    pub min_len: usize,
    /// Purely numeric tokens shorter than this are dropped.
    pub min_numeric_len: usize,
    /// All-uppercase tokens at least this long are dropped.
    pub drop_all_caps_from: Option<usize>,
}

impl TokenFilter {
    pub fn for_mode(mode: NormalizeMode) -> Self {
        Self {
            min_len: 3,
            min_numeric_len: 4,
            drop_all_caps_from: match mode {
                NormalizeMode::Lenient => None,
                NormalizeMode::Strict => Some(3),
            },
        }
    }

    pub fn keeps(&self, token: &str) -> bool {
        let len = token.chars().count();
        if len < self.min_len {
            return false;
        }
        if token.chars().all(|c| c.is_ascii_digit()) && len < self.min_numeric_len {
            return false;
        }
        match self.drop_all_caps_from {
            Some(limit) if len >= limit && is_all_caps(token) => false,
            _ => true,
        }
    }
}

/// Collapses every whitespace run to one space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the token has an uppercase letter and no lowercase ones.
pub fn is_all_caps(token: &str) -> bool {
    token.chars().any(|c| c.is_uppercase()) && !token.chars().any(|c| c.is_lowercase())
}

/// Word characters, whitespace, and `@ . - ( )`.
pub fn is_whitelisted(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || matches!(c, '@' | '.' | '-' | '(' | ')')
}

/// Replaces non-whitelisted characters with spaces, then collapses whitespace.
pub fn scrub(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if is_whitelisted(c) { c } else { ' ' })
        .collect();
    collapse_whitespace(&replaced)
}

/// Scrubs `text` and keeps only the tokens `filter` accepts.
pub fn clean_tokens(text: &str, filter: TokenFilter) -> String {
    scrub(text)
        .split(' ')
        .filter(|token| filter.keeps(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes extracted text for scoring. Never fails.
pub fn normalize(raw: &str, mode: NormalizeMode) -> String {
    clean_tokens(&collapse_whitespace(raw), TokenFilter::for_mode(mode))
}

/// Counts how many vocabulary terms occur anywhere in `text`, ignoring case.
pub fn keyword_indicator_count(text: &str, vocabulary: &[&str]) -> usize {
    let lower = text.to_lowercase();
    vocabulary
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .count()
}
