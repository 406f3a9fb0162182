//! ATS scoring: pluggable, trait-based scorer fed with extracted resume text.
//!
//! Default: `KeywordAtsScorer` (pure Rust, deterministic, no network).
//! With an API key configured: `LlmAtsScorer` (opaque text-in / JSON-out LLM call).
//!
//! `AppState` holds an `Arc<dyn ResumeScorer>`, chosen at startup from config.

pub mod keyword;
pub mod llm;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub use keyword::KeywordAtsScorer;
pub use llm::LlmAtsScorer;

/// Score for one resume section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: String,
    pub found: bool,
    pub points: u32,
    pub max_points: u32,
}

/// Report returned to callers. Every backend produces the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub overall_score: u32, // 0 – 100
    #[serde(default)]
    pub section_scores: Vec<SectionScore>,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub scorer_backend: String, // "keyword" | "llm"
}

/// Implement this to swap scoring backends without touching handlers.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(
        &self,
        resume_text: &str,
        job_role: Option<&str>,
    ) -> Result<ScoreReport, AppError>;
}
