use std::sync::Arc;

use crate::config::Config;
use crate::extraction::ExtractionOptions;
use crate::scoring::ResumeScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable scorer. Default: KeywordAtsScorer. LlmAtsScorer when an API key is set.
    pub scorer: Arc<dyn ResumeScorer>,
    /// Normalizer settings for uploads received over HTTP.
    pub options: ExtractionOptions,
}
