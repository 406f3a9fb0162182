use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::scoring::prompts::{ANY_ROLE, ATS_SCORE_PROMPT, ATS_SCORE_SYSTEM};
use crate::scoring::{ResumeScorer, ScoreReport};

/// Semantic ATS scorer. The LLM is treated as an opaque text-in / JSON-out service.
pub struct LlmAtsScorer(pub LlmClient);

#[async_trait]
impl ResumeScorer for LlmAtsScorer {
    async fn score(
        &self,
        resume_text: &str,
        job_role: Option<&str>,
    ) -> Result<ScoreReport, AppError> {
        let prompt = build_prompt(resume_text, job_role);
        info!(model = self.0.model(), "Requesting LLM ATS score");

        let report: ScoreReport = self
            .0
            .complete_json(&prompt, ATS_SCORE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("ATS scoring failed: {e}")))?;

        Ok(finish_report(report))
    }
}

/// Fills the template placeholders in one pass; inserted text is never rescanned.
fn build_prompt(resume_text: &str, job_role: Option<&str>) -> String {
    let role = job_role.unwrap_or(ANY_ROLE);
    let mut prompt =
        String::with_capacity(ATS_SCORE_PROMPT.len() + role.len() + resume_text.len());
    let mut rest = ATS_SCORE_PROMPT;

    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{job_role}") {
            prompt.push_str(role);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{resume_text}") {
            prompt.push_str(resume_text);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Clamps the model's score into range and labels the backend.
fn finish_report(mut report: ScoreReport) -> ScoreReport {
    report.overall_score = report.overall_score.min(100);
    report.scorer_backend = "llm".to_string();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_role_and_text() {
        let prompt = build_prompt("Jane Doe, Rust engineer", Some("Platform Engineer"));
        assert!(prompt.contains("Platform Engineer"));
        assert!(prompt.contains("Jane Doe, Rust engineer"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_defaults_role() {
        assert!(build_prompt("text", None).contains(ANY_ROLE));
    }

    #[test]
    fn test_resume_text_with_placeholder_is_left_alone() {
        let prompt = build_prompt("I wrote {job_role} templates", Some("Writer"));
        assert!(prompt.contains("I wrote {job_role} templates"));
    }

    #[test]
    fn test_role_with_placeholder_does_not_pull_in_resume() {
        let prompt = build_prompt("SECRET RESUME BODY", Some("Engineer {resume_text}"));
        assert_eq!(prompt.matches("SECRET RESUME BODY").count(), 1);
        assert!(prompt.contains("Engineer {resume_text}"));
    }

    #[test]
    fn test_schema_braces_survive_substitution() {
        let prompt = build_prompt("text", None);
        assert!(prompt.contains("\"overall_score\": 0-100"));
        assert!(prompt.trim_end().ends_with('}'));
    }

    #[test]
    fn test_llm_report_deserializes_with_defaults_and_is_clamped() {
        let report: ScoreReport =
            serde_json::from_str(r#"{"overall_score": 140, "suggestions": ["Add metrics"]}"#)
                .unwrap();
        let report = finish_report(report);
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.scorer_backend, "llm");
        assert!(report.section_scores.is_empty());
        assert_eq!(report.suggestions, vec!["Add metrics".to_string()]);
    }
}
