// ATS scoring prompt templates.

pub const ATS_SCORE_SYSTEM: &str = "\
You are an applicant tracking system (ATS) reviewer. \
Score resumes the way automated screening software would: section structure, keyword coverage \
for the target role, quantified impact, and readability. \
You MUST respond with valid JSON only. No markdown fences, no explanations. \
The resume text was recovered heuristically from an upload and may contain stray fragments; \
ignore obvious extraction noise rather than penalising it.";

pub const ATS_SCORE_PROMPT: &str = r#"Score the following resume for the target role.

TARGET ROLE:
{job_role}

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "overall_score": 0-100,
  "section_scores": [
    {"section": "experience" | "education" | "skills" | "contact" | "projects", "found": true | false, "points": number, "max_points": number}
  ],
  "matched_keywords": ["string"],
  "missing_keywords": ["string"],
  "suggestions": ["string"]
}"#;

/// Used when the caller gives no target role.
pub const ANY_ROLE: &str = "General (no specific role given)";
