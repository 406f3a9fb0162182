use std::collections::HashSet;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;
use crate::extraction::char_pattern::EMAIL;
use crate::scoring::{ResumeScorer, ScoreReport, SectionScore};

/// Points available for role keyword coverage; sections share the rest.
const KEYWORD_POINTS: u32 = 30;
const SHORT_RESUME_WORDS: usize = 150;
const LONG_RESUME_WORDS: usize = 1000;
const MISSING_KEYWORDS_IN_SUGGESTION: usize = 5;

struct SectionRule {
    name: &'static str,
    points: u32,
    markers: &'static [&'static str],
}

const SECTION_RULES: &[SectionRule] = &[
    SectionRule {
        name: "experience",
        points: 20,
        markers: &["experience", "employment", "work history", "internship"],
    },
    SectionRule {
        name: "education",
        points: 15,
        markers: &["education", "university", "college", "degree", "bachelor", "master"],
    },
    SectionRule {
        name: "skills",
        points: 15,
        markers: &["skills", "technologies", "proficient", "tools"],
    },
    SectionRule {
        name: "projects",
        points: 10,
        markers: &["project", "projects", "portfolio"],
    },
];

/// Contact details: an email address or a phone number.
const CONTACT_POINTS: u32 = 10;

const ENGINEERING_KEYWORDS: &[&str] = &[
    "git", "api", "testing", "sql", "cloud", "agile", "docker", "python", "java", "javascript",
];
const DATA_KEYWORDS: &[&str] = &[
    "sql",
    "python",
    "excel",
    "statistics",
    "tableau",
    "machine learning",
    "pandas",
    "visualization",
    "dashboard",
    "analysis",
];
const PRODUCT_KEYWORDS: &[&str] = &[
    "roadmap",
    "stakeholder",
    "strategy",
    "metrics",
    "agile",
    "launch",
    "customer",
    "prioritization",
    "cross-functional",
    "analytics",
];
const DESIGN_KEYWORDS: &[&str] = &[
    "figma",
    "user research",
    "prototype",
    "wireframe",
    "usability",
    "accessibility",
    "design system",
    "interaction",
    "ux",
    "ui",
];
const GENERAL_KEYWORDS: &[&str] = &[
    "led", "built", "managed", "developed", "designed", "improved", "delivered", "launched",
    "created", "achieved",
];

/// Picks the keyword table for a free-text job role.
fn role_keywords(job_role: Option<&str>) -> &'static [&'static str] {
    let Some(role) = job_role.map(str::to_lowercase) else {
        return GENERAL_KEYWORDS;
    };
    if role.contains("data") || role.contains("analyst") {
        DATA_KEYWORDS
    } else if role.contains("product") || role.contains("manager") {
        PRODUCT_KEYWORDS
    } else if role.contains("design") {
        DESIGN_KEYWORDS
    } else if role.contains("engineer") || role.contains("developer") || role.contains("software")
    {
        ENGINEERING_KEYWORDS
    } else {
        GENERAL_KEYWORDS
    }
}

/// Lowercased view of resume text for keyword lookups.
struct ResumeText {
    phrase: String,
    words: HashSet<String>,
}

impl ResumeText {
    fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '+' || c == '#'))
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect();
        Self {
            phrase: format!(" {} ", words.join(" ")),
            words: words.into_iter().collect(),
        }
    }

    /// Single words match whole tokens; phrases match on word boundaries.
    fn has(&self, keyword: &str) -> bool {
        if keyword.contains(' ') {
            self.phrase.contains(&format!(" {keyword} "))
        } else {
            self.words.contains(keyword)
        }
    }

    fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }
}

/// Deterministic, network-free ATS scorer.
///
/// Algorithm:
/// 1. Section presence: experience 20, education 15, skills 15, projects 10, contact 10
/// 2. Role keyword coverage: matched / total × 30
/// 3. overall_score = sum, capped at 100
pub struct KeywordAtsScorer;

#[async_trait]
impl ResumeScorer for KeywordAtsScorer {
    async fn score(
        &self,
        resume_text: &str,
        job_role: Option<&str>,
    ) -> Result<ScoreReport, AppError> {
        Ok(compute_keyword_score(resume_text, job_role))
    }
}

fn compute_keyword_score(resume_text: &str, job_role: Option<&str>) -> ScoreReport {
    let resume = ResumeText::new(resume_text);

    let mut section_scores: Vec<SectionScore> = SECTION_RULES
        .iter()
        .map(|rule| {
            let found = rule.markers.iter().any(|m| resume.has(m));
            SectionScore {
                section: rule.name.to_string(),
                found,
                points: if found { rule.points } else { 0 },
                max_points: rule.points,
            }
        })
        .collect();

    let has_contact = EMAIL.is_match(resume_text) || has_phone_number(resume_text);
    section_scores.push(SectionScore {
        section: "contact".to_string(),
        found: has_contact,
        points: if has_contact { CONTACT_POINTS } else { 0 },
        max_points: CONTACT_POINTS,
    });

    let keywords = role_keywords(job_role);
    let (matched, missing): (Vec<&str>, Vec<&str>) =
        keywords.iter().copied().partition(|kw| resume.has(kw));

    let keyword_points = if keywords.is_empty() {
        0
    } else {
        ((matched.len() as f32 / keywords.len() as f32) * KEYWORD_POINTS as f32).round() as u32
    };
    let section_points: u32 = section_scores.iter().map(|s| s.points).sum();
    let overall_score = (section_points + keyword_points).min(100);

    let suggestions = build_suggestions(&section_scores, &missing, &resume, resume_text);

    ScoreReport {
        overall_score,
        section_scores,
        matched_keywords: matched.into_iter().map(String::from).collect(),
        missing_keywords: missing.into_iter().map(String::from).collect(),
        suggestions,
        scorer_backend: "keyword".to_string(),
    }
}

/// Ten digits grouped 3-3-4, with an optional `+country` prefix and area-code parentheses.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+[0-9]{1,3}[\s.\-]?)?(?:\([0-9]{3}\)|\b[0-9]{3})[\s.\-]?[0-9]{3}[\s.\-]?[0-9]{4}\b")
        .expect("valid regex")
});

fn has_phone_number(text: &str) -> bool {
    PHONE.is_match(text)
}

fn build_suggestions(
    sections: &[SectionScore],
    missing: &[&str],
    resume: &ResumeText,
    raw: &str,
) -> Vec<String> {
    let mut suggestions: Vec<String> = sections
        .iter()
        .filter(|s| !s.found)
        .map(|s| format!("Add a clearly labelled {} section.", s.section))
        .collect();

    if !missing.is_empty() {
        let top: Vec<&str> = missing
            .iter()
            .take(MISSING_KEYWORDS_IN_SUGGESTION)
            .copied()
            .collect();
        suggestions.push(format!(
            "Consider covering these keywords where truthful: {}.",
            top.join(", ")
        ));
    }

    if !raw.chars().any(|c| c.is_ascii_digit()) {
        suggestions.push(
            "Quantify achievements with numbers, percentages or time saved.".to_string(),
        );
    }

    let words = resume.word_count();
    if words < SHORT_RESUME_WORDS {
        suggestions.push(format!(
            "Resume text is short ({words} words); ATS systems favour fuller descriptions."
        ));
    } else if words > LONG_RESUME_WORDS {
        suggestions.push(format!(
            "Resume text is long ({words} words); consider trimming to the most relevant roles."
        ));
    }

    suggestions
}
