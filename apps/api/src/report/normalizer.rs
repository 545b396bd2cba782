//! Report Normalizer — parses raw model output into typed reports and fills
//! structural gaps so the renderer never sees a half-formed document.
//!
//! Parsing is fallible by design; callers decide whether a parse failure
//! falls back to a skeleton report or aborts the request.

use std::collections::BTreeMap;

use crate::assessment::ValidatedSubmission;
use crate::llm_client::strip_json_fences;
use crate::report::models::{
    ClientReport, ClientReportEnvelope, HighlightPoints, HighlightSection, PractitionerReport,
    PractitionerReportEnvelope,
};
use crate::report::prompts::QUESTION_TEXTS;

const FALLBACK_HIGHLIGHT_TITLE: &str = "What the Neuro Change Method™ Can Do for You";
const FALLBACK_CLOSING: &str = "Your journey begins now.";

/// Parses the client generation's raw text. The model wraps the report in a
/// `clientReport` envelope; fences are tolerated even in JSON mode.
pub fn parse_client_report(raw: &str) -> Result<ClientReport, serde_json::Error> {
    let envelope: ClientReportEnvelope = serde_json::from_str(strip_json_fences(raw))?;
    Ok(envelope.client_report)
}

pub fn parse_practitioner_report(raw: &str) -> Result<PractitionerReport, serde_json::Error> {
    let envelope: PractitionerReportEnvelope = serde_json::from_str(strip_json_fences(raw))?;
    Ok(envelope.practitioner_report)
}

/// Skeleton client report used when the model's output cannot be parsed.
/// The highlight title and closing line are fixed marketing copy.
pub fn fallback_client_report() -> ClientReport {
    ClientReport {
        question_section: Vec::new(),
        highlight_section: fallback_highlight_section(),
    }
}

pub fn fallback_practitioner_report() -> PractitionerReport {
    PractitionerReport::default()
}

fn fallback_highlight_section() -> HighlightSection {
    HighlightSection {
        kind: "highlight".to_string(),
        title: FALLBACK_HIGHLIGHT_TITLE.to_string(),
        content: String::new(),
        points: Some(HighlightPoints::Named(BTreeMap::new())),
        closing_statement: FALLBACK_CLOSING.to_string(),
    }
}

/// Repairs a parsed client report in place:
/// - re-attaches question titles and the client's verbatim answers by index
///   (the model is only asked for insights, not for echoing either),
/// - truncates surplus question entries past the five asked,
/// - substitutes the fallback highlight section when the model omitted one.
///
/// Idempotent: normalizing an already-normalized report changes nothing.
pub fn normalize_client_report(report: &mut ClientReport, submission: &ValidatedSubmission) {
    report.question_section.truncate(QUESTION_TEXTS.len());

    for (i, insight) in report.question_section.iter_mut().enumerate() {
        insight.kind = "question-insight".to_string();
        insight.title = QUESTION_TEXTS[i].to_string();
        insight.client_response = submission.answers[i].clone();
    }

    let highlight = &mut report.highlight_section;
    if highlight.title.is_empty() && highlight.content.is_empty() {
        *highlight = fallback_highlight_section();
    }
    if highlight.closing_statement.is_empty() {
        highlight.closing_statement = FALLBACK_CLOSING.to_string();
    }
}

/// Repairs a parsed practitioner report in place: drops milestones with no
/// content so the renderer can skip the table outright, and strips sections
/// that carry neither title nor body.
///
/// Idempotent, like [`normalize_client_report`].
pub fn normalize_practitioner_report(report: &mut PractitionerReport) {
    report.milestones.retain(|m| {
        !m.milestone.trim().is_empty()
            || !m.target_week.trim().is_empty()
            || !m.tools_and_focus.trim().is_empty()
    });

    report.sections.retain(|s| {
        !s.title.trim().is_empty()
            || s.content.as_deref().is_some_and(|c| !c.trim().is_empty())
            || !s.items.is_empty()
            || !s.phases.is_empty()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::{Milestone, QuestionInsight, ReportSection};

    fn submission() -> ValidatedSubmission {
        ValidatedSubmission {
            first_name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            practitioner_email: None,
            answers: [
                "first answer text".to_string(),
                "second answer text".to_string(),
                "third answer text".to_string(),
                "fourth answer text".to_string(),
                "fifth answer text".to_string(),
            ],
        }
    }

    fn insight(n: usize) -> QuestionInsight {
        QuestionInsight {
            kind: "question-insight".to_string(),
            title: String::new(),
            client_response: String::new(),
            ai_insights: vec![format!("insight {n}")],
        }
    }

    #[test]
    fn test_parse_client_report_tolerates_fences() {
        let raw = "```json\n{\"clientReport\": {\"question-section\": [], \"highlight-section\": {\"type\": \"highlight\", \"title\": \"T\", \"content\": \"C\", \"closingStatement\": \"End.\"}}}\n```";
        let report = parse_client_report(raw).expect("should parse");
        assert_eq!(report.highlight_section.title, "T");
    }

    #[test]
    fn test_parse_failure_is_an_err_not_a_panic() {
        assert!(parse_client_report("not json at all").is_err());
        assert!(parse_practitioner_report("{\"wrongKey\": {}}").is_err());
    }

    #[test]
    fn test_normalize_reattaches_titles_and_answers() {
        let mut report = ClientReport {
            question_section: (0..5).map(insight).collect(),
            highlight_section: fallback_highlight_section(),
        };
        normalize_client_report(&mut report, &submission());

        assert_eq!(report.question_section[0].title, QUESTION_TEXTS[0]);
        assert_eq!(report.question_section[4].title, QUESTION_TEXTS[4]);
        assert_eq!(report.question_section[2].client_response, "third answer text");
    }

    #[test]
    fn test_normalize_truncates_surplus_questions() {
        let mut report = ClientReport {
            question_section: (0..8).map(insight).collect(),
            highlight_section: fallback_highlight_section(),
        };
        normalize_client_report(&mut report, &submission());
        assert_eq!(report.question_section.len(), 5);
    }

    #[test]
    fn test_normalize_fills_missing_highlight_section() {
        let mut report: ClientReport =
            serde_json::from_str(r#"{"question-section": []}"#).unwrap();
        normalize_client_report(&mut report, &submission());

        assert_eq!(report.highlight_section.title, FALLBACK_HIGHLIGHT_TITLE);
        assert_eq!(report.highlight_section.closing_statement, FALLBACK_CLOSING);
    }

    #[test]
    fn test_normalize_is_byte_idempotent() {
        let mut report = ClientReport {
            question_section: (0..5).map(insight).collect(),
            highlight_section: fallback_highlight_section(),
        };
        let sub = submission();

        normalize_client_report(&mut report, &sub);
        let once = serde_json::to_vec(&report).unwrap();
        normalize_client_report(&mut report, &sub);
        let twice = serde_json::to_vec(&report).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_practitioner_normalize_drops_empty_milestones_and_sections() {
        let mut report = PractitionerReport {
            milestones: vec![
                Milestone {
                    milestone: "Establish baseline".to_string(),
                    target_week: "Week 1-2".to_string(),
                    tools_and_focus: "Journaling".to_string(),
                },
                Milestone {
                    milestone: "  ".to_string(),
                    target_week: String::new(),
                    tools_and_focus: String::new(),
                },
            ],
            sections: vec![ReportSection {
                kind: "section".to_string(),
                title: String::new(),
                content: None,
                sub_title: None,
                reason: None,
                primary_objective: None,
                items: Vec::new(),
                phases: Vec::new(),
            }],
            ..Default::default()
        };
        normalize_practitioner_report(&mut report);
        assert_eq!(report.milestones.len(), 1);
        assert!(report.sections.is_empty());
    }

    #[test]
    fn test_fallback_reports_have_required_defaults() {
        let client = fallback_client_report();
        assert!(client.question_section.is_empty());
        assert_eq!(client.highlight_section.closing_statement, FALLBACK_CLOSING);

        let practitioner = fallback_practitioner_report();
        assert!(practitioner.sections.is_empty());
        assert!(practitioner.milestones.is_empty());
    }
}
