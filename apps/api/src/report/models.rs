//! Serde models for the two generated reports.
//!
//! Field names mirror the JSON the model is instructed to emit (camelCase,
//! hyphenated section keys), so parse → serialize is byte-stable once a
//! report has been normalized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Client report
// ────────────────────────────────────────────────────────────────────────────

/// Envelope the model wraps the client report in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientReportEnvelope {
    #[serde(rename = "clientReport")]
    pub client_report: ClientReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientReport {
    #[serde(rename = "question-section", default)]
    pub question_section: Vec<QuestionInsight>,
    #[serde(rename = "highlight-section", default)]
    pub highlight_section: HighlightSection,
}

/// One per assessment question: the question, the client's own words, and
/// the model's reflections on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionInsight {
    #[serde(rename = "type", default = "question_type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "clientResponse", default)]
    pub client_response: String,
    #[serde(rename = "aiInsights", default)]
    pub ai_insights: Vec<String>,
}

fn question_type() -> String {
    "question-insight".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightSection {
    #[serde(rename = "type", default = "highlight_type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<HighlightPoints>,
    #[serde(rename = "closingStatement", default)]
    pub closing_statement: String,
}

fn highlight_type() -> String {
    "highlight".to_string()
}

impl Default for HighlightSection {
    fn default() -> Self {
        Self {
            kind: highlight_type(),
            title: String::new(),
            content: String::new(),
            points: None,
            closing_statement: String::new(),
        }
    }
}

/// The model emits `points` either as a name→description map or a plain list.
/// `BTreeMap` keeps map keys ordered so re-serialization is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HighlightPoints {
    Named(BTreeMap<String, String>),
    Plain(Vec<String>),
}

impl HighlightPoints {
    pub fn is_empty(&self) -> bool {
        match self {
            HighlightPoints::Named(map) => map.is_empty(),
            HighlightPoints::Plain(list) => list.is_empty(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Practitioner report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PractitionerReportEnvelope {
    #[serde(rename = "practitionerReport")]
    pub practitioner_report: PractitionerReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PractitionerReport {
    #[serde(default)]
    pub sections: Vec<ReportSection>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(rename = "projectedTransformationOutcomes", default)]
    pub projected_transformation_outcomes: Vec<String>,
    #[serde(rename = "closingStatement", default)]
    pub closing_statement: String,
    #[serde(
        rename = "practitionerNotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub practitioner_notes: Option<PractitionerNotes>,
}

/// Free-form practitioner section. The model varies which fields it fills,
/// so everything beyond `type`/`title` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "sub-title", default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(
        rename = "primaryObjective",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_objective: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: PhaseItems,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseItems {
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub tools: String,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub milestone: String,
    #[serde(rename = "targetWeek", default)]
    pub target_week: String,
    #[serde(rename = "toolsAndFocus", default)]
    pub tools_and_focus: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PractitionerNotes {
    #[serde(default)]
    pub temperament: String,
    #[serde(rename = "best-practices", default)]
    pub best_practices: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline output
// ────────────────────────────────────────────────────────────────────────────

/// Both normalized reports plus the name used for greetings and filenames.
/// Serialized as the generate endpoint's response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsResult {
    #[serde(rename = "clientContent")]
    pub client_report: ClientReport,
    #[serde(rename = "practitionerContent")]
    pub practitioner_report: PractitionerReport,
    #[serde(rename = "firstName")]
    pub first_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_report_round_trips_hyphenated_keys() {
        let json = r#"{
            "question-section": [
                {"type": "question-insight", "title": "Q1", "clientResponse": "ans", "aiInsights": ["a", "b"]}
            ],
            "highlight-section": {
                "type": "highlight",
                "title": "Highlights",
                "content": "text",
                "points": {"Clarity": "seeing clearly"},
                "closingStatement": "Your journey begins now."
            }
        }"#;
        let report: ClientReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.question_section.len(), 1);
        assert_eq!(report.question_section[0].ai_insights.len(), 2);

        let out = serde_json::to_value(&report).unwrap();
        assert!(out.get("question-section").is_some());
        assert!(out.get("highlight-section").is_some());
    }

    #[test]
    fn test_highlight_points_accepts_map_or_list() {
        let named: HighlightPoints = serde_json::from_str(r#"{"A": "x"}"#).unwrap();
        assert!(matches!(named, HighlightPoints::Named(_)));

        let plain: HighlightPoints = serde_json::from_str(r#"["x", "y"]"#).unwrap();
        assert!(matches!(plain, HighlightPoints::Plain(_)));
    }

    #[test]
    fn test_practitioner_report_tolerates_sparse_sections() {
        let json = r#"{
            "sections": [
                {"type": "overview", "title": "Client Summary", "content": "..."},
                {"type": "protocol", "title": "Plan", "phases": [
                    {"type": "phase", "title": "Weeks 1-2",
                     "items": {"focus": "grounding", "tools": "breathwork", "goal": "stability"}}
                ]}
            ],
            "milestones": [],
            "closingStatement": "Onward."
        }"#;
        let report: PractitionerReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.sections.len(), 2);
        assert!(report.milestones.is_empty());
        assert_eq!(report.sections[1].phases[0].items.tools, "breathwork");
    }
}
