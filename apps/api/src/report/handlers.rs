//! Axum route handlers for report generation and rendering.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::assessment::{sanitize, validate, AssessmentSubmission};
use crate::errors::{AppError, ValidationIssue};
use crate::pdf::{render_client_pdf, render_practitioner_pdf};
use crate::report::models::{ClientReport, PractitionerReport, ReportsResult};
use crate::report::requester::generate_reports;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportAudience {
    Client,
    Practitioner,
}

#[derive(Debug, Deserialize)]
pub struct RenderReportRequest {
    pub audience: ReportAudience,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "clientContent", default)]
    pub client_content: Option<ClientReport>,
    #[serde(rename = "practitionerContent", default)]
    pub practitioner_content: Option<PractitionerReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/reports/generate
///
/// Full pipeline: sanitize → validate → two concurrent generations →
/// normalize. Returns both reports as JSON; PDFs are rendered separately.
pub async fn handle_generate_reports(
    State(state): State<AppState>,
    Json(submission): Json<AssessmentSubmission>,
) -> Result<Json<ReportsResult>, AppError> {
    let submission = sanitize(submission);
    let validated = validate(&submission).map_err(AppError::Validation)?;

    info!(first_name = %validated.first_name, "starting report generation");
    let result = generate_reports(state.llm.as_ref(), &validated).await?;

    Ok(Json(result))
}

/// POST /api/v1/reports/render
///
/// Renders one previously generated report to PDF and returns it as a
/// download. The body is the generate response plus an `audience` selector.
pub async fn handle_render_report(
    State(_state): State<AppState>,
    Json(request): Json<RenderReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let first_name = safe_name(&request.first_name);

    let (pdf, filename) = match request.audience {
        ReportAudience::Client => {
            let report = request.client_content.ok_or_else(|| {
                AppError::Validation(vec![ValidationIssue::new(
                    "clientContent",
                    "clientContent is required when audience is \"client\"",
                )])
            })?;
            let pdf = render_client_pdf(&report, &request.first_name)
                .map_err(|e| AppError::Render(e.to_string()))?;
            (pdf, format!("Client_Report_{first_name}.pdf"))
        }
        ReportAudience::Practitioner => {
            let report = request.practitioner_content.ok_or_else(|| {
                AppError::Validation(vec![ValidationIssue::new(
                    "practitionerContent",
                    "practitionerContent is required when audience is \"practitioner\"",
                )])
            })?;
            let pdf = render_practitioner_pdf(&report, &request.first_name)
                .map_err(|e| AppError::Render(e.to_string()))?;
            (pdf, format!("Practitioner_Report_{first_name}.pdf"))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Bytes::from(pdf),
    ))
}

/// Restricts a name to filename-safe characters.
fn safe_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "Client".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::response::IntoResponse;

    use crate::config::Config;
    use crate::email::Mailer;
    use crate::llm_client::{ChatModel, LlmError};

    struct StubModel {
        fail_with_timeout: bool,
    }

    #[async_trait]
    impl ChatModel for StubModel {
        async fn complete_json(&self, system: &str, _user: &str) -> Result<String, LlmError> {
            if self.fail_with_timeout {
                return Err(LlmError::Timeout);
            }
            if system.contains("personalized client report") {
                Ok(r#"{"clientReport": {
                    "question-section": [
                        {"type": "question-insight", "aiInsights": ["a"]},
                        {"type": "question-insight", "aiInsights": ["b"]},
                        {"type": "question-insight", "aiInsights": ["c"]},
                        {"type": "question-insight", "aiInsights": ["d"]},
                        {"type": "question-insight", "aiInsights": ["e"]}
                    ],
                    "highlight-section": {
                        "type": "highlight", "title": "Highlights", "content": "...",
                        "points": {"Purpose Mapping": "clarifies direction"},
                        "closingStatement": "Onward."
                    }
                }}"#
                .to_string())
            } else {
                Ok(r#"{"practitionerReport": {
                    "sections": [{"type": "section", "title": "Client Summary", "content": "..."}],
                    "milestones": [],
                    "projectedTransformationOutcomes": [],
                    "closingStatement": "Go."
                }}"#
                .to_string())
            }
        }
    }

    fn test_state(fail_with_timeout: bool) -> AppState {
        let config = Config {
            openai_api_key: "test-key".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            email_from: "DreamScape AI <noreply@dreamscapeai.com>".to_string(),
            admin_email: "admin@dreamscapeai.com".to_string(),
            practitioner_emails: vec!["practice@example.com".to_string()],
            port: 0,
            rust_log: "info".to_string(),
        };
        let mailer = Mailer::unencrypted_localhost(&config).expect("mailer");
        AppState {
            llm: Arc::new(StubModel { fail_with_timeout }),
            mailer,
            config,
        }
    }

    fn good_body() -> AssessmentSubmission {
        AssessmentSubmission {
            first_name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            practitioner_email: None,
            ques1: "I feel stuck in my current routine".to_string(),
            ques2: "I want to start my own practice".to_string(),
            ques3: "I keep doubting whether I am capable".to_string(),
            ques4: "Last summer while hiking I felt aligned".to_string(),
            ques5: "I would reprogram my fear of failure".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let state = test_state(false);
        let result = handle_generate_reports(State(state), Json(good_body()))
            .await
            .expect("should succeed");

        let body = result.0;
        assert_eq!(body.first_name, "Ana");
        assert_eq!(body.client_report.question_section.len(), 5);
        assert_eq!(
            body.practitioner_report.sections[0].title,
            "Client Summary"
        );
    }

    #[tokio::test]
    async fn test_generate_validation_failure_is_400() {
        let state = test_state(false);
        let mut body = good_body();
        body.ques1 = "short".to_string();

        let err = handle_generate_reports(State(state), Json(body))
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_generate_timeout_is_503() {
        let state = test_state(true);
        let err = handle_generate_reports(State(state), Json(good_body()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamTimeout));
        assert_eq!(err.into_response().status(), 503);
    }

    #[tokio::test]
    async fn test_generate_accepts_repeat_submissions() {
        // Identical payloads succeed back to back; nothing is deduplicated.
        let state = test_state(false);
        for _ in 0..2 {
            let result =
                handle_generate_reports(State(state.clone()), Json(good_body())).await;
            assert!(result.is_ok());
        }
    }

    #[tokio::test]
    async fn test_render_requires_matching_content() {
        let state = test_state(false);
        let request = RenderReportRequest {
            audience: ReportAudience::Client,
            first_name: "Ana".to_string(),
            client_content: None,
            practitioner_content: None,
        };
        let err = handle_render_report(State(state), Json(request))
            .await
            .err()
            .expect("should fail");
        assert_eq!(err.into_response().status(), 400);
    }

    #[test]
    fn test_safe_name_strips_unsafe_chars() {
        assert_eq!(safe_name("Ana"), "Ana");
        assert_eq!(safe_name("../etc/passwd"), "etcpasswd");
        assert_eq!(safe_name("  "), "Client");
    }
}
