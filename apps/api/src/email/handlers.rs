//! Axum route handler for dispatching a practitioner report by email.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::{AppError, ValidationIssue};
use crate::state::AppState;

/// All fields optional so malformed bodies surface as itemized 400s instead
/// of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "practitionerEmail", default)]
    pub practitioner_email: Option<String>,
    #[serde(rename = "pdfBase64", default)]
    pub pdf_base64: Option<String>,
}

/// POST /api/v1/reports/email
///
/// Validates the request, then hands the send to a background task and
/// responds immediately. SMTP failures after that point are logged only.
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<Value>, AppError> {
    let mut issues = Vec::new();

    let first_name = request.first_name.as_deref().unwrap_or("").trim();
    if first_name.is_empty() {
        issues.push(ValidationIssue::new("firstName", "First name is required"));
    }

    let practitioner_email = request
        .practitioner_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let Some(email) = practitioner_email {
        if !state.config.is_allowed_practitioner(email) {
            issues.push(ValidationIssue::new(
                "practitionerEmail",
                "Practitioner email is not on the approved list",
            ));
        }
    }

    let pdf = match request.pdf_base64.as_deref() {
        None | Some("") => {
            issues.push(ValidationIssue::new("pdfBase64", "pdfBase64 is required"));
            Vec::new()
        }
        Some(encoded) => match BASE64.decode(encoded) {
            Ok(bytes) if bytes.starts_with(b"%PDF") => bytes,
            Ok(_) => {
                issues.push(ValidationIssue::new(
                    "pdfBase64",
                    "pdfBase64 does not contain a PDF document",
                ));
                Vec::new()
            }
            Err(_) => {
                issues.push(ValidationIssue::new(
                    "pdfBase64",
                    "pdfBase64 must be valid base64",
                ));
                Vec::new()
            }
        },
    };

    if !issues.is_empty() {
        return Err(AppError::Validation(issues));
    }

    let mailer = state.mailer.clone();
    let first_name = first_name.to_string();
    let practitioner = practitioner_email.map(str::to_string);
    info!(
        first_name = %first_name,
        practitioner = practitioner.as_deref().unwrap_or("None"),
        "queueing report email dispatch"
    );
    tokio::spawn(async move {
        let sent = mailer
            .send_practitioner_report(practitioner.as_deref(), &first_name, &pdf)
            .await;
        if !sent {
            warn!(first_name = %first_name, "report email dispatch incomplete");
        }
    });

    Ok(Json(json!({ "success": true })))
}
