//! Report Requester — runs the client and practitioner generations
//! concurrently against the chat model and folds the outputs into one result.
//!
//! Failure policy: transport-level failures (timeout, HTTP, API error) on
//! EITHER call fail the whole request, since a half-delivered assessment is
//! worse than a retry. Parse failures degrade per call to a skeleton report
//! instead, matching what the renderer can still produce.

use tracing::{error, info};

use crate::assessment::ValidatedSubmission;
use crate::errors::AppError;
use crate::llm_client::{ChatModel, LlmError};
use crate::report::models::ReportsResult;
use crate::report::normalizer::{
    fallback_client_report, fallback_practitioner_report, normalize_client_report,
    normalize_practitioner_report, parse_client_report, parse_practitioner_report,
};
use crate::report::prompts::{
    client_system_prompt, format_client_user_prompt, format_practitioner_user_prompt,
    format_user_input, practitioner_system_prompt,
};

/// Generates both reports for a validated submission.
pub async fn generate_reports(
    llm: &dyn ChatModel,
    submission: &ValidatedSubmission,
) -> Result<ReportsResult, AppError> {
    let user_input = format_user_input(
        &submission.first_name,
        &submission.email,
        &submission.answers,
    );

    let client_system = client_system_prompt();
    let client_user = format_client_user_prompt(&user_input);
    let practitioner_system = practitioner_system_prompt();
    let practitioner_user = format_practitioner_user_prompt(&user_input);

    let started = std::time::Instant::now();
    let (client_raw, practitioner_raw) = tokio::join!(
        llm.complete_json(&client_system, &client_user),
        llm.complete_json(&practitioner_system, &practitioner_user),
    );
    info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "report generations completed"
    );

    let client_raw = client_raw.map_err(map_llm_error)?;
    let practitioner_raw = practitioner_raw.map_err(map_llm_error)?;

    let mut client_report = parse_client_report(&client_raw).unwrap_or_else(|err| {
        error!(%err, "client report did not parse, using fallback");
        fallback_client_report()
    });
    let mut practitioner_report =
        parse_practitioner_report(&practitioner_raw).unwrap_or_else(|err| {
            error!(%err, "practitioner report did not parse, using fallback");
            fallback_practitioner_report()
        });

    normalize_client_report(&mut client_report, submission);
    normalize_practitioner_report(&mut practitioner_report);

    Ok(ReportsResult {
        client_report,
        practitioner_report,
        first_name: submission.first_name.clone(),
    })
}

fn map_llm_error(err: LlmError) -> AppError {
    match err {
        LlmError::Timeout => AppError::UpstreamTimeout,
        other => AppError::Upstream(other.to_string()),
    }
}
