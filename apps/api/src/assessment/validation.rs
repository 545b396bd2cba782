//! Input Validator — sanitizes and validates the five free-text answers plus
//! contact details before anything reaches the model.
//!
//! All violated-field messages are collected and returned together, not just
//! the first, so the form can annotate every offending field in one pass.

use serde::Deserialize;

use crate::errors::ValidationIssue;

const MIN_ANSWER_CHARS: usize = 15;
const MAX_ANSWER_CHARS: usize = 2000;
const MIN_ANSWER_WORDS: usize = 3;
const MAX_NAME_CHARS: usize = 50;
const MAX_EMAIL_CHARS: usize = 100;

const ANSWER_TOO_SHORT: &str = "Please provide a more detailed response (at least 15 characters)";
const ANSWER_TOO_LONG: &str = "Response is too long (maximum 2000 characters)";
const ANSWER_TOO_FEW_WORDS: &str =
    "Please provide a meaningful response with at least a few words";
const ANSWER_DUPLICATE: &str = "Each answer must be distinct — this response repeats another one";

/// Raw form submission as posted by the browser. Nothing here is trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentSubmission {
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    /// Optional practitioner recipient, chosen from the fixed allow-list.
    #[serde(rename = "practitionerEmail", default)]
    pub practitioner_email: Option<String>,
    #[serde(default)]
    pub ques1: String,
    #[serde(default)]
    pub ques2: String,
    #[serde(default)]
    pub ques3: String,
    #[serde(default)]
    pub ques4: String,
    #[serde(default)]
    pub ques5: String,
}

/// A submission that passed every field-level and cross-field rule.
/// Request-scoped: created at submit, discarded when the response is sent.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub first_name: String,
    pub email: String,
    pub practitioner_email: Option<String>,
    pub answers: [String; 5],
}

/// Trims and strips HTML/script content from every string field.
/// Runs before validation so length/word rules apply to the cleaned text.
pub fn sanitize(mut submission: AssessmentSubmission) -> AssessmentSubmission {
    submission.first_name = strip_html(submission.first_name.trim());
    submission.email = strip_html(submission.email.trim());
    submission.practitioner_email = submission
        .practitioner_email
        .map(|e| strip_html(e.trim()))
        .filter(|e| !e.is_empty());
    submission.ques1 = strip_html(submission.ques1.trim());
    submission.ques2 = strip_html(submission.ques2.trim());
    submission.ques3 = strip_html(submission.ques3.trim());
    submission.ques4 = strip_html(submission.ques4.trim());
    submission.ques5 = strip_html(submission.ques5.trim());
    submission
}

/// Validates a sanitized submission, returning every violated-field message.
pub fn validate(
    submission: &AssessmentSubmission,
) -> Result<ValidatedSubmission, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    validate_first_name(&submission.first_name, &mut issues);
    validate_email("email", &submission.email, &mut issues);
    if let Some(practitioner) = &submission.practitioner_email {
        validate_email("practitionerEmail", practitioner, &mut issues);
    }

    let answers = [
        submission.ques1.trim().to_string(),
        submission.ques2.trim().to_string(),
        submission.ques3.trim().to_string(),
        submission.ques4.trim().to_string(),
        submission.ques5.trim().to_string(),
    ];

    for (i, answer) in answers.iter().enumerate() {
        let field = format!("ques{}", i + 1);
        if answer.chars().count() < MIN_ANSWER_CHARS {
            issues.push(ValidationIssue::new(&field, ANSWER_TOO_SHORT));
        } else if answer.chars().count() > MAX_ANSWER_CHARS {
            issues.push(ValidationIssue::new(&field, ANSWER_TOO_LONG));
        }
        if answer.split_whitespace().count() < MIN_ANSWER_WORDS {
            issues.push(ValidationIssue::new(&field, ANSWER_TOO_FEW_WORDS));
        }
    }

    // Cross-field rule: no two answers identical after trim + case-fold.
    // The later index is reported, whichever pair collided.
    for i in 1..answers.len() {
        let folded = answers[i].to_lowercase();
        if !folded.is_empty()
            && answers[..i].iter().any(|a| a.to_lowercase() == folded)
        {
            issues.push(ValidationIssue::new(
                format!("ques{}", i + 1),
                ANSWER_DUPLICATE,
            ));
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidatedSubmission {
        first_name: submission.first_name.trim().to_string(),
        email: submission.email.trim().to_string(),
        practitioner_email: submission.practitioner_email.clone(),
        answers,
    })
}

fn validate_first_name(name: &str, issues: &mut Vec<ValidationIssue>) {
    let name = name.trim();
    if name.is_empty() {
        issues.push(ValidationIssue::new("firstName", "First name is required"));
        return;
    }
    if name.chars().count() > MAX_NAME_CHARS {
        issues.push(ValidationIssue::new("firstName", "First name is too long"));
    }
    if !name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
    {
        issues.push(ValidationIssue::new(
            "firstName",
            "First name should only contain letters, spaces, hyphens, or apostrophes",
        ));
    }
}

fn validate_email(field: &str, email: &str, issues: &mut Vec<ValidationIssue>) {
    let email = email.trim();
    if email.chars().count() > MAX_EMAIL_CHARS {
        issues.push(ValidationIssue::new(field, "Email is too long"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
                issues.push(ValidationIssue::new(
                    field,
                    "Email must include a domain extension (e.g., .com)",
                ));
            }
        }
        _ => {
            issues.push(ValidationIssue::new(field, "Please enter a valid email"));
        }
    }
}

/// Strips HTML tags and `<script>`/`<style>` element contents from a string.
/// Defense against stored-XSS if report text is ever rendered as HTML
/// downstream (e.g. in the email bodies).
fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '<' {
            out.push(c);
            continue;
        }

        let rest = &input[i..];
        let lower = rest.to_lowercase();
        // Drop the entire element body for script/style, not just the tags.
        let skip_to = if lower.starts_with("<script") {
            lower.find("</script>").map(|e| i + e + "</script>".len())
        } else if lower.starts_with("<style") {
            lower.find("</style>").map(|e| i + e + "</style>".len())
        } else {
            rest.find('>').map(|e| i + e + 1)
        };

        match skip_to {
            Some(end) => {
                while let Some(&(j, _)) = chars.peek() {
                    if j >= end {
                        break;
                    }
                    chars.next();
                }
            }
            // Unterminated tag: drop the remainder.
            None => break,
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_submission() -> AssessmentSubmission {
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

    #[test]
    fn test_valid_submission_passes() {
        let validated = validate(&good_submission()).expect("should validate");
        assert_eq!(validated.first_name, "Ana");
        assert_eq!(validated.answers.len(), 5);
    }

    #[test]
    fn test_short_answer_names_the_question() {
        let mut sub = good_submission();
        sub.ques3 = "too short".to_string();
        let issues = validate(&sub).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "ques3"));
    }

    #[test]
    fn test_few_words_names_the_question() {
        let mut sub = good_submission();
        // 15+ chars but only two whitespace-separated tokens
        sub.ques2 = "supercalifragilistic expialidocious".to_string();
        let issues = validate(&sub).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.field == "ques2" && i.message.contains("a few words")));
    }

    #[test]
    fn test_overlong_answer_rejected() {
        let mut sub = good_submission();
        sub.ques1 = "word ".repeat(500); // 2500 chars
        let issues = validate(&sub).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.field == "ques1" && i.message.contains("too long")));
    }

    fn set_answer(sub: &mut AssessmentSubmission, index: usize, value: &str) {
        let slot = match index {
            0 => &mut sub.ques1,
            1 => &mut sub.ques2,
            2 => &mut sub.ques3,
            3 => &mut sub.ques4,
            _ => &mut sub.ques5,
        };
        *slot = value.to_string();
    }

    #[test]
    fn test_duplicate_answers_rejected_regardless_of_indices() {
        for (a, b) in [(0usize, 1usize), (1, 4), (2, 3)] {
            let mut sub = good_submission();
            set_answer(&mut sub, a, "An identical answer repeated twice");
            set_answer(&mut sub, b, "  AN IDENTICAL ANSWER REPEATED TWICE ");
            let issues = validate(&sub).unwrap_err();
            assert!(
                issues.iter().any(|i| i.message.contains("distinct")),
                "duplicate between ques{} and ques{} not caught",
                a + 1,
                b + 1
            );
        }
    }

    #[test]
    fn test_all_violations_reported_together() {
        let sub = AssessmentSubmission {
            first_name: String::new(),
            email: "not-an-email".to_string(),
            practitioner_email: None,
            ques1: "x".to_string(),
            ques2: "x".to_string(),
            ques3: "ok answer with enough words here".to_string(),
            ques4: "another fine answer with enough words".to_string(),
            ques5: "a third fine answer with enough words".to_string(),
        };
        let issues = validate(&sub).unwrap_err();
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"firstName"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"ques1"));
        assert!(fields.contains(&"ques2"));
    }

    #[test]
    fn test_first_name_pattern() {
        let mut sub = good_submission();
        sub.first_name = "Anne-Marie O'Neil".to_string();
        assert!(validate(&sub).is_ok());

        sub.first_name = "Ana42".to_string();
        let issues = validate(&sub).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "firstName"));
    }

    #[test]
    fn test_email_requires_domain_dot() {
        let mut sub = good_submission();
        sub.email = "ana@localhost".to_string();
        let issues = validate(&sub).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.field == "email" && i.message.contains("domain extension")));
    }

    #[test]
    fn test_practitioner_email_validated_when_present() {
        let mut sub = good_submission();
        sub.practitioner_email = Some("bad-address".to_string());
        let issues = validate(&sub).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "practitionerEmail"));
    }

    #[test]
    fn test_sanitize_strips_tags() {
        let mut sub = good_submission();
        sub.ques1 = "I feel <b>stuck</b> in my current routine".to_string();
        let clean = sanitize(sub);
        assert_eq!(clean.ques1, "I feel stuck in my current routine");
    }

    #[test]
    fn test_sanitize_drops_script_contents() {
        let mut sub = good_submission();
        sub.first_name = "Ana<script>alert('x')</script>".to_string();
        let clean = sanitize(sub);
        assert_eq!(clean.first_name, "Ana");
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        let mut sub = good_submission();
        sub.email = "  ana@x.com  ".to_string();
        let clean = sanitize(sub);
        assert_eq!(clean.email, "ana@x.com");
    }

    #[test]
    fn test_repeat_submission_is_not_rejected() {
        // No cross-request uniqueness — the same payload validates twice.
        let sub = good_submission();
        assert!(validate(&sub).is_ok());
        assert!(validate(&sub).is_ok());
    }
}
