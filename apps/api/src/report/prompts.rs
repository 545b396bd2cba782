//! Prompt constants and formatters for the two report generations.
//!
//! Both reports share a base system prompt; each audience adds one line
//! steering the JSON envelope. User prompts embed the literal JSON skeleton
//! the model must fill, since `response_format: json_object` guarantees JSON
//! but not shape.

/// Shared persona and analysis framing for both generations.
const BASE_SYSTEM: &str = "You are DreamScape AI, an advanced personal transformation assistant \
trained in the Neuro Change Method™. \
Your responses must be science-backed, evidence-based, and written with empathy.\n\n\
When analyzing responses, look for limiting beliefs, identity conflicts, emotional patterns, \
and mindset gaps. \
Frame insights using tools like: self-concordance mapping, belief engineering, flow state \
activation, implementation intentions, belief realignment, identity-based habit formation, \
emotional rewiring, strategy bridging, and purpose mapping.\n\n\
Speak directly to the client using \"you\" and highlight strengths and growth areas.";

pub const CLIENT_SYSTEM_SUFFIX: &str =
    "You will return a JSON object containing a personalized client report.";

pub const PRACTITIONER_SYSTEM_SUFFIX: &str =
    "You will return a JSON object containing a comprehensive practitioner report.";

/// The five assessment questions, in form order. Also used by the normalizer
/// to re-attach titles to the model's per-question insights.
pub const QUESTION_TEXTS: [&str; 5] = [
    "Where are you right now in your life, emotionally and mentally?",
    "What is something you deeply want—but haven't yet achieved?",
    "What recurring thoughts, fears, or beliefs do you find yourself struggling with?",
    "When was the last time you felt truly aligned—with yourself, your goals, or your life?",
    "If you could reprogram one part of your mind—what would it be, and why?",
];

pub fn client_system_prompt() -> String {
    format!("{BASE_SYSTEM}\n{CLIENT_SYSTEM_SUFFIX}")
}

pub fn practitioner_system_prompt() -> String {
    format!("{BASE_SYSTEM}\n{PRACTITIONER_SYSTEM_SUFFIX}")
}

/// Renders the shared user-input block: name, email, and each question text
/// paired with the client's verbatim answer.
pub fn format_user_input(first_name: &str, email: &str, answers: &[String; 5]) -> String {
    let mut out = String::from("**User Input:**\n");
    out.push_str(&format!("    - First Name: {first_name}\n"));
    out.push_str(&format!("    - Email: {email}\n"));
    for (i, (question, answer)) in QUESTION_TEXTS.iter().zip(answers.iter()).enumerate() {
        out.push_str(&format!("    - Q{}: {question} {answer}\n", i + 1));
    }
    out
}

pub fn format_client_user_prompt(user_input: &str) -> String {
    format!(
        r#"{user_input}

Return a JSON object with this structure:
{{
  "clientReport": {{
    "question-section": [
      {{
        "type": "question-insight",
        "aiInsights": [
          "First paragraph analyzing response (150 words)",
          "Second paragraph with additional insights (150 words)"
        ]
      }}
      // 4 more insight objects for remaining questions
    ],
    "highlight-section": {{
      "type": "highlight",
      "title": "What the Neuro Change Method™ Can Do for You",
      "points": {{
        "toolName1": "6-8 word description of effect"
        // 5-6 more tool points
      }},
      "closingStatement": "Motivational closing statement"
    }}
  }}
}}"#
    )
}

pub fn format_practitioner_user_prompt(user_input: &str) -> String {
    format!(
        r#"{user_input}

Return a JSON object with this structure:
{{
  "practitionerReport": {{
    "sections": [
      {{
        "type": "section",
        "title": "Client Profile Summary",
        "content": "Two paragraphs: 1) general overview (100 words) 2) comprehensive overview (200-300 words)",
        "primaryObjective": "Clear goal statement based on assessment"
      }},
      {{
        "type": "section",
        "title": "Key Barriers:",
        "items": [
          "Specific psychological obstacle 1"
          // 4-5 more obstacles
        ]
      }},
      {{
        "type": "section",
        "title": "Transformation Theme:",
        "sub-title": "One-line statement capturing journey essence",
        "reason": "Paragraph on theme alignment with journey"
      }},
      {{
        "type": "section",
        "title": "Neuro Change Method™: Your 4-Phase Transformation Journey",
        "phases": [
          {{
            "type": "phase",
            "title": "Phase 1: Consciousness",
            "items": {{
              "focus": "Key Word 1 + Key Word 2 + Key Word 3",
              "tools": "Tool One | Tool Two | Tool Three",
              "goal": "Two line goal showing change from current to future state"
            }}
          }}
          // 3 more phases (Mindset, Subconscious, Integration)
        ]
      }}
    ],
    "milestones": [
      {{
        "milestone": "First milestone description",
        "targetWeek": "Week X-Y",
        "toolsAndFocus": "Tools and techniques"
      }}
      // 5 more milestones
    ],
    "projectedTransformationOutcomes": [
      "Specific measurable outcome 1"
      // 4-5 more outcomes
    ],
    "closingStatement": "Motivational closing statement",
    "practitionerNotes": {{
      "temperament": "Client temperament assessment",
      "best-practices": [
        "Best practice 1 for practitioner"
        // 3-4 more best practices
      ]
    }}
  }}
}}

IMPORTANT FORMATTING REQUIREMENTS:
1. For the "focus" field and "tools" field in each phase:
   - Each key word or phrase MUST be capitalized (e.g., "Self Awareness" not "self-awareness")
   - Use plus signs WITH spaces between words (e.g., "Self Awareness + Rest + Presence")
   - Use 2-3 words/phrases maximum
   - Use pipe symbols WITH spaces between tools (e.g., "Self Concordance Mapping | Belief Engineering")"#
    )
}
