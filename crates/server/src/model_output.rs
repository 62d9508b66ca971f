//! Turns raw model text into a validated `TopicResult`.

use shared::{domain::label_index, protocol::TopicResult};
use thiserror::Error;

const MIN_EXPLANATION_WORDS: usize = 20;
const MAX_EXPLANATION_WORDS: usize = 1000;
const MIN_OPTIONS: usize = 2;

#[derive(Debug, Error)]
pub enum ModelOutputError {
    #[error("no JSON object found in model response")]
    NoJson,
    #[error("invalid JSON in model response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("explanation is too short ({words} words)")]
    ExplanationTooShort { words: usize },
    #[error("explanation is too long ({words} words)")]
    ExplanationTooLong { words: usize },
    #[error("test case {index}: {reason}")]
    InvalidTestCase { index: usize, reason: String },
}

/// Span from the first `{` to the last `}`; models like to wrap JSON in
/// prose or code fences.
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

pub fn parse_model_output(text: &str) -> Result<TopicResult, ModelOutputError> {
    let json = json_span(text).ok_or(ModelOutputError::NoJson)?;
    let result: TopicResult = serde_json::from_str(json)?;

    let words = result.explanation.split_whitespace().count();
    if words < MIN_EXPLANATION_WORDS {
        return Err(ModelOutputError::ExplanationTooShort { words });
    }
    if words > MAX_EXPLANATION_WORDS {
        return Err(ModelOutputError::ExplanationTooLong { words });
    }

    for (index, test_case) in result.test_cases.iter().enumerate() {
        let invalid = |reason: String| ModelOutputError::InvalidTestCase { index, reason };
        if test_case.question.trim().is_empty() {
            return Err(invalid("question is empty".to_string()));
        }
        if test_case.options.len() < MIN_OPTIONS {
            return Err(invalid(format!(
                "expected at least {MIN_OPTIONS} options, got {}",
                test_case.options.len()
            )));
        }
        match label_index(&test_case.correct_answer) {
            Some(answer) if answer < test_case.options.len() => {}
            _ => {
                return Err(invalid(format!(
                    "correct_answer '{}' does not name one of {} options",
                    test_case.correct_answer,
                    test_case.options.len()
                )))
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPLANATION: &str = "Ownership is the set of rules that govern how a Rust program \
        manages memory; every value has a single owner and the value is dropped when that \
        owner goes out of scope.";

    fn payload(correct_answer: &str, options: &[&str]) -> String {
        serde_json::json!({
            "explanation": EXPLANATION,
            "test_cases": [{
                "question": "What happens when the owner goes out of scope?",
                "options": options,
                "correct_answer": correct_answer,
                "explanation": "Values are dropped with their owner."
            }]
        })
        .to_string()
    }

    #[test]
    fn accepts_json_wrapped_in_code_fence() {
        let text = format!(
            "Here you go:\n```json\n{}\n```",
            payload("B", &["leaked", "dropped"])
        );
        let result = parse_model_output(&text).expect("valid");
        assert_eq!(result.test_cases.len(), 1);
        assert_eq!(result.test_cases[0].correct_answer, "B");
    }

    #[test]
    fn rejects_text_without_json() {
        assert!(matches!(
            parse_model_output("This is not a JSON response"),
            Err(ModelOutputError::NoJson)
        ));
        assert!(matches!(
            parse_model_output("} backwards {"),
            Err(ModelOutputError::NoJson)
        ));
    }

    #[test]
    fn rejects_short_explanation() {
        let text = r#"{"explanation": "Too short.", "test_cases": []}"#;
        assert!(matches!(
            parse_model_output(text),
            Err(ModelOutputError::ExplanationTooShort { words: 2 })
        ));
    }

    #[test]
    fn rejects_overlong_explanation() {
        let explanation = "word ".repeat(MAX_EXPLANATION_WORDS + 1);
        let text = serde_json::json!({ "explanation": explanation, "test_cases": [] }).to_string();
        assert!(matches!(
            parse_model_output(&text),
            Err(ModelOutputError::ExplanationTooLong { .. })
        ));
    }

    #[test]
    fn rejects_answer_label_outside_options() {
        let err = parse_model_output(&payload("C", &["leaked", "dropped"])).expect_err("invalid");
        assert!(matches!(err, ModelOutputError::InvalidTestCase { index: 0, .. }));

        let err = parse_model_output(&payload("dropped", &["leaked", "dropped"]))
            .expect_err("invalid");
        assert!(matches!(err, ModelOutputError::InvalidTestCase { .. }));
    }

    #[test]
    fn rejects_single_option_question() {
        let err = parse_model_output(&payload("A", &["dropped"])).expect_err("invalid");
        assert!(err.to_string().contains("at least 2 options"));
    }

    #[test]
    fn rejects_legacy_single_test_case_shape() {
        let text = serde_json::json!({
            "explanation": EXPLANATION,
            "test_case": { "input": "i", "expected_output": "o", "description": "d" }
        })
        .to_string();
        assert!(matches!(
            parse_model_output(&text),
            Err(ModelOutputError::Json(_))
        ));
    }
}
