use serde::{Deserialize, Serialize};

use crate::domain::{answer_label, ComplexityLevel};

pub const EXPLAIN_TOPIC_PATH: &str = "explain-topic";

/// Body of `POST explain-topic`.
///
/// Clients that only know the topic send `{"topic": ...}`; the optional knobs
/// fall back to service defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRequest {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_level: Option<ComplexityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_examples: Option<bool>,
}

impl TopicRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            complexity_level: None,
            include_examples: None,
        }
    }
}

/// One multiple-choice question attached to an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    pub options: Vec<String>,
    /// Label of the correct option ("B"), not the option text.
    pub correct_answer: String,
    pub explanation: String,
}

impl TestCase {
    /// Options paired with their display labels. Options whose position has
    /// no label are skipped.
    pub fn labelled_options(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(index, option)| answer_label(index).map(|label| (label, option.as_str())))
    }
}

/// Successful `explain-topic` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResult {
    pub explanation: String,
    pub test_cases: Vec<TestCase>,
}

/// Full service response. Flattens to a superset of [`TopicResult`], so
/// clients that only know the result shape decode it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationResponse {
    #[serde(flatten)]
    pub result: TopicResult,
    pub topic: String,
    pub complexity_level: ComplexityLevel,
    pub metadata: ExplanationMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplanationMetadata {
    pub model_used: String,
    pub prompt_length: usize,
    pub response_length: usize,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub tokens_used: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceBanner {
    pub message: String,
}
