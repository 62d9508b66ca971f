//! Plain-text rendering of client views.

use client_core::{Verdict, View};
use shared::protocol::TopicResult;

/// Text for `view`, or `None` when only the input prompt should show.
pub fn render_view(view: &View) -> Option<String> {
    match view {
        View::Input => None,
        View::Loading => Some("Loading the explanation, hang on...".to_string()),
        View::Failed => Some("Something went wrong :( Try again.".to_string()),
        View::Explanation(result) => Some(render_explanation(result)),
    }
}

fn render_explanation(result: &TopicResult) -> String {
    let mut out = format!("== Explanation ==\n{}\n\n== Questions ==\n", result.explanation);
    if result.test_cases.is_empty() {
        out.push_str("No questions available.\n");
    }
    for (number, test_case) in result.test_cases.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", number + 1, test_case.question));
        for (label, option) in test_case.labelled_options() {
            out.push_str(&format!("   {label}) {option}\n"));
        }
    }
    out.push_str("Answer with /answer <question> <letter>.");
    out
}

pub fn render_verdict(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Correct => "Correct!".to_string(),
        Verdict::Incorrect { correct_answer } => {
            format!("Incorrect. The correct answer is: {correct_answer}")
        }
    }
}
