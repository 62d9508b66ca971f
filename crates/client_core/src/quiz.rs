use shared::{domain::answer_label, protocol::TestCase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { correct_answer: String },
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Judges picking the option at `option_index` by comparing its label with
/// the test case's `correct_answer`. Labels are compared exactly.
pub fn judge(test_case: &TestCase, option_index: usize) -> Verdict {
    let picked = answer_label(option_index);
    let correct = picked.is_some_and(|label| {
        let mut buf = [0u8; 4];
        test_case.correct_answer == *label.encode_utf8(&mut buf)
    });
    if correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect {
            correct_answer: test_case.correct_answer.clone(),
        }
    }
}
