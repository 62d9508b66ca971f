use serde::{Deserialize, Serialize};

/// First answer label; option `i` is labelled `'A' + i`.
const FIRST_LABEL: u32 = 'A' as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ComplexityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Label shown next to the option at `index`: 0 => 'A', 1 => 'B', ...
///
/// Past 'Z' the mapping keeps walking code points ('[', '\\', ...), which is
/// what quiz payloads in the wild were judged against. Indices that do not
/// land on a valid `char` yield `None`.
pub fn answer_label(index: usize) -> Option<char> {
    let offset = u32::try_from(index).ok()?;
    FIRST_LABEL.checked_add(offset).and_then(char::from_u32)
}

/// Inverse of [`answer_label`] for a single-character label.
pub fn label_index(label: &str) -> Option<usize> {
    let mut chars = label.chars();
    let first = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let code = u32::from(first).checked_sub(FIRST_LABEL)?;
    usize::try_from(code).ok()
}
