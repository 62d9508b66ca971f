use shared::domain::label_index;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text: becomes the draft and is submitted.
    Topic(String),
    /// Pick option `option` (0-based) for question `question` (0-based).
    Answer { question: usize, option: usize },
    Help,
    Quit,
    Empty,
    Invalid(String),
}

const ANSWER_USAGE: &str = "usage: /answer <question number> <letter>";

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Topic(line.to_string());
    };

    let mut words = rest.split_whitespace();
    match words.next() {
        Some("quit" | "exit") => Command::Quit,
        Some("help") => Command::Help,
        Some("answer") => {
            let (Some(number), Some(letter), None) = (words.next(), words.next(), words.next())
            else {
                return Command::Invalid(ANSWER_USAGE.to_string());
            };
            let question = match number.parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => return Command::Invalid(format!("'{number}' is not a question number")),
            };
            match label_index(&letter.to_uppercase()) {
                Some(option) => Command::Answer { question, option },
                None => Command::Invalid(format!("'{letter}' is not an answer letter")),
            }
        }
        _ => Command::Invalid(format!("unknown command '{line}'")),
    }
}
