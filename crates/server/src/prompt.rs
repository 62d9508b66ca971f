use shared::domain::ComplexityLevel;

pub const SYSTEM_MESSAGE: &str = "You are an expert educator and technical writer.";

fn complexity_instructions(level: ComplexityLevel) -> &'static str {
    match level {
        ComplexityLevel::Beginner => {
            "Explain in simple terms that a beginner can understand. Use basic vocabulary and avoid jargon."
        }
        ComplexityLevel::Intermediate => {
            "Provide a balanced explanation with some technical details. Assume basic familiarity with the subject."
        }
        ComplexityLevel::Advanced => {
            "Give a comprehensive, technical explanation with advanced concepts and terminology."
        }
    }
}

/// Builds the user prompt asking the model for an explanation plus a
/// multiple-choice quiz in the `explain-topic` response shape.
pub fn build_prompt(topic: &str, level: ComplexityLevel, include_examples: bool) -> String {
    let examples = if include_examples {
        "Include practical examples and use cases."
    } else {
        "Focus on theoretical concepts without specific examples."
    };

    format!(
        r#"Provide a comprehensive explanation of the given topic and a short multiple-choice quiz that checks understanding of it.

Topic: {topic}
Complexity Level: {level}
Instructions: {instructions}
Examples: {examples}

Respond with JSON only, in exactly this format:
{{
    "explanation": "Your detailed, well-structured explanation of the topic.",
    "test_cases": [
        {{
            "question": "A question about a key concept from the explanation",
            "options": ["first option", "second option", "third option", "fourth option"],
            "correct_answer": "B",
            "explanation": "Why the correct option is right"
        }}
    ]
}}

Requirements:
1. The explanation must be accurate and suit the complexity level.
2. The explanation must be at least 20 words and at most 1000 words.
3. Write between 3 and 5 questions, each with 2 to 6 options.
4. "correct_answer" is the letter of the correct option: "A" for the first option, "B" for the second, and so on.
5. Return valid JSON and nothing else.

Topic to explain: {topic}
"#,
        level = level.as_str(),
        instructions = complexity_instructions(level),
    )
}
