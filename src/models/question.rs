// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Every generated question offers exactly this many choices.
pub const CHOICE_COUNT: usize = 4;

/// Label meaning "no constraint" for difficulty and topic.
pub const ANY_LABEL: &str = "alle";

/// A single multiple-choice question.
///
/// Serialized in the format the model is asked to produce:
/// `{"question": ..., "choices": [...], "correct": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_correct_choice))]
pub struct Question {
    #[serde(rename = "question")]
    #[validate(length(min = 1, max = 2000))]
    pub text: String,

    /// Answer options, in the order they are shown.
    #[validate(custom(function = validate_choices))]
    pub choices: Vec<String>,

    /// Must equal exactly one entry of `choices`, byte for byte.
    #[serde(rename = "correct")]
    pub correct_choice: String,
}

impl Question {
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.correct_choice.as_str())
    }

    /// Key used for duplicate detection within one quiz.
    pub fn dedup_key(&self) -> &str {
        self.text.trim()
    }
}

fn validate_choices(choices: &[String]) -> Result<(), ValidationError> {
    if choices.len() != CHOICE_COUNT {
        return Err(ValidationError::new("choices_must_be_four"));
    }
    if choices.iter().any(|c| c.trim().is_empty()) {
        return Err(ValidationError::new("choice_cannot_be_empty"));
    }
    Ok(())
}

fn validate_correct_choice(question: &Question) -> Result<(), ValidationError> {
    let matches = question
        .choices
        .iter()
        .filter(|c| **c == question.correct_choice)
        .count();

    match matches {
        1 => Ok(()),
        0 => Err(ValidationError::new("correct_not_in_choices")),
        _ => Err(ValidationError::new("correct_choice_ambiguous")),
    }
}

/// One selection parameter: either unconstrained or a concrete label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Any,
    Only(String),
}

impl Criterion {
    /// Maps the sentinel label (or a blank one) to `Any`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            None | Some("") | Some(ANY_LABEL) => Criterion::Any,
            Some(label) => Criterion::Only(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Criterion::Any => ANY_LABEL,
            Criterion::Only(label) => label,
        }
    }
}

/// Difficulty and topic a quiz is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCriteria {
    pub difficulty: Criterion,
    pub topic: Criterion,
}

impl QuizCriteria {
    pub fn new(difficulty: Option<&str>, topic: Option<&str>) -> Self {
        Self {
            difficulty: Criterion::from_label(difficulty),
            topic: Criterion::from_label(topic),
        }
    }

    /// God mode: both parameters unconstrained, whatever the user picked.
    pub fn unconstrained() -> Self {
        Self {
            difficulty: Criterion::Any,
            topic: Criterion::Any,
        }
    }
}

/// DTO for `POST /api/generate_question`.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuestionRequest {
    #[serde(default = "any_label")]
    #[validate(length(max = 100))]
    pub difficulty: String,
    #[serde(default = "any_label")]
    #[validate(length(max = 100))]
    pub topic: String,
}

impl GenerateQuestionRequest {
    pub fn criteria(&self) -> QuizCriteria {
        QuizCriteria::new(Some(&self.difficulty), Some(&self.topic))
    }
}

fn any_label() -> String {
    ANY_LABEL.to_string()
}

/// Form posted by the start page.
#[derive(Debug, Deserialize)]
pub struct StartQuizForm {
    pub difficulty: Option<String>,
    pub topic: Option<String>,
    pub godmode: Option<String>,
}

impl StartQuizForm {
    pub fn criteria(&self) -> QuizCriteria {
        if self.godmode.as_deref() == Some("on") {
            return QuizCriteria::unconstrained();
        }
        QuizCriteria::new(self.difficulty.as_deref(), self.topic.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(choices: &[&str], correct: &str) -> Question {
        Question {
            text: "Was gibt print(2 ** 3) aus?".to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            correct_choice: correct.to_string(),
        }
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(question(&["6", "8", "9", "5"], "8").validate().is_ok());
    }

    #[test]
    fn test_wrong_choice_count_rejected() {
        assert!(question(&["6", "8", "9"], "8").validate().is_err());
        assert!(question(&["6", "8", "9", "5", "1"], "8").validate().is_err());
    }

    #[test]
    fn test_correct_must_be_member() {
        assert!(question(&["6", "8", "9", "5"], "7").validate().is_err());
        // case-sensitive and whitespace-sensitive
        assert!(question(&["a", "b", "c", "d"], "B").validate().is_err());
        assert!(question(&["a", "b", "c", "d"], "b ").validate().is_err());
    }

    #[test]
    fn test_duplicated_correct_choice_rejected() {
        assert!(question(&["8", "8", "9", "5"], "8").validate().is_err());
    }

    #[test]
    fn test_empty_choice_rejected() {
        assert!(question(&["8", " ", "9", "5"], "8").validate().is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let original = question(&["d", "c", "b", "a"], "c");
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"question\""));
        assert!(json.contains("\"correct\":\"c\""));

        let parsed: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.choices, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_exact_match_scoring() {
        let q = question(&["6", "8", "9", "5"], "8");
        assert!(q.is_correct(Some("8")));
        assert!(!q.is_correct(Some("8 ")));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn test_criterion_sentinel() {
        assert_eq!(Criterion::from_label(Some("alle")), Criterion::Any);
        assert_eq!(Criterion::from_label(Some("  ")), Criterion::Any);
        assert_eq!(Criterion::from_label(None), Criterion::Any);
        assert_eq!(
            Criterion::from_label(Some("schwer")),
            Criterion::Only("schwer".to_string())
        );
    }

    #[test]
    fn test_godmode_overrides_selection() {
        let form = StartQuizForm {
            difficulty: Some("schwer".into()),
            topic: Some("Funktionen".into()),
            godmode: Some("on".into()),
        };
        assert_eq!(form.criteria(), QuizCriteria::unconstrained());

        let form = StartQuizForm {
            godmode: None,
            ..form
        };
        assert_eq!(
            form.criteria().difficulty,
            Criterion::Only("schwer".to_string())
        );
    }
}
