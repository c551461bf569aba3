// src/models/question.rs

use std::collections::HashSet;

use sqlx::{prelude::FromRow, types::Json};

use crate::quiz::{PromptKind, QuestionDefinition, QuizOption};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,

    /// The assignment (or exam) this question belongs to.
    pub assignment_id: String,

    /// Question text, or an image asset reference when `prompt_kind` is 'image'.
    pub prompt: String,

    /// 'text' or 'image'.
    pub prompt_kind: String,

    /// Options as a JSON array of {id, text}.
    pub options: Json<Vec<QuizOption>>,

    pub correct_option_id: String,

    /// Explanation of the correct answer.
    pub explanation: Option<String>,
}

impl TryFrom<QuestionRow> for QuestionDefinition {
    type Error = String;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let prompt_kind = match row.prompt_kind.as_str() {
            "text" => PromptKind::Text,
            "image" => PromptKind::Image,
            other => return Err(format!("question {}: unknown prompt kind '{}'", row.id, other)),
        };

        let Json(options) = row.options;
        validate_options(&options, &row.correct_option_id)
            .map_err(|e| format!("question {}: {}", row.id, e))?;

        Ok(QuestionDefinition {
            id: row.id.to_string(),
            prompt: row.prompt,
            prompt_kind,
            options,
            correct_option_id: row.correct_option_id,
            explanation: row.explanation,
        })
    }
}

/// At least two options with distinct ids, one of which is the correct one.
fn validate_options(options: &[QuizOption], correct_option_id: &str) -> Result<(), &'static str> {
    if options.len() < 2 {
        return Err("needs at least two options");
    }
    let mut seen = HashSet::new();
    if !options.iter().all(|o| seen.insert(o.id.as_str())) {
        return Err("option ids must be unique");
    }
    if !seen.contains(correct_option_id) {
        return Err("correct option is not among the options");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(options: &[&str], correct: &str) -> QuestionRow {
        QuestionRow {
            id: 7,
            assignment_id: "unit-1".to_string(),
            prompt: "Which?".to_string(),
            prompt_kind: "text".to_string(),
            options: Json(
                options
                    .iter()
                    .map(|id| QuizOption {
                        id: id.to_string(),
                        text: id.to_uppercase(),
                    })
                    .collect(),
            ),
            correct_option_id: correct.to_string(),
            explanation: None,
        }
    }

    #[test]
    fn test_valid_row_converts() {
        let question = QuestionDefinition::try_from(row(&["a", "b", "c"], "b")).unwrap();
        assert_eq!(question.id, "7");
        assert_eq!(question.options.len(), 3);
        assert_eq!(question.prompt_kind, PromptKind::Text);
    }

    #[test]
    fn test_single_option_is_rejected() {
        assert!(QuestionDefinition::try_from(row(&["a"], "a")).is_err());
    }

    #[test]
    fn test_missing_correct_option_is_rejected() {
        assert!(QuestionDefinition::try_from(row(&["a", "b"], "z")).is_err());
    }

    #[test]
    fn test_duplicate_option_ids_are_rejected() {
        assert!(QuestionDefinition::try_from(row(&["a", "a", "b"], "a")).is_err());
    }

    #[test]
    fn test_unknown_prompt_kind_is_rejected() {
        let mut bad = row(&["a", "b"], "a");
        bad.prompt_kind = "video".to_string();
        assert!(QuestionDefinition::try_from(bad).is_err());
    }
}
