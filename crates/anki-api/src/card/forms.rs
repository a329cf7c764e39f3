use anki_catalog::{MAX_TAG_LENGTH, parse_tag_names, tags::overlong_tags};
use anki_db::{models::Category, repositories::category as category_repo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{ApiError, FormErrors};

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Category as submitted: a number, or the numeric string an HTML form posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryInput {
    Id(i64),
    Text(String),
}

/// What a submitted category field amounts to before it is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryChoice {
    Blank,
    Id(i32),
    Invalid,
}

impl CategoryInput {
    pub fn choice(&self) -> CategoryChoice {
        match self {
            Self::Id(id) => i32::try_from(*id).map_or(CategoryChoice::Invalid, CategoryChoice::Id),
            Self::Text(raw) => match raw.trim() {
                "" => CategoryChoice::Blank,
                raw => raw
                    .parse()
                    .map_or(CategoryChoice::Invalid, CategoryChoice::Id),
            },
        }
    }
}

impl From<i32> for CategoryInput {
    fn from(id: i32) -> Self {
        Self::Id(id.into())
    }
}

/// Submitted card authoring form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    /// Category id; the catalog has no uncategorised authoring.
    #[serde(default)]
    pub category: Option<CategoryInput>,
    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: String,
}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct CleanCard {
    pub question: String,
    pub answer: String,
    pub category: Category,
    pub tag_names: Vec<String>,
}

impl CardForm {
    pub fn category_choice(&self) -> CategoryChoice {
        self.category
            .as_ref()
            .map_or(CategoryChoice::Blank, CategoryInput::choice)
    }

    /// Field checks that need no database.
    pub fn check_fields(&self, errors: &mut FormErrors) -> Vec<String> {
        if self.question.trim().is_empty() {
            errors.add("question", REQUIRED);
        }
        if self.answer.trim().is_empty() {
            errors.add("answer", REQUIRED);
        }
        match self.category_choice() {
            CategoryChoice::Blank => errors.add("category", REQUIRED),
            CategoryChoice::Invalid => errors.add("category", INVALID_CHOICE),
            CategoryChoice::Id(_) => {}
        }

        let tag_names = parse_tag_names(&self.tags);
        for name in overlong_tags(&tag_names) {
            errors.add(
                "tags",
                format!("Tag \"{name}\" is longer than {MAX_TAG_LENGTH} characters."),
            );
        }
        tag_names
    }

    /// Validate the whole form, resolving the category against the database.
    pub async fn clean(&self, pool: &PgPool) -> Result<CleanCard, ApiError> {
        let mut errors = FormErrors::new();
        let tag_names = self.check_fields(&mut errors);

        let category = match self.category_choice() {
            CategoryChoice::Id(id) => {
                let found = category_repo::find_by_id(pool, id).await?;
                if found.is_none() {
                    errors.add("category", INVALID_CHOICE);
                }
                found
            }
            CategoryChoice::Blank | CategoryChoice::Invalid => None,
        };

        errors.finish(self)?;
        let category = category.ok_or_else(|| ApiError::Validation(REQUIRED.to_string()))?;

        Ok(CleanCard {
            question: self.question.trim().to_string(),
            answer: self.answer.trim().to_string(),
            category,
            tag_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_reports_required_fields() {
        let mut errors = FormErrors::new();
        CardForm::default().check_fields(&mut errors);

        assert!(errors.has("question"));
        assert!(errors.has("answer"));
        assert!(errors.has("category"));
        assert!(!errors.has("tags"));
    }

    #[test]
    fn test_whitespace_question_is_blank() {
        let form = CardForm {
            question: "   ".to_string(),
            answer: "yes".to_string(),
            category: Some(CategoryInput::Id(1)),
            tags: String::new(),
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);
        assert!(errors.has("question"));
        assert!(!errors.has("answer"));
    }

    #[test]
    fn test_tags_are_parsed() {
        let form = CardForm {
            question: "q".to_string(),
            answer: "a".to_string(),
            category: Some(CategoryInput::Id(1)),
            tags: "a, b ,b,  ".to_string(),
        };
        let mut errors = FormErrors::new();
        let tags = form.check_fields(&mut errors);
        assert!(errors.is_empty());
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_category_accepts_numbers_and_numeric_strings() {
        let form: CardForm = serde_json::from_str(r#"{"category": 7}"#).unwrap();
        assert_eq!(form.category_choice(), CategoryChoice::Id(7));

        let form: CardForm = serde_json::from_str(r#"{"category": " 7 "}"#).unwrap();
        assert_eq!(form.category_choice(), CategoryChoice::Id(7));

        let form: CardForm = serde_json::from_str(r#"{"category": ""}"#).unwrap();
        assert_eq!(form.category_choice(), CategoryChoice::Blank);

        let form: CardForm = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(form.category_choice(), CategoryChoice::Blank);
    }

    #[test]
    fn test_unusable_category_is_a_field_error() {
        let inputs = [
            CategoryInput::Text("abc".to_string()),
            CategoryInput::Text("7.5".to_string()),
            CategoryInput::Id(99_999_999_999),
        ];
        for input in inputs {
            let form = CardForm {
                question: "q".to_string(),
                answer: "a".to_string(),
                category: Some(input.clone()),
                tags: String::new(),
            };
            let mut errors = FormErrors::new();
            form.check_fields(&mut errors);
            assert!(errors.has("category"), "{input:?}");
            assert!(!errors.has("question"));
        }
    }

    #[test]
    fn test_overlong_tag_is_a_field_error() {
        let form = CardForm {
            question: "q".to_string(),
            answer: "a".to_string(),
            category: Some(CategoryInput::Id(1)),
            tags: "x".repeat(MAX_TAG_LENGTH + 1),
        };
        let mut errors = FormErrors::new();
        form.check_fields(&mut errors);
        assert!(errors.has("tags"));
    }
}
