//! Commands for creating, editing and listing flashcards, with their validation rules.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

const MAX_CREATE_TEXT: usize = 255;
const MAX_CREATE_PART_OF_SPEECH: usize = 50;
const MAX_UPDATE_TEXT: usize = 249;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "cannot be empty"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("cannot exceed {} characters", max),
        ));
    }
    Ok(())
}

fn check_part_of_speech(value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(pos) if pos.chars().count() > max => Err(ValidationError::new(
            "part_of_speech",
            format!("cannot exceed {} characters", max),
        )),
        _ => Ok(()),
    }
}

/// Body of `POST /flashcards`, also the item type of an import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateFlashcard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
}

impl CreateFlashcard {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("front", &self.front, MAX_CREATE_TEXT)?;
        check_text("back", &self.back, MAX_CREATE_TEXT)?;
        check_part_of_speech(self.part_of_speech.as_deref(), MAX_CREATE_PART_OF_SPEECH)
    }
}

/// Distinguishes a missing `part_of_speech` from an explicit `null`.
fn deserialize_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Body of `PATCH /flashcards/{id}`. Every field is optional.
/// `part_of_speech: null` clears the value, a missing field leaves it alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateFlashcard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub part_of_speech: Option<Option<String>>,
}

impl UpdateFlashcard {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none() && self.part_of_speech.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(front) = &self.front {
            check_text("front", front, MAX_UPDATE_TEXT)?;
        }
        if let Some(back) = &self.back {
            check_text("back", back, MAX_UPDATE_TEXT)?;
        }
        if let Some(pos) = &self.part_of_speech {
            check_part_of_speech(pos.as_deref(), MAX_UPDATE_TEXT)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Front,
    LeitnerBox,
}

impl SortBy {
    pub fn column(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::Front => "front",
            SortBy::LeitnerBox => "leitner_box",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Query of `GET /flashcards`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFlashcards {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for ListFlashcards {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort_by: SortBy::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListFlashcards {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page < 1 {
            return Err(ValidationError::new("page", "must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ValidationError::new(
                "pageSize",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        Ok(())
    }

    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)).saturating_mul(self.page_size)
    }
}
