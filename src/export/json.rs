//! JSON import/export module for flashcards.
//! Provides functionality to save a user's flashcards to JSON and to load them back
//! as new cards. Only the card text travels; Leitner progress starts over on import.

use crate::models::{CreateFlashcard, Flashcard, ValidationError};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("At least one flashcard is required")]
    NoFlashcards,

    #[error("Flashcard {index}: {source}")]
    InvalidFlashcard {
        index: usize,
        source: ValidationError,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// A portable set of flashcards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub flashcards: Vec<CreateFlashcard>,
}

impl FlashcardExport {
    pub fn from_flashcards(cards: &[Flashcard], now: DateTime<Utc>) -> Self {
        Self {
            exported_at: Some(now),
            flashcards: cards
                .iter()
                .map(|card| CreateFlashcard {
                    front: card.front.clone(),
                    back: card.back.clone(),
                    part_of_speech: card.part_of_speech.clone(),
                })
                .collect(),
        }
    }

    /// An import must carry at least one card and every card must be valid.
    pub fn validate(&self) -> Result<()> {
        if self.flashcards.is_empty() {
            return Err(ExportError::NoFlashcards);
        }
        for (index, card) in self.flashcards.iter().enumerate() {
            card.validate()
                .map_err(|source| ExportError::InvalidFlashcard { index, source })?;
        }
        Ok(())
    }
}

/// Exports flashcards to a JSON file at the specified path.
/// Returns an error if file creation or writing fails.
pub fn export_json_to_path(export: &FlashcardExport, path: impl AsRef<Path>) -> Result<()> {
    let json_string = serde_json::to_string_pretty(export)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Imports flashcards from a JSON file.
/// Returns an error if the file doesn't exist, contains invalid JSON or invalid cards.
pub fn import_json(path: impl AsRef<Path>) -> Result<FlashcardExport> {
    let mut file = File::open(path.as_ref())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let export: FlashcardExport = serde_json::from_str(&contents)?;
    export.validate()?;

    info!(
        "{} flashcards read from '{}'",
        export.flashcards.len(),
        path.as_ref().display()
    );
    Ok(export)
}
