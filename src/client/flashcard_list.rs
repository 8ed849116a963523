//! Paginated list of the user's flashcards with optimistic edits.
//!
//! Deleting or editing a card changes the local list first. The change carries a copy of
//! the list as it was before ([`PendingChange`]); when the server refuses, that copy is put
//! back, when it accepts, the copy is dropped.

use log::warn;
use uuid::Uuid;

use super::FlashcardApi;
use crate::models::{Flashcard, ListFlashcards, Pagination, ReviewError, UpdateFlashcard};

/// Pre-image of a tentative change.
#[must_use]
#[derive(Debug)]
pub struct PendingChange {
    flashcards: Vec<Flashcard>,
    pagination: Pagination,
}

pub struct FlashcardList<A: FlashcardApi> {
    api: A,
    query: ListFlashcards,
    pub flashcards: Vec<Flashcard>,
    pub pagination: Pagination,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<A: FlashcardApi> FlashcardList<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            query: ListFlashcards::default(),
            flashcards: Vec::new(),
            pagination: Pagination::default(),
            is_loading: false,
            error: None,
        }
    }

    pub async fn fetch(&mut self, page: u32) -> Result<(), ReviewError> {
        self.is_loading = true;
        self.error = None;

        let query = ListFlashcards { page, ..self.query };
        let result = self.api.list_flashcards(query).await;
        self.is_loading = false;

        match result {
            Ok(page) => {
                self.query = query;
                self.flashcards = page.data;
                self.pagination = page.pagination;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn refetch(&mut self) -> Result<(), ReviewError> {
        self.fetch(self.query.page).await
    }

    /// Moves to another page. Pages outside `1..=total_pages` are ignored.
    pub async fn change_page(&mut self, page: u32) -> Result<bool, ReviewError> {
        if page < 1 || u64::from(page) > self.pagination.total_pages {
            return Ok(false);
        }
        self.fetch(page).await?;
        Ok(true)
    }

    fn tentative(
        &mut self,
        apply: impl FnOnce(&mut Vec<Flashcard>, &mut Pagination),
    ) -> PendingChange {
        let change = PendingChange {
            flashcards: self.flashcards.clone(),
            pagination: self.pagination,
        };
        apply(&mut self.flashcards, &mut self.pagination);
        change
    }

    fn revert(&mut self, change: PendingChange) {
        self.flashcards = change.flashcards;
        self.pagination = change.pagination;
    }

    /// Removes the card locally, then on the server. Restores it if the server refuses.
    pub async fn delete(&mut self, id: Uuid) -> Result<(), ReviewError> {
        let change = self.tentative(|cards, pagination| {
            let before = cards.len();
            cards.retain(|card| card.id != id);
            if cards.len() < before {
                pagination.total_items = pagination.total_items.saturating_sub(1);
            }
        });

        if let Err(err) = self.api.delete_flashcard(id).await {
            self.revert(change);
            return Err(err);
        }

        // Pick up the card that slides in from the next page
        if let Err(err) = self.refetch().await {
            warn!("Flashcard {} deleted but the list could not be refreshed: {}", id, err);
        }
        Ok(())
    }

    /// Applies the edit locally, then on the server. The server's copy wins on success,
    /// the old copy comes back on failure.
    pub async fn edit(
        &mut self,
        id: Uuid,
        update: UpdateFlashcard,
    ) -> Result<Flashcard, ReviewError> {
        let change = self.tentative(|cards, _| {
            if let Some(card) = cards.iter_mut().find(|card| card.id == id) {
                if let Some(front) = &update.front {
                    card.front = front.clone();
                }
                if let Some(back) = &update.back {
                    card.back = back.clone();
                }
                if let Some(part_of_speech) = &update.part_of_speech {
                    card.part_of_speech = part_of_speech.clone();
                }
            }
        });

        match self.api.update_flashcard(id, &update).await {
            Ok(saved) => {
                if let Some(card) = self.flashcards.iter_mut().find(|card| card.id == id) {
                    *card = saved.clone();
                }
                Ok(saved)
            }
            Err(err) => {
                self.revert(change);
                Err(err)
            }
        }
    }
}
