//! Client side of the review flow.
//!
//! Controllers own their state and talk to the server only through the traits below,
//! so they can run against the real HTTP API or an in-memory fake.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Flashcard, FlashcardPage, ListFlashcards, ReviewCard, ReviewError, UpdateCardReview,
    UpdateFlashcard,
};

pub mod config;
pub mod flashcard_list;
pub mod http;
pub mod review_session;

pub use config::ClientConfig;
pub use flashcard_list::FlashcardList;
pub use http::HttpClient;
pub use review_session::ReviewSession;

/// Remote side of a review session.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Due cards for a new session, at most `limit` of them.
    async fn fetch_session(&self, limit: u32) -> Result<Vec<ReviewCard>, ReviewError>;

    /// Records one review. The server applies the Leitner rule.
    async fn submit_review(&self, update: UpdateCardReview) -> Result<(), ReviewError>;
}

/// Remote side of the flashcard list.
#[async_trait]
pub trait FlashcardApi: Send + Sync {
    async fn list_flashcards(&self, query: ListFlashcards) -> Result<FlashcardPage, ReviewError>;

    async fn update_flashcard(
        &self,
        id: Uuid,
        update: &UpdateFlashcard,
    ) -> Result<Flashcard, ReviewError>;

    async fn delete_flashcard(&self, id: Uuid) -> Result<(), ReviewError>;
}
