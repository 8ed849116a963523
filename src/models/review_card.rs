//! Read-only view of a flashcard used during a review session.
//! Box and due date stay on the server.
use super::Flashcard;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub part_of_speech: Option<String>,
}

impl From<Flashcard> for ReviewCard {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            front: card.front,
            back: card.back,
            part_of_speech: card.part_of_speech,
        }
    }
}
