//! Wire types of the review endpoints.
use super::ReviewCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SESSION_LIMIT: u32 = 50;
pub const MAX_SESSION_LIMIT: u32 = 100;

/// Body of `GET /review/session`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewSessionResponse {
    pub cards: Vec<ReviewCard>,
}

/// Body of `POST /review/update`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardReview {
    pub flashcard_id: Uuid,
    pub knew_it: bool,
}

/// Where the card landed after the review was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdateResponse {
    pub flashcard_id: Uuid,
    pub leitner_box: i32,
    pub review_due_at: DateTime<Utc>,
}
