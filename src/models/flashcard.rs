//! Flashcard is a pair <front, back> owned by one user, together with its Leitner box
//! and the moment it is due for review again.
use super::leitner::MIN_BOX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub front: String,
    pub back: String,
    pub part_of_speech: Option<String>,
    pub leitner_box: i32,
    pub review_due_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    /// New cards start in the first box and are due right away.
    pub fn new(
        user_id: Uuid,
        front: String,
        back: String,
        part_of_speech: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            front,
            back,
            part_of_speech,
            leitner_box: MIN_BOX,
            review_due_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.review_due_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_flashcard_creation() {
        let now = Utc::now();
        let card = Flashcard::new(
            Uuid::new_v4(),
            "cześć".to_string(),
            "hello".to_string(),
            Some("interjection".to_string()),
            now,
        );

        assert_eq!(card.front, "cześć");
        assert_eq!(card.back, "hello");
        assert_eq!(card.leitner_box, 1);
        assert_eq!(card.review_due_at, now);
        assert_eq!(card.created_at, card.updated_at);
    }

    #[test]
    fn test_new_card_is_due_immediately() {
        let now = Utc::now();
        let card = Flashcard::new(Uuid::new_v4(), "kot".into(), "cat".into(), None, now);

        assert!(card.is_due(now));
        assert!(!card.is_due(now - Duration::seconds(1)));
    }
}
