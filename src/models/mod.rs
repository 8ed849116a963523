pub mod commands;
pub mod flashcard;
pub mod leitner;
pub mod page;
pub mod review_card;
pub mod review_data;
pub mod review_error;
pub mod session_state;

pub use commands::{CreateFlashcard, ListFlashcards, UpdateFlashcard, ValidationError};
pub use flashcard::Flashcard;
pub use leitner::{LeitnerState, SchedulerError, compute_next_state};
pub use page::{FlashcardPage, Pagination};
pub use review_card::ReviewCard;
pub use review_data::{ReviewSessionResponse, ReviewUpdateResponse, UpdateCardReview};
pub use review_error::ReviewError;
pub use session_state::{SessionState, SessionStatistics, SubmitOutcome, ViewState};
