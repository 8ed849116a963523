pub mod client;
pub mod database;
pub mod export;
pub mod models;
pub mod server;

pub use models::{Flashcard, ReviewCard, SessionState, compute_next_state};
