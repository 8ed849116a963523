//! One page of a user's flashcards
use super::Flashcard;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(current_page: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(page_size))
        };
        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashcardPage {
    pub data: Vec<Flashcard>,
    pub pagination: Pagination,
}
