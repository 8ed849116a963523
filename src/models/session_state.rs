//! State of one review session.
//!
//! The session walks a fixed snapshot of due cards once:
//! `Loading -> Empty | Active`, `Active -> Active (next card) | Summary`.
//! `Empty` and `Summary` are final. A failed fetch keeps the session in `Loading` so it
//! can be retried, and an expired login abandons the session for good.
//!
//! Submitting a review is split in two halves around the network call:
//! [`SessionState::begin_submit`] takes the `is_submitting` guard and hands out the
//! request, [`SessionState::complete_submit`] applies whatever the server answered.

use super::{ReviewCard, ReviewError};
use log::{info, warn};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Loading,
    Empty,
    Active,
    Summary,
}

/// Local tally of the session. Never sent to the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStatistics {
    pub total_reviewed: u32,
    pub knew_count: u32,
    pub didnt_know_count: u32,
    /// Percentage of "knew it" answers, rounded to the nearest integer.
    pub success_rate: u32,
}

impl SessionStatistics {
    pub fn record(&mut self, knew_it: bool) {
        self.total_reviewed += 1;
        if knew_it {
            self.knew_count += 1;
        } else {
            self.didnt_know_count += 1;
        }
        self.success_rate = success_rate(self.knew_count, self.total_reviewed);
    }
}

pub fn success_rate(knew_count: u32, total_reviewed: u32) -> u32 {
    if total_reviewed == 0 {
        return 0;
    }
    (f64::from(knew_count) / f64::from(total_reviewed) * 100.0).round() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionErrorKind {
    Fetch,
    Update,
}

/// Last failure shown to the user, kept until the next attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

/// A review that has been dispatched but not answered yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingReview {
    pub flashcard_id: Uuid,
    pub knew_it: bool,
    index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved and counted in the statistics.
    Counted,
    /// The card no longer exists. Moved past it without counting.
    Skipped,
    /// Nothing was sent: wrong state or a submission already in flight.
    Ignored,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub view_state: ViewState,
    pub cards: Vec<ReviewCard>,
    pub current_index: usize,
    pub is_answer_revealed: bool,
    pub is_submitting: bool,
    pub statistics: SessionStatistics,
    pub error: Option<SessionError>,
    abandoned: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn current_card(&self) -> Option<&ReviewCard> {
        match self.view_state {
            ViewState::Active => self.cards.get(self.current_index),
            _ => None,
        }
    }

    /// 1-based position of the current card and the session length.
    pub fn progress(&self) -> (usize, usize) {
        (
            (self.current_index + 1).min(self.cards.len()),
            self.cards.len(),
        )
    }

    /// Whether a fetch may start. Only a session still loading can (re)fetch.
    pub fn can_fetch(&self) -> bool {
        !self.abandoned && self.view_state == ViewState::Loading
    }

    /// Applies the result of fetching due cards.
    pub fn apply_fetch(
        &mut self,
        result: Result<Vec<ReviewCard>, ReviewError>,
    ) -> Result<(), ReviewError> {
        if !self.can_fetch() {
            return Ok(());
        }

        match result {
            Ok(cards) if cards.is_empty() => {
                info!("No cards due for review");
                self.error = None;
                self.view_state = ViewState::Empty;
                Ok(())
            }
            Ok(cards) => {
                info!("Review session started with {} cards", cards.len());
                self.error = None;
                self.cards = cards;
                self.current_index = 0;
                self.is_answer_revealed = false;
                self.view_state = ViewState::Active;
                Ok(())
            }
            Err(ReviewError::Authentication) => {
                self.abandon();
                Err(ReviewError::Authentication)
            }
            Err(err) => {
                warn!("Failed to fetch review cards: {}", err);
                self.error = Some(SessionError {
                    kind: SessionErrorKind::Fetch,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn reveal_answer(&mut self) {
        if !self.abandoned && self.view_state == ViewState::Active {
            self.is_answer_revealed = true;
        }
    }

    /// Takes the submission guard for the current card.
    /// Returns `None` when nothing may be sent right now.
    pub fn begin_submit(&mut self, knew_it: bool) -> Option<PendingReview> {
        if self.abandoned || self.view_state != ViewState::Active || self.is_submitting {
            return None;
        }
        let card = self.cards.get(self.current_index)?;

        self.is_submitting = true;
        Some(PendingReview {
            flashcard_id: card.id,
            knew_it,
            index: self.current_index,
        })
    }

    /// Applies the server's answer to a submission started with `begin_submit`.
    pub fn complete_submit(
        &mut self,
        pending: PendingReview,
        result: Result<(), ReviewError>,
    ) -> Result<SubmitOutcome, ReviewError> {
        if self.abandoned
            || !self.is_submitting
            || self.view_state != ViewState::Active
            || pending.index != self.current_index
        {
            return Ok(SubmitOutcome::Ignored);
        }

        match result {
            Ok(()) => {
                self.statistics.record(pending.knew_it);
                self.error = None;
                self.advance();
                Ok(SubmitOutcome::Counted)
            }
            Err(ReviewError::NotFound) => {
                warn!(
                    "Flashcard {} not found, skipping to the next card",
                    pending.flashcard_id
                );
                self.error = None;
                self.advance();
                Ok(SubmitOutcome::Skipped)
            }
            Err(ReviewError::Authentication) => {
                self.is_submitting = false;
                self.abandon();
                Err(ReviewError::Authentication)
            }
            Err(err) => {
                warn!(
                    "Failed to save review of flashcard {}: {}",
                    pending.flashcard_id, err
                );
                self.is_submitting = false;
                self.error = Some(SessionError {
                    kind: SessionErrorKind::Update,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn advance(&mut self) {
        self.is_submitting = false;
        if self.current_index + 1 < self.cards.len() {
            self.current_index += 1;
            self.is_answer_revealed = false;
        } else {
            info!(
                "Review session finished: {}/{} known",
                self.statistics.knew_count, self.statistics.total_reviewed
            );
            self.view_state = ViewState::Summary;
        }
    }

    fn abandon(&mut self) {
        warn!("Review session abandoned: authentication expired");
        self.abandoned = true;
    }
}
