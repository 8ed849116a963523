//! Review session controller.
//!
//! Owns one [`SessionState`] and drives it with calls to a [`ReviewApi`]. Every
//! transition method either completes synchronously or suspends exactly once, on the
//! network call, and reports the outcome as a `Result`.

use super::ReviewApi;
use crate::models::{
    ReviewError, SessionState, SubmitOutcome, UpdateCardReview, ViewState,
    review_data::{DEFAULT_SESSION_LIMIT, MAX_SESSION_LIMIT},
    session_state::PendingReview,
};

pub struct ReviewSession<A: ReviewApi> {
    api: A,
    limit: u32,
    state: SessionState,
}

impl<A: ReviewApi> ReviewSession<A> {
    pub fn new(api: A) -> Self {
        Self::with_limit(api, DEFAULT_SESSION_LIMIT)
    }

    /// Session of at most `limit` cards. The limit is clamped to what the server accepts.
    pub fn with_limit(api: A, limit: u32) -> Self {
        Self {
            api,
            limit: limit.clamp(1, MAX_SESSION_LIMIT),
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Fetches the cards for this session. Calling it again after a failure retries;
    /// once the cards are in, further calls change nothing. An abandoned session only
    /// reports the expired login.
    pub async fn initialize(&mut self) -> Result<ViewState, ReviewError> {
        if self.state.is_abandoned() {
            return Err(ReviewError::Authentication);
        }
        if self.state.can_fetch() {
            let result = self.api.fetch_session(self.limit).await;
            self.state.apply_fetch(result)?;
        }
        Ok(self.state.view_state)
    }

    pub fn reveal_answer(&mut self) {
        self.state.reveal_answer();
    }

    /// Starts submitting the current card without waiting for the server.
    /// `None` while another submission is in flight or the session is not active.
    pub fn begin_submit(&mut self, knew_it: bool) -> Option<(PendingReview, UpdateCardReview)> {
        self.state.begin_submit(knew_it).map(|pending| {
            let update = UpdateCardReview {
                flashcard_id: pending.flashcard_id,
                knew_it: pending.knew_it,
            };
            (pending, update)
        })
    }

    /// Finishes a submission started with [`Self::begin_submit`].
    pub fn complete_submit(
        &mut self,
        pending: PendingReview,
        result: Result<(), ReviewError>,
    ) -> Result<SubmitOutcome, ReviewError> {
        self.state.complete_submit(pending, result)
    }

    /// Sends the answer for the current card and moves on according to the reply.
    pub async fn submit_review(&mut self, knew_it: bool) -> Result<SubmitOutcome, ReviewError> {
        let Some((pending, update)) = self.begin_submit(knew_it) else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = self.api.submit_review(update).await;
        self.complete_submit(pending, result)
    }
}
