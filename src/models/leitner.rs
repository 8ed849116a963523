//! Leitner box spaced repetition rule.
//!
//! Every card sits in one of `MAX_BOX` boxes. The box decides how long the card rests
//! before it is due again:
//! - Knew it: the card moves one box up, capped at `MAX_BOX`
//! - Didn't know it: the card goes back to box 1, whatever box it was in
//! - Box 1 comes back the same day, higher boxes wait progressively longer
//!
//! The rule is pure. Persisting the result is the caller's job.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Box every new card starts in, and the box a forgotten card returns to.
pub const MIN_BOX: i32 = 1;

/// Highest box a card can reach.
pub const MAX_BOX: i32 = 5;

/// Resting time for boxes `1..=MAX_BOX`, in minutes.
const BOX_INTERVAL_MINUTES: [i64; MAX_BOX as usize] = [
    // box 1: same day
    10,
    // box 2: 1 day
    24 * 60,
    // box 3: 3 days
    3 * 24 * 60,
    // box 4: 1 week
    7 * 24 * 60,
    // box 5: 2 weeks
    14 * 24 * 60,
];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Leitner box {0} is outside the allowed range")]
    InvalidBox(i32),
}

/// Box and due date a card moves to after a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeitnerState {
    pub next_box: i32,
    pub next_due_at: DateTime<Utc>,
}

pub fn is_valid_box(leitner_box: i32) -> bool {
    (MIN_BOX..=MAX_BOX).contains(&leitner_box)
}

/// Resting time of a box. Fails for boxes outside `MIN_BOX..=MAX_BOX`.
pub fn interval_for_box(leitner_box: i32) -> Result<Duration, SchedulerError> {
    if !is_valid_box(leitner_box) {
        return Err(SchedulerError::InvalidBox(leitner_box));
    }
    let minutes = BOX_INTERVAL_MINUTES[(leitner_box - MIN_BOX) as usize];
    Ok(Duration::minutes(minutes))
}

/// Calculates where a card goes after being reviewed at `now`.
pub fn compute_next_state(
    current_box: i32,
    knew_it: bool,
    now: DateTime<Utc>,
) -> Result<LeitnerState, SchedulerError> {
    if !is_valid_box(current_box) {
        return Err(SchedulerError::InvalidBox(current_box));
    }

    let next_box = if knew_it {
        (current_box + 1).min(MAX_BOX)
    } else {
        MIN_BOX
    };

    Ok(LeitnerState {
        next_box,
        next_due_at: now + interval_for_box(next_box)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_knew_it_advances_one_box() {
        for current in MIN_BOX..=MAX_BOX {
            let next = compute_next_state(current, true, now()).unwrap();
            assert_eq!(next.next_box, (current + 1).min(MAX_BOX));
            assert!(next.next_due_at > now());
        }
    }

    #[test]
    fn test_top_box_stays_at_top() {
        let next = compute_next_state(MAX_BOX, true, now()).unwrap();
        assert_eq!(next.next_box, MAX_BOX);
        assert_eq!(next.next_due_at, now() + Duration::days(14));
    }

    #[test]
    fn test_didnt_know_resets_to_first_box() {
        let box_one_due = now() + interval_for_box(MIN_BOX).unwrap();
        for current in MIN_BOX..=MAX_BOX {
            let next = compute_next_state(current, false, now()).unwrap();
            assert_eq!(next.next_box, MIN_BOX);
            assert_eq!(next.next_due_at, box_one_due);
        }
    }

    #[test]
    fn test_first_box_is_due_the_same_day() {
        let due = now() + interval_for_box(MIN_BOX).unwrap();
        assert_eq!(due.date_naive(), now().date_naive());
    }

    #[test]
    fn test_intervals_grow_with_box() {
        let intervals: Vec<_> = (MIN_BOX..=MAX_BOX)
            .map(|b| interval_for_box(b).unwrap())
            .collect();
        assert!(intervals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_box_is_rejected() {
        assert_eq!(
            compute_next_state(0, true, now()),
            Err(SchedulerError::InvalidBox(0))
        );
        assert_eq!(
            compute_next_state(MAX_BOX + 1, false, now()),
            Err(SchedulerError::InvalidBox(MAX_BOX + 1))
        );
        assert!(interval_for_box(-3).is_err());
    }
}
