//! Cooldown eligibility for a (account, companion, mission) triple.
//!
//! The caller supplies the most recent completion timestamp for the triple;
//! finding it (and locking around it) is the persistence layer's job.

use serde::Serialize;

use crate::types::Timestamp;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CooldownState {
    pub eligible: bool,
    /// Whole seconds until eligible, floored. Zero when eligible.
    pub seconds_remaining: i64,
}

impl CooldownState {
    pub const READY: Self = Self {
        eligible: true,
        seconds_remaining: 0,
    };
}

/// Evaluate eligibility at `now` given the last completion (if any).
///
/// Eligible iff `now >= last + cooldown`. The remaining time is floored, so
/// a sub-second remainder reports `seconds_remaining = 0` while still
/// ineligible.
pub fn evaluate(last_completed: Option<Timestamp>, cooldown_secs: i64, now: Timestamp) -> CooldownState {
    let Some(last) = last_completed else {
        return CooldownState::READY;
    };

    let available_at = last + chrono::Duration::seconds(cooldown_secs.max(0));
    if now >= available_at {
        return CooldownState::READY;
    }

    CooldownState {
        eligible: false,
        seconds_remaining: (available_at - now).num_seconds().max(0),
    }
}

/// Whole minutes for display, rounded down.
pub fn minutes_remaining(seconds_remaining: i64) -> i64 {
    seconds_remaining.max(0) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_history_is_eligible() {
        assert_eq!(evaluate(None, 3600, t0()), CooldownState::READY);
    }

    #[test]
    fn immediately_after_completion_is_on_cooldown() {
        let state = evaluate(Some(t0()), 3600, t0());
        assert!(!state.eligible);
        assert_eq!(state.seconds_remaining, 3600);
    }

    #[test]
    fn becomes_eligible_exactly_at_boundary() {
        let now = t0() + Duration::seconds(3600);
        assert_eq!(evaluate(Some(t0()), 3600, now), CooldownState::READY);
    }

    #[test]
    fn remaining_is_floored() {
        let now = t0() + Duration::milliseconds(1500);
        let state = evaluate(Some(t0()), 10, now);
        assert!(!state.eligible);
        assert_eq!(state.seconds_remaining, 8);
    }

    #[test]
    fn sub_second_remainder_reports_zero_but_ineligible() {
        let now = t0() + Duration::milliseconds(9_500);
        let state = evaluate(Some(t0()), 10, now);
        assert!(!state.eligible);
        assert_eq!(state.seconds_remaining, 0);
    }

    #[test]
    fn zero_cooldown_is_always_eligible() {
        assert!(evaluate(Some(t0()), 0, t0()).eligible);
    }

    #[test]
    fn future_dated_completion_never_reports_negative() {
        let state = evaluate(Some(t0() + Duration::hours(2)), 60, t0());
        assert!(!state.eligible);
        assert!(state.seconds_remaining > 0);
    }

    #[test]
    fn minutes_round_down() {
        assert_eq!(minutes_remaining(3599), 59);
        assert_eq!(minutes_remaining(59), 0);
        assert_eq!(minutes_remaining(-5), 0);
    }
}
