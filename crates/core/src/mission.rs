//! Mission types, the per-type effect table, and the pure execution plan.
//!
//! [`plan_execution`] decides the outcome of a mission attempt from a
//! consistent snapshot (locked account balance, locked companion, latest
//! completion). The persistence layer is responsible for taking that
//! snapshot and writing the plan back atomically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cooldown;
use crate::error::CoreError;
use crate::ledger;
use crate::params::{CompanionParams, ParamEffect};
use crate::types::{DbId, Ntg, Timestamp};

/// Maximum number of completions returned by the history listing.
pub const COMPLETION_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionType {
    Feed,
    Hairstyle,
    Selfie,
}

/// Effect applied by each mission type. Fixed per type, not per catalog entry.
const EFFECTS: [(MissionType, ParamEffect); 3] = [
    (
        MissionType::Feed,
        ParamEffect {
            energy: 20,
            mood: 10,
            bond: 5,
        },
    ),
    (
        MissionType::Hairstyle,
        ParamEffect {
            energy: 0,
            mood: 15,
            bond: 10,
        },
    ),
    (
        MissionType::Selfie,
        ParamEffect {
            energy: 0,
            mood: 25,
            bond: 15,
        },
    ),
];

impl MissionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Hairstyle => "hairstyle",
            Self::Selfie => "selfie",
        }
    }

    pub fn effect(self) -> ParamEffect {
        EFFECTS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, effect)| *effect)
            .unwrap_or_default()
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed" => Ok(Self::Feed),
            "hairstyle" => Ok(Self::Hairstyle),
            "selfie" => Ok(Self::Selfie),
            other => Err(CoreError::Validation(format!(
                "Unknown mission type '{other}'"
            ))),
        }
    }
}

/// Terminal failure states of a mission execution.
///
/// These are expected outcomes, not faults: callers render them to users
/// and must not log them as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissionError {
    #[error("Mission {0} not found")]
    MissionNotFound(DbId),

    #[error("Companion {0} not found")]
    CompanionNotFound(DbId),

    #[error("Mission on cooldown, {seconds_remaining} seconds remaining")]
    OnCooldown { seconds_remaining: i64 },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Ntg, available: Ntg },
}

/// Everything [`plan_execution`] needs to know about the mission.
#[derive(Debug, Clone, Copy)]
pub struct MissionSpec {
    pub mission_type: MissionType,
    pub cost_ntg: Ntg,
    pub cooldown_seconds: i64,
}

/// The state to write back after a successful execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub new_balance: Ntg,
    pub params: CompanionParams,
    pub effect: ParamEffect,
}

/// Decide a mission attempt: cooldown first, then balance, then effect.
pub fn plan_execution(
    mission: &MissionSpec,
    balance: Ntg,
    params: CompanionParams,
    last_completed: Option<Timestamp>,
    now: Timestamp,
) -> Result<ExecutionPlan, MissionError> {
    let cooldown = cooldown::evaluate(last_completed, mission.cooldown_seconds, now);
    if !cooldown.eligible {
        return Err(MissionError::OnCooldown {
            seconds_remaining: cooldown.seconds_remaining,
        });
    }

    let new_balance = ledger::debit(balance, mission.cost_ntg).map_err(|e| {
        MissionError::InsufficientBalance {
            required: e.required,
            available: e.available,
        }
    })?;

    let effect = mission.mission_type.effect();
    Ok(ExecutionPlan {
        new_balance,
        params: params.with_effect(effect),
        effect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn feed() -> MissionSpec {
        MissionSpec {
            mission_type: MissionType::Feed,
            cost_ntg: 50,
            cooldown_seconds: 3600,
        }
    }

    fn params(energy: i32, mood: i32, bond: i32) -> CompanionParams {
        CompanionParams { energy, mood, bond }
    }

    // -----------------------------------------------------------------------
    // Effect table
    // -----------------------------------------------------------------------

    #[test]
    fn effect_table_matches_types() {
        assert_eq!(
            MissionType::Feed.effect(),
            ParamEffect { energy: 20, mood: 10, bond: 5 }
        );
        assert_eq!(
            MissionType::Hairstyle.effect(),
            ParamEffect { energy: 0, mood: 15, bond: 10 }
        );
        assert_eq!(
            MissionType::Selfie.effect(),
            ParamEffect { energy: 0, mood: 25, bond: 15 }
        );
    }

    #[test]
    fn mission_type_parses_known_names_only() {
        assert_eq!("selfie".parse::<MissionType>().unwrap(), MissionType::Selfie);
        assert_matches!("dance".parse::<MissionType>(), Err(CoreError::Validation(_)));
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    #[test]
    fn feed_from_fresh_state() {
        let plan = plan_execution(&feed(), 100, params(50, 50, 0), None, now()).unwrap();
        assert_eq!(plan.new_balance, 50);
        assert_eq!(plan.params, params(70, 60, 5));
    }

    #[test]
    fn retry_within_cooldown_is_rejected() {
        let result = plan_execution(&feed(), 100, params(50, 50, 0), Some(now()), now());
        assert_matches!(
            result,
            Err(MissionError::OnCooldown { seconds_remaining }) if seconds_remaining > 0
        );
    }

    #[test]
    fn cooldown_checked_before_balance() {
        let result = plan_execution(&feed(), 0, params(50, 50, 0), Some(now()), now());
        assert_matches!(result, Err(MissionError::OnCooldown { .. }));
    }

    #[test]
    fn insufficient_balance_reports_required_and_available() {
        let result = plan_execution(&feed(), 10, params(50, 50, 0), None, now());
        assert_eq!(
            result,
            Err(MissionError::InsufficientBalance {
                required: 50,
                available: 10
            })
        );
    }

    #[test]
    fn eligible_again_after_cooldown_elapses() {
        let last = now() - Duration::seconds(3600);
        assert!(plan_execution(&feed(), 100, params(50, 50, 0), Some(last), now()).is_ok());
    }

    #[test]
    fn free_mission_with_zero_balance_succeeds() {
        let spec = MissionSpec {
            mission_type: MissionType::Selfie,
            cost_ntg: 0,
            cooldown_seconds: 0,
        };
        let plan = plan_execution(&spec, 0, params(10, 90, 0), Some(now()), now()).unwrap();
        assert_eq!(plan.new_balance, 0);
        assert_eq!(plan.params, params(10, 100, 15));
    }
}
