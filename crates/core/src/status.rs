//! Qualitative companion status derived from energy and mood.
//!
//! Never stored; recomputed from the current parameters on every read.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanionStatus {
    Happy,
    Normal,
    Bored,
    Tired,
    Sad,
    Exhausted,
}

impl CompanionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Normal => "normal",
            Self::Bored => "bored",
            Self::Tired => "tired",
            Self::Sad => "sad",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Classify by the average of energy and mood.
///
/// Thresholds are compared against `energy + mood` doubled-out, which is
/// exact for the real-valued average: `avg >= 80` iff `sum >= 160`.
pub fn classify(energy: i32, mood: i32) -> CompanionStatus {
    let sum = i64::from(energy) + i64::from(mood);
    if sum >= 160 {
        CompanionStatus::Happy
    } else if sum >= 120 {
        CompanionStatus::Normal
    } else if sum >= 80 {
        CompanionStatus::Bored
    } else if sum >= 40 {
        if energy < mood {
            CompanionStatus::Tired
        } else {
            CompanionStatus::Sad
        }
    } else {
        CompanionStatus::Exhausted
    }
}
