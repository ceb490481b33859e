//! Domain logic for the companion economy.
//!
//! Everything in this crate is pure: no I/O, no clocks. Callers pass `now`
//! explicitly so the rules stay deterministic under test.

pub mod chat;
pub mod cooldown;
pub mod error;
pub mod ledger;
pub mod mission;
pub mod params;
pub mod payment;
pub mod quota;
pub mod search;
pub mod status;
pub mod style;
pub mod types;
pub mod validation;
