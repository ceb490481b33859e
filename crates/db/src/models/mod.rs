//! Entity models and DTOs, one module per table group.

pub mod account;
pub mod chat;
pub mod companion;
pub mod mission;
pub mod payment;
