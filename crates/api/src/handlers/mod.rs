pub mod auth;
pub mod chat;
pub mod companions;
pub mod missions;
pub mod payments;
