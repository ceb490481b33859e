//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Plain
//! reads and writes take `&PgPool`; row-locking and balance mutations take
//! an open transaction so the engine can compose them atomically. Methods
//! needed in both contexts are generic over [`sqlx::PgExecutor`].

pub mod account_repo;
pub mod chat_repo;
pub mod companion_repo;
pub mod completion_repo;
pub mod mission_repo;
pub mod payment_repo;

pub use account_repo::AccountRepo;
pub use chat_repo::ChatRepo;
pub use companion_repo::CompanionRepo;
pub use completion_repo::CompletionRepo;
pub use mission_repo::MissionRepo;
pub use payment_repo::PaymentRepo;
