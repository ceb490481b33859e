/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// In-app currency amount (NTG). Stored as BIGINT.
pub type Ntg = i64;
