//! Data models
//!
//! Shared between the utility server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids, all instants are Unix millis (UTC).

pub mod bill;
pub mod connection;
pub mod consumer;
pub mod settings;

// Re-exports
pub use bill::*;
pub use connection::*;
pub use consumer::*;
pub use settings::*;
