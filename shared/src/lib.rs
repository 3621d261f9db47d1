//! Shared types for the water utility billing server
//!
//! Domain models, error codes and response envelopes used by the
//! server and by API clients.

pub mod error;
pub mod models;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::{PageRequest, PaginatedResponse, Pagination};
