//! Unified error handling: typed error codes, `AppError` and the JSON envelope

mod codes;
mod types;

pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError, AppResult};
