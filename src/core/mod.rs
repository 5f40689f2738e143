//! Shared core types

pub mod error;

pub use error::{AppError, AppResult};
