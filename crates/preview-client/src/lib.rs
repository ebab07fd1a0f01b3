//! Preview Client - HTTP layer for the entity preview pipeline
//!
//! Provides:
//! - [`HttpEvaluationClient`]: the `reqwest`-backed implementation of
//!   `preview_core::EvaluationClient`
//! - Response interpretation: payloads, lifted validation warnings,
//!   structured API errors, validation-list rejections, 401 handling
//! - [`Navigator`]: the shell capability poked on unauthorized responses
//! - [`EntityClient`]: thin CRUD wrapper for saved entity documents

pub mod entity;
pub mod http;
pub mod navigator;

// Re-exports for convenience
pub use entity::EntityClient;
pub use http::{
    interpret_response, ClientConfig, HttpEvaluationClient, VALIDATION_LIST_CONTENT_TYPE,
};
pub use navigator::Navigator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
