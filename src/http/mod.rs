//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the error
//! page resolution logic.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_error_page_response, build_health_response, build_metrics_response,
    build_not_found_fallback, NOT_FOUND_BODY,
};
