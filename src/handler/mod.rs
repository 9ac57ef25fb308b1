//! Request handler module
//!
//! Responsible for request routing dispatch: health probes and error pages.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
