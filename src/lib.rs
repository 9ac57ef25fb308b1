//! Custom error page backend for ingress proxies.
//!
//! The proxy forwards failed requests here with the status in `X-Code` and the
//! negotiated media type in `X-Format`; the server answers with a static
//! document from the error pages directory, `<code>.<ext>` first, then
//! `<class>.<ext>`, then a generic not-found body.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod responder;
pub mod server;
pub mod telemetry;
