//! Error page responder
//!
//! Resolves one static error document per request from the `X-Code` and
//! `X-Format` headers set by the ingress proxy:
//!
//! 1. status and format negotiation ([`negotiate`])
//! 2. file lookup with fallback ([`lookup`]): `<code>.<ext>`, then `<class>.<ext>`
//! 3. generic `404 page not found` body with the requested status
//!
//! The responder is built once at startup and is immutable afterwards, so it
//! can be shared across connections behind an `Arc`.

pub mod lookup;
pub mod negotiate;

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use lookup::{ErrorPage, PageSource};
pub use negotiate::{DefaultFormat, FormatResolution, MediaTypeError};

/// Status code requested by the proxy
pub const CODE_HEADER: HeaderName = HeaderName::from_static("x-code");
/// Media type requested by the proxy (taken from the client's `Accept`)
pub const FORMAT_HEADER: HeaderName = HeaderName::from_static("x-format");
/// URI of the original request
pub const ORIGINAL_URI_HEADER: HeaderName = HeaderName::from_static("x-original-uri");
/// Namespace of the backend service
pub const NAMESPACE_HEADER: HeaderName = HeaderName::from_static("x-namespace");
/// Name of the ingress the request matched
pub const INGRESS_NAME_HEADER: HeaderName = HeaderName::from_static("x-ingress-name");
/// Name of the backend service
pub const SERVICE_NAME_HEADER: HeaderName = HeaderName::from_static("x-service-name");
/// Port of the backend service
pub const SERVICE_PORT_HEADER: HeaderName = HeaderName::from_static("x-service-port");
/// Unique request id assigned by the proxy
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Headers mirrored onto the response in debug mode
const ECHO_HEADERS: [HeaderName; 9] = [
    CODE_HEADER,
    FORMAT_HEADER,
    CONTENT_TYPE,
    ORIGINAL_URI_HEADER,
    NAMESPACE_HEADER,
    INGRESS_NAME_HEADER,
    SERVICE_NAME_HEADER,
    SERVICE_PORT_HEADER,
    REQUEST_ID_HEADER,
];

/// Construction-time configuration error
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("default format {format:?} is not a valid media type: {source}")]
    MalformedDefaultFormat {
        format: String,
        source: MediaTypeError,
    },
    #[error("couldn't get file extension for default format {format:?}")]
    UnmappedDefaultFormat { format: String },
}

/// Stateless per-request error page handler
#[derive(Debug, Clone)]
pub struct ErrorResponder {
    root: PathBuf,
    default_format: DefaultFormat,
    debug: bool,
}

impl ErrorResponder {
    /// Build a responder serving documents from `root_path`
    ///
    /// `default_format` must be a well-formed media type with a known
    /// extension. The root directory is not checked here.
    pub fn new(root_path: impl Into<PathBuf>, default_format: &str) -> Result<Self, ResponderError> {
        let default_format = DefaultFormat::parse(default_format).map_err(|source| {
            if source.is_malformed() {
                ResponderError::MalformedDefaultFormat {
                    format: default_format.to_string(),
                    source,
                }
            } else {
                ResponderError::UnmappedDefaultFormat {
                    format: default_format.to_string(),
                }
            }
        })?;

        Ok(Self {
            root: root_path.into(),
            default_format,
            debug: false,
        })
    }

    /// Enable echoing of the negotiation headers onto responses
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    pub const fn default_format(&self) -> &DefaultFormat {
        &self.default_format
    }

    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Resolve and build the error response for one request
    pub async fn respond(&self, headers: &HeaderMap, is_head: bool) -> Response<Full<Bytes>> {
        self.serve(headers, is_head).await.response
    }

    /// Like [`respond`](Self::respond), also reporting how the response was chosen
    pub async fn serve(&self, headers: &HeaderMap, is_head: bool) -> Served {
        let echo = if self.debug {
            echo_headers(headers)
        } else {
            HeaderMap::new()
        };

        let status = negotiate::parse_status(headers.get(CODE_HEADER));
        let negotiated = negotiate::negotiate_format(headers.get(FORMAT_HEADER), &self.default_format);
        let format = match negotiated.resolution {
            FormatResolution::Mapped => negotiated.extension.clone(),
            other => other.as_str().to_string(),
        };

        let candidates = lookup::candidate_paths(&self.root, status, &negotiated.extension);
        let page = lookup::find_page(candidates).await;
        let source = page.as_ref().map_or(PageSource::Fallback, |page| page.source);

        let response = match page {
            Some(page) => {
                logger::log_info(&format!(
                    "serving custom error response for code {} and format {} from file {} ({} match)",
                    status.as_u16(),
                    String::from_utf8_lossy(negotiated.content_type.as_bytes()),
                    page.path.display(),
                    source.as_str()
                ));
                http::build_error_page_response(
                    status,
                    negotiated.content_type,
                    &echo,
                    page.content,
                    is_head,
                )
            }
            None => {
                logger::log_warning(&format!(
                    "serving generic response for code {} and extension {:?}: nothing under {} ({} match)",
                    status.as_u16(),
                    negotiated.extension,
                    self.root.display(),
                    source.as_str()
                ));
                http::build_not_found_fallback(status, negotiated.content_type, &echo, is_head)
            }
        };

        Served {
            response,
            status,
            format,
            source,
        }
    }
}

/// A response together with how it was resolved
#[derive(Debug)]
pub struct Served {
    pub response: Response<Full<Bytes>>,
    pub status: StatusCode,
    /// Mapped extension, or `malformed` / `unmapped`
    pub format: String,
    pub source: PageSource,
}

fn echo_headers(headers: &HeaderMap) -> HeaderMap {
    let mut echo = HeaderMap::new();
    for name in ECHO_HEADERS {
        if let Some(value) = headers.get(&name) {
            echo.insert(name, value.clone());
        }
    }
    echo
}
