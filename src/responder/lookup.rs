//! Error document lookup
//!
//! The fallback policy is an ordered list of candidate paths: exact status
//! code first, then the status class. Whatever is left unmatched falls through
//! to the generic not-found response built by the caller.

use crate::logger;
use hyper::body::Bytes;
use hyper::StatusCode;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Which candidate produced the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// `<root>/<code><.ext>`
    Exact,
    /// `<root>/<class><.ext>`
    Class,
    /// No file matched
    Fallback,
}

impl PageSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Class => "class",
            Self::Fallback => "fallback",
        }
    }
}

/// A matched error document
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub source: PageSource,
    pub path: PathBuf,
    pub content: Bytes,
}

/// Status class prefix, e.g. `4xx` for 404
pub fn status_class(status: StatusCode) -> String {
    format!("{}xx", status.as_u16() / 100)
}

/// Ordered lookup candidates for a status code and extension
///
/// The extension gets a leading dot when it lacks one. An empty root yields
/// no candidates.
pub fn candidate_paths(root: &Path, status: StatusCode, extension: &str) -> Vec<(PageSource, PathBuf)> {
    if root.as_os_str().is_empty() {
        return Vec::new();
    }

    let ext = if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    };

    vec![
        (PageSource::Exact, root.join(format!("{}{ext}", status.as_u16()))),
        (PageSource::Class, root.join(format!("{}{ext}", status_class(status)))),
    ]
}

/// Read the first candidate that exists
///
/// Read failures of any kind move on to the next candidate.
pub async fn find_page(candidates: Vec<(PageSource, PathBuf)>) -> Option<ErrorPage> {
    for (source, path) in candidates {
        match fs::read(&path).await {
            Ok(content) => {
                return Some(ErrorPage {
                    source,
                    path,
                    content: Bytes::from(content),
                });
            }
            Err(e) => {
                logger::log_debug(&format!(
                    "unexpected error opening file {}: {e}",
                    path.display()
                ));
            }
        }
    }
    None
}
