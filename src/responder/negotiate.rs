//! Status and format negotiation
//!
//! Turns the proxy-supplied `X-Code` and `X-Format` headers into a status code,
//! a response `Content-Type` and the extension used for file lookup. None of
//! these steps fail the request; anomalies degrade to defaults and are logged.

use crate::http::mime::extension_for;
use crate::logger;
use hyper::header::HeaderValue;
use hyper::StatusCode;
use mime::Mime;
use thiserror::Error;

/// Status used when the code header is absent or invalid
pub const DEFAULT_STATUS: StatusCode = StatusCode::NOT_FOUND;

/// Why a media type could not be turned into a file extension
#[derive(Debug, Error)]
pub enum MediaTypeError {
    #[error("{0}")]
    Syntax(#[from] mime::FromStrError),
    #[error("expected token after slash")]
    EmptySubtype,
    #[error("media type is not a valid header value")]
    InvalidHeaderValue,
    #[error("no extension known for media type {0}")]
    Unmapped(String),
}

impl MediaTypeError {
    /// `true` for syntax errors, `false` for well-formed but unknown types
    pub const fn is_malformed(&self) -> bool {
        !matches!(self, Self::Unmapped(_))
    }
}

/// Parse a media type and map its essence to a file extension
///
/// Parameters (`; charset=...`) are accepted and ignored for the mapping.
/// Optional whitespace around `;` is allowed, as in `text/html ;charset=utf-8`.
pub fn resolve_extension(value: &str) -> Result<(Mime, &'static str), MediaTypeError> {
    let media_type: Mime = strip_parameter_whitespace(value).parse()?;
    if media_type.subtype().as_str().is_empty() {
        return Err(MediaTypeError::EmptySubtype);
    }
    match extension_for(media_type.essence_str()) {
        Some(ext) => Ok((media_type, ext)),
        None => Err(MediaTypeError::Unmapped(media_type.essence_str().to_string())),
    }
}

fn strip_parameter_whitespace(value: &str) -> String {
    value.split(';').map(str::trim).collect::<Vec<_>>().join(";")
}

/// Validated default format, resolved once at construction
#[derive(Debug, Clone)]
pub struct DefaultFormat {
    /// The configured value, verbatim
    pub raw: HeaderValue,
    /// Base type without parameters
    pub essence: HeaderValue,
    pub extension: &'static str,
}

impl DefaultFormat {
    pub fn parse(value: &str) -> Result<Self, MediaTypeError> {
        let (media_type, extension) = resolve_extension(value)?;
        let raw = HeaderValue::from_str(value.trim())
            .map_err(|_| MediaTypeError::InvalidHeaderValue)?;
        let essence = HeaderValue::from_str(media_type.essence_str())
            .map_err(|_| MediaTypeError::InvalidHeaderValue)?;
        Ok(Self {
            raw,
            essence,
            extension,
        })
    }
}

/// How the format header was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatResolution {
    /// Well-formed and mapped to a known extension
    Mapped,
    /// Not a valid media type
    Malformed,
    /// Valid media type without a known extension
    Unmapped,
}

impl FormatResolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mapped => "mapped",
            Self::Malformed => "malformed",
            Self::Unmapped => "unmapped",
        }
    }
}

/// Outcome of content negotiation for one request
#[derive(Debug, Clone)]
pub struct Negotiated {
    pub content_type: HeaderValue,
    pub extension: String,
    pub resolution: FormatResolution,
}

/// Parse the status code header
///
/// Absent, non-numeric or out-of-range values yield 404. The accepted range is
/// 200..=999: informational codes cannot be sent as a final response.
pub fn parse_status(value: Option<&HeaderValue>) -> StatusCode {
    let parsed = value
        .ok_or_else(|| "header not set".to_string())
        .and_then(|v| v.to_str().map_err(|e| e.to_string()))
        .and_then(|s| s.trim().parse::<u16>().map_err(|e| format!("{e}: {s:?}")))
        .and_then(|code| StatusCode::from_u16(code).map_err(|e| format!("{e}: {code}")))
        .and_then(|status| {
            if status.is_informational() {
                Err(format!("informational status {} is not a final response", status.as_u16()))
            } else {
                Ok(status)
            }
        });

    match parsed {
        Ok(status) => status,
        Err(detail) => {
            logger::log_warning(&format!(
                "unexpected error reading return code: {detail}. Using {}",
                DEFAULT_STATUS.as_u16()
            ));
            DEFAULT_STATUS
        }
    }
}

/// Resolve the format header into content type and lookup extension
pub fn negotiate_format(value: Option<&HeaderValue>, default: &DefaultFormat) -> Negotiated {
    let Some(value) = value else {
        logger::log_debug(&format!(
            "format not specified. Using {}",
            String::from_utf8_lossy(default.raw.as_bytes())
        ));
        return Negotiated {
            content_type: default.essence.clone(),
            extension: default.extension.to_string(),
            resolution: FormatResolution::Mapped,
        };
    };

    let raw = String::from_utf8_lossy(value.as_bytes()).into_owned();
    let resolved = value
        .to_str()
        .map_err(|_| MediaTypeError::InvalidHeaderValue)
        .and_then(resolve_extension);

    match resolved {
        Ok((media_type, extension)) => Negotiated {
            content_type: HeaderValue::from_str(media_type.essence_str())
                .unwrap_or_else(|_| default.essence.clone()),
            extension: extension.to_string(),
            resolution: FormatResolution::Mapped,
        },
        Err(e) if e.is_malformed() => {
            logger::log_warning(&format!(
                "unexpected error reading media type extension: {e}. Using {raw}"
            ));
            Negotiated {
                content_type: default.raw.clone(),
                extension: raw,
                resolution: FormatResolution::Malformed,
            }
        }
        Err(_) => {
            logger::log_warning(&format!(
                "couldn't get media type extension. Using {raw}"
            ));
            Negotiated {
                content_type: value.clone(),
                extension: raw,
                resolution: FormatResolution::Unmapped,
            }
        }
    }
}
