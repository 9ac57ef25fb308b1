//! MIME type mapping module
//!
//! Maps a media type essence (`type/subtype`, no parameters) to the file
//! extension error documents are stored under.

/// Get the preferred file extension for a media type essence
///
/// Lookup is case-insensitive. Returns `None` for types without a known
/// extension.
///
/// # Examples
/// ```
/// use custom_error_pages::http::mime::extension_for;
/// assert_eq!(extension_for("text/html"), Some("html"));
/// assert_eq!(extension_for("application/json"), Some("json"));
/// assert_eq!(extension_for("application/x-unknown"), None);
/// ```
pub fn extension_for(essence: &str) -> Option<&'static str> {
    let ext = match essence.to_ascii_lowercase().as_str() {
        // Text
        "text/html" => "html",
        "application/xhtml+xml" => "xhtml",
        "text/css" => "css",
        "text/plain" => "txt",
        "text/markdown" => "md",
        "text/csv" => "csv",
        "text/xml" | "application/xml" => "xml",

        // Structured data
        "text/javascript" | "application/javascript" => "js",
        "application/json" | "application/problem+json" => "json",
        "application/ld+json" => "jsonld",
        "application/yaml" | "application/x-yaml" | "text/yaml" => "yaml",
        "application/wasm" => "wasm",

        // Images
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => "ico",
        "image/webp" => "webp",
        "image/avif" => "avif",

        // Documents
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/gzip" => "gz",

        _ => return None,
    };
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(extension_for("text/html"), Some("html"));
        assert_eq!(extension_for("text/css"), Some("css"));
        assert_eq!(extension_for("text/plain"), Some("txt"));
        assert_eq!(extension_for("application/json"), Some("json"));
        assert_eq!(extension_for("application/xml"), Some("xml"));
        assert_eq!(extension_for("image/png"), Some("png"));
    }

    #[test]
    fn test_aliases_share_extension() {
        assert_eq!(extension_for("text/xml"), extension_for("application/xml"));
        assert_eq!(
            extension_for("application/problem+json"),
            extension_for("application/json")
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extension_for("TEXT/HTML"), Some("html"));
        assert_eq!(extension_for("Application/Json"), Some("json"));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(extension_for("application/x-unknown"), None);
        assert_eq!(extension_for("invalid/format"), None);
        assert_eq!(extension_for(""), None);
    }
}
