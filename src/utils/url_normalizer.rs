//! Destination normalization.
//!
//! Destinations are stored in the form the caller supplied, except that a
//! missing scheme is replaced by `http://`. The same normalized string is
//! used for storage and for dedup-by-destination comparison, so
//! `example.com` and `http://example.com` are the same destination.

use url::Url;

/// Errors that can occur during destination normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Destination URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Destination URL has no host")]
    MissingHost,
}

/// Normalizes a destination URL.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. `http://` and `https://` prefixes (any case) are kept as-is
/// 3. Any other `scheme://` prefix is rejected
/// 4. Input without a scheme gets `http://` prepended
/// 5. The result must parse as a URL with a host
///
/// Nothing else is rewritten: the returned string is what a redirect will
/// send back verbatim.
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] when the input cannot be a web destination.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com").unwrap(), "http://example.com");
/// assert_eq!(normalize_url("https://example.com/a").unwrap(), "https://example.com/a");
/// assert!(normalize_url("ftp://example.com").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let normalized = if has_web_scheme(trimmed) {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    } else {
        format!("http://{trimmed}")
    };

    let url =
        Url::parse(&normalized).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(normalized),
        _ => Err(UrlNormalizationError::MissingHost),
    }
}

fn has_web_scheme(input: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        input
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
