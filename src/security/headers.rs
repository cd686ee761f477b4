//! Forwarded-header interpretation.
//!
//! # Responsibilities
//! - Derive a client identity from X-Forwarded-For / X-Real-IP
//! - Reconstruct the request's own absolute URL from the request line,
//!   Host and X-Forwarded-Proto
//!
//! # Design Decisions
//! - Client identity is best-effort and spoofable: fine for throttling,
//!   never for authorization
//! - Unknown or malformed values degrade to a fallback, never an error

use axum::http::{header, HeaderMap, Uri};
use url::Url;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Identity used when no forwarding header names the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Best-effort client IP: first `x-forwarded-for` entry, then `x-real-ip`,
/// then `"unknown"`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(first) = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real) = header_str(headers, X_REAL_IP)
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return real.to_string();
    }

    UNKNOWN_CLIENT.to_string()
}

/// Rebuild the absolute URL the client addressed.
///
/// An absolute request-target is used as is. Otherwise the URL is
/// `scheme://host/path?query`, where the scheme is the first
/// `x-forwarded-proto` entry (if http/https) or `default_scheme`.
/// Returns `None` when there is no usable Host.
pub fn request_url(uri: &Uri, headers: &HeaderMap, default_scheme: &str) -> Option<Url> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }

    let host = header_str(headers, header::HOST.as_str())
        .map(str::trim)
        .filter(|h| !h.is_empty())?;

    let scheme = header_str(headers, X_FORWARDED_PROTO)
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| v == "http" || v == "https")
        .unwrap_or_else(|| default_scheme.to_string());

    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Url::parse(&format!("{}://{}{}", scheme, host, path)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let h = headers(&[
            (X_FORWARDED_FOR, " 203.0.113.7 , 10.0.0.1"),
            (X_REAL_IP, "198.51.100.2"),
        ]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let h = headers(&[(X_REAL_IP, "198.51.100.2")]);
        assert_eq!(client_ip(&h), "198.51.100.2");
    }

    #[test]
    fn test_unknown_without_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_empty_forwarded_entry_falls_through() {
        let h = headers(&[(X_FORWARDED_FOR, " , 10.0.0.1"), (X_REAL_IP, "198.51.100.2")]);
        assert_eq!(client_ip(&h), "198.51.100.2");
    }

    #[test]
    fn test_request_url_from_host() {
        let uri: Uri = "/api/contact?x=1".parse().unwrap();
        let h = headers(&[("host", "example.com")]);
        let url = request_url(&uri, &h, "https").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/contact?x=1");
    }

    #[test]
    fn test_request_url_honours_forwarded_proto() {
        let uri: Uri = "/api/contact".parse().unwrap();
        let h = headers(&[("host", "example.com:8443"), (X_FORWARDED_PROTO, "HTTPS, http")]);
        let url = request_url(&uri, &h, "http").unwrap();
        assert_eq!(url.origin().ascii_serialization(), "https://example.com:8443");
    }

    #[test]
    fn test_request_url_absolute_target() {
        let uri: Uri = "http://example.com/api/contact".parse().unwrap();
        let url = request_url(&uri, &HeaderMap::new(), "https").unwrap();
        assert_eq!(url.origin().ascii_serialization(), "http://example.com");
    }

    #[test]
    fn test_request_url_without_host() {
        let uri: Uri = "/api/contact".parse().unwrap();
        assert!(request_url(&uri, &HeaderMap::new(), "http").is_none());
    }
}
