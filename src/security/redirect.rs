//! Open-redirect protection for caller-supplied `next` paths.

/// Fallback used when no better destination is known.
pub const DEFAULT_REDIRECT: &str = "/";

/// Return `candidate` if it is a safe same-site relative path, else `fallback`.
///
/// A safe path starts with exactly one `/` and contains no backslash. This
/// rejects absolute URLs (`https://evil.example`), protocol-relative URLs
/// (`//evil.example`) and `/\evil.example`, which some browsers normalize
/// to a protocol-relative URL.
pub fn get_safe_redirect_path(candidate: Option<&str>, fallback: &str) -> String {
    let path = match candidate {
        Some(p) if !p.is_empty() => p,
        _ => return fallback.to_string(),
    };

    if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
        return fallback.to_string();
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_empty_uses_fallback() {
        assert_eq!(get_safe_redirect_path(None, DEFAULT_REDIRECT), "/");
        assert_eq!(get_safe_redirect_path(Some(""), DEFAULT_REDIRECT), "/");
        assert_eq!(get_safe_redirect_path(None, "/admin"), "/admin");
    }

    #[test]
    fn test_absolute_urls_rejected() {
        for candidate in [
            "https://evil.example",
            "http://evil.example/admin",
            "javascript:alert(1)",
            "admin/dashboard",
            " /admin",
        ] {
            assert_eq!(get_safe_redirect_path(Some(candidate), "/"), "/", "{candidate}");
        }
    }

    #[test]
    fn test_protocol_relative_rejected() {
        assert_eq!(get_safe_redirect_path(Some("//evil.example"), "/"), "/");
        assert_eq!(get_safe_redirect_path(Some("///evil.example"), "/"), "/");
    }

    #[test]
    fn test_backslash_rejected() {
        assert_eq!(get_safe_redirect_path(Some("/\\evil"), "/"), "/");
        assert_eq!(get_safe_redirect_path(Some("/admin\\..\\x"), "/"), "/");
    }

    #[test]
    fn test_relative_paths_kept() {
        assert_eq!(
            get_safe_redirect_path(Some("/admin/dashboard"), "/"),
            "/admin/dashboard"
        );
        assert_eq!(
            get_safe_redirect_path(Some("/projects?tab=rust#top"), "/"),
            "/projects?tab=rust#top"
        );
        assert_eq!(get_safe_redirect_path(Some("/"), "/admin"), "/");
    }

    #[test]
    fn test_repeated_calls_agree() {
        let first = get_safe_redirect_path(Some("/articles/1"), "/");
        let second = get_safe_redirect_path(Some("/articles/1"), "/");
        assert_eq!(first, second);
    }
}
