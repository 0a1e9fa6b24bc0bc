//! Request path canonicalisation.
//!
//! Lookups happen on clean, percent-decoded paths. The path is decoded
//! first and cleaned second; a request whose decoded path is not clean gets
//! redirected to the clean form instead of being routed.

use std::borrow::Cow;
use std::string::FromUtf8Error;

/// Lexically clean a URL path.
///
/// Collapses repeated slashes and resolves `.` and `..` segments. The
/// result always starts with `/`, and a trailing slash is kept unless the
/// result is the root.
pub fn clean_path(path: &str) -> Cow<'_, str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    cleaned.push('/');
    cleaned.push_str(&segments.join("/"));
    if path.ends_with('/') && cleaned != "/" {
        cleaned.push('/');
    }

    if cleaned == path {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(cleaned)
    }
}

/// Percent-decode a raw path into the resource path used for routing.
pub fn decode_path(raw: &str) -> Result<Cow<'_, str>, FromUtf8Error> {
    urlencoding::decode(raw)
}

/// Percent-encode a decoded path for a `Location` header, keeping `/`.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_paths_are_borrowed() {
        for p in ["/", "/a", "/a/b", "/a/"] {
            assert!(matches!(clean_path(p), Cow::Borrowed(_)), "{p}");
        }
    }

    #[test]
    fn test_cleaning() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("a"), "/a");
        assert_eq!(clean_path("//a"), "/a");
        assert_eq!(clean_path("/a/./b"), "/a/b");
        assert_eq!(clean_path("/a/../b"), "/b");
        assert_eq!(clean_path("/../.."), "/");
        assert_eq!(clean_path("/a//"), "/a/");
        assert_eq!(clean_path("/a/.."), "/");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_path("/my%20tool").unwrap(), "/my tool");
        assert_eq!(decode_path("/plain").unwrap(), "/plain");
        assert!(decode_path("/%ff").is_err());
    }

    #[test]
    fn test_encoded_dot_segments_clean_after_decoding() {
        let decoded = decode_path("/%2e%2e/%2e%2e/etc/passwd").unwrap();
        assert_eq!(decoded, "/../../etc/passwd");
        assert_eq!(clean_path(&decoded), "/etc/passwd");
    }

    #[test]
    fn test_encode_keeps_slashes() {
        assert_eq!(encode_path("/my tool/x"), "/my%20tool/x");
        assert_eq!(encode_path("/"), "/");
        assert_eq!(decode_path(&encode_path("/a%b")).unwrap(), "/a%b");
    }
}
