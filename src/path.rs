//! Wire paths for the v2 keys and auth endpoints

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

/// The only protocol generation this client speaks.
pub const API_VERSION: &str = "v2";

/// Characters allowed unencoded in URI path segments per RFC 3986.
/// `/` is kept so nested keys stay nested.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/');

fn encode(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}

/// Normalize a root prefix to `/prefix` form.
///
/// Empty input and `/` both normalize to the empty string (no prefix).
pub fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Build `/{version}/keys{root}{key}` for a logical key.
///
/// `root` must already be normalized; the key gets a leading slash if it
/// has none.
pub fn resolve(key: &str, root: &str, version: &str) -> String {
    let key = if key.starts_with('/') {
        encode(key)
    } else {
        format!("/{}", encode(key))
    };
    format!("/{}/keys{}{}", version, encode(root), key)
}

/// Path of the cluster auth toggle.
pub fn auth_path(version: &str) -> String {
    format!("/{}/auth/enable", version)
}

/// Append a form-urlencoded query string. An empty set leaves the path as is.
pub fn with_query<K, V>(path: &str, pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish();
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_adds_leading_slash() {
        assert_eq!(resolve("foo", "", "v2"), "/v2/keys/foo");
        assert_eq!(resolve("/foo", "", "v2"), "/v2/keys/foo");
    }

    #[test]
    fn test_resolve_with_and_without_slash_agree() {
        for key in ["a", "a/b", "dir/sub/leaf"] {
            assert_eq!(
                resolve(key, "/app", "v2"),
                resolve(&format!("/{}", key), "/app", "v2")
            );
        }
    }

    #[test]
    fn test_resolve_includes_root() {
        assert_eq!(resolve("foo", "/app", "v2"), "/v2/keys/app/foo");
        assert_eq!(resolve("a/b", "/app/env", "v2"), "/v2/keys/app/env/a/b");
    }

    #[test]
    fn test_resolve_encodes_special_characters() {
        assert_eq!(resolve("my key", "", "v2"), "/v2/keys/my%20key");
        assert_eq!(resolve("what?#", "", "v2"), "/v2/keys/what%3F%23");
        assert_eq!(resolve("a:b@c", "", "v2"), "/v2/keys/a:b@c");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        assert_eq!(resolve("x/y", "/r", "v2"), resolve("x/y", "/r", "v2"));
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root("app"), "/app");
        assert_eq!(normalize_root("/app/"), "/app");
        assert_eq!(normalize_root("app/env//"), "/app/env");
    }

    #[test]
    fn test_auth_path() {
        assert_eq!(auth_path("v2"), "/v2/auth/enable");
    }

    #[test]
    fn test_with_query() {
        let empty: [(&str, &str); 0] = [];
        assert_eq!(with_query("/v2/keys/a", &empty), "/v2/keys/a");
        assert_eq!(
            with_query("/v2/keys/a", &[("wait", "true"), ("recursive", "false")]),
            "/v2/keys/a?wait=true&recursive=false"
        );
        assert_eq!(
            with_query("/v2/keys/a", &[("prevValue", "a b&c")]),
            "/v2/keys/a?prevValue=a+b%26c"
        );
    }
}
